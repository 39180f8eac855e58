//! GeoTIFF product writers.
//!
//! Estimates and uncertainties go out as multi-band `Float32` rasters, the
//! quality flags as `Byte`. Every output carries the scene's georeferencing
//! plus a small set of provenance metadata items.
use std::path::Path;

use chrono::Utc;
use gdal::raster::Buffer;
use gdal::{DriverManager, Metadata};
use ndarray::{Array2, Array3};
use tracing::info;

use crate::core::scene::SceneMeta;
use crate::io::gdal::GdalError;

const IDENTITY_GT: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

fn apply_georeferencing(ds: &mut gdal::Dataset, meta: &SceneMeta) -> Result<(), GdalError> {
    // An identity transform means the scene was never georeferenced; writing
    // it would mislabel the raster as sitting at the null island origin.
    if meta.geotransform != IDENTITY_GT {
        ds.set_geo_transform(&meta.geotransform)
            .map_err(GdalError::Gdal)?;
        if !meta.projection.is_empty() {
            ds.set_projection(&meta.projection).map_err(GdalError::Gdal)?;
        }
    }
    ds.set_metadata_item("PROCESSING_TIMESTAMP", &Utc::now().to_rfc3339(), "")
        .map_err(GdalError::Gdal)?;
    ds.set_metadata_item("GENERATOR", concat!("sl2p ", env!("CARGO_PKG_VERSION")), "")
        .map_err(GdalError::Gdal)?;
    Ok(())
}

/// Write named `f32` planes as one multi-band GeoTIFF. NaN marks no-data.
pub fn write_layers_f32(
    output: &Path,
    meta: &SceneMeta,
    layers: &[(&str, &Array2<f32>)],
) -> Result<(), GdalError> {
    let (rows, cols) = layers
        .first()
        .map(|(_, a)| a.dim())
        .ok_or_else(|| GdalError::UnsupportedFormat("no layers to write".into()))?;
    let driver = DriverManager::get_driver_by_name("GTiff").map_err(GdalError::Gdal)?;
    let mut ds = driver
        .create_with_band_type::<f32, _>(output, cols, rows, layers.len())
        .map_err(GdalError::Gdal)?;
    apply_georeferencing(&mut ds, meta)?;

    for (i, (name, plane)) in layers.iter().enumerate() {
        let (h, w) = plane.dim();
        if (h, w) != (rows, cols) {
            return Err(GdalError::DimensionMismatch(cols, rows, w, h));
        }
        let mut band = ds.rasterband(i + 1).map_err(GdalError::Gdal)?;
        band.set_description(name).map_err(GdalError::Gdal)?;
        band.set_no_data_value(Some(f64::NAN))
            .map_err(GdalError::Gdal)?;
        let mut buf = Buffer::new((cols, rows), plane.iter().copied().collect());
        band.write((0, 0), (cols, rows), &mut buf)
            .map_err(GdalError::Gdal)?;
    }
    info!("wrote {} band(s) to {:?}", layers.len(), output);
    Ok(())
}

/// Write named `u8` planes (quality flags) as one multi-band GeoTIFF.
pub fn write_layers_u8(
    output: &Path,
    meta: &SceneMeta,
    layers: &[(&str, &Array2<u8>)],
) -> Result<(), GdalError> {
    let (rows, cols) = layers
        .first()
        .map(|(_, a)| a.dim())
        .ok_or_else(|| GdalError::UnsupportedFormat("no layers to write".into()))?;
    let driver = DriverManager::get_driver_by_name("GTiff").map_err(GdalError::Gdal)?;
    let mut ds = driver
        .create_with_band_type::<u8, _>(output, cols, rows, layers.len())
        .map_err(GdalError::Gdal)?;
    apply_georeferencing(&mut ds, meta)?;

    for (i, (name, plane)) in layers.iter().enumerate() {
        let (h, w) = plane.dim();
        if (h, w) != (rows, cols) {
            return Err(GdalError::DimensionMismatch(cols, rows, w, h));
        }
        let mut band = ds.rasterband(i + 1).map_err(GdalError::Gdal)?;
        band.set_description(name).map_err(GdalError::Gdal)?;
        let mut buf = Buffer::new((cols, rows), plane.iter().copied().collect());
        band.write((0, 0), (cols, rows), &mut buf)
            .map_err(GdalError::Gdal)?;
    }
    info!("wrote {} flag band(s) to {:?}", layers.len(), output);
    Ok(())
}

/// Write a feature cube (planes × rows × cols) with one band per feature,
/// described by the feature names in table order.
pub fn write_feature_cube(
    output: &Path,
    meta: &SceneMeta,
    names: &[&str],
    cube: &Array3<f32>,
) -> Result<(), GdalError> {
    let planes: Vec<Array2<f32>> = (0..cube.dim().0)
        .map(|i| cube.index_axis(ndarray::Axis(0), i).to_owned())
        .collect();
    let layers: Vec<(&str, &Array2<f32>)> = names
        .iter()
        .copied()
        .zip(planes.iter())
        .collect();
    write_layers_f32(output, meta, &layers)
}
