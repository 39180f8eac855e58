//! FORCE ARD tile reader: one GeoTIFF per spectral band plus four
//! full-resolution angle rasters, all on the same grid, so no resampling
//! happens here.
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{info, warn};

use crate::core::scene::{Scene, SceneMeta};
use crate::error::Result;
use crate::io::{GdalRasterReader, ReaderError};

const ANGLE_FILES: [(&str, &str); 4] = [
    ("SZA", "sun_zenith_degrees.tif"),
    ("SAA", "sun_azimuth_degrees.tif"),
    ("VZA", "sensor_zenith_degrees.tif"),
    ("VAA", "sensor_azimuth_degrees.tif"),
];

/// Read a FORCE tile directory into a canonical Scene.
///
/// A missing angle raster only logs a warning and leaves that field unset;
/// the gap surfaces as `MissingFeature` once a retrieval asks for the derived
/// geometry. A missing quality mask is replaced by an all-zero one.
pub fn read_scene<P: AsRef<Path>>(tile_dir: P) -> Result<Scene> {
    let dir = tile_dir.as_ref();
    if !dir.is_dir() {
        return Err(ReaderError::MissingLayout("FORCE tile directory").into());
    }

    info!("reading FORCE tile from {:?}", dir);
    let mut meta: Option<SceneMeta> = None;
    let mut fields: Vec<(String, Array2<f64>)> = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| is_tif(p))
        .collect();
    entries.sort();

    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("sun_") || name.starts_with("sensor_") {
            continue;
        }
        let band = map_band_name(name);
        let reader = GdalRasterReader::open(&path)?;
        let data = reader.read_band(1, None)?;
        if band == "B02" || meta.is_none() {
            meta = Some(reader.metadata.to_scene_meta());
        }
        fields.push((band, data));
    }

    let meta = meta.ok_or(ReaderError::MissingLayout("band rasters"))?;
    let mut scene = Scene::new(meta);
    for (band, data) in fields {
        scene.insert(band, data);
    }

    for (key, fname) in ANGLE_FILES {
        let path = dir.join(fname);
        if path.exists() {
            let reader = GdalRasterReader::open(&path)?;
            scene.insert(key, reader.read_band(1, None)?);
        } else {
            warn!("missing angle raster {}; {} will be unset", fname, key);
        }
    }

    // FORCE products carry their own quality layer elsewhere; a zero mask
    // keeps the scene contract satisfied.
    if !scene.contains("SCL") {
        if let Some(anchor) = scene.get("B02") {
            let zeros = Array2::<f64>::zeros(anchor.dim());
            scene.insert("SCL", zeros);
        }
    }

    Ok(scene)
}

fn is_tif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

/// Map the FORCE band naming convention onto Sentinel-2 band names.
fn map_band_name(file_name: &str) -> String {
    for (tag, band) in [
        ("BLU", "B02"),
        ("GRN", "B03"),
        ("RED", "B04"),
        ("RE1", "B05"),
        ("RE2", "B06"),
        ("RE3", "B07"),
        ("BNR", "B08"),
        ("NIR", "B8A"),
        ("SW1", "B11"),
        ("SW2", "B12"),
    ] {
        if file_name.contains(tag) {
            return band.to_string();
        }
    }
    file_name.split('_').next().unwrap_or(file_name).to_string()
}
