//! Hybrid reader for a single packed 10 m GeoTIFF whose angles come from a
//! companion SAFE directory: bands are addressed by positional index, the
//! angle grids are upscaled to the full Sentinel-2 tile, clipped at the pixel
//! origin to the packed raster's footprint, and everything is downsampled
//! together to the 20 m working grid.
use std::path::Path;

use ndarray::{Array2, s};
use tracing::{info, warn};

use crate::core::resample::{resize_bilinear, resize_nearest_u8};
use crate::core::scene::Scene;
use crate::error::Result;
use crate::io::{GdalRasterReader, ReaderError};
use crate::types::Resolution;

/// Full Sentinel-2 tile extent at 10 m.
const FULL_TILE: (usize, usize) = (10980, 10980);

/// 1-based raster band index -> Sentinel-2 band name, for the packed layout.
fn map_packed_band(index: usize) -> Option<&'static str> {
    match index {
        1 => Some("B02"),
        2 => Some("B03"),
        3 => Some("B04"),
        7 => Some("B08"),
        _ => None,
    }
}

const SPECTRAL_BANDS: [&str; 4] = ["B02", "B03", "B04", "B08"];
const CLIPPED_FIELDS: [&str; 5] = ["SZA", "SAA", "VZA", "VAA", "SCL"];

/// Read the packed raster plus SAFE angles into a canonical 20 m Scene.
pub fn read_scene<P: AsRef<Path>, Q: AsRef<Path>>(tif_path: P, safe_dir: Q) -> Result<Scene> {
    let reader = GdalRasterReader::open(tif_path.as_ref())?;
    let rows = reader.metadata.size_y;
    let cols = reader.metadata.size_x;
    info!(
        "reading packed raster {:?}: {} bands, {}x{}",
        tif_path.as_ref(),
        reader.metadata.bands,
        cols,
        rows
    );

    let mut scene = Scene::new(reader.metadata.to_scene_meta());
    for index in 1..=reader.metadata.bands {
        if let Some(band) = map_packed_band(index) {
            scene.insert(band, reader.read_band(index, None)?);
        }
    }
    if !scene.contains("B08") {
        return Err(ReaderError::MissingBand("B08".to_string()).into());
    }

    // Angles for the whole tile at 10 m, so the clip below starts from a grid
    // that covers the packed raster's footprint.
    info!("reading full-tile angle grids from {:?}", safe_dir.as_ref());
    let safe_scene = crate::io::safe::read_scene(safe_dir, Resolution::M10, Some(FULL_TILE))?;

    if rows > FULL_TILE.0 || cols > FULL_TILE.1 {
        return Err(ReaderError::Parse(format!(
            "packed raster {}x{} exceeds the Sentinel-2 tile extent",
            cols, rows
        ))
        .into());
    }

    let final_shape = (rows / 2, cols / 2);

    // Clip at pixel origin (0,0), then downsample the clip to the 20 m grid:
    // bilinear for continuous fields, nearest with a u8 cast for the mask.
    for key in CLIPPED_FIELDS {
        if let Some(field) = safe_scene.get(key) {
            let clipped: Array2<f64> = field.slice(s![0..rows, 0..cols]).to_owned();
            let resampled = if key == "SCL" {
                resize_nearest_u8(&clipped, final_shape)?
            } else {
                resize_bilinear(&clipped, final_shape)?
            };
            scene.insert(key, resampled);
        }
    }

    for band in SPECTRAL_BANDS {
        let downsampled = resize_bilinear(scene.field(band)?, final_shape)?;
        scene.insert(band, downsampled);
    }

    // Viewing grids can keep NaN holes after the clip; fill with the scene
    // mean so the retrieval does not punch holes in the product.
    for key in ["VZA", "VAA"] {
        if let Some(field) = scene.take(key) {
            scene.insert(key, fill_nan_with_mean(field, key));
        }
    }

    scene.meta = scene.meta.downsampled(2);
    Ok(scene)
}

fn fill_nan_with_mean(mut field: Array2<f64>, key: &str) -> Array2<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in field.iter() {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    let fill = if count > 0 { sum / count as f64 } else { 0.0 };
    let holes = field.iter().filter(|v| v.is_nan()).count();
    if holes > 0 {
        warn!("{}: filling {} NaN pixels with {:.3}", key, holes, fill);
        field.mapv_inplace(|v| if v.is_nan() { fill } else { v });
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_band_mapping_is_positional() {
        assert_eq!(map_packed_band(1), Some("B02"));
        assert_eq!(map_packed_band(2), Some("B03"));
        assert_eq!(map_packed_band(3), Some("B04"));
        assert_eq!(map_packed_band(7), Some("B08"));
        assert_eq!(map_packed_band(4), None);
        assert_eq!(map_packed_band(8), None);
    }

    #[test]
    fn nan_holes_filled_with_scene_mean() {
        let mut field = Array2::from_elem((2, 2), 4.0);
        field[[0, 1]] = f64::NAN;
        let out = fill_nan_with_mean(field, "VZA");
        assert_eq!(out[[0, 1]], 4.0);
        assert_eq!(out[[0, 0]], 4.0);
    }

    #[test]
    fn all_nan_field_fills_with_zero() {
        let field = Array2::from_elem((2, 2), f64::NAN);
        let out = fill_nan_with_mean(field, "VAA");
        assert!(out.iter().all(|&v| v == 0.0));
    }
}
