//! SAFE-archive reader: per-band JP2 rasters at a chosen resolution tier plus
//! sun/viewing angles parsed from the granule's tile metadata document and
//! resized to the scene grid.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::resample::resize_bilinear;
use crate::core::scene::{Scene, SceneMeta};
use crate::error::Result;
use crate::io::angles::read_tile_angles;
use crate::io::{GdalRasterReader, ReaderError};
use crate::types::Resolution;

/// Band whose grid defines the scene shape (and the default angle target).
const ANCHOR_BAND: &str = "B02";

/// Read a SAFE product at the given resolution tier into a canonical Scene.
///
/// Every `.jp2` under `GRANULE/<granule>/IMG_DATA/R{res}m/` is read and keyed
/// by its band token (`B02`, `B8A`, `SCL`, ...). Angle grids are parsed from
/// `MTD_TL.xml` and bilinear-resized to `angle_target`, which defaults to the
/// anchor band's shape.
pub fn read_scene<P: AsRef<Path>>(
    safe_dir: P,
    resolution: Resolution,
    angle_target: Option<(usize, usize)>,
) -> Result<Scene> {
    let base = safe_dir.as_ref();
    let granule = find_granule(base)?;
    let img_dir = granule
        .join("IMG_DATA")
        .join(format!("R{}m", resolution.meters()));
    if !img_dir.is_dir() {
        return Err(ReaderError::MissingLayout("IMG_DATA resolution directory").into());
    }

    info!("reading SAFE bands from {:?}", img_dir);
    let mut meta: Option<SceneMeta> = None;
    let mut fields: Vec<(String, ndarray::Array2<f64>)> = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(&img_dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("jp2"))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();

    for path in entries {
        let Some(band) = band_token(&path) else {
            continue;
        };
        let reader = GdalRasterReader::open(&path)?;
        let data = reader.read_band(1, None)?;
        debug!("read {} ({:?}) from {:?}", band, data.dim(), path);
        if band == ANCHOR_BAND || meta.is_none() {
            meta = Some(reader.metadata.to_scene_meta());
        }
        fields.push((band, data));
    }

    let meta = meta.ok_or(ReaderError::MissingLayout("JP2 band rasters"))?;
    let mut scene = Scene::new(meta);
    for (band, data) in fields {
        scene.insert(band, data);
    }

    let target = match angle_target {
        Some(shape) => shape,
        None => scene.field(ANCHOR_BAND)?.dim(),
    };

    let mtd = granule.join("MTD_TL.xml");
    info!("reading tile angles from {:?}", mtd);
    let grids = read_tile_angles(&mtd)?;
    scene.insert("SZA", resize_bilinear(&grids.sun_zenith, target)?);
    scene.insert("SAA", resize_bilinear(&grids.sun_azimuth, target)?);
    scene.insert("VZA", resize_bilinear(&grids.view_zenith, target)?);
    scene.insert("VAA", resize_bilinear(&grids.view_azimuth, target)?);

    Ok(scene)
}

/// First granule directory under `GRANULE/`, in name order.
fn find_granule(base: &Path) -> Result<PathBuf> {
    let granule_root = base.join("GRANULE");
    if !granule_root.is_dir() {
        return Err(ReaderError::MissingLayout("GRANULE directory").into());
    }
    let mut dirs: Vec<PathBuf> = fs::read_dir(&granule_root)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs.into_iter()
        .next()
        .ok_or_else(|| ReaderError::MissingLayout("granule subdirectory").into())
}

/// Band token of a SAFE raster file name: the second-to-last
/// underscore-separated piece of the stem (`..._B02_20m.jp2` -> `B02`).
fn band_token(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let mut parts = stem.rsplit('_');
    let _suffix = parts.next()?;
    parts.next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_token_takes_second_to_last_piece() {
        let p = Path::new("/x/T32TNS_20230615T101031_B02_20m.jp2");
        assert_eq!(band_token(p).as_deref(), Some("B02"));
        let p = Path::new("/x/T32TNS_20230615T101031_SCL_20m.jp2");
        assert_eq!(band_token(p).as_deref(), Some("SCL"));
        let p = Path::new("/x/T32TNS_20230615T101031_B8A_20m.jp2");
        assert_eq!(band_token(p).as_deref(), Some("B8A"));
    }

    #[test]
    fn missing_granule_dir_is_layout_error() {
        let dir = tempfile::tempdir().unwrap();
        match read_scene(dir.path(), Resolution::M20, None) {
            Err(crate::error::Error::Reader(ReaderError::MissingLayout(what))) => {
                assert!(what.contains("GRANULE"))
            }
            other => panic!("expected MissingLayout, got {:?}", other.map(|_| ())),
        }
    }
}
