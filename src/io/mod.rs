//! I/O layer: GDAL-backed raster access, the tile-metadata angle parser, the
//! three source-reader strategies (SAFE archive, FORCE tile, packed single
//! TIF), and the GeoTIFF writer.
use thiserror::Error;

pub mod angles;
pub mod force;
pub mod gdal;
pub mod safe;
pub mod single_tif;
pub mod writers;

pub use gdal::{GdalError, GdalMetadata, GdalRasterReader};

/// Errors shared by the source-reader strategies.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Missing `{0}` in product layout")]
    MissingLayout(&'static str),
    #[error("Missing required band `{0}` in input raster")]
    MissingBand(String),
    #[error("Missing angle block `{0}` in tile metadata")]
    MissingGeometry(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
