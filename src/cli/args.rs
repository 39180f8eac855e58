use clap::Parser;
use std::path::PathBuf;

use sl2p::types::{Source, Variable};

#[derive(Parser)]
#[command(name = "sl2p", version, about = "Sentinel-2 biophysical retrieval pipeline")]
pub struct CliArgs {
    /// Input product: SAFE directory, FORCE tile directory, or packed GeoTIFF
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input product layout
    #[arg(short, long, value_enum)]
    pub source: Source,

    /// Variables to retrieve (repeatable; defaults to all six)
    #[arg(short, long, value_enum)]
    pub variable: Vec<Variable>,

    /// Output directory for the product GeoTIFFs
    #[arg(short, long)]
    pub output: PathBuf,

    /// Companion SAFE directory holding angle grids (single-tif source only)
    #[arg(long)]
    pub safe_dir: Option<PathBuf>,

    /// Also write the scaled feature tensor for inspection
    #[arg(long, default_value_t = false)]
    pub features_out: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
