//! Boundary to the external network-ensemble collaborator.
//!
//! The crate does not ship network weights or evaluation code. It defines the
//! tensor contract the pipeline depends on: an ensemble accepts the full
//! (N, rows, cols) feature tensor and returns one flat value per pixel, in
//! row-major pixel order. Two independent ensembles serve each retrieval:
//! one trained on estimates, one on estimate errors. Domain-to-subnetwork
//! routing, weight storage, and evaluation live behind [`NetProvider`].
use ndarray::{Array1, Array2, Array3};
use tracing::info;

use crate::config::VariableConfig;
use crate::error::Result;

// Not a thiserror derive: the `source` field here is a data-source name, and
// thiserror insists a field named `source` implement `std::error::Error`.
#[derive(Debug)]
pub enum NetError {
    NoEnsemble { variable: String, source: String },
    OutputLength { expected: usize, actual: usize },
    Backend(String),
}

impl std::fmt::Display for NetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetError::NoEnsemble { variable, source } => {
                write!(f, "no ensemble available for {variable}/{source}")
            }
            NetError::OutputLength { expected, actual } => {
                write!(f, "ensemble returned {actual} values, expected {expected}")
            }
            NetError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for NetError {}

/// One trained ensemble, sized to the configuration's `num_nets`.
pub trait NetEnsemble {
    /// Evaluate the ensemble over every pixel of the feature tensor.
    /// Returns a flat (rows * cols,) array in row-major pixel order.
    fn predict(&self, features: &Array3<f32>) -> std::result::Result<Array1<f32>, NetError>;
}

/// Factory for the two ensembles of a retrieval.
pub trait NetProvider {
    fn estimates(&self, cfg: &VariableConfig)
    -> std::result::Result<Box<dyn NetEnsemble>, NetError>;
    fn uncertainties(
        &self,
        cfg: &VariableConfig,
    ) -> std::result::Result<Box<dyn NetEnsemble>, NetError>;
}

/// Invoke the estimate and uncertainty ensembles once each over the full
/// feature tensor and reshape the flat outputs to the scene grid.
pub fn run_inference(
    provider: &dyn NetProvider,
    cfg: &VariableConfig,
    features: &Array3<f32>,
) -> Result<(Array2<f32>, Array2<f32>)> {
    let (_, rows, cols) = features.dim();
    info!(
        "running {} inference over {}x{} pixels ({} nets)",
        cfg.variable, rows, cols, cfg.num_nets
    );

    let estimate = reshape(provider.estimates(cfg)?.predict(features)?, rows, cols)?;
    let uncertainty = reshape(provider.uncertainties(cfg)?.predict(features)?, rows, cols)?;
    Ok((estimate, uncertainty))
}

fn reshape(flat: Array1<f32>, rows: usize, cols: usize) -> Result<Array2<f32>> {
    let expected = rows * cols;
    if flat.len() != expected {
        return Err(NetError::OutputLength {
            expected,
            actual: flat.len(),
        }
        .into());
    }
    Array2::from_shape_vec((rows, cols), flat.to_vec()).map_err(|_| {
        NetError::OutputLength {
            expected,
            actual: 0,
        }
        .into()
    })
}
