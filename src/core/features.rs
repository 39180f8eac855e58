//! Feature assembly: select, offset/scale, and stack the configured scene
//! fields into the (N, rows, cols) tensor the network boundary expects.
use ndarray::{Array2, Array3, Axis};
use tracing::debug;

use crate::config::VariableConfig;
use crate::core::scene::Scene;
use crate::error::{Error, Result};

/// Build the ordered feature tensor for one retrieval. Plane k is
/// `(scene[features[k]] as f32 + offsets[k]) * scales[k]`; plane order is the
/// configuration order, exactly. Deterministic: identical inputs yield
/// bit-identical output.
pub fn assemble(scene: &Scene, cfg: &VariableConfig) -> Result<Array3<f32>> {
    let mut planes: Vec<Array2<f32>> = Vec::with_capacity(cfg.features.len());
    for (k, &name) in cfg.features.iter().enumerate() {
        let field = scene.field(name)?;
        let offset = cfg.offsets[k];
        let scale = cfg.scales[k];
        planes.push(field.mapv(|v| (v as f32 + offset) * scale));
    }

    let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
    let tensor = ndarray::stack(Axis(0), &views).map_err(|_| Error::ShapeMismatch {
        field: "feature stack".to_string(),
        expected: planes.first().map(|p| p.dim()).unwrap_or((0, 0)),
        actual: (0, 0),
    })?;
    debug!(
        "assembled {} feature planes of {:?} for {}",
        tensor.len_of(Axis(0)),
        scene.field(cfg.features[0])?.dim(),
        cfg.variable
    );
    Ok(tensor)
}
