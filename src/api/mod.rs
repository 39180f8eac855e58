//! High-level library API: open a scene from any supported source, run the
//! retrieval pipeline over it, and write the product layers. Prefer these
//! entrypoints over the low-level `core` modules when integrating the
//! pipeline into another program.
use std::path::Path;

use ndarray::{Array2, Array3};
use tracing::info;

use crate::config::{Registry, VariableConfig, tables};
use crate::core::domain::invalid_input;
use crate::core::features::assemble;
use crate::core::geometry::derive_geometry;
use crate::core::harmonize::harmonize;
use crate::core::output::invalid_output;
use crate::core::scene::Scene;
use crate::error::{Error, Result};
use crate::io::{self, writers};
use crate::nets::{NetProvider, run_inference};
use crate::types::{Resolution, Source, Variable};

/// All per-pixel layers produced by one retrieval.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub variable: Variable,
    pub estimate: Array2<f32>,
    pub uncertainty: Array2<f32>,
    /// True where the pixel's domain code is outside the trained input domain.
    pub input_flag: Array2<bool>,
    /// 1 where the estimate falls outside the variable's plausible range.
    pub output_flag: Array2<u8>,
}

/// Open and canonicalize a scene from one of the supported source layouts.
///
/// `aux_safe` is required for [`Source::S2SingleTif`], whose angle grids live
/// in a companion SAFE directory; other sources ignore it.
pub fn open_scene(input: &Path, source: Source, aux_safe: Option<&Path>) -> Result<Scene> {
    let scene = match source {
        Source::S2Sr => io::safe::read_scene(input, Resolution::M20, None)?,
        Source::S2Sr10m => io::safe::read_scene(input, Resolution::M10, None)?,
        Source::S2Force => io::force::read_scene(input)?,
        Source::S2SingleTif => {
            let safe = aux_safe.ok_or_else(|| {
                Error::config("single-tif input needs a companion SAFE directory for angles")
            })?;
            io::single_tif::read_scene(input, safe)?
        }
    };
    info!("opened {} scene with {} fields", source.name(), scene.len());
    Ok(scene)
}

/// Harmonize a scene to its anchor band and attach the derived geometry
/// planes. Idempotent, so callers retrieving several variables from the same
/// scene only pay for the resampling once.
pub fn prepare_scene(scene: &mut Scene, source: Source) -> Result<()> {
    let spec = tables::source_spec(source);
    harmonize(scene, spec.anchor_band)?;
    derive_geometry(scene)?;
    Ok(())
}

/// Assemble the scaled feature tensor for one configuration from a prepared
/// scene. Exposed for the `--features-out` debug surface.
pub fn feature_tensor(scene: &Scene, cfg: &VariableConfig) -> Result<Array3<f32>> {
    assemble(scene, cfg)
}

/// Run one complete retrieval over a prepared scene.
///
/// Input-domain flagging happens before inference, so a scene missing a
/// configured feature fails without touching the provider. The networks are
/// evaluated over every pixel; flagged pixels keep their estimates and are
/// reported through the flag layers instead of being masked out.
pub fn retrieve(
    scene: &Scene,
    variable: Variable,
    source: Source,
    registry: &Registry,
    provider: &dyn NetProvider,
) -> Result<Retrieval> {
    let cfg = registry.config(variable, source)?;
    let features = assemble(scene, cfg)?;
    let input_flag = invalid_input(&features, cfg);
    let flagged = input_flag.iter().filter(|&&f| f).count();
    info!(
        "{}: {} of {} pixels outside the input domain",
        variable,
        flagged,
        input_flag.len()
    );

    let (estimate, uncertainty) = run_inference(provider, cfg, &features)?;
    let output_flag = invalid_output(&estimate, cfg.output_range);

    Ok(Retrieval {
        variable,
        estimate,
        uncertainty,
        input_flag,
        output_flag,
    })
}

/// Write a retrieval's four layers as two GeoTIFFs next to `output`:
/// the f32 estimate/uncertainty pair at `output` itself and the flags at
/// `<stem>_flags.tif`.
pub fn write_retrieval(output: &Path, scene: &Scene, retrieval: &Retrieval) -> Result<()> {
    let estimate_name = retrieval.variable.to_string();
    let uncertainty_name = format!("{}_uncertainty", retrieval.variable);
    writers::write_layers_f32(
        output,
        &scene.meta,
        &[
            (estimate_name.as_str(), &retrieval.estimate),
            (uncertainty_name.as_str(), &retrieval.uncertainty),
        ],
    )?;

    let input_u8 = retrieval.input_flag.mapv(|f| f as u8);
    let flags_path = flags_path(output);
    writers::write_layers_u8(
        &flags_path,
        &scene.meta,
        &[("input_out_of_domain", &input_u8), ("output_out_of_range", &retrieval.output_flag)],
    )?;
    Ok(())
}

fn flags_path(output: &Path) -> std::path::PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "product".to_string());
    output.with_file_name(format!("{}_flags.tif", stem))
}
