use std::fs;
use std::path::Path;

use tracing::{info, warn};

use sl2p::api;
use sl2p::config::Registry;
use sl2p::core::domain::invalid_input;
use sl2p::io::writers;
use sl2p::nets::NetProvider;
use sl2p::types::{Source, Variable};

use super::args::CliArgs;
use super::errors::AppError;

fn requested_variables(args: &CliArgs) -> Vec<Variable> {
    if args.variable.is_empty() {
        Variable::ALL.to_vec()
    } else {
        args.variable.clone()
    }
}

/// Run the full pipeline with a network provider: every requested variable
/// gets an estimate/uncertainty GeoTIFF plus a flags GeoTIFF in the output
/// directory.
pub fn run_with_provider(
    args: CliArgs,
    provider: Option<&dyn NetProvider>,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    if args.source == Source::S2SingleTif && args.safe_dir.is_none() {
        return Err(AppError::MissingArgument {
            arg: "--safe-dir".to_string(),
        }
        .into());
    }

    let registry = Registry::builtin()?;
    let mut scene = api::open_scene(&args.input, args.source, args.safe_dir.as_deref())?;
    api::prepare_scene(&mut scene, args.source)?;

    fs::create_dir_all(&args.output)?;
    let variables = requested_variables(&args);

    // The six variables of one source share a feature table and domain list,
    // so the feature cube and input-domain flags are written once.
    let cfg = registry.config(variables[0], args.source)?;
    let features = api::feature_tensor(&scene, cfg)?;
    if args.features_out {
        let names: Vec<&str> = cfg.features.to_vec();
        let path = args.output.join("features.tif");
        writers::write_feature_cube(&path, &scene.meta, &names, &features)
            .map_err(sl2p::error::Error::from)?;
    }

    let domain_flag = invalid_input(&features, cfg).mapv(|f| f as u8);
    let flags_path = args.output.join("input_domain_flags.tif");
    writers::write_layers_u8(
        &flags_path,
        &scene.meta,
        &[("input_out_of_domain", &domain_flag)],
    )
    .map_err(sl2p::error::Error::from)?;

    let Some(provider) = provider else {
        warn!("no network provider supplied; wrote flags only, skipping retrieval");
        return Ok(());
    };

    for variable in variables {
        let retrieval = api::retrieve(&scene, variable, args.source, &registry, provider)?;
        let path = product_path(&args.output, variable);
        api::write_retrieval(&path, &scene, &retrieval)?;
        info!("{} written to {:?}", variable, path);
    }
    Ok(())
}

/// Provider-less entrypoint used by the binary: prepares the scene and writes
/// the feature and flag surfaces. Retrieval products require embedding the
/// library with a trained [`NetProvider`].
pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    run_with_provider(args, None)
}

fn product_path(dir: &Path, variable: Variable) -> std::path::PathBuf {
    dir.join(format!("{}.tif", variable.to_string().to_lowercase()))
}
