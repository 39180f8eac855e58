#![doc = r#"
SL2P — a Sentinel-2 biophysical variable retrieval pipeline.

This crate turns Sentinel-2 surface reflectance products into per-pixel maps
of biophysical variables (LAI, fAPAR, fCOVER, Albedo, CCC, CWC) using
pre-trained neural network ensembles. It reads SAFE archives, FORCE ARD
tiles, and packed single-file GeoTIFFs, harmonizes every field onto one pixel
grid, derives the illumination/viewing geometry, assembles the scaled feature
tensor the networks were trained on, and flags pixels whose reflectance falls
outside the trained input domain or whose estimate falls outside the
variable's plausible range.

The trained weights themselves are not part of this crate. Inference happens
behind the [`nets::NetProvider`] trait; embedders supply an implementation
backed by their weight store, and everything up to and around the network
evaluation lives here.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Quick start: prepare a scene and run a retrieval
------------------------------------------------
```rust,no_run
use std::path::Path;
use sl2p::{api, config::Registry, types::{Source, Variable}};
use sl2p::nets::{NetEnsemble, NetError, NetProvider};
use ndarray::{Array1, Array3};

struct MyEnsemble;
impl NetEnsemble for MyEnsemble {
    fn predict(&self, features: &Array3<f32>) -> Result<Array1<f32>, NetError> {
        let (_, rows, cols) = features.dim();
        // Evaluate your trained ensemble here.
        Ok(Array1::zeros(rows * cols))
    }
}

struct MyProvider;
impl NetProvider for MyProvider {
    fn estimates(&self, _cfg: &sl2p::config::VariableConfig)
        -> Result<Box<dyn NetEnsemble>, NetError> {
        Ok(Box::new(MyEnsemble))
    }
    fn uncertainties(&self, _cfg: &sl2p::config::VariableConfig)
        -> Result<Box<dyn NetEnsemble>, NetError> {
        Ok(Box::new(MyEnsemble))
    }
}

fn main() -> sl2p::Result<()> {
    let registry = Registry::builtin()?;
    let mut scene = api::open_scene(
        Path::new("/data/S2A_example.SAFE"),
        Source::S2Sr,
        None,
    )?;
    api::prepare_scene(&mut scene, Source::S2Sr)?;

    let lai = api::retrieve(&scene, Variable::Lai, Source::S2Sr, &registry, &MyProvider)?;
    api::write_retrieval(Path::new("/out/lai.tif"), &scene, &lai)?;
    Ok(())
}
```

Without a provider
------------------
The scene preparation surface works standalone: open a scene, harmonize it,
assemble the feature tensor, and compute the input-domain flags. This is what
the bundled CLI does when no provider is wired in.

```rust,no_run
use std::path::Path;
use sl2p::{api, config::Registry, core::domain, types::{Source, Variable}};

fn main() -> sl2p::Result<()> {
    let registry = Registry::builtin()?;
    let mut scene = api::open_scene(Path::new("/data/tile"), Source::S2Force, None)?;
    api::prepare_scene(&mut scene, Source::S2Force)?;

    let cfg = registry.config(Variable::Lai, Source::S2Force)?;
    let features = api::feature_tensor(&scene, cfg)?;
    let flags = domain::invalid_input(&features, cfg);
    println!("{} flagged pixels", flags.iter().filter(|&&f| f).count());
    Ok(())
}
```

Error handling
--------------
All public functions return `sl2p::Result<T>`; match on `sl2p::Error` to
handle specific cases, e.g. reader or GDAL errors.

Useful modules
--------------
- [`api`] — high-level entry points: open, prepare, retrieve, write.
- [`config`] — the built-in (variable, source) registry and its tables.
- [`core`] — harmonization, geometry, feature assembly, domain/output flags.
- [`io`] — SAFE, FORCE, and single-file readers plus GeoTIFF writers.
- [`nets`] — the ensemble boundary embedders implement.
- [`types`] — `Variable`, `Source`, `Resolution`.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod nets;
pub mod types;

// Curated public API surface
pub use error::{Error, Result};
pub use types::{Resolution, Source, Variable};

pub use config::{Registry, VariableConfig};
pub use core::{Scene, SceneMeta};
pub use io::ReaderError;
pub use io::gdal::{GdalError, GdalMetadata, GdalRasterReader};
pub use nets::{NetEnsemble, NetError, NetProvider};

pub use api::{Retrieval, open_scene, prepare_scene, retrieve, write_retrieval};
