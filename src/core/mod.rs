//! Core pipeline stages: the canonical [`Scene`] container, grid
//! harmonization, geometry derivation, feature assembly, and the domain and
//! output validators. These are the building blocks consumed by the
//! high-level `api` module.
pub mod domain;
pub mod features;
pub mod geometry;
pub mod harmonize;
pub mod output;
pub mod resample;
pub mod scene;

pub use scene::{Scene, SceneMeta};
