//! Data tables backing the registry. Feature order is load-bearing: the
//! network weight sets were trained against exactly these input stacks, and
//! the domain-code digit positions follow band order within each list.
use crate::types::{Source, Variable};

/// Per-source constants shared by all six variables.
pub struct SourceSpec {
    /// Reflectance band whose grid defines the canonical pixel shape.
    pub anchor_band: &'static str,
    /// Export/pixel resolution in meters.
    pub resolution_m: u32,
    /// Which network family (and domain list) this source feeds.
    pub network: Network,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Network {
    M20,
    M10,
}

pub fn source_spec(source: Source) -> SourceSpec {
    match source {
        Source::S2Sr => SourceSpec {
            anchor_band: "B02",
            resolution_m: 20,
            network: Network::M20,
        },
        Source::S2Sr10m => SourceSpec {
            anchor_band: "B02",
            resolution_m: 10,
            network: Network::M10,
        },
        Source::S2Force => SourceSpec {
            anchor_band: "B02",
            resolution_m: 20,
            network: Network::M20,
        },
        Source::S2SingleTif => SourceSpec {
            anchor_band: "B02",
            resolution_m: 20,
            network: Network::M10,
        },
    }
}

/// 20 m network input stack: three geometry cosines then eight bands.
pub const FEATURES_20M: &[&str] = &[
    "cosVZA", "cosSZA", "cosRAA", "B03", "B04", "B05", "B06", "B07", "B8A", "B11", "B12",
];

/// 10 m network input stack: three geometry cosines then four bands.
pub const FEATURES_10M: &[&str] = &["cosVZA", "cosSZA", "cosRAA", "B02", "B03", "B04", "B08"];

pub const SCALES_20M: &[f32] = &[
    1.0, 1.0, 1.0, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001, 0.0001,
];

pub const SCALES_10M: &[f32] = &[1.0, 1.0, 1.0, 0.0001, 0.0001, 0.0001, 0.0001];

pub const OFFSETS_20M: &[f32] = &[
    0.0, 0.0, 0.0, -1000.0, -1000.0, -1000.0, -1000.0, -1000.0, -1000.0, -1000.0, -1000.0,
];

pub const OFFSETS_10M: &[f32] = &[0.0, 0.0, 0.0, -1000.0, -1000.0, -1000.0, -1000.0];

/// Packed single-TIF products carry reflectance without the BOA quantification
/// offset, so the stack is scaled with zero offsets.
pub const OFFSETS_10M_ZERO: &[f32] = &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

pub fn feature_table(variable: Variable, source: Source) -> (&'static [&'static str], &'static [f32], &'static [f32]) {
    // All six variables share one input stack per source; only the output
    // side differs.
    let _ = variable;
    match source {
        Source::S2Sr | Source::S2Force => (FEATURES_20M, OFFSETS_20M, SCALES_20M),
        Source::S2Sr10m => (FEATURES_10M, OFFSETS_10M, SCALES_10M),
        Source::S2SingleTif => (FEATURES_10M, OFFSETS_10M_ZERO, SCALES_10M),
    }
}

/// Number of subnetworks per ensemble for a (variable, source) pair.
pub fn ensemble_size(variable: Variable, source: Source) -> usize {
    let _ = (variable, source);
    1
}

/// Physically plausible output interval per variable, bounds inclusive.
pub fn output_range(variable: Variable) -> (f32, f32) {
    match variable {
        Variable::Albedo => (0.0, 0.2),
        Variable::Fapar => (0.0, 1.0),
        Variable::Fcover => (0.0, 1.0),
        Variable::Lai => (0.0, 8.0),
        Variable::Ccc => (0.0, 600.0),
        Variable::Cwc => (0.0, 0.55),
    }
}

/// Sorted domain-code allow-lists, one per network family, shipped with the
/// crate as JSON.
pub const DOMAINS_20M_JSON: &str = include_str!("../../data/domains_20m.json");
pub const DOMAINS_10M_JSON: &str = include_str!("../../data/domains_10m.json");
