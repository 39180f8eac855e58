//! Shared types and enums used across the crate.
//! Includes the retrieved `Variable`, the input `Source` layout, and the
//! resolution tier for SAFE archives.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Biophysical variable retrieved by the network ensembles.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Variable {
    Lai,
    Fapar,
    Fcover,
    Albedo,
    Ccc,
    Cwc,
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Variable::Lai => "LAI",
            Variable::Fapar => "fAPAR",
            Variable::Fcover => "fCOVER",
            Variable::Albedo => "Albedo",
            Variable::Ccc => "CCC",
            Variable::Cwc => "CWC",
        };
        write!(f, "{}", s)
    }
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::Lai,
        Variable::Fapar,
        Variable::Fcover,
        Variable::Albedo,
        Variable::Ccc,
        Variable::Cwc,
    ];
}

/// Input product layout. Each source selects one reader strategy and one
/// network configuration (20 m or 10 m feature set).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Source {
    /// SAFE archive, 20 m bands, angles from MTD_TL.xml
    S2Sr,
    /// SAFE archive, 10 m bands, angles from MTD_TL.xml
    S2Sr10m,
    /// FORCE ARD tile: one GeoTIFF per band plus angle rasters
    S2Force,
    /// Single packed 10 m GeoTIFF plus a SAFE directory for angles
    S2SingleTif,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Source {
    /// Canonical configuration-table key for this source.
    pub fn name(&self) -> &'static str {
        match self {
            Source::S2Sr => "S2_SR",
            Source::S2Sr10m => "S2_SR_10m",
            Source::S2Force => "S2_FORCE",
            Source::S2SingleTif => "S2_SINGLE_TIF",
        }
    }

    pub const ALL: [Source; 4] = [
        Source::S2Sr,
        Source::S2Sr10m,
        Source::S2Force,
        Source::S2SingleTif,
    ];
}

impl ValueEnum for Source {
    fn value_variants<'a>() -> &'a [Self] {
        &Source::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Source::S2Sr => clap::builder::PossibleValue::new("s2-sr"),
            Source::S2Sr10m => clap::builder::PossibleValue::new("s2-sr-10m"),
            Source::S2Force => clap::builder::PossibleValue::new("force"),
            Source::S2SingleTif => clap::builder::PossibleValue::new("single-tif"),
        })
    }
}

/// SAFE IMG_DATA resolution tier (R10m / R20m / R60m).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Resolution {
    #[value(name = "10")]
    M10,
    #[value(name = "20")]
    M20,
    #[value(name = "60")]
    M60,
}

impl Resolution {
    pub fn meters(&self) -> u32 {
        match self {
            Resolution::M10 => 10,
            Resolution::M20 => 20,
            Resolution::M60 => 60,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.meters())
    }
}
