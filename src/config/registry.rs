use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::config::tables::{self, Network};
use crate::error::{Error, Result};
use crate::types::{Source, Variable};

/// Immutable retrieval configuration for one (variable, source) pair.
///
/// `features`, `offsets`, and `scales` are index-aligned; plane k of the
/// assembled feature tensor is `(scene[features[k]] + offsets[k]) * scales[k]`.
#[derive(Debug, Clone)]
pub struct VariableConfig {
    pub variable: Variable,
    pub source: Source,
    pub features: Vec<&'static str>,
    pub offsets: Vec<f32>,
    pub scales: Vec<f32>,
    /// Subnetwork count per ensemble; the provider must honor it.
    pub num_nets: usize,
    /// Sorted allow-list of per-pixel domain codes. Shared across the six
    /// variables of one source.
    pub domain_codes: Arc<[u32]>,
    /// Inclusive [lower, upper] plausibility interval for the estimate.
    pub output_range: (f32, f32),
}

impl VariableConfig {
    /// Build one configuration from its table rows, rejecting misaligned
    /// feature/offset/scale lists.
    pub fn from_tables(
        variable: Variable,
        source: Source,
        features: &'static [&'static str],
        offsets: &'static [f32],
        scales: &'static [f32],
        num_nets: usize,
        domain_codes: Arc<[u32]>,
        output_range: (f32, f32),
    ) -> Result<Self> {
        if features.len() != offsets.len() || features.len() != scales.len() {
            return Err(Error::config(format!(
                "{}/{}: feature list length {} does not match offsets {} / scales {}",
                variable,
                source,
                features.len(),
                offsets.len(),
                scales.len()
            )));
        }
        Ok(VariableConfig {
            variable,
            source,
            features: features.to_vec(),
            offsets: offsets.to_vec(),
            scales: scales.to_vec(),
            num_nets,
            domain_codes,
            output_range,
        })
    }

    /// Configured feature names denoting a spectral band, in band order.
    /// These are the digits of the domain code.
    pub fn band_features(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.features
            .iter()
            .copied()
            .filter(|f| f.starts_with('B'))
            .enumerate()
    }
}

/// Read-only registry of all built-in (variable, source) configurations.
/// Constructed once at startup and shared by reference across retrievals.
#[derive(Debug)]
pub struct Registry {
    configs: HashMap<(Variable, Source), VariableConfig>,
}

impl Registry {
    /// Build the registry from the compiled-in tables and domain assets.
    pub fn builtin() -> Result<Self> {
        let domains_20m = parse_domains(tables::DOMAINS_20M_JSON, "domains_20m.json")?;
        let domains_10m = parse_domains(tables::DOMAINS_10M_JSON, "domains_10m.json")?;

        let mut configs = HashMap::new();
        for source in Source::ALL {
            let spec = tables::source_spec(source);
            let domains = match spec.network {
                Network::M20 => Arc::clone(&domains_20m),
                Network::M10 => Arc::clone(&domains_10m),
            };
            for variable in Variable::ALL {
                let (features, offsets, scales) = tables::feature_table(variable, source);
                let cfg = VariableConfig::from_tables(
                    variable,
                    source,
                    features,
                    offsets,
                    scales,
                    tables::ensemble_size(variable, source),
                    Arc::clone(&domains),
                    tables::output_range(variable),
                )?;
                configs.insert((variable, source), cfg);
            }
        }
        debug!("registry built: {} configurations", configs.len());
        Ok(Registry { configs })
    }

    pub fn config(&self, variable: Variable, source: Source) -> Result<&VariableConfig> {
        self.configs.get(&(variable, source)).ok_or_else(|| {
            Error::config(format!(
                "no configuration registered for {}/{}",
                variable, source
            ))
        })
    }
}

#[derive(Deserialize)]
#[serde(transparent)]
struct DomainList(Vec<u32>);

fn parse_domains(json: &str, name: &str) -> Result<Arc<[u32]>> {
    let DomainList(codes) = serde_json::from_str(json)
        .map_err(|e| Error::config(format!("{}: {}", name, e)))?;
    if codes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::config(format!(
            "{}: domain codes must be strictly sorted",
            name
        )));
    }
    Ok(codes.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_covers_all_pairs() {
        let reg = Registry::builtin().unwrap();
        for source in Source::ALL {
            for variable in Variable::ALL {
                let cfg = reg.config(variable, source).unwrap();
                assert_eq!(cfg.features.len(), cfg.offsets.len());
                assert_eq!(cfg.features.len(), cfg.scales.len());
                assert!(cfg.num_nets > 0);
                assert!(!cfg.domain_codes.is_empty());
            }
        }
    }

    #[test]
    fn domain_lists_are_sorted() {
        let reg = Registry::builtin().unwrap();
        let cfg = reg.config(Variable::Lai, Source::S2Sr).unwrap();
        assert!(cfg.domain_codes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn twenty_meter_sources_use_eleven_features() {
        let reg = Registry::builtin().unwrap();
        let cfg = reg.config(Variable::Fapar, Source::S2Sr).unwrap();
        assert_eq!(cfg.features.len(), 11);
        assert_eq!(cfg.features[0], "cosVZA");
        assert_eq!(cfg.features[3], "B03");
        assert_eq!(cfg.offsets[3], -1000.0);
        assert_eq!(cfg.scales[3], 0.0001);
    }

    #[test]
    fn single_tif_uses_zero_offsets() {
        let reg = Registry::builtin().unwrap();
        let cfg = reg.config(Variable::Lai, Source::S2SingleTif).unwrap();
        assert!(cfg.offsets.iter().all(|&o| o == 0.0));
    }

    #[test]
    fn mismatched_table_lengths_are_a_config_error() {
        let result = VariableConfig::from_tables(
            Variable::Lai,
            Source::S2Sr,
            &["cosVZA", "B03", "B04"],
            &[0.0, -1000.0],
            &[1.0, 0.0001, 0.0001],
            1,
            Arc::from(vec![0u32]),
            (0.0, 8.0),
        );
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("length 3"), "got {}", msg),
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unsorted_domain_list_is_rejected() {
        let result = parse_domains("[12, 9, 15]", "test-domains");
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("sorted"), "got {}", msg),
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn duplicate_domain_codes_are_rejected() {
        assert!(parse_domains("[5, 5, 9]", "test-domains").is_err());
    }

    #[test]
    fn malformed_domain_json_is_a_config_error() {
        assert!(parse_domains("not json", "test-domains").is_err());
    }

    #[test]
    fn band_features_skip_geometry() {
        let reg = Registry::builtin().unwrap();
        let cfg = reg.config(Variable::Lai, Source::S2Sr10m).unwrap();
        let bands: Vec<_> = cfg.band_features().collect();
        assert_eq!(bands, vec![(0, "B02"), (1, "B03"), (2, "B04"), (3, "B08")]);
    }
}
