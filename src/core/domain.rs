//! Input-domain validation: quantize the scaled reflectance planes into a
//! per-pixel decimal-packed code and flag pixels whose code is absent from
//! the configured allow-list.
//!
//! The encoding is a lookup key tied to a precomputed allow-list, not a
//! physical quantity. Rounding direction (ceil), working precision (single,
//! like the feature tensor), modulo semantics (non-negative remainder), and
//! positional weighting (band k contributes `digit * 10^k`) must match the
//! list generator bit-for-bit.
use ndarray::{Array2, Array3, Axis};

use crate::config::VariableConfig;
use crate::core::scene::Scene;
use crate::error::Result;

/// Pack the already-scaled band planes of `features` into one code per pixel.
/// Band order follows the configuration; the first qualifying band is the
/// least significant digit.
pub fn encode_codes(features: &Array3<f32>, cfg: &VariableConfig) -> Array2<u32> {
    let (_, rows, cols) = features.dim();
    let mut codes = Array2::<u32>::zeros((rows, cols));
    let mut band_pos = 0u32;
    for (plane_idx, &name) in cfg.features.iter().enumerate() {
        if !name.starts_with('B') {
            continue;
        }
        let weight = 10u32.pow(band_pos);
        let plane = features.index_axis(Axis(0), plane_idx);
        ndarray::Zip::from(&mut codes).and(&plane).for_each(|code, &v| {
            // The multiply stays in f32: products landing on the single
            // precision tie round to even before ceil (0.3f32 * 10 is 3.0,
            // not 3.0000001), and the allow-list was generated that way.
            let digit = ((v * 10.0f32).ceil() as i64).rem_euclid(10) as u32;
            *code += digit * weight;
        });
        band_pos += 1;
    }
    codes
}

/// Per-pixel input flag: `true` marks a pixel whose domain code is not in the
/// allow-list (out of the trained operating envelope).
pub fn invalid_input(features: &Array3<f32>, cfg: &VariableConfig) -> Array2<bool> {
    let codes = encode_codes(features, cfg);
    codes.mapv(|code| cfg.domain_codes.binary_search(&code).is_err())
}

/// Convenience wrapper assembling the feature tensor from a harmonized scene
/// before flagging.
pub fn invalid_input_scene(scene: &Scene, cfg: &VariableConfig) -> Result<Array2<bool>> {
    let features = crate::core::features::assemble(scene, cfg)?;
    Ok(invalid_input(&features, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Source, Variable};
    use ndarray::Array3;
    use std::sync::Arc;

    fn config_with(features: Vec<&'static str>, codes: Vec<u32>) -> VariableConfig {
        let n = features.len();
        VariableConfig {
            variable: Variable::Lai,
            source: Source::S2Sr,
            features,
            offsets: vec![0.0; n],
            scales: vec![1.0; n],
            num_nets: 1,
            domain_codes: Arc::from(codes),
            output_range: (0.0, 8.0),
        }
    }

    #[test]
    fn digits_pack_least_significant_first() {
        // scaled values 0.3 and 0.7 -> digits 3 and 7 -> code 73, not 37
        let mut features = Array3::<f32>::zeros((2, 1, 1));
        features[[0, 0, 0]] = 0.3;
        features[[1, 0, 0]] = 0.7;
        let cfg = config_with(vec!["B03", "B04"], vec![]);
        let codes = encode_codes(&features, &cfg);
        assert_eq!(codes[[0, 0]], 73);
    }

    #[test]
    fn geometry_planes_do_not_contribute() {
        let mut features = Array3::<f32>::zeros((3, 1, 1));
        features[[0, 0, 0]] = 0.9; // cosVZA, skipped
        features[[1, 0, 0]] = 0.3;
        features[[2, 0, 0]] = 0.2;
        let cfg = config_with(vec!["cosVZA", "B03", "B04"], vec![]);
        assert_eq!(encode_codes(&features, &cfg)[[0, 0]], 23);
    }

    #[test]
    fn ceil_and_modulo_match_reference_semantics() {
        let cfg = config_with(vec!["B03"], vec![]);
        let case = |v: f32| {
            let mut f = Array3::<f32>::zeros((1, 1, 1));
            f[[0, 0, 0]] = v;
            encode_codes(&f, &cfg)[[0, 0]]
        };
        assert_eq!(case(0.3), 3); // ceil(3.0) = 3
        assert_eq!(case(0.25), 3); // ceil(2.5) = 3
        assert_eq!(case(1.05), 1); // ceil(10.5) = 11 -> 1
        assert_eq!(case(-0.35), 7); // ceil(-3.5) = -3 -> rem_euclid 7
        assert_eq!(case(0.0), 0);
    }

    #[test]
    fn products_round_in_single_precision_before_ceil() {
        // 0.3f32 and 0.6f32 sit above their decimal values; the f32 product
        // lands exactly on the tie and rounds to the even integer, so ceil
        // sees 3.0 / 6.0. A double-precision multiply would see 3.0000001 /
        // 6.0000002 and yield digits 4 / 7 instead.
        let cfg = config_with(vec!["B03"], vec![]);
        let case = |v: f32| {
            let mut f = Array3::<f32>::zeros((1, 1, 1));
            f[[0, 0, 0]] = v;
            encode_codes(&f, &cfg)[[0, 0]]
        };
        assert_eq!(case(0.3), 3);
        assert_eq!(case(0.6), 6);
    }

    #[test]
    fn flag_true_iff_code_absent_from_allow_list() {
        let mut features = Array3::<f32>::zeros((2, 1, 2));
        features[[0, 0, 0]] = 0.3;
        features[[1, 0, 0]] = 0.7; // code 73, listed
        features[[0, 0, 1]] = 0.9;
        features[[1, 0, 1]] = 0.9; // code 99, not listed
        let cfg = config_with(vec!["B03", "B04"], vec![11, 73]);
        let flag = invalid_input(&features, &cfg);
        assert_eq!(flag.dim(), (1, 2));
        assert!(!flag[[0, 0]]);
        assert!(flag[[0, 1]]);
    }

    #[test]
    fn constant_reflectance_scene_is_in_domain() {
        // raw 3000, offset -1000, scale 0.0001f32 -> 0.19999999 per band,
        // ceil(1.9999999) = 2 -> digit 2 each
        let bands = ["B03", "B04", "B05", "B06"];
        let mut cfg = config_with(bands.to_vec(), vec![2222]);
        cfg.offsets = vec![-1000.0; 4];
        cfg.scales = vec![0.0001; 4];

        let mut scene = crate::core::scene::Scene::new(
            crate::core::scene::SceneMeta::unreferenced(8, 8),
        );
        for b in bands {
            scene.insert(b, ndarray::Array2::from_elem((8, 8), 3000.0));
        }
        let flag = invalid_input_scene(&scene, &cfg).unwrap();
        assert_eq!(flag.dim(), (8, 8));
        assert!(flag.iter().all(|&f| !f));
    }
}
