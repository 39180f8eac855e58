//! Output-range validation: flag estimate pixels outside the configured
//! physical plausibility interval. Bounds are inclusive-valid.
use ndarray::Array2;

/// `1` where the estimate is strictly below `lower` or strictly above
/// `upper`, else `0`.
pub fn invalid_output(estimate: &Array2<f32>, range: (f32, f32)) -> Array2<u8> {
    let (lower, upper) = range;
    estimate.mapv(|v| if v < lower || v > upper { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive_valid() {
        let est = ndarray::arr2(&[[0.0f32, 8.0, -0.001, 8.001, 4.0]]);
        let flag = invalid_output(&est, (0.0, 8.0));
        assert_eq!(flag, ndarray::arr2(&[[0u8, 0, 1, 1, 0]]));
    }

    #[test]
    fn shape_matches_estimate() {
        let est = ndarray::Array2::<f32>::zeros((7, 3));
        assert_eq!(invalid_output(&est, (0.0, 1.0)).dim(), (7, 3));
    }
}
