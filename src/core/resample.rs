//! Grid resampling for scene fields. Continuous fields (reflectance, angles)
//! are resampled with bilinear convolution; categorical fields (the SCL mask)
//! with nearest-neighbor and a cast back to u8 values.
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::Array2;

use crate::error::{Error, Result};

fn resize_f32_plane(
    data: &Array2<f64>,
    target: (usize, usize),
    alg: ResizeAlg,
) -> Result<Array2<f64>> {
    let (rows, cols) = data.dim();
    let (target_rows, target_cols) = target;
    if rows == 0 || cols == 0 || target_rows == 0 || target_cols == 0 {
        return Err(Error::InvalidArgument {
            arg: "resample shape",
            value: format!("{}x{} -> {}x{}", rows, cols, target_rows, target_cols),
        });
    }

    // fast_image_resize consumes raw little-endian bytes per pixel type
    let mut src_bytes = Vec::with_capacity(rows * cols * 4);
    for &v in data.iter() {
        src_bytes.extend_from_slice(&(v as f32).to_le_bytes());
    }

    let src_image = Image::from_vec_u8(cols as u32, rows as u32, src_bytes, PixelType::F32)
        .map_err(|e| Error::config(format!("resample source image: {}", e)))?;
    let mut dst_image = Image::new(target_cols as u32, target_rows as u32, PixelType::F32);
    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &ResizeOptions::new().resize_alg(alg))
        .map_err(|e| Error::config(format!("resample: {}", e)))?;

    let dst_bytes = dst_image.into_vec();
    let mut out = Vec::with_capacity(target_rows * target_cols);
    for chunk in dst_bytes.chunks_exact(4) {
        out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64);
    }
    Array2::from_shape_vec((target_rows, target_cols), out).map_err(|_| Error::ShapeMismatch {
        field: "resample output".to_string(),
        expected: (target_rows, target_cols),
        actual: (0, 0),
    })
}

/// Bilinear resampling for continuous fields.
pub fn resize_bilinear(data: &Array2<f64>, target: (usize, usize)) -> Result<Array2<f64>> {
    resize_f32_plane(data, target, ResizeAlg::Convolution(FilterType::Bilinear))
}

/// Nearest-neighbor resampling for categorical fields, with the result cast
/// through u8 so class labels stay exact.
pub fn resize_nearest_u8(data: &Array2<f64>, target: (usize, usize)) -> Result<Array2<f64>> {
    let out = resize_f32_plane(data, target, ResizeAlg::Nearest)?;
    Ok(out.mapv(|v| v as u8 as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_preserves_constant_field() {
        let field = Array2::from_elem((10, 10), 42.5);
        let out = resize_bilinear(&field, (100, 100)).unwrap();
        assert_eq!(out.dim(), (100, 100));
        for &v in out.iter() {
            assert!((v - 42.5).abs() < 1e-4, "got {}", v);
        }
    }

    #[test]
    fn nearest_keeps_categorical_constant_exact() {
        let field = Array2::from_elem((10, 10), 5.0);
        let out = resize_nearest_u8(&field, (100, 100)).unwrap();
        assert_eq!(out.dim(), (100, 100));
        assert!(out.iter().all(|&v| v == 5.0));
    }

    #[test]
    fn downsample_shapes() {
        let field = Array2::from_elem((100, 100), 1.0);
        let out = resize_bilinear(&field, (50, 50)).unwrap();
        assert_eq!(out.dim(), (50, 50));
    }

    #[test]
    fn zero_target_rejected() {
        let field = Array2::from_elem((4, 4), 1.0);
        assert!(resize_bilinear(&field, (0, 4)).is_err());
    }
}
