//! Resolution harmonization: bring every angle/mask field onto the pixel grid
//! of the anchor reflectance band before feature assembly.
use tracing::{debug, info};

use crate::core::resample::{resize_bilinear, resize_nearest_u8};
use crate::core::scene::Scene;
use crate::error::{Error, Result};

/// Continuous geometry fields resampled bilinearly.
pub const ANGLE_FIELDS: [&str; 4] = ["SZA", "SAA", "VZA", "VAA"];

/// Categorical quality mask, resampled nearest-neighbor with a u8 cast.
pub const MASK_FIELD: &str = "SCL";

/// Resample the angle and mask fields to the anchor band's shape. Fields
/// whose shapes already match pass through untouched, so a second application
/// is a no-op. Ends with an invariant sweep: every field must share the
/// anchor shape.
pub fn harmonize(scene: &mut Scene, anchor_band: &str) -> Result<()> {
    let target = scene.field(anchor_band)?.dim();

    for key in ANGLE_FIELDS {
        let resampled = match scene.get(key) {
            Some(field) if field.dim() != target => {
                info!(
                    "resampling {} from {:?} to {:?}",
                    key,
                    field.dim(),
                    target
                );
                Some(resize_bilinear(field, target)?)
            }
            _ => None,
        };
        if let Some(field) = resampled {
            scene.insert(key, field);
        }
    }

    let resampled_mask = match scene.get(MASK_FIELD) {
        Some(mask) if mask.dim() != target => {
            info!(
                "resampling {} from {:?} to {:?} (nearest)",
                MASK_FIELD,
                mask.dim(),
                target
            );
            Some(resize_nearest_u8(mask, target)?)
        }
        _ => None,
    };
    if let Some(mask) = resampled_mask {
        scene.insert(MASK_FIELD, mask);
    }

    // Invariant: one shape across the scene. A violation here means a reader
    // produced mismatched reflectance grids, which harmonization does not
    // repair.
    for (name, field) in scene.iter() {
        if field.dim() != target {
            return Err(Error::ShapeMismatch {
                field: name.to_string(),
                expected: target,
                actual: field.dim(),
            });
        }
    }
    debug!("scene harmonized to {:?}", target);
    Ok(())
}
