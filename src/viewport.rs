//! Recommended render-target clamping.
//!
//! A resolution hint only: the runtime's recommended image height is reduced
//! to match the target aspect so the application does not render rows the
//! clamped FOV throws away. Independent of the FOV transform.

#![forbid(unsafe_code)]

use num_traits::ToPrimitive;

use crate::aspect::TargetAspect;

/// Recommended height for a `width × height` view presented at `target`.
///
/// Views already at or wider than the target keep their height. Narrower
/// views get `round(width / target)`, never less than 1.
///
/// ```
/// use widescreen_fov::{TargetAspect, clamp_recommended_height};
///
/// assert_eq!(clamp_recommended_height(2000, 2000, TargetAspect::WIDESCREEN), 1125);
/// assert_eq!(clamp_recommended_height(1600, 900, TargetAspect::WIDESCREEN), 900);
/// ```
pub fn clamp_recommended_height(width: u32, height: u32, target: TargetAspect) -> u32 {
    let target = target.get();
    if f64::from(width) / f64::from(height) >= target {
        return height;
    }
    (f64::from(width) / target)
        .round()
        .to_u32()
        .map_or(height, |h| h.max(1))
}
