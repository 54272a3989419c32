//! Vertical field-of-view clamping.
//!
//! Narrows a view frustum to a [`TargetAspect`] by trimming its vertical
//! extent. All arithmetic happens on tangents in `f64`; the `f32` angles are
//! only written once, at the end. Single precision arithmetic jitters
//! visibly near the image center at typical headset FOVs.
//!
//! # Example
//!
//! ```
//! use widescreen_fov::{Fov, FovClamp, TargetAspect, clamp_vertical_fov};
//!
//! // 90° × 90° square frustum.
//! let quarter = core::f32::consts::FRAC_PI_4;
//! let mut fov = Fov::new(-quarter, quarter, quarter, -quarter);
//!
//! let outcome = clamp_vertical_fov(&mut fov, TargetAspect::WIDESCREEN);
//! assert!(matches!(outcome, FovClamp::Trimmed { .. }));
//! assert!((fov.aspect() - 16.0 / 9.0).abs() < 1e-6);
//! ```

#![forbid(unsafe_code)]

use crate::aspect::TargetAspect;

/// Frustums this close below the target already count as clamped, so
/// re-clamping an `f32` result does not keep nudging it by rounding noise.
const ASPECT_EPSILON: f64 = 1e-6;

/// View frustum as four signed angles in radians.
///
/// `angle_left` and `angle_down` are normally negative. Field order and
/// layout match `XrFovf`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Fov {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

impl Fov {
    /// Create a frustum from its four boundary angles.
    pub const fn new(angle_left: f32, angle_right: f32, angle_up: f32, angle_down: f32) -> Self {
        Self {
            angle_left,
            angle_right,
            angle_up,
            angle_down,
        }
    }

    /// Width / height in tangent space.
    pub fn aspect(&self) -> f64 {
        TangentFov::from_fov(self).aspect()
    }
}

/// Frustum boundaries as tangents. Left and down are negative.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct TangentFov {
    pub(crate) left: f64,
    pub(crate) right: f64,
    pub(crate) up: f64,
    pub(crate) down: f64,
}

impl TangentFov {
    pub(crate) fn from_fov(fov: &Fov) -> Self {
        Self {
            left: f64::from(fov.angle_left).tan(),
            right: f64::from(fov.angle_right).tan(),
            up: f64::from(fov.angle_up).tan(),
            down: f64::from(fov.angle_down).tan(),
        }
    }

    fn width(&self) -> f64 {
        self.left.abs() + self.right.abs()
    }

    fn height(&self) -> f64 {
        self.up.abs() + self.down.abs()
    }

    pub(crate) fn aspect(&self) -> f64 {
        self.width() / self.height()
    }
}

/// What [`clamp_vertical_fov`] did to a frustum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FovClamp {
    /// Already at or wider than the target; nothing was written.
    Unchanged,
    /// Equal tangent amount removed from top and bottom. Optical center kept.
    Trimmed {
        /// Tangent removed from each side.
        delta: f64,
    },
    /// One side could not spare the trim; both vertical tangents scaled.
    Scaled {
        /// Factor applied to the up and down tangents.
        scale: f64,
    },
}

impl FovClamp {
    /// Whether the frustum was modified.
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Clamp `fov` so its tangent-space aspect ratio equals `target`.
///
/// Frustums already at or wider than the target are left bit-for-bit
/// untouched. Otherwise the vertical extent shrinks by a symmetric trim when
/// both halves can spare it, else by proportional scaling. Both paths reach
/// the target ratio. Horizontal angles are never modified.
pub fn clamp_vertical_fov(fov: &mut Fov, target: TargetAspect) -> FovClamp {
    let tangents = TangentFov::from_fov(fov);
    let (clamped, outcome) = clamp_tangents(tangents, target);
    if outcome.is_changed() {
        fov.angle_up = clamped.up.atan() as f32;
        fov.angle_down = clamped.down.atan() as f32;
    }
    outcome
}

pub(crate) fn clamp_tangents(mut t: TangentFov, target: TargetAspect) -> (TangentFov, FovClamp) {
    let target = target.get();
    let width = t.width();
    let height = t.height();
    if width / height >= target - ASPECT_EPSILON {
        return (t, FovClamp::Unchanged);
    }

    let desired_height = width / target;
    let delta = (height - desired_height) * 0.5;
    // Trimming may bring a half-angle to zero but never across it.
    let max_trim = t.up.abs().min(t.down.abs());

    if delta <= max_trim {
        t.up -= delta;
        t.down += delta;
        (t, FovClamp::Trimmed { delta })
    } else {
        let scale = desired_height / height;
        t.up *= scale;
        t.down *= scale;
        (t, FovClamp::Scaled { scale })
    }
}
