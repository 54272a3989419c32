//! Target aspect ratio (width / height) the layer narrows views to.

#![forbid(unsafe_code)]

use core::fmt;
use core::str::FromStr;

/// Width-over-height ratio presented to the application.
///
/// Always finite and within [`TargetAspect::MIN`]`..=`[`TargetAspect::MAX`].
///
/// ```
/// use widescreen_fov::TargetAspect;
///
/// assert_eq!(TargetAspect::default(), TargetAspect::WIDESCREEN);
/// assert!(TargetAspect::new(1.78).is_ok());
/// assert!(TargetAspect::new(4.0).is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct TargetAspect(f64);

impl TargetAspect {
    /// Narrowest accepted ratio (square).
    pub const MIN: f64 = 1.0;
    /// Widest accepted ratio.
    pub const MAX: f64 = 3.0;
    /// 16:9.
    pub const WIDESCREEN: Self = Self(16.0 / 9.0);

    /// Validate a ratio. Inclusive bounds, NaN rejected.
    pub fn new(ratio: f64) -> Result<Self, AspectError> {
        if ratio.is_nan() {
            return Err(AspectError::NotANumber);
        }
        if !(Self::MIN..=Self::MAX).contains(&ratio) {
            return Err(AspectError::OutOfRange(ratio));
        }
        Ok(Self(ratio))
    }

    /// The ratio as `f64`.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for TargetAspect {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl fmt::Display for TargetAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl FromStr for TargetAspect {
    type Err = AspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ratio: f64 = s.trim().parse().map_err(|_| AspectError::NotANumber)?;
        Self::new(ratio)
    }
}

/// Rejected aspect ratio.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum AspectError {
    /// Value is NaN or not numeric text.
    #[error("aspect ratio is not a number")]
    NotANumber,
    /// Value lies outside the accepted range.
    #[error(
        "aspect ratio {0} is outside {min}..={max}",
        min = TargetAspect::MIN,
        max = TargetAspect::MAX
    )]
    OutOfRange(f64),
}
