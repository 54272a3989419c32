//! OpenXR API layer that narrows the reported field of view to a target
//! aspect ratio.
//!
//! Sits between an application and its OpenXR runtime. For allow-listed
//! applications it clamps the vertical extent of every stereo view returned
//! by `xrLocateViews` and the recommended render-target height returned by
//! `xrEnumerateViewConfigurationViews`, so a tall headset frustum is
//! presented as a widescreen one. Everything else passes through.
//!
//! # Modules
//!
//! - [`aspect`]: validated target aspect ratio
//! - [`fov`]: tangent-space FOV clamp
//! - [`viewport`]: recommended render-target height clamp
//! - [`gate`]: allow-list activation
//! - [`hooks`]: captured downstream implementations
//! - [`negotiate`]: loader handshake validation
//! - [`layer`]: per-instance interception
//! - [`config`], [`paths`], [`logging`]: settings file, layer home, log sink
//! - [`xr`]: `#[repr(C)]` OpenXR types
//!
//! The geometry is usable on its own:
//!
//! ```
//! use widescreen_fov::{Fov, FovClamp, TargetAspect, clamp_recommended_height, clamp_vertical_fov};
//!
//! let quarter = core::f32::consts::FRAC_PI_4;
//! let mut fov = Fov::new(-quarter, quarter, quarter, -quarter);
//! let outcome = clamp_vertical_fov(&mut fov, TargetAspect::WIDESCREEN);
//! assert!(matches!(outcome, FovClamp::Trimmed { .. }));
//! assert!((fov.aspect() - 16.0 / 9.0).abs() < 1e-6);
//!
//! assert_eq!(clamp_recommended_height(2000, 2000, TargetAspect::WIDESCREEN), 1125);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod aspect;
pub mod config;
pub mod export;
pub mod fov;
pub mod gate;
pub mod hooks;
pub mod layer;
pub mod logging;
pub mod negotiate;
pub mod paths;
pub mod viewport;
pub mod xr;

pub use aspect::{AspectError, TargetAspect};
pub use config::{ConfigError, ConfigSource, IniFile, LayerSettings};
pub use export::widescreen_fov_xrNegotiateLoaderApiLayerInterface;
pub use fov::{Fov, FovClamp, clamp_vertical_fov};
pub use gate::{Activation, AllowList};
pub use hooks::{HookTable, HookedSymbol};
pub use layer::Layer;
pub use negotiate::{LAYER_NAME, NegotiationError};
pub use viewport::clamp_recommended_height;
