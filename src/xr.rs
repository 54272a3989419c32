//! `#[repr(C)]` mirrors of the OpenXR 1.0 types this layer touches.
//!
//! Only the structures, constants and function-pointer types reachable from
//! the negotiation handshake, instance creation and the two hooked view calls
//! are declared. Layouts follow `openxr.h` and `openxr_loader_negotiation.h`.

use core::ffi::{c_char, c_void};
use core::fmt;

use crate::fov::Fov;

pub const MAX_APPLICATION_NAME_SIZE: usize = 128;
pub const MAX_ENGINE_NAME_SIZE: usize = 128;
pub const MAX_API_LAYER_NAME_SIZE: usize = 256;
pub const API_LAYER_MAX_SETTINGS_PATH_SIZE: usize = 512;

/// `XrResult`. Non-negative values are successes.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const SUCCESS: Self = Self(0);
    pub const TIMEOUT_EXPIRED: Self = Self(1);
    pub const ERROR_RUNTIME_FAILURE: Self = Self(-2);
    pub const ERROR_INITIALIZATION_FAILED: Self = Self(-6);
    pub const ERROR_FUNCTION_UNSUPPORTED: Self = Self(-7);
    pub const ERROR_SIZE_INSUFFICIENT: Self = Self(-11);

    pub fn is_success(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::SUCCESS => f.write_str("XR_SUCCESS"),
            Self::ERROR_INITIALIZATION_FAILED => f.write_str("XR_ERROR_INITIALIZATION_FAILED"),
            Self(code) => write!(f, "XrResult({code})"),
        }
    }
}

/// `XrVersion`: 16-bit major, 16-bit minor, 32-bit patch.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u64);

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u32) -> Self {
        Self(((major as u64) << 48) | ((minor as u64) << 32) | patch as u64)
    }

    pub const fn major(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub const fn minor(self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub const fn patch(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: Self = Self(0);
        }
    };
}

handle!(
    /// `XrInstance`.
    Instance
);
handle!(
    /// `XrSession`.
    Session
);
handle!(
    /// `XrSpace`.
    Space
);

/// `XrSystemId`.
pub type SystemId = u64;
/// `XrTime`, nanoseconds.
pub type Time = i64;

/// `XrBool32`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bool32(pub u32);

impl Bool32 {
    pub const FALSE: Self = Self(0);
    pub const TRUE: Self = Self(1);
}

/// `XrStructureType`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructureType(pub i32);

impl StructureType {
    pub const INSTANCE_CREATE_INFO: Self = Self(3);
    pub const VIEW_LOCATE_INFO: Self = Self(6);
    pub const VIEW: Self = Self(7);
    pub const VIEW_STATE: Self = Self(11);
    pub const VIEW_CONFIGURATION_VIEW: Self = Self(41);
    pub const VIEW_CONFIGURATION_PROPERTIES: Self = Self(45);
}

/// `XrViewConfigurationType`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ViewConfigurationType(pub i32);

impl ViewConfigurationType {
    pub const PRIMARY_MONO: Self = Self(1);
    pub const PRIMARY_STEREO: Self = Self(2);
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Quaternionf {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Posef {
    pub orientation: Quaternionf,
    pub position: Vector3f,
}

/// `XrView`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct View {
    pub ty: StructureType,
    pub next: *mut c_void,
    pub pose: Posef,
    pub fov: Fov,
}

impl View {
    pub fn empty() -> Self {
        Self {
            ty: StructureType::VIEW,
            next: core::ptr::null_mut(),
            pose: Posef::default(),
            fov: Fov::default(),
        }
    }
}

/// `XrViewState`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewState {
    pub ty: StructureType,
    pub next: *mut c_void,
    pub view_state_flags: u64,
}

impl ViewState {
    pub fn empty() -> Self {
        Self {
            ty: StructureType::VIEW_STATE,
            next: core::ptr::null_mut(),
            view_state_flags: 0,
        }
    }
}

/// `XrViewLocateInfo`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewLocateInfo {
    pub ty: StructureType,
    pub next: *const c_void,
    pub view_configuration_type: ViewConfigurationType,
    pub display_time: Time,
    pub space: Space,
}

/// `XrViewConfigurationView`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewConfigurationView {
    pub ty: StructureType,
    pub next: *mut c_void,
    pub recommended_image_rect_width: u32,
    pub max_image_rect_width: u32,
    pub recommended_image_rect_height: u32,
    pub max_image_rect_height: u32,
    pub recommended_swapchain_sample_count: u32,
    pub max_swapchain_sample_count: u32,
}

impl ViewConfigurationView {
    pub fn empty() -> Self {
        Self {
            ty: StructureType::VIEW_CONFIGURATION_VIEW,
            next: core::ptr::null_mut(),
            recommended_image_rect_width: 0,
            max_image_rect_width: 0,
            recommended_image_rect_height: 0,
            max_image_rect_height: 0,
            recommended_swapchain_sample_count: 0,
            max_swapchain_sample_count: 0,
        }
    }
}

/// `XrViewConfigurationProperties`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ViewConfigurationProperties {
    pub ty: StructureType,
    pub next: *mut c_void,
    pub view_configuration_type: ViewConfigurationType,
    pub fov_mutable: Bool32,
}

/// `XrApplicationInfo`.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct ApplicationInfo {
    pub application_name: [c_char; MAX_APPLICATION_NAME_SIZE],
    pub application_version: u32,
    pub engine_name: [c_char; MAX_ENGINE_NAME_SIZE],
    pub engine_version: u32,
    pub api_version: Version,
}

/// `XrInstanceCreateInfo`.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct InstanceCreateInfo {
    pub ty: StructureType,
    pub next: *const c_void,
    pub create_flags: u64,
    pub application_info: ApplicationInfo,
    pub enabled_api_layer_count: u32,
    pub enabled_api_layer_names: *const *const c_char,
    pub enabled_extension_count: u32,
    pub enabled_extension_names: *const *const c_char,
}

/// `XrLoaderInterfaceStructs`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LoaderInterfaceStruct(pub i32);

impl LoaderInterfaceStruct {
    pub const LOADER_INFO: Self = Self(1);
    pub const API_LAYER_REQUEST: Self = Self(2);
    pub const RUNTIME_REQUEST: Self = Self(3);
    pub const API_LAYER_CREATE_INFO: Self = Self(4);
    pub const API_LAYER_NEXT_INFO: Self = Self(5);
}

pub const LOADER_INFO_STRUCT_VERSION: u32 = 1;
pub const API_LAYER_INFO_STRUCT_VERSION: u32 = 1;
pub const API_LAYER_CREATE_INFO_STRUCT_VERSION: u32 = 1;
pub const API_LAYER_NEXT_INFO_STRUCT_VERSION: u32 = 1;
pub const CURRENT_LOADER_API_LAYER_VERSION: u32 = 1;
/// API version this layer was written against.
pub const CURRENT_API_VERSION: Version = Version::new(1, 0, 34);

/// `XrNegotiateLoaderInfo`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NegotiateLoaderInfo {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub min_interface_version: u32,
    pub max_interface_version: u32,
    pub min_api_version: Version,
    pub max_api_version: Version,
}

/// `XrNegotiateApiLayerRequest`.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct NegotiateApiLayerRequest {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub layer_interface_version: u32,
    pub layer_api_version: Version,
    pub get_instance_proc_addr: Option<pfn::GetInstanceProcAddr>,
    pub create_api_layer_instance: Option<pfn::CreateApiLayerInstance>,
}

/// `XrApiLayerNextInfo`: one link of the layer chain below this layer.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct ApiLayerNextInfo {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub layer_name: [c_char; MAX_API_LAYER_NAME_SIZE],
    pub next_get_instance_proc_addr: Option<pfn::GetInstanceProcAddr>,
    pub next_create_api_layer_instance: Option<pfn::CreateApiLayerInstance>,
    pub next: *mut ApiLayerNextInfo,
}

/// `XrApiLayerCreateInfo`.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct ApiLayerCreateInfo {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub loader_instance: *mut c_void,
    pub settings_file_location: [c_char; API_LAYER_MAX_SETTINGS_PATH_SIZE],
    pub next_info: *mut ApiLayerNextInfo,
}

/// Function-pointer types. `extern "system"` matches `XRAPI_CALL`.
pub mod pfn {
    use core::ffi::c_char;

    use super::{
        ApiLayerCreateInfo, Instance, InstanceCreateInfo, ResultCode, Session, SystemId, View,
        ViewConfigurationProperties, ViewConfigurationType, ViewConfigurationView, ViewLocateInfo,
        ViewState,
    };

    pub type VoidFunction = unsafe extern "system" fn();

    pub type GetInstanceProcAddr = unsafe extern "system" fn(
        instance: Instance,
        name: *const c_char,
        function: *mut Option<VoidFunction>,
    ) -> ResultCode;

    pub type CreateApiLayerInstance = unsafe extern "system" fn(
        info: *const InstanceCreateInfo,
        layer_info: *const ApiLayerCreateInfo,
        instance: *mut Instance,
    ) -> ResultCode;

    pub type LocateViews = unsafe extern "system" fn(
        session: Session,
        locate_info: *const ViewLocateInfo,
        view_state: *mut ViewState,
        view_capacity_input: u32,
        view_count_output: *mut u32,
        views: *mut View,
    ) -> ResultCode;

    pub type EnumerateViewConfigurationViews = unsafe extern "system" fn(
        instance: Instance,
        system_id: SystemId,
        view_configuration_type: ViewConfigurationType,
        view_capacity_input: u32,
        view_count_output: *mut u32,
        views: *mut ViewConfigurationView,
    ) -> ResultCode;

    pub type GetViewConfigurationProperties = unsafe extern "system" fn(
        instance: Instance,
        system_id: SystemId,
        view_configuration_type: ViewConfigurationType,
        properties: *mut ViewConfigurationProperties,
    ) -> ResultCode;
}

/// Text of a fixed-size, NUL-terminated `char` array. Stops at the first NUL
/// or the end of the buffer; invalid UTF-8 is replaced.
pub fn fixed_str(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Copy `s` into a fixed-size `char` array, truncating so a NUL always fits.
pub fn to_fixed<const N: usize>(s: &str) -> [c_char; N] {
    let mut buf = [0 as c_char; N];
    for (dst, &src) in buf.iter_mut().zip(s.as_bytes().iter().take(N.saturating_sub(1))) {
        *dst = src as c_char;
    }
    buf
}
