//! Loader handshake validation.
//!
//! The loader hands the layer two records: one at negotiation time
//! ([`NegotiateLoaderInfo`] + [`NegotiateApiLayerRequest`]) and one at
//! instance creation ([`ApiLayerCreateInfo`] pointing at the chain below).
//! Every field is checked against the constants this layer was built for; a
//! single mismatch rejects the whole activation.

use std::ffi::{CStr, c_char};
use std::mem::size_of;

use thiserror::Error;
use tracing::{info, warn};

use crate::xr::{
    self, ApiLayerCreateInfo, ApiLayerNextInfo, LoaderInterfaceStruct, NegotiateApiLayerRequest,
    NegotiateLoaderInfo, ResultCode, Version, pfn,
};

/// Name the loader knows this layer by. Must match the manifest.
pub const LAYER_NAME: &str = "XR_APILAYER_widescreen_fov";
pub const LAYER_NAME_C: &CStr = c"XR_APILAYER_widescreen_fov";

/// A negotiation or create-info record this layer cannot work with.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("loader asked for layer {0:?}, this is {layer}", layer = LAYER_NAME)]
    LayerName(String),

    #[error("{0} pointer is null")]
    NullPointer(&'static str),

    #[error("{record} has struct type {found}, expected {expected}")]
    StructType {
        record: &'static str,
        expected: i32,
        found: i32,
    },

    #[error("{record} has struct version {found}, expected {expected}")]
    StructVersion {
        record: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("{record} has struct size {found}, expected {expected}")]
    StructSize {
        record: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "loader interface versions {min}..={max} do not match {current}",
        current = xr::CURRENT_LOADER_API_LAYER_VERSION
    )]
    InterfaceVersion { min: u32, max: u32 },

    #[error(
        "loader api versions {min}..={max} do not cover {current}",
        current = xr::CURRENT_API_VERSION
    )]
    ApiVersion { min: Version, max: Version },

    #[error("next layer does not provide {0}")]
    MissingNextFunction(&'static str),
}

/// This layer's own entry points, published into the negotiation request.
#[derive(Copy, Clone, Debug)]
pub struct EntryPoints {
    pub get_instance_proc_addr: pfn::GetInstanceProcAddr,
    pub create_api_layer_instance: pfn::CreateApiLayerInstance,
}

/// The part of the chain directly below this layer.
#[derive(Copy, Clone, Debug)]
pub struct NextLayer {
    pub get_instance_proc_addr: pfn::GetInstanceProcAddr,
    pub create_api_layer_instance: pfn::CreateApiLayerInstance,
    /// Link to hand to the next layer's `xrCreateApiLayerInstance`.
    pub remaining: *mut ApiLayerNextInfo,
}

fn check_header(
    record: &'static str,
    struct_type: LoaderInterfaceStruct,
    struct_version: u32,
    struct_size: usize,
    expected_type: LoaderInterfaceStruct,
    expected_version: u32,
    expected_size: usize,
) -> Result<(), NegotiationError> {
    if struct_type != expected_type {
        return Err(NegotiationError::StructType {
            record,
            expected: expected_type.0,
            found: struct_type.0,
        });
    }
    if struct_version != expected_version {
        return Err(NegotiationError::StructVersion {
            record,
            expected: expected_version,
            found: struct_version,
        });
    }
    if struct_size != expected_size {
        return Err(NegotiationError::StructSize {
            record,
            expected: expected_size,
            found: struct_size,
        });
    }
    Ok(())
}

/// Check the layer name the loader is negotiating for. `None` means the
/// loader did not say, which is accepted.
pub fn validate_layer_name(name: Option<&CStr>) -> Result<(), NegotiationError> {
    match name {
        Some(name) if name != LAYER_NAME_C => Err(NegotiationError::LayerName(
            name.to_string_lossy().into_owned(),
        )),
        _ => Ok(()),
    }
}

pub fn validate_loader_info(info: &NegotiateLoaderInfo) -> Result<(), NegotiationError> {
    check_header(
        "XrNegotiateLoaderInfo",
        info.struct_type,
        info.struct_version,
        info.struct_size,
        LoaderInterfaceStruct::LOADER_INFO,
        xr::LOADER_INFO_STRUCT_VERSION,
        size_of::<NegotiateLoaderInfo>(),
    )?;
    let current = xr::CURRENT_LOADER_API_LAYER_VERSION;
    if info.min_interface_version > current || info.max_interface_version != current {
        return Err(NegotiationError::InterfaceVersion {
            min: info.min_interface_version,
            max: info.max_interface_version,
        });
    }
    if info.max_api_version < xr::CURRENT_API_VERSION
        || info.min_api_version > xr::CURRENT_API_VERSION
    {
        return Err(NegotiationError::ApiVersion {
            min: info.min_api_version,
            max: info.max_api_version,
        });
    }
    Ok(())
}

pub fn validate_layer_request(request: &NegotiateApiLayerRequest) -> Result<(), NegotiationError> {
    check_header(
        "XrNegotiateApiLayerRequest",
        request.struct_type,
        request.struct_version,
        request.struct_size,
        LoaderInterfaceStruct::API_LAYER_REQUEST,
        xr::API_LAYER_INFO_STRUCT_VERSION,
        size_of::<NegotiateApiLayerRequest>(),
    )
}

/// Fill `request` with this layer's versions and entry points.
pub fn publish(request: &mut NegotiateApiLayerRequest, entry_points: EntryPoints) {
    request.layer_interface_version = xr::CURRENT_LOADER_API_LAYER_VERSION;
    request.layer_api_version = xr::CURRENT_API_VERSION;
    request.get_instance_proc_addr = Some(entry_points.get_instance_proc_addr);
    request.create_api_layer_instance = Some(entry_points.create_api_layer_instance);
}

/// Validate both negotiation records and publish `entry_points`.
///
/// # Safety
///
/// Non-null pointers must point to valid records; `api_layer_name`, when
/// non-null, must be NUL-terminated.
pub unsafe fn try_negotiate(
    loader_info: *const NegotiateLoaderInfo,
    api_layer_name: *const c_char,
    request: *mut NegotiateApiLayerRequest,
    entry_points: EntryPoints,
) -> Result<(), NegotiationError> {
    // SAFETY: non-null name is NUL-terminated per the caller's contract.
    let name = (!api_layer_name.is_null()).then(|| unsafe { CStr::from_ptr(api_layer_name) });
    validate_layer_name(name)?;

    // SAFETY: valid when non-null per the caller's contract.
    let info = unsafe { loader_info.as_ref() }
        .ok_or(NegotiationError::NullPointer("XrNegotiateLoaderInfo"))?;
    // SAFETY: as above; no other reference to the request exists here.
    let request = unsafe { request.as_mut() }
        .ok_or(NegotiationError::NullPointer("XrNegotiateApiLayerRequest"))?;

    validate_loader_info(info)?;
    validate_layer_request(request)?;
    publish(request, entry_points);
    Ok(())
}

/// [`try_negotiate`] mapped onto the loader's result codes.
///
/// # Safety
///
/// See [`try_negotiate`].
pub unsafe fn negotiate(
    loader_info: *const NegotiateLoaderInfo,
    api_layer_name: *const c_char,
    request: *mut NegotiateApiLayerRequest,
    entry_points: EntryPoints,
) -> ResultCode {
    // SAFETY: forwarded contract.
    match unsafe { try_negotiate(loader_info, api_layer_name, request, entry_points) } {
        Ok(()) => {
            info!("{LAYER_NAME} layer is active");
            ResultCode::SUCCESS
        }
        Err(error) => {
            warn!(%error, "xrNegotiateLoaderApiLayerInterface validation failed");
            ResultCode::ERROR_INITIALIZATION_FAILED
        }
    }
}

/// Validate the create-info record and return the chain below this layer.
///
/// # Safety
///
/// `info.next_info`, when non-null, must point to a valid record.
pub unsafe fn validate_create_info(
    info: &ApiLayerCreateInfo,
) -> Result<NextLayer, NegotiationError> {
    check_header(
        "XrApiLayerCreateInfo",
        info.struct_type,
        info.struct_version,
        info.struct_size,
        LoaderInterfaceStruct::API_LAYER_CREATE_INFO,
        xr::API_LAYER_CREATE_INFO_STRUCT_VERSION,
        size_of::<ApiLayerCreateInfo>(),
    )?;
    // SAFETY: valid when non-null per the caller's contract.
    let next = unsafe { info.next_info.as_ref() }
        .ok_or(NegotiationError::NullPointer("XrApiLayerNextInfo"))?;
    check_header(
        "XrApiLayerNextInfo",
        next.struct_type,
        next.struct_version,
        next.struct_size,
        LoaderInterfaceStruct::API_LAYER_NEXT_INFO,
        xr::API_LAYER_NEXT_INFO_STRUCT_VERSION,
        size_of::<ApiLayerNextInfo>(),
    )?;
    let next_name = xr::fixed_str(&next.layer_name);
    if next_name != LAYER_NAME {
        return Err(NegotiationError::LayerName(next_name));
    }
    let get_instance_proc_addr = next
        .next_get_instance_proc_addr
        .ok_or(NegotiationError::MissingNextFunction("xrGetInstanceProcAddr"))?;
    let create_api_layer_instance = next
        .next_create_api_layer_instance
        .ok_or(NegotiationError::MissingNextFunction("xrCreateApiLayerInstance"))?;
    Ok(NextLayer {
        get_instance_proc_addr,
        create_api_layer_instance,
        remaining: next.next,
    })
}
