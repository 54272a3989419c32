//! Symbols the OpenXR loader calls.
//!
//! The loader only knows the negotiation function by name. Every other entry
//! point is handed out as a pointer and lands in one of the trampolines here,
//! which look up the current [`Layer`] and forward to it.

use std::ffi::c_char;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{error, warn};

use crate::config::{IniFile, LayerSettings};
use crate::layer::Layer;
use crate::negotiate::{self, EntryPoints};
use crate::paths::LayerPaths;
use crate::xr::{
    ApiLayerCreateInfo, Instance, InstanceCreateInfo, NegotiateApiLayerRequest,
    NegotiateLoaderInfo, ResultCode, Session, SystemId, View, ViewConfigurationType,
    ViewConfigurationView, ViewLocateInfo, ViewState, pfn,
};

static SETTINGS: OnceLock<LayerSettings> = OnceLock::new();
static ACTIVE_LAYER: RwLock<Option<Arc<Layer>>> = RwLock::new(None);

/// Process-wide settings. The first call discovers the layer home, starts
/// logging and reads the settings file.
pub fn settings() -> &'static LayerSettings {
    SETTINGS.get_or_init(|| {
        let paths = LayerPaths::discover();
        crate::logging::init(&paths.log_file());
        LayerSettings::load(&IniFile::new(paths.config_file()))
    })
}

/// The layer of the most recently created instance.
pub fn active_layer() -> Option<Arc<Layer>> {
    ACTIVE_LAYER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn install(layer: Layer) {
    *ACTIVE_LAYER
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(layer));
}

fn entry_points() -> EntryPoints {
    EntryPoints {
        get_instance_proc_addr: xr_get_instance_proc_addr,
        create_api_layer_instance: xr_create_api_layer_instance,
    }
}

/// Loader entry point, named in the layer manifest.
///
/// # Safety
///
/// Called by the OpenXR loader with its negotiation records.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "system" fn widescreen_fov_xrNegotiateLoaderApiLayerInterface(
    loader_info: *const NegotiateLoaderInfo,
    api_layer_name: *const c_char,
    request: *mut NegotiateApiLayerRequest,
) -> ResultCode {
    settings();
    // SAFETY: the loader's records, forwarded.
    unsafe { negotiate::negotiate(loader_info, api_layer_name, request, entry_points()) }
}

unsafe extern "system" fn xr_create_api_layer_instance(
    create_info: *const InstanceCreateInfo,
    layer_info: *const ApiLayerCreateInfo,
    instance: *mut Instance,
) -> ResultCode {
    // SAFETY: the loader's records, forwarded.
    match unsafe { Layer::create_instance(create_info, layer_info, instance, settings()) } {
        Ok((result, layer)) if result.is_success() => {
            install(layer);
            result
        }
        Ok((result, _)) => {
            warn!(%result, "instance creation failed below this layer");
            result
        }
        Err(error) => {
            warn!(%error, "xrCreateApiLayerInstance validation failed");
            ResultCode::ERROR_INITIALIZATION_FAILED
        }
    }
}

unsafe extern "system" fn xr_get_instance_proc_addr(
    instance: Instance,
    name: *const c_char,
    function: *mut Option<pfn::VoidFunction>,
) -> ResultCode {
    let Some(layer) = active_layer() else {
        error!("xrGetInstanceProcAddr called before instance creation");
        return ResultCode::ERROR_INITIALIZATION_FAILED;
    };
    // SAFETY: forwarded arguments.
    unsafe { layer.get_instance_proc_addr(instance, name, function) }
}

pub(crate) unsafe extern "system" fn xr_locate_views(
    session: Session,
    locate_info: *const ViewLocateInfo,
    view_state: *mut ViewState,
    view_capacity_input: u32,
    view_count_output: *mut u32,
    views: *mut View,
) -> ResultCode {
    let Some(layer) = active_layer() else {
        error!("xrLocateViews called before instance creation");
        return ResultCode::ERROR_INITIALIZATION_FAILED;
    };
    // SAFETY: forwarded arguments.
    unsafe {
        layer.locate_views(
            session,
            locate_info,
            view_state,
            view_capacity_input,
            view_count_output,
            views,
        )
    }
}

pub(crate) unsafe extern "system" fn xr_enumerate_view_configuration_views(
    instance: Instance,
    system_id: SystemId,
    view_configuration_type: ViewConfigurationType,
    view_capacity_input: u32,
    view_count_output: *mut u32,
    views: *mut ViewConfigurationView,
) -> ResultCode {
    let Some(layer) = active_layer() else {
        error!("xrEnumerateViewConfigurationViews called before instance creation");
        return ResultCode::ERROR_INITIALIZATION_FAILED;
    };
    // SAFETY: forwarded arguments.
    unsafe {
        layer.enumerate_view_configuration_views(
            instance,
            system_id,
            view_configuration_type,
            view_capacity_input,
            view_count_output,
            views,
        )
    }
}
