//! Per-instance layer context.
//!
//! A [`Layer`] is created when the application creates its `XrInstance`. It
//! owns the resolver of the chain below, the [`HookTable`] of captured
//! downstream implementations, and the activation decided for that
//! application. The intercepted calls always run the downstream
//! implementation first and only post-process successful results while
//! active.

use std::ffi::{CStr, c_char};
use std::{mem, ptr, slice};

use tracing::{debug, error, info, trace};

use crate::aspect::TargetAspect;
use crate::config::LayerSettings;
use crate::fov::clamp_vertical_fov;
use crate::gate::Activation;
use crate::hooks::{HookTable, HookedSymbol};
use crate::negotiate::{self, NegotiationError};
use crate::viewport::clamp_recommended_height;
use crate::xr::{
    self, ApiLayerCreateInfo, Bool32, Instance, InstanceCreateInfo, ResultCode, Session,
    StructureType, SystemId, View, ViewConfigurationProperties, ViewConfigurationType,
    ViewConfigurationView, ViewLocateInfo, ViewState, pfn,
};

/// Interception state for one `XrInstance`.
#[derive(Debug)]
pub struct Layer {
    next_get_instance_proc_addr: pfn::GetInstanceProcAddr,
    hooks: HookTable,
    activation: Activation,
    aspect: TargetAspect,
}

impl Layer {
    pub fn new(
        next_get_instance_proc_addr: pfn::GetInstanceProcAddr,
        activation: Activation,
        aspect: TargetAspect,
    ) -> Self {
        Self {
            next_get_instance_proc_addr,
            hooks: HookTable::new(),
            activation,
            aspect,
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn aspect(&self) -> TargetAspect {
        self.aspect
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    /// `xrCreateApiLayerInstance`: validate the chain, create the instance
    /// below, then decide activation from the application name.
    ///
    /// Validation failures are returned before anything is called. Otherwise
    /// the downstream result is returned with the layer built for it; the
    /// caller decides whether to keep the layer.
    ///
    /// # Safety
    ///
    /// Pointers must be valid as the loader guarantees for this call.
    pub unsafe fn create_instance(
        create_info: *const InstanceCreateInfo,
        layer_info: *const ApiLayerCreateInfo,
        instance: *mut Instance,
        settings: &LayerSettings,
    ) -> Result<(ResultCode, Self), NegotiationError> {
        // SAFETY: valid when non-null per the caller's contract.
        let layer_info = unsafe { layer_info.as_ref() }
            .ok_or(NegotiationError::NullPointer("XrApiLayerCreateInfo"))?;
        // SAFETY: as above.
        let next = unsafe { negotiate::validate_create_info(layer_info) }?;

        let mut chain_info = *layer_info;
        chain_info.next_info = next.remaining;
        // SAFETY: the loader's pointers, forwarded with the chain advanced by one.
        let result = unsafe { (next.create_api_layer_instance)(create_info, &chain_info, instance) };
        debug!(%result, "next xrCreateApiLayerInstance returned");

        // SAFETY: valid when non-null per the caller's contract.
        let application_name = unsafe { create_info.as_ref() }
            .map(|info| xr::fixed_str(&info.application_info.application_name))
            .unwrap_or_default();
        let activation = settings.allow_list.evaluate(&application_name);
        info!(
            application = %application_name,
            "{} for application",
            if activation.is_active() { "ENABLED" } else { "DISABLED" }
        );

        Ok((
            result,
            Self::new(next.get_instance_proc_addr, activation, settings.aspect),
        ))
    }

    /// `xrGetInstanceProcAddr`: resolve through the chain and substitute the
    /// hooked symbols. The downstream result code is returned unchanged.
    ///
    /// # Safety
    ///
    /// Arguments must satisfy the `xrGetInstanceProcAddr` contract.
    pub unsafe fn get_instance_proc_addr(
        &self,
        instance: Instance,
        name: *const c_char,
        function: *mut Option<pfn::VoidFunction>,
    ) -> ResultCode {
        // SAFETY: forwarded arguments.
        let result = unsafe { (self.next_get_instance_proc_addr)(instance, name, function) };
        if result != ResultCode::SUCCESS || name.is_null() || function.is_null() {
            return result;
        }
        // SAFETY: non-null, NUL-terminated per the call contract.
        let name = unsafe { CStr::from_ptr(name) };
        trace!(name = ?name, "resolved");
        let Some(symbol) = HookedSymbol::from_name(name) else {
            return result;
        };
        // SAFETY: `function` is non-null and was just written by the chain.
        unsafe {
            if let Some(resolved) = *function {
                *function = Some(self.hooks.substitute(symbol, resolved));
            }
        }
        result
    }

    /// `xrLocateViews`: clamp each stereo view's FOV while active.
    ///
    /// # Safety
    ///
    /// Arguments must satisfy the `xrLocateViews` contract.
    pub unsafe fn locate_views(
        &self,
        session: Session,
        locate_info: *const ViewLocateInfo,
        view_state: *mut ViewState,
        view_capacity_input: u32,
        view_count_output: *mut u32,
        views: *mut View,
    ) -> ResultCode {
        let Some(next) = self.hooks.locate_views() else {
            error!("xrLocateViews called before it was resolved");
            return ResultCode::ERROR_INITIALIZATION_FAILED;
        };
        // SAFETY: forwarded arguments.
        let result = unsafe {
            next(
                session,
                locate_info,
                view_state,
                view_capacity_input,
                view_count_output,
                views,
            )
        };
        if !self.activation.is_active() || result != ResultCode::SUCCESS {
            return result;
        }
        // SAFETY: valid when non-null per the call contract.
        let stereo = unsafe { locate_info.as_ref() }.is_some_and(|info| {
            info.view_configuration_type == ViewConfigurationType::PRIMARY_STEREO
        });
        if !stereo {
            return result;
        }
        // SAFETY: the runtime wrote this many elements into `views`.
        let views = unsafe { written(views, view_capacity_input, view_count_output) };
        for (index, view) in views.iter_mut().enumerate() {
            let before = view.fov;
            let outcome = clamp_vertical_fov(&mut view.fov, self.aspect);
            trace!(
                index,
                ?outcome,
                from = before.aspect(),
                to = view.fov.aspect(),
                "view fov"
            );
        }
        result
    }

    /// `xrEnumerateViewConfigurationViews`: clamp recommended heights while
    /// active, when the runtime reports the FOV as mutable.
    ///
    /// # Safety
    ///
    /// Arguments must satisfy the `xrEnumerateViewConfigurationViews`
    /// contract.
    pub unsafe fn enumerate_view_configuration_views(
        &self,
        instance: Instance,
        system_id: SystemId,
        view_configuration_type: ViewConfigurationType,
        view_capacity_input: u32,
        view_count_output: *mut u32,
        views: *mut ViewConfigurationView,
    ) -> ResultCode {
        let Some(next) = self.hooks.enumerate_view_configuration_views() else {
            error!("xrEnumerateViewConfigurationViews called before it was resolved");
            return ResultCode::ERROR_INITIALIZATION_FAILED;
        };
        // SAFETY: forwarded arguments.
        let result = unsafe {
            next(
                instance,
                system_id,
                view_configuration_type,
                view_capacity_input,
                view_count_output,
                views,
            )
        };
        if !self.activation.is_active() || result != ResultCode::SUCCESS {
            return result;
        }
        // SAFETY: the runtime wrote this many elements into `views`.
        let views = unsafe { written(views, view_capacity_input, view_count_output) };
        if views.is_empty() {
            return result;
        }
        // SAFETY: forwarded handles from a call that just succeeded.
        if !unsafe { self.fov_mutable(instance, system_id, view_configuration_type) } {
            debug!("fov not mutable, leaving recommended sizes");
            return result;
        }
        for (index, view) in views.iter_mut().enumerate() {
            let width = view.recommended_image_rect_width;
            let height = view.recommended_image_rect_height;
            let clamped = clamp_recommended_height(width, height, self.aspect);
            if clamped != height {
                debug!(index, width, height, clamped, "recommended size clamped");
                view.recommended_image_rect_height = clamped;
            }
        }
        result
    }

    /// Ask the runtime whether the view configuration's FOV may change.
    /// Any failure along the way counts as immutable.
    unsafe fn fov_mutable(
        &self,
        instance: Instance,
        system_id: SystemId,
        view_configuration_type: ViewConfigurationType,
    ) -> bool {
        let mut function: Option<pfn::VoidFunction> = None;
        // SAFETY: static NUL-terminated name, valid out pointer.
        let resolved = unsafe {
            (self.next_get_instance_proc_addr)(
                instance,
                c"xrGetViewConfigurationProperties".as_ptr(),
                &mut function,
            )
        };
        let Some(function) = function.filter(|_| resolved == ResultCode::SUCCESS) else {
            debug!(%resolved, "xrGetViewConfigurationProperties unavailable");
            return false;
        };
        // SAFETY: the runtime resolved this name to this signature.
        let get_properties = unsafe {
            mem::transmute::<pfn::VoidFunction, pfn::GetViewConfigurationProperties>(function)
        };
        let mut properties = ViewConfigurationProperties {
            ty: StructureType::VIEW_CONFIGURATION_PROPERTIES,
            next: ptr::null_mut(),
            view_configuration_type,
            fov_mutable: Bool32::FALSE,
        };
        // SAFETY: valid handles and out pointer.
        let result = unsafe {
            get_properties(instance, system_id, view_configuration_type, &mut properties)
        };
        result == ResultCode::SUCCESS && properties.fov_mutable == Bool32::TRUE
    }
}

/// Elements written by a two-call enumeration: `min(count, capacity)`, empty
/// for a size query.
///
/// # Safety
///
/// When non-null, `items` must hold `capacity` elements and `count` must be
/// readable.
unsafe fn written<'a, T>(items: *mut T, capacity: u32, count: *const u32) -> &'a mut [T] {
    if items.is_null() || count.is_null() {
        return &mut [];
    }
    // SAFETY: per the function contract.
    let len = unsafe { *count }.min(capacity) as usize;
    // SAFETY: per the function contract.
    unsafe { slice::from_raw_parts_mut(items, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigText;
    use crate::fov::Fov;
    use crate::gate::AllowList;
    use crate::xr::{LoaderInterfaceStruct, Posef, Space};
    use std::cell::Cell;
    use std::mem::size_of;

    const QUARTER: f32 = core::f32::consts::FRAC_PI_4;

    /// Square 90° frustum, narrower than 16:9.
    const SQUARE: Fov = Fov::new(-QUARTER, QUARTER, QUARTER, -QUARTER);

    thread_local! {
        static LOCATE_RESULT: Cell<ResultCode> = const { Cell::new(ResultCode::SUCCESS) };
        static FOV_MUTABLE: Cell<Option<Bool32>> = const { Cell::new(Some(Bool32::TRUE)) };
        static CREATE_SAW_NEXT: Cell<usize> = const { Cell::new(0) };
    }

    unsafe extern "system" fn runtime_locate_views(
        _: Session,
        _: *const ViewLocateInfo,
        view_state: *mut ViewState,
        capacity: u32,
        count: *mut u32,
        views: *mut View,
    ) -> ResultCode {
        unsafe {
            *count = 2;
            if !view_state.is_null() {
                (*view_state).view_state_flags = 0xf;
            }
            if capacity >= 2 && !views.is_null() {
                for i in 0..2 {
                    let view = &mut *views.add(i);
                    view.fov = SQUARE;
                    view.pose = Posef::default();
                }
            }
        }
        LOCATE_RESULT.with(Cell::get)
    }

    unsafe extern "system" fn runtime_enumerate_views(
        _: Instance,
        _: SystemId,
        _: ViewConfigurationType,
        capacity: u32,
        count: *mut u32,
        views: *mut ViewConfigurationView,
    ) -> ResultCode {
        unsafe {
            *count = 2;
            if capacity >= 2 && !views.is_null() {
                for i in 0..2 {
                    let view = &mut *views.add(i);
                    view.recommended_image_rect_width = 2000;
                    view.recommended_image_rect_height = 2000;
                    view.max_image_rect_width = 4000;
                    view.max_image_rect_height = 4000;
                }
            }
        }
        ResultCode::SUCCESS
    }

    unsafe extern "system" fn runtime_properties(
        _: Instance,
        _: SystemId,
        _: ViewConfigurationType,
        properties: *mut ViewConfigurationProperties,
    ) -> ResultCode {
        match FOV_MUTABLE.with(Cell::get) {
            Some(mutable) => {
                unsafe { (*properties).fov_mutable = mutable };
                ResultCode::SUCCESS
            }
            None => ResultCode::ERROR_RUNTIME_FAILURE,
        }
    }

    unsafe extern "system" fn runtime_gipa(
        _: Instance,
        name: *const c_char,
        function: *mut Option<pfn::VoidFunction>,
    ) -> ResultCode {
        let name = unsafe { CStr::from_ptr(name) };
        let resolved = unsafe {
            match name.to_bytes() {
                b"xrLocateViews" => Some(mem::transmute::<pfn::LocateViews, pfn::VoidFunction>(
                    runtime_locate_views,
                )),
                b"xrEnumerateViewConfigurationViews" => Some(mem::transmute::<
                    pfn::EnumerateViewConfigurationViews,
                    pfn::VoidFunction,
                >(
                    runtime_enumerate_views
                )),
                b"xrGetViewConfigurationProperties" => Some(mem::transmute::<
                    pfn::GetViewConfigurationProperties,
                    pfn::VoidFunction,
                >(runtime_properties)),
                _ => None,
            }
        };
        unsafe { *function = resolved };
        match resolved {
            Some(_) => ResultCode::SUCCESS,
            None => ResultCode::ERROR_FUNCTION_UNSUPPORTED,
        }
    }

    /// Resolves like the runtime but never offers the properties query.
    unsafe extern "system" fn runtime_gipa_without_properties(
        instance: Instance,
        name: *const c_char,
        function: *mut Option<pfn::VoidFunction>,
    ) -> ResultCode {
        if unsafe { CStr::from_ptr(name) } == c"xrGetViewConfigurationProperties" {
            unsafe { *function = None };
            return ResultCode::ERROR_FUNCTION_UNSUPPORTED;
        }
        unsafe { runtime_gipa(instance, name, function) }
    }

    unsafe extern "system" fn runtime_create(
        _: *const InstanceCreateInfo,
        layer_info: *const ApiLayerCreateInfo,
        instance: *mut Instance,
    ) -> ResultCode {
        unsafe {
            CREATE_SAW_NEXT.with(|c| c.set((*layer_info).next_info as usize));
            *instance = Instance(42);
        }
        ResultCode::SUCCESS
    }

    fn layer(activation: Activation) -> Layer {
        layer_with(runtime_gipa, activation)
    }

    fn layer_with(gipa: pfn::GetInstanceProcAddr, activation: Activation) -> Layer {
        let layer = Layer::new(gipa, activation, TargetAspect::WIDESCREEN);
        for symbol in HookedSymbol::ALL {
            let mut function = None;
            let code = unsafe {
                layer.get_instance_proc_addr(Instance(42), symbol.name().as_ptr(), &mut function)
            };
            assert_eq!(code, ResultCode::SUCCESS);
        }
        layer
    }

    fn stereo_info() -> ViewLocateInfo {
        ViewLocateInfo {
            ty: StructureType::VIEW_LOCATE_INFO,
            next: ptr::null(),
            view_configuration_type: ViewConfigurationType::PRIMARY_STEREO,
            display_time: 1,
            space: Space(7),
        }
    }

    fn locate(layer: &Layer, info: &ViewLocateInfo) -> (ResultCode, u32, [View; 2]) {
        let mut views = [View::empty(); 2];
        let mut state = ViewState::empty();
        let mut count = 0;
        let code = unsafe {
            layer.locate_views(
                Session(1),
                info,
                &mut state,
                2,
                &mut count,
                views.as_mut_ptr(),
            )
        };
        (code, count, views)
    }

    fn enumerate(layer: &Layer) -> (ResultCode, [ViewConfigurationView; 2]) {
        let mut views = [ViewConfigurationView::empty(); 2];
        let mut count = 0;
        let code = unsafe {
            layer.enumerate_view_configuration_views(
                Instance(42),
                3,
                ViewConfigurationType::PRIMARY_STEREO,
                2,
                &mut count,
                views.as_mut_ptr(),
            )
        };
        (code, views)
    }

    // ── resolution ──────────────────────────────────────────────────────

    #[test]
    fn hooked_symbols_are_substituted() {
        let layer = Layer::new(runtime_gipa, Activation::Active, TargetAspect::WIDESCREEN);
        let mut function = None;
        let code = unsafe {
            layer.get_instance_proc_addr(Instance(42), c"xrLocateViews".as_ptr(), &mut function)
        };
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(
            function.map(|f| f as usize),
            Some(HookedSymbol::LocateViews.replacement() as usize)
        );
        assert!(layer.hooks().is_captured(HookedSymbol::LocateViews));
    }

    #[test]
    fn other_symbols_pass_through() {
        let layer = Layer::new(runtime_gipa, Activation::Active, TargetAspect::WIDESCREEN);
        let mut function = None;
        let code = unsafe {
            layer.get_instance_proc_addr(
                Instance(42),
                c"xrGetViewConfigurationProperties".as_ptr(),
                &mut function,
            )
        };
        assert_eq!(code, ResultCode::SUCCESS);
        let expected = runtime_properties as pfn::GetViewConfigurationProperties;
        assert_eq!(function.map(|f| f as usize), Some(expected as usize));
    }

    #[test]
    fn failed_resolution_is_returned_verbatim() {
        let layer = Layer::new(runtime_gipa, Activation::Active, TargetAspect::WIDESCREEN);
        let mut function = None;
        let code = unsafe {
            layer.get_instance_proc_addr(Instance(42), c"xrUnknown".as_ptr(), &mut function)
        };
        assert_eq!(code, ResultCode::ERROR_FUNCTION_UNSUPPORTED);
        assert!(function.is_none());
        assert!(!layer.hooks().is_captured(HookedSymbol::LocateViews));
    }

    #[test]
    fn unresolved_hook_reports_failure() {
        let layer = Layer::new(runtime_gipa, Activation::Active, TargetAspect::WIDESCREEN);
        let (code, _, _) = locate(&layer, &stereo_info());
        assert_eq!(code, ResultCode::ERROR_INITIALIZATION_FAILED);
    }

    // ── xrLocateViews ───────────────────────────────────────────────────

    #[test]
    fn active_layer_clamps_stereo_views() {
        let (code, count, views) = locate(&layer(Activation::Active), &stereo_info());
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(count, 2);
        for view in views {
            assert!((view.fov.aspect() - 16.0 / 9.0).abs() < 1e-6);
            assert_eq!(view.fov.angle_left, SQUARE.angle_left);
            assert_eq!(view.fov.angle_right, SQUARE.angle_right);
        }
    }

    #[test]
    fn inactive_layer_passes_views_through() {
        let (code, count, views) = locate(&layer(Activation::Inactive), &stereo_info());
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(count, 2);
        for view in views {
            assert_eq!(view.fov, SQUARE);
        }
    }

    #[test]
    fn mono_views_are_untouched() {
        let mut info = stereo_info();
        info.view_configuration_type = ViewConfigurationType::PRIMARY_MONO;
        let (code, _, views) = locate(&layer(Activation::Active), &info);
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(views[0].fov, SQUARE);
    }

    #[test]
    fn non_success_codes_skip_the_clamp() {
        let layer = layer(Activation::Active);
        for code in [ResultCode::TIMEOUT_EXPIRED, ResultCode::ERROR_RUNTIME_FAILURE] {
            LOCATE_RESULT.with(|r| r.set(code));
            let (returned, _, views) = locate(&layer, &stereo_info());
            assert_eq!(returned, code);
            assert_eq!(views[0].fov, SQUARE);
        }
        LOCATE_RESULT.with(|r| r.set(ResultCode::SUCCESS));
    }

    #[test]
    fn size_query_writes_no_views() {
        let layer = layer(Activation::Active);
        let mut count = 0;
        let mut state = ViewState::empty();
        let code = unsafe {
            layer.locate_views(
                Session(1),
                &stereo_info(),
                &mut state,
                0,
                &mut count,
                ptr::null_mut(),
            )
        };
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(count, 2);
        assert_eq!(state.view_state_flags, 0xf);
    }

    // ── xrEnumerateViewConfigurationViews ───────────────────────────────

    #[test]
    fn active_layer_clamps_recommended_height() {
        let (code, views) = enumerate(&layer(Activation::Active));
        assert_eq!(code, ResultCode::SUCCESS);
        for view in views {
            assert_eq!(view.recommended_image_rect_width, 2000);
            assert_eq!(view.recommended_image_rect_height, 1125);
            assert_eq!(view.max_image_rect_height, 4000);
        }
    }

    #[test]
    fn inactive_layer_keeps_recommended_height() {
        let (_, views) = enumerate(&layer(Activation::Inactive));
        assert_eq!(views[0].recommended_image_rect_height, 2000);
    }

    #[test]
    fn immutable_fov_keeps_recommended_height() {
        let layer = layer(Activation::Active);
        for mutable in [Some(Bool32::FALSE), None] {
            FOV_MUTABLE.with(|m| m.set(mutable));
            let (code, views) = enumerate(&layer);
            assert_eq!(code, ResultCode::SUCCESS);
            assert_eq!(views[1].recommended_image_rect_height, 2000);
        }
        FOV_MUTABLE.with(|m| m.set(Some(Bool32::TRUE)));
    }

    #[test]
    fn missing_properties_query_keeps_recommended_height() {
        let layer = layer_with(runtime_gipa_without_properties, Activation::Active);
        let (code, views) = enumerate(&layer);
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(views[0].recommended_image_rect_height, 2000);
    }

    // ── instance creation ───────────────────────────────────────────────

    fn create_info(name: &str) -> InstanceCreateInfo {
        InstanceCreateInfo {
            ty: StructureType::INSTANCE_CREATE_INFO,
            next: ptr::null(),
            create_flags: 0,
            application_info: xr::ApplicationInfo {
                application_name: xr::to_fixed(name),
                application_version: 1,
                engine_name: xr::to_fixed(""),
                engine_version: 0,
                api_version: xr::CURRENT_API_VERSION,
            },
            enabled_api_layer_count: 0,
            enabled_api_layer_names: ptr::null(),
            enabled_extension_count: 0,
            enabled_extension_names: ptr::null(),
        }
    }

    fn next_info(next: *mut xr::ApiLayerNextInfo) -> xr::ApiLayerNextInfo {
        xr::ApiLayerNextInfo {
            struct_type: LoaderInterfaceStruct::API_LAYER_NEXT_INFO,
            struct_version: xr::API_LAYER_NEXT_INFO_STRUCT_VERSION,
            struct_size: size_of::<xr::ApiLayerNextInfo>(),
            layer_name: xr::to_fixed(negotiate::LAYER_NAME),
            next_get_instance_proc_addr: Some(runtime_gipa),
            next_create_api_layer_instance: Some(runtime_create),
            next,
        }
    }

    fn layer_create_info(next: *mut xr::ApiLayerNextInfo) -> ApiLayerCreateInfo {
        ApiLayerCreateInfo {
            struct_type: LoaderInterfaceStruct::API_LAYER_CREATE_INFO,
            struct_version: xr::API_LAYER_CREATE_INFO_STRUCT_VERSION,
            struct_size: size_of::<ApiLayerCreateInfo>(),
            loader_instance: ptr::null_mut(),
            settings_file_location: [0; xr::API_LAYER_MAX_SETTINGS_PATH_SIZE],
            next_info: next,
        }
    }

    fn create(name: &str) -> Result<(ResultCode, Layer), NegotiationError> {
        create_with(name, &LayerSettings::default())
    }

    fn create_with(
        name: &str,
        settings: &LayerSettings,
    ) -> Result<(ResultCode, Layer), NegotiationError> {
        let mut deeper = next_info(ptr::null_mut());
        let mut next = next_info(&mut deeper);
        let info = layer_create_info(&mut next);
        let mut instance = Instance::NULL;
        let created = unsafe {
            Layer::create_instance(
                &create_info(name),
                &info,
                &mut instance,
                settings,
            )
        };
        if created.is_ok() {
            assert_eq!(instance, Instance(42));
            // The chain below saw itself as the head.
            assert_eq!(
                CREATE_SAW_NEXT.with(Cell::get),
                &mut deeper as *mut xr::ApiLayerNextInfo as usize
            );
        }
        created
    }

    #[test]
    fn allow_listed_application_is_active() {
        let (code, layer) = create("iRacingSim64DX11.exe").expect("created");
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(layer.activation(), Activation::Active);
        assert_eq!(layer.aspect(), TargetAspect::WIDESCREEN);
    }

    #[test]
    fn configured_aspect_drives_both_clamps() {
        let settings = LayerSettings::load(&ConfigText("[settings]\nAspect = 2.1 ; ultrawide\n"));
        assert_eq!(settings.aspect.get(), 2.1);
        let (_, layer) = create_with("AMS2AVX.exe", &settings).expect("created");
        assert_eq!(layer.aspect(), settings.aspect);
        for symbol in HookedSymbol::ALL {
            let mut function = None;
            unsafe {
                layer.get_instance_proc_addr(Instance(42), symbol.name().as_ptr(), &mut function)
            };
        }

        let (code, _, views) = locate(&layer, &stereo_info());
        assert_eq!(code, ResultCode::SUCCESS);
        for view in views {
            assert!((view.fov.aspect() - 2.1).abs() < 1e-6);
            assert_eq!(view.fov.angle_left, SQUARE.angle_left);
        }

        // 2000 / 2.1 = 952.38
        let (code, views) = enumerate(&layer);
        assert_eq!(code, ResultCode::SUCCESS);
        for view in views {
            assert_eq!(view.recommended_image_rect_height, 952);
        }
    }

    #[test]
    fn other_application_is_inactive() {
        let (code, layer) = create("SomeOtherSim.exe").expect("created");
        assert_eq!(code, ResultCode::SUCCESS);
        assert_eq!(layer.activation(), Activation::Inactive);
    }

    #[test]
    fn invalid_chain_is_rejected_before_calling_down() {
        let mut next = next_info(ptr::null_mut());
        next.layer_name = xr::to_fixed("XR_APILAYER_other");
        let info = layer_create_info(&mut next);
        let mut instance = Instance::NULL;
        let created = unsafe {
            Layer::create_instance(
                &create_info("iRacing"),
                &info,
                &mut instance,
                &LayerSettings::default(),
            )
        };
        assert!(matches!(created, Err(NegotiationError::LayerName(_))));
        assert_eq!(instance, Instance::NULL);

        let created = unsafe {
            Layer::create_instance(
                &create_info("iRacing"),
                ptr::null(),
                &mut instance,
                &LayerSettings {
                    allow_list: AllowList::SIM_RACING,
                    ..LayerSettings::default()
                },
            )
        };
        assert!(matches!(created, Err(NegotiationError::NullPointer(_))));
    }
}
