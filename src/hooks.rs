//! Capability-resolution hook table.
//!
//! Each hooked symbol owns one slot for the implementation found below this
//! layer ("next"). The slot is filled the first time the symbol is resolved
//! through the chain and is the only route back to the runtime afterwards,
//! whether or not the layer is active.

use std::ffi::CStr;
use std::mem;
use std::sync::OnceLock;

use tracing::debug;

use crate::export;
use crate::xr::pfn;

/// Entry points this layer substitutes during `xrGetInstanceProcAddr`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookedSymbol {
    /// `xrLocateViews`: per-frame eye FOVs.
    LocateViews,
    /// `xrEnumerateViewConfigurationViews`: recommended render-target sizes.
    EnumerateViewConfigurationViews,
}

impl HookedSymbol {
    pub const ALL: [Self; 2] = [Self::LocateViews, Self::EnumerateViewConfigurationViews];

    /// Name the symbol is resolved by.
    pub fn name(self) -> &'static CStr {
        match self {
            Self::LocateViews => c"xrLocateViews",
            Self::EnumerateViewConfigurationViews => c"xrEnumerateViewConfigurationViews",
        }
    }

    pub fn from_name(name: &CStr) -> Option<Self> {
        Self::ALL.into_iter().find(|symbol| symbol.name() == name)
    }

    /// The function handed out in place of the resolved one.
    pub fn replacement(self) -> pfn::VoidFunction {
        // SAFETY: function pointers share one representation. Callers cast the
        // result back to the symbol's own signature before calling it.
        unsafe {
            match self {
                Self::LocateViews => {
                    mem::transmute::<pfn::LocateViews, pfn::VoidFunction>(export::xr_locate_views)
                }
                Self::EnumerateViewConfigurationViews => mem::transmute::<
                    pfn::EnumerateViewConfigurationViews,
                    pfn::VoidFunction,
                >(
                    export::xr_enumerate_view_configuration_views,
                ),
            }
        }
    }
}

/// Write-once holder for a downstream implementation.
#[derive(Debug)]
pub struct NextSlot<F> {
    next: OnceLock<F>,
}

impl<F: Copy> NextSlot<F> {
    pub const fn new() -> Self {
        Self {
            next: OnceLock::new(),
        }
    }

    /// Store `next` unless a value is already captured. Returns whether this
    /// call stored it.
    pub fn capture(&self, next: F) -> bool {
        self.next.set(next).is_ok()
    }

    pub fn get(&self) -> Option<F> {
        self.next.get().copied()
    }
}

impl<F: Copy> Default for NextSlot<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Captured "next" implementations, one slot per [`HookedSymbol`].
#[derive(Debug, Default)]
pub struct HookTable {
    locate_views: NextSlot<pfn::LocateViews>,
    enumerate_views: NextSlot<pfn::EnumerateViewConfigurationViews>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locate_views(&self) -> Option<pfn::LocateViews> {
        self.locate_views.get()
    }

    pub fn enumerate_view_configuration_views(
        &self,
    ) -> Option<pfn::EnumerateViewConfigurationViews> {
        self.enumerate_views.get()
    }

    pub fn is_captured(&self, symbol: HookedSymbol) -> bool {
        match symbol {
            HookedSymbol::LocateViews => self.locate_views().is_some(),
            HookedSymbol::EnumerateViewConfigurationViews => {
                self.enumerate_view_configuration_views().is_some()
            }
        }
    }

    /// Capture `resolved` as the next implementation of `symbol` and return
    /// this layer's replacement. A symbol resolved again keeps its first
    /// capture.
    ///
    /// # Safety
    ///
    /// `resolved` must be the downstream implementation of `symbol`, with the
    /// signature OpenXR defines for it.
    pub unsafe fn substitute(
        &self,
        symbol: HookedSymbol,
        resolved: pfn::VoidFunction,
    ) -> pfn::VoidFunction {
        // SAFETY: guaranteed by the caller.
        let fresh = unsafe {
            match symbol {
                HookedSymbol::LocateViews => self
                    .locate_views
                    .capture(mem::transmute::<pfn::VoidFunction, pfn::LocateViews>(
                        resolved,
                    )),
                HookedSymbol::EnumerateViewConfigurationViews => self.enumerate_views.capture(
                    mem::transmute::<pfn::VoidFunction, pfn::EnumerateViewConfigurationViews>(
                        resolved,
                    ),
                ),
            }
        };
        if fresh {
            debug!(symbol = ?symbol.name(), "captured next implementation");
        } else {
            debug!(symbol = ?symbol.name(), "already captured, keeping the first");
        }
        symbol.replacement()
    }
}
