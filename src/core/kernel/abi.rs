//=========================================================================
// Kernel Plugin ABI
//=========================================================================
//
// Typed boundary between the host and a kernel plugin.
//
// A plugin exports exactly two C symbols:
//
//   create_kernel()  -> KernelEntry
//   destroy_kernel(KernelEntry)
//
// `KernelEntry` carries a version tag that the host checks before the
// instance is touched. The instance itself is a `Box<dyn Kernel>` boxed
// once more so it fits in a thin pointer; host and plugin must therefore
// be built by the same compiler against the same version of this crate,
// which the version tag approximates.
//
// Plugins should not hand-write these symbols: use `export_kernel!`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::c_void;
use std::ptr;

//=== Internal Dependencies ===============================================

use super::Kernel;

//=== Constants ===========================================================

/// Bumped whenever `Kernel` or `KernelEntry` change shape.
pub const KERNEL_ABI_VERSION: u32 = 1;

pub const CREATE_KERNEL_SYMBOL: &[u8] = b"create_kernel\0";
pub const DESTROY_KERNEL_SYMBOL: &[u8] = b"destroy_kernel\0";

pub type CreateKernelFn = unsafe extern "C" fn() -> KernelEntry;
pub type DestroyKernelFn = unsafe extern "C" fn(KernelEntry);

//=== KernelEntry =========================================================

/// Versioned kernel instance handed across the plugin boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct KernelEntry {
    pub abi_version: u32,
    pub instance: *mut c_void,
}

impl KernelEntry {
    /// Wraps a kernel for export. Ownership moves into the entry until
    /// [`KernelEntry::into_kernel`] reclaims it.
    pub fn from_kernel(kernel: Box<dyn Kernel>) -> Self {
        let boxed: Box<Box<dyn Kernel>> = Box::new(kernel);
        Self {
            abi_version: KERNEL_ABI_VERSION,
            instance: Box::into_raw(boxed).cast(),
        }
    }

    /// An entry signalling that the factory failed.
    pub const fn null() -> Self {
        Self {
            abi_version: KERNEL_ABI_VERSION,
            instance: ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.instance.is_null()
    }

    /// Reclaims the kernel stored by [`KernelEntry::from_kernel`].
    ///
    /// # Safety
    ///
    /// `self` must come from `from_kernel` in the same binary, and must
    /// not have been reclaimed before.
    pub unsafe fn into_kernel(self) -> Option<Box<dyn Kernel>> {
        if self.instance.is_null() {
            return None;
        }

        let boxed = unsafe { Box::from_raw(self.instance.cast::<Box<dyn Kernel>>()) };
        Some(*boxed)
    }
}

//=== export_kernel! ======================================================

/// Exports `create_kernel` / `destroy_kernel` for a kernel plugin crate
/// (`crate-type = ["cdylib"]`).
///
/// ```ignore
/// struct SdlKernel { /* ... */ }
/// impl ijengine::core::kernel::Kernel for SdlKernel { /* ... */ }
///
/// ijengine::export_kernel!(SdlKernel::new());
/// ```
#[macro_export]
macro_rules! export_kernel {
    ($constructor:expr) => {
        #[no_mangle]
        pub extern "C" fn create_kernel() -> $crate::core::kernel::KernelEntry {
            let kernel: ::std::boxed::Box<dyn $crate::core::kernel::Kernel> =
                ::std::boxed::Box::new($constructor);
            $crate::core::kernel::KernelEntry::from_kernel(kernel)
        }

        #[no_mangle]
        pub unsafe extern "C" fn destroy_kernel(entry: $crate::core::kernel::KernelEntry) {
            ::std::mem::drop(unsafe { entry.into_kernel() });
        }
    };
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::ChannelKernel;

    #[test]
    fn entry_round_trips_a_kernel() {
        let (kernel, _feed) = ChannelKernel::new(8);
        let entry = KernelEntry::from_kernel(Box::new(kernel));

        assert_eq!(entry.abi_version, KERNEL_ABI_VERSION);
        assert!(!entry.is_null());

        let reclaimed = unsafe { entry.into_kernel() };
        assert!(reclaimed.is_some());
    }

    #[test]
    fn null_entry_reclaims_nothing() {
        let entry = KernelEntry::null();

        assert!(entry.is_null());
        assert!(unsafe { entry.into_kernel() }.is_none());
    }

    #[test]
    fn symbol_names_are_nul_terminated() {
        assert_eq!(CREATE_KERNEL_SYMBOL.last(), Some(&0));
        assert_eq!(DESTROY_KERNEL_SYMBOL.last(), Some(&0));
    }
}
