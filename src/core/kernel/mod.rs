//=========================================================================
// Kernel
//=========================================================================
//
// The kernel is the platform-service provider the engine is built on:
// windows, raw input, texture loading and the game clock. It normally
// lives in a dynamic library selected at startup.
//
// Architecture:
// ```text
//   libs/libxyz_kernel.so ──load──> KernelBinding ──> &mut dyn Kernel
//        │                              │
//        ├─ create_kernel()             ├─ EventPipeline (pending_events)
//        └─ destroy_kernel()            ├─ TextureCache  (load_texture)
//                                       └─ Engine        (windows, timer)
// ```
//
// Components:
// - `abi`: the typed boundary exported by plugins (`KernelEntry`)
// - `binding`: discovery, loading, validation and teardown
// - `channel_kernel`: in-process kernel fed through a channel
//
//=========================================================================

//=== Module Declarations =================================================

mod abi;
mod binding;
mod channel_kernel;

//=== Public API ==========================================================

pub use abi::{
    CreateKernelFn, DestroyKernelFn, KernelEntry, CREATE_KERNEL_SYMBOL, DESTROY_KERNEL_SYMBOL,
    KERNEL_ABI_VERSION,
};
pub use binding::{find_kernel_plugin, KernelBinding};
pub use channel_kernel::{
    ChannelKernel, HeadlessCanvas, HeadlessTexture, HeadlessWindow, KernelFeed,
};

//=== External Dependencies ===============================================

use std::path::Path;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::input::RawEvent;

//=== Collaborator Traits =================================================

/// A loaded image owned by the kernel's renderer.
pub trait Texture {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Drawing surface of a window. Textures are loaded against a canvas.
pub trait Canvas {
    fn size(&self) -> (u32, u32);

    /// Presents everything drawn since the last call.
    fn update(&self) {}
}

/// An OS window created by the kernel.
pub trait Window {
    fn canvas(&self) -> Rc<dyn Canvas>;
}

//=== Kernel Trait ========================================================

/// Primitive platform services consumed by the engine core.
///
/// Implementations are single-threaded: every call happens on the
/// thread driving the tick loop.
pub trait Kernel {
    /// Opens a window. `None` when the platform refuses.
    fn create_window(&mut self, title: &str, width: u32, height: u32)
        -> Option<Box<dyn Window>>;

    /// Raw events observed up to and including `now` (kernel clock, ms).
    fn pending_events(&mut self, now: u32) -> Vec<RawEvent>;

    /// Loads the image at `path` for drawing on `canvas`.
    fn load_texture(&mut self, canvas: &dyn Canvas, path: &Path) -> Option<Box<dyn Texture>>;

    /// Milliseconds since the kernel timer started, excluding pauses.
    fn time_elapsed(&self) -> u32;

    fn pause_timer(&mut self);

    fn resume_timer(&mut self);
}
