//=========================================================================
// Test Kernel Plugin
//=========================================================================
//
// Smallest useful kernel plugin, built as a cdylib and loaded through
// `KernelBinding` by the integration tests.
//
// Observable behavior:
//   time_elapsed()    → always 4242
//   pending_events()  → one QUIT stamped `now`
//   load_texture()    → 7x7 texture for any path
//
// `test_kernel_live_objects()` counts kernels, windows and textures
// that have been created and not yet dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

//=== Internal Dependencies ===============================================

use ijengine::core::input::RawEvent;
use ijengine::core::kernel::{Canvas, Kernel, Texture, Window};

//=== Live Object Counter =================================================

static LIVE_OBJECTS: AtomicUsize = AtomicUsize::new(0);

struct Tracked;

impl Tracked {
    fn new() -> Self {
        LIVE_OBJECTS.fetch_add(1, Ordering::SeqCst);
        Tracked
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE_OBJECTS.fetch_sub(1, Ordering::SeqCst);
    }
}

#[no_mangle]
pub extern "C" fn test_kernel_live_objects() -> usize {
    LIVE_OBJECTS.load(Ordering::SeqCst)
}

//=== Kernel Objects ======================================================

struct TestCanvas {
    size: (u32, u32),
}

impl Canvas for TestCanvas {
    fn size(&self) -> (u32, u32) {
        self.size
    }
}

struct TestWindow {
    title: String,
    canvas: Rc<TestCanvas>,
    _tracked: Tracked,
}

impl Window for TestWindow {
    fn canvas(&self) -> Rc<dyn Canvas> {
        self.canvas.clone()
    }
}

impl Drop for TestWindow {
    fn drop(&mut self) {
        // Touches plugin-owned heap data from plugin code.
        self.title.clear();
    }
}

struct TestTexture {
    _tracked: Tracked,
}

impl Texture for TestTexture {
    fn width(&self) -> u32 {
        7
    }

    fn height(&self) -> u32 {
        7
    }
}

//=== TestKernel ==========================================================

struct TestKernel {
    _tracked: Tracked,
}

impl TestKernel {
    fn new() -> Self {
        Self {
            _tracked: Tracked::new(),
        }
    }
}

impl Kernel for TestKernel {
    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Option<Box<dyn Window>> {
        Some(Box::new(TestWindow {
            title: title.to_string(),
            canvas: Rc::new(TestCanvas {
                size: (width, height),
            }),
            _tracked: Tracked::new(),
        }))
    }

    fn pending_events(&mut self, now: u32) -> Vec<RawEvent> {
        vec![RawEvent::quit(now)]
    }

    fn load_texture(&mut self, _canvas: &dyn Canvas, _path: &Path) -> Option<Box<dyn Texture>> {
        Some(Box::new(TestTexture {
            _tracked: Tracked::new(),
        }))
    }

    fn time_elapsed(&self) -> u32 {
        4242
    }

    fn pause_timer(&mut self) {}

    fn resume_timer(&mut self) {}
}

ijengine::export_kernel!(TestKernel::new());
