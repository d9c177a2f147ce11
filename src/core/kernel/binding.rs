//=========================================================================
// Kernel Binding
//=========================================================================
//
// Locates, loads, validates and owns the kernel instance.
//
// Construction protocol:
//   1. scan plugin dir, pick first file (sorted) whose name has "kernel"
//   2. none found                   → Configuration (no dlopen attempted)
//   3. Library::new fails           → Load
//   4. create/destroy symbol absent → Load
//   5. version tag mismatch         → Load
//      null instance                → Runtime
//
// Teardown calls the destroy symbol resolved in step 4, then releases
// the library. Windows, canvases and textures a plugin hands out carry
// a reference to the library, so it stays mapped until the last of them
// is dropped, even after the kernel itself is gone.
//
// This is the only module that resolves symbols or casts raw pointers
// to kernel objects.
//
//=========================================================================

#![forbid(unsafe_op_in_unsafe_fn)]

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::rc::Rc;

use libloading::Library;
use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::abi::{
    CreateKernelFn, DestroyKernelFn, KernelEntry, CREATE_KERNEL_SYMBOL, DESTROY_KERNEL_SYMBOL,
    KERNEL_ABI_VERSION,
};
use super::{Canvas, Kernel, Texture, Window};
use crate::core::error::{EngineError, EngineResult};
use crate::core::input::RawEvent;

//=== Discovery ===========================================================

/// Returns the first regular file in `dir` (by file name order) whose
/// name contains `pattern`.
pub fn find_kernel_plugin(dir: &Path, pattern: &str) -> EngineResult<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| {
        EngineError::Configuration(format!(
            "cannot read plugin directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(pattern))
        })
        .collect();

    candidates.sort();

    debug!(
        "kernel: {} candidate(s) matching '{}' in '{}'",
        candidates.len(),
        pattern,
        dir.display()
    );

    candidates.into_iter().next().ok_or_else(|| {
        EngineError::Configuration(format!(
            "kernel not found in '{}' (no file name contains '{}')",
            dir.display(),
            pattern
        ))
    })
}

//=== KernelBinding =======================================================

/// Owner of the engine's single kernel instance.
///
/// The binding is itself a [`Kernel`]: calls go to the bound instance,
/// and objects created by a plugin come back wrapped so they keep the
/// plugin library loaded.
pub struct KernelBinding {
    source: KernelSource,
}

enum KernelSource {
    Plugin(PluginKernel),
    InProcess(Box<dyn Kernel>),
}

/// Kernel living in a dynamic library.
///
/// `library` is released after `Drop::drop` has run `destroy`, so the
/// kernel's code is still mapped while it tears itself down.
struct PluginKernel {
    instance: NonNull<Box<dyn Kernel>>,
    entry: KernelEntry,
    destroy: DestroyKernelFn,
    path: PathBuf,
    library: Rc<Library>,
}

impl KernelBinding {
    //--- Construction -----------------------------------------------------

    /// Discovers and loads the kernel plugin in `dir`.
    pub fn load(dir: &Path, pattern: &str) -> EngineResult<Self> {
        let path = find_kernel_plugin(dir, pattern)?;
        Self::load_library(&path)
    }

    /// Loads a specific kernel library.
    pub fn load_library(path: &Path) -> EngineResult<Self> {
        info!("kernel: loading '{}'", path.display());

        let library = unsafe { Library::new(path) }
            .map_err(|e| EngineError::load(path, format!("Library::new failed: {e}")))?;

        let create: CreateKernelFn = unsafe { library.get::<CreateKernelFn>(CREATE_KERNEL_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|e| EngineError::load(path, format!("missing create_kernel(): {e}")))?;

        let destroy: DestroyKernelFn =
            unsafe { library.get::<DestroyKernelFn>(DESTROY_KERNEL_SYMBOL) }
                .map(|symbol| *symbol)
                .map_err(|e| EngineError::load(path, format!("missing destroy_kernel(): {e}")))?;

        let entry = unsafe { create() };

        let instance = match check_entry(path, &entry) {
            Ok(instance) => instance,
            Err(err) => {
                if !entry.is_null() {
                    unsafe { destroy(entry) };
                }
                return Err(err);
            }
        };

        info!("kernel: bound '{}' (abi v{})", path.display(), entry.abi_version);

        Ok(Self {
            source: KernelSource::Plugin(PluginKernel {
                instance,
                entry,
                destroy,
                path: path.to_path_buf(),
                library: Rc::new(library),
            }),
        })
    }

    /// Binds a kernel compiled into the host (headless runs, tests).
    pub fn in_process(kernel: Box<dyn Kernel>) -> Self {
        info!("kernel: bound in-process kernel");
        Self {
            source: KernelSource::InProcess(kernel),
        }
    }

    //--- Access -----------------------------------------------------------

    fn raw(&self) -> &dyn Kernel {
        match &self.source {
            // SAFETY: `instance` stays valid until `destroy` runs in Drop.
            KernelSource::Plugin(plugin) => &**unsafe { plugin.instance.as_ref() },
            KernelSource::InProcess(kernel) => &**kernel,
        }
    }

    fn raw_mut(&mut self) -> &mut dyn Kernel {
        match &mut self.source {
            // SAFETY: as above; `&mut self` guarantees exclusive access.
            KernelSource::Plugin(plugin) => &mut **unsafe { plugin.instance.as_mut() },
            KernelSource::InProcess(kernel) => &mut **kernel,
        }
    }

    /// Library path for plugin kernels, `None` for in-process ones.
    pub fn origin(&self) -> Option<&Path> {
        match &self.source {
            KernelSource::Plugin(plugin) => Some(&plugin.path),
            KernelSource::InProcess(_) => None,
        }
    }

    /// Library backing a plugin kernel, for objects that must outlive
    /// the binding.
    fn library(&self) -> Option<Rc<Library>> {
        match &self.source {
            KernelSource::Plugin(plugin) => Some(Rc::clone(&plugin.library)),
            KernelSource::InProcess(_) => None,
        }
    }
}

impl Kernel for KernelBinding {
    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Option<Box<dyn Window>> {
        let window = self.raw_mut().create_window(title, width, height)?;

        Some(match self.library() {
            Some(library) => Box::new(PluginWindow {
                inner: window,
                library,
            }),
            None => window,
        })
    }

    fn pending_events(&mut self, now: u32) -> Vec<RawEvent> {
        self.raw_mut().pending_events(now)
    }

    fn load_texture(&mut self, canvas: &dyn Canvas, path: &Path) -> Option<Box<dyn Texture>> {
        let texture = self.raw_mut().load_texture(canvas, path)?;

        Some(match self.library() {
            Some(library) => Box::new(PluginTexture {
                inner: texture,
                _library: library,
            }),
            None => texture,
        })
    }

    fn time_elapsed(&self) -> u32 {
        self.raw().time_elapsed()
    }

    fn pause_timer(&mut self) {
        self.raw_mut().pause_timer();
    }

    fn resume_timer(&mut self) {
        self.raw_mut().resume_timer();
    }
}

impl Drop for PluginKernel {
    fn drop(&mut self) {
        info!("kernel: destroying '{}'", self.path.display());
        unsafe { (self.destroy)(self.entry) };
    }
}

//=== Library Guards ======================================================
//
// Plugin objects paired with the library that holds their code. `inner`
// is declared first so it is dropped while the library is still mapped.
//

struct PluginWindow {
    inner: Box<dyn Window>,
    library: Rc<Library>,
}

impl Window for PluginWindow {
    fn canvas(&self) -> Rc<dyn Canvas> {
        Rc::new(PluginCanvas {
            inner: self.inner.canvas(),
            _library: Rc::clone(&self.library),
        })
    }
}

struct PluginCanvas {
    inner: Rc<dyn Canvas>,
    _library: Rc<Library>,
}

impl Canvas for PluginCanvas {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn update(&self) {
        self.inner.update();
    }
}

struct PluginTexture {
    inner: Box<dyn Texture>,
    _library: Rc<Library>,
}

impl Texture for PluginTexture {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }
}

//--- check_entry() -------------------------------------------------------
//
// Validates a factory result before first use.
//
fn check_entry(path: &Path, entry: &KernelEntry) -> EngineResult<NonNull<Box<dyn Kernel>>> {
    if entry.abi_version != KERNEL_ABI_VERSION {
        return Err(EngineError::load(
            path,
            format!(
                "kernel ABI v{} does not match host ABI v{}",
                entry.abi_version, KERNEL_ABI_VERSION
            ),
        ));
    }

    NonNull::new(entry.instance.cast::<Box<dyn Kernel>>())
        .ok_or_else(|| EngineError::Runtime(format!("can't create the kernel from '{}'", path.display())))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::ChannelKernel;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    //=====================================================================
    // Discovery Tests
    //=====================================================================

    #[test]
    fn no_kernel_file_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "libaudio.so");
        touch(dir.path(), "README.txt");

        let result = KernelBinding::load(dir.path(), "kernel");

        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn missing_directory_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("libs");

        let result = find_kernel_plugin(&missing, "kernel");

        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn first_match_in_name_order_wins() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "libzz_kernel.so");
        touch(dir.path(), "libaa_kernel.so");
        touch(dir.path(), "libmixer.so");

        let found = find_kernel_plugin(dir.path(), "kernel").unwrap();

        assert_eq!(found.file_name().unwrap(), "libaa_kernel.so");
    }

    #[test]
    fn directories_are_not_candidates() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("kernel_sources")).unwrap();

        let result = find_kernel_plugin(dir.path(), "kernel");

        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    //=====================================================================
    // Loading Tests
    //=====================================================================

    #[test]
    fn unloadable_library_is_a_load_error() {
        let dir = tempdir().unwrap();
        let mut file = File::create(dir.path().join("libbroken_kernel.so")).unwrap();
        file.write_all(b"definitely not a shared object").unwrap();

        let result = KernelBinding::load(dir.path(), "kernel");

        match result {
            Err(EngineError::Load { path, .. }) => {
                assert!(path.ends_with("libbroken_kernel.so"));
            }
            Err(other) => panic!("expected Load error, got {other}"),
            Ok(_) => panic!("expected Load error, got a binding"),
        }
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let entry = KernelEntry {
            abi_version: KERNEL_ABI_VERSION + 1,
            instance: std::ptr::null_mut(),
        };

        let result = check_entry(Path::new("libkernel.so"), &entry);

        assert!(matches!(result, Err(EngineError::Load { .. })));
    }

    #[test]
    fn null_instance_is_a_runtime_error() {
        let result = check_entry(Path::new("libkernel.so"), &KernelEntry::null());

        assert!(matches!(result, Err(EngineError::Runtime(_))));
    }

    #[test]
    fn valid_entry_passes_validation() {
        let (kernel, _feed) = ChannelKernel::new(4);
        let entry = KernelEntry::from_kernel(Box::new(kernel));

        assert!(check_entry(Path::new("libkernel.so"), &entry).is_ok());

        unsafe { entry.into_kernel() };
    }

    //=====================================================================
    // In-Process Binding Tests
    //=====================================================================

    #[test]
    fn in_process_binding_exposes_kernel() {
        let (kernel, feed) = ChannelKernel::new(4);
        let mut binding = KernelBinding::in_process(Box::new(kernel));

        assert!(binding.origin().is_none());

        feed.send(RawEvent::quit(0));
        let events = binding.pending_events(0);

        assert_eq!(events.len(), 1);
    }

    #[test]
    fn in_process_objects_are_not_wrapped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.png");

        let (kernel, _feed) = ChannelKernel::new(4);
        let mut binding = KernelBinding::in_process(Box::new(kernel));

        let window = binding.create_window("test", 32, 16).unwrap();
        let canvas = window.canvas();
        let texture = binding.load_texture(&*canvas, &dir.path().join("a.png"));

        assert_eq!(canvas.size(), (32, 16));
        assert!(texture.is_some());
        assert!(binding.library().is_none());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn library_without_factory_is_a_load_error() {
        let system_libm = [
            "/lib/x86_64-linux-gnu/libm.so.6",
            "/usr/lib/x86_64-linux-gnu/libm.so.6",
            "/lib/aarch64-linux-gnu/libm.so.6",
            "/usr/lib/aarch64-linux-gnu/libm.so.6",
            "/lib64/libm.so.6",
            "/usr/lib64/libm.so.6",
            "/usr/lib/libm.so.6",
        ]
        .into_iter()
        .map(Path::new)
        .find(|path| path.is_file());

        let Some(libm) = system_libm else {
            eprintln!("no system libm found, skipping");
            return;
        };

        let dir = tempdir().unwrap();
        std::fs::copy(libm, dir.path().join("libm_kernel.so")).unwrap();

        match KernelBinding::load(dir.path(), "kernel") {
            Err(EngineError::Load { path, message }) => {
                assert!(path.ends_with("libm_kernel.so"));
                assert!(message.contains("create_kernel"), "{message}");
            }
            Err(other) => panic!("expected Load error, got {other}"),
            Ok(_) => panic!("expected Load error, got a binding"),
        }
    }
}
