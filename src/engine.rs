//=========================================================================
// ijengine
//
// Engine facade: owns the bound kernel and every core system, and drives
// them one tick at a time.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──tick(now)──>  TickReport
//         │                          │
//         ├─ with_config()           ├─ events    (EventPipeline)
//         ├─ with_plugin_dir()       ├─ physics   (CollisionEngine)
//         ├─ with_textures_dir()     ├─ resources (TextureCache)
//         ├─ with_collision_mode()   ├─ levels    (LevelRegistry)
//         └─ with_kernel()           └─ kernel    (KernelBinding)
// ```
//
// The host owns the loop: it reads `time_elapsed()`, calls `tick(now)`,
// then updates and draws its level. Nothing here spawns threads.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, EngineResult};
use crate::core::event::{DispatchReport, EventPipeline};
use crate::core::kernel::{Kernel, KernelBinding, Texture, Window};
use crate::core::level::LevelRegistry;
use crate::core::physics::{CollisionEngine, CollisionMode, CollisionReport};
use crate::core::resources::TextureCache;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Plugin dir**: `libs`, kernel file pattern `kernel`
/// - **Textures dir**: `.`
/// - **Collision mode**: [`CollisionMode::AllToAll`]
///
/// # Examples
///
/// Plugin kernel from a config file:
/// ```no_run
/// use ijengine::core::EngineConfig;
/// use ijengine::EngineBuilder;
/// use std::path::Path;
///
/// let config = EngineConfig::load(Path::new("engine.toml"))?;
/// let engine = EngineBuilder::new().with_config(config).build()?;
/// # Ok::<(), ijengine::core::EngineError>(())
/// ```
///
/// In-process kernel:
/// ```no_run
/// use ijengine::core::kernel::ChannelKernel;
/// use ijengine::core::physics::CollisionMode;
/// use ijengine::EngineBuilder;
///
/// let (kernel, feed) = ChannelKernel::new(128);
/// let engine = EngineBuilder::new()
///     .with_collision_mode(CollisionMode::OneToAll)
///     .with_kernel(kernel)
///     .build()?;
/// # Ok::<(), ijengine::core::EngineError>(())
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    kernel: Option<Box<dyn Kernel>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            kernel: None,
        }
    }

    /// Replaces every setting with `config`.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory scanned for the kernel plugin.
    ///
    /// Default: `libs`
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.plugin_dir = dir.into();
        self
    }

    /// Substring the plugin file name must contain.
    ///
    /// Default: `kernel`
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    pub fn with_kernel_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        assert!(!pattern.is_empty(), "Kernel pattern must not be empty");
        self.config.kernel_pattern = pattern;
        self
    }

    /// Directory texture names are resolved against.
    ///
    /// Default: `.`
    pub fn with_textures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.textures_dir = dir.into();
        self
    }

    /// Initial collision mode. A `OneToAll` target can only be chosen
    /// once collidables are registered.
    ///
    /// Default: [`CollisionMode::AllToAll`]
    pub fn with_collision_mode(mut self, mode: CollisionMode) -> Self {
        self.config.collision_mode = mode;
        self
    }

    /// Uses `kernel` instead of loading a plugin. The plugin settings are
    /// then ignored.
    pub fn with_kernel<K>(mut self, kernel: K) -> Self
    where
        K: Kernel + 'static,
    {
        self.kernel = Some(Box::new(kernel));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Binds the kernel and builds the engine.
    ///
    /// # Errors
    ///
    /// Only without [`with_kernel`](Self::with_kernel):
    /// - [`EngineError::Configuration`] when no plugin matches
    /// - [`EngineError::Load`] when the plugin cannot be loaded
    /// - [`EngineError::Runtime`] when its factory yields no kernel
    pub fn build(self) -> EngineResult<Engine> {
        let config = self.config;

        info!(
            "Building engine (textures: '{}', collisions: {:?})",
            config.textures_dir.display(),
            config.collision_mode
        );

        let kernel = match self.kernel {
            Some(kernel) => KernelBinding::in_process(kernel),
            None => KernelBinding::load(&config.plugin_dir, &config.kernel_pattern)?,
        };

        Ok(Engine {
            events: EventPipeline::new(),
            physics: CollisionEngine::new(config.collision_mode),
            resources: TextureCache::new(config.textures_dir),
            levels: LevelRegistry::new(),
            kernel,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== TickReport ==========================================================

/// What one [`Engine::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: DispatchReport,
    pub collisions: CollisionReport,
}

//=== Engine ==============================================================

/// A bound kernel plus the systems running on it.
///
/// Several engines may coexist, each with its own kernel and registries.
///
/// # Examples
///
/// ```no_run
/// use ijengine::prelude::*;
///
/// let mut engine = EngineBuilder::new().with_plugin_dir("libs").build()?;
///
/// let (quit, flag) = QuitSignal::new();
/// engine.events.register_translator(SystemEventsTranslator);
/// engine.events.register_listener(quit);
///
/// let window = engine.create_window("Demo", 800, 600)?;
///
/// while !flag.is_raised() {
///     let now = engine.time_elapsed();
///     engine.tick(now)?;
///     window.canvas().update();
/// }
/// # Ok::<(), ijengine::core::EngineError>(())
/// ```
pub struct Engine {
    /// Translators and listeners.
    pub events: EventPipeline,

    /// Collidables and the detection mode.
    pub physics: CollisionEngine,

    /// Textures loaded through the kernel.
    pub resources: TextureCache,

    /// Level factory slot.
    pub levels: LevelRegistry,

    // Declared last: dropped after everything that may hold kernel data.
    kernel: KernelBinding,
}

impl Engine {
    //--- Simulation -------------------------------------------------------

    /// Runs one tick at kernel time `now`: dispatches pending events, then
    /// detects collisions.
    ///
    /// # Errors
    ///
    /// [`EngineError::Dispatch`] when a translator emits a malformed
    /// payload. Collisions are skipped for that tick.
    pub fn tick(&mut self, now: u32) -> EngineResult<TickReport> {
        let events = self
            .events
            .dispatch_pending_events(&mut self.kernel, now)?;
        let collisions = self.physics.do_collisions();

        Ok(TickReport { events, collisions })
    }

    //--- Kernel Services --------------------------------------------------

    /// Opens a window and makes its canvas the one textures load against.
    ///
    /// The window may outlive the engine; a plugin library stays loaded
    /// until it is dropped.
    pub fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> EngineResult<Box<dyn Window>> {
        let window = self
            .kernel
            .create_window(title, width, height)
            .ok_or_else(|| {
                EngineError::Runtime(format!("can't create window '{title}' ({width}x{height})"))
            })?;

        self.resources.set_canvas(window.canvas());
        info!("Window '{}' created ({}x{})", title, width, height);

        Ok(window)
    }

    /// Texture `name` from the cache, loading it on first use.
    pub fn texture(&mut self, name: &str) -> EngineResult<Rc<dyn Texture>> {
        self.resources.get(&mut self.kernel, name)
    }

    pub fn time_elapsed(&self) -> u32 {
        self.kernel.time_elapsed()
    }

    pub fn pause(&mut self) {
        self.kernel.pause_timer();
    }

    pub fn resume(&mut self) {
        self.kernel.resume_timer();
    }

    //--- Kernel Access ----------------------------------------------------

    /// The bound kernel. Objects it creates keep a plugin library loaded
    /// for as long as they live.
    pub fn kernel(&self) -> &dyn Kernel {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut dyn Kernel {
        &mut self.kernel
    }

    /// Path of the plugin library, `None` for in-process kernels.
    pub fn kernel_origin(&self) -> Option<&Path> {
        self.kernel.origin()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        info!("Shutting down engine");

        // Kernel-owned resources go before the kernel.
        self.resources.release_all();
        self.resources.clear_canvas();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{QuitSignal, SystemEventsTranslator};
    use crate::core::geometry::Rectangle;
    use crate::core::input::{KeyCode, RawEvent};
    use crate::core::kernel::{Canvas, ChannelKernel, HeadlessWindow};
    use crate::core::physics::{Collidable, Collider};
    use std::cell::RefCell;
    use tempfile::tempdir;

    //--- Test Helpers -----------------------------------------------------

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Kernel that hands out textures and records teardown order.
    struct RecordingKernel {
        log: Log,
    }

    struct RecordingTexture {
        log: Log,
    }

    impl Texture for RecordingTexture {
        fn width(&self) -> u32 {
            16
        }

        fn height(&self) -> u32 {
            16
        }
    }

    impl Drop for RecordingTexture {
        fn drop(&mut self) {
            self.log.borrow_mut().push("texture");
        }
    }

    impl Drop for RecordingKernel {
        fn drop(&mut self) {
            self.log.borrow_mut().push("kernel");
        }
    }

    impl Kernel for RecordingKernel {
        fn create_window(
            &mut self,
            title: &str,
            width: u32,
            height: u32,
        ) -> Option<Box<dyn Window>> {
            Some(Box::new(HeadlessWindow::new(title, width, height)))
        }

        fn pending_events(&mut self, _now: u32) -> Vec<RawEvent> {
            Vec::new()
        }

        fn load_texture(&mut self, _canvas: &dyn Canvas, _path: &Path) -> Option<Box<dyn Texture>> {
            Some(Box::new(RecordingTexture {
                log: self.log.clone(),
            }))
        }

        fn time_elapsed(&self) -> u32 {
            0
        }

        fn pause_timer(&mut self) {}

        fn resume_timer(&mut self) {}
    }

    struct Crate {
        bounds: Rectangle,
        hits: Rc<RefCell<usize>>,
    }

    impl Collidable for Crate {
        fn bounding_box(&self) -> Rectangle {
            self.bounds
        }

        fn on_collision(&mut self, _other: Collider<'_>, _overlap: Rectangle) {
            *self.hits.borrow_mut() += 1;
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.config(), &EngineConfig::default());
    }

    #[test]
    fn builder_setters_update_config() {
        let builder = EngineBuilder::new()
            .with_plugin_dir("plugins")
            .with_kernel_pattern("sdl")
            .with_textures_dir("assets")
            .with_collision_mode(CollisionMode::None);

        let config = builder.config();
        assert_eq!(config.plugin_dir, PathBuf::from("plugins"));
        assert_eq!(config.kernel_pattern, "sdl");
        assert_eq!(config.textures_dir, PathBuf::from("assets"));
        assert_eq!(config.collision_mode, CollisionMode::None);
    }

    #[test]
    #[should_panic(expected = "Kernel pattern must not be empty")]
    fn builder_with_empty_pattern_panics() {
        EngineBuilder::new().with_kernel_pattern("");
    }

    #[test]
    fn build_without_plugin_is_a_configuration_error() {
        let dir = tempdir().unwrap();

        let result = EngineBuilder::new().with_plugin_dir(dir.path()).build();

        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn build_with_in_process_kernel() {
        let (kernel, _feed) = ChannelKernel::new(4);

        let engine = EngineBuilder::new()
            .with_collision_mode(CollisionMode::OneToAll)
            .with_kernel(kernel)
            .build()
            .unwrap();

        assert!(engine.kernel_origin().is_none());
        assert_eq!(engine.physics.mode(), CollisionMode::OneToAll);
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn tick_dispatches_events_then_collisions() {
        let (kernel, feed) = ChannelKernel::new(8);
        let mut engine = EngineBuilder::new().with_kernel(kernel).build().unwrap();

        let (quit, flag) = QuitSignal::new();
        engine.events.register_translator(SystemEventsTranslator);
        engine.events.register_listener(quit);

        let hits = Rc::new(RefCell::new(0));
        for x in [0.0, 5.0] {
            engine.physics.register(Crate {
                bounds: Rectangle::new(x, 0.0, 10.0, 10.0),
                hits: hits.clone(),
            });
        }

        feed.send(RawEvent::key_down(1, KeyCode::KeyA));
        feed.send(RawEvent::quit(2));

        let report = engine.tick(2).unwrap();

        assert_eq!(report.events.raw_events, 2);
        assert_eq!(report.events.game_events, 1);
        assert_eq!(report.events.handled, 1);
        assert_eq!(report.collisions.contacts, 2);
        assert_eq!(*hits.borrow(), 2);
        assert!(flag.is_raised());
    }

    #[test]
    fn quiet_tick_still_detects_collisions() {
        let (kernel, _feed) = ChannelKernel::new(8);
        let mut engine = EngineBuilder::new().with_kernel(kernel).build().unwrap();
        let hits = Rc::new(RefCell::new(0));
        engine.physics.register(Crate {
            bounds: Rectangle::new(0.0, 0.0, 1.0, 1.0),
            hits: hits.clone(),
        });
        engine.physics.register(Crate {
            bounds: Rectangle::new(0.0, 0.0, 1.0, 1.0),
            hits: hits.clone(),
        });

        let report = engine.tick(0).unwrap();

        assert_eq!(report.events, DispatchReport::default());
        assert_eq!(report.collisions.tests, 2);
    }

    #[test]
    fn texture_requires_a_window() {
        let log = Log::default();
        let mut engine = EngineBuilder::new()
            .with_kernel(RecordingKernel { log: log.clone() })
            .build()
            .unwrap();

        assert!(matches!(engine.texture("a.png"), Err(EngineError::Runtime(_))));

        engine.create_window("test", 64, 64).unwrap();

        let first = engine.texture("a.png").unwrap();
        let second = engine.texture("a.png").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn drop_releases_textures_before_kernel() {
        let log = Log::default();
        let mut engine = EngineBuilder::new()
            .with_kernel(RecordingKernel { log: log.clone() })
            .build()
            .unwrap();
        engine.create_window("test", 64, 64).unwrap();
        engine.texture("a.png").unwrap();

        drop(engine);

        assert_eq!(*log.borrow(), vec!["texture", "kernel"]);
    }

    #[test]
    fn paused_engine_clock_holds_still() {
        let (kernel, _feed) = ChannelKernel::new(1);
        let mut engine = EngineBuilder::new().with_kernel(kernel).build().unwrap();

        engine.pause();
        let before = engine.time_elapsed();
        std::thread::sleep(std::time::Duration::from_millis(10));

        assert_eq!(engine.time_elapsed(), before);
        engine.resume();
    }
}
