//=========================================================================
// Channel Kernel
//=========================================================================
//
// In-process kernel whose raw events arrive through a channel.
//
// Architecture:
//   KernelFeed (any thread) ──send()──> crossbeam channel
//                                             ↓
//   ChannelKernel::pending_events(now) ── drain (bounded) ──> held
//                                             ↓
//                              ready: timestamp <= now  (arrival order)
//                              held:  timestamp >  now  (next ticks)
//
// Windows, canvases and textures are headless stand-ins. Used by the
// headless runner and by tests that need a deterministic kernel.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{Canvas, Kernel, Texture, Window};
use crate::core::input::RawEvent;

//=== KernelFeed ==========================================================

/// Sending half of a [`ChannelKernel`]. Cheap to clone; may live on
/// another thread.
#[derive(Debug, Clone)]
pub struct KernelFeed {
    sender: Sender<RawEvent>,
}

impl KernelFeed {
    /// Queues an event. Returns `false` if the kernel is gone or the
    /// channel is full.
    pub fn send(&self, event: RawEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                warn!("kernel feed dropped event: {}", e);
                false
            }
        }
    }

    /// Queues an event, waiting for room if the channel is full. Returns
    /// `false` only if the kernel is gone.
    pub fn send_blocking(&self, event: RawEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(e) => {
                warn!("kernel feed closed: {}", e);
                false
            }
        }
    }
}

//=== KernelClock =========================================================

/// Wall clock with pause support, reported in whole milliseconds.
struct KernelClock {
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl KernelClock {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    fn elapsed_ms(&self) -> u32 {
        let reference = self.paused_at.unwrap_or_else(Instant::now);
        let running = reference
            .saturating_duration_since(self.started)
            .saturating_sub(self.paused_total);
        u32::try_from(running.as_millis()).unwrap_or(u32::MAX)
    }

    fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += paused_at.elapsed();
        }
    }
}

//=== ChannelKernel =======================================================

pub struct ChannelKernel {
    receiver: Receiver<RawEvent>,
    held: Vec<RawEvent>,
    capacity: usize,
    clock: KernelClock,
}

impl ChannelKernel {
    /// Upper bound of events pulled from the channel per poll.
    const MAX_EVENTS_PER_POLL: usize = 256;

    /// Creates a kernel and its feed. `capacity` bounds the channel and
    /// the number of future events held between polls.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> (Self, KernelFeed) {
        assert!(capacity > 0, "Feed capacity must be positive");

        let (sender, receiver) = bounded(capacity);
        let kernel = Self {
            receiver,
            held: Vec::with_capacity(capacity.min(64)),
            capacity,
            clock: KernelClock::new(),
        };

        (kernel, KernelFeed { sender })
    }

    //--- drain() -----------------------------------------------------------
    //
    // Moves queued events into `held`, bounded to prevent starvation.
    //
    fn drain(&mut self) {
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_POLL {
            match self.receiver.try_recv() {
                Ok(event) => {
                    self.held.push(event);
                    drained += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_POLL {
            warn!("Kernel feed backlog: drained {} events this poll", drained);
        }
    }
}

impl Kernel for ChannelKernel {
    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Option<Box<dyn Window>> {
        debug!("headless window '{}' ({}x{})", title, width, height);
        Some(Box::new(HeadlessWindow::new(title, width, height)))
    }

    fn pending_events(&mut self, now: u32) -> Vec<RawEvent> {
        self.drain();

        let (ready, mut later): (Vec<RawEvent>, Vec<RawEvent>) =
            self.held.drain(..).partition(|event| event.timestamp <= now);

        if later.len() > self.capacity {
            warn!(
                "Kernel feed: {} future events held, dropping the {} latest arrivals",
                later.len(),
                later.len() - self.capacity
            );
            later.truncate(self.capacity);
        }
        self.held = later;

        ready
    }

    fn load_texture(&mut self, _canvas: &dyn Canvas, path: &Path) -> Option<Box<dyn Texture>> {
        if !path.is_file() {
            warn!("headless texture '{}' not found", path.display());
            return None;
        }

        Some(Box::new(HeadlessTexture {
            path: path.to_path_buf(),
        }))
    }

    fn time_elapsed(&self) -> u32 {
        self.clock.elapsed_ms()
    }

    fn pause_timer(&mut self) {
        self.clock.pause();
    }

    fn resume_timer(&mut self) {
        self.clock.resume();
    }
}

//=== Headless Collaborators ==============================================

/// Window without an OS surface.
pub struct HeadlessWindow {
    title: String,
    canvas: Rc<HeadlessCanvas>,
}

impl HeadlessWindow {
    pub fn new(title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            canvas: Rc::new(HeadlessCanvas { width, height }),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Window for HeadlessWindow {
    fn canvas(&self) -> Rc<dyn Canvas> {
        self.canvas.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessCanvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas for HeadlessCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Texture that only remembers where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessTexture {
    pub path: PathBuf,
}

impl Texture for HeadlessTexture {
    fn width(&self) -> u32 {
        0
    }

    fn height(&self) -> u32 {
        0
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
