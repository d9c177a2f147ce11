//=========================================================================
// Headless Runner
//=========================================================================
//
// Drives the engine on an in-process `ChannelKernel` with a scripted
// input thread, without any OS window.
//
// Usage:
//   ijengine-headless [engine.toml]
//
// The script presses Space a few times, then asks the kernel to quit.
// Space is bound to a "jump" game event that nudges the player box; the
// player is the one-to-all collision target against a fixed wall.
//
// RUST_LOG controls verbosity (default: info).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use env_logger::Builder;
use log::{error, info, LevelFilter};

//=== Internal Dependencies ===============================================

use ijengine::prelude::*;

//=== Demo Objects ========================================================

const JUMP: GameEventId = GameEventId(0x101);
const TICK: Duration = Duration::from_millis(16);

/// Box whose horizontal position is shared with its jump listener.
struct Body {
    name: &'static str,
    x: Rc<Cell<f64>>,
    size: f64,
}

impl Collidable for Body {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(self.x.get(), 0.0, self.size, self.size)
    }

    fn on_collision(&mut self, other: Collider<'_>, overlap: Rectangle) {
        info!(
            "{} hit {:?} (overlap {}x{})",
            self.name, other.id, overlap.w, overlap.h
        );
    }
}

//=== Input Script ========================================================

fn spawn_script(feed: KernelFeed, start: u32) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for step in 1..=4u32 {
            thread::sleep(TICK * 5);
            let at = start + step * 80;
            feed.send(RawEvent::key_down(at, KeyCode::Space));
            feed.send(RawEvent::key_up(at, KeyCode::Space));
        }

        thread::sleep(TICK * 5);
        // The loop only ends on QUIT: wait for room rather than drop it.
        if !feed.send_blocking(RawEvent::quit(start + 400)) {
            error!("kernel gone before quit could be sent");
        }
    })
}

//=== main() ==============================================================

fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(Path::new(&path))?,
        None => EngineConfig::default(),
    };

    let (kernel, feed) = ChannelKernel::new(config.feed_capacity);
    let mut engine = EngineBuilder::new()
        .with_config(config)
        .with_kernel(kernel)
        .build()?;

    let _window = engine.create_window("ijengine headless", 320, 240)?;

    //--- Events -----------------------------------------------------------

    let mut bindings = KeyBindingsTranslator::new();
    bindings.bind_key(KeyCode::Space, JUMP);

    let (quit, quit_flag) = QuitSignal::new();
    engine.events.register_translator(SystemEventsTranslator);
    engine.events.register_translator(bindings);
    engine.events.register_listener(quit);

    let player_x = Rc::new(Cell::new(0.0));
    let jumps = player_x.clone();
    engine.events.register_listener(move |event: &GameEvent| {
        if event.id() != JUMP {
            return false;
        }
        jumps.set(jumps.get() + 10.0);
        info!("jump at {} ms, player x = {}", event.timestamp(), jumps.get());
        true
    });

    //--- Physics ----------------------------------------------------------

    let player = engine.physics.register(Body {
        name: "player",
        x: player_x,
        size: 10.0,
    });
    engine.physics.register(Body {
        name: "wall",
        x: Rc::new(Cell::new(35.0)),
        size: 10.0,
    });
    engine.physics.set_mode(CollisionMode::OneToAll, Some(player));

    //--- Loop -------------------------------------------------------------

    let script = spawn_script(feed, engine.time_elapsed());
    let mut ticks = 0u64;

    while !quit_flag.is_raised() {
        let now = engine.time_elapsed();
        engine.tick(now)?;
        ticks += 1;
        thread::sleep(TICK);
    }

    if script.join().is_err() {
        error!("input script panicked");
    }

    info!("Quit after {} ticks", ticks);
    Ok(())
}
