//=========================================================================
// Levels
//=========================================================================
//
// Optional slot for the game's level factory.
//
// The engine never inspects level content: it asks the factory for a
// level by id, lets the host loop drive it, and hands it back when the
// level reports `done()`. `next()` names the level to make after it.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Capabilities ========================================================

/// A playable level, as seen by the host loop.
pub trait Level {
    fn id(&self) -> &str;

    /// `true` once the level is finished and should be replaced.
    fn done(&self) -> bool;

    /// Id of the level that follows. An id the factory does not know
    /// ends the game.
    fn next(&self) -> String;

    /// Advances the level by one tick.
    fn update(&mut self, _now: u32, _last: u32) {}
}

/// Builds levels by id and takes them back when they are done.
pub trait LevelFactory {
    fn make_level(&mut self, id: &str) -> Option<Box<dyn Level>>;

    fn release(&mut self, level: Box<dyn Level>) {
        drop(level);
    }
}

//=== LevelRegistry =======================================================

#[derive(Default)]
pub struct LevelRegistry {
    factory: Option<Box<dyn LevelFactory>>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `factory`, replacing any previous one.
    pub fn set_factory(&mut self, factory: Box<dyn LevelFactory>) {
        if self.factory.replace(factory).is_some() {
            debug!("Replaced level factory");
        } else {
            debug!("Level factory set");
        }
    }

    /// Removes the factory and returns it.
    pub fn clear_factory(&mut self) -> Option<Box<dyn LevelFactory>> {
        self.factory.take()
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Builds level `id`. `None` without a factory or for unknown ids.
    pub fn make(&mut self, id: &str) -> Option<Box<dyn Level>> {
        let Some(factory) = self.factory.as_mut() else {
            warn!("No level factory to make '{}'", id);
            return None;
        };

        let level = factory.make_level(id);
        if level.is_none() {
            debug!("Level factory has no level '{}'", id);
        }
        level
    }

    /// Returns `level` to the factory. Without a factory it is dropped.
    pub fn release(&mut self, level: Box<dyn Level>) {
        debug!("Releasing level '{}'", level.id());

        if let Some(factory) = self.factory.as_mut() {
            factory.release(level);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
