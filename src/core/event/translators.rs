//=========================================================================
// Built-in Translators and Listeners
//=========================================================================
//
// - SystemEventsTranslator: kernel Quit → GameEventId::QUIT
// - KeyBindingsTranslator:  (key, modifiers) presses → game event ids
// - QuitSignal:             consumes QUIT and raises a flag the host
//                           loop polls to stop ticking
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::{EventTranslator, GameEvent, GameEventId, GameEventListener, TranslatedEvent};
use crate::core::input::{ButtonState, KeyCode, Modifiers, RawEvent, RawEventKind};

//=== SystemEventsTranslator ==============================================

/// Turns kernel shutdown requests into [`GameEventId::QUIT`] events.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEventsTranslator;

impl EventTranslator for SystemEventsTranslator {
    fn translate(&self, events: &[RawEvent]) -> Vec<TranslatedEvent> {
        events
            .iter()
            .filter(|event| event.is_quit())
            .map(|event| TranslatedEvent::from(GameEvent::new(GameEventId::QUIT, event.timestamp)))
            .collect()
    }
}

//=== KeyBindingsTranslator ===============================================

/// Maps key presses to game events via `(key, modifiers)` lookups.
///
/// Modifiers must match exactly: a binding for `Ctrl+S` does not fire
/// on `Ctrl+Shift+S`, and a binding for `S` does not fire on `Ctrl+S`.
/// Releases are ignored. Emitted events carry the `key` property.
#[derive(Debug, Clone, Default)]
pub struct KeyBindingsTranslator {
    bindings: HashMap<(KeyCode, Modifiers), GameEventId>,
}

impl KeyBindingsTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Binding API ------------------------------------------------------

    /// Binds a key (no modifiers) to a game event.
    pub fn bind_key(&mut self, key: KeyCode, id: GameEventId) -> &mut Self {
        self.bind_key_with_mods(key, Modifiers::NONE, id)
    }

    /// Binds a key with an exact modifier combination.
    pub fn bind_key_with_mods(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        id: GameEventId,
    ) -> &mut Self {
        if let Some(previous) = self.bindings.insert((key, modifiers), id) {
            debug!("Rebound {:?}+{:?} from {:?} to {:?}", modifiers, key, previous, id);
        }
        self
    }

    /// Removes the binding without modifiers (modified variants stay).
    pub fn unbind_key(&mut self, key: KeyCode) -> &mut Self {
        self.bindings.remove(&(key, Modifiers::NONE));
        self
    }

    /// Removes every binding for `key`, whatever the modifiers.
    pub fn unbind_key_all_variants(&mut self, key: KeyCode) -> &mut Self {
        self.bindings.retain(|&(k, _), _| k != key);
        self
    }

    pub fn binding(&self, key: KeyCode, modifiers: Modifiers) -> Option<GameEventId> {
        self.bindings.get(&(key, modifiers)).copied()
    }
}

impl EventTranslator for KeyBindingsTranslator {
    fn translate(&self, events: &[RawEvent]) -> Vec<TranslatedEvent> {
        events
            .iter()
            .filter_map(|event| match event.kind {
                RawEventKind::Key {
                    key,
                    state: ButtonState::Pressed,
                    modifiers,
                } => self.binding(key, modifiers).map(|id| {
                    TranslatedEvent::from(
                        GameEvent::new(id, event.timestamp)
                            .with_property("key", format!("{:?}", key)),
                    )
                }),
                _ => None,
            })
            .collect()
    }
}

//=== QuitSignal ==========================================================

/// Read side of a [`QuitSignal`], held by the host loop.
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Rc<Cell<bool>>);

impl QuitFlag {
    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    pub fn reset(&self) {
        self.0.set(false);
    }
}

/// Listener that consumes QUIT events and raises its [`QuitFlag`].
#[derive(Debug)]
pub struct QuitSignal {
    flag: QuitFlag,
}

impl QuitSignal {
    pub fn new() -> (Self, QuitFlag) {
        let flag = QuitFlag::default();
        (Self { flag: flag.clone() }, flag)
    }
}

impl GameEventListener for QuitSignal {
    fn on_event(&mut self, event: &GameEvent) -> bool {
        if event.id() != GameEventId::QUIT {
            return false;
        }

        debug!("Quit requested at {}", event.timestamp());
        self.flag.0.set(true);
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
