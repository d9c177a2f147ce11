//=========================================================================
// Game Events
//=========================================================================
//
// Domain-level events and the capabilities that produce and consume them.
//
// Flow:
// ```text
//   RawEvent[] ──EventTranslator──> TranslatedEvent[] (timestamp, payload)
//                                         ↓ GameEvent::deserialize
//                                    GameEvent ──> GameEventListener...
// ```
//
// Translators emit the serialized form; the pipeline reconstructs the
// `GameEvent` before dispatch. The payload is a small JSON document:
// `{"id": 0, "properties": {"key": "Space"}}`.
//
//=========================================================================

//=== Module Declarations =================================================

mod pipeline;
mod translators;

//=== Public API ==========================================================

pub use pipeline::{DispatchReport, EventPipeline};
pub use translators::{KeyBindingsTranslator, QuitFlag, QuitSignal, SystemEventsTranslator};

//=== External Dependencies ===============================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//=== Internal Dependencies ===============================================

use crate::core::error::{EngineError, EngineResult};
use crate::core::input::RawEvent;

//=== GameEventId =========================================================

/// Game-specific event kind. Ids below [`GameEventId::USER`] are
/// reserved for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameEventId(pub u32);

impl GameEventId {
    /// The player or the OS asked the game to stop.
    pub const QUIT: Self = Self(0);

    /// First id available to games.
    pub const USER: Self = Self(0x100);
}

//=== GameEvent ===========================================================

/// A domain event: kind, payload properties, and the kernel timestamp it
/// was produced at.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    id: GameEventId,
    timestamp: u32,
    properties: Map<String, Value>,
}

/// Wire form of a game event. The timestamp travels beside it.
#[derive(Serialize, Deserialize)]
struct Envelope {
    id: GameEventId,
    #[serde(default)]
    properties: Map<String, Value>,
}

impl GameEvent {
    pub fn new(id: GameEventId, timestamp: u32) -> Self {
        Self {
            id,
            timestamp,
            properties: Map::new(),
        }
    }

    /// Adds (or replaces) a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> GameEventId {
        self.id
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Typed property lookup; `None` if absent or of another shape.
    pub fn property_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.properties
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    //--- Wire Format ------------------------------------------------------

    /// Serialized payload, without the timestamp.
    pub fn serialize(&self) -> String {
        serde_json::json!({
            "id": self.id,
            "properties": self.properties,
        })
        .to_string()
    }

    /// Rebuilds an event from a translator payload.
    pub fn deserialize(payload: &str, timestamp: u32) -> EngineResult<Self> {
        let envelope: Envelope = serde_json::from_str(payload).map_err(|e| {
            EngineError::Dispatch(format!("malformed game event payload {payload:?}: {e}"))
        })?;

        Ok(Self {
            id: envelope.id,
            timestamp,
            properties: envelope.properties,
        })
    }
}

//=== TranslatedEvent =====================================================

/// Raw output of a translator: the timestamp and the serialized event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedEvent {
    pub timestamp: u32,
    pub payload: String,
}

impl From<&GameEvent> for TranslatedEvent {
    fn from(event: &GameEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            payload: event.serialize(),
        }
    }
}

impl From<GameEvent> for TranslatedEvent {
    fn from(event: GameEvent) -> Self {
        Self::from(&event)
    }
}

//=== Capabilities ========================================================

/// Converts a batch of raw events into zero or more game events.
///
/// Called once per tick with the full batch. Must not panic under
/// normal operation: a failure aborts the tick.
pub trait EventTranslator {
    fn translate(&self, events: &[RawEvent]) -> Vec<TranslatedEvent>;
}

impl<F> EventTranslator for F
where
    F: Fn(&[RawEvent]) -> Vec<TranslatedEvent>,
{
    fn translate(&self, events: &[RawEvent]) -> Vec<TranslatedEvent> {
        self(events)
    }
}

/// Consumes game events. Returning `true` marks the event handled and
/// stops its delivery to later listeners.
pub trait GameEventListener {
    fn on_event(&mut self, event: &GameEvent) -> bool;
}

impl<F> GameEventListener for F
where
    F: FnMut(&GameEvent) -> bool,
{
    fn on_event(&mut self, event: &GameEvent) -> bool {
        self(event)
    }
}

//=== Registry Ids ========================================================

/// Handle returned by [`EventPipeline::register_translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranslatorId(pub(crate) u64);

/// Handle returned by [`EventPipeline::register_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

//=========================================================================
// Unit Tests
//=========================================================================
