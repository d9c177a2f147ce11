//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use ijengine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder, TickReport};
pub use crate::core::{EngineConfig, EngineError, EngineResult, Rectangle};

// Events
pub use crate::core::event::{
    EventTranslator, GameEvent, GameEventId, GameEventListener, KeyBindingsTranslator, QuitFlag,
    QuitSignal, SystemEventsTranslator, TranslatedEvent,
};

// Raw input
pub use crate::core::input::{ButtonState, KeyCode, Modifiers, MouseButton, RawEvent, RawEventKind};

// Kernel
pub use crate::core::kernel::{Canvas, ChannelKernel, Kernel, KernelFeed, Texture, Window};

// Physics
pub use crate::core::physics::{Collidable, CollidableId, Collider, CollisionMode};

// Levels
pub use crate::core::level::{Level, LevelFactory};
