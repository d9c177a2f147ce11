//=========================================================================
// Core Systems
//=========================================================================
//
// Every engine subsystem, leaves first:
//
//   geometry   → Rectangle, intersection
//   input      → raw event vocabulary reported by kernels
//   kernel     → plugin binding and the in-process ChannelKernel
//   event      → translators, listeners, dispatch
//   physics    → collidables and the collision engine
//   resources  → kernel-backed texture cache
//   level      → level factory slot
//   config     → TOML engine settings
//   error      → EngineError
//
// The `Engine` facade owns one instance of each and drives them per
// tick; the subsystems never reach each other except through it.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod kernel;
pub mod level;
pub mod physics;
pub mod resources;

//=== Public API ==========================================================

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use geometry::Rectangle;
