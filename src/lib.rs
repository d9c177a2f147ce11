//=========================================================================
// ijengine Library Root
//
// Simulation core of a small real-time 2D game engine.
//
// Responsibilities:
// - Bind the platform kernel (a runtime-loaded plugin or an in-process
//   implementation) and expose its services
// - Turn raw kernel input into game events and dispatch them
// - Detect collisions between registered game objects every tick
//
// Typical usage:
// ```no_run
// use ijengine::prelude::*;
//
// fn main() -> Result<(), EngineError> {
//     let mut engine = EngineBuilder::new().build()?;
//     loop {
//         let now = engine.time_elapsed();
//         engine.tick(now)?;
//     }
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds every subsystem (kernel, events, physics, resources,
// levels). Games use it to implement translators, listeners and
// collidables; kernel plugins use it to implement `Kernel`.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the facade that owns and ticks the core systems.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, TickReport};
