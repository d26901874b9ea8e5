//! # Ormr: a minimal 2D game engine core
//!
//! A small fixed-timestep engine for sprite games: a z-ordered entity
//! registry with a class-template lifecycle, an adaptive frame-skip
//! scheduler, box collision, tile maps, and a resource registry. Rendering,
//! windowing, and event wiring stay on the host's side of the [`surface`]
//! and [`input`] boundaries, so the same game logic runs against a real
//! canvas or completely headless.
//!
//! Start with `use ormr::prelude::*`, build an [`Engine`](engine::Engine),
//! register entity classes, and hand the engine to a
//! [`FrameScheduler`](scheduler::FrameScheduler). `examples/subsea.rs` walks
//! through a whole game.

pub mod assets;
pub mod camera;
pub mod engine;
pub mod entity;
pub mod error;
pub mod input;
pub mod math;
pub mod prelude;
pub mod scheduler;
pub mod sorted;
pub mod store;
pub mod surface;
pub mod tilemap;
