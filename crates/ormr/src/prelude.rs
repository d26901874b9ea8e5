//! Common imports for games built on ormr.
//!
//! `use ormr::prelude::*` pulls in everything a typical game touches.

pub use glam::Vec2;

pub use crate::assets::{Assets, Image};
pub use crate::camera::Camera;
pub use crate::engine::{Engine, EngineConfig, EngineFrame};
pub use crate::entity::{
    draw_sprite, Behavior, Canvas, ClassConfig, Entity, EntityData, EntityId, Sprite,
    SpriteBehavior, SpriteConfig, Tick,
};
pub use crate::error::EngineError;
pub use crate::input::{keycode, InputState};
pub use crate::math::Rect;
pub use crate::scheduler::{
    Clock, CycleHooks, CycleOutcome, FrameScheduler, ManualClock, SystemClock,
};
pub use crate::sorted::SortedList;
pub use crate::store::{Commands, EntityStore};
pub use crate::surface::{Color, DrawOptions, NullSurface, RectStyle, Surface, TextStyle};
pub use crate::tilemap::TileMap;
