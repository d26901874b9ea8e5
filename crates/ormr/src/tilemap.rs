//! Tile maps: whole-map drawing and solid-tile collision.
//!
//! A map is row-major tile indices into a tileset strip (frame `n` starts at
//! `n * tile_width` in the image, like sprite frames). Maps are plain data
//! and deserialize from JSON, which is the format the map converter tooling
//! emits; `solid` lists the indices that block movement.
//!
//! `TileMap` implements [`Behavior`], so a map can be registered as an
//! entity class directly: the entity's position becomes the map origin and
//! the default process does nothing. Games that scroll wrap it in their own
//! behavior and delegate drawing to [`TileMap::draw_at`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{Behavior, Canvas, EntityData};
use crate::error::EngineError;
use crate::math::Rect;
use crate::surface::DrawOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    /// Resource id of the tileset strip.
    pub tileset: String,
    pub tile_width: f32,
    pub tile_height: f32,
    /// Row-major tile indices, one inner vec per row.
    pub rows: Vec<Vec<u16>>,
    /// Tile indices that block movement.
    #[serde(default)]
    pub solid: Vec<u16>,
}

impl TileMap {
    /// Parse a map from JSON and validate its shape.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let map: TileMap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<(), EngineError> {
        let width = self.width_tiles();
        if self.rows.iter().any(|row| row.len() != width) {
            return Err(EngineError::TileMapShape("rows have uneven widths".to_string()));
        }
        Ok(())
    }

    pub fn width_tiles(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height_tiles(&self) -> usize {
        self.rows.len()
    }

    /// Whether the tile at grid position (`tx`, `ty`) blocks movement.
    /// Positions outside the map are open.
    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        if tx < 0 || ty < 0 {
            return false;
        }
        self.rows
            .get(ty as usize)
            .and_then(|row| row.get(tx as usize))
            .is_some_and(|tile| self.solid.contains(tile))
    }

    /// True if `bounds` (world pixels) touches any solid tile of a map whose
    /// top-left corner sits at `origin`.
    pub fn collides(&self, bounds: Rect, origin: Vec2) -> bool {
        // Inclusive far edges, so a box flush against a solid tile's left
        // side does not already count as inside it.
        let left = bounds.left() - origin.x;
        let top = bounds.top() - origin.y;
        let right = left + bounds.size.x - 1.0;
        let bottom = top + bounds.size.y - 1.0;

        let t_left = (left / self.tile_width).floor() as i32;
        let t_top = (top / self.tile_height).floor() as i32;
        let t_right = (right / self.tile_width).ceil() as i32;
        let t_bottom = (bottom / self.tile_height).ceil() as i32;

        for ty in t_top..t_bottom {
            for tx in t_left..t_right {
                if self.is_solid(tx, ty) {
                    return true;
                }
            }
        }
        false
    }

    /// Blit every tile, with the map's top-left corner at `origin` (screen
    /// pixels). Skips silently while the tileset is not loaded.
    pub fn draw_at(&self, canvas: &mut Canvas<'_>, origin: Vec2) {
        let Some(image) = canvas.assets.get(&self.tileset) else {
            return;
        };
        for (ty, row) in self.rows.iter().enumerate() {
            for (tx, &tile) in row.iter().enumerate() {
                let src = Rect::new(f32::from(tile) * self.tile_width, 0.0, self.tile_width, self.tile_height);
                let dest = Rect::new(
                    origin.x + tx as f32 * self.tile_width,
                    origin.y + ty as f32 * self.tile_height,
                    self.tile_width,
                    self.tile_height,
                );
                canvas.surface.draw_image(image, src, dest, DrawOptions::default());
            }
        }
    }
}

impl Behavior for TileMap {
    fn draw(&self, data: &EntityData, canvas: &mut Canvas<'_>) {
        let origin = Vec2::new(data.x - canvas.camera.pos.x, data.y - canvas.camera.pos.y);
        self.draw_at(canvas, origin);
    }
}
