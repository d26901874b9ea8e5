//! # Entities, class templates, and behaviors
//!
//! An entity is a mutable record: identity, a collision box, a paint-order
//! key, a group tag, and a sprite. What it *does* each frame lives in its
//! [`Behavior`], a capability set with three slots:
//!
//! - `process` runs once per cycle, before drawing. Default: nothing.
//! - `draw` paints the entity. Default: blit the current sprite frame,
//!   gated by the camera visibility test.
//! - `on_destroy` runs after the entity has left the store. Default: nothing.
//!
//! Entities are cloned from named class templates registered with the
//! [`EntityStore`](crate::store::EntityStore). A template is described by a
//! [`ClassConfig`] whose unset fields are filled with engine defaults by
//! [`ClassConfig::fill_defaults`]; fields the game sets are never touched.

use std::fmt;

use crate::assets::Assets;
use crate::camera::Camera;
use crate::input::InputState;
use crate::math::Rect;
use crate::store::{Commands, EntityStore};
use crate::surface::{DrawOptions, Surface};

// ── Identity ─────────────────────────────────────────────────────────────

/// Identifies one entity for the lifetime of a store.
///
/// Ids handed out by the store only ever increase; a destroyed id is never
/// recycled. Explicit ids are the caller's to keep unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Sprite ───────────────────────────────────────────────────────────────

/// The graphic sub-record: image reference plus frame animation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Resource id of the sheet, a horizontal strip of equal-width frames.
    /// `None` means nothing to draw.
    pub image: Option<String>,
    pub anim: bool,
    pub cur_frame: u32,
    pub frame_count: u32,
    pub frame_width: f32,
    pub frame_height: f32,
    /// Frames to wait between animation advances. Measured in engine frames,
    /// not seconds.
    pub delay: u32,
    pub frames_since_last: u32,
    pub hflip: bool,
    pub vflip: bool,
    pub scale: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            image: None,
            anim: false,
            cur_frame: 0,
            frame_count: 0,
            frame_width: 0.0,
            frame_height: 0.0,
            delay: 0,
            frames_since_last: 0,
            hflip: false,
            vflip: false,
            scale: 1.0,
        }
    }
}

impl Sprite {
    /// Advance the animation by one processed frame: count up to `delay`,
    /// then step `cur_frame` modulo `frame_count`. A sprite that is not
    /// animated, or has fewer than two frames, never advances.
    pub fn advance(&mut self) {
        if !self.anim || self.frame_count <= 1 {
            return;
        }
        if self.frames_since_last >= self.delay {
            self.frames_since_last = 0;
            self.cur_frame = (self.cur_frame + 1) % self.frame_count;
        } else {
            self.frames_since_last += 1;
        }
    }
}

// ── Entity data ──────────────────────────────────────────────────────────

/// The mutable state of one live entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityData {
    pub id: EntityId,
    /// Name of the class this entity was cloned from.
    pub class: String,
    /// Bucket tag for coarse bulk lookup. Fixed at creation.
    pub group: String,
    pub x: f32,
    pub y: f32,
    /// Paint-order key, ascending. Changing it on a live entity does not
    /// re-sort the paint order; only create and destroy touch that.
    pub z: f32,
    pub width: f32,
    pub height: f32,
    pub sprite: Sprite,
}

impl EntityData {
    /// The collision box.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The on-screen box of the current sprite frame.
    pub fn sprite_bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.sprite.frame_width, self.sprite.frame_height)
    }

    /// Box overlap with another entity.
    pub fn collides_with(&self, other: &EntityData) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

// ── Phase contexts ───────────────────────────────────────────────────────

/// What a behavior sees during the process phase.
///
/// The entity being processed is detached from the store for the duration of
/// its own `process` call, so `store.get` on its id returns `None` there.
/// Structural changes go through `commands` and take effect once the
/// traversal finishes.
pub struct Tick<'a> {
    pub store: &'a EntityStore,
    pub input: &'a InputState,
    pub camera: &'a Camera,
    pub assets: &'a Assets,
    pub commands: &'a mut Commands,
}

/// What a behavior sees during the draw phase.
pub struct Canvas<'a> {
    pub surface: &'a mut dyn Surface,
    pub assets: &'a Assets,
    pub camera: &'a Camera,
}

// ── Behavior ─────────────────────────────────────────────────────────────

/// The capability set every entity variant implements. All three methods
/// have defaults, so a behavior only spells out what it overrides.
pub trait Behavior: BehaviorClone {
    /// Per-frame logic. Runs after the sprite animation counters advance.
    fn process(&mut self, data: &mut EntityData, tick: &mut Tick<'_>) {
        let _ = (data, tick);
    }

    /// Paint the entity. The default blits the current sprite frame.
    fn draw(&self, data: &EntityData, canvas: &mut Canvas<'_>) {
        draw_sprite(data, canvas);
    }

    /// Runs during destroy, after the entity has left every store view.
    fn on_destroy(&mut self, data: &EntityData) {
        let _ = data;
    }
}

/// Clone plumbing so boxed behaviors can be duplicated when a class template
/// is instantiated. Blanket-implemented for every `Behavior + Clone`.
pub trait BehaviorClone {
    fn clone_box(&self) -> Box<dyn Behavior>;
}

impl<B> BehaviorClone for B
where
    B: Behavior + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Behavior> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Behavior> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The default behavior: a static or animated sprite with no logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteBehavior;

impl Behavior for SpriteBehavior {}

/// The generic sprite blit used by the default `draw`. Public so custom
/// draws can paint the sprite and then decorate on top.
///
/// Skips silently when the sprite has no image, the resource is not loaded
/// yet, or the frame is outside the camera view.
pub fn draw_sprite(data: &EntityData, canvas: &mut Canvas<'_>) {
    let sprite = &data.sprite;
    let Some(image_id) = &sprite.image else {
        return;
    };
    let Some(image) = canvas.assets.get(image_id) else {
        return;
    };
    if !canvas.camera.in_view(data.sprite_bounds()) {
        return;
    }

    let src = Rect::new(
        sprite.cur_frame as f32 * sprite.frame_width,
        0.0,
        sprite.frame_width,
        sprite.frame_height,
    );
    let dest = Rect::new(
        data.x - canvas.camera.pos.x,
        data.y - canvas.camera.pos.y,
        sprite.frame_width * sprite.scale,
        sprite.frame_height * sprite.scale,
    );
    canvas.surface.draw_image(
        image,
        src,
        dest,
        DrawOptions {
            hflip: sprite.hflip,
            vflip: sprite.vflip,
        },
    );
}

// ── Class templates ──────────────────────────────────────────────────────

/// Declarative description of a class template. Every field is optional;
/// whatever the game leaves unset is filled by [`fill_defaults`](Self::fill_defaults)
/// when the class is registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassConfig {
    pub group: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub sprite: SpriteConfig,
}

/// Sprite portion of a [`ClassConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteConfig {
    pub image: Option<String>,
    pub anim: Option<bool>,
    pub frame_count: Option<u32>,
    pub frame_width: Option<f32>,
    pub frame_height: Option<f32>,
    pub delay: Option<u32>,
    pub hflip: Option<bool>,
    pub vflip: Option<bool>,
    pub scale: Option<f32>,
}

impl ClassConfig {
    /// The default-fill step: give every unset field its engine default,
    /// recursing into the sprite. Set fields are never overwritten, so
    /// filling twice is the same as filling once.
    pub fn fill_defaults(&mut self) {
        self.group.get_or_insert_with(String::new);
        self.x.get_or_insert(0.0);
        self.y.get_or_insert(0.0);
        self.z.get_or_insert(0.0);
        self.width.get_or_insert(0.0);
        self.height.get_or_insert(0.0);

        let sprite = &mut self.sprite;
        sprite.anim.get_or_insert(false);
        sprite.frame_count.get_or_insert(0);
        sprite.frame_width.get_or_insert(0.0);
        sprite.frame_height.get_or_insert(0.0);
        sprite.delay.get_or_insert(0);
        sprite.hflip.get_or_insert(false);
        sprite.vflip.get_or_insert(false);
        sprite.scale.get_or_insert(1.0);
    }
}

/// A registered template, ready to be cloned into live entities.
#[derive(Clone)]
pub struct EntityClass {
    name: String,
    pub(crate) group: String,
    x: f32,
    y: f32,
    z: f32,
    width: f32,
    height: f32,
    sprite: Sprite,
    behavior: Box<dyn Behavior>,
}

impl EntityClass {
    pub(crate) fn from_config(name: &str, mut config: ClassConfig, behavior: Box<dyn Behavior>) -> Self {
        config.fill_defaults();
        let sprite_config = config.sprite;
        Self {
            name: name.to_string(),
            group: config.group.unwrap_or_default(),
            x: config.x.unwrap_or_default(),
            y: config.y.unwrap_or_default(),
            z: config.z.unwrap_or_default(),
            width: config.width.unwrap_or_default(),
            height: config.height.unwrap_or_default(),
            sprite: Sprite {
                image: sprite_config.image,
                anim: sprite_config.anim.unwrap_or_default(),
                cur_frame: 0,
                frame_count: sprite_config.frame_count.unwrap_or_default(),
                frame_width: sprite_config.frame_width.unwrap_or_default(),
                frame_height: sprite_config.frame_height.unwrap_or_default(),
                delay: sprite_config.delay.unwrap_or_default(),
                frames_since_last: 0,
                hflip: sprite_config.hflip.unwrap_or_default(),
                vflip: sprite_config.vflip.unwrap_or_default(),
                scale: sprite_config.scale.unwrap_or(1.0),
            },
            behavior,
        }
    }

    /// The paint-order key entities of this class start with.
    pub fn z(&self) -> f32 {
        self.z
    }

    pub(crate) fn instantiate(&self, id: EntityId) -> Entity {
        Entity {
            data: EntityData {
                id,
                class: self.name.clone(),
                group: self.group.clone(),
                x: self.x,
                y: self.y,
                z: self.z,
                width: self.width,
                height: self.height,
                sprite: self.sprite.clone(),
            },
            behavior: self.behavior.clone(),
        }
    }
}

/// One live entity: its data record plus its boxed behavior.
#[derive(Clone)]
pub struct Entity {
    pub data: EntityData,
    pub(crate) behavior: Box<dyn Behavior>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{Op, RecordingSurface};

    fn animated_sprite(frame_count: u32, delay: u32) -> Sprite {
        Sprite {
            anim: true,
            frame_count,
            delay,
            frame_width: 16.0,
            frame_height: 16.0,
            ..Sprite::default()
        }
    }

    #[test]
    fn animation_advances_after_delay() {
        let mut sprite = animated_sprite(2, 2);
        // Counter climbs to the delay, then the frame steps and it resets.
        sprite.advance();
        assert_eq!((sprite.cur_frame, sprite.frames_since_last), (0, 1));
        sprite.advance();
        assert_eq!((sprite.cur_frame, sprite.frames_since_last), (0, 2));
        sprite.advance();
        assert_eq!((sprite.cur_frame, sprite.frames_since_last), (1, 0));
    }

    #[test]
    fn animation_wraps_around() {
        let mut sprite = animated_sprite(3, 0);
        for expected in [1, 2, 0, 1] {
            sprite.advance();
            assert_eq!(sprite.cur_frame, expected);
        }
    }

    #[test]
    fn single_frame_sprites_never_advance() {
        let mut sprite = animated_sprite(1, 0);
        for _ in 0..5 {
            sprite.advance();
        }
        assert_eq!(sprite.cur_frame, 0);
        assert_eq!(sprite.frames_since_last, 0);

        let mut empty = animated_sprite(0, 0);
        empty.advance();
        assert_eq!(empty.cur_frame, 0);
    }

    #[test]
    fn unanimated_sprites_never_advance() {
        let mut sprite = animated_sprite(4, 0);
        sprite.anim = false;
        sprite.advance();
        assert_eq!(sprite.cur_frame, 0);
    }

    #[test]
    fn fill_defaults_is_idempotent() {
        let mut config = ClassConfig {
            group: Some("enemy".to_string()),
            z: Some(90.0),
            sprite: SpriteConfig {
                image: Some("slug".to_string()),
                delay: Some(10),
                ..SpriteConfig::default()
            },
            ..ClassConfig::default()
        };
        config.fill_defaults();
        let once = config.clone();
        config.fill_defaults();
        assert_eq!(config, once);
    }

    #[test]
    fn fill_defaults_never_overwrites_set_fields() {
        let mut config = ClassConfig {
            z: Some(90.0),
            sprite: SpriteConfig {
                scale: Some(2.0),
                ..SpriteConfig::default()
            },
            ..ClassConfig::default()
        };
        config.fill_defaults();
        assert_eq!(config.z, Some(90.0));
        assert_eq!(config.sprite.scale, Some(2.0));
        // And unset fields did get their defaults.
        assert_eq!(config.x, Some(0.0));
        assert_eq!(config.sprite.anim, Some(false));
    }

    fn draw_fixture() -> (EntityData, Assets, Camera) {
        let mut assets = Assets::new();
        assets.insert("ship", crate::assets::Image::blank(32, 16));
        let data = EntityData {
            id: EntityId(1),
            class: "ship".to_string(),
            group: String::new(),
            x: 40.0,
            y: 60.0,
            z: 0.0,
            width: 16.0,
            height: 16.0,
            sprite: Sprite {
                image: Some("ship".to_string()),
                frame_width: 16.0,
                frame_height: 16.0,
                frame_count: 2,
                cur_frame: 1,
                ..Sprite::default()
            },
        };
        (data, assets, Camera::new(256.0, 240.0))
    }

    #[test]
    fn default_draw_blits_the_current_frame() {
        let (data, assets, camera) = draw_fixture();
        let mut surface = RecordingSurface::default();
        let mut canvas = Canvas {
            surface: &mut surface,
            assets: &assets,
            camera: &camera,
        };
        draw_sprite(&data, &mut canvas);

        assert_eq!(surface.ops.len(), 1);
        let Op::Image { src, dest, .. } = &surface.ops[0] else {
            panic!("expected an image blit");
        };
        // Frame 1 of a 16px strip starts at x = 16.
        assert_eq!(src, &Rect::new(16.0, 0.0, 16.0, 16.0));
        assert_eq!(dest, &Rect::new(40.0, 60.0, 16.0, 16.0));
    }

    #[test]
    fn default_draw_subtracts_the_camera() {
        let (data, assets, mut camera) = draw_fixture();
        camera.pos = glam::Vec2::new(30.0, 50.0);
        let mut surface = RecordingSurface::default();
        let mut canvas = Canvas {
            surface: &mut surface,
            assets: &assets,
            camera: &camera,
        };
        draw_sprite(&data, &mut canvas);

        let Op::Image { dest, .. } = &surface.ops[0] else {
            panic!("expected an image blit");
        };
        assert_eq!(dest.pos, glam::Vec2::new(10.0, 10.0));
    }

    #[test]
    fn default_draw_skips_out_of_view() {
        let (mut data, assets, camera) = draw_fixture();
        data.x = -100.0;
        let mut surface = RecordingSurface::default();
        let mut canvas = Canvas {
            surface: &mut surface,
            assets: &assets,
            camera: &camera,
        };
        draw_sprite(&data, &mut canvas);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn default_draw_skips_unloaded_resources() {
        let (mut data, _, camera) = draw_fixture();
        data.sprite.image = Some("never-registered".to_string());
        let assets = Assets::new();
        let mut surface = RecordingSurface::default();
        let mut canvas = Canvas {
            surface: &mut surface,
            assets: &assets,
            camera: &camera,
        };
        draw_sprite(&data, &mut canvas);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn flip_flags_reach_the_surface() {
        let (mut data, assets, camera) = draw_fixture();
        data.sprite.hflip = true;
        let mut surface = RecordingSurface::default();
        let mut canvas = Canvas {
            surface: &mut surface,
            assets: &assets,
            camera: &camera,
        };
        draw_sprite(&data, &mut canvas);

        let Op::Image { options, .. } = &surface.ops[0] else {
            panic!("expected an image blit");
        };
        assert!(options.hflip);
        assert!(!options.vflip);
    }
}
