//! # Engine: the world context
//!
//! One explicit object owns everything a game touches: the entity store,
//! input state, camera, assets, and configuration. There is no global
//! engine; construction and teardown are ordinary value lifecycle.
//!
//! The engine supplies the scheduler's process and draw phases:
//!
//! - **Process**: traverse entities in ascending z-order, advancing each
//!   sprite's animation counters and running its behavior; then the custom
//!   process hook; then apply the deferred structural commands. Entities
//!   spawned here are painted this cycle and processed from the next one.
//! - **Draw**: clear to the background color, paint entities in ascending
//!   z-order, then the custom draw hook.
//!
//! Wire it to a [`FrameScheduler`](crate::scheduler::FrameScheduler) with
//! [`Engine::frame`]:
//!
//! ```ignore
//! let mut engine = Engine::new(EngineConfig::default());
//! let mut scheduler = FrameScheduler::new();
//! scheduler.start(engine.config.fps);
//! let mut surface = host_surface();
//! scheduler.run(&mut engine.frame(&mut surface));
//! ```

use crate::assets::Assets;
use crate::camera::Camera;
use crate::entity::{Canvas, Tick};
use crate::input::InputState;
use crate::scheduler::CycleHooks;
use crate::store::{Commands, EntityStore};
use crate::surface::{Color, Surface};

/// Static engine parameters. `width`/`height` are the logical resolution;
/// `scale` is the factor hosts blow it up by for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub fps: u32,
    pub bg_color: Color,
    pub title: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 256.0,
            height: 240.0,
            scale: 1.0,
            fps: 30,
            bg_color: Color::BLACK,
            title: "ormr".to_string(),
        }
    }
}

type ProcessHook = Box<dyn FnMut(&mut Engine)>;
type DrawHook = Box<dyn FnMut(&mut Engine, &mut dyn Surface)>;

/// The world context. Fields are public; behaviors get a narrowed view of
/// them through [`Tick`] and [`Canvas`].
pub struct Engine {
    pub config: EngineConfig,
    pub store: EntityStore,
    pub input: InputState,
    pub camera: Camera,
    pub assets: Assets,
    commands: Commands,
    custom_process: Option<ProcessHook>,
    custom_draw: Option<DrawHook>,
}

impl Engine {
    /// Build an engine; the camera starts covering the logical resolution.
    pub fn new(config: EngineConfig) -> Self {
        let camera = Camera::new(config.width, config.height);
        Self {
            config,
            store: EntityStore::new(),
            input: InputState::new(),
            camera,
            assets: Assets::new(),
            commands: Commands::new(),
            custom_process: None,
            custom_draw: None,
        }
    }

    /// Replace the custom process hook. It runs once per cycle, after every
    /// entity's own process and before deferred commands apply.
    pub fn set_process(&mut self, hook: impl FnMut(&mut Engine) + 'static) {
        self.custom_process = Some(Box::new(hook));
    }

    /// Replace the custom draw hook. It runs last in the draw phase, on top
    /// of everything painted from the store.
    pub fn set_draw(&mut self, hook: impl FnMut(&mut Engine, &mut dyn Surface) + 'static) {
        self.custom_draw = Some(Box::new(hook));
    }

    /// The deferred command queue, for callers outside a traversal (hooks,
    /// host setup). Applied at the end of the next process phase.
    pub fn commands(&mut self) -> &mut Commands {
        &mut self.commands
    }

    /// The process phase. See the module docs for the ordering contract.
    pub fn process(&mut self) {
        for id in self.store.paint_ids() {
            // Detached so the behavior can see the rest of the store while
            // mutating its own entity.
            let Some(mut entity) = self.store.detach(id) else {
                continue;
            };
            entity.data.sprite.advance();
            let mut tick = Tick {
                store: &self.store,
                input: &self.input,
                camera: &self.camera,
                assets: &self.assets,
                commands: &mut self.commands,
            };
            entity.behavior.process(&mut entity.data, &mut tick);
            self.store.attach(entity);
        }

        if let Some(mut hook) = self.custom_process.take() {
            hook(self);
            // The hook may have installed a replacement; keep that one.
            if self.custom_process.is_none() {
                self.custom_process = Some(hook);
            }
        }

        self.commands.apply(&mut self.store);
    }

    /// The draw phase.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        surface.clear(self.config.bg_color);

        for id in self.store.paint_ids() {
            let Some(entity) = self.store.get(id) else {
                continue;
            };
            let mut canvas = Canvas {
                surface: &mut *surface,
                assets: &self.assets,
                camera: &self.camera,
            };
            entity.behavior.draw(&entity.data, &mut canvas);
        }

        if let Some(mut hook) = self.custom_draw.take() {
            hook(self, &mut *surface);
            if self.custom_draw.is_none() {
                self.custom_draw = Some(hook);
            }
        }
    }

    /// Bundle the engine with a surface into the scheduler's hook contract.
    pub fn frame<'a>(&'a mut self, surface: &'a mut (dyn Surface + 'a)) -> EngineFrame<'a> {
        EngineFrame {
            engine: self,
            surface,
        }
    }
}

/// An engine plus the surface it paints to, implementing [`CycleHooks`].
pub struct EngineFrame<'a> {
    pub engine: &'a mut Engine,
    pub surface: &'a mut (dyn Surface + 'a),
}

impl CycleHooks for EngineFrame<'_> {
    fn process(&mut self) {
        self.engine.process();
    }

    fn draw(&mut self) {
        self.engine.draw(&mut *self.surface);
    }
}
