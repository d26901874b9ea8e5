//! Sub-sea shooter, headless.
//!
//! A scrolling-seafloor wave shooter driven by scripted input against a
//! [`NullSurface`], so it runs anywhere. A windowed host would look exactly
//! the same except for the surface type and real key events feeding
//! `engine.input`.

use std::cell::RefCell;
use std::rc::Rc;

use ormr::prelude::*;

const SPAWN_DELAY: u32 = 32;
const WAVE_SIZE: u32 = 10;
const MAP_ROWS: usize = 30;
const TILE: f32 = 16.0;

/// State shared between behaviors and the engine hooks.
struct GameState {
    map: TileMap,
    map_y: f32,
    score: u32,
    slugs_to_spawn: u32,
    spawn_timer: u32,
    alive_slugs: u32,
    game_over: bool,
    seed: u64,
}

/// xorshift64, plenty for obstacle placement.
fn rand_range(seed: &mut u64, min: u32, max: u32) -> u32 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 7;
    *seed ^= *seed << 17;
    min + (*seed % u64::from(max - min)) as u32
}

/// A 16-tile-wide corridor: rock walls on both sides, scattered decoration
/// and boulders in the channel. Tiles 3 and 4 are solid.
fn build_map(seed: &mut u64) -> TileMap {
    let mut rows = Vec::with_capacity(MAP_ROWS);
    for _ in 0..MAP_ROWS {
        let mut row = vec![4u16];
        row.push(if rand_range(seed, 0, 3) == 0 { 4 } else { 3 });
        for _ in 2..14 {
            row.push(match rand_range(seed, 0, 12) {
                0 => 1,
                1 => 2,
                2 => 3,
                _ => 0,
            });
        }
        row.push(if rand_range(seed, 0, 3) == 0 { 4 } else { 3 });
        row.push(4);
        rows.push(row);
    }
    TileMap {
        tileset: "tiles".to_string(),
        tile_width: TILE,
        tile_height: TILE,
        rows,
        solid: vec![3, 4],
    }
}

// ── Behaviors ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Player {
    shot_down: bool,
    state: Rc<RefCell<GameState>>,
}

impl Behavior for Player {
    fn process(&mut self, data: &mut EntityData, tick: &mut Tick<'_>) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if tick.input.pressed("up") {
            dy -= 2.0;
        }
        if tick.input.pressed("down") {
            dy += 2.0;
        }
        if tick.input.pressed("left") {
            dx -= 3.0;
        }
        if tick.input.pressed("right") {
            dx += 3.0;
        }

        // One axis at a time, so the ship slides along walls.
        {
            let state = self.state.borrow();
            let origin = Vec2::new(0.0, state.map_y);
            if !state.map.collides(Rect::new(data.x, data.y + dy, data.width, data.height), origin) {
                data.y += dy;
            }
            if !state.map.collides(Rect::new(data.x + dx, data.y, data.width, data.height), origin) {
                data.x += dx;
            }
        }

        // One shot per key press; holding fire does nothing until released.
        if tick.input.pressed("fire") {
            if !self.shot_down {
                self.shot_down = true;
                let (x, y) = (data.x + 6.0, data.y + 4.0);
                tick.commands.spawn_with("shot", move |shot| {
                    shot.data.x = x;
                    shot.data.y = y;
                });
            }
        } else {
            self.shot_down = false;
        }
    }
}

#[derive(Clone)]
struct Shot {
    state: Rc<RefCell<GameState>>,
}

impl Behavior for Shot {
    fn process(&mut self, data: &mut EntityData, tick: &mut Tick<'_>) {
        let old_y = data.y;
        data.y -= 8.0;

        // Sweep the travelled span so fast shots cannot tunnel through.
        let swept = Rect::new(data.x, data.y, data.width, data.height + (old_y - data.y));
        for enemy_id in tick.store.group("enemy") {
            let Some(enemy) = tick.store.get(enemy_id) else {
                continue;
            };
            if swept.overlaps(&enemy.data.bounds()) {
                tick.commands.destroy(enemy_id);
                tick.commands.destroy(data.id);
                self.state.borrow_mut().score += 1;
                return;
            }
        }

        if !tick.camera.in_view(data.sprite_bounds()) {
            tick.commands.destroy(data.id);
        }
    }
}

#[derive(Clone)]
struct Slug {
    state: Rc<RefCell<GameState>>,
}

impl Behavior for Slug {
    fn process(&mut self, data: &mut EntityData, tick: &mut Tick<'_>) {
        data.y += 1.0;
        if !tick.camera.in_view(data.sprite_bounds()) {
            tick.commands.destroy(data.id);
        }
    }

    fn on_destroy(&mut self, _data: &EntityData) {
        let mut state = self.state.borrow_mut();
        state.alive_slugs = state.alive_slugs.saturating_sub(1);
    }
}

// ── Setup ────────────────────────────────────────────────────────────────

fn register_classes(engine: &mut Engine, state: &Rc<RefCell<GameState>>) {
    engine.store.register_class_with(
        "player",
        ClassConfig {
            x: Some(120.0),
            y: Some(192.0),
            z: Some(100.0),
            width: Some(16.0),
            height: Some(16.0),
            sprite: SpriteConfig {
                image: Some("ship".to_string()),
                frame_width: Some(16.0),
                frame_height: Some(16.0),
                anim: Some(true),
                delay: Some(15),
                frame_count: Some(2),
                ..SpriteConfig::default()
            },
            ..ClassConfig::default()
        },
        Box::new(Player {
            shot_down: false,
            state: Rc::clone(state),
        }),
    );

    engine.store.register_class_with(
        "slug",
        ClassConfig {
            group: Some("enemy".to_string()),
            z: Some(90.0),
            width: Some(16.0),
            height: Some(16.0),
            sprite: SpriteConfig {
                image: Some("slug".to_string()),
                frame_width: Some(16.0),
                frame_height: Some(16.0),
                anim: Some(true),
                delay: Some(10),
                frame_count: Some(2),
                ..SpriteConfig::default()
            },
            ..ClassConfig::default()
        },
        Box::new(Slug {
            state: Rc::clone(state),
        }),
    );

    engine.store.register_class_with(
        "shot",
        ClassConfig {
            group: Some("shots".to_string()),
            z: Some(99.0),
            width: Some(4.0),
            height: Some(8.0),
            sprite: SpriteConfig {
                image: Some("shot".to_string()),
                frame_width: Some(4.0),
                frame_height: Some(8.0),
                ..SpriteConfig::default()
            },
            ..ClassConfig::default()
        },
        Box::new(Shot {
            state: Rc::clone(state),
        }),
    );

    // The sea floor is a plain TileMap behavior; the custom process hook
    // scrolls it by moving the entity.
    let map = state.borrow().map.clone();
    engine.store.register_class_with(
        "background",
        ClassConfig {
            y: Some(-240.0),
            z: Some(-1.0),
            ..ClassConfig::default()
        },
        Box::new(map),
    );
}

/// Scripted input standing in for real key events.
fn drive_input(cycle: u32, input: &mut InputState) {
    input.set_pressed("left", (120..200).contains(&cycle));
    input.set_pressed("right", (280..360).contains(&cycle));
    input.set_pressed("up", (400..430).contains(&cycle));
    // Tap fire on and off so the one-shot latch keeps re-arming.
    input.set_pressed("fire", cycle % 4 < 2);
}

fn main() {
    env_logger::init();

    let mut seed = 0x5eed_cafe_u64;
    let state = Rc::new(RefCell::new(GameState {
        map: build_map(&mut seed),
        map_y: -240.0,
        score: 0,
        slugs_to_spawn: WAVE_SIZE,
        spawn_timer: SPAWN_DELAY,
        alive_slugs: 0,
        game_over: false,
        seed,
    }));

    let mut engine = Engine::new(EngineConfig {
        title: "Sub-sea Adventure".to_string(),
        scale: 2.0,
        bg_color: Color::from_hex("#000020").unwrap_or(Color::BLACK),
        ..EngineConfig::default()
    });

    // A real host would `assets.register("ship", "res/ship.png")` and call
    // `load_all`; headless we drop in placeholders of the right sizes.
    engine.assets.insert("tiles", Image::blank(80, 16));
    engine.assets.insert("ship", Image::blank(32, 16));
    engine.assets.insert("shot", Image::blank(4, 8));
    engine.assets.insert("slug", Image::blank(32, 16));

    for (name, code) in [
        ("up", keycode::UP),
        ("down", keycode::DOWN),
        ("left", keycode::LEFT),
        ("right", keycode::RIGHT),
        ("fire", keycode::D),
        ("quit", keycode::ESC),
    ] {
        engine.input.monitor_key(name, code);
    }

    register_classes(&mut engine, &state);
    let player_id = engine.store.create("player").expect("player class registered");
    let bg_id = engine.store.create("background").expect("background class registered");

    // Scrolling, the seafloor pushing the ship, and wave phases all live in
    // the custom process hook, after every entity has run.
    {
        let state = Rc::clone(&state);
        engine.set_process(move |engine| {
            let mut state = state.borrow_mut();

            state.map_y += 1.0;
            if state.map_y >= 0.0 {
                state.map_y = -240.0;
            }
            if let Some(bg) = engine.store.get_mut(bg_id) {
                bg.data.y = state.map_y;
            }

            if let Some(player) = engine.store.get_mut(player_id) {
                let bounds = player.data.sprite_bounds();
                if state.map.collides(bounds, Vec2::new(0.0, state.map_y)) {
                    player.data.y += 1.0;
                }
            }

            if state.slugs_to_spawn > 0 {
                if state.spawn_timer >= SPAWN_DELAY {
                    state.spawn_timer = 0;
                    state.slugs_to_spawn -= 1;
                    state.alive_slugs += 1;
                    let x = rand_range(&mut state.seed, 4, 13) as f32 * TILE;
                    let flipped = rand_range(&mut state.seed, 0, 100) > 50;
                    engine.commands().spawn_with("slug", move |slug| {
                        slug.data.x = x;
                        slug.data.y = -12.0;
                        slug.data.sprite.hflip = flipped;
                    });
                } else {
                    state.spawn_timer += 1;
                }
            } else if state.alive_slugs == 0 && !state.game_over {
                state.game_over = true;
            }
        });
    }

    {
        let state = Rc::clone(&state);
        engine.set_draw(move |_, surface| {
            let state = state.borrow();
            let hud = TextStyle {
                font: "8px Press Start K".to_string(),
                fill: Color::WHITE,
            };
            surface.fill_rect(Rect::new(0.0, 0.0, 256.0, 16.0), &RectStyle::default());
            surface.fill_text(&format!("SCORE: {}", state.score), Vec2::new(8.0, 4.0), &hud);
            if state.game_over {
                surface.fill_rect(Rect::new(88.0, 112.0, 80.0, 16.0), &RectStyle::default());
                surface.fill_text("GAME OVER", Vec2::new(92.0, 116.0), &hud);
            }
        });
    }

    let mut surface = NullSurface;
    let mut scheduler = FrameScheduler::new();
    scheduler.start(engine.config.fps);

    for cycle in 0..1200u32 {
        drive_input(cycle, &mut engine.input);
        if engine.input.pressed("quit") {
            break;
        }

        let outcome = scheduler.cycle(&mut engine.frame(&mut surface));
        std::thread::sleep(outcome.delay);

        if cycle % 150 == 0 {
            let state = state.borrow();
            log::info!(
                "cycle {cycle}: score {}, slugs alive {}, entities {}",
                state.score,
                state.alive_slugs,
                engine.store.len()
            );
        }
        if state.borrow().game_over {
            break;
        }
    }

    let state = state.borrow();
    println!("final score: {} (wave cleared: {})", state.score, state.game_over);
}
