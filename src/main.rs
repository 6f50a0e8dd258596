mod ai;
mod battle;
mod config;
mod data;
mod ecs;
mod error;
mod logging;
mod map;
mod render;
mod run;
mod save;
mod scripted_input;

use battle::BattleAction;
use bracket_terminal::prelude::*;
use clap::Parser;
use config::{Args, GameConfig};
use data::{BuiltinDex, CachedProvider};
use log::{info, warn};
use render::{
    RenderOptions, Renderer,
    panels::{
        BOXED_PANEL_ROWS, MINIMAP_CELLS, MINIMAP_ORIGIN, PANEL_TOP, SCREEN_WIDTH, STATUS_ROWS,
        VIEW_ROWS, draw_battle, draw_controls, draw_log, draw_menu, draw_status,
    },
};
use run::{Mode, RunController, controller::Menu, input::Control};
use save::JsonFileStore;
use scripted_input::ScriptedInput;

/// Console cells are eight pixels wide; pointer drag is measured in pixels.
const DRAG_PIXELS_PER_CELL: f32 = 8.0;

struct DelvemonState {
    controller: RunController,
    renderer: Renderer,
    script: Option<ScriptedInput>,
    frame: u64,
    drag_anchor: Option<i32>,
}

impl DelvemonState {
    fn new(config: &GameConfig, script: Option<ScriptedInput>) -> Self {
        let dex = Box::new(CachedProvider::new(BuiltinDex));
        let store = Box::new(JsonFileStore::new(&config.save_path));
        let options = RenderOptions {
            textured: config.textured,
            discovery_fog: config.discovery_fog,
            ..RenderOptions::default()
        };
        Self {
            controller: RunController::new(config, dex, store),
            renderer: Renderer::new(
                SCREEN_WIDTH as usize,
                VIEW_ROWS as usize,
                options,
                config.seed,
            ),
            script,
            frame: 0,
            drag_anchor: None,
        }
    }
}

impl GameState for DelvemonState {
    fn tick(&mut self, ctx: &mut BTerm) {
        self.frame = self.frame.wrapping_add(1);
        let scripted = self.script.as_mut().and_then(ScriptedInput::next_key);
        if let Some(key) = scripted.or(ctx.key) {
            self.handle_key(ctx, key);
        }
        self.track_drag(ctx);
        self.controller.step(ctx.frame_time_ms / 1000.0);
        ctx.cls();
        self.draw_scene(ctx);
    }
}

fn digit(key: VirtualKeyCode) -> Option<usize> {
    let index = match key {
        VirtualKeyCode::Key1 => 0,
        VirtualKeyCode::Key2 => 1,
        VirtualKeyCode::Key3 => 2,
        VirtualKeyCode::Key4 => 3,
        VirtualKeyCode::Key5 => 4,
        VirtualKeyCode::Key6 => 5,
        VirtualKeyCode::Key7 => 6,
        VirtualKeyCode::Key8 => 7,
        VirtualKeyCode::Key9 => 8,
        _ => return None,
    };
    Some(index)
}

impl DelvemonState {
    fn handle_key(&mut self, ctx: &mut BTerm, key: VirtualKeyCode) {
        if let Some(menu) = self.controller.menu().cloned() {
            self.handle_menu_key(ctx, menu, key);
            return;
        }
        match self.controller.mode() {
            Mode::BattleLocked => self.handle_battle_key(key),
            Mode::Home | Mode::Dungeon => self.handle_explore_key(ctx, key),
        }
    }

    fn handle_explore_key(&mut self, ctx: &mut BTerm, key: VirtualKeyCode) {
        let input = self.controller.input_mut();
        match key {
            VirtualKeyCode::W => input.tap(Control::Forward),
            VirtualKeyCode::S => input.tap(Control::Back),
            VirtualKeyCode::A => input.tap(Control::StrafeLeft),
            VirtualKeyCode::D => input.tap(Control::StrafeRight),
            VirtualKeyCode::Left => input.tap(Control::TurnLeft),
            VirtualKeyCode::Right => input.tap(Control::TurnRight),
            VirtualKeyCode::E => {
                if self.controller.interact().is_none() {
                    self.controller.push_message("Nobody here to talk to.");
                }
            }
            VirtualKeyCode::Space => {
                if self.controller.mode() == Mode::Dungeon {
                    self.controller.start_wild_encounter();
                }
            }
            VirtualKeyCode::H => {
                self.controller.return_home();
            }
            VirtualKeyCode::Escape => self.quit(ctx),
            _ => {}
        }
    }

    fn handle_battle_key(&mut self, key: VirtualKeyCode) {
        let action = match key {
            VirtualKeyCode::C => BattleAction::ThrowCaptureDevice,
            VirtualKeyCode::P => BattleAction::UsePotion,
            VirtualKeyCode::F => BattleAction::Flee,
            VirtualKeyCode::Tab => match self.controller.next_swap_target() {
                Some(index) => BattleAction::Swap(index),
                None => {
                    self.controller.push_message("Nobody else can fight.");
                    return;
                }
            },
            other => match digit(other) {
                Some(slot) => BattleAction::Attack(slot),
                None => return,
            },
        };
        if let Err(err) = self.controller.battle_action(action) {
            self.controller.push_message(err.to_string());
        }
    }

    fn handle_menu_key(&mut self, ctx: &mut BTerm, menu: Menu, key: VirtualKeyCode) {
        if key == VirtualKeyCode::Escape {
            if menu == Menu::Starter {
                self.quit(ctx);
            } else {
                self.controller.close_menu();
            }
            return;
        }
        let Some(index) = digit(key) else {
            return;
        };
        match menu {
            Menu::Starter => {
                self.controller.choose_starter(index);
            }
            Menu::Guide { .. } => {
                self.controller.select_floor(index);
            }
            Menu::Shop => {
                self.controller.buy(index);
            }
        }
    }

    /// Horizontal pointer drag turns the view while the left button is down.
    fn track_drag(&mut self, ctx: &BTerm) {
        let pressed = INPUT.lock().is_mouse_button_pressed(0);
        if !pressed || self.controller.mode() == Mode::BattleLocked {
            self.drag_anchor = None;
            return;
        }
        let (x, _) = ctx.mouse_pos();
        if let Some(anchor) = self.drag_anchor {
            let dx = (x - anchor) as f32 * DRAG_PIXELS_PER_CELL;
            self.controller.input_mut().drag(dx);
        }
        self.drag_anchor = Some(x);
    }

    fn quit(&mut self, ctx: &mut BTerm) {
        if self.controller.mode() != Mode::BattleLocked {
            self.controller.save();
        }
        info!("quitting after {} frames", self.frame);
        ctx.quit();
    }

    fn draw_scene(&mut self, ctx: &mut BTerm) {
        let layout = self.controller.layout();
        let state = self.controller.state();
        draw_status(
            ctx,
            state,
            self.controller.player().health,
            layout.biome.as_str(),
        );

        let camera = self.controller.camera();
        let sprites = self.controller.sprites();
        self.renderer
            .draw_view(ctx, &layout.grid, &sprites, &camera, (0, STATUS_ROWS));
        self.renderer
            .draw_minimap(ctx, &layout.grid, &camera, MINIMAP_ORIGIN, MINIMAP_CELLS);

        let messages = self.controller.messages();
        if let Some(encounter) = self.controller.encounter() {
            draw_battle(ctx, encounter, state, PANEL_TOP);
            draw_log(ctx, messages, PANEL_TOP + BOXED_PANEL_ROWS);
        } else if let Some(menu) = self.controller.menu() {
            let starters = self.controller.starter_options();
            draw_menu(ctx, menu, state, &starters, PANEL_TOP);
            draw_log(ctx, messages, PANEL_TOP + BOXED_PANEL_ROWS);
        } else {
            draw_log(ctx, messages, PANEL_TOP);
        }
        draw_controls(ctx, state.mode);
    }
}

fn main() -> BError {
    let args = Args::parse();
    logging::init(args.verbose);
    let config = GameConfig::from_args(&args);
    info!(
        "starting with seed {} and save file {}",
        config.seed,
        config.save_path.display()
    );

    let script = args
        .script
        .as_ref()
        .and_then(|path| match ScriptedInput::from_file(path) {
            Ok(script) => Some(script),
            Err(err) => {
                warn!("could not read script {}: {err}", path.display());
                None
            }
        });

    let context = BTermBuilder::simple80x50()
        .with_title("Delvemon")
        .build()?;
    let game_state = DelvemonState::new(&config, script);
    main_loop(context, game_state)
}
