use bracket_terminal::prelude::*;

use crate::{
    battle::{Encounter, EncounterKind, battler::Battler},
    data::{items::shop_catalogue, species::Species},
    run::{Mode, RunState, controller::Menu, movement::MAX_HEALTH},
};

pub const SCREEN_WIDTH: i32 = 80;
pub const SCREEN_HEIGHT: i32 = 50;
pub const STATUS_ROWS: i32 = 3;
pub const VIEW_ROWS: i32 = 33;
pub const PANEL_TOP: i32 = STATUS_ROWS + VIEW_ROWS;
pub const PANEL_ROWS: i32 = 14;
pub const MINIMAP_ORIGIN: (i32, i32) = (SCREEN_WIDTH - 22, STATUS_ROWS + 1);
pub const MINIMAP_CELLS: (i32, i32) = (20, 10);
pub const BOXED_PANEL_ROWS: i32 = 7;

/// Red below 30%, orange below 60%, green above.
pub fn health_color(ratio: f32) -> RGB {
    if ratio <= 0.3 {
        RGB::named(RED)
    } else if ratio <= 0.6 {
        RGB::named(ORANGE)
    } else {
        RGB::named(LIGHT_GREEN)
    }
}

pub fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Home => "Home",
        Mode::Dungeon => "Dungeon",
        Mode::BattleLocked => "Battle",
    }
}

pub fn draw_status(ctx: &mut BTerm, run: &RunState, health: i32, biome: &str) {
    ctx.draw_box(
        0,
        0,
        SCREEN_WIDTH - 1,
        STATUS_ROWS - 1,
        RGB::named(GRAY),
        RGB::named(BLACK),
    );
    let place = match run.mode {
        Mode::Home => "Home base".to_string(),
        _ => format!("Floor {} ({biome})", run.floor),
    };
    ctx.print_color(
        2,
        1,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        format!("{} · {place}", mode_label(run.mode)),
    );
    let ratio = health as f32 / MAX_HEALTH as f32;
    ctx.print_color(
        28,
        1,
        health_color(ratio),
        RGB::named(BLACK),
        format!("HP {health}/{MAX_HEALTH}"),
    );
    ctx.print_color(
        40,
        1,
        RGB::named(LIGHT_CYAN),
        RGB::named(BLACK),
        format!(
            "${} · Orbs {} · Potions {} · Rank {}",
            run.money, run.inventory.capture_devices, run.inventory.potions, run.trainer.level
        ),
    );
}

/// Newest entry first, boxed from `start_y` down to the bottom of the
/// console.
pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let height = SCREEN_HEIGHT - 1 - start_y;
    let rows = (height - 1).max(0) as usize;
    ctx.draw_box(
        0,
        start_y,
        SCREEN_WIDTH - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(2, start_y, RGB::named(WHITE), RGB::named(BLACK), " Log ");
    for (row, entry) in log.iter().take(rows).enumerate() {
        let fg = if row == 0 {
            RGB::named(WHITE)
        } else {
            RGB::named(GRAY)
        };
        ctx.print_color(2, start_y + 1 + row as i32, fg, RGB::named(BLACK), entry);
    }
}

fn draw_battler_line(ctx: &mut BTerm, x: i32, y: i32, battler: &Battler) {
    let (r, g, b) = battler.color;
    ctx.print_color(
        x,
        y,
        RGB::from_u8(r, g, b),
        RGB::named(BLACK),
        format!("{} Lv{}", battler.display_name, battler.level),
    );
    let ratio = battler.hp_ratio();
    ctx.draw_bar_horizontal(
        x,
        y + 1,
        20,
        battler.hp().max(0),
        battler.max_hp.max(1),
        health_color(ratio),
        RGB::named(DARK_GRAY),
    );
    ctx.print(x + 22, y + 1, format!("{}/{}", battler.hp(), battler.max_hp));
}

/// Both combatants, the active creature's moves and the action keys.
pub fn draw_battle(ctx: &mut BTerm, encounter: &Encounter, run: &RunState, top: i32) {
    ctx.draw_box(
        0,
        top,
        SCREEN_WIDTH - 1,
        BOXED_PANEL_ROWS - 1,
        RGB::named(MAGENTA),
        RGB::named(BLACK),
    );
    let title = match encounter.kind() {
        EncounterKind::Wild => " Wild encounter ".to_string(),
        EncounterKind::Trainer => {
            format!(" Trainer battle · {} in reserve ", encounter.reserve())
        }
    };
    ctx.print_color(2, top, RGB::named(WHITE), RGB::named(BLACK), title);
    draw_battler_line(ctx, 2, top + 1, encounter.opponent());
    if let Some(active) = run.party.get(encounter.active_index()) {
        draw_battler_line(ctx, 42, top + 1, active);
        for (slot, mv) in active.moves.iter().enumerate() {
            let x = 2 + (slot as i32 % 2) * 38;
            let y = top + 3 + slot as i32 / 2;
            let fg = if mv.pp == 0 {
                RGB::named(DARK_GRAY)
            } else {
                RGB::named(WHITE)
            };
            ctx.print_color(
                x,
                y,
                fg,
                RGB::named(BLACK),
                format!(
                    "[{}] {} ({}) {}/{}",
                    slot + 1,
                    mv.name,
                    mv.element.as_str(),
                    mv.pp,
                    mv.max_pp
                ),
            );
        }
    }
    ctx.print_color(
        2,
        top + 5,
        RGB::named(LIGHT_BLUE),
        RGB::named(BLACK),
        "[C] Capture  [P] Potion  [Tab] Swap  [F] Flee",
    );
}

/// Starter choice, guide floors or the shop list.
pub fn draw_menu(ctx: &mut BTerm, menu: &Menu, run: &RunState, starters: &[Species], top: i32) {
    ctx.draw_box(
        0,
        top,
        SCREEN_WIDTH - 1,
        BOXED_PANEL_ROWS - 1,
        RGB::named(GOLD),
        RGB::named(BLACK),
    );
    match menu {
        Menu::Starter => {
            ctx.print_color(
                2,
                top,
                RGB::named(WHITE),
                RGB::named(BLACK),
                " Choose a companion ",
            );
            for (idx, species) in starters.iter().enumerate() {
                let (r, g, b) = species.color;
                let types: Vec<&str> = species.types.iter().map(|t| t.as_str()).collect();
                ctx.print_color(
                    2,
                    top + 1 + idx as i32,
                    RGB::from_u8(r, g, b),
                    RGB::named(BLACK),
                    format!("[{}] {} ({})", idx + 1, species.display_name(), types.join("/")),
                );
            }
        }
        Menu::Guide { floors } => {
            ctx.print_color(
                2,
                top,
                RGB::named(WHITE),
                RGB::named(BLACK),
                " Guide: pick a starting floor ",
            );
            for (idx, floor) in floors.iter().take(9).enumerate() {
                let x = 2 + (idx as i32 % 3) * 24;
                let y = top + 1 + idx as i32 / 3;
                ctx.print(x, y, format!("[{}] Floor {floor}", idx + 1));
            }
            ctx.print_color(
                2,
                top + 5,
                RGB::named(GRAY),
                RGB::named(BLACK),
                "[Esc] Back",
            );
        }
        Menu::Shop => {
            ctx.print_color(
                2,
                top,
                RGB::named(WHITE),
                RGB::named(BLACK),
                format!(" Shop · ${} ", run.money),
            );
            for (idx, item) in shop_catalogue().iter().enumerate() {
                ctx.print_color(
                    2,
                    top + 1 + idx as i32 * 2,
                    item.color,
                    RGB::named(BLACK),
                    format!("[{}] {} · ${}", idx + 1, item.name, item.price),
                );
                ctx.print_color(
                    6,
                    top + 2 + idx as i32 * 2,
                    RGB::named(GRAY),
                    RGB::named(BLACK),
                    item.description,
                );
            }
            ctx.print_color(
                2,
                top + 5,
                RGB::named(GRAY),
                RGB::named(BLACK),
                "[Esc] Back",
            );
        }
    }
}

/// Key reminder along the bottom border.
pub fn draw_controls(ctx: &mut BTerm, mode: Mode) {
    let y = SCREEN_HEIGHT - 1;
    let hint = match mode {
        Mode::Home => " WASD move · Arrows turn · E talk · Esc quit ",
        Mode::Dungeon => " WASD move · Arrows turn · Space fight · H home · Esc quit ",
        Mode::BattleLocked => " 1-4 attack · C capture · P potion · Tab swap · F flee ",
    };
    ctx.print_color(2, y, RGB::named(DARK_GRAY), RGB::named(BLACK), hint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_colors_follow_thresholds() {
        assert_eq!(health_color(0.2), RGB::named(RED));
        assert_eq!(health_color(0.5), RGB::named(ORANGE));
        assert_eq!(health_color(0.9), RGB::named(LIGHT_GREEN));
    }

    #[test]
    fn panels_fit_the_console() {
        assert_eq!(PANEL_TOP + PANEL_ROWS, SCREEN_HEIGHT);
        assert!(BOXED_PANEL_ROWS < PANEL_ROWS);
        assert!(MINIMAP_ORIGIN.0 + MINIMAP_CELLS.0 <= SCREEN_WIDTH);
        assert!(MINIMAP_ORIGIN.1 + MINIMAP_CELLS.1 <= PANEL_TOP);
    }
}
