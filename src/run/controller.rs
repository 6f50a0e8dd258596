use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info, warn};

use crate::{
    battle::{ActionOutcome, BattleAction, BattleContext, BattleResult, Encounter},
    config::GameConfig,
    data::{
        CreatureProvider, encounters,
        items::{CAPTURE_DEVICE_PRICE, ConsumableEffect, shop_catalogue},
        species::{STARTERS, Species},
    },
    ecs::{
        EcsWorld,
        resources::{Interaction, PlayerContext},
    },
    error::BattleError,
    map::{self, Cell, FloorLayout, entities::NpcRole},
    render::{Camera, SpriteInstance},
    save::SaveStore,
};

use super::{
    DEFEAT_MIN_CAPTURE_DEVICES, DUNGEON_MIN_CAPTURE_DEVICES, Mode, RunState, STARTING_FLOOR,
    input::InputState,
    movement::Player,
};

pub const WILD_ENCOUNTER_RATE: f32 = 0.05;
pub const TRAINER_ENCOUNTER_RATE: f32 = 0.01;
pub const MAX_FRAME_DT: f32 = 0.05;
pub const AUTO_BUY_LIMIT: u32 = 2;
pub const NPC_TALK_RADIUS: f32 = 1.6;
pub const MESSAGE_LOG_LIMIT: usize = 8;

/// Chance per second of each encounter kind while walking a dungeon floor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EncounterRates {
    pub wild: f32,
    pub trainer: f32,
}

impl Default for EncounterRates {
    fn default() -> Self {
        Self {
            wild: WILD_ENCOUNTER_RATE,
            trainer: TRAINER_ENCOUNTER_RATE,
        }
    }
}

/// Home-base panels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Menu {
    Starter,
    Guide { floors: Vec<u32> },
    Shop,
}

/// Owns the run: persistent state, the current floor and its entities, the
/// player, and the encounter in progress.
pub struct RunController {
    state: RunState,
    layout: FloorLayout,
    ecs: EcsWorld,
    player: Player,
    input: InputState,
    rng: RandomNumberGenerator,
    encounter: Option<Encounter>,
    dex: Box<dyn CreatureProvider>,
    store: Box<dyn SaveStore>,
    messages: Vec<String>,
    menu: Option<Menu>,
    rates: EncounterRates,
    last_cell: (i32, i32),
}

impl RunController {
    /// Resumes the saved run when the store has one.
    pub fn new(
        config: &GameConfig,
        dex: Box<dyn CreatureProvider>,
        store: Box<dyn SaveStore>,
    ) -> Self {
        let mut rng = RandomNumberGenerator::seeded(config.seed);
        let mut state = store.load().unwrap_or_default();
        if state.mode == Mode::BattleLocked {
            state.mode = Mode::Dungeon;
        }
        let layout = match state.mode {
            Mode::Home => map::home_layout(),
            _ => map::generate(state.floor, &mut rng),
        };
        let player = Player::at(layout.spawn.0, layout.spawn.1);
        let mut controller = Self {
            state,
            layout,
            ecs: EcsWorld::new(),
            player,
            input: InputState::default(),
            rng,
            encounter: None,
            dex,
            store,
            messages: Vec::new(),
            menu: None,
            rates: EncounterRates::default(),
            last_cell: (-1, -1),
        };
        controller.ecs.populate(&controller.layout.entities);
        if controller.state.party.is_empty() {
            controller.menu = Some(Menu::Starter);
            controller.push_message("Welcome! Choose your first companion.");
        } else {
            controller.push_message(format!(
                "Welcome back. Deepest floor reached: {}.",
                controller.state.meta.max_floor
            ));
        }
        controller
    }

    pub fn with_encounter_rates(mut self, rates: EncounterRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn layout(&self) -> &FloorLayout {
        &self.layout
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn camera(&self) -> Camera {
        Camera {
            x: self.player.x,
            y: self.player.y,
            angle: self.player.angle,
        }
    }

    pub fn sprites(&self) -> Vec<SpriteInstance> {
        self.ecs.sprites()
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn push_message<S: Into<String>>(&mut self, entry: S) {
        self.messages.insert(0, entry.into());
        self.messages.truncate(MESSAGE_LOG_LIMIT);
    }

    /// One frame of exploration. Frames are capped at `MAX_FRAME_DT` so a
    /// stall cannot teleport the player through a wall.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        match self.state.mode {
            Mode::BattleLocked => self.input.clear(),
            Mode::Home => {
                if self.menu.is_none() {
                    self.walk(dt);
                }
            }
            Mode::Dungeon => {
                self.walk(dt);
                self.handle_interactions();
                if self.state.mode == Mode::Dungeon {
                    self.check_exit();
                }
                if self.state.mode == Mode::Dungeon {
                    self.roll_encounters(dt);
                }
            }
        }
        self.input.advance(dt);
    }

    fn walk(&mut self, dt: f32) {
        let previous = (self.player.x, self.player.y);
        self.player.step(&self.layout.grid, &mut self.input, dt);
        let cell = self.player.cell();
        if cell != self.last_cell {
            self.last_cell = cell;
            self.layout.reveal_around(self.player.x, self.player.y);
        }
        let party_types = self
            .state
            .party
            .iter()
            .flat_map(|battler| battler.types.iter().copied())
            .collect();
        self.ecs.advance(PlayerContext {
            x: self.player.x,
            y: self.player.y,
            previous,
            dt,
            party_types,
        });
    }

    fn handle_interactions(&mut self) {
        for interaction in self.ecs.drain_interactions() {
            if self.state.mode != Mode::Dungeon {
                break;
            }
            self.apply_interaction(interaction);
        }
    }

    fn apply_interaction(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::TrapSprung { damage } => {
                let down = self.player.hurt(damage);
                self.push_message(format!(
                    "A trap springs! -{damage} health ({} left).",
                    self.player.health
                ));
                if down {
                    self.push_message("You collapse from your wounds.");
                    self.on_defeat();
                }
            }
            Interaction::ChestOpened { loot } => {
                self.state.money = self.state.money.saturating_add(loot.money);
                self.state.inventory.capture_devices += loot.capture_devices;
                self.state.inventory.potions += loot.potions;
                let mut found = format!(
                    "Chest opened: {} coins, {} capture orb(s)",
                    loot.money, loot.capture_devices
                );
                if loot.potions > 0 {
                    found.push_str(&format!(", {} potion(s)", loot.potions));
                }
                self.push_message(found);
            }
            Interaction::ObstacleCleared { kind, by, cell } => {
                self.layout.grid.set(Point::new(cell.0, cell.1), Cell::Floor);
                let helper = self
                    .state
                    .party
                    .iter()
                    .find(|battler| battler.has_type(by))
                    .map(|battler| battler.display_name.clone())
                    .unwrap_or_else(|| "Your party".to_string());
                self.push_message(format!("{helper} clears the {}!", kind.as_str()));
            }
            Interaction::ObstacleBlocked { kind, requires } => {
                self.push_message(format!(
                    "The {} block the way. A {} creature could clear them.",
                    kind.as_str(),
                    requires.as_str()
                ));
            }
        }
    }

    fn check_exit(&mut self) {
        let (x, y) = self.player.cell();
        if self
            .layout
            .exit
            .is_some_and(|exit| exit.x == x && exit.y == y)
        {
            self.advance_floor();
        }
    }

    fn roll_encounters(&mut self, dt: f32) {
        if self.state.guard.is_locked() || self.encounter.is_some() {
            return;
        }
        if self.rng.rand::<f32>() < self.rates.wild * dt {
            self.start_wild_encounter();
        }
        if self.state.mode == Mode::Dungeon && self.rng.rand::<f32>() < self.rates.trainer * dt {
            self.start_trainer_encounter();
        }
    }

    /// Rolls a wild creature for the current floor. Returns whether a battle
    /// started.
    pub fn start_wild_encounter(&mut self) -> bool {
        if self.state.guard.is_locked() {
            debug!("wild encounter suppressed: battle in progress");
            return false;
        }
        let Some(opponent) = self.dex.random_encounter(self.state.floor, &mut self.rng) else {
            warn!("no wild creature could be built for floor {}", self.state.floor);
            return false;
        };
        self.start_encounter(Encounter::wild(opponent, self.state.floor))
    }

    pub fn start_trainer_encounter(&mut self) -> bool {
        if self.state.guard.is_locked() {
            debug!("trainer encounter suppressed: battle in progress");
            return false;
        }
        let party = self.dex.trainer_party(self.state.floor, &mut self.rng);
        match Encounter::trainer(party, self.state.floor) {
            Some(encounter) => self.start_encounter(encounter),
            None => false,
        }
    }

    fn start_encounter(&mut self, mut encounter: Encounter) -> bool {
        let mut ctx = BattleContext {
            run: &mut self.state,
            rng: &mut self.rng,
            dex: self.dex.as_ref(),
        };
        match encounter.begin(&mut ctx) {
            Ok(outcome) => {
                self.state.mode = Mode::BattleLocked;
                self.input.clear();
                self.encounter = Some(encounter);
                self.log_outcome(&outcome);
                true
            }
            Err(BattleError::Busy) => {
                debug!("encounter refused: guard held");
                false
            }
            Err(err) => {
                self.push_message(err.to_string());
                false
            }
        }
    }

    /// Feeds a player action into the battle in progress.
    pub fn battle_action(&mut self, action: BattleAction) -> Result<ActionOutcome, BattleError> {
        let encounter = self.encounter.as_mut().ok_or(BattleError::NotInProgress)?;
        let mut ctx = BattleContext {
            run: &mut self.state,
            rng: &mut self.rng,
            dex: self.dex.as_ref(),
        };
        let outcome = encounter.act(&mut ctx, action)?;
        self.log_outcome(&outcome);
        if let Some(result) = outcome.result() {
            self.end_encounter(result);
        }
        Ok(outcome)
    }

    /// Next party member after the active one that can still fight.
    pub fn next_swap_target(&self) -> Option<usize> {
        let encounter = self.encounter.as_ref()?;
        let len = self.state.party.len();
        let active = encounter.active_index();
        (1..len)
            .map(|offset| (active + offset) % len)
            .find(|idx| !self.state.party[*idx].is_fainted())
    }

    fn log_outcome(&mut self, outcome: &ActionOutcome) {
        for event in &outcome.events {
            self.push_message(event.to_string());
        }
    }

    fn end_encounter(&mut self, result: BattleResult) {
        self.encounter = None;
        match result {
            BattleResult::Defeat => self.on_defeat(),
            _ => self.state.mode = Mode::Dungeon,
        }
    }

    fn load_floor(&mut self, layout: FloorLayout) {
        self.layout = layout;
        self.player = Player::at(self.layout.spawn.0, self.layout.spawn.1);
        self.last_cell = self.player.cell();
        self.ecs.populate(&self.layout.entities);
        self.input.clear();
    }

    /// Starts a dungeon run on `floor` (the deepest unlocked floor when
    /// `None` or when `floor` is not unlocked).
    pub fn enter_dungeon(&mut self, floor: Option<u32>) -> bool {
        if self.state.mode != Mode::Home {
            return false;
        }
        if self.state.party.is_empty() {
            self.menu = Some(Menu::Starter);
            self.push_message("You need a companion before entering the dungeon.");
            return false;
        }
        let unlocked = &self.state.meta.unlocked_floors;
        let start = floor
            .filter(|f| unlocked.contains(f))
            .unwrap_or(STARTING_FLOOR);
        let minimum = DUNGEON_MIN_CAPTURE_DEVICES + self.state.meta.bonus_capture_devices;
        self.state.inventory.capture_devices = self.state.inventory.capture_devices.max(minimum);
        self.state.floor = start;
        self.state.mode = Mode::Dungeon;
        self.menu = None;
        self.state.meta.record_floor(start);
        let layout = map::generate(start, &mut self.rng);
        info!("entering the dungeon at floor {start}");
        self.push_message(format!(
            "Entered the dungeon: floor {start}, {}.",
            layout.biome.as_str()
        ));
        self.load_floor(layout);
        true
    }

    /// Ladder reached: next floor, plus up to two capture devices bought
    /// automatically when affordable.
    pub fn advance_floor(&mut self) {
        self.state.floor += 1;
        self.state.meta.record_floor(self.state.floor);
        let affordable = self.state.money / CAPTURE_DEVICE_PRICE;
        let bought = affordable.min(AUTO_BUY_LIMIT);
        self.state.money -= bought * CAPTURE_DEVICE_PRICE;
        self.state.inventory.capture_devices += bought;
        let layout = map::generate(self.state.floor, &mut self.rng);
        info!("advanced to floor {} ({})", self.state.floor, layout.biome.as_str());
        self.push_message(format!(
            "Floor cleared! Advanced to floor {} ({}). Auto-bought {bought} capture orb(s).",
            self.state.floor,
            layout.biome.as_str()
        ));
        self.load_floor(layout);
    }

    fn arrive_home(&mut self) {
        self.state.restore_party();
        let fresh = self.state.meta.unlock_floors();
        if !fresh.is_empty() {
            let list: Vec<String> = fresh.iter().map(u32::to_string).collect();
            self.push_message(format!("New starting floors unlocked: {}.", list.join(", ")));
        }
        self.state.mode = Mode::Home;
        self.menu = None;
        self.load_floor(map::home_layout());
    }

    /// Leaves the dungeon voluntarily. Refused mid-battle.
    pub fn return_home(&mut self) -> bool {
        if self.state.mode != Mode::Dungeon {
            return false;
        }
        self.state.floor = STARTING_FLOOR;
        self.arrive_home();
        self.push_message("Returned home. Your party is fully healed.");
        self.save();
        true
    }

    /// Knocked out (party wiped or health gone): back home with progress
    /// intact and a minimum of capture devices.
    pub fn on_defeat(&mut self) {
        info!("run defeated on floor {}", self.state.floor);
        if let Some(encounter) = self.encounter.take() {
            debug!("dropping encounter after {} turns", encounter.turns());
        }
        self.state.guard.release();
        self.state.inventory.capture_devices = self
            .state
            .inventory
            .capture_devices
            .max(DEFEAT_MIN_CAPTURE_DEVICES);
        self.arrive_home();
        self.push_message("You were defeated. Returning home. Progress persists.");
        self.save();
    }

    /// Species offered on the starter panel, in `choose_starter` order.
    pub fn starter_options(&self) -> Vec<Species> {
        STARTERS
            .iter()
            .filter_map(|id| self.dex.species(*id).ok())
            .collect()
    }

    pub fn choose_starter(&mut self, index: usize) -> bool {
        if !self.state.party.is_empty() {
            return false;
        }
        let Some(id) = STARTERS.get(index).copied() else {
            return false;
        };
        let Some(starter) = encounters::starter(self.dex.as_ref(), id) else {
            self.push_message("That companion could not be found.");
            return false;
        };
        self.state.meta.register_form(starter.species_id);
        self.push_message(format!("{} joins you!", starter.display_name));
        info!("starter chosen: {}", starter.name);
        self.state.party.push(starter);
        self.menu = None;
        self.save();
        true
    }

    /// Talks to the NPC the player is standing next to, if any.
    pub fn interact(&mut self) -> Option<NpcRole> {
        if self.state.mode != Mode::Home {
            return None;
        }
        let role = self
            .ecs
            .npc_near(self.player.x, self.player.y, NPC_TALK_RADIUS)?;
        match role {
            NpcRole::Guide => {
                let meta = &self.state.meta;
                let report = format!(
                    "Guide: deepest floor {}, {} species captured, trainer rank {}.",
                    meta.max_floor,
                    meta.captured.len(),
                    self.state.trainer.level
                );
                let floors = meta.unlocked_floors.iter().copied().collect();
                self.push_message(report);
                self.menu = Some(Menu::Guide { floors });
            }
            NpcRole::Shop => {
                self.push_message(format!("Shopkeeper: you have {} coins.", self.state.money));
                self.menu = Some(Menu::Shop);
            }
        }
        Some(role)
    }

    /// Picks one of the guide's starting floors.
    pub fn select_floor(&mut self, index: usize) -> bool {
        let Some(Menu::Guide { floors }) = &self.menu else {
            return false;
        };
        let Some(floor) = floors.get(index).copied() else {
            return false;
        };
        self.enter_dungeon(Some(floor))
    }

    pub fn buy(&mut self, index: usize) -> bool {
        let catalogue = shop_catalogue();
        let Some(item) = catalogue.get(index) else {
            return false;
        };
        if self.state.money < item.price {
            self.push_message(format!("Not enough coins for a {}.", item.name));
            return false;
        }
        self.state.money -= item.price;
        match item.effect {
            ConsumableEffect::Capture => self.state.inventory.capture_devices += 1,
            ConsumableEffect::Heal { .. } => self.state.inventory.potions += 1,
        }
        self.push_message(format!("Bought a {} for {} coins.", item.name, item.price));
        self.save();
        true
    }

    /// Closes a home panel. The starter choice cannot be skipped.
    pub fn close_menu(&mut self) {
        if self.menu != Some(Menu::Starter) {
            self.menu = None;
        }
    }

    pub fn save(&mut self) {
        match self.store.save(&self.state) {
            Ok(()) => debug!("run saved"),
            Err(err) => {
                warn!("save failed: {err}");
                self.push_message("Saving failed.");
            }
        }
    }

    /// Replaces the run with the stored one. Refused mid-battle.
    pub fn load(&mut self) -> bool {
        if self.state.mode == Mode::BattleLocked {
            return false;
        }
        let Some(mut state) = self.store.load() else {
            self.push_message("No saved run found.");
            return false;
        };
        if state.mode == Mode::BattleLocked {
            state.mode = Mode::Dungeon;
        }
        self.state = state;
        self.encounter = None;
        let layout = match self.state.mode {
            Mode::Home => map::home_layout(),
            _ => map::generate(self.state.floor, &mut self.rng),
        };
        self.load_floor(layout);
        self.menu = self.state.party.is_empty().then_some(Menu::Starter);
        self.push_message("Saved run loaded.");
        true
    }
}
