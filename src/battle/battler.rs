use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::data::{
    moves::{MoveCategory, MoveData},
    species::{Species, SpeciesId},
    types::Element,
};

pub const MAX_MOVES: usize = 4;

const LEVEL_HP_GAIN: i32 = 3;
const LEVEL_STAT_GAIN: i32 = 2;
const LEVEL_SPEED_GAIN: i32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    pub power: u32,
    pub accuracy: u32,
    pub pp: u32,
    pub max_pp: u32,
    pub element: Element,
    pub category: MoveCategory,
}

impl From<&MoveData> for Move {
    fn from(data: &MoveData) -> Self {
        Self {
            name: data.name.to_string(),
            power: data.power,
            accuracy: data.accuracy,
            pp: data.pp,
            max_pp: data.pp,
            element: data.element,
            category: data.category,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Poisoned,
    Burned,
    Paralyzed,
    Asleep,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Poisoned => "PSN",
            Status::Burned => "BRN",
            Status::Paralyzed => "PAR",
            Status::Asleep => "SLP",
        }
    }
}

/// A creature instance with stats derived from its species at a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battler {
    pub species_id: SpeciesId,
    pub name: String,
    pub display_name: String,
    pub sprite: String,
    pub back_sprite: String,
    pub color: (u8, u8, u8),
    pub types: SmallVec<[Element; 2]>,
    pub level: u32,
    hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub sp_attack: i32,
    pub sp_defense: i32,
    pub speed: i32,
    pub moves: SmallVec<[Move; MAX_MOVES]>,
    pub status: Option<Status>,
    fainted: bool,
    pub xp: u32,
    pub next_level: u32,
    pub capture_rate: u32,
}

/// XP needed to leave `level`.
pub fn next_level_threshold(level: u32) -> u32 {
    50 + level * 25
}

fn derive_hp(base: u32, level: u32) -> i32 {
    let base = if base == 0 { 45 } else { base };
    (base * 2 * level / 100 + level + 10) as i32
}

fn derive_stat(base: u32, level: u32) -> i32 {
    let base = if base == 0 { 50 } else { base };
    (base * 2 * level / 100 + 5) as i32
}

impl Battler {
    pub fn from_species(species: &Species, level: u32, moves: Vec<Move>) -> Self {
        let level = level.max(1);
        let max_hp = derive_hp(species.base.hp, level);
        Self {
            species_id: species.id,
            name: species.name.to_string(),
            display_name: species.display_name(),
            sprite: species.front_sprite(),
            back_sprite: species.back_sprite(),
            color: species.color,
            types: species.types.iter().copied().collect(),
            level,
            hp: max_hp,
            max_hp,
            attack: derive_stat(species.base.attack, level),
            defense: derive_stat(species.base.defense, level),
            sp_attack: derive_stat(species.base.sp_attack, level),
            sp_defense: derive_stat(species.base.sp_defense, level),
            speed: derive_stat(species.base.speed, level),
            moves: moves.into_iter().take(MAX_MOVES).collect(),
            status: None,
            fainted: false,
            xp: 0,
            next_level: next_level_threshold(level),
            capture_rate: species.capture_rate,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.fainted
    }

    pub fn has_type(&self, element: Element) -> bool {
        self.types.contains(&element)
    }

    /// The only write path for HP: clamps into `[0, max_hp]` and keeps the
    /// fainted flag in step with it.
    pub fn set_hp(&mut self, value: i32) {
        self.hp = value.clamp(0, self.max_hp.max(0));
        self.fainted = self.hp == 0;
    }

    /// Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.set_hp(before.saturating_sub(amount.max(0)));
        before - self.hp
    }

    /// Heals a standing creature; fainted ones need a trip home.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.fainted {
            return 0;
        }
        let before = self.hp;
        self.set_hp(before.saturating_add(amount.max(0)));
        self.hp - before
    }

    /// Full HP, no status, every move back to its PP ceiling.
    pub fn restore(&mut self) {
        self.set_hp(self.max_hp);
        self.status = None;
        for mv in self.moves.iter_mut() {
            mv.pp = mv.max_pp;
        }
    }

    pub fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Spends one threshold's worth of XP on a level, if there is enough.
    pub fn try_level_up(&mut self) -> Option<u32> {
        if self.xp < self.next_level {
            return None;
        }
        self.xp -= self.next_level;
        self.level_up();
        Some(self.level)
    }

    /// Adds XP and applies every level-up it pays for. Returns the levels
    /// reached, in order.
    pub fn gain_xp(&mut self, amount: u32) -> Vec<u32> {
        self.add_xp(amount);
        std::iter::from_fn(|| self.try_level_up()).collect()
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.max_hp += LEVEL_HP_GAIN;
        self.attack += LEVEL_STAT_GAIN;
        self.defense += LEVEL_STAT_GAIN;
        self.sp_attack += LEVEL_STAT_GAIN;
        self.sp_defense += LEVEL_STAT_GAIN;
        self.speed += LEVEL_SPEED_GAIN;
        for mv in self.moves.iter_mut() {
            mv.max_pp += 1;
            mv.pp = mv.max_pp;
        }
        self.set_hp(self.max_hp);
        self.next_level = next_level_threshold(self.level);
    }

    /// Swaps in the species-derived identity and stats of `species` while
    /// keeping level, XP and the move slots. Current HP keeps its ratio.
    pub fn evolve_into(&mut self, species: &Species) {
        let ratio = if self.max_hp > 0 {
            self.hp as f32 / self.max_hp as f32
        } else {
            1.0
        };
        let level = self.level;
        self.species_id = species.id;
        self.name = species.name.to_string();
        self.display_name = species.display_name();
        self.sprite = species.front_sprite();
        self.back_sprite = species.back_sprite();
        self.color = species.color;
        self.types = species.types.iter().copied().collect();
        self.capture_rate = species.capture_rate;
        self.max_hp = derive_hp(species.base.hp, level);
        self.attack = derive_stat(species.base.attack, level);
        self.defense = derive_stat(species.base.defense, level);
        self.sp_attack = derive_stat(species.base.sp_attack, level);
        self.sp_defense = derive_stat(species.base.sp_defense, level);
        self.speed = derive_stat(species.base.speed, level);
        if !self.fainted {
            self.set_hp(((self.max_hp as f32 * ratio).round() as i32).max(1));
        }
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{BuiltinDex, CreatureProvider};

    pub(crate) fn battler(species_id: SpeciesId, level: u32) -> Battler {
        let dex = BuiltinDex;
        let species = dex.species(species_id).expect("species in table");
        let moves = species
            .learnset
            .iter()
            .filter_map(|(name, _)| dex.move_data(name).ok())
            .map(|data| Move::from(&data))
            .collect();
        Battler::from_species(&species, level, moves)
    }

    #[test]
    fn stats_follow_growth_formula() {
        let cindrel = battler(4, 10);
        // hp = 39*2*10/100 + 10 + 10, stats = base*2*10/100 + 5
        assert_eq!(cindrel.max_hp, 27);
        assert_eq!(cindrel.attack, 15);
        assert_eq!(cindrel.speed, 18);
        assert_eq!(cindrel.hp(), cindrel.max_hp);
        assert_eq!(cindrel.moves.len(), MAX_MOVES);
    }

    #[test]
    fn hp_is_clamped_and_faint_tracks_zero() {
        let mut mon = battler(10, 5);
        let max = mon.max_hp;
        assert_eq!(mon.take_damage(max * 10), max);
        assert_eq!(mon.hp(), 0);
        assert!(mon.is_fainted());

        assert_eq!(mon.heal(10), 0, "fainted creatures do not heal");
        mon.restore();
        assert!(!mon.is_fainted());

        mon.set_hp(max + 50);
        assert_eq!(mon.hp(), max);
        mon.set_hp(-3);
        assert_eq!(mon.hp(), 0);
        assert!(mon.is_fainted());
    }

    #[test]
    fn level_up_loop_terminates_below_threshold() {
        let mut mon = battler(7, 5);
        let start_level = mon.level;
        let reached = mon.gain_xp(5_000);
        assert!(!reached.is_empty());
        for pair in reached.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
        assert_eq!(reached.first().copied(), Some(start_level + 1));
        assert!(mon.xp < mon.next_level);
        assert_eq!(mon.next_level, next_level_threshold(mon.level));
    }

    #[test]
    fn level_up_grows_stats_and_pp_and_heals() {
        let mut mon = battler(1, 5);
        mon.take_damage(5);
        let before = mon.clone();
        let reached = mon.gain_xp(next_level_threshold(5));
        assert_eq!(reached, vec![6]);
        assert_eq!(mon.max_hp, before.max_hp + 3);
        assert_eq!(mon.attack, before.attack + 2);
        assert_eq!(mon.sp_defense, before.sp_defense + 2);
        assert_eq!(mon.speed, before.speed + 1);
        assert_eq!(mon.hp(), mon.max_hp);
        assert_eq!(mon.xp, 0);
        for (after, prior) in mon.moves.iter().zip(before.moves.iter()) {
            assert_eq!(after.max_pp, prior.max_pp + 1);
            assert_eq!(after.pp, after.max_pp);
        }
    }

    #[test]
    fn evolution_keeps_level_xp_and_moves() {
        let dex = BuiltinDex;
        let mut mon = battler(4, 20);
        mon.xp = 12;
        let moves = mon.moves.clone();
        let next = dex.species(5).expect("pyrrox");
        mon.evolve_into(&next);
        assert_eq!(mon.species_id, 5);
        assert_eq!(mon.display_name, "Pyrrox");
        assert_eq!(mon.level, 20);
        assert_eq!(mon.xp, 12);
        assert_eq!(mon.moves, moves);
        assert_eq!(mon.hp(), mon.max_hp);
    }
}
