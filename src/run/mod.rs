pub mod controller;
pub mod input;
pub mod movement;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{battle::battler::Battler, battle::formula, data::species::SpeciesId};

pub use controller::RunController;

pub const STARTING_FLOOR: u32 = 1;
pub const FLOOR_UNLOCK_STEP: u32 = 5;
pub const DUNGEON_MIN_CAPTURE_DEVICES: u32 = 5;
pub const DEFEAT_MIN_CAPTURE_DEVICES: u32 = 3;
pub const TRAINER_XP_PER_RANK: u32 = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Home,
    Dungeon,
    BattleLocked,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub capture_devices: u32,
    pub potions: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            capture_devices: DUNGEON_MIN_CAPTURE_DEVICES,
            potions: 0,
        }
    }
}

/// Progress that survives defeat and trips home.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProgress {
    pub captured: BTreeSet<SpeciesId>,
    pub seen_forms: BTreeSet<SpeciesId>,
    pub bonus_capture_devices: u32,
    pub unlocked_floors: BTreeSet<u32>,
    pub max_floor: u32,
}

impl Default for MetaProgress {
    fn default() -> Self {
        Self {
            captured: BTreeSet::new(),
            seen_forms: BTreeSet::new(),
            bonus_capture_devices: 0,
            unlocked_floors: BTreeSet::from([STARTING_FLOOR]),
            max_floor: STARTING_FLOOR,
        }
    }
}

impl MetaProgress {
    /// Logs a captured species. The first capture of a species grants its
    /// rarity bonus to the starting capture devices; repeats grant nothing.
    pub fn record_capture(&mut self, species: SpeciesId, capture_rate: u32) -> Option<u32> {
        self.seen_forms.insert(species);
        if !self.captured.insert(species) {
            return None;
        }
        let bonus = formula::capture_bonus(capture_rate);
        self.bonus_capture_devices += bonus;
        Some(bonus)
    }

    /// Adds a form to the dex without the capture bonus (starters,
    /// evolutions).
    pub fn register_form(&mut self, species: SpeciesId) {
        self.seen_forms.insert(species);
    }

    pub fn record_floor(&mut self, floor: u32) {
        self.max_floor = self.max_floor.max(floor);
    }

    /// Unlocks floor `1 + 5k` for every multiple of five the deepest floor
    /// has crossed. Returns the floors unlocked by this call.
    pub fn unlock_floors(&mut self) -> Vec<u32> {
        let mut fresh = Vec::new();
        let mut step = FLOOR_UNLOCK_STEP;
        while step <= self.max_floor {
            let floor = step + 1;
            if self.unlocked_floors.insert(floor) {
                fresh.push(floor);
            }
            step += FLOOR_UNLOCK_STEP;
        }
        fresh
    }
}

/// Trainer rank: a progression track separate from the creatures'.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerProgress {
    pub level: u32,
    pub xp: u32,
}

impl Default for TrainerProgress {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

impl TrainerProgress {
    /// Returns the ranks reached.
    pub fn gain(&mut self, amount: u32) -> Vec<u32> {
        self.xp = self.xp.saturating_add(amount);
        let mut reached = Vec::new();
        while self.xp >= TRAINER_XP_PER_RANK {
            self.xp -= TRAINER_XP_PER_RANK;
            self.level += 1;
            reached.push(self.level);
        }
        reached
    }
}

/// Non-blocking single-slot lock around encounters. A second encounter
/// while one is active is refused, never queued.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncounterGuard {
    locked: bool,
}

impl EncounterGuard {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns `false` (and changes nothing) when already held.
    pub fn try_lock(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    pub fn release(&mut self) {
        self.locked = false;
    }
}

/// Everything the persistence store keeps about a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub mode: Mode,
    pub floor: u32,
    pub party: Vec<Battler>,
    pub inventory: Inventory,
    pub money: u32,
    pub meta: MetaProgress,
    pub trainer: TrainerProgress,
    #[serde(skip)]
    pub guard: EncounterGuard,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            mode: Mode::Home,
            floor: STARTING_FLOOR,
            party: Vec::new(),
            inventory: Inventory::default(),
            money: 0,
            meta: MetaProgress::default(),
            trainer: TrainerProgress::default(),
            guard: EncounterGuard::default(),
        }
    }
}

impl RunState {
    pub fn restore_party(&mut self) {
        for battler in self.party.iter_mut() {
            battler.restore();
        }
    }

    pub fn first_standing(&self) -> Option<usize> {
        self.party.iter().position(|battler| !battler.is_fainted())
    }

    pub fn party_has_type(&self, element: crate::data::types::Element) -> bool {
        self.party.iter().any(|battler| battler.has_type(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_bonus_is_granted_once_per_species() {
        let mut meta = MetaProgress::default();
        assert_eq!(meta.record_capture(4, 45), Some(5));
        assert_eq!(meta.record_capture(4, 45), None);
        assert_eq!(meta.record_capture(10, 255), Some(1));
        assert_eq!(meta.bonus_capture_devices, 6);
        assert!(meta.captured.contains(&4));
    }

    #[test]
    fn floors_unlock_in_steps_of_five() {
        let mut meta = MetaProgress::default();
        meta.record_floor(4);
        assert!(meta.unlock_floors().is_empty());
        meta.record_floor(12);
        assert_eq!(meta.unlock_floors(), vec![6, 11]);
        assert!(meta.unlock_floors().is_empty());
        assert_eq!(
            meta.unlocked_floors.iter().copied().collect::<Vec<_>>(),
            vec![1, 6, 11]
        );
    }

    #[test]
    fn guard_refuses_second_lock() {
        let mut guard = EncounterGuard::default();
        assert!(guard.try_lock());
        assert!(!guard.try_lock());
        assert!(guard.is_locked());
        guard.release();
        assert!(guard.try_lock());
    }

    #[test]
    fn trainer_ranks_up_every_hundred_xp() {
        let mut trainer = TrainerProgress::default();
        assert_eq!(trainer.gain(250), vec![2, 3]);
        assert_eq!(trainer.xp, 50);
    }
}
