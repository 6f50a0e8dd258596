use std::collections::VecDeque;

use super::battler::Battler;

pub const TRAINER_BASE_REWARD: u32 = 200;
pub const TRAINER_REWARD_PER_FLOOR: u32 = 20;
/// Trainer XP for clearing a whole gauntlet, on top of per-knockout XP.
pub const TRAINER_CLEAR_XP: u32 = 50;

pub fn trainer_reward(floor: u32) -> u32 {
    TRAINER_BASE_REWARD + floor * TRAINER_REWARD_PER_FLOOR
}

/// Trainer XP for knocking out one creature.
pub fn knockout_trainer_xp(opponent_level: u32) -> u32 {
    opponent_level * 5
}

/// The creatures a trainer still has in reserve, fought one after another.
#[derive(Clone, Debug, PartialEq)]
pub struct Gauntlet {
    queue: VecDeque<Battler>,
    pub defeated: u32,
}

impl Gauntlet {
    pub fn new(party: impl IntoIterator<Item = Battler>) -> Self {
        Self {
            queue: party.into_iter().collect(),
            defeated: 0,
        }
    }

    pub fn next_opponent(&mut self) -> Option<Battler> {
        self.queue.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}
