//! Turn-based encounter resolution.
//!
//! An [`Encounter`] is a value owned by the run controller. It moves through
//! `Idle -> InProgress -> (Resolving -> InProgress)* -> Ended` and reports
//! everything that happened as [`BattleEvent`]s; it never prints or draws.

pub mod battler;
pub mod evolution;
pub mod formula;
pub mod trainer;

use std::fmt;

use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info};

use crate::{
    ai,
    data::{CreatureProvider, items::POTION_HEAL, moves::STRUGGLE},
    error::BattleError,
    run::RunState,
};

use self::{
    battler::{Battler, Move},
    trainer::Gauntlet,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BattleResult {
    Victory,
    Captured,
    Fled,
    Defeat,
}

impl BattleResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattleResult::Victory => "victory",
            BattleResult::Captured => "captured",
            BattleResult::Fled => "fled",
            BattleResult::Defeat => "defeat",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InProgress,
    Resolving,
    Ended(BattleResult),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncounterKind {
    Wild,
    Trainer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BattleAction {
    Attack(usize),
    ThrowCaptureDevice,
    UsePotion,
    Swap(usize),
    Flee,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BattleEvent {
    Appeared {
        name: String,
        level: u32,
        kind: EncounterKind,
    },
    SentOut {
        side: Side,
        name: String,
        level: u32,
    },
    MoveUsed {
        side: Side,
        attacker: String,
        move_name: String,
        damage: i32,
        effectiveness: f32,
    },
    MoveMissed {
        side: Side,
        attacker: String,
        move_name: String,
    },
    Fainted {
        side: Side,
        name: String,
    },
    Captured {
        name: String,
        bonus: Option<u32>,
    },
    BrokeFree {
        name: String,
    },
    Fled,
    FleeFailed,
    PotionUsed {
        name: String,
        healed: i32,
    },
    Swapped {
        name: String,
        forced: bool,
    },
    ExperienceGained {
        name: String,
        amount: u32,
    },
    LevelUp {
        name: String,
        level: u32,
    },
    Evolved {
        from: String,
        into: String,
    },
    TrainerLevelUp {
        level: u32,
    },
    TrainerDefeated {
        reward: u32,
    },
    Notice(String),
    Ended(BattleResult),
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::Appeared {
                name,
                level,
                kind: EncounterKind::Wild,
            } => write!(f, "A wild {name} appeared! (Lv.{level})"),
            BattleEvent::Appeared { name, level, .. } => {
                write!(f, "A trainer challenges you! They send out {name} (Lv.{level}).")
            }
            BattleEvent::SentOut {
                side: Side::Player,
                name,
                ..
            } => write!(f, "Go, {name}!"),
            BattleEvent::SentOut { name, level, .. } => {
                write!(f, "The trainer sends out {name} (Lv.{level})!")
            }
            BattleEvent::MoveUsed {
                attacker,
                move_name,
                damage,
                effectiveness,
                ..
            } => {
                write!(f, "{attacker} used {move_name}! {damage} dmg.")?;
                if *effectiveness > 1.0 {
                    write!(f, " It's super effective!")
                } else if *effectiveness < 1.0 {
                    write!(f, " It's not very effective...")
                } else {
                    Ok(())
                }
            }
            BattleEvent::MoveMissed {
                attacker,
                move_name,
                ..
            } => write!(f, "{attacker}'s {move_name} missed!"),
            BattleEvent::Fainted { name, .. } => write!(f, "{name} fainted!"),
            BattleEvent::Captured { name, bonus } => {
                write!(f, "Gotcha! {name} was caught!")?;
                match bonus {
                    Some(extra) => write!(f, " New dex entry: +{extra} starting orbs."),
                    None => Ok(()),
                }
            }
            BattleEvent::BrokeFree { name } => write!(f, "{name} broke free!"),
            BattleEvent::Fled => write!(f, "Got away safely!"),
            BattleEvent::FleeFailed => write!(f, "Can't escape!"),
            BattleEvent::PotionUsed { name, healed } => {
                write!(f, "{name} recovered {healed} HP.")
            }
            BattleEvent::Swapped { name, forced: true } => write!(f, "{name} steps up!"),
            BattleEvent::Swapped { name, .. } => write!(f, "Come back! Go, {name}!"),
            BattleEvent::ExperienceGained { name, amount } => {
                write!(f, "{name} gained {amount} XP!")
            }
            BattleEvent::LevelUp { name, level } => write!(f, "{name} grew to Lv.{level}!"),
            BattleEvent::Evolved { from, into } => write!(f, "{from} evolved into {into}!"),
            BattleEvent::TrainerLevelUp { level } => {
                write!(f, "Trainer rank up! You are now rank {level}.")
            }
            BattleEvent::TrainerDefeated { reward } => {
                write!(f, "You beat the trainer! Earned {reward} coins.")
            }
            BattleEvent::Notice(text) => write!(f, "{text}"),
            BattleEvent::Ended(BattleResult::Defeat) => {
                write!(f, "You were defeated. Returning home. Progress persists.")
            }
            BattleEvent::Ended(result) => write!(f, "Battle over ({}).", result.as_str()),
        }
    }
}

/// What one call into the encounter produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub events: Vec<BattleEvent>,
    pub phase: Phase,
}

impl ActionOutcome {
    pub fn result(&self) -> Option<BattleResult> {
        match self.phase {
            Phase::Ended(result) => Some(result),
            _ => None,
        }
    }
}

/// Everything an encounter reads or writes outside itself.
pub struct BattleContext<'a> {
    pub run: &'a mut RunState,
    pub rng: &'a mut RandomNumberGenerator,
    pub dex: &'a dyn CreatureProvider,
}

#[derive(Clone, Debug)]
pub struct Encounter {
    kind: EncounterKind,
    phase: Phase,
    opponent: Battler,
    gauntlet: Gauntlet,
    active: usize,
    floor: u32,
    turns: u32,
}

impl Encounter {
    pub fn wild(opponent: Battler, floor: u32) -> Self {
        Self {
            kind: EncounterKind::Wild,
            phase: Phase::Idle,
            opponent,
            gauntlet: Gauntlet::new(Vec::new()),
            active: 0,
            floor,
            turns: 0,
        }
    }

    /// `None` when the trainer has nobody to send out.
    pub fn trainer(party: Vec<Battler>, floor: u32) -> Option<Self> {
        let mut gauntlet = Gauntlet::new(party);
        let opponent = gauntlet.next_opponent()?;
        Some(Self {
            kind: EncounterKind::Trainer,
            phase: Phase::Idle,
            opponent,
            gauntlet,
            active: 0,
            floor,
            turns: 0,
        })
    }

    pub fn kind(&self) -> EncounterKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn opponent(&self) -> &Battler {
        &self.opponent
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn reserve(&self) -> usize {
        self.gauntlet.remaining()
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    /// Takes the encounter guard and sends out the first creature able to
    /// fight. Fails without touching the run when the guard is held.
    pub fn begin(&mut self, ctx: &mut BattleContext<'_>) -> Result<ActionOutcome, BattleError> {
        if ctx.run.guard.is_locked() {
            return Err(BattleError::Busy);
        }
        if self.phase != Phase::Idle {
            return Err(BattleError::NotInProgress);
        }
        let active = ctx.run.first_standing().ok_or(BattleError::EmptyParty)?;
        let lead = ctx.run.party.get(active).ok_or(BattleError::EmptyParty)?;
        let events = vec![
            BattleEvent::Appeared {
                name: self.opponent.display_name.clone(),
                level: self.opponent.level,
                kind: self.kind,
            },
            BattleEvent::SentOut {
                side: Side::Player,
                name: lead.display_name.clone(),
                level: lead.level,
            },
        ];
        if !ctx.run.guard.try_lock() {
            return Err(BattleError::Busy);
        }
        self.active = active;
        self.phase = Phase::InProgress;
        info!(
            "{:?} encounter on floor {}: {} lv{}",
            self.kind, self.floor, self.opponent.name, self.opponent.level
        );
        Ok(self.outcome(events))
    }

    /// Resolves one player action and the opponent's reply. Invalid requests
    /// return an error and change nothing; refusals that cost no turn come
    /// back as a single [`BattleEvent::Notice`].
    pub fn act(
        &mut self,
        ctx: &mut BattleContext<'_>,
        action: BattleAction,
    ) -> Result<ActionOutcome, BattleError> {
        if self.phase != Phase::InProgress {
            return Err(BattleError::NotInProgress);
        }
        if let Some(notice) = self.refusal(ctx.run, action)? {
            return Ok(self.outcome(vec![BattleEvent::Notice(notice.to_string())]));
        }

        self.phase = Phase::Resolving;
        self.turns += 1;
        debug!("turn {}: {:?}", self.turns, action);
        let mut events = Vec::new();
        if let Err(err) = self.resolve(ctx, action, &mut events) {
            self.phase = Phase::InProgress;
            return Err(err);
        }
        if self.phase == Phase::Resolving {
            self.settle(ctx, &mut events)?;
        }
        Ok(self.outcome(events))
    }

    fn outcome(&self, events: Vec<BattleEvent>) -> ActionOutcome {
        ActionOutcome {
            events,
            phase: self.phase,
        }
    }

    fn refusal(
        &self,
        run: &RunState,
        action: BattleAction,
    ) -> Result<Option<&'static str>, BattleError> {
        let active = run.party.get(self.active).ok_or(BattleError::EmptyParty)?;
        let notice = match action {
            BattleAction::Attack(index) => {
                if active.moves.iter().all(|mv| mv.pp == 0) {
                    return Ok(None);
                }
                let mv = active
                    .moves
                    .get(index)
                    .ok_or(BattleError::InvalidMove { index })?;
                if mv.pp == 0 {
                    return Err(BattleError::NoPp {
                        move_name: mv.name.clone(),
                    });
                }
                None
            }
            BattleAction::ThrowCaptureDevice => {
                if self.kind == EncounterKind::Trainer {
                    Some("You can't capture a trainer's creature!")
                } else if run.inventory.capture_devices == 0 {
                    Some("No capture devices left!")
                } else {
                    None
                }
            }
            BattleAction::UsePotion => {
                if run.inventory.potions == 0 {
                    Some("No potions left!")
                } else if active.hp() >= active.max_hp {
                    Some("It's already at full health.")
                } else {
                    None
                }
            }
            BattleAction::Swap(index) => {
                let target = run
                    .party
                    .get(index)
                    .ok_or(BattleError::InvalidSwap { index })?;
                if index == self.active || target.is_fainted() {
                    return Err(BattleError::InvalidSwap { index });
                }
                None
            }
            BattleAction::Flee => {
                if self.kind == EncounterKind::Trainer {
                    Some("There's no running from a trainer battle!")
                } else {
                    None
                }
            }
        };
        Ok(notice)
    }

    fn resolve(
        &mut self,
        ctx: &mut BattleContext<'_>,
        action: BattleAction,
        events: &mut Vec<BattleEvent>,
    ) -> Result<(), BattleError> {
        match action {
            BattleAction::Attack(index) => {
                let player_speed = self.active_battler(ctx.run)?.speed;
                if formula::player_moves_first(player_speed, self.opponent.speed) {
                    self.player_strike(ctx, index, events)?;
                    self.opponent_strike(ctx, events)?;
                } else {
                    self.opponent_strike(ctx, events)?;
                    self.player_strike(ctx, index, events)?;
                }
            }
            BattleAction::ThrowCaptureDevice => {
                ctx.run.inventory.capture_devices =
                    ctx.run.inventory.capture_devices.saturating_sub(1);
                let chance = formula::capture_chance(
                    self.opponent.max_hp,
                    self.opponent.hp(),
                    self.opponent.capture_rate,
                );
                let roll = ctx.rng.rand::<f32>();
                debug!("capture roll {roll:.3} against {chance:.3}");
                if roll < chance {
                    let caught = self.opponent.clone();
                    let bonus = ctx
                        .run
                        .meta
                        .record_capture(caught.species_id, caught.capture_rate);
                    info!("captured {} (bonus {:?})", caught.name, bonus);
                    events.push(BattleEvent::Captured {
                        name: caught.display_name.clone(),
                        bonus,
                    });
                    ctx.run.party.push(caught);
                    self.finish(ctx.run, BattleResult::Captured, events);
                } else {
                    events.push(BattleEvent::BrokeFree {
                        name: self.opponent.display_name.clone(),
                    });
                    self.opponent_strike(ctx, events)?;
                }
            }
            BattleAction::UsePotion => {
                ctx.run.inventory.potions = ctx.run.inventory.potions.saturating_sub(1);
                let member = self.active_battler(ctx.run)?;
                let healed = member.heal(POTION_HEAL);
                events.push(BattleEvent::PotionUsed {
                    name: member.display_name.clone(),
                    healed,
                });
                self.opponent_strike(ctx, events)?;
            }
            BattleAction::Swap(index) => {
                self.active = index;
                let member = self.active_battler(ctx.run)?;
                events.push(BattleEvent::Swapped {
                    name: member.display_name.clone(),
                    forced: false,
                });
                self.opponent_strike(ctx, events)?;
            }
            BattleAction::Flee => {
                let player_speed = self.active_battler(ctx.run)?.speed;
                if formula::flee_succeeds(player_speed, self.opponent.speed, ctx.rng.rand::<f32>())
                {
                    events.push(BattleEvent::Fled);
                    self.finish(ctx.run, BattleResult::Fled, events);
                } else {
                    events.push(BattleEvent::FleeFailed);
                    self.opponent_strike(ctx, events)?;
                }
            }
        }
        Ok(())
    }

    fn active_battler<'r>(&self, run: &'r mut RunState) -> Result<&'r mut Battler, BattleError> {
        run.party
            .get_mut(self.active)
            .ok_or(BattleError::EmptyParty)
    }

    fn player_strike(
        &mut self,
        ctx: &mut BattleContext<'_>,
        slot: usize,
        events: &mut Vec<BattleEvent>,
    ) -> Result<(), BattleError> {
        let attacker = ctx
            .run
            .party
            .get_mut(self.active)
            .ok_or(BattleError::EmptyParty)?;
        strike(
            attacker,
            &mut self.opponent,
            Some(slot),
            Side::Player,
            ctx.rng,
            ctx.dex,
            events,
        );
        Ok(())
    }

    fn opponent_strike(
        &mut self,
        ctx: &mut BattleContext<'_>,
        events: &mut Vec<BattleEvent>,
    ) -> Result<(), BattleError> {
        let slot = ai::choose_move(&self.opponent, ctx.rng);
        let defender = ctx
            .run
            .party
            .get_mut(self.active)
            .ok_or(BattleError::EmptyParty)?;
        strike(
            &mut self.opponent,
            defender,
            slot,
            Side::Opponent,
            ctx.rng,
            ctx.dex,
            events,
        );
        Ok(())
    }

    /// End-of-action checks: knockouts, experience, the next trainer
    /// creature, forced switches and defeat.
    fn settle(
        &mut self,
        ctx: &mut BattleContext<'_>,
        events: &mut Vec<BattleEvent>,
    ) -> Result<(), BattleError> {
        if self.opponent.is_fainted() {
            self.award_experience(ctx, events)?;
            if let Some(next) = self.gauntlet.next_opponent() {
                events.push(BattleEvent::SentOut {
                    side: Side::Opponent,
                    name: next.display_name.clone(),
                    level: next.level,
                });
                self.opponent = next;
            } else {
                if self.kind == EncounterKind::Trainer {
                    let reward = trainer::trainer_reward(self.floor);
                    ctx.run.money = ctx.run.money.saturating_add(reward);
                    events.push(BattleEvent::TrainerDefeated { reward });
                    for level in ctx.run.trainer.gain(trainer::TRAINER_CLEAR_XP) {
                        events.push(BattleEvent::TrainerLevelUp { level });
                    }
                }
                self.finish(ctx.run, BattleResult::Victory, events);
                return Ok(());
            }
        } else if self.active_battler(ctx.run)?.is_fainted() {
            match ctx.run.first_standing() {
                Some(next) => {
                    self.active = next;
                    events.push(BattleEvent::Swapped {
                        name: self.active_battler(ctx.run)?.display_name.clone(),
                        forced: true,
                    });
                }
                None => {
                    self.finish(ctx.run, BattleResult::Defeat, events);
                    return Ok(());
                }
            }
        }
        self.phase = Phase::InProgress;
        Ok(())
    }

    fn award_experience(
        &mut self,
        ctx: &mut BattleContext<'_>,
        events: &mut Vec<BattleEvent>,
    ) -> Result<(), BattleError> {
        self.gauntlet.defeated += 1;
        let gain = formula::xp_reward(self.opponent.level);
        let member = ctx
            .run
            .party
            .get_mut(self.active)
            .ok_or(BattleError::EmptyParty)?;
        member.add_xp(gain);
        events.push(BattleEvent::ExperienceGained {
            name: member.display_name.clone(),
            amount: gain,
        });
        while let Some(level) = member.try_level_up() {
            events.push(BattleEvent::LevelUp {
                name: member.display_name.clone(),
                level,
            });
            if let Some((from, into, species)) = evolution::maybe_evolve(member, ctx.dex) {
                info!("{from} evolved into {into}");
                ctx.run.meta.register_form(species);
                events.push(BattleEvent::Evolved { from, into });
            }
        }
        let trainer_xp = trainer::knockout_trainer_xp(self.opponent.level);
        for level in ctx.run.trainer.gain(trainer_xp) {
            events.push(BattleEvent::TrainerLevelUp { level });
        }
        Ok(())
    }

    fn finish(&mut self, run: &mut RunState, result: BattleResult, events: &mut Vec<BattleEvent>) {
        self.phase = Phase::Ended(result);
        run.guard.release();
        info!("encounter ended after {} turns: {}", self.turns, result.as_str());
        events.push(BattleEvent::Ended(result));
    }
}

/// One attack from `attacker` into `defender`. Does nothing when either side
/// is already down. An empty or exhausted slot becomes Struggle.
fn strike(
    attacker: &mut Battler,
    defender: &mut Battler,
    slot: Option<usize>,
    side: Side,
    rng: &mut RandomNumberGenerator,
    dex: &dyn CreatureProvider,
    events: &mut Vec<BattleEvent>,
) {
    if attacker.is_fainted() || defender.is_fainted() {
        return;
    }
    let mv = match slot
        .and_then(|index| attacker.moves.get_mut(index))
        .filter(|mv| mv.pp > 0)
    {
        Some(mv) => {
            mv.pp -= 1;
            mv.clone()
        }
        None => Move::from(&STRUGGLE),
    };

    let roll = rng.rand::<f32>() * 100.0;
    if !formula::accuracy_hits(roll, mv.accuracy) {
        events.push(BattleEvent::MoveMissed {
            side,
            attacker: attacker.display_name.clone(),
            move_name: mv.name,
        });
        return;
    }

    let multiplier = dex.effectiveness(mv.element, &defender.types);
    let spread = formula::random_factor(rng.rand::<f32>());
    let amount = formula::damage(attacker, defender, &mv, multiplier, spread);
    let dealt = defender.take_damage(amount);
    events.push(BattleEvent::MoveUsed {
        side,
        attacker: attacker.display_name.clone(),
        move_name: mv.name,
        damage: dealt,
        effectiveness: multiplier,
    });
    if defender.is_fainted() {
        events.push(BattleEvent::Fainted {
            side: side.other(),
            name: defender.display_name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{battle::battler::tests::battler, data::BuiltinDex};

    struct Fixture {
        run: RunState,
        rng: RandomNumberGenerator,
        dex: BuiltinDex,
    }

    impl Fixture {
        fn new(party: Vec<Battler>, seed: u64) -> Self {
            let run = RunState {
                party,
                ..RunState::default()
            };
            Self {
                run,
                rng: RandomNumberGenerator::seeded(seed),
                dex: BuiltinDex,
            }
        }

        fn ctx(&mut self) -> BattleContext<'_> {
            BattleContext {
                run: &mut self.run,
                rng: &mut self.rng,
                dex: &self.dex,
            }
        }
    }

    fn sure_hits(mut mon: Battler) -> Battler {
        for mv in mon.moves.iter_mut() {
            mv.accuracy = 100;
        }
        mon
    }

    fn fragile(mut mon: Battler) -> Battler {
        mon.set_hp(1);
        mon
    }

    fn started(fixture: &mut Fixture, mut encounter: Encounter) -> Encounter {
        encounter.begin(&mut fixture.ctx()).expect("encounter starts");
        encounter
    }

    #[test]
    fn second_encounter_is_refused_while_one_runs() {
        let mut fx = Fixture::new(vec![battler(4, 10)], 1);
        let first = started(&mut fx, Encounter::wild(battler(10, 3), 1));
        assert_eq!(first.phase(), Phase::InProgress);

        let snapshot = fx.run.clone();
        let mut second = Encounter::wild(battler(12, 3), 1);
        assert_eq!(second.begin(&mut fx.ctx()).err(), Some(BattleError::Busy));
        assert_eq!(second.phase(), Phase::Idle);
        assert_eq!(fx.run, snapshot);
    }

    #[test]
    fn actions_before_begin_are_rejected() {
        let mut fx = Fixture::new(vec![battler(4, 10)], 1);
        let mut encounter = Encounter::wild(battler(10, 3), 1);
        assert_eq!(
            encounter.act(&mut fx.ctx(), BattleAction::Flee).err(),
            Some(BattleError::NotInProgress)
        );
    }

    #[test]
    fn faster_player_knocks_out_before_reply() {
        let mut fx = Fixture::new(vec![battler(4, 30)], 2);
        let mut encounter = started(&mut fx, Encounter::wild(fragile(battler(10, 2)), 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("attack resolves");

        assert!(matches!(
            outcome.events.first(),
            Some(BattleEvent::MoveUsed {
                side: Side::Player,
                ..
            })
        ));
        assert!(!outcome.events.iter().any(|event| matches!(
            event,
            BattleEvent::MoveUsed {
                side: Side::Opponent,
                ..
            } | BattleEvent::MoveMissed {
                side: Side::Opponent,
                ..
            }
        )));
        assert_eq!(outcome.result(), Some(BattleResult::Victory));
        assert_eq!(fx.run.party[0].hp(), fx.run.party[0].max_hp);
        assert!(!fx.run.guard.is_locked());
    }

    #[test]
    fn faster_opponent_strikes_first() {
        let mut fx = Fixture::new(vec![fragile(battler(10, 2))], 2);
        let opponent = sure_hits(battler(4, 30));
        let mut encounter = started(&mut fx, Encounter::wild(opponent, 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("attack resolves");

        assert!(matches!(
            outcome.events.first(),
            Some(BattleEvent::MoveUsed {
                side: Side::Opponent,
                ..
            })
        ));
        assert_eq!(encounter.opponent().hp(), encounter.opponent().max_hp);
        assert_eq!(outcome.result(), Some(BattleResult::Defeat));
        assert!(!fx.run.guard.is_locked());
    }

    #[test]
    fn capture_adds_to_party_or_hands_opponent_a_turn() {
        let mut captures = 0;
        for seed in 0..40 {
            let mut fx = Fixture::new(vec![battler(4, 30)], seed);
            let mut encounter = started(&mut fx, Encounter::wild(fragile(battler(10, 3)), 1));
            let outcome = encounter
                .act(&mut fx.ctx(), BattleAction::ThrowCaptureDevice)
                .expect("throw resolves");
            assert_eq!(fx.run.inventory.capture_devices, 4);
            match outcome.result() {
                Some(BattleResult::Captured) => {
                    captures += 1;
                    assert_eq!(fx.run.party.len(), 2);
                    assert!(fx.run.meta.captured.contains(&10));
                    assert_eq!(fx.run.meta.bonus_capture_devices, 1);
                    assert!(!fx.run.guard.is_locked());
                }
                None => {
                    assert!(matches!(
                        outcome.events.first(),
                        Some(BattleEvent::BrokeFree { .. })
                    ));
                    assert_eq!(outcome.events.len(), 2);
                    assert_eq!(fx.run.party.len(), 1);
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
        assert!(captures > 0);
    }

    #[test]
    fn capture_refusals_cost_no_turn() {
        let mut fx = Fixture::new(vec![battler(4, 30)], 3);
        fx.run.inventory.capture_devices = 0;
        let mut encounter = started(&mut fx, Encounter::wild(battler(10, 3), 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::ThrowCaptureDevice)
            .expect("refusal is not an error");
        assert_eq!(
            outcome.events,
            vec![BattleEvent::Notice("No capture devices left!".to_string())]
        );
        assert_eq!(outcome.phase, Phase::InProgress);
        assert_eq!(encounter.turns(), 0);

        let mut fx = Fixture::new(vec![battler(4, 30)], 3);
        let trainer = Encounter::trainer(vec![battler(10, 3)], 2).expect("trainer");
        let mut encounter = started(&mut fx, trainer);
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::ThrowCaptureDevice)
            .expect("refusal is not an error");
        assert!(matches!(outcome.events.as_slice(), [BattleEvent::Notice(_)]));
        assert_eq!(fx.run.inventory.capture_devices, 5);
    }

    #[test]
    fn faster_player_always_flees() {
        let mut fx = Fixture::new(vec![battler(4, 30)], 4);
        let mut encounter = started(&mut fx, Encounter::wild(battler(10, 2), 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::Flee)
            .expect("flee resolves");
        assert_eq!(
            outcome.events,
            vec![BattleEvent::Fled, BattleEvent::Ended(BattleResult::Fled)]
        );
        assert!(encounter.is_over());
        assert_eq!(
            encounter.act(&mut fx.ctx(), BattleAction::Flee).err(),
            Some(BattleError::NotInProgress)
        );
    }

    #[test]
    fn potion_heals_and_opponent_replies() {
        let mut lead = battler(4, 30);
        lead.set_hp(10);
        let mut fx = Fixture::new(vec![lead], 5);
        fx.run.inventory.potions = 1;
        let mut encounter = started(&mut fx, Encounter::wild(battler(10, 2), 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::UsePotion)
            .expect("potion resolves");
        assert_eq!(fx.run.inventory.potions, 0);
        assert!(matches!(
            outcome.events.first(),
            Some(BattleEvent::PotionUsed { healed: 20, .. })
        ));
        assert!(outcome.events.iter().any(|event| matches!(
            event,
            BattleEvent::MoveUsed {
                side: Side::Opponent,
                ..
            } | BattleEvent::MoveMissed {
                side: Side::Opponent,
                ..
            }
        )));
    }

    #[test]
    fn invalid_requests_change_nothing() {
        let mut benched = battler(7, 5);
        benched.set_hp(0);
        let mut fx = Fixture::new(vec![battler(4, 30), benched], 6);
        let mut encounter = started(&mut fx, Encounter::wild(battler(10, 2), 1));
        let run_before = fx.run.clone();
        let opponent_before = encounter.opponent().clone();

        let mut ctx = fx.ctx();
        assert_eq!(
            encounter.act(&mut ctx, BattleAction::Attack(9)).err(),
            Some(BattleError::InvalidMove { index: 9 })
        );
        assert_eq!(
            encounter.act(&mut ctx, BattleAction::Swap(0)).err(),
            Some(BattleError::InvalidSwap { index: 0 })
        );
        assert_eq!(
            encounter.act(&mut ctx, BattleAction::Swap(1)).err(),
            Some(BattleError::InvalidSwap { index: 1 })
        );
        assert_eq!(
            encounter.act(&mut ctx, BattleAction::Swap(4)).err(),
            Some(BattleError::InvalidSwap { index: 4 })
        );
        assert_eq!(fx.run, run_before);
        assert_eq!(encounter.opponent(), &opponent_before);
        assert_eq!(encounter.phase(), Phase::InProgress);
    }

    #[test]
    fn empty_slot_is_refused_until_every_move_is_spent() {
        let mut fx = Fixture::new(vec![battler(4, 30)], 7);
        let mut encounter = started(&mut fx, Encounter::wild(fragile(battler(10, 2)), 1));
        fx.run.party[0].moves[0].pp = 0;
        assert!(matches!(
            encounter.act(&mut fx.ctx(), BattleAction::Attack(0)),
            Err(BattleError::NoPp { .. })
        ));

        for mv in fx.run.party[0].moves.iter_mut() {
            mv.pp = 0;
        }
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("struggle resolves");
        assert!(matches!(
            outcome.events.first(),
            Some(BattleEvent::MoveUsed { move_name, .. }) if move_name == "struggle"
        ));
    }

    #[test]
    fn knockout_levels_up_and_evolves_on_gate_level() {
        let mut lead = battler(4, 19);
        lead.xp = 500;
        let mut fx = Fixture::new(vec![lead], 8);
        let mut encounter = started(&mut fx, Encounter::wild(fragile(battler(10, 5)), 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("attack resolves");

        assert!(outcome.events.contains(&BattleEvent::LevelUp {
            name: "Cindrel".to_string(),
            level: 20,
        }));
        assert!(outcome.events.contains(&BattleEvent::Evolved {
            from: "Cindrel".to_string(),
            into: "Pyrrox".to_string(),
        }));
        assert_eq!(fx.run.party[0].species_id, 5);
        assert_eq!(fx.run.party[0].level, 20);
        assert!(fx.run.meta.seen_forms.contains(&5));
        assert_eq!(outcome.result(), Some(BattleResult::Victory));
    }

    #[test]
    fn trainer_gauntlet_pays_out_after_last_creature() {
        let mut fx = Fixture::new(vec![battler(4, 30)], 9);
        let party = vec![fragile(battler(10, 2)), fragile(battler(12, 2))];
        let mut encounter = started(&mut fx, Encounter::trainer(party, 1).expect("trainer"));

        let first = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("first knockout");
        assert_eq!(first.phase, Phase::InProgress);
        assert!(first.events.iter().any(|event| matches!(
            event,
            BattleEvent::SentOut {
                side: Side::Opponent,
                ..
            }
        )));
        assert_eq!(encounter.opponent().species_id, 12);
        assert_eq!(fx.run.money, 0);

        let last = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("second knockout");
        assert_eq!(last.result(), Some(BattleResult::Victory));
        assert!(last
            .events
            .contains(&BattleEvent::TrainerDefeated { reward: 220 }));
        assert_eq!(fx.run.money, 220);
    }

    #[test]
    fn fainted_lead_is_replaced_automatically() {
        let mut fx = Fixture::new(vec![fragile(battler(10, 2)), battler(7, 30)], 10);
        let opponent = sure_hits(battler(4, 30));
        let mut encounter = started(&mut fx, Encounter::wild(opponent, 1));
        let outcome = encounter
            .act(&mut fx.ctx(), BattleAction::Attack(0))
            .expect("attack resolves");
        assert!(outcome.events.contains(&BattleEvent::Swapped {
            name: "Driplet".to_string(),
            forced: true,
        }));
        assert_eq!(encounter.active_index(), 1);
        assert_eq!(outcome.phase, Phase::InProgress);
    }

    #[test]
    fn events_render_as_log_lines() {
        let event = BattleEvent::MoveUsed {
            side: Side::Player,
            attacker: "Cindrel".to_string(),
            move_name: "ember".to_string(),
            damage: 12,
            effectiveness: 2.0,
        };
        assert_eq!(
            event.to_string(),
            "Cindrel used ember! 12 dmg. It's super effective!"
        );
    }
}
