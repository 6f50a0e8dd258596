//! Closed-form combat math. Everything random is passed in as a value so the
//! numbers can be pinned in tests.

use crate::data::moves::MoveCategory;

use super::battler::{Battler, Move};

pub const STAB_BONUS: f32 = 1.5;
pub const MIN_RANDOM_FACTOR: f32 = 0.85;
pub const CAPTURE_FLOOR: f32 = 0.02;
pub const CAPTURE_CEILING: f32 = 0.9;
pub const FLEE_FALLBACK_CHANCE: f32 = 0.5;

const XP_BASE: f32 = 20.0;
const XP_PER_LEVEL: f32 = 8.0;

/// Maps a unit roll in `[0, 1)` onto the damage spread `[0.85, 1.0)`.
pub fn random_factor(unit_roll: f32) -> f32 {
    MIN_RANDOM_FACTOR + unit_roll.clamp(0.0, 1.0) * (1.0 - MIN_RANDOM_FACTOR)
}

/// A move connects when the percent roll does not exceed its accuracy.
pub fn accuracy_hits(roll_percent: f32, accuracy: u32) -> bool {
    roll_percent <= accuracy as f32
}

/// Damage before the target's HP clamp. Never below 1.
pub fn damage(
    attacker: &Battler,
    defender: &Battler,
    mv: &Move,
    type_multiplier: f32,
    random_factor: f32,
) -> i32 {
    let (attack, defense) = match mv.category {
        MoveCategory::Special => (attacker.sp_attack, defender.sp_defense),
        MoveCategory::Physical => (attacker.attack, defender.defense),
    };
    let level = attacker.level as f32;
    let base = ((2.0 * level / 5.0 + 2.0) * mv.power as f32 * attack as f32
        / defense.max(1) as f32)
        / 50.0
        + 2.0;
    let stab = if attacker.has_type(mv.element) {
        STAB_BONUS
    } else {
        1.0
    };
    let raw = base * stab * type_multiplier * random_factor;
    (raw.floor() as i32).max(1)
}

/// Probability that a capture device holds the target.
pub fn capture_chance(max_hp: i32, current_hp: i32, capture_rate: u32) -> f32 {
    let max_hp = max_hp.max(1) as f32;
    let current_hp = current_hp.clamp(0, max_hp as i32) as f32;
    let hp_factor = (3.0 * max_hp - 2.0 * current_hp) / (3.0 * max_hp);
    let base = capture_rate as f32 / 255.0;
    (base * (0.35 + hp_factor)).clamp(CAPTURE_FLOOR, CAPTURE_CEILING)
}

/// Permanent starting capture devices earned by logging a new species.
/// Rarer species (lower capture rate) pay more.
pub fn capture_bonus(capture_rate: u32) -> u32 {
    let rarity = 255u32.saturating_sub(capture_rate);
    (rarity / 50 + 1).max(1)
}

pub fn xp_reward(opponent_level: u32) -> u32 {
    (XP_BASE + opponent_level as f32 * XP_PER_LEVEL).floor() as u32
}

/// Fleeing is free when the player is at least as fast as the opponent.
pub fn flee_succeeds(player_speed: i32, opponent_speed: i32, unit_roll: f32) -> bool {
    player_speed >= opponent_speed || unit_roll < FLEE_FALLBACK_CHANCE
}

/// Speed ties go to the player.
pub fn player_moves_first(player_speed: i32, opponent_speed: i32) -> bool {
    player_speed >= opponent_speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battler::tests::battler;
    use crate::data::{moves::MoveCategory, types::Element};
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn tackle_like(power: u32, element: Element, category: MoveCategory) -> Move {
        Move {
            name: "test-move".to_string(),
            power,
            accuracy: 100,
            pp: 10,
            max_pp: 10,
            element,
            category,
        }
    }

    #[test]
    fn damage_matches_worked_example() {
        let mut attacker = battler(4, 10);
        attacker.attack = 30;
        let mut defender = battler(10, 10);
        defender.defense = 20;
        let mv = tackle_like(40, Element::Fire, MoveCategory::Physical);
        // ((6 * 40 * 30 / 20) / 50 + 2) * 1.5 = 13.8
        assert_eq!(damage(&attacker, &defender, &mv, 1.0, 1.0), 13);
    }

    #[test]
    fn special_moves_use_special_stats() {
        let mut attacker = battler(4, 10);
        attacker.attack = 1;
        attacker.sp_attack = 30;
        let mut defender = battler(10, 10);
        defender.defense = 500;
        defender.sp_defense = 20;
        let mv = tackle_like(40, Element::Fire, MoveCategory::Special);
        assert_eq!(damage(&attacker, &defender, &mv, 1.0, 1.0), 13);
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(1.0, 0.0)]
    #[case(0.85, 0.5)]
    fn damage_never_drops_below_one(#[case] random: f32, #[case] multiplier: f32) {
        let mut attacker = battler(10, 1);
        attacker.attack = 1;
        let mut defender = battler(16, 60);
        defender.defense = 999;
        let mv = tackle_like(1, Element::Normal, MoveCategory::Physical);
        assert!(damage(&attacker, &defender, &mv, multiplier, random) >= 1);
    }

    #[test]
    fn zero_defense_is_treated_as_one() {
        let attacker = battler(4, 10);
        let mut defender = battler(10, 10);
        defender.defense = 0;
        let mv = tackle_like(40, Element::Normal, MoveCategory::Physical);
        assert!(damage(&attacker, &defender, &mv, 1.0, 1.0) > 1);
    }

    #[test]
    fn capture_chance_matches_worked_example() {
        // hp_factor = 130/150, chance = 45/255 * (0.35 + 0.8667)
        assert_relative_eq!(capture_chance(50, 10, 45), 0.2147, epsilon = 1e-3);
    }

    #[test]
    fn capture_chance_rises_as_hp_falls_and_stays_clamped() {
        for rate in [3, 45, 120, 255] {
            let mut previous = 0.0;
            for hp in (0..=80).rev() {
                let chance = capture_chance(80, hp, rate);
                assert!(chance >= previous, "rate {rate} hp {hp}");
                assert!((CAPTURE_FLOOR..=CAPTURE_CEILING).contains(&chance));
                previous = chance;
            }
        }
    }

    #[rstest]
    #[case(255, 1)]
    #[case(190, 2)]
    #[case(45, 5)]
    #[case(3, 6)]
    fn capture_bonus_scales_with_rarity(#[case] rate: u32, #[case] bonus: u32) {
        assert_eq!(capture_bonus(rate), bonus);
    }

    #[test]
    fn xp_reward_scales_with_level() {
        assert_eq!(xp_reward(1), 28);
        assert_eq!(xp_reward(10), 100);
    }

    #[test]
    fn flee_and_order_favour_the_faster_or_equal_side() {
        assert!(flee_succeeds(30, 30, 0.99));
        assert!(!flee_succeeds(29, 30, 0.5));
        assert!(flee_succeeds(29, 30, 0.49));
        assert!(player_moves_first(50, 30));
        assert!(player_moves_first(30, 30));
        assert!(!player_moves_first(29, 30));
    }

    #[test]
    fn accuracy_roll_is_inclusive() {
        assert!(accuracy_hits(90.0, 90));
        assert!(!accuracy_hits(90.5, 90));
        assert!(accuracy_hits(99.99, 100));
    }

    #[test]
    fn random_factor_spans_spread() {
        assert_relative_eq!(random_factor(0.0), 0.85);
        assert_relative_eq!(random_factor(1.0), 1.0);
    }
}
