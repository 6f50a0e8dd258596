use bracket_random::prelude::RandomNumberGenerator;
use log::warn;

use crate::battle::battler::{Battler, Move, MAX_MOVES};

use super::{
    CreatureProvider,
    species::{FALLBACK_SPECIES, Species, SpeciesId},
};

/// Size of the national dex the depth scaling was tuned against.
const REFERENCE_DEX_SIZE: f32 = 151.0;
const MAX_WILD_LEVEL: u32 = 60;
const MIN_WILD_LEVEL: u32 = 2;
pub const STARTER_LEVEL: u32 = 5;

/// Best four level-up moves the species knows at `level`, strongest first.
/// Moves the provider cannot resolve are skipped, so the list may be short.
pub fn choose_moves<P: CreatureProvider + ?Sized>(
    dex: &P,
    species: &Species,
    level: u32,
) -> Vec<Move> {
    let mut known: Vec<Move> = species
        .learnset
        .iter()
        .filter(|(_, learned_at)| *learned_at <= level)
        .filter_map(|(name, _)| match dex.move_data(name) {
            Ok(data) => Some(Move::from(&data)),
            Err(err) => {
                warn!("dropping move for {}: {err}", species.name);
                None
            }
        })
        .collect();
    known.sort_by(|a, b| b.power.cmp(&a.power));
    known.truncate(MAX_MOVES);
    known
}

/// Builds a battler, falling back to the default species when the lookup
/// fails.
pub fn build_battler<P: CreatureProvider + ?Sized>(
    dex: &P,
    id: SpeciesId,
    level: u32,
) -> Option<Battler> {
    let species = match dex.species(id) {
        Ok(species) => species,
        Err(err) => {
            warn!("encounter lookup failed ({err}); using fallback species");
            dex.species(FALLBACK_SPECIES).ok()?
        }
    };
    let moves = choose_moves(dex, &species, level);
    Some(Battler::from_species(&species, level, moves))
}

/// Species pool widens and levels climb with depth.
pub fn random_encounter<P: CreatureProvider + ?Sized>(
    dex: &P,
    floor: u32,
    rng: &mut RandomNumberGenerator,
) -> Option<Battler> {
    let count = dex.species_count().max(1);
    let depth = floor as f32;
    let raw = 30.0 + depth * 2.0 + rng.rand::<f32>() * depth * 2.0;
    let pool = ((raw * count as f32 / REFERENCE_DEX_SIZE).floor() as u32).clamp(1, count);
    let id = 1 + rng.range(0, pool as i32) as u32;
    let level = (2.0 + (depth * 0.8).floor() + rng.range(0, 3) as f32) as u32;
    build_battler(dex, id, level.clamp(MIN_WILD_LEVEL, MAX_WILD_LEVEL))
}

/// A trainer fields one extra creature every five floors, up to four,
/// drawn one floor shallower than the current depth.
pub fn trainer_party<P: CreatureProvider + ?Sized>(
    dex: &P,
    floor: u32,
    rng: &mut RandomNumberGenerator,
) -> Vec<Battler> {
    let size = 1 + (floor / 5).min(3);
    let depth = floor.saturating_sub(1).max(1);
    (0..size)
        .filter_map(|_| random_encounter(dex, depth, rng))
        .collect()
}

pub fn starter<P: CreatureProvider + ?Sized>(dex: &P, id: SpeciesId) -> Option<Battler> {
    build_battler(dex, id, STARTER_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BuiltinDex;

    #[test]
    fn moves_are_capped_and_sorted_by_power() {
        let dex = BuiltinDex;
        let species = dex.species(2).expect("bramblix");
        let moves = choose_moves(&dex, &species, 50);
        assert_eq!(moves.len(), MAX_MOVES);
        assert!(moves.windows(2).all(|w| w[0].power >= w[1].power));
    }

    #[test]
    fn moves_respect_learn_level() {
        let dex = BuiltinDex;
        let species = dex.species(4).expect("cindrel");
        let names: Vec<String> = choose_moves(&dex, &species, 5)
            .into_iter()
            .map(|mv| mv.name)
            .collect();
        assert_eq!(names, vec!["scratch".to_string()]);
    }

    #[test]
    fn unknown_species_falls_back() {
        let dex = BuiltinDex;
        let mon = build_battler(&dex, 4_000, 5).expect("fallback");
        assert_eq!(mon.species_id, FALLBACK_SPECIES);
    }

    #[test]
    fn encounters_stay_in_level_band() {
        let dex = BuiltinDex;
        let mut rng = RandomNumberGenerator::seeded(11);
        for floor in [1, 5, 20, 90] {
            for _ in 0..25 {
                let mon = random_encounter(&dex, floor, &mut rng).expect("encounter");
                assert!((MIN_WILD_LEVEL..=MAX_WILD_LEVEL).contains(&mon.level));
                assert!(mon.species_id >= 1 && mon.species_id <= dex.species_count());
            }
        }
    }

    #[test]
    fn trainer_party_grows_every_five_floors() {
        let dex = BuiltinDex;
        let mut rng = RandomNumberGenerator::seeded(5);
        assert_eq!(trainer_party(&dex, 1, &mut rng).len(), 1);
        assert_eq!(trainer_party(&dex, 10, &mut rng).len(), 3);
        assert_eq!(trainer_party(&dex, 40, &mut rng).len(), 4);
    }
}
