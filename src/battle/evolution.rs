use log::{debug, warn};

use crate::data::{CreatureProvider, species::SpeciesId};

use super::battler::Battler;

/// Evolution is only considered at every tenth level.
pub const EVOLUTION_LEVEL_STEP: u32 = 10;

pub fn evolution_gate_open(level: u32) -> bool {
    level > 0 && level % EVOLUTION_LEVEL_STEP == 0
}

/// Evolves `battler` in place when the gate is open and the provider names a
/// next form whose level requirement is met. Returns `(from, into)` display
/// names. Provider failures leave the creature as it is.
pub fn maybe_evolve<P: CreatureProvider + ?Sized>(
    battler: &mut Battler,
    dex: &P,
) -> Option<(String, String, SpeciesId)> {
    if !evolution_gate_open(battler.level) {
        return None;
    }
    let link = match dex.evolution(battler.species_id) {
        Ok(Some(link)) => link,
        Ok(None) => return None,
        Err(err) => {
            warn!("evolution lookup for {} failed: {err}", battler.name);
            return None;
        }
    };
    if link.min_level.is_some_and(|min| battler.level < min) {
        debug!(
            "{} at level {} not ready for species {}",
            battler.name, battler.level, link.into
        );
        return None;
    }
    let next = match dex.species(link.into) {
        Ok(species) => species,
        Err(err) => {
            warn!("evolution target lookup failed: {err}");
            return None;
        }
    };
    let from = battler.display_name.clone();
    battler.evolve_into(&next);
    Some((from, battler.display_name.clone(), next.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        battle::battler::tests::battler,
        data::{
            BuiltinDex,
            moves::MoveData,
            species::{EvolutionLink, Species},
        },
        error::DataError,
    };

    /// Provider whose evolution lookups always fail.
    struct BrokenEvolutions;

    impl CreatureProvider for BrokenEvolutions {
        fn species(&self, id: SpeciesId) -> Result<Species, DataError> {
            BuiltinDex.species(id)
        }

        fn species_by_name(&self, name: &str) -> Result<Species, DataError> {
            BuiltinDex.species_by_name(name)
        }

        fn move_data(&self, name: &str) -> Result<MoveData, DataError> {
            BuiltinDex.move_data(name)
        }

        fn species_count(&self) -> u32 {
            BuiltinDex.species_count()
        }

        fn evolution(&self, id: SpeciesId) -> Result<Option<EvolutionLink>, DataError> {
            Err(DataError::UnknownSpecies(id.to_string()))
        }
    }

    #[test]
    fn evolves_only_on_gate_levels() {
        let dex = BuiltinDex;
        let mut mon = battler(4, 19);
        assert!(maybe_evolve(&mut mon, &dex).is_none());
        assert_eq!(mon.species_id, 4);

        let mut mon = battler(4, 20);
        let (from, into, id) = maybe_evolve(&mut mon, &dex).expect("evolves");
        assert_eq!(from, "Cindrel");
        assert_eq!(into, "Pyrrox");
        assert_eq!(id, 5);
        assert_eq!(mon.level, 20);
    }

    #[test]
    fn level_requirement_still_applies_at_gate() {
        let dex = BuiltinDex;
        let mut mon = battler(5, 30);
        assert!(maybe_evolve(&mut mon, &dex).is_none());
        assert_eq!(mon.species_id, 5);
    }

    #[test]
    fn provider_failure_means_no_evolution() {
        let mut mon = battler(4, 20);
        let before = mon.clone();
        assert!(maybe_evolve(&mut mon, &BrokenEvolutions).is_none());
        assert_eq!(mon, before);
    }
}
