pub mod encounters;
pub mod items;
pub mod moves;
pub mod species;
pub mod types;

use std::{cell::RefCell, collections::HashMap};

use bracket_random::prelude::RandomNumberGenerator;

use crate::{battle::battler::{Battler, Move}, error::DataError};

use self::{
    moves::MoveData,
    species::{EvolutionLink, Species, SpeciesId},
    types::Element,
};

/// Source of species and move records.
///
/// The game core only consumes this shape; where the records come from (a
/// static table, a cache, a remote dex) is the implementation's business.
pub trait CreatureProvider {
    fn species(&self, id: SpeciesId) -> Result<Species, DataError>;

    fn species_by_name(&self, name: &str) -> Result<Species, DataError>;

    fn move_data(&self, name: &str) -> Result<MoveData, DataError>;

    /// Highest species id an encounter may roll.
    fn species_count(&self) -> u32;

    /// Next form in the species' evolution line, if any.
    fn evolution(&self, id: SpeciesId) -> Result<Option<EvolutionLink>, DataError> {
        Ok(self.species(id)?.evolves_to)
    }

    fn effectiveness(&self, attack: Element, defender: &[Element]) -> f32 {
        types::effectiveness(attack, defender)
    }

    fn choose_moves(&self, species: &Species, level: u32) -> Vec<Move> {
        encounters::choose_moves(self, species, level)
    }

    fn random_encounter(&self, floor: u32, rng: &mut RandomNumberGenerator) -> Option<Battler> {
        encounters::random_encounter(self, floor, rng)
    }

    fn trainer_party(&self, floor: u32, rng: &mut RandomNumberGenerator) -> Vec<Battler> {
        encounters::trainer_party(self, floor, rng)
    }
}

/// Provider backed by the compiled-in species and move tables.
#[derive(Clone, Debug, Default)]
pub struct BuiltinDex;

impl CreatureProvider for BuiltinDex {
    fn species(&self, id: SpeciesId) -> Result<Species, DataError> {
        species::find(id)
            .cloned()
            .ok_or_else(|| DataError::UnknownSpecies(id.to_string()))
    }

    fn species_by_name(&self, name: &str) -> Result<Species, DataError> {
        species::find_by_name(name)
            .cloned()
            .ok_or_else(|| DataError::UnknownSpecies(name.to_string()))
    }

    fn move_data(&self, name: &str) -> Result<MoveData, DataError> {
        moves::find(name)
            .cloned()
            .ok_or_else(|| DataError::UnknownMove(name.to_string()))
    }

    fn species_count(&self) -> u32 {
        species::SPECIES.len() as u32
    }
}

/// Memoizes species lookups of an inner provider. Failed lookups are not
/// cached so a flaky source gets another chance next time.
#[derive(Debug, Default)]
pub struct CachedProvider<P> {
    inner: P,
    species: RefCell<HashMap<SpeciesId, Species>>,
}

impl<P: CreatureProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            species: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.species.borrow().len()
    }
}

impl<P: CreatureProvider> CreatureProvider for CachedProvider<P> {
    fn species(&self, id: SpeciesId) -> Result<Species, DataError> {
        if let Some(hit) = self.species.borrow().get(&id) {
            return Ok(hit.clone());
        }
        let fetched = self.inner.species(id)?;
        self.species.borrow_mut().insert(id, fetched.clone());
        Ok(fetched)
    }

    fn species_by_name(&self, name: &str) -> Result<Species, DataError> {
        let fetched = self.inner.species_by_name(name)?;
        self.species
            .borrow_mut()
            .entry(fetched.id)
            .or_insert_with(|| fetched.clone());
        Ok(fetched)
    }

    fn move_data(&self, name: &str) -> Result<MoveData, DataError> {
        self.inner.move_data(name)
    }

    fn species_count(&self) -> u32 {
        self.inner.species_count()
    }
}
