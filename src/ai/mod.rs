use bracket_random::prelude::RandomNumberGenerator;

use crate::battle::battler::Battler;

/// Picks the opponent's move slot: uniformly among moves with PP left.
/// `None` means the creature has to struggle.
pub fn choose_move(battler: &Battler, rng: &mut RandomNumberGenerator) -> Option<usize> {
    let usable: Vec<usize> = battler
        .moves
        .iter()
        .enumerate()
        .filter(|(_, mv)| mv.pp > 0)
        .map(|(idx, _)| idx)
        .collect();
    if usable.is_empty() {
        return None;
    }
    let pick = rng.range(0, usable.len() as i32) as usize;
    Some(usable[pick])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battler::tests::battler;

    #[test]
    fn skips_moves_without_pp() {
        let mut mon = battler(4, 10);
        for mv in mon.moves.iter_mut().skip(1) {
            mv.pp = 0;
        }
        let mut rng = RandomNumberGenerator::seeded(3);
        for _ in 0..20 {
            assert_eq!(choose_move(&mon, &mut rng), Some(0));
        }
        mon.moves[0].pp = 0;
        assert_eq!(choose_move(&mon, &mut rng), None);
    }
}
