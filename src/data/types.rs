use serde::{Deserialize, Serialize};

/// Elemental category shared by creatures and moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Normal => "Normal",
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Grass => "Grass",
            Element::Electric => "Electric",
            Element::Ice => "Ice",
            Element::Fighting => "Fighting",
            Element::Poison => "Poison",
            Element::Ground => "Ground",
            Element::Flying => "Flying",
            Element::Psychic => "Psychic",
            Element::Bug => "Bug",
            Element::Rock => "Rock",
            Element::Ghost => "Ghost",
        }
    }
}

/// Multiplier for a single attacking element against a single defending one.
fn single(attack: Element, defend: Element) -> f32 {
    use Element::*;
    match (attack, defend) {
        (Normal, Rock) => 0.5,
        (Normal, Ghost) => 0.0,
        (Fire, Grass | Ice | Bug) => 2.0,
        (Fire, Fire | Water | Rock) => 0.5,
        (Water, Fire | Ground | Rock) => 2.0,
        (Water, Water | Grass) => 0.5,
        (Grass, Water | Ground | Rock) => 2.0,
        (Grass, Fire | Grass | Poison | Flying | Bug) => 0.5,
        (Electric, Water | Flying) => 2.0,
        (Electric, Electric | Grass) => 0.5,
        (Electric, Ground) => 0.0,
        (Ice, Grass | Ground | Flying) => 2.0,
        (Ice, Water | Ice | Fire) => 0.5,
        (Fighting, Normal | Ice | Rock) => 2.0,
        (Fighting, Poison | Flying | Psychic | Bug) => 0.5,
        (Fighting, Ghost) => 0.0,
        (Poison, Grass | Bug) => 2.0,
        (Poison, Poison | Ground | Rock | Ghost) => 0.5,
        (Ground, Fire | Electric | Poison | Rock) => 2.0,
        (Ground, Grass | Bug) => 0.5,
        (Ground, Flying) => 0.0,
        (Flying, Grass | Fighting | Bug) => 2.0,
        (Flying, Electric | Rock) => 0.5,
        (Psychic, Fighting | Poison) => 2.0,
        (Psychic, Psychic) => 0.5,
        (Bug, Grass | Psychic | Poison) => 2.0,
        (Bug, Fire | Fighting | Flying | Ghost) => 0.5,
        (Rock, Fire | Ice | Flying | Bug) => 2.0,
        (Rock, Fighting | Ground) => 0.5,
        (Ghost, Ghost) => 2.0,
        (Ghost, Normal | Psychic) => 0.0,
        _ => 1.0,
    }
}

/// Combined multiplier of `attack` against every type of the defender.
pub fn effectiveness(attack: Element, defender: &[Element]) -> f32 {
    defender
        .iter()
        .fold(1.0, |acc, &defend| acc * single(attack, defend))
}
