use bracket_terminal::prelude::{LIGHT_GREEN, RED, RGB};

pub const CAPTURE_DEVICE_PRICE: u32 = 200;
pub const POTION_PRICE: u32 = 100;
pub const POTION_HEAL: i32 = 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConsumableEffect {
    Capture,
    Heal { amount: i32 },
}

#[derive(Clone, Debug)]
pub struct ConsumableTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub color: RGB,
    pub price: u32,
    pub effect: ConsumableEffect,
}

impl ConsumableTemplate {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        color: RGB,
        price: u32,
        effect: ConsumableEffect,
    ) -> Self {
        Self {
            name,
            description,
            color,
            price,
            effect,
        }
    }
}

/// What the home-base shop keeps on its shelf.
pub fn shop_catalogue() -> Vec<ConsumableTemplate> {
    vec![
        ConsumableTemplate::new(
            "Capture Orb",
            "Thrown at a weakened wild creature to bring it into the party.",
            RGB::named(RED),
            CAPTURE_DEVICE_PRICE,
            ConsumableEffect::Capture,
        ),
        ConsumableTemplate::new(
            "Potion",
            "Restores 20 HP to the creature in front.",
            RGB::named(LIGHT_GREEN),
            POTION_PRICE,
            ConsumableEffect::Heal {
                amount: POTION_HEAL,
            },
        ),
    ]
}
