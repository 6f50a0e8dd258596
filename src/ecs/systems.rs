use bracket_terminal::prelude::RGB;
use specs::prelude::*;

use crate::map::entities::EntityKind;

use super::{
    components::{Animation, Feature, Position, Renderable},
    resources::{Interaction, InteractionLog, PlayerContext},
};

/// How close the player has to walk to spring a trap or open a chest.
pub const TRIGGER_RADIUS: f32 = 0.6;
/// Obstacles fill a wall cell, so they react from the neighbouring cell.
pub const OBSTACLE_RADIUS: f32 = 1.3;
pub const FLASH_SECONDS: f32 = 0.8;

pub fn to_rgb((r, g, b): (u8, u8, u8)) -> RGB {
    RGB::from_u8(r, g, b)
}

/// Fires the trigger points of features the player is standing on or next
/// to.
#[derive(Default)]
pub struct ProximitySystem;

impl<'a> System<'a> for ProximitySystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, Position>,
        WriteStorage<'a, Feature>,
        WriteStorage<'a, Renderable>,
        WriteStorage<'a, Animation>,
        ReadExpect<'a, PlayerContext>,
        WriteExpect<'a, InteractionLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            positions,
            mut features,
            mut renderables,
            mut animations,
            player,
            mut log,
        ): Self::SystemData,
    ) {
        let mut flashes = Vec::new();
        for (entity, pos, feature) in (&entities, &positions, &mut features).join() {
            let distance = player.distance_to(pos.x, pos.y);
            match &mut feature.kind {
                EntityKind::Trap { damage, triggered }
                    if !*triggered && distance <= TRIGGER_RADIUS =>
                {
                    *triggered = true;
                    log.push(Interaction::TrapSprung { damage: *damage });
                    flashes.push(entity);
                }
                EntityKind::Chest { loot, opened, .. }
                    if !*opened && distance <= TRIGGER_RADIUS =>
                {
                    *opened = true;
                    log.push(Interaction::ChestOpened { loot: *loot });
                    flashes.push(entity);
                }
                EntityKind::Obstacle {
                    kind,
                    requires,
                    cleared,
                } if !*cleared && distance <= OBSTACLE_RADIUS => {
                    if player.party_types.contains(requires) {
                        *cleared = true;
                        log.push(Interaction::ObstacleCleared {
                            kind: *kind,
                            by: *requires,
                            cell: (pos.x.floor() as i32, pos.y.floor() as i32),
                        });
                        flashes.push(entity);
                    } else if player.previous_distance_to(pos.x, pos.y) > OBSTACLE_RADIUS {
                        log.push(Interaction::ObstacleBlocked {
                            kind: *kind,
                            requires: *requires,
                        });
                    }
                }
                _ => {}
            }
        }

        for entity in flashes {
            if let (Some(feature), Some(renderable)) =
                (features.get(entity), renderables.get_mut(entity))
            {
                renderable.color = to_rgb(feature.kind.color());
            }
            let _ = animations.insert(
                entity,
                Animation {
                    remaining: FLASH_SECONDS,
                },
            );
        }
    }
}

#[derive(Default)]
pub struct AnimationSystem;

impl<'a> System<'a> for AnimationSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Animation>,
        ReadExpect<'a, PlayerContext>,
    );

    fn run(&mut self, (entities, mut animations, player): Self::SystemData) {
        let mut finished = Vec::new();
        for (entity, animation) in (&entities, &mut animations).join() {
            animation.remaining -= player.dt;
            if animation.remaining <= 0.0 {
                finished.push(entity);
            }
        }
        for entity in finished {
            animations.remove(entity);
        }
    }
}
