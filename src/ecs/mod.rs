pub mod components;
pub mod resources;
pub mod systems;

use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    map::entities::{EntityKind, FloorEntity, NpcRole},
    render::SpriteInstance,
};

use self::{
    components::{Animation, Feature, Position, Renderable},
    resources::{Interaction, InteractionLog, PlayerContext},
    systems::{AnimationSystem, ProximitySystem, to_rgb},
};

/// Billboard sizes relative to a full wall slice.
fn scale_for(kind: &EntityKind) -> f32 {
    match kind {
        EntityKind::Decor { .. } => 0.6,
        EntityKind::Trap { .. } => 0.35,
        EntityKind::Chest { .. } => 0.5,
        EntityKind::Ladder => 0.9,
        EntityKind::Obstacle { .. } => 1.0,
        EntityKind::Npc { .. } => 0.8,
    }
}

/// The entities standing on the current floor and the systems that react to
/// the player walking among them.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
}

impl EcsWorld {
    pub fn new() -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(PlayerContext::default());
        specs_world.insert(InteractionLog::default());
        let dispatcher = DispatcherBuilder::new()
            .with(ProximitySystem, "proximity", &[])
            .with(AnimationSystem, "animation", &["proximity"])
            .build();

        Self {
            specs_world,
            dispatcher,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Feature>();
        world.register::<Animation>();
    }

    /// Replaces every entity with the ones of a freshly entered floor.
    pub fn populate(&mut self, floor_entities: &[FloorEntity]) {
        self.specs_world.delete_all();
        self.specs_world.maintain();
        for entity in floor_entities {
            self.specs_world
                .create_entity()
                .with(Position {
                    x: entity.x,
                    y: entity.y,
                })
                .with(Renderable {
                    color: to_rgb(entity.kind.color()),
                    scale: scale_for(&entity.kind),
                })
                .with(Feature {
                    kind: entity.kind.clone(),
                })
                .build();
        }
        self.specs_world.write_resource::<InteractionLog>().entries.clear();
    }

    pub fn advance(&mut self, context: PlayerContext) {
        self.specs_world.insert(context);
        self.dispatcher.dispatch(&mut self.specs_world);
        self.specs_world.maintain();
    }

    pub fn drain_interactions(&mut self) -> Vec<Interaction> {
        let mut log = self.specs_world.write_resource::<InteractionLog>();
        std::mem::take(&mut log.entries)
    }

    /// Every visible billboard, in no particular order.
    pub fn sprites(&self) -> Vec<SpriteInstance> {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let features = self.specs_world.read_component::<Feature>();
        let animations = self.specs_world.read_component::<Animation>();
        let entities = self.specs_world.entities();
        (&entities, &positions, &renderables, &features)
            .join()
            .filter_map(|(entity, pos, renderable, feature)| {
                let sprite = feature.kind.sprite()?;
                Some(SpriteInstance {
                    x: pos.x,
                    y: pos.y,
                    sprite,
                    color: renderable.color,
                    scale: renderable.scale,
                    flashing: animations.contains(entity),
                })
            })
            .collect()
    }

    /// The closest NPC within `radius` of the point.
    pub fn npc_near(&self, x: f32, y: f32, radius: f32) -> Option<NpcRole> {
        let positions = self.specs_world.read_component::<Position>();
        let features = self.specs_world.read_component::<Feature>();
        (&positions, &features)
            .join()
            .filter_map(|(pos, feature)| match feature.kind {
                EntityKind::Npc { role } => Some((pos.distance_to(x, y), role)),
                _ => None,
            })
            .filter(|(distance, _)| *distance <= radius)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, role)| role)
    }

    pub fn features(&self) -> Vec<FloorEntity> {
        let positions = self.specs_world.read_component::<Position>();
        let features = self.specs_world.read_component::<Feature>();
        (&positions, &features)
            .join()
            .map(|(pos, feature)| FloorEntity {
                x: pos.x,
                y: pos.y,
                kind: feature.kind.clone(),
            })
            .collect()
    }
}

impl Default for EcsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::types::Element,
        map::entities::{Loot, ObstacleKind, TRAP_DAMAGE},
    };
    use bracket_geometry::prelude::Point;

    fn context(x: f32, y: f32, previous: (f32, f32), party_types: Vec<Element>) -> PlayerContext {
        PlayerContext {
            x,
            y,
            previous,
            dt: 0.1,
            party_types,
        }
    }

    fn vines(cell: Point) -> FloorEntity {
        FloorEntity::at_cell(
            cell,
            EntityKind::Obstacle {
                kind: ObstacleKind::Vines,
                requires: Element::Fire,
                cleared: false,
            },
        )
    }

    #[test]
    fn trap_springs_once_and_becomes_visible() {
        let mut world = EcsWorld::new();
        world.populate(&[FloorEntity::at_cell(
            Point::new(2, 2),
            EntityKind::Trap {
                damage: TRAP_DAMAGE,
                triggered: false,
            },
        )]);
        assert!(world.sprites().is_empty());

        world.advance(context(2.5, 2.4, (2.5, 1.5), vec![]));
        assert_eq!(
            world.drain_interactions(),
            vec![Interaction::TrapSprung {
                damage: TRAP_DAMAGE
            }]
        );
        let sprites = world.sprites();
        assert_eq!(sprites.len(), 1);
        assert!(sprites[0].flashing);

        world.advance(context(2.5, 2.5, (2.5, 2.4), vec![]));
        assert!(world.drain_interactions().is_empty());
    }

    #[test]
    fn chest_pays_out_once() {
        let mut world = EcsWorld::new();
        let loot = Loot::for_tier(1);
        world.populate(&[FloorEntity::at_cell(
            Point::new(4, 4),
            EntityKind::Chest {
                tier: 1,
                loot,
                opened: false,
            },
        )]);
        world.advance(context(3.0, 4.5, (2.5, 4.5), vec![]));
        assert!(world.drain_interactions().is_empty());
        world.advance(context(4.3, 4.5, (3.0, 4.5), vec![]));
        assert_eq!(
            world.drain_interactions(),
            vec![Interaction::ChestOpened { loot }]
        );
        world.advance(context(4.5, 4.5, (4.3, 4.5), vec![]));
        assert!(world.drain_interactions().is_empty());
    }

    #[test]
    fn obstacle_needs_the_matching_element() {
        let mut world = EcsWorld::new();
        world.populate(&[vines(Point::new(5, 3))]);

        world.advance(context(4.5, 3.5, (3.5, 3.5), vec![Element::Water]));
        assert_eq!(
            world.drain_interactions(),
            vec![Interaction::ObstacleBlocked {
                kind: ObstacleKind::Vines,
                requires: Element::Fire,
            }]
        );
        // Still pressed against it: no repeated warning.
        world.advance(context(4.6, 3.5, (4.5, 3.5), vec![Element::Water]));
        assert!(world.drain_interactions().is_empty());

        world.advance(context(4.6, 3.5, (4.6, 3.5), vec![Element::Fire]));
        assert_eq!(
            world.drain_interactions(),
            vec![Interaction::ObstacleCleared {
                kind: ObstacleKind::Vines,
                by: Element::Fire,
                cell: (5, 3),
            }]
        );
        assert!(world.sprites().is_empty());
    }

    #[test]
    fn flash_expires() {
        let mut world = EcsWorld::new();
        world.populate(&[FloorEntity::at_cell(
            Point::new(1, 1),
            EntityKind::Trap {
                damage: TRAP_DAMAGE,
                triggered: false,
            },
        )]);
        world.advance(context(1.5, 1.5, (1.5, 1.5), vec![]));
        for _ in 0..10 {
            world.advance(context(8.0, 8.0, (8.0, 8.0), vec![]));
        }
        let sprites = world.sprites();
        assert_eq!(sprites.len(), 1);
        assert!(!sprites[0].flashing);
    }

    #[test]
    fn populate_replaces_previous_floor() {
        let mut world = EcsWorld::new();
        world.populate(&[
            FloorEntity::at_cell(Point::new(1, 1), EntityKind::Ladder),
            vines(Point::new(3, 3)),
        ]);
        assert_eq!(world.features().len(), 2);
        world.populate(&[FloorEntity::at_cell(
            Point::new(2, 2),
            EntityKind::Npc {
                role: NpcRole::Guide,
            },
        )]);
        assert_eq!(world.features().len(), 1);
        assert_eq!(world.npc_near(2.5, 3.4, 1.5), Some(NpcRole::Guide));
        assert_eq!(world.npc_near(6.0, 6.0, 1.5), None);
    }
}
