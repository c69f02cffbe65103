use std::collections::HashMap;

use glam::{Quat, Vec3};
use hecs::World;
use rand::Rng;

use crate::components::*;
use crate::scene::SceneFile;

/// How fast a door chases its target angle, per second.
const DOOR_SWING_RATE: f32 = 3.0;

/// Central scene state: the ECS world plus entity name registry. This is
/// the scene-graph surface an external renderer walks each frame.
pub struct SceneWorld {
    pub world: World,
    /// Maps YAML entity IDs to hecs Entity handles.
    pub entity_registry: HashMap<String, hecs::Entity>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            entity_registry: HashMap::new(),
        }
    }

    pub fn entity(&self, id: &str) -> Option<hecs::Entity> {
        self.entity_registry.get(id).copied()
    }

    /// Spawn props, lights, doors and interactives from a parsed scene.
    pub fn spawn_from_scene(&mut self, scene: &SceneFile) {
        for prop in &scene.props {
            let entity = self.world.spawn((
                EntityId(prop.id.clone()),
                Transform {
                    position: Vec3::from(prop.position),
                    rotation: Quat::from_rotation_y(prop.rotation_y),
                    scale: Vec3::from(prop.scale),
                    ..Default::default()
                },
                PropRenderer {
                    model: prop.model.clone(),
                },
            ));
            self.entity_registry.insert(prop.id.clone(), entity);
        }

        let mut rng = rand::thread_rng();
        for light in &scene.lights {
            let transform = Transform {
                position: Vec3::from(light.position),
                ..Default::default()
            };
            let point_light = PointLight {
                color: Vec3::from(light.color),
                intensity: light.intensity,
                range: light.range,
            };
            let entity = if let Some(flicker) = &light.flicker {
                self.world.spawn((
                    EntityId(light.id.clone()),
                    transform,
                    point_light,
                    Flicker {
                        speed: flicker.speed,
                        amount: flicker.amount,
                        base_intensity: light.intensity,
                        phase: rng.gen_range(0.0..std::f32::consts::TAU),
                    },
                ))
            } else {
                self.world
                    .spawn((EntityId(light.id.clone()), transform, point_light))
            };
            self.entity_registry.insert(light.id.clone(), entity);
        }

        for door in &scene.doors {
            let entity = self.world.spawn((
                EntityId(door.id.clone()),
                Transform {
                    position: Vec3::from(door.position),
                    rotation: Quat::from_rotation_y(door.closed_angle),
                    ..Default::default()
                },
                PropRenderer {
                    model: door.model.clone(),
                },
                Door {
                    closed_angle: door.closed_angle,
                    open_angle: door.open_angle,
                    angle: door.closed_angle,
                    open: false,
                },
            ));
            self.entity_registry.insert(door.id.clone(), entity);
        }

        for interactive in &scene.interactives {
            let position = Vec3::from(interactive.position);
            let entity = self.world.spawn((
                EntityId(interactive.id.clone()),
                Transform {
                    position,
                    ..Default::default()
                },
                Interactive {
                    label: interactive.label.clone(),
                    clue: interactive.clue,
                    highlighted: false,
                },
                Bob {
                    amplitude: 0.5,
                    speed: 2.0,
                    base_y: position.y,
                },
            ));
            self.entity_registry.insert(interactive.id.clone(), entity);
        }

        tracing::info!(
            "Scene '{}' spawned: {} entities",
            scene.name,
            self.world.len()
        );
    }
}

/// Ease every door toward its target angle and write the new yaw into the
/// transform.
pub fn update_doors(world: &mut World, delta: f32) {
    for (_, (door, transform)) in world.query_mut::<(&mut Door, &mut Transform)>() {
        let diff = door.target_angle() - door.angle;
        if diff.abs() < 1e-4 {
            continue;
        }
        door.angle += diff * (DOOR_SWING_RATE * delta).min(1.0);
        transform.rotation = Quat::from_rotation_y(door.angle);
        transform.dirty = true;
    }
}

/// Wobble flickering lights around their base intensity. The sine term
/// keeps the motion continuous; a small random component roughens it.
pub fn update_flicker(world: &mut World, elapsed: f32) {
    let mut rng = rand::thread_rng();
    for (_, (light, flicker)) in world.query_mut::<(&mut PointLight, &Flicker)>() {
        let wave = (elapsed * flicker.speed + flicker.phase).sin() * 0.7;
        let noise = rng.gen_range(-0.3..0.3);
        light.intensity = flicker.base_intensity * (1.0 + flicker.amount * (wave + noise));
    }
}

/// Bob interactive objects vertically around their rest height.
pub fn update_bob(world: &mut World, elapsed: f32) {
    for (_, (bob, transform)) in world.query_mut::<(&Bob, &mut Transform)>() {
        transform.position.y = bob.base_y + (elapsed * bob.speed).sin() * bob.amplitude;
        transform.dirty = true;
    }
}
