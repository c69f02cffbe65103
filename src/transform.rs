use glam::Mat4;
use hecs::World;

use crate::components::Transform;

/// Compute world matrices for all entities with Transform components.
/// The scene graph is flat, so one pass is enough.
pub fn update_transforms(world: &mut World) {
    for (_, transform) in world.query_mut::<&mut Transform>() {
        if !transform.dirty {
            continue;
        }
        transform.world_matrix = Mat4::from_scale_rotation_translation(
            transform.scale,
            transform.rotation,
            transform.position,
        );
        transform.dirty = false;
    }
}
