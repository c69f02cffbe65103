use glam::Vec3;

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Boxes that merely touch still count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Result of a collision probe: whether anything was hit, and the summed
/// horizontal push-out direction. The push is an unnormalized sum so that
/// overlapping obstacles reinforce each other; it can be zero-length even
/// when `collides` is true (probe center on an obstacle center).
#[derive(Debug, Clone, Copy)]
pub struct CollisionQuery {
    pub collides: bool,
    pub push: Vec3,
}

impl CollisionQuery {
    pub const CLEAR: CollisionQuery = CollisionQuery {
        collides: false,
        push: Vec3::ZERO,
    };
}

/// Static obstacle set for a loaded scene. Obstacles never move, so the
/// field is immutable after construction and queries are pure. Obstacle
/// counts stay in the low hundreds, so a linear scan is enough.
#[derive(Debug, Default)]
pub struct CollisionField {
    obstacles: Vec<Aabb>,
    floor_y: f32,
}

impl CollisionField {
    pub fn new(obstacles: Vec<Aabb>, floor_y: f32) -> Self {
        Self { obstacles, floor_y }
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn floor_y(&self) -> f32 {
        self.floor_y
    }

    /// Probe a vertical box at the candidate horizontal position: half-width
    /// `radius` in X/Z, spanning `[floor_y, floor_y + height]` vertically.
    pub fn query(&self, candidate_x: f32, candidate_z: f32, radius: f32, height: f32) -> CollisionQuery {
        let probe = Aabb::new(
            Vec3::new(candidate_x - radius, self.floor_y, candidate_z - radius),
            Vec3::new(candidate_x + radius, self.floor_y + height, candidate_z + radius),
        );
        let probe_center = Vec3::new(candidate_x, self.floor_y, candidate_z);

        let mut result = CollisionQuery::CLEAR;
        for obstacle in &self.obstacles {
            if !probe.intersects(obstacle) {
                continue;
            }
            result.collides = true;

            let mut push_dir = probe_center - obstacle.center();
            push_dir.y = 0.0;
            // Coincident centers give no usable direction; still a hit.
            if push_dir.length_squared() > 0.0 {
                result.push += push_dir.normalize();
            }
        }
        result
    }

    /// Convenience wrapper when only the hit/no-hit answer matters.
    pub fn hits(&self, candidate_x: f32, candidate_z: f32, radius: f32, height: f32) -> bool {
        self.query(candidate_x, candidate_z, radius, height).collides
    }
}
