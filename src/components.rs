use glam::{Mat4, Quat, Vec3};

/// Transform component. Present on every entity.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub world_matrix: Mat4,
    pub dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            world_matrix: Mat4::IDENTITY,
            dirty: true,
        }
    }
}

/// Identifies this entity as a model to draw. The renderer resolves the
/// path against its own asset cache.
#[derive(Debug, Clone)]
pub struct PropRenderer {
    pub model: String,
}

/// Point light component.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
}

/// Makes a point light flicker around its base intensity.
#[derive(Debug, Clone)]
pub struct Flicker {
    pub speed: f32,
    pub amount: f32,
    pub base_intensity: f32,
    /// Per-light phase so lights do not flicker in lockstep.
    pub phase: f32,
}

/// A hinged door that swings between two yaw angles.
#[derive(Debug, Clone)]
pub struct Door {
    pub closed_angle: f32,
    pub open_angle: f32,
    pub angle: f32,
    pub open: bool,
}

impl Door {
    pub fn target_angle(&self) -> f32 {
        if self.open {
            self.open_angle
        } else {
            self.closed_angle
        }
    }
}

/// An object the player can examine when close enough.
#[derive(Debug, Clone)]
pub struct Interactive {
    pub label: String,
    pub clue: bool,
    pub highlighted: bool,
}

/// Gentle vertical bob, used to draw the eye to clue objects.
#[derive(Debug, Clone)]
pub struct Bob {
    pub amplitude: f32,
    pub speed: f32,
    pub base_y: f32,
}

/// Tag component storing the entity's YAML id string.
#[derive(Debug, Clone)]
pub struct EntityId(pub String);
