use std::collections::HashSet;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;

#[derive(Debug)]
pub enum SceneError {
    IoError(std::io::Error),
    ParseError(serde_yaml::Error),
    DuplicateId(String),
    InvalidObstacle(usize),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {}", e),
            Self::ParseError(e) => write!(f, "YAML parse error: {}", e),
            Self::DuplicateId(id) => write!(f, "Duplicate entity id '{}'", id),
            Self::InvalidObstacle(i) => {
                write!(f, "Obstacle #{} has min > max on some axis", i)
            }
        }
    }
}

// --- Serde types for the scene YAML schema ---

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneFile {
    pub name: String,
    #[serde(default)]
    pub floor_y: f32,
    #[serde(default)]
    pub spawn: SpawnDef,
    #[serde(default)]
    pub bounds: Option<BoundsDef>,
    #[serde(default)]
    pub obstacles: Vec<BoxDef>,
    #[serde(default)]
    pub props: Vec<PropDef>,
    #[serde(default)]
    pub lights: Vec<LightDef>,
    #[serde(default)]
    pub doors: Vec<DoorDef>,
    #[serde(default)]
    pub interactives: Vec<InteractiveDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpawnDef {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_one")]
    pub scale: f32,
}

impl Default for SpawnDef {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scale: 1.0,
        }
    }
}

fn default_one() -> f32 {
    1.0
}

/// World box that clamps the camera's look-at target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoundsDef {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoxDef {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoxDef {
    pub fn to_aabb(&self) -> Aabb {
        Aabb::new(Vec3::from(self.min), Vec3::from(self.max))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropDef {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation_y: f32,
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LightDef {
    pub id: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_white")]
    pub color: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default = "default_range")]
    pub range: f32,
    #[serde(default)]
    pub flicker: Option<FlickerDef>,
}

fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_intensity() -> f32 {
    1.0
}
fn default_range() -> f32 {
    10.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlickerDef {
    #[serde(default = "default_flicker_speed")]
    pub speed: f32,
    #[serde(default = "default_flicker_amount")]
    pub amount: f32,
}

fn default_flicker_speed() -> f32 {
    8.0
}
fn default_flicker_amount() -> f32 {
    0.3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DoorDef {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Hinge yaw when closed, radians.
    #[serde(default)]
    pub closed_angle: f32,
    #[serde(default = "default_open_angle")]
    pub open_angle: f32,
}

fn default_open_angle() -> f32 {
    std::f32::consts::FRAC_PI_2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InteractiveDef {
    pub id: String,
    #[serde(default)]
    pub position: [f32; 3],
    pub label: String,
    /// Set when examining this object records a clue.
    #[serde(default)]
    pub clue: bool,
}

/// Load and parse a scene YAML file.
pub fn load_scene(path: &Path) -> Result<SceneFile, SceneError> {
    let contents = std::fs::read_to_string(path).map_err(SceneError::IoError)?;
    let scene: SceneFile = serde_yaml::from_str(&contents).map_err(SceneError::ParseError)?;
    validate(&scene)?;
    tracing::info!(
        "Scene '{}' parsed: {} obstacles, {} props, {} doors, {} interactives",
        scene.name,
        scene.obstacles.len(),
        scene.props.len(),
        scene.doors.len(),
        scene.interactives.len()
    );
    Ok(scene)
}

fn validate(scene: &SceneFile) -> Result<(), SceneError> {
    let mut seen = HashSet::new();
    let ids = scene
        .props
        .iter()
        .map(|p| p.id.as_str())
        .chain(scene.lights.iter().map(|l| l.id.as_str()))
        .chain(scene.doors.iter().map(|d| d.id.as_str()))
        .chain(scene.interactives.iter().map(|i| i.id.as_str()));
    for id in ids {
        if !seen.insert(id) {
            return Err(SceneError::DuplicateId(id.to_string()));
        }
    }

    for (i, obstacle) in scene.obstacles.iter().enumerate() {
        for axis in 0..3 {
            if obstacle.min[axis] > obstacle.max[axis] {
                return Err(SceneError::InvalidObstacle(i));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE_YAML: &str = r#"
name: "Office"
floor_y: 0.0
spawn:
  position: [0, 0, 40]
bounds:
  min: [-80, 0, -80]
  max: [80, 0, 80]
obstacles:
  - min: [-50, 0, -2]
    max: [50, 40, 0]
  - min: [10, 0, 10]
    max: [18, 5, 14]
props:
  - id: desk
    model: assets/models/desk.glb
    position: [12, 0, 12]
lights:
  - id: desk_lamp
    position: [12, 6, 12]
    color: [1.0, 0.85, 0.6]
    intensity: 4.0
    flicker:
      amount: 0.4
doors:
  - id: office_door
    model: assets/models/door.glb
    position: [0, 0, -1]
interactives:
  - id: crumpled_letter
    position: [13, 0, 11]
    label: "Crumpled letter"
    clue: true
"#;

    #[test]
    fn test_parse_scene() {
        let scene: SceneFile = serde_yaml::from_str(OFFICE_YAML).unwrap();
        assert_eq!(scene.name, "Office");
        assert_eq!(scene.obstacles.len(), 2);
        assert_eq!(scene.spawn.position, [0.0, 0.0, 40.0]);
        assert!(scene.bounds.is_some());
        assert!(scene.interactives[0].clue);
        assert!(validate(&scene).is_ok());
    }

    #[test]
    fn test_defaults_fill_omitted_fields() {
        let scene: SceneFile = serde_yaml::from_str("name: Empty").unwrap();
        assert_eq!(scene.floor_y, 0.0);
        assert_eq!(scene.spawn.scale, 1.0);
        assert!(scene.obstacles.is_empty());
        assert!(scene.bounds.is_none());

        let light: LightDef = serde_yaml::from_str("id: l\nflicker: {}").unwrap();
        assert_eq!(light.intensity, 1.0);
        let flicker = light.flicker.unwrap();
        assert_eq!(flicker.speed, 8.0);
        assert_eq!(flicker.amount, 0.3);

        let door: DoorDef = serde_yaml::from_str("id: d\nmodel: m.glb").unwrap();
        assert_eq!(door.closed_angle, 0.0);
        assert!((door.open_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
name: "Dup"
doors:
  - id: thing
    model: a.glb
interactives:
  - id: thing
    label: "Thing"
"#;
        let scene: SceneFile = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            validate(&scene),
            Err(SceneError::DuplicateId(id)) if id == "thing"
        ));
    }

    #[test]
    fn test_inverted_obstacle_rejected() {
        let yaml = r#"
name: "Bad box"
obstacles:
  - min: [5, 0, 0]
    max: [1, 2, 2]
"#;
        let scene: SceneFile = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            validate(&scene),
            Err(SceneError::InvalidObstacle(0))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_scene(Path::new("/nonexistent/scene.yaml")).unwrap_err();
        assert!(matches!(err, SceneError::IoError(_)));
    }
}
