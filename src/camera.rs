use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;

/// Camera tuning. The damping factors are per-frame lerp constants tuned
/// for a ~60 Hz update cadence, applied as-is regardless of delta time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default = "default_distance")]
    pub distance: f32,
    #[serde(default = "default_frustum_desktop")]
    pub frustum_desktop: f32,
    #[serde(default = "default_frustum_mobile_landscape")]
    pub frustum_mobile_landscape: f32,
    #[serde(default = "default_frustum_mobile_portrait")]
    pub frustum_mobile_portrait: f32,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
    #[serde(default = "default_min_pitch")]
    pub min_pitch: f32,
    #[serde(default = "default_max_pitch")]
    pub max_pitch: f32,
    #[serde(default = "default_pitch_step")]
    pub pitch_step: f32,
    #[serde(default = "default_follow_smoothness")]
    pub follow_smoothness: f32,
    #[serde(default = "default_zoom_smoothness")]
    pub zoom_smoothness: f32,
    #[serde(default = "default_rotation_smoothness")]
    pub rotation_smoothness: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_narrow_width")]
    pub narrow_width: f32,
}

fn default_distance() -> f32 {
    30.0
}
fn default_frustum_desktop() -> f32 {
    150.0
}
fn default_frustum_mobile_landscape() -> f32 {
    200.0
}
fn default_frustum_mobile_portrait() -> f32 {
    300.0
}
fn default_min_zoom() -> f32 {
    0.3
}
fn default_max_zoom() -> f32 {
    3.0
}
fn default_min_pitch() -> f32 {
    0.1
}
fn default_max_pitch() -> f32 {
    std::f32::consts::PI / 2.5
}
fn default_pitch_step() -> f32 {
    0.15
}
fn default_follow_smoothness() -> f32 {
    0.08
}
fn default_zoom_smoothness() -> f32 {
    0.1
}
fn default_rotation_smoothness() -> f32 {
    0.08
}
fn default_near() -> f32 {
    -500.0
}
fn default_far() -> f32 {
    2000.0
}
fn default_narrow_width() -> f32 {
    768.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: default_distance(),
            frustum_desktop: default_frustum_desktop(),
            frustum_mobile_landscape: default_frustum_mobile_landscape(),
            frustum_mobile_portrait: default_frustum_mobile_portrait(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            min_pitch: default_min_pitch(),
            max_pitch: default_max_pitch(),
            pitch_step: default_pitch_step(),
            follow_smoothness: default_follow_smoothness(),
            zoom_smoothness: default_zoom_smoothness(),
            rotation_smoothness: default_rotation_smoothness(),
            near: default_near(),
            far: default_far(),
            narrow_width: default_narrow_width(),
        }
    }
}

/// The classic isometric pitch: atan(1/sqrt(2)), about 35.26 degrees.
pub fn isometric_pitch() -> f32 {
    (1.0 / 2.0_f32.sqrt()).atan()
}

const ROTATION_STEP: f32 = std::f32::consts::PI / 4.0;
const ROTATION_STEPS: i32 = 8;

/// Orthographic isometric camera: damped follow, discrete 45-degree
/// rotation with a continuous drag override, clamped pitch and zoom, and
/// screen-to-ground-plane projection for click-to-move.
///
/// On touch-capable or narrow viewports the zoom range collapses to 1 and
/// the frustum switches between two orientation presets. That device class
/// is fixed at construction.
pub struct IsoCamera {
    pub config: CameraConfig,
    is_mobile: bool,
    frustum_size: f32,
    min_zoom: f32,
    max_zoom: f32,
    width: f32,
    height: f32,

    target: Vec3,
    current_target: Vec3,
    zoom: f32,
    target_zoom: f32,
    rotation_index: i32,
    current_rotation: f32,
    target_rotation: f32,
    pitch: f32,
    target_pitch: f32,
    distance: f32,

    follow_smoothness: f32,
    zoom_smoothness: f32,
    rotation_smoothness: f32,

    bounds: Option<Aabb>,

    shake_intensity: f32,
    shake_duration: f32,
    shake_time: f32,

    eye: Vec3,
}

impl IsoCamera {
    pub fn new(config: CameraConfig, width: f32, height: f32, touch_capable: bool) -> Self {
        let is_mobile = touch_capable || width < config.narrow_width;

        let (frustum_size, min_zoom, max_zoom) = if is_mobile {
            let frustum = if width > height {
                config.frustum_mobile_landscape
            } else {
                config.frustum_mobile_portrait
            };
            (frustum, 1.0, 1.0)
        } else {
            (config.frustum_desktop, config.min_zoom, config.max_zoom)
        };

        let pitch = isometric_pitch();
        let mut camera = Self {
            distance: config.distance,
            follow_smoothness: config.follow_smoothness,
            zoom_smoothness: config.zoom_smoothness,
            rotation_smoothness: config.rotation_smoothness,
            config,
            is_mobile,
            frustum_size,
            min_zoom,
            max_zoom,
            width,
            height,
            target: Vec3::ZERO,
            current_target: Vec3::ZERO,
            zoom: 1.0,
            target_zoom: 1.0,
            rotation_index: 0,
            current_rotation: 0.0,
            target_rotation: 0.0,
            pitch,
            target_pitch: pitch,
            bounds: None,
            shake_intensity: 0.0,
            shake_duration: 0.0,
            shake_time: 0.0,
            eye: Vec3::ZERO,
        };
        camera.update_eye();
        tracing::info!(
            "Isometric camera initialized (mobile: {}, frustum: {:.1})",
            camera.is_mobile,
            camera.frustum_size
        );
        camera
    }

    pub fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn rotation_index(&self) -> i32 {
        self.rotation_index
    }

    pub fn target_rotation(&self) -> f32 {
        self.target_rotation
    }

    /// Current yaw, for remapping input into camera space.
    pub fn get_rotation_angle(&self) -> f32 {
        self.current_rotation
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn target_pitch(&self) -> f32 {
        self.target_pitch
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn current_target(&self) -> Vec3 {
        self.current_target
    }

    /// Immediate relocation: desired and damped target coincide and the eye
    /// is recomputed synchronously, so the first rendered frame is already
    /// framed correctly. Used on scene entry.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.current_target = target;
        self.update_eye();
    }

    /// Damped follow: sets the desired target only; the eye eases toward it
    /// on each `update`. This is the steady-state per-frame call.
    pub fn follow_target(&mut self, target: Vec3, smoothness: Option<f32>) {
        if let Some(s) = smoothness {
            self.follow_smoothness = s;
        }
        self.target = target;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.target_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn add_zoom(&mut self, delta: f32) {
        self.set_zoom(self.target_zoom + delta);
    }

    /// Step the discrete rotation counter-clockwise by 45 degrees.
    pub fn rotate_left(&mut self) {
        self.rotation_index = (self.rotation_index + 1) % ROTATION_STEPS;
        self.target_rotation = self.rotation_index as f32 * ROTATION_STEP;
        tracing::debug!("Camera rotation: {}°", self.rotation_index * 45);
    }

    pub fn rotate_right(&mut self) {
        self.rotation_index = (self.rotation_index + ROTATION_STEPS - 1) % ROTATION_STEPS;
        self.target_rotation = self.rotation_index as f32 * ROTATION_STEP;
        tracing::debug!("Camera rotation: {}°", self.rotation_index * 45);
    }

    /// Continuous drag rotation. Half the delta is applied to the current
    /// angle immediately for responsiveness; the nearest discrete index is
    /// re-derived so a later `rotate_left`/`rotate_right` stays consistent.
    pub fn rotate(&mut self, delta: f32) {
        self.target_rotation = wrap_angle(self.target_rotation + delta);
        self.current_rotation = wrap_angle(self.current_rotation + delta * 0.5);
        self.rotation_index =
            (self.target_rotation / ROTATION_STEP).round() as i32 % ROTATION_STEPS;
    }

    /// Tilt toward top-down by one step.
    pub fn pitch_up(&mut self) {
        self.target_pitch = (self.target_pitch - self.config.pitch_step).max(self.config.min_pitch);
    }

    /// Tilt toward side-on by one step.
    pub fn pitch_down(&mut self) {
        self.target_pitch = (self.target_pitch + self.config.pitch_step).min(self.config.max_pitch);
    }

    /// Continuous drag tilt.
    pub fn adjust_pitch(&mut self, delta: f32) {
        self.target_pitch =
            (self.target_pitch + delta).clamp(self.config.min_pitch, self.config.max_pitch);
    }

    pub fn shake(&mut self, intensity: f32, duration: f32) {
        self.shake_intensity = intensity;
        self.shake_duration = duration;
        self.shake_time = duration;
    }

    /// Clamp the damped look-at target to a world box.
    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) {
        self.bounds = Some(Aabb::new(min, max));
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    pub fn set_smoothness(&mut self, follow: f32, zoom: f32, rotation: f32) {
        self.follow_smoothness = follow;
        self.zoom_smoothness = zoom;
        self.rotation_smoothness = rotation;
    }

    pub fn update(&mut self, delta: f32) {
        self.current_target = self.current_target.lerp(self.target, self.follow_smoothness);
        if let Some(bounds) = self.bounds {
            self.current_target = self.current_target.clamp(bounds.min, bounds.max);
        }

        self.zoom += (self.target_zoom - self.zoom) * self.zoom_smoothness;

        // Rotation eases along the shortest arc across the 0/2pi seam.
        let mut rotation_diff = self.target_rotation - self.current_rotation;
        if rotation_diff > std::f32::consts::PI {
            rotation_diff -= std::f32::consts::TAU;
        }
        if rotation_diff < -std::f32::consts::PI {
            rotation_diff += std::f32::consts::TAU;
        }
        self.current_rotation = wrap_angle(self.current_rotation + rotation_diff * self.rotation_smoothness);

        self.pitch += (self.target_pitch - self.pitch) * self.rotation_smoothness;

        if self.shake_time > 0.0 {
            self.shake_time -= delta;
        }

        self.update_eye();
    }

    fn update_eye(&mut self) {
        let offset = Vec3::new(
            self.distance * self.pitch.cos() * self.current_rotation.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.current_rotation.cos(),
        );

        let mut jitter = Vec3::ZERO;
        if self.shake_time > 0.0 && self.shake_duration > 0.0 {
            let falloff = self.shake_time / self.shake_duration;
            let intensity = self.shake_intensity * falloff;
            let mut rng = rand::thread_rng();
            jitter = Vec3::new(
                rng.gen_range(-0.5..0.5) * intensity,
                rng.gen_range(-0.5..0.5) * intensity * 0.5,
                rng.gen_range(-0.5..0.5) * intensity,
            );
        }

        self.eye = self.current_target + offset + jitter;
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;

        if self.is_mobile {
            self.frustum_size = if width > height {
                self.config.frustum_mobile_landscape
            } else {
                self.config.frustum_mobile_portrait
            };
        }
        tracing::debug!(
            "Camera resized: {}x{}, frustum: {}",
            width,
            height,
            self.frustum_size
        );
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.current_target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.width / self.height;
        let size = self.frustum_size / self.zoom;
        Mat4::orthographic_rh(
            -size * aspect / 2.0,
            size * aspect / 2.0,
            -size / 2.0,
            size / 2.0,
            self.config.near,
            self.config.far,
        )
    }

    /// Project a screen pixel through the camera and intersect the ground
    /// plane (Y = 0). Returns None when the ray runs parallel to the plane.
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Option<Vec3> {
        let ndc_x = (screen_x / self.width) * 2.0 - 1.0;
        let ndc_y = -((screen_y / self.height) * 2.0 - 1.0);

        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        let near = unproject(inverse, Vec3::new(ndc_x, ndc_y, 0.0))?;
        let far = unproject(inverse, Vec3::new(ndc_x, ndc_y, 1.0))?;

        let direction = far - near;
        if direction.y.abs() < 1e-6 {
            return None;
        }
        let t = -near.y / direction.y;
        Some(near + direction * t)
    }

    /// Rotate a raw input vector by the camera yaw so that "up" on the
    /// stick always means "away from the viewer" on screen.
    pub fn get_world_direction(&self, input_x: f32, input_z: f32) -> Vec2 {
        let (sin, cos) = self.current_rotation.sin_cos();
        Vec2::new(input_x * cos + input_z * sin, -input_x * sin + input_z * cos)
    }
}

fn wrap_angle(mut angle: f32) -> f32 {
    while angle >= std::f32::consts::TAU {
        angle -= std::f32::consts::TAU;
    }
    while angle < 0.0 {
        angle += std::f32::consts::TAU;
    }
    angle
}

fn unproject(inverse_view_proj: Mat4, ndc: Vec3) -> Option<Vec3> {
    let clip = inverse_view_proj * ndc.extend(1.0);
    if clip.w.abs() < 1e-9 {
        return None;
    }
    Some(clip.xyz() / clip.w)
}
