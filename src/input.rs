use std::collections::{HashMap, HashSet};
use std::path::Path;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use serde::{Deserialize, Serialize};

/// A touch is a tap until it travels this far, then it becomes a swipe.
pub const SWIPE_THRESHOLD_PX: f32 = 15.0;
/// Virtual joystick region in the lower-left corner, in pixels.
pub const JOYSTICK_REGION_PX: f32 = 200.0;
/// Run button region in the lower-right corner, in pixels.
pub const RUN_BUTTON_REGION_PX: f32 = 150.0;
/// Joystick travel that maps to full deflection.
const JOYSTICK_MAX_RADIUS_PX: f32 = 50.0;

/// Semantic action names mapped from physical inputs via bindings.yaml.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputBindings {
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub actions: HashMap<String, Vec<InputTrigger>>,
}

/// A physical trigger: `key: W` or `mouse: Left` in the YAML.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputTrigger {
    Key(String),
    Mouse(String),
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut actions = HashMap::new();
        actions.insert("move_forward".into(), vec![InputTrigger::Key("W".into()), InputTrigger::Key("ArrowUp".into())]);
        actions.insert("move_backward".into(), vec![InputTrigger::Key("S".into()), InputTrigger::Key("ArrowDown".into())]);
        actions.insert("move_left".into(), vec![InputTrigger::Key("A".into()), InputTrigger::Key("ArrowLeft".into())]);
        actions.insert("move_right".into(), vec![InputTrigger::Key("D".into()), InputTrigger::Key("ArrowRight".into())]);
        actions.insert("run".into(), vec![InputTrigger::Key("ShiftLeft".into())]);
        actions.insert("interact".into(), vec![InputTrigger::Key("E".into())]);
        actions.insert("use_door".into(), vec![InputTrigger::Key("F".into())]);
        actions.insert("rotate_left".into(), vec![InputTrigger::Key("Q".into())]);
        actions.insert("rotate_right".into(), vec![InputTrigger::Key("R".into())]);
        actions.insert("pitch_up".into(), vec![InputTrigger::Key("T".into())]);
        actions.insert("pitch_down".into(), vec![InputTrigger::Key("G".into())]);
        actions.insert("pause".into(), vec![InputTrigger::Key("Escape".into())]);
        actions.insert("click_move".into(), vec![InputTrigger::Mouse("Left".into())]);
        actions.insert("orbit".into(), vec![InputTrigger::Mouse("Middle".into())]);

        Self { actions }
    }
}

/// Load input bindings from a YAML file, with defaults as fallback.
pub fn load_bindings(project_root: &Path) -> InputBindings {
    let path = project_root.join("input/bindings.yaml");
    if path.exists() {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(bindings) => {
                    tracing::info!("Loaded input bindings from {:?}", path);
                    return bindings;
                }
                Err(e) => tracing::warn!("Failed to parse bindings.yaml: {}", e),
            },
            Err(e) => tracing::warn!("Failed to read bindings.yaml: {}", e),
        }
    }
    tracing::info!("Using default input bindings");
    InputBindings::default()
}

/// Maps key name strings to winit KeyCode.
fn key_name_to_code(name: &str) -> Option<KeyCode> {
    match name {
        "A" => Some(KeyCode::KeyA),
        "B" => Some(KeyCode::KeyB),
        "C" => Some(KeyCode::KeyC),
        "D" => Some(KeyCode::KeyD),
        "E" => Some(KeyCode::KeyE),
        "F" => Some(KeyCode::KeyF),
        "G" => Some(KeyCode::KeyG),
        "H" => Some(KeyCode::KeyH),
        "I" => Some(KeyCode::KeyI),
        "J" => Some(KeyCode::KeyJ),
        "K" => Some(KeyCode::KeyK),
        "L" => Some(KeyCode::KeyL),
        "M" => Some(KeyCode::KeyM),
        "N" => Some(KeyCode::KeyN),
        "O" => Some(KeyCode::KeyO),
        "P" => Some(KeyCode::KeyP),
        "Q" => Some(KeyCode::KeyQ),
        "R" => Some(KeyCode::KeyR),
        "S" => Some(KeyCode::KeyS),
        "T" => Some(KeyCode::KeyT),
        "U" => Some(KeyCode::KeyU),
        "V" => Some(KeyCode::KeyV),
        "W" => Some(KeyCode::KeyW),
        "X" => Some(KeyCode::KeyX),
        "Y" => Some(KeyCode::KeyY),
        "Z" => Some(KeyCode::KeyZ),
        "Digit0" | "0" => Some(KeyCode::Digit0),
        "Digit1" | "1" => Some(KeyCode::Digit1),
        "Digit2" | "2" => Some(KeyCode::Digit2),
        "Digit3" | "3" => Some(KeyCode::Digit3),
        "Space" => Some(KeyCode::Space),
        "ShiftLeft" => Some(KeyCode::ShiftLeft),
        "ShiftRight" => Some(KeyCode::ShiftRight),
        "ControlLeft" => Some(KeyCode::ControlLeft),
        "ControlRight" => Some(KeyCode::ControlRight),
        "Escape" => Some(KeyCode::Escape),
        "Enter" => Some(KeyCode::Enter),
        "Tab" => Some(KeyCode::Tab),
        "ArrowUp" => Some(KeyCode::ArrowUp),
        "ArrowDown" => Some(KeyCode::ArrowDown),
        "ArrowLeft" => Some(KeyCode::ArrowLeft),
        "ArrowRight" => Some(KeyCode::ArrowRight),
        _ => None,
    }
}

fn mouse_name_to_button(name: &str) -> Option<MouseButton> {
    match name {
        "Left" => Some(MouseButton::Left),
        "Right" => Some(MouseButton::Right),
        "Middle" => Some(MouseButton::Middle),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TouchRole {
    Joystick,
    RunButton,
    Gesture,
}

#[derive(Debug, Clone, Copy)]
struct TouchPoint {
    start: Vec2,
    position: Vec2,
    role: TouchRole,
    /// Becomes true once the touch breaches the swipe threshold.
    swiped: bool,
}

/// Central input state, updated each frame from the event loop. Touch
/// handling folds the on-screen joystick, the run button, and tap/swipe
/// gestures into the same per-frame surface the keyboard and mouse use.
pub struct InputState {
    bindings: InputBindings,
    // Raw key state
    keys_held: HashSet<KeyCode>,
    keys_just_pressed: HashSet<KeyCode>,
    keys_just_released: HashSet<KeyCode>,
    // Raw mouse state
    mouse_buttons_held: HashSet<MouseButton>,
    mouse_buttons_just_pressed: HashSet<MouseButton>,
    mouse_buttons_just_released: HashSet<MouseButton>,
    // Cursor motion accumulated this frame
    cursor_delta: Vec2,
    // Scroll wheel delta accumulated this frame (y > 0 = scroll up)
    scroll_delta: Vec2,
    cursor_position: Vec2,
    // Touch state
    touches: HashMap<u64, TouchPoint>,
    taps: Vec<Vec2>,
    swipe_delta: Vec2,
    viewport: Vec2,
}

impl InputState {
    pub fn new(bindings: InputBindings) -> Self {
        Self {
            bindings,
            keys_held: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            keys_just_released: HashSet::new(),
            mouse_buttons_held: HashSet::new(),
            mouse_buttons_just_pressed: HashSet::new(),
            mouse_buttons_just_released: HashSet::new(),
            cursor_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            cursor_position: Vec2::ZERO,
            touches: HashMap::new(),
            taps: Vec::new(),
            swipe_delta: Vec2::ZERO,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }

    /// Call at the start of each frame to clear transient state.
    pub fn begin_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
        self.mouse_buttons_just_pressed.clear();
        self.mouse_buttons_just_released.clear();
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.taps.clear();
        self.swipe_delta = Vec2::ZERO;
    }

    /// The touch regions are anchored to window corners.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Process a winit WindowEvent.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_held.contains(&key_code) {
                                self.keys_just_pressed.insert(key_code);
                            }
                            self.keys_held.insert(key_code);
                        }
                        ElementState::Released => {
                            self.keys_held.remove(&key_code);
                            self.keys_just_released.insert(key_code);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if !self.mouse_buttons_held.contains(button) {
                        self.mouse_buttons_just_pressed.insert(*button);
                    }
                    self.mouse_buttons_held.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_held.remove(button);
                    self.mouse_buttons_just_released.insert(*button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor_delta += position - self.cursor_position;
                self.cursor_position = position;
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                winit::event::MouseScrollDelta::LineDelta(x, y) => {
                    self.scroll_delta.x += x;
                    self.scroll_delta.y += y;
                }
                winit::event::MouseScrollDelta::PixelDelta(pos) => {
                    // Normalize pixel deltas to ~line units
                    self.scroll_delta.x += pos.x as f32 / 120.0;
                    self.scroll_delta.y += pos.y as f32 / 120.0;
                }
            },
            WindowEvent::Touch(touch) => self.handle_touch(touch),
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused; drop everything.
                self.keys_held.clear();
                self.mouse_buttons_held.clear();
                self.touches.clear();
            }
            _ => {}
        }
    }

    fn handle_touch(&mut self, touch: &Touch) {
        let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
        self.touch_event(touch.id, touch.phase, position);
    }

    fn touch_event(&mut self, id: u64, phase: TouchPhase, position: Vec2) {
        match phase {
            TouchPhase::Started => {
                let role = self.classify_touch(position);
                self.touches.insert(
                    id,
                    TouchPoint {
                        start: position,
                        position,
                        role,
                        swiped: false,
                    },
                );
            }
            TouchPhase::Moved => {
                if let Some(point) = self.touches.get_mut(&id) {
                    let delta = position - point.position;
                    point.position = position;
                    if point.role == TouchRole::Gesture {
                        if point.swiped {
                            self.swipe_delta += delta;
                        } else if (position - point.start).length() > SWIPE_THRESHOLD_PX {
                            point.swiped = true;
                            self.swipe_delta += position - point.start;
                        }
                    }
                }
            }
            TouchPhase::Ended => {
                if let Some(point) = self.touches.remove(&id) {
                    if point.role == TouchRole::Gesture && !point.swiped {
                        self.taps.push(point.position);
                    }
                }
            }
            TouchPhase::Cancelled => {
                self.touches.remove(&id);
            }
        }
    }

    fn classify_touch(&self, position: Vec2) -> TouchRole {
        let from_bottom = self.viewport.y - position.y;
        if position.x < JOYSTICK_REGION_PX && from_bottom < JOYSTICK_REGION_PX {
            TouchRole::Joystick
        } else if self.viewport.x - position.x < RUN_BUTTON_REGION_PX
            && from_bottom < RUN_BUTTON_REGION_PX
        {
            TouchRole::RunButton
        } else {
            TouchRole::Gesture
        }
    }

    /// Check if a semantic action is currently held.
    pub fn pressed(&self, action: &str) -> bool {
        let Some(triggers) = self.bindings.actions.get(action) else {
            return false;
        };
        triggers.iter().any(|trigger| match trigger {
            InputTrigger::Key(name) => key_name_to_code(name)
                .is_some_and(|code| self.keys_held.contains(&code)),
            InputTrigger::Mouse(name) => mouse_name_to_button(name)
                .is_some_and(|btn| self.mouse_buttons_held.contains(&btn)),
        })
    }

    /// Check if a semantic action was just pressed this frame.
    pub fn just_pressed(&self, action: &str) -> bool {
        let Some(triggers) = self.bindings.actions.get(action) else {
            return false;
        };
        triggers.iter().any(|trigger| match trigger {
            InputTrigger::Key(name) => key_name_to_code(name)
                .is_some_and(|code| self.keys_just_pressed.contains(&code)),
            InputTrigger::Mouse(name) => mouse_name_to_button(name)
                .is_some_and(|btn| self.mouse_buttons_just_pressed.contains(&btn)),
        })
    }

    /// Check if a semantic action was just released this frame.
    pub fn just_released(&self, action: &str) -> bool {
        let Some(triggers) = self.bindings.actions.get(action) else {
            return false;
        };
        triggers.iter().any(|trigger| match trigger {
            InputTrigger::Key(name) => key_name_to_code(name)
                .is_some_and(|code| self.keys_just_released.contains(&code)),
            InputTrigger::Mouse(name) => mouse_name_to_button(name)
                .is_some_and(|btn| self.mouse_buttons_just_released.contains(&btn)),
        })
    }

    /// Check if any mapped action was just pressed this frame.
    pub fn any_just_pressed(&self) -> bool {
        self.bindings.actions.keys().any(|a| self.just_pressed(a))
    }

    /// Raw movement vector before camera remapping: x = right, y = away from
    /// the viewer. The virtual joystick overrides the keyboard while held.
    pub fn movement_vector(&self) -> Vec2 {
        let joystick = self.joystick_vector();
        if joystick != Vec2::ZERO {
            return joystick;
        }

        let mut axis = Vec2::ZERO;
        if self.pressed("move_forward") {
            axis.y += 1.0;
        }
        if self.pressed("move_backward") {
            axis.y -= 1.0;
        }
        if self.pressed("move_left") {
            axis.x -= 1.0;
        }
        if self.pressed("move_right") {
            axis.x += 1.0;
        }
        if axis != Vec2::ZERO {
            axis = axis.normalize();
        }
        axis
    }

    /// Deflection of the on-screen joystick, clamped to unit length.
    /// Screen-up maps to +y.
    pub fn joystick_vector(&self) -> Vec2 {
        for point in self.touches.values() {
            if point.role == TouchRole::Joystick {
                let offset = point.position - point.start;
                let mut v = Vec2::new(offset.x, -offset.y) / JOYSTICK_MAX_RADIUS_PX;
                if v.length() > 1.0 {
                    v = v.normalize();
                }
                return v;
            }
        }
        Vec2::ZERO
    }

    /// True while a touch rests on the run button or the run key is held.
    pub fn run_held(&self) -> bool {
        self.pressed("run")
            || self
                .touches
                .values()
                .any(|p| p.role == TouchRole::RunButton)
    }

    /// Taps that ended this frame (touches that never became swipes).
    pub fn taps(&self) -> &[Vec2] {
        &self.taps
    }

    /// Accumulated swipe movement this frame, in pixels.
    pub fn swipe_delta(&self) -> Vec2 {
        self.swipe_delta
    }

    pub fn touch_active(&self) -> bool {
        !self.touches.is_empty()
    }

    /// Cursor movement accumulated this frame.
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> InputState {
        let mut s = InputState::new(InputBindings::default());
        s.set_viewport(1280.0, 720.0);
        s
    }

    #[test]
    fn test_default_bindings_cover_game_actions() {
        let bindings = InputBindings::default();
        for action in [
            "move_forward",
            "run",
            "interact",
            "use_door",
            "rotate_left",
            "rotate_right",
            "pause",
        ] {
            assert!(bindings.actions.contains_key(action), "missing {action}");
        }
    }

    #[test]
    fn test_bindings_parse_from_yaml() {
        let yaml = r#"
actions:
  move_forward:
    - key: W
    - key: ArrowUp
  click_move:
    - mouse: Left
"#;
        let bindings: InputBindings = serde_yaml::from_str(yaml).unwrap();
        let mut s = InputState::new(bindings);
        s.keys_held.insert(KeyCode::ArrowUp);
        s.mouse_buttons_held.insert(MouseButton::Left);
        assert!(s.pressed("move_forward"));
        assert!(s.pressed("click_move"));
    }

    #[test]
    fn test_key_name_mapping() {
        assert_eq!(key_name_to_code("W"), Some(KeyCode::KeyW));
        assert_eq!(key_name_to_code("Escape"), Some(KeyCode::Escape));
        assert_eq!(key_name_to_code("ShiftLeft"), Some(KeyCode::ShiftLeft));
        assert_eq!(key_name_to_code("Invalid"), None);
    }

    #[test]
    fn test_movement_vector_normalizes_diagonals() {
        let mut s = state();
        s.keys_held.insert(KeyCode::KeyW);
        s.keys_held.insert(KeyCode::KeyD);
        let v = s.movement_vector();
        assert!(v.x > 0.0 && v.y > 0.0);
        assert!((v.length() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_arrow_keys_alias_wasd() {
        let mut s = state();
        s.keys_held.insert(KeyCode::ArrowUp);
        assert!(s.pressed("move_forward"));
    }

    #[test]
    fn test_blur_clears_held_keys() {
        let mut s = state();
        s.keys_held.insert(KeyCode::KeyW);
        s.handle_window_event(&WindowEvent::Focused(false));
        assert!(!s.pressed("move_forward"));
    }

    #[test]
    fn test_touch_in_corner_is_joystick() {
        let mut s = state();
        // Lower-left corner.
        s.touch_event(1, TouchPhase::Started, Vec2::new(100.0, 650.0));
        s.touch_event(1, TouchPhase::Moved, Vec2::new(130.0, 650.0));
        let v = s.joystick_vector();
        assert!(v.x > 0.0);
        assert_eq!(v.y, 0.0);
        // Joystick movement is not a swipe and never taps.
        assert_eq!(s.swipe_delta(), Vec2::ZERO);
        s.touch_event(1, TouchPhase::Ended, Vec2::new(130.0, 650.0));
        assert!(s.taps().is_empty());
        assert_eq!(s.joystick_vector(), Vec2::ZERO);
    }

    #[test]
    fn test_joystick_deflection_clamps_to_unit() {
        let mut s = state();
        s.touch_event(1, TouchPhase::Started, Vec2::new(100.0, 650.0));
        s.touch_event(1, TouchPhase::Moved, Vec2::new(100.0, 450.0));
        let v = s.joystick_vector();
        // Screen-up deflection maps to +y.
        assert!(v.y > 0.99 && v.y <= 1.0);
    }

    #[test]
    fn test_run_button_region() {
        let mut s = state();
        s.touch_event(2, TouchPhase::Started, Vec2::new(1200.0, 650.0));
        assert!(s.run_held());
        s.touch_event(2, TouchPhase::Ended, Vec2::new(1200.0, 650.0));
        assert!(!s.run_held());
    }

    #[test]
    fn test_short_touch_is_a_tap() {
        let mut s = state();
        s.touch_event(3, TouchPhase::Started, Vec2::new(600.0, 300.0));
        // Under the threshold: still a tap.
        s.touch_event(3, TouchPhase::Moved, Vec2::new(610.0, 300.0));
        s.touch_event(3, TouchPhase::Ended, Vec2::new(610.0, 300.0));
        assert_eq!(s.taps().len(), 1);
        assert_eq!(s.swipe_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_long_touch_is_a_swipe_not_a_tap() {
        let mut s = state();
        s.touch_event(4, TouchPhase::Started, Vec2::new(600.0, 300.0));
        s.touch_event(4, TouchPhase::Moved, Vec2::new(640.0, 300.0));
        s.touch_event(4, TouchPhase::Moved, Vec2::new(660.0, 300.0));
        s.touch_event(4, TouchPhase::Ended, Vec2::new(660.0, 300.0));
        assert!(s.taps().is_empty());
        assert!((s.swipe_delta().x - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_begin_frame_clears_transients() {
        let mut s = state();
        s.touch_event(5, TouchPhase::Started, Vec2::new(600.0, 300.0));
        s.touch_event(5, TouchPhase::Ended, Vec2::new(600.0, 300.0));
        assert_eq!(s.taps().len(), 1);
        s.begin_frame();
        assert!(s.taps().is_empty());
    }
}
