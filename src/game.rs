use glam::{Vec2, Vec3};

use crate::camera::{CameraConfig, IsoCamera};
use crate::collision::CollisionField;
use crate::components::{Door, EntityId, Interactive, Transform};
use crate::input::InputState;
use crate::player::{PlayerConfig, PlayerController};
use crate::scene::SceneFile;
use crate::store::{GameStore, PlayState};
use crate::transform::update_transforms;
use crate::world::{update_bob, update_doors, update_flicker, SceneWorld};

const WHEEL_ZOOM_STEP: f32 = 0.15;
const DRAG_ROTATE_RATE: f32 = 0.005;
const DRAG_PITCH_RATE: f32 = 0.003;
const SWIPE_ROTATE_RATE: f32 = 0.008;
const SWIPE_PITCH_RATE: f32 = 0.005;

/// Requested screen transition, returned from a screen's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ToMenu,
    ToGame,
}

/// The active screen. Each variant owns its own state; the engine swaps
/// variants when an update returns a transition.
pub enum Screen {
    Loading(LoadingScreen),
    Menu(MenuScreen),
    Game(Box<GameScene>),
}

impl Screen {
    pub fn update(
        &mut self,
        delta: f32,
        input: &InputState,
        store: &mut GameStore,
    ) -> Option<Transition> {
        match self {
            Screen::Loading(s) => s.update(delta),
            Screen::Menu(s) => s.update(input),
            Screen::Game(s) => {
                s.update(delta, input, store);
                None
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if let Screen::Game(s) = self {
            s.resize(width, height);
        }
    }
}

/// Shown while scene data is read. Loading is synchronous, so this screen
/// only holds the first frame before handing off to the menu.
#[derive(Default)]
pub struct LoadingScreen {
    shown_for: f32,
}

impl LoadingScreen {
    fn update(&mut self, delta: f32) -> Option<Transition> {
        self.shown_for += delta;
        if self.shown_for > 0.0 {
            Some(Transition::ToMenu)
        } else {
            None
        }
    }
}

/// Title screen: any mapped input starts the game.
#[derive(Default)]
pub struct MenuScreen;

impl MenuScreen {
    fn update(&mut self, input: &InputState) -> Option<Transition> {
        if input.any_just_pressed() || !input.taps().is_empty() {
            Some(Transition::ToGame)
        } else {
            None
        }
    }
}

/// The playable scene: wires input into the camera and player controllers
/// and steps the world systems each frame.
pub struct GameScene {
    pub field: CollisionField,
    pub world: SceneWorld,
    pub player: PlayerController,
    pub camera: IsoCamera,
    elapsed: f32,
    /// True while directional input was driving the player last frame, so
    /// releasing the keys ramps the speed down exactly once without
    /// clobbering an active click-to-move target.
    directional_active: bool,
}

impl GameScene {
    pub fn new(scene: &SceneFile, width: f32, height: f32, touch_capable: bool) -> Self {
        let field = CollisionField::new(
            scene.obstacles.iter().map(|b| b.to_aabb()).collect(),
            scene.floor_y,
        );

        let mut world = SceneWorld::new();
        world.spawn_from_scene(scene);

        let mut player = PlayerController::new(PlayerConfig::default());
        player.set_floor_y(scene.floor_y);
        player.set_position(Vec3::from(scene.spawn.position));

        let mut camera = IsoCamera::new(CameraConfig::default(), width, height, touch_capable);
        camera.set_target(player.position());
        if let Some(bounds) = &scene.bounds {
            camera.set_bounds(Vec3::from(bounds.min), Vec3::from(bounds.max));
        }

        Self {
            field,
            world,
            player,
            camera,
            elapsed: 0.0,
            directional_active: false,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.on_resize(width, height);
    }

    pub fn update(&mut self, delta: f32, input: &InputState, store: &mut GameStore) {
        if input.just_pressed("pause") {
            store.toggle_pause();
        }
        if store.state() == PlayState::Paused {
            return;
        }
        self.elapsed += delta;

        self.apply_camera_input(input);
        self.apply_movement_input(input);

        if input.just_pressed("interact") {
            self.interact(store);
        }
        if input.just_pressed("use_door") {
            self.toggle_nearest_door();
        }

        self.step(delta);
    }

    fn apply_camera_input(&mut self, input: &InputState) {
        if input.just_pressed("rotate_left") {
            self.camera.rotate_left();
        }
        if input.just_pressed("rotate_right") {
            self.camera.rotate_right();
        }
        if input.just_pressed("pitch_up") {
            self.camera.pitch_up();
        }
        if input.just_pressed("pitch_down") {
            self.camera.pitch_down();
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 && !self.camera.is_mobile() {
            self.camera.add_zoom(scroll * WHEEL_ZOOM_STEP);
        }

        if input.pressed("orbit") {
            let drag = input.cursor_delta();
            self.camera.rotate(-drag.x * DRAG_ROTATE_RATE);
            self.camera.adjust_pitch(drag.y * DRAG_PITCH_RATE);
        }

        let swipe = input.swipe_delta();
        if swipe != Vec2::ZERO {
            self.camera.rotate(-swipe.x * SWIPE_ROTATE_RATE);
            self.camera.adjust_pitch(swipe.y * SWIPE_PITCH_RATE);
        }
    }

    fn apply_movement_input(&mut self, input: &InputState) {
        let movement = input.movement_vector();
        if movement != Vec2::ZERO {
            self.command_move(movement, input.run_held());
            self.directional_active = true;
            return;
        }
        if self.directional_active {
            self.player.move_by_direction(Vec2::ZERO, false);
            self.directional_active = false;
        }

        if input.just_pressed("click_move") {
            let cursor = input.cursor_position();
            self.command_move_to_screen(cursor.x, cursor.y);
        } else if let Some(tap) = input.taps().first() {
            self.command_move_to_screen(tap.x, tap.y);
        }
    }

    /// Camera-relative directional movement: stick-up walks away from the
    /// viewer regardless of the current rotation.
    pub fn command_move(&mut self, movement: Vec2, running: bool) {
        let world = self.camera.get_world_direction(movement.x, -movement.y);
        self.player.move_by_direction(world, running);
    }

    /// Click/tap-to-move: project the screen point onto the ground plane.
    /// Clicks on the sky are ignored.
    pub fn command_move_to_screen(&mut self, screen_x: f32, screen_y: f32) {
        if let Some(point) = self.camera.screen_to_world(screen_x, screen_y) {
            self.player.move_to(point);
        }
    }

    pub fn step(&mut self, delta: f32) {
        self.player.update(delta, &self.field);
        self.camera.follow_target(self.player.position(), None);
        self.camera.update(delta);

        update_doors(&mut self.world.world, delta);
        update_flicker(&mut self.world.world, self.elapsed);
        update_bob(&mut self.world.world, self.elapsed);
        self.update_highlights();
        update_transforms(&mut self.world.world);
    }

    /// Interactives light up while the player is close enough to examine.
    fn update_highlights(&mut self) {
        let player_pos = self.player.position();
        let radius = self.player.config.interaction_radius;
        for (_, (interactive, transform)) in self
            .world
            .world
            .query_mut::<(&mut Interactive, &Transform)>()
        {
            let mut offset = transform.position - player_pos;
            offset.y = 0.0;
            interactive.highlighted = offset.length() <= radius;
        }
    }

    fn nearest_highlighted(&self) -> Option<hecs::Entity> {
        let player_pos = self.player.position();
        let mut best: Option<(hecs::Entity, f32)> = None;
        for (entity, (interactive, transform)) in
            self.world.world.query::<(&Interactive, &Transform)>().iter()
        {
            if !interactive.highlighted {
                continue;
            }
            let mut offset = transform.position - player_pos;
            offset.y = 0.0;
            let distance = offset.length();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((entity, distance));
            }
        }
        best.map(|(entity, _)| entity)
    }

    /// Examine the nearest highlighted object; clues go into the store.
    pub fn interact(&mut self, store: &mut GameStore) {
        let Some(entity) = self.nearest_highlighted() else {
            return;
        };
        let id = match self.world.world.get::<&EntityId>(entity) {
            Ok(id) => id.0.clone(),
            Err(_) => return,
        };
        let Ok(interactive) = self.world.world.get::<&Interactive>(entity) else {
            return;
        };
        tracing::info!("Examining '{}'", interactive.label);
        if interactive.clue {
            drop(interactive);
            store.record_clue(&id);
        }
    }

    /// Toggle the nearest door within interaction range.
    pub fn toggle_nearest_door(&mut self) {
        let player_pos = self.player.position();
        let radius = self.player.config.interaction_radius;
        let mut best: Option<(hecs::Entity, f32)> = None;
        for (entity, (_, transform)) in self.world.world.query::<(&Door, &Transform)>().iter() {
            let mut offset = transform.position - player_pos;
            offset.y = 0.0;
            let distance = offset.length();
            if distance <= radius && best.map_or(true, |(_, d)| distance < d) {
                best = Some((entity, distance));
            }
        }
        if let Some((entity, _)) = best {
            if let Ok(mut door) = self.world.world.get::<&mut Door>(entity) {
                door.open = !door.open;
                tracing::debug!("Door toggled, open: {}", door.open);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputBindings;

    const DT: f32 = 1.0 / 60.0;

    fn office() -> SceneFile {
        serde_yaml::from_str(
            r#"
name: "Office"
spawn:
  position: [0, 0, 0]
obstacles:
  - min: [30, 0, -2]
    max: [34, 10, 2]
doors:
  - id: office_door
    model: door.glb
    position: [8, 0, 0]
    open_angle: 1.5
  - id: far_door
    model: door.glb
    position: [100, 0, 100]
interactives:
  - id: letter
    position: [5, 0, 5]
    label: "Crumpled letter"
    clue: true
  - id: far_painting
    position: [60, 0, 60]
    label: "Dusty painting"
"#,
        )
        .unwrap()
    }

    fn game() -> GameScene {
        GameScene::new(&office(), 1280.0, 720.0, false)
    }

    #[test]
    fn test_loading_hands_off_to_menu() {
        let mut screen = Screen::Loading(LoadingScreen::default());
        let input = InputState::new(InputBindings::default());
        let mut store = GameStore::new();
        assert_eq!(
            screen.update(DT, &input, &mut store),
            Some(Transition::ToMenu)
        );
    }

    #[test]
    fn test_camera_starts_on_spawn() {
        let g = game();
        assert_eq!(g.camera.current_target(), g.player.position());
    }

    #[test]
    fn test_click_to_move_sets_path_target() {
        let mut g = game();
        // Screen center projects onto the ground near the spawn point.
        g.command_move_to_screen(640.0, 360.0);
        assert!(g.player.has_target());
    }

    #[test]
    fn test_directional_input_is_camera_relative() {
        let mut g = game();
        // Stick-up at the default rotation walks toward -Z.
        g.command_move(Vec2::new(0.0, 1.0), false);
        for _ in 0..30 {
            g.step(DT);
        }
        assert!(g.player.position().z < -0.5);
        assert!(g.player.position().x.abs() < 1e-3);
    }

    #[test]
    fn test_interact_records_nearby_clue_once() {
        let mut g = game();
        let mut store = GameStore::new();
        store.set_state(PlayState::Playing);
        // One step to refresh highlights; the letter is ~7 units away.
        g.step(DT);

        g.interact(&mut store);
        assert_eq!(store.found_clues(), ["letter"]);
        g.interact(&mut store);
        assert_eq!(store.found_clues().len(), 1);
    }

    #[test]
    fn test_distant_interactive_not_highlighted() {
        let mut g = game();
        g.step(DT);
        let far = g.world.entity("far_painting").unwrap();
        assert!(!g.world.world.get::<&Interactive>(far).unwrap().highlighted);
        let near = g.world.entity("letter").unwrap();
        assert!(g.world.world.get::<&Interactive>(near).unwrap().highlighted);
    }

    #[test]
    fn test_door_toggle_respects_range() {
        let mut g = game();
        g.toggle_nearest_door();
        let near = g.world.entity("office_door").unwrap();
        let far = g.world.entity("far_door").unwrap();
        assert!(g.world.world.get::<&Door>(near).unwrap().open);
        assert!(!g.world.world.get::<&Door>(far).unwrap().open);

        g.toggle_nearest_door();
        assert!(!g.world.world.get::<&Door>(near).unwrap().open);
    }

    #[test]
    fn test_pause_freezes_the_simulation() {
        let mut g = game();
        let input = InputState::new(InputBindings::default());
        let mut store = GameStore::new();
        store.set_state(PlayState::Paused);

        g.player.move_to(Vec3::new(20.0, 0.0, 0.0));
        let before = g.player.position();
        for _ in 0..30 {
            g.update(DT, &input, &mut store);
        }
        assert_eq!(g.player.position(), before);
        assert!(g.player.has_target());
    }

    #[test]
    fn test_wall_stops_click_to_move() {
        let mut g = game();
        g.player.move_to(Vec3::new(50.0, 0.0, 0.0));
        for _ in 0..600 {
            g.step(DT);
        }
        // Obstacle face at x=30, player radius 3.
        assert!(g.player.position().x <= 27.0 + 1e-3);
        assert!(!g.player.has_target());
    }
}
