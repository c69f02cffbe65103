use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::cli::CliArgs;
use crate::game::{GameScene, LoadingScreen, MenuScreen, Screen, Transition};
use crate::input::{load_bindings, InputState};
use crate::scene::{load_scene, SceneFile};
use crate::store::{GameStore, PlayState};

/// Delta time ceiling; a long hitch (tab switch, debugger pause) steps the
/// simulation by at most this much.
const MAX_DELTA_SECONDS: f32 = 0.1;

/// Main application struct implementing winit's ApplicationHandler. Owns
/// every subsystem and passes them to the active screen by reference.
pub struct Engine {
    args: CliArgs,
    window: Option<Arc<Window>>,
    input: InputState,
    store: GameStore,
    screen: Screen,
    scene_file: Option<SceneFile>,
    last_frame_time: Option<instant::Instant>,
    width: f32,
    height: f32,
}

impl Engine {
    pub fn new(args: CliArgs) -> Self {
        let bindings = load_bindings(Path::new(&args.project));
        Self {
            args,
            window: None,
            input: InputState::new(bindings),
            store: GameStore::new(),
            screen: Screen::Loading(LoadingScreen::default()),
            scene_file: None,
            last_frame_time: None,
            width: 1280.0,
            height: 720.0,
        }
    }

    fn load_scene_file(&mut self) {
        let path = Path::new(&self.args.project).join(&self.args.scene);
        match load_scene(&path) {
            Ok(scene) => self.scene_file = Some(scene),
            Err(e) => tracing::error!("Failed to load scene {:?}: {}", path, e),
        }
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::ToMenu => {
                self.store.set_state(PlayState::Menu);
                self.screen = Screen::Menu(MenuScreen::default());
            }
            Transition::ToGame => {
                let Some(scene) = &self.scene_file else {
                    tracing::error!("No scene loaded, staying on the menu");
                    return;
                };
                let game = GameScene::new(scene, self.width, self.height, self.args.touch);
                self.screen = Screen::Game(Box::new(game));
                self.store.set_state(PlayState::Playing);
            }
        }
    }

    fn frame(&mut self) {
        let now = instant::Instant::now();
        let delta = match self.last_frame_time {
            Some(last) => now.duration_since(last).as_secs_f32().min(MAX_DELTA_SECONDS),
            None => 0.0,
        };
        self.last_frame_time = Some(now);

        if let Some(transition) = self.screen.update(delta, &self.input, &mut self.store) {
            self.apply_transition(transition);
        }

        self.input.begin_frame();
    }
}

impl ApplicationHandler for Engine {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Gumshoe")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );
        let size = window.inner_size();
        self.width = size.width as f32;
        self.height = size.height as f32;
        self.input.set_viewport(self.width, self.height);
        self.window = Some(window);

        self.load_scene_file();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.width = new_size.width as f32;
                    self.height = new_size.height as f32;
                    self.input.set_viewport(self.width, self.height);
                    self.screen.resize(self.width, self.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn engine() -> Engine {
        Engine::new(CliArgs::parse_from(["gumshoe"]))
    }

    #[test]
    fn test_starts_on_loading_screen() {
        let e = engine();
        assert!(matches!(e.screen, Screen::Loading(_)));
        assert_eq!(e.store.state(), PlayState::Loading);
    }

    #[test]
    fn test_menu_transition_updates_play_state() {
        let mut e = engine();
        e.apply_transition(Transition::ToMenu);
        assert!(matches!(e.screen, Screen::Menu(_)));
        assert_eq!(e.store.state(), PlayState::Menu);
    }

    #[test]
    fn test_game_transition_requires_a_loaded_scene() {
        let mut e = engine();
        e.apply_transition(Transition::ToMenu);
        e.apply_transition(Transition::ToGame);
        // No scene file was loaded: the menu stays up.
        assert!(matches!(e.screen, Screen::Menu(_)));

        e.scene_file = Some(serde_yaml::from_str("name: Minimal").unwrap());
        e.apply_transition(Transition::ToGame);
        assert!(matches!(e.screen, Screen::Game(_)));
        assert!(e.store.is_playing());
    }

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut e = engine();
        assert!(e.last_frame_time.is_none());
        e.frame();
        assert!(e.last_frame_time.is_some());
    }
}
