use std::collections::HashSet;

/// Top-level play state, owned by the store and read by every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Loading,
    Menu,
    Playing,
    Paused,
}

/// Session-wide game state shared across screens: what the player has
/// found and whether the simulation is running.
pub struct GameStore {
    state: PlayState,
    found_clues: Vec<String>,
    found_set: HashSet<String>,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            state: PlayState::Loading,
            found_clues: Vec::new(),
            found_set: HashSet::new(),
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn set_state(&mut self, state: PlayState) {
        if state != self.state {
            tracing::info!("Play state: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlayState::Playing => self.set_state(PlayState::Paused),
            PlayState::Paused => self.set_state(PlayState::Playing),
            _ => {}
        }
    }

    /// Record a found clue. Returns false when it was already recorded.
    pub fn record_clue(&mut self, id: &str) -> bool {
        if !self.found_set.insert(id.to_string()) {
            return false;
        }
        self.found_clues.push(id.to_string());
        tracing::info!("Clue found: '{}' ({} total)", id, self.found_clues.len());
        true
    }

    pub fn has_clue(&self, id: &str) -> bool {
        self.found_set.contains(id)
    }

    /// Clues in the order they were found.
    pub fn found_clues(&self) -> &[String] {
        &self.found_clues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clues_record_once_in_order() {
        let mut store = GameStore::new();
        assert!(store.record_clue("letter"));
        assert!(store.record_clue("key"));
        assert!(!store.record_clue("letter"));
        assert_eq!(store.found_clues(), ["letter", "key"]);
        assert!(store.has_clue("key"));
        assert!(!store.has_clue("knife"));
    }

    #[test]
    fn test_pause_only_toggles_while_in_game() {
        let mut store = GameStore::new();
        store.toggle_pause();
        assert_eq!(store.state(), PlayState::Loading);

        store.set_state(PlayState::Playing);
        store.toggle_pause();
        assert_eq!(store.state(), PlayState::Paused);
        store.toggle_pause();
        assert!(store.is_playing());
    }
}
