use std::collections::HashMap;

/// Duration of the fade when switching between clips, in seconds.
pub const CROSS_FADE_SECONDS: f32 = 0.2;

/// A looping animation clip registered on the mixer. Clips arrive from model
/// import with root motion already stripped: the character's translation is
/// driven by the controller, never by the animation.
#[derive(Debug, Clone)]
pub struct Clip {
    pub name: String,
    pub duration: f32,
    /// True when hip-translation tracks were removed at import.
    pub root_motion_stripped: bool,
}

#[derive(Debug)]
struct Playback {
    clip: Clip,
    time: f32,
    weight: f32,
    target_weight: f32,
}

/// Blends named looping clips with short cross-fades. This is the state an
/// external skinning/render layer samples each frame; the mixer only tracks
/// time and weights.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    playbacks: Vec<Playback>,
    by_name: HashMap<String, usize>,
    current: Option<usize>,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register clips from raw imported names. Names are matched by keyword
    /// ("idle", "walk", "run"/"running"), first occurrence wins, everything
    /// else is skipped as a duplicate or unused clip.
    pub fn register_imported(&mut self, raw_clips: &[(String, f32)]) {
        for (raw_name, duration) in raw_clips {
            let lowered = raw_name.to_lowercase();
            let name = if lowered.contains("idle") {
                "idle"
            } else if lowered.contains("walk") {
                "walk"
            } else if lowered.contains("run") {
                "run"
            } else {
                continue;
            };
            if self.by_name.contains_key(name) {
                tracing::debug!("Skipping duplicate animation clip '{}'", raw_name);
                continue;
            }
            self.add_clip(Clip {
                name: name.to_string(),
                duration: *duration,
                root_motion_stripped: true,
            });
        }
        tracing::info!("Animation clips mapped: {:?}", self.clip_names());
    }

    pub fn add_clip(&mut self, clip: Clip) {
        let index = self.playbacks.len();
        self.by_name.insert(clip.name.clone(), index);
        self.playbacks.push(Playback {
            clip,
            time: 0.0,
            weight: 0.0,
            target_weight: 0.0,
        });
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.playbacks.iter().map(|p| p.clip.name.as_str()).collect()
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.current.map(|i| self.playbacks[i].clip.name.as_str())
    }

    pub fn weight_of(&self, name: &str) -> f32 {
        self.by_name
            .get(name)
            .map(|&i| self.playbacks[i].weight)
            .unwrap_or(0.0)
    }

    /// Switch to the named clip with a cross-fade. No-op if it is already
    /// the active clip or is not registered.
    pub fn play(&mut self, name: &str) {
        let Some(&index) = self.by_name.get(name) else {
            tracing::warn!("Animation clip '{}' not found", name);
            return;
        };
        if self.current == Some(index) {
            return;
        }
        if let Some(old) = self.current {
            self.playbacks[old].target_weight = 0.0;
        }
        let playback = &mut self.playbacks[index];
        playback.time = 0.0;
        playback.target_weight = 1.0;
        self.current = Some(index);
    }

    /// Advance clip time (looping) and fade weights toward their targets.
    pub fn advance(&mut self, delta: f32) {
        if delta <= 0.0 {
            return;
        }
        let fade_step = delta / CROSS_FADE_SECONDS;
        for playback in &mut self.playbacks {
            if playback.weight > 0.0 || playback.target_weight > 0.0 {
                if playback.clip.duration > 0.0 {
                    playback.time = (playback.time + delta) % playback.clip.duration;
                }
            }
            if playback.weight < playback.target_weight {
                playback.weight = (playback.weight + fade_step).min(playback.target_weight);
            } else if playback.weight > playback.target_weight {
                playback.weight = (playback.weight - fade_step).max(playback.target_weight);
            }
        }
    }
}

/// Pick the clip for the character's motion state, degrading to the next
/// best available clip: run falls back to walk, walk falls back to idle.
pub fn select_clip(mixer: &AnimationMixer, is_moving: bool, is_running: bool) -> Option<&'static str> {
    if is_moving {
        if is_running && mixer.has_clip("run") {
            return Some("run");
        }
        if mixer.has_clip("walk") {
            return Some("walk");
        }
    }
    if mixer.has_clip("idle") {
        return Some("idle");
    }
    None
}
