/// Audio manager — BGM and SE channels, volumes, and named UI cues.
///
/// Owned by the host and handed to whatever needs sound, instead of living
/// in a global.

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::host::{AudioBackend, AudioSink};

/// Cue name played for confirm actions.
pub const DECISION_CUE: &str = "decision";
/// Cue name played when a clickable element is clicked.
pub const CLICKABLE_CLICK_CUE: &str = "clickable_click";

/// A named cue resolved to a clip and a volume scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueSpec {
    pub clip: String,
    #[serde(default = "full_scale")]
    pub volume_scale: f32,
}

fn full_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub bgm_volume: f32,
    pub se_volume: f32,
    pub decision_se: Option<String>,
    pub clickable_click_se: Option<String>,
    /// Relative to the decision SE.
    pub clickable_click_volume_scale: f32,
    /// Played once the SE slider has stopped moving.
    pub slider_se: Option<String>,
    /// Seconds the slider must be still before `slider_se` plays.
    pub slider_se_delay: f32,
    /// Other named cues.
    pub cues: FxHashMap<String, CueSpec>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bgm_volume: 0.5,
            se_volume: 1.0,
            decision_se: Some("se_decision".to_string()),
            clickable_click_se: Some("se_clickable_click".to_string()),
            clickable_click_volume_scale: 0.5,
            slider_se: Some("se_slider".to_string()),
            slider_se_delay: 0.1,
            cues: FxHashMap::default(),
        }
    }
}

pub struct AudioManager {
    config: AudioConfig,
    backend: Option<Box<dyn AudioBackend>>,
    bgm_volume: f32,
    se_volume: f32,
    current_bgm: Option<String>,
    slider_se_wait: Option<f32>,
}

impl AudioManager {
    pub fn new(config: AudioConfig, backend: impl AudioBackend + 'static) -> Self {
        Self::with_backend(config, Some(Box::new(backend)))
    }

    /// A manager with nothing to play through; every call is a no-op.
    pub fn silent(config: AudioConfig) -> Self {
        Self::with_backend(config, None)
    }

    fn with_backend(config: AudioConfig, backend: Option<Box<dyn AudioBackend>>) -> Self {
        let mut manager = Self {
            bgm_volume: config.bgm_volume.clamp(0.0, 1.0),
            se_volume: config.se_volume.clamp(0.0, 1.0),
            config,
            backend,
            current_bgm: None,
            slider_se_wait: None,
        };
        let volume = manager.bgm_volume;
        if let Some(backend) = manager.backend.as_mut() {
            backend.set_bgm_volume(volume);
        }
        manager
    }

    pub fn bgm_volume(&self) -> f32 {
        self.bgm_volume
    }

    pub fn se_volume(&self) -> f32 {
        self.se_volume
    }

    pub fn current_bgm(&self) -> Option<&str> {
        self.current_bgm.as_deref()
    }

    // --- BGM ---

    /// Start looping `clip`. The same clip is not restarted unless asked.
    pub fn play_bgm(&mut self, clip: &str, restart_if_same: bool) {
        if !restart_if_same && self.current_bgm.as_deref() == Some(clip) {
            return;
        }
        let volume = self.bgm_volume;
        if let Some(backend) = self.backend.as_mut() {
            backend.play_bgm(clip, volume);
            self.current_bgm = Some(clip.to_string());
        }
    }

    pub fn stop_bgm(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.stop_bgm();
        }
        self.current_bgm = None;
    }

    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = volume.clamp(0.0, 1.0);
        let volume = self.bgm_volume;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_bgm_volume(volume);
        }
    }

    // --- SE ---

    /// Play a one-shot at `volume_scale × se_volume`.
    pub fn play_se(&mut self, clip: &str, volume_scale: f32) {
        let volume = volume_scale.clamp(0.0, 1.0) * self.se_volume;
        if let Some(backend) = self.backend.as_mut() {
            backend.play_one_shot(clip, volume);
        }
    }

    pub fn set_se_volume(&mut self, volume: f32) {
        self.se_volume = volume.clamp(0.0, 1.0);
    }

    pub fn play_decision_se(&mut self) {
        if let Some(clip) = self.config.decision_se.clone() {
            self.play_se(&clip, 1.0);
        }
    }

    pub fn play_clickable_click_se(&mut self) {
        if let Some(clip) = self.config.clickable_click_se.clone() {
            let scale = self.config.clickable_click_volume_scale;
            self.play_se(&clip, scale);
        }
    }

    // --- sliders ---

    pub fn on_bgm_slider_changed(&mut self, value: f32) {
        self.set_bgm_volume(value);
    }

    /// Apply the new SE volume and (re)start the slider SE countdown.
    pub fn on_se_slider_changed(&mut self, value: f32) {
        self.set_se_volume(value);
        self.slider_se_wait = Some(self.config.slider_se_delay.max(0.0));
    }

    pub fn tick(&mut self, dt: f32) {
        let Some(left) = self.slider_se_wait else {
            return;
        };
        let left = left - dt;
        if left > 0.0 {
            self.slider_se_wait = Some(left);
            return;
        }
        self.slider_se_wait = None;
        if let Some(clip) = self.config.slider_se.clone() {
            self.play_se(&clip, 1.0);
        }
    }
}

impl AudioSink for AudioManager {
    fn play_cue(&mut self, cue: &str) {
        match cue {
            DECISION_CUE => self.play_decision_se(),
            CLICKABLE_CLICK_CUE => self.play_clickable_click_se(),
            other => match self.config.cues.get(other).cloned() {
                Some(spec) => self.play_se(&spec.clip, spec.volume_scale),
                None => {
                    debug!("cue '{}' has no mapping; playing it as a clip", other);
                    self.play_se(other, 1.0);
                }
            },
        }
    }
}
