/// Game configuration — every component's settings in one RON document.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::audio::AudioConfig;
use super::avatar::IdleConfig;
use super::indicator::IndicatorConfig;
use super::reaction::ReactionConfig;
use super::scene::SceneRotation;
use super::sequencer::SequencerConfig;
use super::slideshow::{EndingConfig, IllustrationConfig};
use super::transition::TransitionConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Settings for each screen fade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfigs {
    pub title_to_menu: TransitionConfig,
    pub main: TransitionConfig,
    pub illustration: TransitionConfig,
    /// The sequencer's own fade-in.
    pub scenario: TransitionConfig,
}

/// Anything left out of the document keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Scenario CSV, relative to the config file's directory.
    pub scenario: Option<String>,
    pub sequencer: SequencerConfig,
    pub transitions: FadeConfigs,
    pub indicator: IndicatorConfig,
    pub audio: AudioConfig,
    pub illustrations: IllustrationConfig,
    pub ending: EndingConfig,
    pub reaction: ReactionConfig,
    pub idle: IdleConfig,
    pub scenes: SceneRotation,
}

impl GameConfig {
    /// Load from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GameConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse from a RON string.
    pub fn parse_ron(input: &str) -> Result<GameConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    /// Where `scenario` points, resolved against `config_path`'s directory.
    pub fn scenario_path(&self, config_path: &Path) -> Option<std::path::PathBuf> {
        let scenario = self.scenario.as_ref()?;
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(scenario))
    }
}
