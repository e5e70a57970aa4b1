//! Engine configuration, loaded from a TOML file.
//!
//! Every section has serde defaults, so a partial file only overrides what
//! it mentions.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventKind;

/// Errors that can occur loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Master switch; handlers no-op when false.
    pub enabled: bool,
    /// Language tag, passed through to the narrator. Not used for logic.
    pub language: String,
    /// Speech rate, passed through to the narrator.
    pub speech_rate: u32,
    /// Optional RNG seed for deterministic variant selection and sampling.
    pub seed: Option<u64>,
    /// Queue and worker settings.
    pub delivery: DeliveryConfig,
    /// Cooldown settings.
    pub throttle: ThrottleConfig,
    /// Event sampling settings.
    pub sampling: SamplingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en".to_string(),
            speech_rate: 200,
            seed: None,
            delivery: DeliveryConfig::default(),
            throttle: ThrottleConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Queue capacity and utterance spacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Maximum pending commentary lines before new ones are dropped.
    pub queue_capacity: usize,
    /// Minimum gap between spoken lines, in milliseconds.
    pub utterance_gap_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            utterance_gap_ms: 500,
        }
    }
}

impl DeliveryConfig {
    pub fn utterance_gap(&self) -> Duration {
        Duration::from_millis(self.utterance_gap_ms)
    }
}

/// Cooldown policy: per-kind minimum intervals plus a global spacing floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Default minimum interval between comments of the same kind, ms.
    pub default_cooldown_ms: u64,
    /// Minimum spacing between any two comments, ms.
    pub global_floor_ms: u64,
    /// Per-kind cooldown overrides, ms.
    pub kind_cooldown_ms: HashMap<EventKind, u64>,
    /// Kinds allowed to ignore the global floor (urgent events).
    pub bypass_global: Vec<EventKind>,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        // Urgent kinds are never suppressed: zero own-cooldown and exempt
        // from the global floor.
        let urgent = [
            EventKind::Goal,
            EventKind::RedCard,
            EventKind::Kickoff,
            EventKind::HalfTime,
            EventKind::FullTime,
        ];
        Self {
            default_cooldown_ms: 2000,
            global_floor_ms: 3000,
            kind_cooldown_ms: urgent.iter().map(|k| (*k, 0)).collect(),
            bypass_global: urgent.to_vec(),
        }
    }
}

impl ThrottleConfig {
    pub fn default_cooldown(&self) -> Duration {
        Duration::from_millis(self.default_cooldown_ms)
    }

    pub fn global_floor(&self) -> Duration {
        Duration::from_millis(self.global_floor_ms)
    }

    pub fn kind_cooldowns(&self) -> HashMap<EventKind, Duration> {
        self.kind_cooldown_ms
            .iter()
            .map(|(kind, ms)| (*kind, Duration::from_millis(*ms)))
            .collect()
    }
}

/// Probability gates for high-frequency events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Fraction of ordinary passes that get commentary.
    pub pass_rate: f32,
    /// Fraction of pass-streak (build-up) moments that get commentary.
    /// Streaks are more narratively important than single passes.
    pub build_up_rate: f32,
    /// Fraction of tackles that get commentary.
    pub tackle_rate: f32,
    /// Fraction of successful dribbles that get commentary.
    pub dribble_rate: f32,
    /// Pass-streak length at which the build-up branch kicks in.
    pub build_up_threshold: u32,
    /// When true, the cooldown check runs before the sampling roll, so a
    /// losing roll cannot happen inside an already-throttled window.
    pub throttle_before_sampling: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            pass_rate: 0.25,
            build_up_rate: 0.7,
            tackle_rate: 0.2,
            dribble_rate: 0.3,
            build_up_threshold: 5,
            throttle_before_sampling: false,
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Commentary engine configuration

enabled = true
language = "en"
speech_rate = 200
# seed = 42

[delivery]
queue_capacity = 10
utterance_gap_ms = 500

[throttle]
default_cooldown_ms = 2000
global_floor_ms = 3000
bypass_global = ["goal", "red_card", "kickoff", "half_time", "full_time"]

[throttle.kind_cooldown_ms]
goal = 0
red_card = 0
kickoff = 0
half_time = 0
full_time = 0

[sampling]
pass_rate = 0.25
build_up_rate = 0.7
tackle_rate = 0.2
dribble_rate = 0.3
build_up_threshold = 5
throttle_before_sampling = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert!(config.enabled);
        assert_eq!(config.delivery.queue_capacity, 10);
        assert_eq!(config.delivery.utterance_gap_ms, 500);
        assert_eq!(config.throttle.global_floor_ms, 3000);
        assert_eq!(config.sampling.build_up_threshold, 5);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_urgent_kinds_never_suppressed_by_default() {
        let throttle = ThrottleConfig::default();
        for kind in [EventKind::Goal, EventKind::RedCard, EventKind::FullTime] {
            assert_eq!(throttle.kind_cooldown_ms.get(&kind), Some(&0));
            assert!(throttle.bypass_global.contains(&kind));
        }
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            enabled = false
            seed = 99

            [delivery]
            queue_capacity = 4

            [sampling]
            pass_rate = 1.0
            throttle_before_sampling = true
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert!(!config.enabled);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.delivery.queue_capacity, 4);
        assert_eq!(config.sampling.pass_rate, 1.0);
        assert!(config.sampling.throttle_before_sampling);
        // untouched sections keep defaults
        assert_eq!(config.throttle.global_floor_ms, 3000);
    }

    #[test]
    fn test_kind_cooldown_overrides_parse() {
        let toml = r#"
            [throttle.kind_cooldown_ms]
            pass = 5000
            shot_on_target = 100
        "#;

        let config = EngineConfig::from_str(toml).unwrap();
        assert_eq!(
            config.throttle.kind_cooldown_ms.get(&EventKind::Pass),
            Some(&5000)
        );
        assert_eq!(
            config.throttle.kind_cooldown_ms.get(&EventKind::ShotOnTarget),
            Some(&100)
        );
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = EngineConfig::from_str(&default_config_toml()).unwrap();
        assert!(config.enabled);
        assert_eq!(
            config.throttle.kind_cooldown_ms.get(&EventKind::Goal),
            Some(&0)
        );
        assert!(config
            .throttle
            .bypass_global
            .contains(&EventKind::HalfTime));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commentary.toml");
        std::fs::write(&path, default_config_toml()).unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.speech_rate, 200);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = EngineConfig::from_file(Path::new("/no/such/commentary.toml"));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_durations_convert() {
        let throttle = ThrottleConfig {
            default_cooldown_ms: 1500,
            ..ThrottleConfig::default()
        };
        assert_eq!(throttle.default_cooldown(), Duration::from_millis(1500));
        assert_eq!(
            throttle.kind_cooldowns().get(&EventKind::Goal),
            Some(&Duration::ZERO)
        );
    }
}
