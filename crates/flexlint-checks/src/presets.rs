//! Rule presets for common configurations.

use crate::{constructor_calls_dispatch_event, ConstructorCallsDispatchEvent, OctalValue};
use flexlint_core::{CheckBox, Config, ConfigError};
use std::str::FromStr;
use tracing::debug;

/// Preset configurations for flexlint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// The default quality profile.
    #[default]
    SonarWay,
    /// Every built-in rule.
    All,
}

impl Preset {
    /// Returns the name used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SonarWay => "sonar-way",
            Self::All => "all",
        }
    }

    /// Returns the rules for this preset, configured from `config`.
    #[must_use]
    pub fn rules(self, config: &Config) -> Vec<CheckBox> {
        match self {
            Self::SonarWay => sonar_way_rules(config),
            Self::All => all_rules(config),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sonar-way" => Ok(Self::SonarWay),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::UnknownPreset {
                name: s.to_string(),
            }),
        }
    }
}

/// Returns the rules of the preset named in `config` (default: sonar-way).
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPreset`] for an unrecognized preset name.
pub fn rules_for_config(config: &Config) -> Result<Vec<CheckBox>, ConfigError> {
    let preset = match config.preset.as_deref() {
        Some(name) => name.parse()?,
        None => Preset::default(),
    };
    debug!("Using preset {}", preset.as_str());
    Ok(preset.rules(config))
}

/// Returns the sonar-way set of rules.
///
/// Includes:
/// - `constructor-calls-dispatch-event` (S1467) - No event dispatch in constructors
/// - `octal-value` (S1314) - No octal literals
#[must_use]
pub fn sonar_way_rules(config: &Config) -> Vec<CheckBox> {
    vec![
        Box::new(ConstructorCallsDispatchEvent::from_config(config.rule(
            constructor_calls_dispatch_event::CODE,
            constructor_calls_dispatch_event::NAME,
        ))),
        Box::new(OctalValue::new()),
    ]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules(config: &Config) -> Vec<CheckBox> {
    sonar_way_rules(config)
}
