//! Configuration types for flexlint.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for flexlint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Preset to use ("sonar-way" or "all").
    #[serde(default)]
    pub preset: Option<String>,

    /// Violations at or above this severity fail the run (default: major).
    #[serde(default, alias = "fail_on")]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name or rule key.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Single-node rules declared in configuration.
    #[serde(default)]
    pub node_rules: Vec<NodeRuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Returns the configuration of a rule, looked up by name first, then key.
    #[must_use]
    pub fn rule(&self, key: &str, name: &str) -> Option<&RuleConfig> {
        self.rules.get(name).or_else(|| self.rules.get(key))
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, key: &str, name: &str) -> bool {
        self.rule(key, name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, key: &str, name: &str) -> Option<Severity> {
        self.rule(key, name).and_then(|c| c.severity)
    }

    /// Severity threshold that fails a run.
    #[must_use]
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Major)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// File name suffixes of tree dumps to pick up during discovery.
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            suffixes: default_suffixes(),
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec!["**/target/**".to_string()]
}

fn default_suffixes() -> Vec<String> {
    vec![".ast.json".to_string()]
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// A `[[node-rules]]` entry: report every node of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRuleConfig {
    /// Rule key (e.g., "X0001").
    pub key: String,
    /// Kebab-case rule name.
    pub name: String,
    /// Node kind to report, in `SCREAMING_SNAKE_CASE`.
    pub kind: String,
    /// Message template.
    pub message: String,
    /// Severity (default: major).
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A node rule names a kind that does not exist.
    #[error("Node rule {rule} uses unknown node kind '{kind}'")]
    UnknownNodeKind {
        /// Key of the node rule.
        rule: String,
        /// The unrecognized kind.
        kind: String,
    },

    /// The preset name is not known.
    #[error("Unknown preset '{name}'")]
    UnknownPreset {
        /// The unrecognized preset.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analyzer.suffixes, [".ast.json"]);
        assert_eq!(config.analyzer.exclude, ["**/target/**"]);
        assert_eq!(config.fail_threshold(), Severity::Major);
        assert!(config.rules.is_empty());
        assert!(config.node_rules.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "all"
fail-on = "critical"

[analyzer]
root = "./build/ast"
suffixes = [".tree.json"]
parallelism = 2

[rules.constructor-calls-dispatch-event]
severity = "critical"
call_name = "emit"

[rules.S1314]
enabled = false

[[node-rules]]
key = "X0001"
name = "no-hex-literals"
kind = "HEX_LITERAL"
message = "Avoid hexadecimal literals."
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("all"));
        assert_eq!(config.fail_threshold(), Severity::Critical);
        assert_eq!(config.analyzer.root, PathBuf::from("./build/ast"));
        assert_eq!(config.analyzer.exclude, ["**/target/**"]);
        assert_eq!(config.analyzer.parallelism, Some(2));

        assert!(config.is_rule_enabled("S1467", "constructor-calls-dispatch-event"));
        assert!(!config.is_rule_enabled("S1314", "octal-value"));
        assert_eq!(
            config.rule_severity("S1467", "constructor-calls-dispatch-event"),
            Some(Severity::Critical)
        );
        let rule = config
            .rule("S1467", "constructor-calls-dispatch-event")
            .expect("rule config");
        assert_eq!(rule.get_str("call_name", "dispatchEvent"), "emit");
        assert_eq!(rule.get_str("missing", "fallback"), "fallback");

        assert_eq!(config.node_rules.len(), 1);
        assert_eq!(config.node_rules[0].kind, "HEX_LITERAL");
        assert_eq!(config.node_rules[0].severity, None);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("fail-on = \"fatal\"").expect_err("bad severity");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
