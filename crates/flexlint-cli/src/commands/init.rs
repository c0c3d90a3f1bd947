//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# flexlint configuration

# Preset: "sonar-way" (default) or "all"
preset = "sonar-way"

# Violations at or above this severity make `flexlint check` exit with 1
fail-on = "major"

[analyzer]
# Directory searched for tree dumps, relative to this file (default: ".")
# root = "./build/ast"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
]

# File name suffixes of tree dumps
suffixes = [".ast.json"]

# Worker threads (default: one per CPU)
# parallelism = 4

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.constructor-calls-dispatch-event]
enabled = true
# severity = "critical"  # Override default severity
call_name = "dispatchEvent"

[rules.octal-value]
enabled = true

# Report every node of one kind
# [[node-rules]]
# key = "X0001"
# name = "no-hex-literals"
# kind = "HEX_LITERAL"
# message = "Avoid hexadecimal literals such as {0}."
# severity = "minor"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_default(Path::new("flexlint.toml"), force)?;

    println!("Created flexlint.toml");
    println!("\nNext steps:");
    println!("  1. Edit flexlint.toml to configure rules");
    println!("  2. Run: flexlint check");

    Ok(())
}

fn write_default(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexlint_core::{Config, Severity};

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("sonar-way"));
        assert_eq!(config.fail_threshold(), Severity::Major);
        assert!(config.is_rule_enabled("S1467", "constructor-calls-dispatch-event"));
        assert!(config.node_rules.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("flexlint.toml");
        std::fs::write(&path, "# mine").unwrap();

        assert!(write_default(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        write_default(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
