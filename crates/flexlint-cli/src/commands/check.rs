//! Check command implementation.

use anyhow::{Context, Result};
use flexlint_checks::rules_for_config;
use flexlint_core::Analyzer;
use std::path::PathBuf;

use crate::config_resolver::LoadedConfig;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `true` when a violation at or above the configured `fail_on`
/// severity was found.
pub fn run(
    paths: &[PathBuf],
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    loaded: LoadedConfig,
) -> Result<bool> {
    let root = loaded.root();
    let config = loaded.config;
    let threshold = config.fail_threshold();

    let rules = rules_for_config(&config).context("Failed to select rules")?;

    let mut builder = Analyzer::builder()
        .root(root)
        .config(config)
        .excludes(exclude);
    if let Some(filter) = rules_filter {
        builder = builder.only_rules(filter.split(',').map(str::trim));
    }
    for path in paths {
        builder = builder.path(path);
    }
    for rule in rules {
        builder = builder.check_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    if paths.is_empty() {
        tracing::info!(
            "Analyzing {:?} with {} rules",
            analyzer.root(),
            analyzer.rule_count()
        );
    } else {
        tracing::info!("Analyzing {:?} with {} rules", paths, analyzer.rule_count());
    }

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format)?;

    Ok(result.has_violations_at(threshold))
}
