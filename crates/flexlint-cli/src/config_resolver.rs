//! Locating and loading `flexlint.toml`.
//!
//! `--config` wins. Otherwise the nearest `flexlint.toml` (or
//! `.flexlint.toml`) in the directory of the first analyzed path or one of
//! its ancestors is used, then `config.toml` in the user config directory
//! (`$FLEXLINT_CONFIG_DIR`, else `~/.flexlint`). Defaults apply when none
//! exists.

use anyhow::{Context, Result};
use flexlint_core::Config;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: &[&str] = &["flexlint.toml", ".flexlint.toml"];

const USER_CONFIG_NAME: &str = "config.toml";

/// A configuration together with the file it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: Config,
    /// File the configuration was read from; `None` for defaults.
    pub origin: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory to analyze when no paths are given.
    ///
    /// A relative `analyzer.root` is taken from the directory holding the
    /// config file; with defaults it stays relative to the current directory.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        let root = &self.config.analyzer.root;
        match self.origin.as_deref().and_then(Path::parent) {
            Some(dir) if root.is_relative() => dir.join(root),
            _ => root.clone(),
        }
    }
}

/// Loads the configuration for a run over `paths`.
///
/// # Errors
///
/// Returns an error if the current directory is unavailable or the chosen
/// file cannot be read or parsed.
pub fn load(explicit: Option<&Path>, paths: &[PathBuf]) -> Result<LoadedConfig> {
    let start = search_start(paths)?;
    load_from(explicit, &start, user_config_dir())
}

fn load_from(
    explicit: Option<&Path>,
    start: &Path,
    user_dir: Option<PathBuf>,
) -> Result<LoadedConfig> {
    let origin = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_in_ancestors(start).or_else(|| {
            user_dir
                .map(|dir| dir.join(USER_CONFIG_NAME))
                .filter(|path| path.is_file())
        }),
    };

    let Some(path) = origin else {
        tracing::debug!("No configuration found above {}", start.display());
        return Ok(LoadedConfig {
            config: Config::default(),
            origin: None,
        });
    };

    tracing::info!("Using config: {}", path.display());
    let config = Config::from_file(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    Ok(LoadedConfig {
        config,
        origin: Some(path),
    })
}

/// Absolute directory the search starts from: the first path if it is a
/// directory, its parent otherwise, the current directory without paths.
fn search_start(paths: &[PathBuf]) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let start = match paths.first() {
        Some(p) if p.is_dir() => cwd.join(p),
        Some(p) => cwd
            .join(p)
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf),
        None => cwd,
    };
    Ok(start)
}

fn find_in_ancestors(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("FLEXLINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".flexlint"))
}
