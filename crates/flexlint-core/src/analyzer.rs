//! Core analyzer for orchestrating lint execution.

use crate::check::{Check, CheckBox};
use crate::config::{Config, ConfigError};
use crate::declarative::load_node_rules;
use crate::dispatcher::{Dispatcher, RegistrationError};
use crate::dump::TreeDump;
use crate::tree::{SyntaxTree, TreeError};
use crate::types::{FileReport, LintResult};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error outside of any particular file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A tree dump could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the dump.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A tree dump could not be loaded.
    #[error("Invalid tree dump {path}: {source}")]
    Tree {
        /// Path of the dump.
        path: PathBuf,
        /// What was wrong with it.
        source: TreeError,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule registration error.
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// The worker pool could not be created.
    #[error("Failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    paths: Vec<PathBuf>,
    checks: Vec<CheckBox>,
    only_rules: Option<Vec<String>>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a dump file or directory to analyze instead of the root.
    ///
    /// Directories are searched like the root; files are analyzed as given.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Adds a check to the analyzer.
    #[must_use]
    pub fn check<C: Check + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Adds a boxed check to the analyzer.
    #[must_use]
    pub fn check_box(mut self, check: CheckBox) -> Self {
        self.checks.push(check);
        self
    }

    /// Restricts the run to the rules named here, by name or key.
    ///
    /// Applies to configured node rules as well as added checks.
    #[must_use]
    pub fn only_rules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_rules = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on unreadable or invalid dumps (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Sets a flag that stops the run before the next file when raised.
    #[must_use]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Builds the analyzer.
    ///
    /// Configured node rules are added, disabled rules are dropped and
    /// severity overrides are applied before the checks are registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the registrations are
    /// invalid, or if the worker pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Merge exclude patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p).map(|compiled| (p.clone(), compiled)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut checks = self.checks;
        checks.extend(load_node_rules(&config)?);

        for name in config.rules.keys().map(String::as_str) {
            if !checks.iter().any(|c| c.key() == name || c.name() == name) {
                warn!("Configuration for unknown rule '{}' is ignored", name);
            }
        }

        if let Some(only) = &self.only_rules {
            for name in only.iter().map(String::as_str) {
                if !checks.iter().any(|c| c.key() == name || c.name() == name) {
                    warn!("Unknown rule: {}", name);
                }
            }
            checks.retain(|c| {
                only.iter()
                    .any(|n| c.key() == n.as_str() || c.name() == n.as_str())
            });
        }

        let mut builder = Dispatcher::builder();
        for check in checks {
            if !config.is_rule_enabled(check.key(), check.name()) {
                debug!("Skipping disabled rule: {}", check.name());
                continue;
            }
            let severity = config.rule_severity(check.key(), check.name());
            builder = builder.check_with_severity(check, severity);
        }
        let dispatcher = builder.build()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.analyzer.parallelism.unwrap_or(0))
            .build()?;

        Ok(Analyzer {
            root,
            paths: self.paths,
            dispatcher,
            exclude_patterns,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
            cancel: self.cancel,
            pool,
        })
    }
}

enum Outcome {
    Report(FileReport),
    Failed(PathBuf, AnalyzerError),
    Skipped,
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    paths: Vec<PathBuf>,
    dispatcher: Dispatcher,
    exclude_patterns: Vec<(String, glob::Pattern)>,
    config: Config,
    fail_on_parse_error: bool,
    cancel: Option<Arc<AtomicBool>>,
    pool: rayon::ThreadPool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of enabled checks.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.dispatcher.check_count()
    }

    /// Analyzes all tree dumps and returns the results.
    ///
    /// Files are analyzed in parallel; results keep discovery order.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, or if a dump cannot be
    /// loaded and `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let outcomes: Vec<Outcome> = self
            .pool
            .install(|| files.par_iter().map(|f| self.process(f)).collect());

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Report(report) => result.add_report(report),
                Outcome::Failed(path, err) => {
                    warn!("Failed to load {}: {}", path.display(), err);
                    if self.fail_on_parse_error {
                        return Err(err);
                    }
                    result.add_failure(&path, err.to_string());
                }
                Outcome::Skipped => result.cancelled = true,
            }
        }

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );
        if result.cancelled {
            warn!("Analysis was cancelled before all files were checked");
        }

        Ok(result)
    }

    fn process(&self, path: &Path) -> Outcome {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Outcome::Skipped;
        }
        match self.load(path) {
            Ok((tree, source)) => {
                debug!("Analyzing: {}", source.display());
                Outcome::Report(self.dispatcher.run(&tree, &source))
            }
            Err(err) => Outcome::Failed(path.to_path_buf(), err),
        }
    }

    /// Loads a dump; violations are reported against its recorded source.
    fn load(&self, path: &Path) -> Result<(SyntaxTree, PathBuf), AnalyzerError> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalyzerError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let tree_error = |source| AnalyzerError::Tree {
            path: path.to_path_buf(),
            source,
        };
        let dump = TreeDump::parse(&content).map_err(tree_error)?;
        let tree = dump.to_tree().map_err(tree_error)?;
        let source = dump.source.unwrap_or_else(|| path.to_path_buf());
        Ok((tree, source))
    }

    /// Discovers all tree dumps to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.paths.is_empty() {
            return self.discover_in(&self.root);
        }

        let mut files = Vec::new();
        for path in &self.paths {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                std::env::current_dir()?.join(path)
            };
            if path.is_dir() {
                files.extend(self.discover_in(&path)?);
            } else {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn discover_in(&self, dir: &Path) -> Result<Vec<PathBuf>, AnalyzerError> {
        let base = glob::Pattern::escape(&dir.to_string_lossy());
        let mut files = Vec::new();

        for suffix in &self.config.analyzer.suffixes {
            let pattern = format!("{base}/**/*{}", glob::Pattern::escape(suffix));
            for entry in glob::glob(&pattern)? {
                let path = entry.map_err(|e| AnalyzerError::Io(e.into_error()))?;

                if !path.is_file() {
                    continue;
                }
                if self.should_exclude(&path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }

                files.push(path);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.exclude_patterns.iter().any(|(raw, pattern)| {
            if pattern.matches(&path_str) {
                return true;
            }
            // Also check as substring for patterns like "**/target/**"
            let normalized = raw.replace("**", "");
            !normalized.is_empty() && path_str.contains(&normalized)
        })
    }
}
