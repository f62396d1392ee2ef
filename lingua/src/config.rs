//! Engine configuration.
//!
//! Loaded from YAML with `${VAR:default}` substitution; missing fields take
//! their defaults.

use crate::error::LinguaError;
use crate::manager::LanguageManager;
use crate::resolver::DEFAULT_MAX_PASSES;
use lingua_core::{DirSource, yaml};
use lingua_logger::{LoggerConfig, LoggerError, WorkerGuard};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_ROOT: &str = "./resources";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinguaConfig {
    /// Resource search roots, tried in order.
    pub roots: Vec<PathBuf>,
    /// Registration files ingested at start.
    pub registrations: Vec<String>,
    /// User tag files loaded at start.
    pub user_files: Vec<String>,
    /// Language to switch to after ingestion; empty keeps the registered default.
    pub language: Option<String>,
    /// Pass bound for tag resolution, 0 for none.
    pub max_passes: usize,
    pub log: LoggerConfig,
}

impl Default for LinguaConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(DEFAULT_ROOT)],
            registrations: Vec::new(),
            user_files: Vec::new(),
            language: None,
            max_passes: DEFAULT_MAX_PASSES,
            log: LoggerConfig::default(),
        }
    }
}

impl LinguaConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LinguaError> {
        Ok(yaml::load_from_file(path)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, LinguaError> {
        Ok(yaml::load_from_str(content)?)
    }

    /// Installs the global subscriber described by the `log` section.
    ///
    /// The returned guard must be held until shutdown so buffered file
    /// output is flushed.
    pub fn init_logger(&self) -> Result<Option<WorkerGuard>, LoggerError> {
        self.log.init()
    }
}

impl LanguageManager {
    /// Builds a manager from `config`.
    ///
    /// Missing registration or user files are logged and skipped. An unknown
    /// `language` is returned as [`LinguaError::LanguageNotFound`]. Logging is
    /// not touched; call [`LinguaConfig::init_logger`] for that.
    pub fn from_config(config: &LinguaConfig) -> Result<Self, LinguaError> {
        let source: DirSource = config.roots.iter().cloned().collect();
        let mut manager = LanguageManager::new(source).with_max_passes(config.max_passes);

        for file in &config.registrations {
            // failures are logged by load_registration
            let _ = manager.load_registration(file);
        }
        for file in &config.user_files {
            let _ = manager.load_user_tags(file);
        }

        if let Some(language) = config.language.as_deref().filter(|l| !l.is_empty()) {
            manager.set_current_language(language)?;
        }

        info!(
            "LanguageManager ready: {} languages, current '{}'",
            manager.registry().len(),
            manager.current_language()
        );
        Ok(manager)
    }
}
