//! Calculator configuration
//!
//! Loaded from YAML:
//!
//! ```yaml
//! history_capacity: 50
//! initial_mode: scientific
//! graph:
//!   start: -5
//!   end: 5
//!   step: 0.25
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::core::graph::{GraphRange, RangeError};
use crate::core::history::History;
use crate::core::mode::Mode;
use crate::core::state::CalculatorState;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML did not match the schema
    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// History must hold at least one entry
    #[error("history_capacity must be at least 1")]
    ZeroCapacity,

    /// Graph range cannot be sampled
    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Log verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    #[default]
    Normal,
    /// Informational messages
    Verbose,
    /// Every dispatched action
    Debug,
}

impl Verbosity {
    /// Maps `-q` and the number of `-v` flags to a verbosity
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Default log level when `RUST_LOG` is not set
    #[must_use]
    pub const fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::WARN,
            Self::Verbose => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Maximum history entries kept
    pub history_capacity: usize,
    /// Graph sampling range
    pub graph: GraphRange,
    /// Mode shown at start-up
    pub initial_mode: Mode,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            history_capacity: History::DEFAULT_MAX_ENTRIES,
            graph: GraphRange::default(),
            initial_mode: Mode::Basic,
        }
    }
}

impl CalculatorConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set history capacity
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set graph range
    #[must_use]
    pub const fn with_graph(mut self, graph: GraphRange) -> Self {
        self.graph = graph;
        self
    }

    /// Set initial mode
    #[must_use]
    pub const fn with_initial_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Parses and validates YAML text
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Serializes to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Checks capacity and graph range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.graph.validate()?;
        Ok(())
    }

    /// Builds a calculator from this configuration
    #[must_use]
    pub fn build_state(&self) -> CalculatorState {
        CalculatorState::new()
            .with_history_capacity(self.history_capacity)
            .with_graph_range(self.graph)
            .with_mode(self.initial_mode)
    }
}
