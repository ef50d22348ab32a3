//! Command-line interface
//!
//! ## Usage
//!
//! ```bash
//! nexus-calc                          # interactive terminal calculator
//! nexus-calc --mode programming tui   # start in a specific mode
//! nexus-calc eval "6*7" "ans+1"       # evaluate in sequence, ans chains
//! nexus-calc derive "x^3 + sin(x)"    # symbolic derivative
//! nexus-calc graph "x^2" --step 1     # sampled points as JSON
//! nexus-calc compound 1000 0.05 1 12  # compound interest
//! nexus-calc loan 200000 0.04 360     # monthly payment
//! nexus-calc convert 5 km m           # unit conversion
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{CalculatorConfig, ConfigError, Verbosity};
use crate::core::finance::{CompoundInterestRequest, FinanceRequest, LoanPaymentRequest};
use crate::core::graph::RangeError;
use crate::core::mode::Mode;
use crate::core::state::{Action, ActionError};
use crate::core::units::Unit;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A calculation failed
    #[error("{0}")]
    Calculation(#[from] ActionError),

    /// Graph range override was invalid
    #[error("{0}")]
    Range(#[from] RangeError),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Multi-mode calculator for the terminal
#[derive(Parser, Debug)]
#[command(name = "nexus-calc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "NEXUS_CALC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Start-up mode (overrides the config file)
    #[arg(short, long, global = true)]
    pub mode: Option<Mode>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write logs to this file (the terminal UI discards them otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to run (defaults to the terminal UI)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Interactive terminal calculator
    Tui,

    /// Evaluate expressions in order; `ans` holds the previous result
    Eval {
        /// Expressions to evaluate
        #[arg(required = true)]
        expressions: Vec<String>,

        /// Print the history as JSON instead of the results
        #[arg(long)]
        history_json: bool,
    },

    /// Differentiate an expression with respect to x
    Derive {
        /// Function of x
        expression: String,
    },

    /// Sample a function of x and print the points as JSON
    Graph {
        /// Function of x
        expression: String,

        /// First x value
        #[arg(long, allow_hyphen_values = true)]
        start: Option<f64>,

        /// Last x value
        #[arg(long, allow_hyphen_values = true)]
        end: Option<f64>,

        /// Distance between samples
        #[arg(long)]
        step: Option<f64>,
    },

    /// Compound interest: P (1 + r/n)^(n t)
    Compound {
        /// Principal
        principal: f64,
        /// Annual rate as a decimal (0.05 for 5%)
        rate: f64,
        /// Years
        years: f64,
        /// Compounding periods per year
        #[arg(default_value_t = 1.0)]
        compounds_per_year: f64,
    },

    /// Monthly payment on an amortized loan
    Loan {
        /// Principal
        principal: f64,
        /// Annual rate as a decimal
        annual_rate: f64,
        /// Term in months
        months: f64,
    },

    /// Convert a value between units
    Convert {
        /// Value to convert
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Source unit (m, ft, in, cm, km, kg, lb, oz, g, C, F, K)
        from: Unit,
        /// Target unit
        to: Unit,
    },
}

impl Cli {
    /// Log verbosity from `-q` / `-v`
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Loads the config file (if any) and applies command-line overrides
    pub fn load_config(&self) -> CliResult<CalculatorConfig> {
        let mut config = match &self.config {
            Some(path) => CalculatorConfig::load(path)?,
            None => CalculatorConfig::default(),
        };
        if let Some(mode) = self.mode {
            config = config.with_initial_mode(mode);
        }
        Ok(config)
    }
}

/// Runs a one-shot command and returns what it prints
///
/// [`Commands::Tui`] needs a terminal and produces no output here.
pub fn execute(command: &Commands, config: &CalculatorConfig) -> CliResult<String> {
    let mut state = config.build_state();

    match command {
        Commands::Tui => Ok(String::new()),
        Commands::Eval {
            expressions,
            history_json,
        } => {
            let mut results = Vec::with_capacity(expressions.len());
            for expression in expressions {
                state.dispatch(Action::SetDisplay(expression.clone()))?;
                state.dispatch(Action::Evaluate)?;
                results.push(state.display().to_string());
            }
            if *history_json {
                Ok(state.history().to_json()?)
            } else {
                Ok(results.join("\n"))
            }
        }
        Commands::Derive { expression } => {
            state.dispatch(Action::SetDisplay(expression.clone()))?;
            state.dispatch(Action::Derivative)?;
            Ok(state.display().to_string())
        }
        Commands::Graph {
            expression,
            start,
            end,
            step,
        } => {
            let mut range = config.graph;
            range.start = start.unwrap_or(range.start);
            range.end = end.unwrap_or(range.end);
            range.step = step.unwrap_or(range.step);
            range.validate()?;

            let mut state = state.with_graph_range(range);
            state.dispatch(Action::SetDisplay(expression.clone()))?;
            state.dispatch(Action::GenerateGraph)?;
            Ok(state.plot().to_json()?)
        }
        Commands::Compound {
            principal,
            rate,
            years,
            compounds_per_year,
        } => {
            let request = FinanceRequest::CompoundInterest(CompoundInterestRequest {
                principal: *principal,
                rate: *rate,
                years: *years,
                compounds_per_year: *compounds_per_year,
            });
            state.dispatch(Action::Finance(request))?;
            Ok(state.display().to_string())
        }
        Commands::Loan {
            principal,
            annual_rate,
            months,
        } => {
            let request = FinanceRequest::LoanPayment(LoanPaymentRequest {
                principal: *principal,
                annual_rate: *annual_rate,
                months: *months,
            });
            state.dispatch(Action::Finance(request))?;
            Ok(state.display().to_string())
        }
        Commands::Convert { value, from, to } => {
            state.dispatch(Action::SetDisplay(value.clone()))?;
            state.dispatch(Action::ConvertUnit {
                from: *from,
                to: *to,
            })?;
            Ok(state.display().to_string())
        }
    }
}
