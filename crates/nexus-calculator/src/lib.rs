//! Nexus Calculator - multi-mode calculator core with terminal and browser front ends
//!
//! One state machine drives seven modes: basic, scientific, programming,
//! graphing, finance, unit conversion and symbolic derivatives.
//!
//! # Design principles
//!
//! - **Error prevention**: every mutation goes through a single reducer that
//!   turns failures into display sentinels instead of panics
//! - **Visual feedback**: history, radix views and statistics are derived from
//!   state on every render
//! - **Pluggable math**: the reducer only sees the [`core::backend::MathBackend`] trait
//!
//! # Example
//!
//! ```rust
//! use nexus_calculator::prelude::*;
//!
//! let mut calc = CalculatorState::new();
//! calc.dispatch(Action::SetDisplay("42 * (3 + 7)".into())).unwrap();
//! calc.dispatch(Action::Evaluate).unwrap();
//! assert_eq!(calc.display(), "420");
//!
//! // Failures leave a sentinel on the display
//! calc.dispatch(Action::Append("+".into())).unwrap();
//! assert!(calc.dispatch(Action::Evaluate).is_err());
//! assert_eq!(calc.display(), "Error");
//!
//! calc.dispatch(Action::SetDisplay("x^2".into())).unwrap();
//! calc.dispatch(Action::Derivative).unwrap();
//! assert_eq!(calc.display(), "2 * x");
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::float_cmp
    )
)]
#![warn(missing_docs)]
#![deny(missing_debug_implementations)]

#[cfg(feature = "tui")]
pub mod cli;
pub mod config;
pub mod core;

#[cfg(feature = "tui")]
pub mod tui;

/// Browser front end; the page model is always available for testing
pub mod wasm;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{CalculatorConfig, ConfigError, Verbosity};
    pub use crate::core::backend::{CompiledExpression, MathBackend, NativeBackend};
    pub use crate::core::evaluator::Evaluator;
    pub use crate::core::finance::{FinanceForm, FinanceKind, FinanceRequest};
    pub use crate::core::graph::{GraphRange, PlotPoint, PlotSeries};
    pub use crate::core::history::{History, HistoryEntry};
    pub use crate::core::mode::{ButtonAction, Mode, PanelButton};
    pub use crate::core::parser::{AstNode, Parser, Token, Tokenizer};
    pub use crate::core::radix::RadixView;
    pub use crate::core::state::{Action, ActionError, CalculatorState, Stats};
    pub use crate::core::units::Unit;
    pub use crate::core::{CalcError, CalcResult, Operation, Value};

    #[cfg(feature = "tui")]
    pub use crate::tui::CalculatorApp;

    pub use crate::wasm::ViewModel;
}
