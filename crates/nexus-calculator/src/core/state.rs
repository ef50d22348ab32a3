//! Calculator state and reducer
//!
//! Error prevention: all mutation goes through [`CalculatorState::dispatch`],
//! which maps every failure to one of the display sentinels. Front ends only
//! render the state and send actions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::backend::{MathBackend, NativeBackend, ANS};
use crate::core::buffer::{self, InputBuffer};
use crate::core::finance::{format_amount, FinanceError, FinanceForm, FinanceRequest};
use crate::core::graph::{GraphRange, PlotSeries};
use crate::core::history::History;
use crate::core::memory::Memory;
use crate::core::mode::{find_button, ButtonAction, Mode};
use crate::core::radix::RadixView;
use crate::core::units::{convert, Unit, UnitError};
use crate::core::{format_number, parse_float_prefix, CalcError};

/// Variable graphed and differentiated against
pub const FUNCTION_VARIABLE: &str = "x";

/// Named state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Append a token to the display
    Append(String),
    /// Replace the display
    SetDisplay(String),
    /// Reset the display to "0"
    Clear,
    /// Remove the last display character
    DeleteLast,
    /// Evaluate the display
    Evaluate,
    /// Switch the active mode
    SetMode(Mode),
    /// Copy a history entry's expression into the display
    SelectHistory(usize),
    /// MS
    MemoryStore,
    /// MR
    MemoryRecall,
    /// M+
    MemoryAdd,
    /// MC
    MemoryClear,
    /// Show a random number in [0, 1)
    Random,
    /// Append `ans`
    AppendAnswer,
    /// Plot the display as a function of x
    GenerateGraph,
    /// Differentiate the display with respect to x
    Derivative,
    /// Run a finance formula
    Finance(FinanceRequest),
    /// Run the formula described by a filled-in form
    SubmitFinanceForm(FinanceForm),
    /// Convert the displayed value between units
    ConvertUnit {
        /// Source unit
        from: Unit,
        /// Target unit
        to: Unit,
    },
}

impl Action {
    /// Action a panel button triggers; None for buttons that open a form
    #[must_use]
    pub fn from_button(action: ButtonAction) -> Option<Self> {
        let action = match action {
            ButtonAction::Append(token) => Self::Append(token.to_string()),
            ButtonAction::Clear => Self::Clear,
            ButtonAction::DeleteLast => Self::DeleteLast,
            ButtonAction::Evaluate => Self::Evaluate,
            ButtonAction::MemoryStore => Self::MemoryStore,
            ButtonAction::MemoryRecall => Self::MemoryRecall,
            ButtonAction::MemoryAdd => Self::MemoryAdd,
            ButtonAction::MemoryClear => Self::MemoryClear,
            ButtonAction::Random => Self::Random,
            ButtonAction::AppendAnswer => Self::AppendAnswer,
            ButtonAction::GenerateGraph => Self::GenerateGraph,
            ButtonAction::Derivative => Self::Derivative,
            ButtonAction::ConvertUnit { from, to } => Self::ConvertUnit { from, to },
            ButtonAction::OpenFinanceForm(_) => return None,
        };
        Some(action)
    }
}

/// Why an action fell back to a sentinel
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Evaluation, compilation or differentiation failed
    #[error(transparent)]
    Calc(#[from] CalcError),
    /// Finance inputs were invalid
    #[error(transparent)]
    Finance(#[from] FinanceError),
    /// Unit conversion failed
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Summary figures shown in the statistics panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    /// History entries
    pub calculations: usize,
    /// Active mode
    pub mode: Mode,
    /// Memory register
    pub memory: f64,
    /// Variables held by the backend
    pub variables: usize,
}

/// Whole calculator state
#[derive(Debug)]
pub struct CalculatorState<B: MathBackend = NativeBackend> {
    display: InputBuffer,
    history: History,
    memory: Memory,
    mode: Mode,
    plot: PlotSeries,
    graph_range: GraphRange,
    backend: B,
    rng: StdRng,
}

impl Default for CalculatorState<NativeBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorState<NativeBackend> {
    /// Creates a calculator backed by [`NativeBackend`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(NativeBackend::new())
    }
}

impl<B: MathBackend> CalculatorState<B> {
    /// Creates a calculator on top of any backend
    #[must_use]
    pub fn with_backend(backend: B) -> Self {
        Self {
            display: InputBuffer::new(),
            history: History::new(),
            memory: Memory::new(),
            mode: Mode::default(),
            plot: PlotSeries::new(),
            graph_range: GraphRange::default(),
            backend,
            rng: StdRng::from_entropy(),
        }
    }

    /// Sets the history capacity
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = History::with_capacity(capacity);
        self
    }

    /// Sets the graph sampling range
    #[must_use]
    pub fn with_graph_range(mut self, range: GraphRange) -> Self {
        self.graph_range = range;
        self
    }

    /// Sets the starting mode
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Seeds the random number generator (for reproducible tests)
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the display text
    #[must_use]
    pub fn display(&self) -> &str {
        self.display.as_str()
    }

    /// Returns the history log
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the memory register value
    #[must_use]
    pub fn memory(&self) -> f64 {
        self.memory.value()
    }

    /// Returns the active mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the plotted series
    #[must_use]
    pub fn plot(&self) -> &PlotSeries {
        &self.plot
    }

    /// Returns the graph sampling range
    #[must_use]
    pub fn graph_range(&self) -> &GraphRange {
        &self.graph_range
    }

    /// Returns the backend
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Radix views of the current display
    #[must_use]
    pub fn radix_view(&self) -> RadixView {
        RadixView::of(self.display.as_str())
    }

    /// Statistics panel figures
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            calculations: self.history.len(),
            mode: self.mode,
            memory: self.memory.value(),
            variables: self.backend.variable_count(),
        }
    }

    /// Presses a panel button by id
    ///
    /// Returns the button's action so the caller can react to buttons that
    /// need more input (finance forms), or None for an unknown id.
    pub fn press(&mut self, id: &str) -> Option<ButtonAction> {
        let button = find_button(id)?;
        if let Some(action) = Action::from_button(button.action) {
            // Failures are already reflected in the display
            let _ = self.dispatch(action);
        }
        Some(button.action)
    }

    /// Applies an action
    ///
    /// The state is always updated: on failure the display shows the
    /// matching sentinel and the error is returned for logging or reporting.
    pub fn dispatch(&mut self, action: Action) -> Result<(), ActionError> {
        debug!(?action, mode = %self.mode, display = self.display.as_str(), "dispatch");

        match action {
            Action::Append(token) => self.display.append(&token),
            Action::SetDisplay(text) => self.display.set(text),
            Action::Clear => self.display.clear(),
            Action::DeleteLast => self.display.delete_last(),
            Action::Evaluate => return self.evaluate(),
            Action::SetMode(mode) => self.mode = mode,
            Action::SelectHistory(index) => {
                if let Some(entry) = self.history.get(index) {
                    let expression = entry.expression.clone();
                    self.display.set(expression);
                }
            }
            Action::MemoryStore => self.memory.store(self.display.as_str()),
            Action::MemoryRecall => self.display.set(self.memory.recall()),
            Action::MemoryAdd => self.memory.add(self.display.as_str()),
            Action::MemoryClear => self.memory.clear(),
            Action::Random => {
                let value: f64 = self.rng.gen();
                self.display.set(format_number(value));
            }
            Action::AppendAnswer => self.display.append(ANS),
            Action::GenerateGraph => return self.generate_graph(),
            Action::Derivative => return self.derivative(),
            Action::Finance(request) => return self.finance(&request),
            Action::SubmitFinanceForm(form) => return self.finance(&form.to_request()),
            Action::ConvertUnit { from, to } => return self.convert_unit(from, to),
        }
        Ok(())
    }

    fn evaluate(&mut self) -> Result<(), ActionError> {
        let expression = self.display.as_str().to_string();
        match self.backend.evaluate(&expression) {
            Ok(value) => {
                let result = value.to_string();
                self.history.record(&expression, &result);
                self.display.set(result);
                Ok(())
            }
            Err(err) => {
                warn!(%err, expression, "evaluation failed");
                self.display.set(buffer::ERROR);
                Err(err.into())
            }
        }
    }

    fn generate_graph(&mut self) -> Result<(), ActionError> {
        match self
            .backend
            .compile(self.display.as_str(), FUNCTION_VARIABLE)
        {
            Ok(compiled) => {
                self.plot.generate(&compiled, &self.graph_range);
                debug!(points = self.plot.points().len(), "graph generated");
                Ok(())
            }
            Err(err) => {
                warn!(%err, expression = self.display.as_str(), "graph compile failed");
                self.plot.clear();
                self.display.set(buffer::INVALID_GRAPH);
                Err(err.into())
            }
        }
    }

    fn derivative(&mut self) -> Result<(), ActionError> {
        let expression = self.display.as_str().to_string();
        match self.backend.differentiate(&expression, FUNCTION_VARIABLE) {
            Ok(derivative) => {
                self.history
                    .record(&format!("d/dx({expression})"), &derivative);
                self.display.set(derivative);
                Ok(())
            }
            Err(err) => {
                warn!(%err, expression, "derivative failed");
                self.display.set(buffer::INVALID_DERIVATIVE);
                Err(err.into())
            }
        }
    }

    fn finance(&mut self, request: &FinanceRequest) -> Result<(), ActionError> {
        match request.calculate() {
            Ok(amount) => {
                self.display.set(format_amount(amount));
                Ok(())
            }
            Err(err) => {
                warn!(%err, ?request, "finance calculation rejected");
                self.display.set(buffer::ERROR);
                Err(err.into())
            }
        }
    }

    fn convert_unit(&mut self, from: Unit, to: Unit) -> Result<(), ActionError> {
        let text = self.display.as_str();
        let result = parse_float_prefix(text)
            .ok_or_else(|| UnitError::NotANumber(text.to_string()))
            .and_then(|value| convert(value, from, to));

        match result {
            Ok(value) => {
                self.display.set(format_number(value));
                Ok(())
            }
            Err(err) => {
                warn!(%err, "unit conversion failed");
                self.display.set(buffer::ERROR);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::core::finance::{CompoundInterestRequest, FinanceKind, LoanPaymentRequest};

    fn state_with(display: &str) -> CalculatorState {
        let mut state = CalculatorState::new();
        state.dispatch(Action::SetDisplay(display.into())).unwrap();
        state
    }

    // ===== Input tests =====

    #[test]
    fn test_initial_state() {
        let state = CalculatorState::new();
        assert_eq!(state.display(), "0");
        assert!(state.history().is_empty());
        assert_eq!(state.memory(), 0.0);
        assert_eq!(state.mode(), Mode::Basic);
        assert!(!state.plot().is_visible());
    }

    #[test]
    fn test_append_clear_delete() {
        let mut state = CalculatorState::new();
        state.dispatch(Action::Append("1".into())).unwrap();
        state.dispatch(Action::Append("2".into())).unwrap();
        assert_eq!(state.display(), "12");
        state.dispatch(Action::DeleteLast).unwrap();
        assert_eq!(state.display(), "1");
        state.dispatch(Action::Clear).unwrap();
        assert_eq!(state.display(), "0");
    }

    // ===== Evaluate tests =====

    #[test]
    fn test_evaluate_success_records_history() {
        let mut state = state_with("2+3*4");
        state.dispatch(Action::Evaluate).unwrap();
        assert_eq!(state.display(), "14");
        let entry = state.history().latest().unwrap();
        assert_eq!(entry.expression, "2+3*4");
        assert_eq!(entry.result, "14");
    }

    #[test]
    fn test_evaluate_failure_shows_error() {
        let mut state = state_with("2+");
        let result = state.dispatch(Action::Evaluate);
        assert!(matches!(result, Err(ActionError::Calc(CalcError::ParseError(_)))));
        assert_eq!(state.display(), "Error");
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_evaluate_malformed_numbers_show_error() {
        for input in ["1.2.3", "1..2", "2 3"] {
            let mut state = state_with(input);
            assert!(state.dispatch(Action::Evaluate).is_err(), "{input}");
            assert_eq!(state.display(), "Error", "{input}");
            assert!(state.history().is_empty(), "{input}");
        }
    }

    #[test]
    fn test_double_decimal_press_is_an_error() {
        let mut state = CalculatorState::new();
        for id in ["digit-1", "decimal", "decimal", "digit-2", "equals"] {
            state.press(id);
        }
        assert_eq!(state.display(), "Error");
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_evaluate_then_append_replaces_error() {
        let mut state = state_with("1/0");
        assert!(state.dispatch(Action::Evaluate).is_err());
        state.dispatch(Action::Append("7".into())).unwrap();
        assert_eq!(state.display(), "7");
    }

    #[test]
    fn test_evaluate_text_result() {
        let mut state = state_with("hex(255)");
        state.dispatch(Action::Evaluate).unwrap();
        assert_eq!(state.display(), "0xff");
    }

    #[test]
    fn test_answer_chaining() {
        let mut state = state_with("6*7");
        state.dispatch(Action::Evaluate).unwrap();
        state.dispatch(Action::Append("+".into())).unwrap();
        state.dispatch(Action::AppendAnswer).unwrap();
        assert_eq!(state.display(), "42+ans");
        state.dispatch(Action::Evaluate).unwrap();
        assert_eq!(state.display(), "84");
    }

    #[test]
    fn test_history_capacity_applies() {
        let mut state = CalculatorState::new().with_history_capacity(2);
        for expr in ["1", "2", "3"] {
            state.dispatch(Action::SetDisplay(expr.into())).unwrap();
            state.dispatch(Action::Evaluate).unwrap();
        }
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history().latest().unwrap().expression, "3");
    }

    #[test]
    fn test_select_history() {
        let mut state = state_with("5*5");
        state.dispatch(Action::Evaluate).unwrap();
        state.dispatch(Action::SelectHistory(0)).unwrap();
        assert_eq!(state.display(), "5*5");
        state.dispatch(Action::SelectHistory(9)).unwrap();
        assert_eq!(state.display(), "5*5");
        assert_eq!(state.history().len(), 1);
    }

    // ===== Mode tests =====

    #[test]
    fn test_set_mode_preserves_everything_else() {
        let mut state = state_with("9");
        state.dispatch(Action::MemoryStore).unwrap();
        state.dispatch(Action::Evaluate).unwrap();
        state.dispatch(Action::SetMode(Mode::Programming)).unwrap();
        assert_eq!(state.mode(), Mode::Programming);
        assert_eq!(state.display(), "9");
        assert_eq!(state.memory(), 9.0);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_radix_view_follows_display() {
        let state = state_with("10");
        assert_eq!(state.radix_view().binary, "1010");
        assert_eq!(CalculatorState::new().radix_view().hex, "0");
    }

    // ===== Memory / random tests =====

    #[test]
    fn test_memory_round_trip() {
        let mut state = state_with("12.5");
        state.dispatch(Action::MemoryStore).unwrap();
        state.dispatch(Action::Clear).unwrap();
        state.dispatch(Action::MemoryRecall).unwrap();
        assert_eq!(state.display(), "12.5");
        state.dispatch(Action::MemoryAdd).unwrap();
        assert_eq!(state.memory(), 25.0);
        state.dispatch(Action::MemoryClear).unwrap();
        assert_eq!(state.memory(), 0.0);
    }

    #[test]
    fn test_random_in_unit_interval() {
        let mut state = CalculatorState::new().with_seed(7);
        for _ in 0..50 {
            state.dispatch(Action::Random).unwrap();
            let value = parse_float_prefix(state.display()).unwrap();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let mut a = CalculatorState::new().with_seed(42);
        let mut b = CalculatorState::new().with_seed(42);
        a.dispatch(Action::Random).unwrap();
        b.dispatch(Action::Random).unwrap();
        assert_eq!(a.display(), b.display());
    }

    // ===== Graph tests =====

    #[test]
    fn test_generate_graph() {
        let mut state = state_with("x^2");
        state.dispatch(Action::GenerateGraph).unwrap();
        assert!(state.plot().is_visible());
        assert_eq!(state.plot().points().len(), 41);
        assert_eq!(state.display(), "x^2");
    }

    #[test]
    fn test_generate_graph_invalid() {
        let mut state = state_with("x^2");
        state.dispatch(Action::GenerateGraph).unwrap();
        state.dispatch(Action::SetDisplay("+++".into())).unwrap();
        assert!(state.dispatch(Action::GenerateGraph).is_err());
        assert_eq!(state.display(), "Invalid function for graphing");
        assert!(state.plot().points().is_empty());
        assert!(!state.plot().is_visible());
    }

    #[test]
    fn test_graph_range_is_configurable() {
        let mut state = state_with("x").with_graph_range(GraphRange {
            start: 0.0,
            end: 2.0,
            step: 1.0,
        });
        state.dispatch(Action::GenerateGraph).unwrap();
        assert_eq!(state.plot().points().len(), 3);
    }

    // ===== Derivative tests =====

    #[test]
    fn test_derivative() {
        let mut state = state_with("x^2");
        state.dispatch(Action::Derivative).unwrap();
        assert_eq!(state.display(), "2 * x");
        let entry = state.history().latest().unwrap();
        assert_eq!(entry.expression, "d/dx(x^2)");
        assert_eq!(entry.result, "2 * x");
    }

    #[test]
    fn test_derivative_failure() {
        let mut state = state_with("x^");
        assert!(state.dispatch(Action::Derivative).is_err());
        assert_eq!(state.display(), "Enter valid function with x");
        assert!(state.history().is_empty());
    }

    // ===== Finance tests =====

    #[test]
    fn test_finance_compound() {
        let mut state = CalculatorState::new();
        state
            .dispatch(Action::Finance(FinanceRequest::CompoundInterest(
                CompoundInterestRequest {
                    principal: 1000.0,
                    rate: 0.05,
                    years: 1.0,
                    compounds_per_year: 12.0,
                },
            )))
            .unwrap();
        assert_eq!(state.display(), "1051.16");
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_finance_invalid_term() {
        let mut state = CalculatorState::new();
        let result = state.dispatch(Action::Finance(FinanceRequest::LoanPayment(
            LoanPaymentRequest {
                principal: 1000.0,
                annual_rate: 0.05,
                months: 0.0,
            },
        )));
        assert!(matches!(result, Err(ActionError::Finance(_))));
        assert_eq!(state.display(), "Error");
    }

    #[test]
    fn test_submit_finance_form() {
        let mut state = CalculatorState::new();
        let form = FinanceForm::with_fields(FinanceKind::LoanPayment, &["1200", "0", "12"]);
        state.dispatch(Action::SubmitFinanceForm(form)).unwrap();
        assert_eq!(state.display(), "100.00");
    }

    // ===== Unit tests =====

    #[test]
    fn test_convert_unit() {
        let mut state = state_with("1");
        state
            .dispatch(Action::ConvertUnit {
                from: Unit::Kilometer,
                to: Unit::Meter,
            })
            .unwrap();
        assert_eq!(state.display(), "1000");
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_convert_unit_errors() {
        let mut state = state_with("abc");
        let result = state.dispatch(Action::ConvertUnit {
            from: Unit::Meter,
            to: Unit::Foot,
        });
        assert!(matches!(result, Err(ActionError::Unit(UnitError::NotANumber(_)))));
        assert_eq!(state.display(), "Error");

        let mut state = state_with("1");
        let result = state.dispatch(Action::ConvertUnit {
            from: Unit::Meter,
            to: Unit::Kelvin,
        });
        assert!(matches!(result, Err(ActionError::Unit(UnitError::Incompatible { .. }))));
    }

    // ===== Button tests =====

    #[test]
    fn test_press_buttons() {
        let mut state = CalculatorState::new();
        for id in ["digit-7", "multiply", "digit-6", "equals"] {
            assert!(state.press(id).is_some());
        }
        assert_eq!(state.display(), "42");
        assert_eq!(state.press("nope"), None);
    }

    #[test]
    fn test_press_finance_button_returns_form_kind() {
        let mut state = CalculatorState::new();
        assert_eq!(
            state.press("loan-payment"),
            Some(ButtonAction::OpenFinanceForm(FinanceKind::LoanPayment))
        );
        assert_eq!(state.display(), "0");
    }

    #[test]
    fn test_stats() {
        let mut state = state_with("2");
        state.dispatch(Action::Evaluate).unwrap();
        state.dispatch(Action::MemoryStore).unwrap();
        let stats = state.stats();
        assert_eq!(stats.calculations, 1);
        assert_eq!(stats.mode, Mode::Basic);
        assert_eq!(stats.memory, 2.0);
        assert_eq!(stats.variables, 1);
    }
}
