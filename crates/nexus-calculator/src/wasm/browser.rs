//! Browser WASM bindings for the calculator
//!
//! Direct observation: the page renders [`ViewModel`] JSON and forwards
//! button ids and key presses back here.

use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::core::finance::{CompoundInterestRequest, FinanceRequest, LoanPaymentRequest};
use crate::core::mode::{ButtonAction, Mode};
use crate::core::state::{Action, CalculatorState};
use crate::core::units::Unit;
use crate::wasm::view::ViewModel;

/// Browser calculator - the main WASM entry point
#[derive(Debug)]
#[wasm_bindgen]
pub struct BrowserCalculator {
    state: CalculatorState,
}

#[wasm_bindgen]
impl BrowserCalculator {
    /// Create a new browser calculator
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            state: CalculatorState::new(),
        }
    }

    /// Current display text
    #[wasm_bindgen(getter)]
    pub fn display(&self) -> String {
        self.state.display().to_string()
    }

    /// Active mode key (`basic`, `scientific`, ...)
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.state.mode().key().to_string()
    }

    /// Press a panel button by element id
    ///
    /// Returns the finance form kind (`compound_interest` / `loan_payment`)
    /// when the button opens a form, so the page can show its inputs.
    pub fn press(&mut self, button_id: &str) -> Option<String> {
        match self.state.press(button_id)? {
            ButtonAction::OpenFinanceForm(kind) => serde_json::to_value(kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string)),
            _ => None,
        }
    }

    /// Append typed text
    pub fn append(&mut self, text: &str) {
        self.dispatch(Action::Append(text.to_string()));
    }

    /// Remove the last character
    pub fn backspace(&mut self) {
        self.dispatch(Action::DeleteLast);
    }

    /// Reset the display
    pub fn clear(&mut self) {
        self.dispatch(Action::Clear);
    }

    /// Evaluate the display and return the new display text
    pub fn evaluate(&mut self) -> String {
        self.dispatch(Action::Evaluate);
        self.display()
    }

    /// Switch mode by key; unknown keys are rejected
    pub fn set_mode(&mut self, key: &str) -> Result<(), JsValue> {
        let mode: Mode = key.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.dispatch(Action::SetMode(mode));
        Ok(())
    }

    /// Load a history entry's expression into the display
    pub fn select_history(&mut self, index: usize) {
        self.dispatch(Action::SelectHistory(index));
    }

    /// Compound interest; returns the display text
    pub fn compound_interest(
        &mut self,
        principal: f64,
        rate: f64,
        years: f64,
        compounds_per_year: f64,
    ) -> String {
        self.dispatch(Action::Finance(FinanceRequest::CompoundInterest(
            CompoundInterestRequest {
                principal,
                rate,
                years,
                compounds_per_year,
            },
        )));
        self.display()
    }

    /// Monthly loan payment; returns the display text
    pub fn loan_payment(&mut self, principal: f64, annual_rate: f64, months: f64) -> String {
        self.dispatch(Action::Finance(FinanceRequest::LoanPayment(
            LoanPaymentRequest {
                principal,
                annual_rate,
                months,
            },
        )));
        self.display()
    }

    /// Convert the displayed value between units given by symbol
    pub fn convert(&mut self, from: &str, to: &str) -> Result<String, JsValue> {
        let from: Unit = from.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        let to: Unit = to.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.dispatch(Action::ConvertUnit { from, to });
        Ok(self.display())
    }

    /// History as JSON, newest first
    pub fn history_json(&self) -> String {
        self.state
            .history()
            .to_json()
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// History as plain text, one entry per line
    pub fn export_history(&self) -> String {
        self.state.history().export_formatted()
    }

    /// Plotted points as JSON
    pub fn plot_json(&self) -> String {
        self.state
            .plot()
            .to_json()
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Whether the chart should be shown
    pub fn plot_visible(&self) -> bool {
        self.state.plot().is_visible()
    }

    /// Full page model as JSON
    pub fn view_json(&self) -> String {
        ViewModel::of(&self.state)
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }
}

impl BrowserCalculator {
    fn dispatch(&mut self, action: Action) {
        // Failures already show as display sentinels
        let _ = self.state.dispatch(action);
    }
}

impl Default for BrowserCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the calculator in the browser
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console::log_1(&"Nexus calculator initialized".into());
}
