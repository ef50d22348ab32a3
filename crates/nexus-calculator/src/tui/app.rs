//! TUI application state
//!
//! Wraps a [`CalculatorState`] with the bits only the terminal needs: the
//! button grid, an optional finance form and the history selection.

use ratatui::layout::Rect;

use crate::core::finance::FinanceForm;
use crate::core::mode::{ButtonAction, Mode};
use crate::core::state::{Action, CalculatorState};

use super::input::{InputHandler, KeyAction};
use super::keypad::Keypad;

/// Calculator application state
#[derive(Debug)]
pub struct CalculatorApp {
    state: CalculatorState,
    keypad: Keypad,
    form: Option<FinanceForm>,
    selected_history: Option<usize>,
    last_error: Option<String>,
    should_quit: bool,
}

impl Default for CalculatorApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorApp {
    /// Creates an app with a default calculator
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(CalculatorState::new())
    }

    /// Creates an app around an existing calculator
    #[must_use]
    pub fn with_state(state: CalculatorState) -> Self {
        Self {
            keypad: Keypad::for_mode(state.mode()),
            state,
            form: None,
            selected_history: None,
            last_error: None,
            should_quit: false,
        }
    }

    /// Returns the calculator state
    #[must_use]
    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    /// Returns the button grid for the active mode
    #[must_use]
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Returns the open finance form, if any
    #[must_use]
    pub fn form(&self) -> Option<&FinanceForm> {
        self.form.as_ref()
    }

    /// Index of the highlighted history entry
    #[must_use]
    pub fn selected_history(&self) -> Option<usize> {
        self.selected_history
    }

    /// Message from the last failed action
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns whether the app should quit
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Sets the quit flag
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Sends an action to the calculator and keeps the grid in sync with the mode
    pub fn dispatch(&mut self, action: Action) {
        let mode_before = self.state.mode();
        let records = matches!(action, Action::Evaluate | Action::Derivative);
        self.last_error = self.state.dispatch(action).err().map(|e| e.to_string());
        // A new entry shifts every index
        if records && self.last_error.is_none() {
            self.selected_history = None;
        }
        if self.state.mode() != mode_before {
            self.keypad = Keypad::for_mode(self.state.mode());
            self.form = None;
        }
    }

    /// Switches mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.dispatch(Action::SetMode(mode));
    }

    /// Presses the button at `index` in the grid
    pub fn press_button(&mut self, index: usize) {
        let Some(button) = self.keypad.get_button(index) else {
            return;
        };
        match button.action {
            ButtonAction::OpenFinanceForm(kind) => self.form = Some(FinanceForm::new(kind)),
            action => {
                if let Some(action) = Action::from_button(action) {
                    self.dispatch(action);
                }
            }
        }
    }

    /// Presses the button under a mouse click, if any
    pub fn click(&mut self, keypad_area: Rect, x: u16, y: u16) {
        if let Some(index) = self.keypad.hit_test(keypad_area, x, y) {
            self.press_button(index);
        }
    }

    /// Applies a key action
    pub fn handle_key(&mut self, key: KeyAction) {
        if self.form.is_some() && self.handle_form_key(key) {
            return;
        }

        match key {
            KeyAction::InsertChar(c) if InputHandler::is_valid_char(c) => {
                self.dispatch(Action::Append(c.to_string()));
            }
            KeyAction::Backspace => self.dispatch(Action::DeleteLast),
            KeyAction::Evaluate => self.dispatch(Action::Evaluate),
            KeyAction::Cancel => self.dispatch(Action::Clear),
            KeyAction::NextMode => self.set_mode(self.state.mode().next()),
            KeyAction::PrevMode => self.set_mode(self.state.mode().prev()),
            KeyAction::SelectMode(mode) => self.set_mode(mode),
            KeyAction::Up => self.move_history(true),
            KeyAction::Down => self.move_history(false),
            KeyAction::FocusPrev => self.keypad.focus_prev(),
            KeyAction::FocusNext => self.keypad.focus_next(),
            KeyAction::PressFocused => self.press_button(self.keypad.focus()),
            KeyAction::Graph => self.dispatch(Action::GenerateGraph),
            KeyAction::Derivative => self.dispatch(Action::Derivative),
            KeyAction::Quit => self.quit(),
            KeyAction::InsertChar(_) | KeyAction::None => {}
        }
    }

    /// Form editing keys; returns false for keys the form does not consume
    fn handle_form_key(&mut self, key: KeyAction) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        match key {
            KeyAction::InsertChar(c) => form.push_char(c),
            KeyAction::Backspace => form.pop_char(),
            KeyAction::Up => form.focus_prev(),
            KeyAction::Down => form.focus_next(),
            KeyAction::Cancel => self.form = None,
            KeyAction::Evaluate => {
                if let Some(form) = self.form.take() {
                    self.dispatch(Action::SubmitFinanceForm(form));
                }
            }
            _ => return false,
        }
        true
    }

    /// Moves the history selection and loads the entry into the display
    fn move_history(&mut self, older: bool) {
        let len = self.state.history().len();
        if len == 0 {
            self.selected_history = None;
            return;
        }
        let next = match (self.selected_history, older) {
            (None, true) => 0,
            (None, false) => return,
            (Some(i), true) => (i + 1).min(len - 1),
            (Some(0), false) => {
                self.selected_history = None;
                return;
            }
            (Some(i), false) => (i - 1).min(len - 1),
        };
        self.selected_history = Some(next);
        self.dispatch(Action::SelectHistory(next));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::finance::FinanceKind;

    fn type_str(app: &mut CalculatorApp, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyAction::InsertChar(c));
        }
    }

    // ===== Constructor tests =====

    #[test]
    fn test_app_new() {
        let app = CalculatorApp::new();
        assert_eq!(app.state().display(), "0");
        assert!(app.form().is_none());
        assert!(app.last_error().is_none());
        assert!(app.selected_history().is_none());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_with_state_uses_mode_keypad() {
        let app = CalculatorApp::with_state(CalculatorState::new().with_mode(Mode::Unit));
        assert!(app.keypad().find_button("km-to-m").is_some());
    }

    // ===== Typing tests =====

    #[test]
    fn test_type_and_evaluate() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "2+3");
        assert_eq!(app.state().display(), "2+3");
        app.handle_key(KeyAction::Evaluate);
        assert_eq!(app.state().display(), "5");
        assert!(app.last_error().is_none());
    }

    #[test]
    fn test_invalid_chars_ignored() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "=$#");
        assert_eq!(app.state().display(), "0");
    }

    #[test]
    fn test_error_is_reported() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "2+");
        app.handle_key(KeyAction::Evaluate);
        assert_eq!(app.state().display(), "Error");
        assert!(app.last_error().is_some());
        app.handle_key(KeyAction::Cancel);
        assert_eq!(app.state().display(), "0");
        assert!(app.last_error().is_none());
    }

    #[test]
    fn test_backspace() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "12");
        app.handle_key(KeyAction::Backspace);
        assert_eq!(app.state().display(), "1");
    }

    // ===== Mode tests =====

    #[test]
    fn test_mode_cycle_rebuilds_keypad() {
        let mut app = CalculatorApp::new();
        app.handle_key(KeyAction::NextMode);
        assert_eq!(app.state().mode(), Mode::Scientific);
        assert!(app.keypad().find_button("sin").is_some());
        app.handle_key(KeyAction::PrevMode);
        app.handle_key(KeyAction::PrevMode);
        assert_eq!(app.state().mode(), Mode::Ai);
        app.handle_key(KeyAction::SelectMode(Mode::Programming));
        assert!(app.keypad().find_button("xor").is_some());
    }

    // ===== Button tests =====

    #[test]
    fn test_press_buttons_by_index() {
        let mut app = CalculatorApp::new();
        for id in ["digit-9", "multiply", "digit-9", "equals"] {
            let index = app.keypad().find_button(id).unwrap();
            app.press_button(index);
        }
        assert_eq!(app.state().display(), "81");
    }

    #[test]
    fn test_focus_and_press() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "5");
        // focus starts on "clear"
        app.handle_key(KeyAction::PressFocused);
        assert_eq!(app.state().display(), "0");
        app.handle_key(KeyAction::FocusPrev);
        app.handle_key(KeyAction::PressFocused);
        assert_eq!(app.state().display(), "1.618");
    }

    #[test]
    fn test_click_presses_button() {
        let mut app = CalculatorApp::new();
        let (rows, _) = app.keypad().dimensions();
        let area = Rect::new(0, 0, 42, rows as u16 + 2);
        // row 1, col 0 is "7"
        app.click(area, 1, 2);
        assert_eq!(app.state().display(), "7");
        app.click(area, 0, 0);
        assert_eq!(app.state().display(), "7");
    }

    #[test]
    fn test_graph_and_derivative_keys() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Graphing);
        type_str(&mut app, "x^2");
        app.handle_key(KeyAction::Graph);
        assert!(app.state().plot().is_visible());
        app.handle_key(KeyAction::Derivative);
        assert_eq!(app.state().display(), "2 * x");
    }

    // ===== Finance form tests =====

    #[test]
    fn test_finance_form_flow() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Finance);
        let index = app.keypad().find_button("loan-payment").unwrap();
        app.press_button(index);
        assert_eq!(app.form().unwrap().kind(), FinanceKind::LoanPayment);

        type_str(&mut app, "1200");
        app.handle_key(KeyAction::Down);
        type_str(&mut app, "0");
        app.handle_key(KeyAction::Down);
        type_str(&mut app, "12");
        assert_eq!(app.state().display(), "0");

        app.handle_key(KeyAction::Evaluate);
        assert!(app.form().is_none());
        assert_eq!(app.state().display(), "100.00");
    }

    #[test]
    fn test_finance_form_cancel_and_edit() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Finance);
        app.press_button(app.keypad().find_button("compound-interest").unwrap());
        type_str(&mut app, "15");
        app.handle_key(KeyAction::Backspace);
        assert_eq!(app.form().unwrap().fields()[0], "1");
        app.handle_key(KeyAction::Up);
        assert_eq!(app.form().unwrap().focus(), 3);
        app.handle_key(KeyAction::Cancel);
        assert!(app.form().is_none());
        assert_eq!(app.state().display(), "0");
    }

    #[test]
    fn test_finance_form_passes_through_mode_switch() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Finance);
        app.press_button(app.keypad().find_button("loan-payment").unwrap());
        app.handle_key(KeyAction::NextMode);
        assert_eq!(app.state().mode(), Mode::Unit);
        assert!(app.form().is_none());
    }

    #[test]
    fn test_finance_form_invalid_shows_error() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Finance);
        app.press_button(app.keypad().find_button("loan-payment").unwrap());
        app.handle_key(KeyAction::Evaluate);
        assert_eq!(app.state().display(), "Error");
        assert!(app.last_error().is_some());
    }

    // ===== History tests =====

    #[test]
    fn test_history_navigation() {
        let mut app = CalculatorApp::new();
        for expr in ["1+1", "2+2"] {
            type_str(&mut app, expr);
            app.handle_key(KeyAction::Evaluate);
            app.handle_key(KeyAction::Cancel);
        }
        app.handle_key(KeyAction::Up);
        assert_eq!(app.selected_history(), Some(0));
        assert_eq!(app.state().display(), "2+2");
        app.handle_key(KeyAction::Up);
        app.handle_key(KeyAction::Up);
        assert_eq!(app.selected_history(), Some(1));
        assert_eq!(app.state().display(), "1+1");
        app.handle_key(KeyAction::Down);
        assert_eq!(app.selected_history(), Some(0));
        app.handle_key(KeyAction::Down);
        assert_eq!(app.selected_history(), None);
        app.handle_key(KeyAction::Down);
        assert_eq!(app.selected_history(), None);
    }

    #[test]
    fn test_history_selection_resets_after_new_entry() {
        let mut app = CalculatorApp::new();
        for expr in ["1+1", "2+2"] {
            type_str(&mut app, expr);
            app.handle_key(KeyAction::Evaluate);
            app.handle_key(KeyAction::Cancel);
        }
        app.handle_key(KeyAction::Up);
        app.handle_key(KeyAction::Up);
        assert_eq!(app.selected_history(), Some(1));

        app.handle_key(KeyAction::Cancel);
        type_str(&mut app, "3+3");
        app.handle_key(KeyAction::Evaluate);
        assert_eq!(app.selected_history(), None);

        app.handle_key(KeyAction::Up);
        assert_eq!(app.selected_history(), Some(0));
        assert_eq!(app.state().display(), "3+3");
    }

    #[test]
    fn test_history_selection_kept_after_failed_evaluate() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "1+1");
        app.handle_key(KeyAction::Evaluate);
        app.handle_key(KeyAction::Up);
        app.handle_key(KeyAction::Cancel);
        type_str(&mut app, "2+");
        app.handle_key(KeyAction::Evaluate);
        assert!(app.last_error().is_some());
        assert_eq!(app.selected_history(), Some(0));
    }

    #[test]
    fn test_history_navigation_empty() {
        let mut app = CalculatorApp::new();
        app.handle_key(KeyAction::Up);
        assert_eq!(app.selected_history(), None);
    }

    #[test]
    fn test_quit() {
        let mut app = CalculatorApp::new();
        app.handle_key(KeyAction::Quit);
        assert!(app.should_quit());
    }
}
