//! Keyboard input handling
//!
//! Error prevention: keys map to a closed set of [`KeyAction`]s; what an
//! action means (display edit or form edit) is decided by the app.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::mode::Mode;

/// Actions that can be triggered by keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Type a character
    InsertChar(char),
    /// Delete the last character
    Backspace,
    /// Evaluate, or submit an open form
    Evaluate,
    /// Clear the display, or close an open form
    Cancel,
    /// Switch to the next mode
    NextMode,
    /// Switch to the previous mode
    PrevMode,
    /// Switch to a specific mode
    SelectMode(Mode),
    /// Move the selection up (history or form field)
    Up,
    /// Move the selection down (history or form field)
    Down,
    /// Focus the previous panel button
    FocusPrev,
    /// Focus the next panel button
    FocusNext,
    /// Press the focused panel button
    PressFocused,
    /// Plot the display
    Graph,
    /// Differentiate the display
    Derivative,
    /// Quit the application
    Quit,
    /// No action (ignored input)
    None,
}

/// Input handler that maps key events to actions
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Creates a new input handler
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Maps a key event to an action
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> KeyAction {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        if modifiers.contains(KeyModifiers::CONTROL) {
            return match code {
                KeyCode::Char('c' | 'q') => KeyAction::Quit,
                KeyCode::Char('g') => KeyAction::Graph,
                KeyCode::Char('d') => KeyAction::Derivative,
                KeyCode::Char('b') => KeyAction::PressFocused,
                KeyCode::Char('u') => KeyAction::Cancel,
                _ => KeyAction::None,
            };
        }

        match code {
            KeyCode::Char(c) => KeyAction::InsertChar(c),
            KeyCode::Backspace => KeyAction::Backspace,
            KeyCode::Enter => KeyAction::Evaluate,
            KeyCode::Esc => KeyAction::Cancel,
            KeyCode::Tab => KeyAction::NextMode,
            KeyCode::BackTab => KeyAction::PrevMode,
            KeyCode::F(n) => Mode::ALL
                .get(usize::from(n).wrapping_sub(1))
                .map_or(KeyAction::None, |mode| KeyAction::SelectMode(*mode)),
            KeyCode::Up => KeyAction::Up,
            KeyCode::Down => KeyAction::Down,
            KeyCode::Left => KeyAction::FocusPrev,
            KeyCode::Right => KeyAction::FocusNext,
            _ => KeyAction::None,
        }
    }

    /// Returns true if the character may be typed into the display
    #[must_use]
    pub fn is_valid_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || "+-*/%^&|~!<>()., ".contains(c)
    }
}
