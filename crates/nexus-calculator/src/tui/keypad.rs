//! Button panel for the TUI
//!
//! Lays the active mode's buttons out in a grid, followed by the memory and
//! constant buttons every mode shares. Buttons can be clicked with the mouse
//! or focused with the arrow keys and pressed.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::core::mode::{ButtonAction, Mode, PanelButton, COMMON_PANEL, CONSTANTS_PANEL};

/// Button grid for one mode
#[derive(Debug, Clone)]
pub struct Keypad {
    /// Buttons in row-major order
    buttons: Vec<&'static PanelButton>,
    cols: usize,
    rows: usize,
    focus: usize,
}

impl Default for Keypad {
    fn default() -> Self {
        Self::for_mode(Mode::default())
    }
}

impl Keypad {
    /// Creates the grid for a mode
    #[must_use]
    pub fn for_mode(mode: Mode) -> Self {
        let buttons: Vec<_> = mode
            .panel()
            .iter()
            .chain(COMMON_PANEL)
            .chain(CONSTANTS_PANEL)
            .collect();
        let cols = mode.columns().max(1);
        let rows = buttons.len().div_ceil(cols);
        Self {
            buttons,
            cols,
            rows,
            focus: 0,
        }
    }

    /// Returns the number of buttons
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Returns the grid dimensions (rows, cols)
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Gets a button by index
    #[must_use]
    pub fn get_button(&self, index: usize) -> Option<&'static PanelButton> {
        self.buttons.get(index).copied()
    }

    /// Gets a button by row and column
    #[must_use]
    pub fn get_button_at(&self, row: usize, col: usize) -> Option<&'static PanelButton> {
        if row < self.rows && col < self.cols {
            self.get_button(row * self.cols + col)
        } else {
            None
        }
    }

    /// Finds a button's index by id
    #[must_use]
    pub fn find_button(&self, id: &str) -> Option<usize> {
        self.buttons.iter().position(|b| b.id == id)
    }

    /// Index of the focused button
    #[must_use]
    pub const fn focus(&self) -> usize {
        self.focus
    }

    /// Returns the focused button
    #[must_use]
    pub fn focused(&self) -> Option<&'static PanelButton> {
        self.get_button(self.focus)
    }

    /// Focuses the next button, wrapping
    pub fn focus_next(&mut self) {
        if !self.buttons.is_empty() {
            self.focus = (self.focus + 1) % self.buttons.len();
        }
    }

    /// Focuses the previous button, wrapping
    pub fn focus_prev(&mut self) {
        if !self.buttons.is_empty() {
            self.focus = (self.focus + self.buttons.len() - 1) % self.buttons.len();
        }
    }

    /// Returns an iterator over buttons with their (row, col) positions
    pub fn buttons_with_positions(
        &self,
    ) -> impl Iterator<Item = ((usize, usize), &'static PanelButton)> + '_ {
        self.buttons.iter().enumerate().map(move |(i, btn)| {
            let row = i / self.cols;
            let col = i % self.cols;
            ((row, col), *btn)
        })
    }

    /// Converts a click position to button index
    #[must_use]
    pub fn hit_test(&self, area: Rect, x: u16, y: u16) -> Option<usize> {
        if x < area.x || y < area.y || x >= area.x + area.width || y >= area.y + area.height {
            return None;
        }

        let rel_x = x - area.x;
        let rel_y = y - area.y;

        // Account for border (1 char on each side)
        if rel_x == 0 || rel_y == 0 || rel_x >= area.width - 1 || rel_y >= area.height - 1 {
            return None;
        }

        let inner_x = rel_x - 1;
        let inner_y = rel_y - 1;

        let btn_width = (area.width - 2) / self.cols as u16;
        let btn_height = (area.height - 2) / self.rows.max(1) as u16;

        if btn_width == 0 || btn_height == 0 {
            return None;
        }

        let col = (inner_x / btn_width) as usize;
        let row = (inner_y / btn_height) as usize;

        if row < self.rows && col < self.cols {
            let index = row * self.cols + col;
            (index < self.buttons.len()).then_some(index)
        } else {
            None
        }
    }
}

fn button_style(action: ButtonAction) -> Style {
    match action {
        ButtonAction::Append(token) if token.chars().all(|c| c.is_ascii_digit() || c == '.') => {
            Style::default().fg(Color::White)
        }
        ButtonAction::Append(_) => Style::default().fg(Color::Yellow),
        ButtonAction::Evaluate | ButtonAction::GenerateGraph | ButtonAction::Derivative => {
            Style::default().fg(Color::Green)
        }
        ButtonAction::Clear | ButtonAction::DeleteLast => Style::default().fg(Color::Red),
        ButtonAction::MemoryStore
        | ButtonAction::MemoryRecall
        | ButtonAction::MemoryAdd
        | ButtonAction::MemoryClear => Style::default().fg(Color::Magenta),
        _ => Style::default().fg(Color::Cyan),
    }
}

/// Keypad widget for rendering
#[derive(Debug)]
pub struct KeypadWidget<'a> {
    keypad: &'a Keypad,
}

impl<'a> KeypadWidget<'a> {
    /// Creates a new keypad widget
    #[must_use]
    pub fn new(keypad: &'a Keypad) -> Self {
        Self { keypad }
    }
}

impl Widget for KeypadWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .title(" Buttons ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .render(area, buf);

        let inner = Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        };

        let (rows, cols) = self.keypad.dimensions();
        if inner.width < cols as u16 || inner.height < rows as u16 {
            return;
        }

        let btn_width = inner.width / cols as u16;
        let btn_height = inner.height / rows as u16;

        for ((row, col), btn) in self.keypad.buttons_with_positions() {
            let x = inner.x + (col as u16 * btn_width);
            let y = inner.y + (row as u16 * btn_height);

            let focused = self.keypad.focused().is_some_and(|f| f.id == btn.id);
            let style = if focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                button_style(btn.action)
            };

            let label = format!("[{}]", btn.label);
            let width = label.chars().count() as u16;
            let label_x = x + btn_width.saturating_sub(width) / 2;
            let label_y = y + btn_height / 2;

            if label_y < inner.y + inner.height && label_x < inner.x + inner.width {
                buf.set_span(label_x, label_y, &Span::styled(label, style), btn_width);
            }
        }
    }
}
