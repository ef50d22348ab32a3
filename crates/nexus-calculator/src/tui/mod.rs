//! Terminal front end
//!
//! Visual feedback through the terminal: mode tabs, display, button grid,
//! history, statistics and a braille chart for graphing mode.

mod app;
mod input;
mod keypad;
mod ui;

pub use app::CalculatorApp;
pub use input::{InputHandler, KeyAction};
pub use keypad::{Keypad, KeypadWidget};
pub use ui::{render, CalculatorUI, ScreenLayout};
