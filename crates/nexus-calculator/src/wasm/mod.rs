//! Browser front end
//!
//! [`ViewModel`] is always compiled so the page model is tested natively;
//! the wasm-bindgen wrapper needs the `wasm` feature.

#[cfg(feature = "wasm")]
mod browser;
mod view;

#[cfg(feature = "wasm")]
pub use browser::{init, BrowserCalculator};
pub use view::{ButtonView, ViewModel};
