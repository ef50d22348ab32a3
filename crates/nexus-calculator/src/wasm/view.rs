//! Serializable snapshot of everything the browser page renders
//!
//! The page is a thin renderer over this model, so the whole browser
//! surface can be tested natively without a DOM.

use serde::Serialize;

use crate::core::graph::PlotSeries;
use crate::core::history::HistoryEntry;
use crate::core::mode::{Mode, PanelButton, COMMON_PANEL, CONSTANTS_PANEL};
use crate::core::radix::RadixView;
use crate::core::state::{CalculatorState, Stats};

/// One button the page should draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    /// Element id
    pub id: &'static str,
    /// Button text
    pub label: &'static str,
}

impl From<&PanelButton> for ButtonView {
    fn from(button: &PanelButton) -> Self {
        Self {
            id: button.id,
            label: button.label,
        }
    }
}

/// Page model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    /// Display text
    pub display: String,
    /// Active mode
    pub mode: Mode,
    /// Heading for the active mode
    pub mode_name: &'static str,
    /// Tabs, in order
    pub modes: Vec<&'static str>,
    /// Active mode's panel
    pub panel: Vec<ButtonView>,
    /// Memory and constant buttons shown in every mode
    pub shared: Vec<ButtonView>,
    /// History, newest first
    pub history: Vec<HistoryEntry>,
    /// Radix views (programming mode only)
    pub radix: Option<RadixView>,
    /// Statistics panel
    pub stats: Stats,
    /// Plotted series (graphing mode only)
    pub plot: Option<PlotSeries>,
}

impl ViewModel {
    /// Builds the model for the current state
    #[must_use]
    pub fn of(state: &CalculatorState) -> Self {
        let mode = state.mode();
        Self {
            display: state.display().to_string(),
            mode,
            mode_name: mode.name(),
            modes: Mode::ALL.iter().map(|m| m.key()).collect(),
            panel: mode.panel().iter().map(ButtonView::from).collect(),
            shared: COMMON_PANEL
                .iter()
                .chain(CONSTANTS_PANEL)
                .map(ButtonView::from)
                .collect(),
            history: state.history().iter().cloned().collect(),
            radix: (mode == Mode::Programming).then(|| state.radix_view()),
            stats: state.stats(),
            plot: (mode == Mode::Graphing).then(|| state.plot().clone()),
        }
    }

    /// Serializes the model to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
