//! Calculator modes and their button panels
//!
//! Error prevention: panels are static tables, so every button id maps to
//! exactly one action.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::finance::FinanceKind;
use crate::core::units::Unit;

/// Unknown mode name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown mode '{0}' (expected one of: basic, scientific, programming, graphing, finance, unit, ai)")]
pub struct ParseModeError(pub String);

/// Active calculator mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Digits and arithmetic
    #[default]
    Basic,
    /// Trigonometry, logarithms, roots
    Scientific,
    /// Bitwise operators and radix views
    Programming,
    /// Function plotting
    Graphing,
    /// Compound interest and loan payments
    Finance,
    /// Unit conversion
    Unit,
    /// Symbolic derivative
    Ai,
}

impl Mode {
    /// Every mode in tab order
    pub const ALL: [Self; 7] = [
        Self::Basic,
        Self::Scientific,
        Self::Programming,
        Self::Graphing,
        Self::Finance,
        Self::Unit,
        Self::Ai,
    ];

    /// Display name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Scientific => "Scientific",
            Self::Programming => "Programming",
            Self::Graphing => "Graphing",
            Self::Finance => "Finance",
            Self::Unit => "Unit Converter",
            Self::Ai => "AI Math",
        }
    }

    /// Lowercase key used in config files and on the command line
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Scientific => "scientific",
            Self::Programming => "programming",
            Self::Graphing => "graphing",
            Self::Finance => "finance",
            Self::Unit => "unit",
            Self::Ai => "ai",
        }
    }

    /// Position in [`Mode::ALL`]
    #[must_use]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }

    /// Next mode, wrapping
    #[must_use]
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous mode, wrapping
    #[must_use]
    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Buttons specific to this mode
    #[must_use]
    pub const fn panel(&self) -> &'static [PanelButton] {
        match self {
            Self::Basic => BASIC_PANEL,
            Self::Scientific => SCIENTIFIC_PANEL,
            Self::Programming => PROGRAMMING_PANEL,
            Self::Graphing => GRAPHING_PANEL,
            Self::Finance => FINANCE_PANEL,
            Self::Unit => UNIT_PANEL,
            Self::Ai => AI_PANEL,
        }
    }

    /// Column count the panel is laid out in
    #[must_use]
    pub const fn columns(&self) -> usize {
        match self {
            Self::Basic | Self::Scientific | Self::Unit => 4,
            Self::Programming => 3,
            Self::Graphing | Self::Finance | Self::Ai => 2,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.key() == key)
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

/// What pressing a panel button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Append text to the display
    Append(&'static str),
    /// Reset the display
    Clear,
    /// Remove the last character
    DeleteLast,
    /// Evaluate the display
    Evaluate,
    /// MS
    MemoryStore,
    /// MR
    MemoryRecall,
    /// M+
    MemoryAdd,
    /// MC
    MemoryClear,
    /// Random number in [0, 1)
    Random,
    /// Append `ans`
    AppendAnswer,
    /// Plot the display as a function of x
    GenerateGraph,
    /// Differentiate the display with respect to x
    Derivative,
    /// Open a finance input form
    OpenFinanceForm(FinanceKind),
    /// Convert the displayed value
    ConvertUnit {
        /// Source unit
        from: Unit,
        /// Target unit
        to: Unit,
    },
}

/// One button on a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelButton {
    /// Stable identifier, unique across all panels
    pub id: &'static str,
    /// Text on the button
    pub label: &'static str,
    /// Effect of pressing it
    pub action: ButtonAction,
}

const fn append(id: &'static str, label: &'static str, token: &'static str) -> PanelButton {
    PanelButton {
        id,
        label,
        action: ButtonAction::Append(token),
    }
}

const fn button(id: &'static str, label: &'static str, action: ButtonAction) -> PanelButton {
    PanelButton { id, label, action }
}

const fn convert(id: &'static str, label: &'static str, from: Unit, to: Unit) -> PanelButton {
    PanelButton {
        id,
        label,
        action: ButtonAction::ConvertUnit { from, to },
    }
}

/// Basic mode keypad
/// ```text
/// [ C ] [ ⌫ ] [ ( ] [ ) ]
/// [ 7 ] [ 8 ] [ 9 ] [ / ]
/// [ 4 ] [ 5 ] [ 6 ] [ * ]
/// [ 1 ] [ 2 ] [ 3 ] [ - ]
/// [ 0 ] [ . ] [ + ] [ = ]
/// ```
pub const BASIC_PANEL: &[PanelButton] = &[
    button("clear", "C", ButtonAction::Clear),
    button("backspace", "⌫", ButtonAction::DeleteLast),
    append("open-paren", "(", "("),
    append("close-paren", ")", ")"),
    append("digit-7", "7", "7"),
    append("digit-8", "8", "8"),
    append("digit-9", "9", "9"),
    append("divide", "/", "/"),
    append("digit-4", "4", "4"),
    append("digit-5", "5", "5"),
    append("digit-6", "6", "6"),
    append("multiply", "*", "*"),
    append("digit-1", "1", "1"),
    append("digit-2", "2", "2"),
    append("digit-3", "3", "3"),
    append("subtract", "-", "-"),
    append("digit-0", "0", "0"),
    append("decimal", ".", "."),
    append("add", "+", "+"),
    button("equals", "=", ButtonAction::Evaluate),
];

/// Scientific functions
pub const SCIENTIFIC_PANEL: &[PanelButton] = &[
    append("sin", "sin", "sin("),
    append("cos", "cos", "cos("),
    append("tan", "tan", "tan("),
    append("ln", "ln", "log("),
    append("log", "log", "log10("),
    append("pi", "π", "pi"),
    append("euler", "e", "e"),
    append("square", "x²", "^2"),
    append("sqrt", "√", "sqrt("),
    append("cbrt", "∛", "cbrt("),
    append("factorial", "x!", "!"),
    append("abs", "|x|", "abs("),
];

/// Bitwise operators and radix functions
pub const PROGRAMMING_PANEL: &[PanelButton] = &[
    append("and", "AND", " & "),
    append("or", "OR", " | "),
    append("xor", "XOR", " ^| "),
    append("not", "NOT", "~"),
    append("shift-left", "<<", " << "),
    append("shift-right", ">>", " >> "),
    append("hex", "HEX", "hex("),
    append("bin", "BIN", "bin("),
    append("oct", "OCT", "oct("),
    append("mod", "MOD", " % "),
];

/// Graphing actions
pub const GRAPHING_PANEL: &[PanelButton] = &[
    button("graph", "Graph Function", ButtonAction::GenerateGraph),
    append("graph-x", "x", "x"),
];

/// Finance forms
pub const FINANCE_PANEL: &[PanelButton] = &[
    button(
        "compound-interest",
        "Compound Interest",
        ButtonAction::OpenFinanceForm(FinanceKind::CompoundInterest),
    ),
    button(
        "loan-payment",
        "Loan Payment",
        ButtonAction::OpenFinanceForm(FinanceKind::LoanPayment),
    ),
];

/// Unit conversions
pub const UNIT_PANEL: &[PanelButton] = &[
    convert("m-to-ft", "m→ft", Unit::Meter, Unit::Foot),
    convert("ft-to-m", "ft→m", Unit::Foot, Unit::Meter),
    convert("km-to-m", "km→m", Unit::Kilometer, Unit::Meter),
    convert("m-to-km", "m→km", Unit::Meter, Unit::Kilometer),
    convert("in-to-cm", "in→cm", Unit::Inch, Unit::Centimeter),
    convert("cm-to-in", "cm→in", Unit::Centimeter, Unit::Inch),
    convert("kg-to-lb", "kg→lb", Unit::Kilogram, Unit::Pound),
    convert("lb-to-kg", "lb→kg", Unit::Pound, Unit::Kilogram),
    convert("oz-to-g", "oz→g", Unit::Ounce, Unit::Gram),
    convert("g-to-oz", "g→oz", Unit::Gram, Unit::Ounce),
    convert("c-to-f", "°C→°F", Unit::Celsius, Unit::Fahrenheit),
    convert("f-to-c", "°F→°C", Unit::Fahrenheit, Unit::Celsius),
    convert("c-to-k", "°C→K", Unit::Celsius, Unit::Kelvin),
    convert("k-to-c", "K→°C", Unit::Kelvin, Unit::Celsius),
];

/// Derivative assistant
pub const AI_PANEL: &[PanelButton] = &[
    button("derivative", "Calculate Derivative", ButtonAction::Derivative),
    append("ai-x", "x", "x"),
];

/// Memory and utility buttons shown in every mode
pub const COMMON_PANEL: &[PanelButton] = &[
    button("memory-store", "MS", ButtonAction::MemoryStore),
    button("memory-recall", "MR", ButtonAction::MemoryRecall),
    button("memory-add", "M+", ButtonAction::MemoryAdd),
    button("memory-clear", "MC", ButtonAction::MemoryClear),
    button("random", "RND", ButtonAction::Random),
    button("answer", "ANS", ButtonAction::AppendAnswer),
];

/// Physical and mathematical constants shown in every mode
pub const CONSTANTS_PANEL: &[PanelButton] = &[
    append("const-pi", "π", "pi"),
    append("const-e", "e", "e"),
    append("const-c", "c", "299792458"),
    append("const-h", "ℏ", "6.626e-34"),
    append("const-g", "g", "9.81"),
    append("const-phi", "φ", "1.618"),
];

/// Looks a button up by id across every panel
#[must_use]
pub fn find_button(id: &str) -> Option<&'static PanelButton> {
    Mode::ALL
        .iter()
        .flat_map(|m| m.panel())
        .chain(COMMON_PANEL)
        .chain(CONSTANTS_PANEL)
        .find(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // ===== Mode tests =====

    #[test]
    fn test_default_mode_is_basic() {
        assert_eq!(Mode::default(), Mode::Basic);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("scientific".parse::<Mode>(), Ok(Mode::Scientific));
        assert_eq!(" AI ".parse::<Mode>(), Ok(Mode::Ai));
        assert!("statistics".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_keys_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.key().parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn test_mode_cycle() {
        assert_eq!(Mode::Basic.next(), Mode::Scientific);
        assert_eq!(Mode::Ai.next(), Mode::Basic);
        assert_eq!(Mode::Basic.prev(), Mode::Ai);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&Mode::Programming).unwrap_or_default();
        assert_eq!(json, "\"programming\"");
    }

    // ===== Panel tests =====

    #[test]
    fn test_every_mode_has_buttons() {
        for mode in Mode::ALL {
            assert!(!mode.panel().is_empty(), "{mode} has no buttons");
        }
    }

    #[test]
    fn test_button_ids_unique() {
        let mut seen = HashSet::new();
        let all = Mode::ALL
            .iter()
            .flat_map(|m| m.panel())
            .chain(COMMON_PANEL)
            .chain(CONSTANTS_PANEL);
        for button in all {
            assert!(seen.insert(button.id), "duplicate id {}", button.id);
        }
    }

    #[test]
    fn test_basic_panel_layout() {
        assert_eq!(BASIC_PANEL.len(), 20);
        assert_eq!(BASIC_PANEL.len() % Mode::Basic.columns(), 0);
    }

    #[test]
    fn test_xor_token_is_not_power() {
        let xor = find_button("xor").map(|b| b.action);
        assert_eq!(xor, Some(ButtonAction::Append(" ^| ")));
    }

    #[test]
    fn test_find_button() {
        assert_eq!(find_button("equals").map(|b| b.label), Some("="));
        assert_eq!(
            find_button("const-h").map(|b| b.action),
            Some(ButtonAction::Append("6.626e-34"))
        );
        assert!(find_button("matrix").is_none());
    }

    #[test]
    fn test_unit_panel_conversions_stay_in_category() {
        for button in UNIT_PANEL {
            match button.action {
                ButtonAction::ConvertUnit { from, to } => {
                    assert_eq!(from.category(), to.category(), "{}", button.id);
                }
                other => panic!("unexpected action {other:?}"),
            }
        }
    }
}
