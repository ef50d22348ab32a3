//! End-to-end sessions driven through panel buttons
//!
//! Every interaction goes through `press`, the same entry point the
//! terminal keypad and the browser page use.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::collections::HashSet;

use nexus_calculator::core::mode::{find_button, COMMON_PANEL, CONSTANTS_PANEL};
use nexus_calculator::prelude::*;

fn press_all(calc: &mut CalculatorState, ids: &[&str]) {
    for id in ids {
        assert!(calc.press(id).is_some(), "unknown button {id}");
    }
}

// ===== Full session =====

#[test]
fn test_session_across_every_mode() {
    let mut calc = CalculatorState::new().with_seed(3);

    // Basic
    press_all(&mut calc, &["digit-2", "add", "digit-3", "equals"]);
    assert_eq!(calc.display(), "5");

    // Scientific
    calc.dispatch(Action::SetMode(Mode::Scientific)).unwrap();
    press_all(
        &mut calc,
        &["clear", "sqrt", "digit-9", "close-paren", "equals"],
    );
    assert_eq!(calc.display(), "3");

    // Programming
    calc.dispatch(Action::SetMode(Mode::Programming)).unwrap();
    press_all(
        &mut calc,
        &["clear", "digit-1", "digit-2", "and", "digit-1", "digit-0", "equals"],
    );
    assert_eq!(calc.display(), "8");
    let radix = calc.radix_view();
    assert_eq!(radix.binary, "1000");
    assert_eq!(radix.hex, "8");
    assert_eq!(radix.octal, "10");

    // Graphing
    calc.dispatch(Action::SetMode(Mode::Graphing)).unwrap();
    press_all(&mut calc, &["clear", "graph-x", "square", "graph"]);
    assert!(calc.plot().is_visible());
    assert_eq!(calc.plot().points().len(), calc.graph_range().sample_count());

    // Finance opens a form instead of touching the display
    calc.dispatch(Action::SetMode(Mode::Finance)).unwrap();
    assert_eq!(
        calc.press("compound-interest"),
        Some(ButtonAction::OpenFinanceForm(FinanceKind::CompoundInterest))
    );
    assert_eq!(calc.display(), "x^2");
    let form = FinanceForm::with_fields(FinanceKind::CompoundInterest, &["1000", "0.05", "1", "12"]);
    calc.dispatch(Action::SubmitFinanceForm(form)).unwrap();
    assert_eq!(calc.display(), "1051.16");

    // Unit conversion and memory
    calc.dispatch(Action::SetMode(Mode::Unit)).unwrap();
    press_all(&mut calc, &["clear", "digit-5", "km-to-m"]);
    assert_eq!(calc.display(), "5000");
    press_all(&mut calc, &["memory-store", "memory-add"]);
    assert_eq!(calc.memory(), 10000.0);

    // Derivative
    calc.dispatch(Action::SetMode(Mode::Ai)).unwrap();
    press_all(&mut calc, &["clear", "ai-x", "square", "derivative"]);
    assert_eq!(calc.display(), "2 * x");

    // Evaluations and the derivative are recorded, newest first
    let history = calc.history();
    assert_eq!(history.len(), 4);
    let latest = history.latest().unwrap();
    assert_eq!(latest.expression, "d/dx(x^2)");
    assert_eq!(latest.result, "2 * x");
    assert_eq!(history.get(3).unwrap().expression, "2+3");

    let stats = calc.stats();
    assert_eq!(stats.calculations, 4);
    assert_eq!(stats.mode, Mode::Ai);
    assert_eq!(stats.memory, 10000.0);

    // Recalling an old entry puts its expression back
    calc.dispatch(Action::SelectHistory(1)).unwrap();
    assert_eq!(calc.display(), "12 & 10");
    calc.press("equals");
    assert_eq!(calc.display(), "8");
}

#[test]
fn test_session_answer_chaining() {
    let mut calc = CalculatorState::new();
    press_all(&mut calc, &["digit-6", "multiply", "digit-7", "equals"]);
    press_all(&mut calc, &["clear", "answer", "add", "digit-1", "equals"]);
    assert_eq!(calc.display(), "43");
}

#[test]
fn test_session_recovers_after_error() {
    let mut calc = CalculatorState::new();
    press_all(&mut calc, &["digit-1", "divide", "equals"]);
    assert_eq!(calc.display(), "Error");
    assert!(calc.history().is_empty());

    press_all(&mut calc, &["digit-4", "equals"]);
    assert_eq!(calc.display(), "4");
    assert_eq!(calc.history().len(), 1);
}

#[test]
fn test_session_view_model_tracks_state() {
    let mut calc = CalculatorState::new().with_mode(Mode::Programming);
    press_all(&mut calc, &["digit-2", "digit-5", "digit-5"]);

    let json = ViewModel::of(&calc).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["display"], "255");
    assert_eq!(value["radix"]["hex"], "FF");
    assert!(value["plot"].is_null());
}

// ===== Button coverage =====

#[test]
fn test_every_button_id_is_unique() {
    let mut seen = HashSet::new();
    for button in Mode::ALL
        .iter()
        .flat_map(|m| m.panel())
        .chain(COMMON_PANEL)
        .chain(CONSTANTS_PANEL)
    {
        assert!(seen.insert(button.id), "duplicate id {}", button.id);
    }
}

#[test]
fn test_every_button_presses_in_its_mode() {
    for mode in Mode::ALL {
        for button in mode.panel().iter().chain(COMMON_PANEL).chain(CONSTANTS_PANEL) {
            let mut calc = CalculatorState::new().with_mode(mode).with_seed(11);
            assert_eq!(find_button(button.id), Some(button));
            assert_eq!(calc.press(button.id), Some(button.action), "{}", button.id);
            assert!(!calc.display().is_empty(), "{} emptied the display", button.id);
            assert_eq!(calc.mode(), mode);
        }
    }
}

#[test]
fn test_unknown_button_is_ignored() {
    let mut calc = CalculatorState::new();
    assert_eq!(calc.press("warp-drive"), None);
    assert_eq!(calc.display(), "0");
}
