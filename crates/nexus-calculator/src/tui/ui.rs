//! TUI rendering
//!
//! Visual feedback: the display, mode tabs, history and statistics are all
//! drawn from the calculator state on every frame.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Tabs, Widget,
    },
    Frame,
};

use crate::core::finance::FinanceForm;
use crate::core::mode::Mode;
use crate::core::{buffer, format_number};

use super::app::CalculatorApp;
use super::keypad::KeypadWidget;

/// Title drawn on the outer border
pub const TITLE: &str = " Nexus Calculator ";

/// Key hints shown in the status line
pub const HELP_LINE: &str =
    "Tab mode · Enter = · Esc clear · ←/→ focus · ^B press · ^G graph · ^D d/dx · ↑/↓ history · ^Q quit";

/// Renders the calculator UI to the frame
pub fn render(app: &CalculatorApp, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(CalculatorUI::new(app), area);
}

/// Screen regions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    /// Mode tabs
    pub tabs: Rect,
    /// Display line
    pub display: Rect,
    /// Mode-specific panel (radix views, chart or finance form); may be empty
    pub mode_panel: Rect,
    /// Button grid
    pub keypad: Rect,
    /// Status line
    pub status: Rect,
    /// History list
    pub history: Rect,
    /// Statistics and memory
    pub stats: Rect,
}

impl ScreenLayout {
    /// Splits the terminal area for the app's current mode
    #[must_use]
    pub fn compute(app: &CalculatorApp, area: Rect) -> Self {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(3), Constraint::Min(10)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(34)])
            .split(outer[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                mode_panel_constraint(app),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(7)])
            .split(columns[1]);

        Self {
            tabs: outer[0],
            display: left[0],
            mode_panel: left[1],
            keypad: left[2],
            status: left[3],
            history: right[0],
            stats: right[1],
        }
    }
}

fn mode_panel_constraint(app: &CalculatorApp) -> Constraint {
    match (app.state().mode(), app.form()) {
        (_, Some(form)) => Constraint::Length(form.fields().len() as u16 + 3),
        (Mode::Programming, None) => Constraint::Length(5),
        (Mode::Graphing, None) => Constraint::Percentage(50),
        _ => Constraint::Length(0),
    }
}

/// Calculator UI widget
#[derive(Debug)]
pub struct CalculatorUI<'a> {
    app: &'a CalculatorApp,
}

impl<'a> CalculatorUI<'a> {
    /// Creates a new calculator UI widget
    #[must_use]
    pub fn new(app: &'a CalculatorApp) -> Self {
        Self { app }
    }

    fn render_tabs(&self, area: Rect, buf: &mut Buffer) {
        let titles: Vec<Line> = Mode::ALL
            .iter()
            .enumerate()
            .map(|(i, mode)| Line::from(format!("F{} {}", i + 1, mode.name())))
            .collect();
        Tabs::new(titles)
            .select(self.app.state().mode().index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title(" Mode "))
            .render(area, buf);
    }

    fn render_display(&self, area: Rect, buf: &mut Buffer) {
        let text = self.app.state().display();
        let style = if buffer::SENTINELS.contains(&text) {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        };
        Paragraph::new(Span::styled(text, style))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .title(" Display ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .render(area, buf);
    }

    fn render_mode_panel(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        if let Some(form) = self.app.form() {
            render_form(form, area, buf);
            return;
        }
        match self.app.state().mode() {
            Mode::Programming => self.render_radix(area, buf),
            Mode::Graphing => self.render_chart(area, buf),
            _ => {}
        }
    }

    fn render_radix(&self, area: Rect, buf: &mut Buffer) {
        let view = self.app.state().radix_view();
        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::Yellow)),
                Span::raw(value),
            ])
        };
        Paragraph::new(vec![
            row("BIN ", view.binary),
            row("HEX ", view.hex),
            row("OCT ", view.octal),
        ])
        .block(
            Block::default()
                .title(" Radix ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .render(area, buf);
    }

    fn render_chart(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Graph ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let plot = self.app.state().plot();
        let Some((x0, x1, y0, y1)) = plot.bounds().filter(|_| plot.is_visible()) else {
            Paragraph::new("Enter f(x) and press ^G")
                .style(Style::default().fg(Color::DarkGray))
                .block(block)
                .render(area, buf);
            return;
        };

        let (y0, y1) = if y0 == y1 { (y0 - 1.0, y1 + 1.0) } else { (y0, y1) };
        let data = plot.as_tuples();
        let dataset = Dataset::default()
            .name(self.app.state().display().to_string())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data);

        let axis_labels = |lo: f64, hi: f64| {
            vec![
                Span::raw(format_number(lo)),
                Span::raw(format_number(hi)),
            ]
        };

        Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("x")
                    .bounds([x0, x1])
                    .labels(axis_labels(x0, x1)),
            )
            .y_axis(
                Axis::default()
                    .title("y")
                    .bounds([y0, y1])
                    .labels(axis_labels(y0, y1)),
            )
            .render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let line = match self.app.last_error() {
            Some(err) => Span::styled(err, Style::default().fg(Color::Red)),
            None => Span::styled(HELP_LINE, Style::default().fg(Color::DarkGray)),
        };
        Paragraph::new(line).render(area, buf);
    }

    fn render_history(&self, area: Rect, buf: &mut Buffer) {
        let selected = self.app.selected_history();
        let items: Vec<ListItem> = self
            .app
            .state()
            .history()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let line = Line::from(vec![
                    Span::styled(&entry.expression, Style::default().fg(Color::Gray)),
                    Span::raw(" = "),
                    Span::styled(&entry.result, Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("  {}", entry.timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);
                let item = ListItem::new(line);
                if selected == Some(i) {
                    item.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    item
                }
            })
            .collect();

        List::new(items)
            .block(
                Block::default()
                    .title(" History (newest first) ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .render(area, buf);
    }

    fn render_stats(&self, area: Rect, buf: &mut Buffer) {
        let stats = self.app.state().stats();
        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<13}"), Style::default().fg(Color::Gray)),
                Span::styled(value, Style::default().fg(Color::White)),
            ])
        };
        Paragraph::new(vec![
            row("Calculations", stats.calculations.to_string()),
            row("Mode", stats.mode.name().to_string()),
            row("Memory", format_number(stats.memory)),
            row("Variables", stats.variables.to_string()),
        ])
        .block(
            Block::default()
                .title(" Stats ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .render(area, buf);
    }
}

fn render_form(form: &FinanceForm, area: Rect, buf: &mut Buffer) {
    let kind = form.kind();
    let mut lines: Vec<Line> = kind
        .labels()
        .iter()
        .zip(form.fields())
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == form.focus() {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{label:<28}"), Style::default().fg(Color::Gray)),
                Span::styled(format!(" {value} "), style),
            ])
        })
        .collect();
    lines.push(Line::from(Span::styled(
        "↑/↓ field · Enter calculate · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(" {} ", kind.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .render(area, buf);
}

impl Widget for CalculatorUI<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .title(TITLE)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .render(area, buf);

        let layout = ScreenLayout::compute(self.app, area);
        self.render_tabs(layout.tabs, buf);
        self.render_display(layout.display, buf);
        self.render_mode_panel(layout.mode_panel, buf);
        KeypadWidget::new(self.app.keypad()).render(layout.keypad, buf);
        self.render_status(layout.status, buf);
        self.render_history(layout.history, buf);
        self.render_stats(layout.stats, buf);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tui::input::KeyAction;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(app: &CalculatorApp, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn type_str(app: &mut CalculatorApp, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyAction::InsertChar(c));
        }
    }

    // ===== Layout tests =====

    #[test]
    fn test_layout_mode_panel_only_when_needed() {
        let area = Rect::new(0, 0, 120, 40);
        let mut app = CalculatorApp::new();
        assert_eq!(ScreenLayout::compute(&app, area).mode_panel.height, 0);
        app.set_mode(Mode::Programming);
        assert_eq!(ScreenLayout::compute(&app, area).mode_panel.height, 5);
        app.set_mode(Mode::Graphing);
        assert!(ScreenLayout::compute(&app, area).mode_panel.height > 5);
    }

    #[test]
    fn test_layout_keypad_inside_area() {
        let area = Rect::new(0, 0, 120, 40);
        let app = CalculatorApp::new();
        let layout = ScreenLayout::compute(&app, area);
        assert!(layout.keypad.width > 0);
        assert!(layout.keypad.x + layout.keypad.width <= area.width);
        assert!(layout.history.x >= layout.keypad.x + layout.keypad.width);
    }

    // ===== Render tests =====

    #[test]
    fn test_render_initial() {
        let app = CalculatorApp::new();
        let content = draw(&app, 120, 40);
        assert!(content.contains("Nexus Calculator"));
        assert!(content.contains("Basic"));
        assert!(content.contains("AI Math"));
        assert!(content.contains("Calculations"));
        assert!(content.contains("[=]"));
    }

    #[test]
    fn test_render_display_and_history() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "6*7");
        app.handle_key(KeyAction::Evaluate);
        let content = draw(&app, 120, 40);
        assert!(content.contains("6*7 = 42"));
    }

    #[test]
    fn test_render_error_status() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "2+");
        app.handle_key(KeyAction::Evaluate);
        let content = draw(&app, 120, 40);
        assert!(content.contains("Error"));
    }

    #[test]
    fn test_render_radix_panel() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Programming);
        type_str(&mut app, "255");
        let content = draw(&app, 120, 40);
        assert!(content.contains("11111111"));
        assert!(content.contains("FF"));
        assert!(content.contains("377"));
    }

    #[test]
    fn test_render_graph_hint_then_chart() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Graphing);
        let content = draw(&app, 120, 40);
        assert!(content.contains("Enter f(x)"));

        type_str(&mut app, "x^2");
        app.handle_key(KeyAction::Graph);
        let content = draw(&app, 120, 40);
        assert!(!content.contains("Enter f(x)"));
        assert!(content.contains("100"));
    }

    #[test]
    fn test_render_constant_graph() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Graphing);
        type_str(&mut app, "3");
        app.handle_key(KeyAction::Graph);
        let content = draw(&app, 120, 40);
        assert!(content.contains("Graph"));
    }

    #[test]
    fn test_render_finance_form() {
        let mut app = CalculatorApp::new();
        app.set_mode(Mode::Finance);
        app.press_button(app.keypad().find_button("compound-interest").unwrap());
        type_str(&mut app, "1000");
        let content = draw(&app, 120, 40);
        assert!(content.contains("Compound Interest"));
        assert!(content.contains("1000"));
    }

    #[test]
    fn test_render_selected_history() {
        let mut app = CalculatorApp::new();
        type_str(&mut app, "1+1");
        app.handle_key(KeyAction::Evaluate);
        app.handle_key(KeyAction::Up);
        let content = draw(&app, 120, 40);
        assert!(content.contains("1+1 = 2"));
    }

    #[test]
    fn test_render_tiny_terminal() {
        let app = CalculatorApp::new();
        let _ = draw(&app, 20, 8);
    }
}
