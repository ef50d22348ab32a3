//! nexus-calc: terminal calculator and one-shot math commands

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use nexus_calculator::cli::{execute, Cli, CliResult, Commands};
use nexus_calculator::config::{CalculatorConfig, Verbosity};
use nexus_calculator::tui::{render, CalculatorApp, InputHandler, ScreenLayout};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::info;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Tui);
    init_logging(
        cli.verbosity(),
        cli.log_file.as_deref(),
        command == Commands::Tui,
    )?;

    let config = cli.load_config()?;
    info!(?config, "configuration loaded");

    if command == Commands::Tui {
        return run_tui(&config);
    }
    println!("{}", execute(&command, &config)?);
    Ok(())
}

/// Installs the subscriber: `RUST_LOG` wins, otherwise the verbosity level.
/// Logs go to the log file when given; the terminal UI discards them otherwise.
fn init_logging(verbosity: Verbosity, log_file: Option<&Path>, tui: bool) -> io::Result<()> {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(verbosity.level().into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        None if tui => builder.with_writer(io::sink).init(),
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn run_tui(config: &CalculatorConfig) -> CliResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, CalculatorApp::with_state(config.build_state()));

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: CalculatorApp,
) -> CliResult<()> {
    let input_handler = InputHandler::new();

    while !app.should_quit() {
        terminal.draw(|f| render(&app, f))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                app.handle_key(input_handler.handle_key(key));
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let size = terminal.size()?;
                let area = Rect::new(0, 0, size.width, size.height);
                let layout = ScreenLayout::compute(&app, area);
                app.click(layout.keypad, mouse.column, mouse.row);
            }
            _ => {}
        }
    }

    info!(calculations = app.state().history().len(), "session ended");
    Ok(())
}
