//! user-panel binary entry point.
//!
//! Resolves configuration, sets up logging, then either runs a one-shot
//! subcommand or starts the TUI in raw mode and restores the terminal on
//! exit.
//!
use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use user_panel::app::{self, AppState, DynPanel, Theme};
use user_panel::cli::{Cli, Command, StdioPrompt, run_command};
use user_panel::config::{self, PanelConfig};
use user_panel::export::DirSink;
use user_panel::panel::{Clock, SystemClock, UserPanel};
use user_panel::store::{FileStore, Store};

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn run_tui(cfg: &PanelConfig, verbosity: u8) -> Result<()> {
    let log_path = config::data_dir().join("user-panel.log");
    if let Err(e) = user_panel::logging::init_file(&log_path, verbosity) {
        eprintln!("logging disabled: {e}");
    }
    tracing::info!(store = %cfg.store_path.display(), "starting panel");

    let store: Box<dyn Store> = Box::new(FileStore::open(&cfg.store_path));
    let clock: Box<dyn Clock> = Box::new(SystemClock);
    let panel: DynPanel = UserPanel::open(store, clock);
    let sink = Box::new(DirSink::new(&cfg.export_dir));
    let theme = Theme::load_or_init(&cfg.theme_path);
    let mut state = AppState::new(panel, sink, cfg.export_dir.display().to_string(), theme);

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &mut state);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();
    res
}

fn run_once(cfg: &PanelConfig, command: &Command, verbosity: u8) -> Result<()> {
    if let Err(e) = user_panel::logging::init_stderr(verbosity) {
        eprintln!("logging disabled: {e}");
    }
    let mut panel = UserPanel::open(FileStore::open(&cfg.store_path), SystemClock);
    let mut sink = DirSink::new(&cfg.export_dir);
    let assume_yes = matches!(command, Command::Delete { yes: true, .. });
    let stdin = std::io::stdin();
    let mut prompt = StdioPrompt::new(stdin.lock(), std::io::stderr(), assume_yes);
    let mut stdout = std::io::stdout();
    run_command(command, &mut panel, &mut sink, &mut prompt, &mut stdout)
}

/// Program entry point: dispatch and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli.resolve_config();

    let res = match cli.command.clone().unwrap_or(Command::Tui) {
        Command::Tui => run_tui(&cfg, cli.verbose),
        other => run_once(&cfg, &other, cli.verbose),
    };

    if let Err(err) = &res {
        tracing::error!(error = %err, "exiting with error");
    }
    res
}
