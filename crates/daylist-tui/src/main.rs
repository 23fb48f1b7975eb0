mod app;
mod ui;

use std::io::{Stdout, stdout};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use daylist_core::config::{Config, resolve_data_dir};
use daylist_core::datetime;
use daylist_core::store::TaskStore;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "daylist-tui", version, about = "Interactive day view for daylist")]
struct TuiCli {
    #[arg(long = "rcfile")]
    rcfile: Option<PathBuf>,

    #[arg(long = "data")]
    data: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = TuiCli::parse();

    let cfg = Config::load(cli.rcfile.as_deref())?;
    let data_dir = resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    // stderr belongs to the alternate screen, so logs go to a file
    let file_appender = tracing_appender::rolling::never(&data_dir, "daylist-tui.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    let store = TaskStore::open(&data_dir)
        .with_context(|| format!("failed to open task store at {}", data_dir.display()))?;

    let today = datetime::today_in_app_tz(Utc::now());
    info!(%today, "starting daylist TUI");

    let mut terminal = setup_terminal()?;
    let mut app = App::new(store, today);
    let result = app.run(&mut terminal);
    teardown_terminal(&mut terminal)?;

    info!("done");
    result
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(out))?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
