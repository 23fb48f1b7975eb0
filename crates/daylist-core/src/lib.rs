pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod day;
pub mod render;
pub mod store;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting daylist CLI");

    let mut cfg = config::Config::load(cli.rcfile.as_deref())?;
    cfg.apply_overrides(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value)));

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let mut store = store::TaskStore::open(&data_dir)
        .with_context(|| format!("failed to open task store at {}", data_dir.display()))?;

    let mut renderer = render::Renderer::new(&cfg)?;

    let now = Utc::now();
    let today = datetime::today_in_app_tz(now);
    let day = match cli.day.as_deref() {
        Some(expr) => datetime::parse_day_expr(expr, today)?,
        None => today,
    };
    let cursor = day::DayCursor::new(day);
    debug!(day = %cursor.key(), "resolved working day");

    let command = match cli.command {
        Some(command) => command,
        None => cli::default_command(&cfg)?,
    };

    commands::dispatch(&mut store, &mut renderer, &cursor, command, now)?;

    info!("done");
    Ok(())
}
