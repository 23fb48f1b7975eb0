use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::cli::Command;
use crate::datetime;
use crate::day::{DayCursor, DayKey};
use crate::render::Renderer;
use crate::store::{EditOutcome, TaskStore};

#[instrument(skip(store, renderer, command, now))]
pub fn dispatch(
    store: &mut TaskStore,
    renderer: &mut Renderer,
    cursor: &DayCursor,
    command: Command,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let today = datetime::today_in_app_tz(now);

    debug!(day = %cursor.key(), ?command, "dispatching command");

    match command {
        Command::Add { text } => cmd_add(store, cursor.key(), &text.join(" "), now),
        Command::List => cmd_list(store, renderer, cursor, today),
        Command::Toggle { id } => cmd_toggle(store, cursor.key(), id),
        Command::Edit { id, text } => cmd_edit(store, cursor.key(), id, &text.join(" ")),
        Command::Delete { id } => cmd_delete(store, cursor.key(), id),
        Command::Export => cmd_export(store),
    }
}

#[instrument(skip(store, raw_text, now))]
fn cmd_add(
    store: &mut TaskStore,
    day: DayKey,
    raw_text: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    info!("command add");

    let task = store.add(day, raw_text, now)?;
    println!("Created task {}.", task.id);
    Ok(())
}

#[instrument(skip(store, renderer, cursor, today))]
fn cmd_list(
    store: &mut TaskStore,
    renderer: &mut Renderer,
    cursor: &DayCursor,
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command list");

    renderer.print_day(cursor, store.tasks_for(cursor.key()), today)
}

#[instrument(skip(store))]
fn cmd_toggle(store: &mut TaskStore, day: DayKey, id: i64) -> anyhow::Result<()> {
    info!("command toggle");

    match store.toggle(day, id)? {
        Some(true) => println!("Marked task {id} done."),
        Some(false) => println!("Marked task {id} pending."),
        None => debug!(id, "no matching task to toggle"),
    }
    Ok(())
}

#[instrument(skip(store, raw_text))]
fn cmd_edit(store: &mut TaskStore, day: DayKey, id: i64, raw_text: &str) -> anyhow::Result<()> {
    info!("command edit");

    match store.edit(day, id, raw_text)? {
        EditOutcome::Updated => println!("Modified task {id}."),
        EditOutcome::Unchanged => println!("Task {id} unchanged."),
    }
    Ok(())
}

#[instrument(skip(store))]
fn cmd_delete(store: &mut TaskStore, day: DayKey, id: i64) -> anyhow::Result<()> {
    info!("command delete");

    let removed = store.delete(day, id)?;
    println!("Deleted {} task(s).", u32::from(removed));
    Ok(())
}

#[instrument(skip(store))]
fn cmd_export(store: &mut TaskStore) -> anyhow::Result<()> {
    info!("command export");

    let serialized = serde_json::to_string_pretty(store.days())?;
    println!("{serialized}");
    Ok(())
}
