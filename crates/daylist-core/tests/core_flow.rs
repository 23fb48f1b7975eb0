use chrono::{TimeZone, Utc};
use daylist_core::day::{DayCursor, DayKey};
use daylist_core::store::{EditOutcome, TaskStore};
use tempfile::tempdir;

#[test]
fn day_scoped_task_flow_survives_reopen() {
    let temp = tempdir().expect("tempdir");
    let now = Utc
        .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
        .single()
        .expect("valid now");

    let mut cursor = DayCursor::new(now.date_naive());
    let day = cursor.key();
    cursor.advance(-1);
    let previous_day = cursor.key();
    assert_eq!(previous_day.to_string(), "2024-05-31");

    let kept_id = {
        let mut store = TaskStore::open(temp.path()).expect("open store");

        let task = store.add(day, "Buy milk", now).expect("add");
        let other = store.add(day, "Call home", now).expect("add second");
        store.add(previous_day, "Water plants", now).expect("add previous");

        assert_eq!(store.toggle(day, task.id).expect("toggle"), Some(true));
        assert_eq!(
            store.edit(day, task.id, "Buy oat milk").expect("edit"),
            EditOutcome::Updated
        );
        assert!(store.delete(day, other.id).expect("delete"));

        task.id
    };

    let store = TaskStore::open(temp.path()).expect("reopen store");

    let tasks = store.tasks_for(day);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, kept_id);
    assert_eq!(tasks[0].text, "Buy oat milk");
    assert!(tasks[0].completed);

    let previous: DayKey = "2024-05-31".parse().expect("day key");
    assert_eq!(store.tasks_for(previous).len(), 1);
    assert_eq!(store.tasks_for(previous)[0].text, "Water plants");
}
