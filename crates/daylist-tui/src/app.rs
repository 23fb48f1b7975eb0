use chrono::{NaiveDate, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::debug;

use daylist_core::datetime;
use daylist_core::day::DayCursor;
use daylist_core::store::{EditOutcome, TaskStore};

/// Per-row edit sub-state. `Editing` replaces the selected row's label
/// with an inline text field; Enter and Esc both attempt a commit, and
/// the store reverts unchanged or empty input.
#[derive(Debug)]
pub enum Mode {
    Viewing,
    Adding,
    Editing { id: i64, buffer: String },
}

/// Owns every piece of view state: the store, the day cursor, the row
/// selection, and the input/edit buffers. Rows are bound to tasks by
/// looking the selection index up in the store at event time, never by
/// holding references across renders.
pub struct App {
    pub store: TaskStore,
    pub cursor: DayCursor,
    pub today: NaiveDate,
    pub selected: usize,
    pub mode: Mode,
    pub input: String,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore, today: NaiveDate) -> Self {
        Self {
            store,
            cursor: DayCursor::new(today),
            today,
            selected: 0,
            mode: Mode::Viewing,
            input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        while !self.should_quit {
            self.today = datetime::today_in_app_tz(Utc::now());
            terminal.draw(|frame| crate::ui::draw(frame, self))?;

            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;

        match self.mode {
            Mode::Viewing => self.handle_viewing_key(key),
            Mode::Adding => self.handle_adding_key(key),
            Mode::Editing { .. } => self.handle_editing_key(key),
        }

        self.clamp_selection();
    }

    fn handle_viewing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor.advance(-1);
                self.selected = 0;
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cursor.advance(1);
                self.selected = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
            }
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('e') => self.start_edit(),
            KeyCode::Char('a') | KeyCode::Char('i') => self.mode = Mode::Adding,
            _ => {}
        }
    }

    fn handle_adding_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.commit_add(),
            KeyCode::Esc => self.mode = Mode::Viewing,
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.commit_edit(),
            KeyCode::Char(c) => {
                if let Mode::Editing { buffer, .. } = &mut self.mode {
                    buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Mode::Editing { buffer, .. } = &mut self.mode {
                    buffer.pop();
                }
            }
            _ => {}
        }
    }

    fn selected_id(&self) -> Option<i64> {
        self.store
            .tasks_for(self.cursor.key())
            .get(self.selected)
            .map(|task| task.id)
    }

    fn start_edit(&mut self) {
        let Some(task) = self.store.tasks_for(self.cursor.key()).get(self.selected) else {
            return;
        };
        debug!(id = task.id, "entering edit mode");
        self.mode = Mode::Editing {
            id: task.id,
            buffer: task.text.clone(),
        };
    }

    fn commit_add(&mut self) {
        match self.store.add(self.cursor.key(), &self.input, Utc::now()) {
            Ok(task) => {
                self.status = Some(format!("Created task {}.", task.id));
                self.input.clear();
                self.mode = Mode::Viewing;
            }
            Err(err) => self.status = Some(format!("{err:#}")),
        }
    }

    fn commit_edit(&mut self) {
        let Mode::Editing { id, buffer } = std::mem::replace(&mut self.mode, Mode::Viewing)
        else {
            return;
        };

        match self.store.edit(self.cursor.key(), id, &buffer) {
            Ok(EditOutcome::Updated) => self.status = Some(format!("Modified task {id}.")),
            Ok(EditOutcome::Unchanged) => {}
            Err(err) => {
                // rejected commit keeps the field open so the user can shorten it
                self.status = Some(format!("{err:#}"));
                self.mode = Mode::Editing { id, buffer };
            }
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.toggle(self.cursor.key(), id) {
            Ok(Some(true)) => self.status = Some(format!("Marked task {id} done.")),
            Ok(Some(false)) => self.status = Some(format!("Marked task {id} pending.")),
            Ok(None) => {}
            Err(err) => self.status = Some(format!("{err:#}")),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.delete(self.cursor.key(), id) {
            Ok(_) => self.status = Some(format!("Deleted task {id}.")),
            Err(err) => self.status = Some(format!("{err:#}")),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.store.tasks_for(self.cursor.key()).len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::tempdir;

    use daylist_core::store::TaskStore;
    use daylist_core::task::MAX_TEXT_LEN;

    use super::{App, Mode};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(temp: &tempfile::TempDir) -> App {
        let store = TaskStore::open(temp.path()).expect("open store");
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        App::new(store, today)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn add_flow_creates_a_task_on_the_viewed_day() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        assert!(matches!(app.mode, Mode::Adding));

        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        assert!(matches!(app.mode, Mode::Viewing));
        assert!(app.input.is_empty());
        let tasks = app.store.tasks_for(app.cursor.key());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
    }

    #[test]
    fn add_with_whitespace_only_input_shows_a_notice() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.status.is_some());
        assert!(app.store.tasks_for(app.cursor.key()).is_empty());
    }

    #[test]
    fn edit_commit_with_unchanged_text_reverts_silently() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Char('e')));
        match &app.mode {
            Mode::Editing { buffer, .. } => assert_eq!(buffer, "Buy milk"),
            other => panic!("expected edit mode, got {other:?}"),
        }

        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.mode, Mode::Viewing));
        assert!(app.status.is_none());
        assert_eq!(app.store.tasks_for(app.cursor.key())[0].text, "Buy milk");
    }

    #[test]
    fn edit_commit_with_emptied_buffer_keeps_original_text() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Char('e')));
        for _ in 0.."Buy milk".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        app.handle_key(key(KeyCode::Enter));

        assert!(matches!(app.mode, Mode::Viewing));
        assert_eq!(app.store.tasks_for(app.cursor.key())[0].text, "Buy milk");
    }

    #[test]
    fn overlong_edit_commit_stays_in_edit_mode_with_a_notice() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Char('e')));
        type_text(&mut app, &"x".repeat(MAX_TEXT_LEN));
        app.handle_key(key(KeyCode::Enter));

        assert!(matches!(app.mode, Mode::Editing { .. }));
        assert!(app.status.is_some());
        assert_eq!(app.store.tasks_for(app.cursor.key())[0].text, "Buy milk");
    }

    #[test]
    fn space_toggles_and_d_deletes_the_selected_row() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.store.tasks_for(app.cursor.key())[0].completed);

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.store.tasks_for(app.cursor.key())[0].completed);

        app.handle_key(key(KeyCode::Char('d')));
        assert!(app.store.tasks_for(app.cursor.key()).is_empty());
    }

    #[test]
    fn day_navigation_moves_between_empty_and_filled_days() {
        let temp = tempdir().expect("tempdir");
        let mut app = app(&temp);

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.cursor.key().to_string(), "2024-06-02");
        assert!(app.store.tasks_for(app.cursor.key()).is_empty());

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.store.tasks_for(app.cursor.key()).len(), 1);
    }
}
