use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use daylist_core::task::{MAX_TEXT_LEN, Task};

use crate::app::{App, Mode};

const WARN_TEXT_LEN: usize = 80;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_tasks(frame, app, chunks[1]);
    draw_input(frame, app, chunks[2]);
    draw_status(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            app.cursor.label(app.today),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", app.cursor.key()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" daylist "));
    frame.render_widget(header, area);
}

fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = app.store.tasks_for(app.cursor.key());

    let mut items = Vec::with_capacity(tasks.len());
    for (idx, task) in tasks.iter().enumerate() {
        let item = if let Mode::Editing { id, buffer } = &app.mode
            && *id == task.id
        {
            edit_row(buffer)
        } else {
            let selected = idx == app.selected && matches!(app.mode, Mode::Viewing);
            task_row(task, selected)
        };
        items.push(item);
    }

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" tasks "));
    frame.render_widget(list, area);
}

fn task_row(task: &Task, selected: bool) -> ListItem<'static> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };

    let mut text_style = Style::default();
    if task.completed {
        text_style = text_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let mut line = Line::from(vec![
        Span::raw(checkbox.to_string()),
        Span::styled(task.text.clone(), text_style),
    ]);
    if selected {
        line = line.style(Style::default().add_modifier(Modifier::REVERSED));
    }

    ListItem::new(line)
}

fn edit_row(buffer: &str) -> ListItem<'static> {
    let len = buffer.chars().count();
    let line = Line::from(vec![
        Span::styled("[e] ".to_string(), Style::default().fg(Color::Cyan)),
        Span::raw(buffer.to_string()),
        Span::styled(" ".to_string(), Style::default().add_modifier(Modifier::REVERSED)),
        Span::styled(format!("  {len}/{MAX_TEXT_LEN}"), counter_style(len)),
    ]);
    ListItem::new(line)
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let adding = matches!(app.mode, Mode::Adding);
    let len = app.input.chars().count();

    let mut spans = vec![Span::raw(app.input.clone())];
    if adding {
        spans.push(Span::styled(
            " ".to_string(),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }
    spans.push(Span::styled(
        format!("  {len}/{MAX_TEXT_LEN}"),
        counter_style(len),
    ));

    let border_style = if adding {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" new task "),
    );
    frame.render_widget(input, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.status {
        Some(message) => (message.clone(), Style::default().fg(Color::Yellow)),
        None => {
            let hints = match app.mode {
                Mode::Viewing => {
                    "arrows: day/row   space: toggle   a: add   e: edit   d: delete   q: quit"
                }
                Mode::Adding | Mode::Editing { .. } => "enter: commit   esc: leave",
            };
            (hints.to_string(), Style::default().fg(Color::DarkGray))
        }
    };

    frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
}

/// Counter styling per the input rules: plain below 80 characters,
/// warning from 80, error from 100.
fn counter_style(len: usize) -> Style {
    if len >= MAX_TEXT_LEN {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if len >= WARN_TEXT_LEN {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
