//! Terminal front end.
//!
//! Draws a [`TodoView`] with ratatui and turns crossterm key events into
//! [`TodoAction`] commands. The selected row is the only state kept here.

use crate::TodoStore;
use crate::types::TodoAction;
use crate::view::{ADD_LABEL, ListBody, TaskRow, TodoView};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::time::Duration;

/// How long to wait for input before redrawing
const TICK: Duration = Duration::from_millis(100);

const HELP: &str = "Enter add · ↑/↓ select · Ctrl-T toggle · Ctrl-D delete · Ctrl-R refresh · Esc quit";

/// What a key press asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Send this command to the store
    Send(TodoAction),
    /// Leave the UI
    Quit,
    /// Nothing to do
    Ignore,
}

/// Selection within the list
#[derive(Debug, Default)]
pub struct UiState {
    list: ListState,
}

impl UiState {
    /// Index of the selected row
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.list.selected()
    }

    /// Keeps the selection inside a list of `len` rows
    pub fn clamp(&mut self, len: usize) {
        match (self.list.selected(), len) {
            (_, 0) => self.list.select(None),
            (None, _) => self.list.select(Some(0)),
            (Some(i), len) if i >= len => self.list.select(Some(len - 1)),
            _ => {},
        }
    }

    fn selected_row<'a>(&self, view: &'a TodoView) -> Option<&'a TaskRow> {
        self.list.selected().and_then(|i| view.rows().get(i))
    }

    fn select_previous(&mut self) {
        if let Some(i) = self.list.selected() {
            self.list.select(Some(i.saturating_sub(1)));
        }
    }

    fn select_next(&mut self, len: usize) {
        if let Some(i) = self.list.selected() {
            if i + 1 < len {
                self.list.select(Some(i + 1));
            }
        }
    }
}

/// Maps a key press to a command against the current view
pub fn handle_key(key: KeyEvent, view: &TodoView, ui: &mut UiState) -> KeyOutcome {
    if key.kind != KeyEventKind::Press {
        return KeyOutcome::Ignore;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => KeyOutcome::Quit,
        KeyCode::Char('c') if ctrl => KeyOutcome::Quit,
        KeyCode::Char('r') if ctrl => KeyOutcome::Send(TodoAction::Refresh),
        KeyCode::Char('t') if ctrl => ui
            .selected_row(view)
            .filter(|row| row.enabled)
            .map_or(KeyOutcome::Ignore, |row| {
                KeyOutcome::Send(TodoAction::ToggleComplete {
                    id: row.id,
                    is_completed: row.is_completed,
                })
            }),
        KeyCode::Char('d') if ctrl => ui
            .selected_row(view)
            .filter(|row| row.enabled)
            .map_or(KeyOutcome::Ignore, |row| {
                KeyOutcome::Send(TodoAction::Delete { id: row.id })
            }),
        KeyCode::Up => {
            ui.select_previous();
            KeyOutcome::Ignore
        },
        KeyCode::Down => {
            ui.select_next(view.rows().len());
            KeyOutcome::Ignore
        },
        KeyCode::Enter if view.add_enabled => KeyOutcome::Send(TodoAction::Create),
        KeyCode::Char(c) if !ctrl && view.input.enabled => {
            if view.input.value.chars().count() >= view.input.max_len {
                return KeyOutcome::Ignore;
            }
            let mut text = view.input.value.clone();
            text.push(c);
            KeyOutcome::Send(TodoAction::InputChanged { text })
        },
        KeyCode::Backspace if view.input.enabled && !view.input.value.is_empty() => {
            let mut text = view.input.value.clone();
            text.pop();
            KeyOutcome::Send(TodoAction::InputChanged { text })
        },
        _ => KeyOutcome::Ignore,
    }
}

/// Draws `view` into `frame`
pub fn render(frame: &mut Frame, view: &TodoView, ui: &mut UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Line::from(vec![
        Span::styled(view.title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::raw(view.total.as_str()),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    if let Some(error) = &view.error {
        frame.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            chunks[1],
        );
    }

    let input = if view.input.value.is_empty() {
        Span::styled(view.input.placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(view.input.value.as_str())
    };
    let add_style = if view.add_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(input)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(format!(" {ADD_LABEL} "), add_style))),
        ),
        chunks[2],
    );

    let list_block = Block::default().borders(Borders::ALL);
    match &view.body {
        ListBody::Loading(text) | ListBody::Empty(text) => {
            frame.render_widget(Paragraph::new(*text).block(list_block), chunks[3]);
        },
        ListBody::Rows(rows) => {
            let items: Vec<ListItem> = rows.iter().map(row_item).collect();
            let list = List::new(items)
                .block(list_block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, chunks[3], &mut ui.list);
        },
    }

    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn row_item(row: &TaskRow) -> ListItem<'_> {
    let name_style = if row.is_completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    let control_style = if row.enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    ListItem::new(Line::from(vec![
        Span::styled(row.name.as_str(), name_style),
        Span::raw("  "),
        Span::styled(format!("[{}]", row.toggle_label), control_style),
        Span::raw(" "),
        Span::styled(format!("[{}]", row.delete_label), control_style),
    ]))
}

/// Runs the UI until the user quits
///
/// Must be called from a multi-threaded tokio runtime; waiting for input
/// blocks the current worker.
///
/// # Errors
///
/// Returns an error if drawing or reading the terminal fails.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, store: &TodoStore) -> anyhow::Result<()> {
    let mut ui = UiState::default();

    loop {
        let view = store.state(TodoView::from_state).await;
        ui.clamp(view.rows().len());
        terminal.draw(|frame| render(frame, &view, &mut ui))?;

        let event = tokio::task::block_in_place(|| -> std::io::Result<Option<Event>> {
            if event::poll(TICK)? {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        })?;

        let Some(Event::Key(key)) = event else {
            continue;
        };

        match handle_key(key, &view, &mut ui) {
            KeyOutcome::Quit => return Ok(()),
            KeyOutcome::Send(action) => {
                tracing::debug!(?action, "Key press");
                store.send(action).await?;
            },
            KeyOutcome::Ignore => {},
        }
    }
}
