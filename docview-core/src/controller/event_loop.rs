//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop Controller
//!
//! Multiplexes terminal input, background task results, queued actions and
//! the UI tick into a single stream of [`Action`]s.
//!
//! Key handling depends on the open overlay. Text entry (prompt, form, editor)
//! is applied to UI state right here and yields [`Action::NoOp`]; everything
//! that touches the document tree is returned as an action for the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::controller::actions::Action;
use crate::error::{FetchError, UploadError};
use crate::model::app_state::AppState;
use crate::model::ui_state::{FormField, RedrawFlag, UIOverlay};
use crate::tasks::content_task::ContentRequest;

/// Results reported back by background tasks.
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// A linked document finished loading (or failed).
    ContentFetched {
        request: ContentRequest,
        result: Result<String, FetchError>,
    },

    /// A local file picked in the add-document form was read.
    UploadRead {
        request_id: u64,
        result: Result<String, UploadError>,
    },
}

pub struct EventLoop {
    pub app: Arc<Mutex<AppState>>,
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    event_stream: EventStream,
    action_rx: mpsc::UnboundedReceiver<Action>,
    tick: Interval,
    event_count: u64,
}

impl EventLoop {
    pub fn new(
        app: Arc<Mutex<AppState>>,
        task_rx: mpsc::UnboundedReceiver<TaskResult>,
        action_rx: mpsc::UnboundedReceiver<Action>,
        tick_rate: Duration,
    ) -> Self {
        info!(?tick_rate, "Initializing event loop controller");
        let mut tick = tokio::time::interval(tick_rate.max(Duration::from_millis(10)));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            app,
            task_rx,
            event_stream: EventStream::new(),
            action_rx,
            tick,
            event_count: 0,
        }
    }

    /// Waits for the next action. The tick keeps this from ever running dry.
    pub async fn next_action(&mut self) -> Option<Action> {
        let action = tokio::select! {
            Some(event) = self.event_stream.next() => match event {
                Ok(event) => {
                    trace!("Terminal event received: {:?}", event);
                    let action = self.handle_terminal_event(event).await;
                    debug!("Terminal event mapped to action: {:?}", action);
                    Some(action)
                }
                Err(e) => {
                    warn!("Terminal event error: {}", e);
                    Some(Action::NoOp)
                }
            },

            Some(task_result) = self.task_rx.recv() => {
                debug!("Task result received: {:?}", task_result);
                Some(Action::TaskResult(task_result))
            }

            Some(action) = self.action_rx.recv() => {
                debug!("Direct action received: {:?}", action);
                Some(action)
            }

            _ = self.tick.tick() => Some(Action::Tick),
        };

        self.event_count += 1;
        trace!(events = self.event_count, "Event loop iteration");
        action
    }

    async fn handle_terminal_event(&self, event: TermEvent) -> Action {
        match event {
            TermEvent::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                trace!(
                    "Key event: code={:?}, modifiers={:?}",
                    key_event.code, key_event.modifiers
                );
                let mut app = self.app.lock().await;
                map_key(&mut app, key_event)
            }

            TermEvent::Resize(x, y) => {
                info!("Terminal resize: {}x{}", x, y);
                Action::Resize(x, y)
            }

            _ => {
                trace!("Unhandled terminal event: {:?}", event);
                Action::NoOp
            }
        }
    }
}

/// Maps a key press to an action for the current overlay.
pub(crate) fn map_key(app: &mut AppState, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    let overlay = app.ui.overlay;
    if key.code == KeyCode::Esc {
        return handle_escape_key(app, overlay);
    }

    match overlay {
        UIOverlay::None => handle_navigation_keys(key),
        UIOverlay::Help => match key.code {
            KeyCode::Char('?' | 'q') | KeyCode::Enter => Action::CloseOverlay,
            _ => Action::NoOp,
        },
        UIOverlay::ContextMenu => handle_context_menu_keys(key),
        UIOverlay::Prompt => handle_prompt_keys(app, key),
        UIOverlay::ConfirmDelete => handle_confirm_keys(app, key),
        UIOverlay::AddDocument => handle_form_keys(app, key),
        UIOverlay::Editor => handle_editor_keys(app, key),
    }
}

/// Escape priority: notification, then overlay, then quit.
fn handle_escape_key(app: &mut AppState, overlay: UIOverlay) -> Action {
    if app.ui.notification.is_some() {
        debug!("Escape: dismissing notification");
        app.ui.dismiss_notification();
        return Action::NoOp;
    }

    if overlay != UIOverlay::None {
        debug!("Escape: closing overlay {:?}", overlay);
        return Action::CloseOverlay;
    }

    debug!("Escape: requesting application quit");
    Action::Quit
}

fn handle_navigation_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::MoveCursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveCursorDown,
        KeyCode::Enter => Action::SelectAtCursor,
        KeyCode::Right | KeyCode::Char('l') => Action::ExpandAtCursor,
        KeyCode::Left | KeyCode::Char('h') => Action::CollapseAtCursor,
        KeyCode::Char(' ') => Action::ToggleExpandAtCursor,
        KeyCode::PageUp => Action::ScrollContentUp,
        KeyCode::PageDown => Action::ScrollContentDown,
        KeyCode::Char('m') => Action::OpenContextMenu,
        KeyCode::Char('a') => Action::AddRootCategory,
        KeyCode::Char('n') => Action::AddRootDocument,
        KeyCode::Char('e') => Action::OpenEditor,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::NoOp,
    }
}

fn handle_context_menu_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::ContextMenuUp,
        KeyCode::Down | KeyCode::Char('j') => Action::ContextMenuDown,
        KeyCode::Enter => Action::ContextMenuActivate,
        KeyCode::Char('m' | 'q') => Action::CloseOverlay,
        _ => Action::NoOp,
    }
}

fn handle_prompt_keys(app: &mut AppState, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char(c) => {
            app.ui.insert_char(c);
            Action::NoOp
        }
        KeyCode::Backspace => {
            app.ui.delete_char_before();
            Action::NoOp
        }
        KeyCode::Left => {
            app.ui.move_input_cursor_left();
            Action::NoOp
        }
        KeyCode::Right => {
            app.ui.move_input_cursor_right();
            Action::NoOp
        }
        KeyCode::Enter => match app.ui.prompt.clone() {
            Some(kind) => {
                let input = app.ui.input.to_string();
                info!("Submitting prompt input: '{}'", input);
                Action::SubmitPrompt { kind, input }
            }
            None => Action::CloseOverlay,
        },
        _ => Action::NoOp,
    }
}

fn handle_confirm_keys(app: &AppState, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => app
            .ui
            .confirm_delete
            .clone()
            .map_or(Action::CloseOverlay, Action::ConfirmDelete),
        KeyCode::Char('n' | 'N' | 'q') => Action::CloseOverlay,
        _ => Action::NoOp,
    }
}

fn handle_form_keys(app: &mut AppState, key: KeyEvent) -> Action {
    let Some(form) = app.ui.add_document.as_mut() else {
        return Action::CloseOverlay;
    };

    match key.code {
        KeyCode::Enter => return Action::SubmitAddDocument,
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left if form.focus == FormField::Kind => form.cycle_kind(false),
        KeyCode::Right if form.focus == FormField::Kind => form.cycle_kind(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => return Action::NoOp,
    }
    app.ui.request_redraw(RedrawFlag::Overlay);
    Action::NoOp
}

fn handle_editor_keys(app: &mut AppState, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        return Action::SaveEditor;
    }
    let Some(editor) = app.ui.editor.as_mut() else {
        return Action::CloseOverlay;
    };

    match key.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Tab => {
            for _ in 0..4 {
                editor.insert_char(' ');
            }
        }
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.home(),
        KeyCode::End => editor.end(),
        _ => return Action::NoOp,
    }
    app.ui.request_redraw(RedrawFlag::Overlay);
    Action::NoOp
}
