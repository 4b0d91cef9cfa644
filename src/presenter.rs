//! Presentation entry points: run a sheet until it resolves.
//!
//! [`show_in`] and [`show_custom_in`] drive the draw/event loop on a terminal
//! owned by the caller, reading input from any [`EventSource`]. [`show`] and
//! [`show_custom`] take over the real terminal for the duration of the sheet.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

use crate::app_core::custom::CustomSheetState;
use crate::app_core::input::{
    HostEvent, SheetKeyCode, SheetKeyEvent, SheetMouseEvent, SheetMouseKind,
};
use crate::app_core::reducer;
use crate::app_core::state::SheetState;
use crate::model::{DismissReason, SheetOutcome};
use crate::options::{CustomSheetOptions, SheetOptions};
use crate::ui;

/// Poll interval while the fade-in runs.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Poll interval once the sheet has settled.
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("backend failed to draw: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HostError {
    fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Source of host input for a presented sheet.
pub trait EventSource {
    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived and the loop should just redraw.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<HostEvent>, HostError>;
}

/// Reads events from the real terminal through crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<HostEvent>, HostError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = match event::read()? {
            Event::Key(key) => {
                crossterm_to_sheet_key_event(key.code, key.modifiers, key.kind).map(HostEvent::Key)
            }
            Event::Mouse(mouse) => crossterm_to_sheet_mouse_event(&mouse).map(HostEvent::Mouse),
            Event::Resize(_, _) => Some(HostEvent::Resize),
            _ => None,
        };
        Ok(event)
    }
}

/// Pre-recorded events, replayed in order. Once exhausted it reports
/// [`HostEvent::Shutdown`] so a loop driven by it always terminates.
#[derive(Debug, Default, Clone)]
pub struct ScriptedEvents {
    queue: VecDeque<HostEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = HostEvent>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: HostEvent) {
        self.queue.push_back(event);
    }

    /// Appends one key event per character of `text`.
    pub fn type_text(&mut self, text: &str) {
        self.queue.extend(
            text.chars()
                .map(|c| HostEvent::Key(SheetKeyEvent::new(SheetKeyCode::Char(c)))),
        );
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, _timeout: Duration) -> Result<Option<HostEvent>, HostError> {
        Ok(Some(self.queue.pop_front().unwrap_or(HostEvent::Shutdown)))
    }
}

fn crossterm_to_sheet_key_event(
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) -> Option<SheetKeyEvent> {
    if matches!(kind, KeyEventKind::Release) {
        return None;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let super_key = modifiers.contains(KeyModifiers::SUPER);

    let key_code = match code {
        KeyCode::Char(c) => SheetKeyCode::Char(c),
        KeyCode::Backspace => SheetKeyCode::Backspace,
        KeyCode::Delete => SheetKeyCode::Delete,
        KeyCode::Enter => SheetKeyCode::Enter,
        KeyCode::Esc => SheetKeyCode::Esc,
        KeyCode::Up => SheetKeyCode::Up,
        KeyCode::Down => SheetKeyCode::Down,
        KeyCode::Left => SheetKeyCode::Left,
        KeyCode::Right => SheetKeyCode::Right,
        KeyCode::Home => SheetKeyCode::Home,
        KeyCode::End => SheetKeyCode::End,
        KeyCode::PageUp => SheetKeyCode::PageUp,
        KeyCode::PageDown => SheetKeyCode::PageDown,
        _ => return None,
    };

    Some(SheetKeyEvent {
        code: key_code,
        ctrl: ctrl || super_key,
        alt,
    })
}

fn crossterm_to_sheet_mouse_event(mouse: &event::MouseEvent) -> Option<SheetMouseEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => SheetMouseKind::LeftDown,
        MouseEventKind::Up(MouseButton::Left) => SheetMouseKind::LeftUp,
        MouseEventKind::Drag(MouseButton::Left) => SheetMouseKind::Drag,
        MouseEventKind::ScrollUp => SheetMouseKind::ScrollUp,
        MouseEventKind::ScrollDown => SheetMouseKind::ScrollDown,
        _ => return None,
    };
    Some(SheetMouseEvent::new(kind, mouse.column, mouse.row))
}

/// Presents the searchable list sheet on `terminal` and blocks until it is
/// resolved. Returns the selected item, or `None` when dismissed.
pub fn show_in<T, B, E>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    options: SheetOptions<T>,
) -> Result<Option<T>, HostError>
where
    T: Clone,
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
    E: EventSource + ?Sized,
{
    let mut state = SheetState::new(options, Instant::now());
    let result = run_sheet(terminal, events, &mut state);
    state.dispose();
    result?;
    Ok(state.take_outcome().and_then(SheetOutcome::into_selection))
}

fn run_sheet<T, B, E>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    state: &mut SheetState<T>,
) -> Result<(), HostError>
where
    T: Clone,
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
    E: EventSource + ?Sized,
{
    while !state.is_resolved() {
        let now = Instant::now();
        state.chrome.tick(now);
        terminal
            .draw(|f| ui::render_sheet(f, state, now))
            .map_err(HostError::backend)?;

        let timeout = if state.chrome.is_animating() {
            FRAME_INTERVAL
        } else {
            IDLE_INTERVAL
        };
        match events.next_event(timeout)? {
            Some(HostEvent::Key(key)) => reducer::handle_key_event(state, key),
            Some(HostEvent::Mouse(mouse)) => {
                reducer::handle_mouse_event(state, mouse);
            }
            Some(HostEvent::Shutdown) => state.dismiss(DismissReason::Host),
            Some(HostEvent::Resize) | None => {}
        }
    }
    Ok(())
}

/// Presents arbitrary content in the sheet chrome and blocks until it is
/// dismissed.
pub fn show_custom_in<B, E>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    options: CustomSheetOptions,
) -> Result<(), HostError>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
    E: EventSource + ?Sized,
{
    let mut state = CustomSheetState::new(options, Instant::now());
    let result = run_custom_sheet(terminal, events, &mut state);
    state.dispose();
    result
}

fn run_custom_sheet<B, E>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    state: &mut CustomSheetState,
) -> Result<(), HostError>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
    E: EventSource + ?Sized,
{
    while state.dismissed().is_none() {
        let now = Instant::now();
        state.chrome.tick(now);
        terminal
            .draw(|f| ui::render_custom_sheet(f, state, now))
            .map_err(HostError::backend)?;

        let timeout = if state.chrome.is_animating() {
            FRAME_INTERVAL
        } else {
            IDLE_INTERVAL
        };
        match events.next_event(timeout)? {
            Some(HostEvent::Key(key)) => state.handle_key_event(key),
            Some(HostEvent::Mouse(mouse)) => {
                state.handle_mouse_event(mouse);
            }
            Some(HostEvent::Shutdown) => state.dismiss(DismissReason::Host),
            Some(HostEvent::Resize) | None => {}
        }
    }
    Ok(())
}

/// Raw mode, alternate screen and mouse capture for as long as it lives.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self, HostError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = restore_terminal(&mut stdout);
            return Err(err.into());
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = restore_terminal(&mut io::stdout());
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = restore_terminal(self.terminal.backend_mut()) {
            tracing::warn!(%err, "failed to restore terminal");
        }
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal(out: &mut impl Write) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(out, LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// [`show_in`] on the process terminal. The terminal is restored on every
/// exit path, including errors.
pub fn show<T: Clone>(options: SheetOptions<T>) -> Result<Option<T>, HostError> {
    let mut guard = TerminalGuard::enter()?;
    show_in(&mut guard.terminal, &mut CrosstermEvents, options)
}

/// [`show_custom_in`] on the process terminal.
pub fn show_custom(options: CustomSheetOptions) -> Result<(), HostError> {
    let mut guard = TerminalGuard::enter()?;
    show_custom_in(&mut guard.terminal, &mut CrosstermEvents, options)
}
