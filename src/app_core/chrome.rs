//! Lifecycle and dismissal gestures common to every sheet flavour.

use std::time::{Duration, Instant};

use ratatui::layout::{Position, Rect};

use crate::app_core::animation::FadeController;
use crate::app_core::input::{SheetMouseEvent, SheetMouseKind};
use crate::model::DismissReason;
use crate::options::SheetChrome;

/// Rows the pointer has to travel downward from the drag handle to dismiss.
pub const DRAG_DISMISS_ROWS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPhase {
    /// Mounted, fade-in running. Fully interactive.
    Idle,
    /// Fade-in finished.
    Settled,
    /// Resources released. Terminal.
    Disposed,
}

/// How the chrome handled a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Dismiss(DismissReason),
    /// Handled by the chrome; content should not see it.
    Consumed,
    Passthrough,
}

#[derive(Debug)]
pub struct ChromeState {
    pub phase: SheetPhase,
    pub fade: FadeController,
    /// Whole sheet rectangle from the last frame.
    pub sheet_area: Option<Rect>,
    /// Top rows of the sheet that start a drag.
    pub handle_area: Option<Rect>,
    drag_origin: Option<u16>,
}

impl ChromeState {
    pub fn mount(duration: Duration, now: Instant) -> Self {
        Self {
            phase: SheetPhase::Idle,
            fade: FadeController::start(duration, now),
            sheet_area: None,
            handle_area: None,
            drag_origin: None,
        }
    }

    /// Advances `Idle` to `Settled` once the fade completes. Returns `true` on
    /// the transition.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.phase == SheetPhase::Idle && self.fade.is_complete(now) {
            self.phase = SheetPhase::Settled;
            tracing::trace!("sheet settled");
            return true;
        }
        false
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        match self.phase {
            SheetPhase::Idle => self.fade.opacity(now),
            SheetPhase::Settled | SheetPhase::Disposed => 1.0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.phase == SheetPhase::Idle
    }

    /// Stops the animation and forgets gesture state. Returns `false` if the
    /// sheet was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.phase == SheetPhase::Disposed {
            return false;
        }
        self.fade.stop();
        self.drag_origin = None;
        self.sheet_area = None;
        self.handle_area = None;
        self.phase = SheetPhase::Disposed;
        true
    }

    pub fn handle_mouse(&mut self, chrome: &SheetChrome, event: SheetMouseEvent) -> Gesture {
        let Some(sheet) = self.sheet_area else {
            return Gesture::Passthrough;
        };
        let position = Position::new(event.column, event.row);
        match event.kind {
            SheetMouseKind::LeftDown => {
                if !sheet.contains(position) {
                    return if chrome.is_dismissible {
                        Gesture::Dismiss(DismissReason::OutsideTap)
                    } else {
                        Gesture::Consumed
                    };
                }
                if chrome.enable_drag
                    && let Some(handle) = self.handle_area
                    && handle.contains(position)
                {
                    self.drag_origin = Some(event.row);
                    return Gesture::Consumed;
                }
                Gesture::Passthrough
            }
            SheetMouseKind::Drag => match self.drag_origin {
                Some(origin) if event.row >= origin.saturating_add(DRAG_DISMISS_ROWS) => {
                    self.drag_origin = None;
                    Gesture::Dismiss(DismissReason::Drag)
                }
                Some(_) => Gesture::Consumed,
                None => Gesture::Passthrough,
            },
            SheetMouseKind::LeftUp => {
                if self.drag_origin.take().is_some() {
                    Gesture::Consumed
                } else {
                    Gesture::Passthrough
                }
            }
            SheetMouseKind::ScrollUp | SheetMouseKind::ScrollDown => Gesture::Passthrough,
        }
    }
}
