//! State and event handling for sheets that host caller-supplied content.

use std::time::Instant;

use ratatui::layout::{Position, Rect};
use tui_scrollview::ScrollViewState;

use crate::app_core::chrome::{ChromeState, Gesture};
use crate::app_core::input::{SheetKeyCode, SheetKeyEvent, SheetMouseEvent, SheetMouseKind};
use crate::model::DismissReason;
use crate::options::CustomSheetOptions;

pub struct CustomSheetState {
    pub options: CustomSheetOptions,
    pub chrome: ChromeState,
    pub scroll: ScrollViewState,
    /// Viewport of the content from the last frame.
    pub content_area: Option<Rect>,
    dismissed: Option<DismissReason>,
}

impl CustomSheetState {
    pub fn new(options: CustomSheetOptions, now: Instant) -> Self {
        let chrome = ChromeState::mount(options.chrome.animation_duration, now);
        tracing::debug!("custom sheet presented");
        Self {
            options,
            chrome,
            scroll: ScrollViewState::default(),
            content_area: None,
            dismissed: None,
        }
    }

    pub fn dismissed(&self) -> Option<DismissReason> {
        self.dismissed
    }

    pub fn dismiss(&mut self, reason: DismissReason) {
        if self.dismissed.is_none() {
            tracing::debug!(?reason, "custom sheet dismissed");
            self.dismissed = Some(reason);
        }
    }

    pub fn handle_key_event(&mut self, event: SheetKeyEvent) {
        match event.code {
            SheetKeyCode::Esc => self.dismiss(DismissReason::Escape),
            SheetKeyCode::Up => self.scroll.scroll_up(),
            SheetKeyCode::Down => self.scroll.scroll_down(),
            SheetKeyCode::PageUp => self.scroll.scroll_page_up(),
            SheetKeyCode::PageDown => self.scroll.scroll_page_down(),
            SheetKeyCode::Home => self.scroll.scroll_to_top(),
            SheetKeyCode::End => self.scroll.scroll_to_bottom(),
            _ => {}
        }
    }

    /// Returns `true` if the sheet needs to be redrawn.
    pub fn handle_mouse_event(&mut self, event: SheetMouseEvent) -> bool {
        match self.chrome.handle_mouse(&self.options.chrome, event) {
            Gesture::Dismiss(reason) => {
                self.dismiss(reason);
                return true;
            }
            Gesture::Consumed => return false,
            Gesture::Passthrough => {}
        }

        let over_content = self
            .content_area
            .is_some_and(|area| area.contains(Position::new(event.column, event.row)));
        match event.kind {
            SheetMouseKind::ScrollDown if over_content => {
                self.scroll.scroll_down();
                true
            }
            SheetMouseKind::ScrollUp if over_content => {
                self.scroll.scroll_up();
                true
            }
            _ => false,
        }
    }

    pub fn dispose(&mut self) {
        if self.chrome.dispose() {
            self.content_area = None;
            tracing::debug!("custom sheet disposed");
        }
    }
}

impl Drop for CustomSheetState {
    fn drop(&mut self) {
        self.dispose();
    }
}
