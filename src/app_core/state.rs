//! State of one list-sheet presentation and its mutation methods.
//!
//! A `SheetState` lives from mount to dismissal. It owns the search input,
//! the focus handle and the fade controller; all three are released by
//! [`SheetState::dispose`], which also runs on drop.

use std::rc::Rc;
use std::time::Instant;

use ratatui::{layout::Rect, widgets::ListState};

use crate::app_core::chrome::ChromeState;
use crate::filter::FilterEngine;
use crate::model::{ActionOutcome, DismissReason, RowAction, SheetOutcome};
use crate::options::SheetOptions;

/// Text-field controller for the search box.
#[derive(Debug, Default, Clone)]
pub struct SearchInput {
    text: String,
    /// Caret position in chars.
    cursor: usize,
}

impl SearchInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.text.chars().count());
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self
            .text
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        if let Some((byte_idx, _)) = self.text.char_indices().nth(self.cursor) {
            self.text.remove(byte_idx);
        }
        true
    }

    pub fn delete(&mut self) -> bool {
        if let Some((byte_idx, _)) = self.text.char_indices().nth(self.cursor) {
            self.text.remove(byte_idx);
            return true;
        }
        false
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.text.is_empty();
        self.text.clear();
        self.cursor = 0;
        changed
    }

    /// Deletes the word before the caret, including trailing whitespace.
    pub fn delete_word(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut i = self.cursor;
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !chars[i - 1].is_whitespace() {
            i -= 1;
        }

        let byte_start = self
            .text
            .char_indices()
            .nth(i)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let byte_end = self
            .text
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        self.text.replace_range(byte_start..byte_end, "");
        self.cursor = i;
        true
    }
}

/// Keyboard focus for the search box.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FocusHandle {
    focused: bool,
}

impl FocusHandle {
    pub fn request(&mut self) {
        self.focused = true;
    }

    pub fn release(&mut self) {
        self.focused = false;
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }
}

/// Screen position of one rendered row and its action glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHit {
    pub visible_idx: usize,
    pub area: Rect,
    pub edit: Option<Rect>,
    pub delete: Option<Rect>,
}

/// Regions recorded during the last render, used for hit testing.
#[derive(Debug, Default, Clone)]
pub struct SheetLayout {
    pub close_button: Option<Rect>,
    pub search_input: Option<Rect>,
    pub search_clear: Option<Rect>,
    pub list_content: Option<Rect>,
    pub rows: Vec<RowHit>,
}

impl SheetLayout {
    pub fn row_at(&self, column: u16, row: u16) -> Option<&RowHit> {
        self.rows
            .iter()
            .find(|hit| hit.area.contains((column, row).into()))
    }
}

pub struct SheetState<T> {
    pub options: SheetOptions<T>,
    engine: FilterEngine<T>,
    pub input: SearchInput,
    pub focus: FocusHandle,
    pub chrome: ChromeState,
    /// Highlighted row, as an index into the visible list.
    pub list_state: ListState,
    pub layout: SheetLayout,
    outcome: Option<SheetOutcome<T>>,
}

impl<T> SheetState<T> {
    /// Emptiness of the caller's list; decides between the empty state and
    /// the no-results state.
    pub fn is_source_empty(&self) -> bool {
        self.engine.source_is_empty()
    }

    pub fn engine(&self) -> &FilterEngine<T> {
        &self.engine
    }

    pub fn query(&self) -> &str {
        self.input.text()
    }

    pub fn is_checked(&self, item: &T) -> bool {
        self.options.show_checkbox
            && self
                .options
                .is_checked
                .as_ref()
                .is_some_and(|is_checked| is_checked(item))
    }

    pub fn has_row_actions(&self) -> bool {
        self.options.on_edit.is_some() || self.options.on_delete.is_some()
    }

    pub fn outcome(&self) -> Option<&SheetOutcome<T>> {
        self.outcome.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn take_outcome(&mut self) -> Option<SheetOutcome<T>> {
        self.outcome.take()
    }

    /// Records the outcome. Later calls are ignored so the result is
    /// delivered exactly once.
    fn resolve(&mut self, outcome: SheetOutcome<T>) {
        if self.outcome.is_some() {
            return;
        }
        match &outcome {
            SheetOutcome::Selected(_) => tracing::debug!("sheet resolved with selection"),
            SheetOutcome::Dismissed(reason) => tracing::debug!(?reason, "sheet dismissed"),
        }
        self.outcome = Some(outcome);
    }

    pub fn dismiss(&mut self, reason: DismissReason) {
        self.resolve(SheetOutcome::Dismissed(reason));
    }

    /// Re-runs the filter for the current query and resets the highlight.
    pub fn update_filter(&mut self) {
        self.engine
            .refilter(self.options.search_filter.as_ref(), self.input.text());
        if self.engine.visible_len() == 0 {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
        *self.list_state.offset_mut() = 0;
        tracing::debug!(
            query = %self.input.text(),
            visible = self.engine.visible_len(),
            "query changed"
        );
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.input.set_text(query);
        self.update_filter();
    }

    pub fn clear_query(&mut self) {
        if self.input.clear() {
            self.update_filter();
        }
    }

    /// Hands the sheet a new input list. A different allocation re-applies
    /// the sort and re-filters with the current query.
    pub fn set_data(&mut self, data: Rc<Vec<T>>) -> bool {
        let replaced = self.engine.replace_source(
            Rc::clone(&data),
            self.options.sort_items.as_ref(),
            self.options.search_filter.as_ref(),
            self.input.text(),
        );
        if replaced {
            self.options.data = data;
            self.clamp_selection();
            tracing::debug!(
                items = self.engine.source().len(),
                visible = self.engine.visible_len(),
                "input list replaced"
            );
        }
        replaced
    }

    /// Clamps the highlight to the visible list bounds.
    pub fn clamp_selection(&mut self) {
        let len = self.engine.visible_len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        match self.list_state.selected() {
            Some(selected) if selected >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    /// Moves the highlight by `delta` rows, clamped to the visible list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.engine.visible_len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.list_state.select(Some(next));
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.list_state
            .selected()
            .filter(|&idx| idx < self.engine.visible_len())
    }

    /// Invokes the edit or delete callback for a visible row. Returns `false`
    /// when the row or callback does not exist.
    pub fn run_action(&mut self, action: RowAction, visible_idx: usize) -> bool {
        let Some(item) = self.engine.visible_item(visible_idx) else {
            return false;
        };
        let callback = match action {
            RowAction::Edit => self.options.on_edit.as_mut(),
            RowAction::Delete => self.options.on_delete.as_mut(),
        };
        let Some(callback) = callback else {
            return false;
        };
        tracing::debug!(?action, visible_idx, "row action");
        if let ActionOutcome::Replace(data) = callback(item, visible_idx) {
            self.set_data(data);
        }
        true
    }

    /// Releases the search input, focus handle and fade controller.
    /// Idempotent.
    pub fn dispose(&mut self) {
        if !self.chrome.dispose() {
            return;
        }
        self.input.clear();
        self.focus.release();
        self.layout = SheetLayout::default();
        tracing::debug!("sheet disposed");
    }
}

impl<T: Clone> SheetState<T> {
    pub fn new(options: SheetOptions<T>, now: Instant) -> Self {
        let input = SearchInput::default();
        let engine = FilterEngine::new(
            Rc::clone(&options.data),
            options.sort_items.as_ref(),
            options.search_filter.as_ref(),
            input.text(),
        );
        let mut list_state = ListState::default();
        if engine.visible_len() > 0 {
            list_state.select(Some(0));
        }
        let mut focus = FocusHandle::default();
        focus.request();
        let chrome = ChromeState::mount(options.chrome.animation_duration, now);
        tracing::debug!(items = engine.source().len(), "sheet presented");
        Self {
            options,
            engine,
            input,
            focus,
            chrome,
            list_state,
            layout: SheetLayout::default(),
            outcome: None,
        }
    }

    /// Picks the visible row at `visible_idx`: runs `on_selected` and resolves
    /// the sheet with a clone of the item.
    pub fn select_visible(&mut self, visible_idx: usize) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let Some(item) = self.engine.visible_item(visible_idx).cloned() else {
            return false;
        };
        if let Some(on_selected) = self.options.on_selected.as_mut() {
            on_selected(&item);
        }
        self.resolve(SheetOutcome::Selected(item));
        true
    }
}

impl<T> Drop for SheetState<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_core::chrome::SheetPhase;
    use pretty_assertions::assert_eq;
    use ratatui::text::Line;
    use std::cell::RefCell;

    fn fruit_options(items: &[&str]) -> SheetOptions<String> {
        let data = Rc::new(items.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        SheetOptions::new(
            data,
            "Search",
            |item: &String| Line::from(item.clone()),
            |item: &String, query: &str| item.to_lowercase().contains(&query.to_lowercase()),
        )
    }

    fn visible(state: &SheetState<String>) -> Vec<String> {
        state.engine().visible_items().cloned().collect()
    }

    #[test]
    fn test_search_input_editing() {
        let mut input = SearchInput::default();
        for c in "hello world".chars() {
            input.insert_char(c);
        }
        input.move_to_start();
        input.move_right();
        assert!(input.delete());
        assert_eq!(input.text(), "hllo world");
        input.move_to_end();
        assert!(input.delete_word());
        assert_eq!(input.text(), "hllo ");
        assert!(input.backspace());
        assert_eq!(input.text(), "hllo");
        assert!(input.clear());
        assert!(!input.clear());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_search_input_handles_multibyte() {
        let mut input = SearchInput::default();
        input.set_text("héllo");
        input.set_cursor(2);
        input.insert_char('x');
        assert_eq!(input.text(), "héxllo");
        input.set_cursor(99);
        assert_eq!(input.cursor(), 6);
    }

    #[test]
    fn test_new_state_highlights_first_row_and_focuses() {
        let state = SheetState::new(fruit_options(&["Apple", "Banana"]), Instant::now());
        assert_eq!(state.highlighted(), Some(0));
        assert!(state.focus.has_focus());
        assert_eq!(state.chrome.phase, SheetPhase::Idle);
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_query_filters_and_clear_restores() {
        let mut state =
            SheetState::new(fruit_options(&["Apple", "Banana", "Cherry"]), Instant::now());
        state.set_query("an");
        assert_eq!(visible(&state), vec!["Banana"]);
        state.clear_query();
        assert_eq!(visible(&state), vec!["Apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_no_match_keeps_source_non_empty() {
        let mut state = SheetState::new(fruit_options(&["Apple", "Banana"]), Instant::now());
        state.set_query("xyz");
        assert!(visible(&state).is_empty());
        assert!(!state.is_source_empty());
        assert_eq!(state.highlighted(), None);
    }

    #[test]
    fn test_select_resolves_once() {
        let mut state =
            SheetState::new(fruit_options(&["Apple", "Banana", "Cherry"]), Instant::now());
        state.set_query("an");
        assert!(state.select_visible(0));
        assert!(!state.select_visible(0));
        state.dismiss(DismissReason::CloseButton);
        assert_eq!(
            state.take_outcome(),
            Some(SheetOutcome::Selected("Banana".to_string()))
        );
    }

    #[test]
    fn test_on_selected_runs_before_resolution() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = fruit_options(&["Apple"])
            .with_on_selected(move |item: &String| sink.borrow_mut().push(item.clone()));
        let mut state = SheetState::new(options, Instant::now());
        state.select_visible(0);
        assert_eq!(*seen.borrow(), vec!["Apple".to_string()]);
    }

    #[test]
    fn test_actions_receive_visible_index() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let options = fruit_options(&["Apple", "Banana", "Mango"]).with_on_edit(
            move |item: &String, idx| {
                sink.borrow_mut().push((item.clone(), idx));
                ActionOutcome::Keep
            },
        );
        let mut state = SheetState::new(options, Instant::now());
        state.set_query("an");
        assert!(state.run_action(RowAction::Edit, 1));
        assert!(!state.run_action(RowAction::Delete, 1));
        assert!(!state.run_action(RowAction::Edit, 5));
        assert_eq!(*calls.borrow(), vec![("Mango".to_string(), 1)]);
    }

    #[test]
    fn test_delete_replacing_list_rederives_view() {
        let backing = Rc::new(RefCell::new(vec![
            "Apple".to_string(),
            "Banana".to_string(),
            "Mango".to_string(),
        ]));
        let shared = Rc::clone(&backing);
        let options = fruit_options(&["Apple", "Banana", "Mango"]).with_on_delete(
            move |item: &String, _idx| {
                shared.borrow_mut().retain(|existing| existing != item);
                ActionOutcome::Replace(Rc::new(shared.borrow().clone()))
            },
        );
        let mut state = SheetState::new(options, Instant::now());
        state.set_query("an");
        state.list_state.select(Some(1));
        assert!(state.run_action(RowAction::Delete, 1));
        assert_eq!(visible(&state), vec!["Banana"]);
        assert_eq!(state.highlighted(), Some(0));
        assert_eq!(backing.borrow().len(), 2);
    }

    #[test]
    fn test_set_data_with_same_rc_is_noop() {
        let mut state = SheetState::new(fruit_options(&["Apple"]), Instant::now());
        let same = Rc::clone(&state.options.data);
        assert!(!state.set_data(same));
        assert!(state.set_data(Rc::new(vec!["Kiwi".to_string()])));
        assert_eq!(visible(&state), vec!["Kiwi"]);
    }

    #[test]
    fn test_checkbox_reads_caller_predicate() {
        let options = fruit_options(&["Apple", "Banana"]).with_checkbox(|item| item == "Banana");
        let state = SheetState::new(options, Instant::now());
        assert!(!state.is_checked(&"Apple".to_string()));
        assert!(state.is_checked(&"Banana".to_string()));
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut state =
            SheetState::new(fruit_options(&["Apple", "Banana", "Cherry"]), Instant::now());
        state.move_selection(-1);
        assert_eq!(state.highlighted(), Some(0));
        state.move_selection(10);
        assert_eq!(state.highlighted(), Some(2));
    }

    #[test]
    fn test_dispose_releases_resources() {
        let mut state = SheetState::new(fruit_options(&["Apple"]), Instant::now());
        state.set_query("ap");
        state.dispose();
        assert_eq!(state.chrome.phase, SheetPhase::Disposed);
        assert!(!state.focus.has_focus());
        assert!(state.input.is_empty());
        assert!(!state.chrome.fade.is_running());
        state.dispose();
    }
}
