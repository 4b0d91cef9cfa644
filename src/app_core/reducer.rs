//! Event reducer for the list sheet.
//!
//! The presentation loop converts host events into [`SheetKeyEvent`] /
//! [`SheetMouseEvent`] and calls these functions; the sheet resolves by
//! recording an outcome on the state.

use ratatui::layout::Position;

use crate::app_core::chrome::Gesture;
use crate::app_core::input::{SheetKeyCode, SheetKeyEvent, SheetMouseEvent, SheetMouseKind};
use crate::app_core::state::{SearchInput, SheetState};
use crate::model::{DismissReason, RowAction};
use crate::ui;

pub const SCROLL_LINES: isize = 1;

/// Rows moved by PageUp/PageDown when the list has not been rendered yet.
const DEFAULT_PAGE: u16 = 10;

/// Handle a key event, mutating `state` in place.
pub fn handle_key_event<T: Clone>(state: &mut SheetState<T>, event: SheetKeyEvent) {
    fn apply_query_edit<T>(state: &mut SheetState<T>, edit: impl FnOnce(&mut SearchInput) -> bool) {
        if edit(&mut state.input) {
            state.update_filter();
        }
    }

    if state.is_resolved() {
        return;
    }

    let ctrl = event.ctrl;
    match event.code {
        SheetKeyCode::Esc => state.dismiss(DismissReason::Escape),
        SheetKeyCode::Enter => {
            if let Some(idx) = state.highlighted() {
                state.select_visible(idx);
            }
        }
        SheetKeyCode::Up => state.move_selection(-1),
        SheetKeyCode::Down => state.move_selection(1),
        SheetKeyCode::PageUp => state.move_selection(-page_size(state)),
        SheetKeyCode::PageDown => state.move_selection(page_size(state)),
        SheetKeyCode::Char('e') if ctrl => {
            if let Some(idx) = state.highlighted() {
                state.run_action(RowAction::Edit, idx);
            }
        }
        SheetKeyCode::Char('d') if ctrl => {
            if let Some(idx) = state.highlighted() {
                state.run_action(RowAction::Delete, idx);
            }
        }
        SheetKeyCode::Char('u') if ctrl => apply_query_edit(state, SearchInput::clear),
        SheetKeyCode::Char('w') if ctrl => apply_query_edit(state, SearchInput::delete_word),
        SheetKeyCode::Char('a') if ctrl => state.input.move_to_start(),
        SheetKeyCode::Char(c) if !ctrl && !event.alt => {
            // The search box is hidden when there is nothing to search.
            if !state.is_source_empty() {
                apply_query_edit(state, |input| {
                    input.insert_char(c);
                    true
                });
            }
        }
        SheetKeyCode::Backspace => apply_query_edit(state, SearchInput::backspace),
        SheetKeyCode::Delete => apply_query_edit(state, SearchInput::delete),
        SheetKeyCode::Left => state.input.move_left(),
        SheetKeyCode::Right => state.input.move_right(),
        SheetKeyCode::Home => state.input.move_to_start(),
        SheetKeyCode::End => state.input.move_to_end(),
        _ => {}
    }
}

/// Rows that fit in the list viewport.
fn page_size<T>(state: &SheetState<T>) -> isize {
    let rows = state
        .layout
        .list_content
        .map(|area| area.height / state.options.row_height())
        .unwrap_or(DEFAULT_PAGE);
    rows.max(1) as isize
}

/// Handle a mouse event. Returns `true` if the sheet needs to be redrawn.
pub fn handle_mouse_event<T: Clone>(state: &mut SheetState<T>, event: SheetMouseEvent) -> bool {
    if state.is_resolved() {
        return false;
    }

    match state.chrome.handle_mouse(&state.options.chrome, event) {
        Gesture::Dismiss(reason) => {
            state.dismiss(reason);
            return true;
        }
        Gesture::Consumed => return false,
        Gesture::Passthrough => {}
    }

    let (column, row) = (event.column, event.row);
    let position = Position::new(column, row);
    match event.kind {
        SheetMouseKind::ScrollUp | SheetMouseKind::ScrollDown => {
            let over_list = state
                .layout
                .list_content
                .is_some_and(|area| area.contains(position));
            if !over_list {
                return false;
            }
            let delta = if event.kind == SheetMouseKind::ScrollDown {
                SCROLL_LINES
            } else {
                -SCROLL_LINES
            };
            state.move_selection(delta);
            true
        }
        SheetMouseKind::LeftDown => {
            if state
                .layout
                .close_button
                .is_some_and(|area| area.contains(position))
            {
                state.dismiss(DismissReason::CloseButton);
                return true;
            }

            if state
                .layout
                .search_clear
                .is_some_and(|area| area.contains(position))
            {
                state.clear_query();
                return true;
            }

            if let Some(input_area) = state.layout.search_input
                && input_area.contains(position)
            {
                let scroll = ui::search_horizontal_scroll(
                    state.input.text(),
                    state.input.cursor(),
                    input_area.width,
                );
                let target = scroll + column.saturating_sub(input_area.x);
                let cursor = ui::search_cursor_for_column(state.input.text(), target);
                state.input.set_cursor(cursor);
                state.focus.request();
                return true;
            }

            if let Some(hit) = state.layout.row_at(column, row).copied() {
                if hit.edit.is_some_and(|area| area.contains(position)) {
                    state.run_action(RowAction::Edit, hit.visible_idx);
                } else if hit.delete.is_some_and(|area| area.contains(position)) {
                    state.run_action(RowAction::Delete, hit.visible_idx);
                } else {
                    state.list_state.select(Some(hit.visible_idx));
                    state.select_visible(hit.visible_idx);
                }
                return true;
            }
            false
        }
        SheetMouseKind::LeftUp | SheetMouseKind::Drag => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_core::state::RowHit;
    use crate::model::{ActionOutcome, SheetOutcome};
    use crate::options::SheetOptions;
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;
    use ratatui::text::Line;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    fn key(code: SheetKeyCode) -> SheetKeyEvent {
        SheetKeyEvent::new(code)
    }

    fn mouse(kind: SheetMouseKind, column: u16, row: u16) -> SheetMouseEvent {
        SheetMouseEvent::new(kind, column, row)
    }

    fn make_state(items: &[&str]) -> SheetState<String> {
        let data = Rc::new(items.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        let options = SheetOptions::new(
            data,
            "Search",
            |item: &String| Line::from(item.clone()),
            |item: &String, query: &str| item.to_lowercase().contains(&query.to_lowercase()),
        );
        SheetState::new(options, Instant::now())
    }

    fn type_text(state: &mut SheetState<String>, text: &str) {
        for c in text.chars() {
            handle_key_event(state, key(SheetKeyCode::Char(c)));
        }
    }

    fn visible(state: &SheetState<String>) -> Vec<String> {
        state.engine().visible_items().cloned().collect()
    }

    #[test]
    fn test_typing_filters_every_keystroke() {
        let mut state = make_state(&["Apple", "Banana", "Cherry"]);
        type_text(&mut state, "a");
        assert_eq!(visible(&state), vec!["Apple", "Banana"]);
        type_text(&mut state, "n");
        assert_eq!(visible(&state), vec!["Banana"]);
        handle_key_event(&mut state, key(SheetKeyCode::Backspace));
        assert_eq!(state.query(), "a");
        assert_eq!(visible(&state).len(), 2);
    }

    #[test]
    fn test_ctrl_u_clears_query() {
        let mut state = make_state(&["Apple", "Banana"]);
        type_text(&mut state, "xyz");
        assert!(visible(&state).is_empty());
        handle_key_event(&mut state, SheetKeyEvent::ctrl(SheetKeyCode::Char('u')));
        assert_eq!(state.query(), "");
        assert_eq!(visible(&state), vec!["Apple", "Banana"]);
    }

    #[test]
    fn test_enter_selects_highlighted() {
        let mut state = make_state(&["Apple", "Banana", "Cherry"]);
        handle_key_event(&mut state, key(SheetKeyCode::Down));
        handle_key_event(&mut state, key(SheetKeyCode::Enter));
        assert_eq!(
            state.take_outcome(),
            Some(SheetOutcome::Selected("Banana".to_string()))
        );
    }

    #[test]
    fn test_enter_without_matches_does_nothing() {
        let mut state = make_state(&["Apple"]);
        type_text(&mut state, "zz");
        handle_key_event(&mut state, key(SheetKeyCode::Enter));
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_esc_dismisses_without_value() {
        let mut state = make_state(&["Apple"]);
        handle_key_event(&mut state, key(SheetKeyCode::Esc));
        assert_eq!(
            state.take_outcome(),
            Some(SheetOutcome::Dismissed(DismissReason::Escape))
        );
    }

    #[test]
    fn test_typing_ignored_for_empty_list() {
        let mut state = make_state(&[]);
        type_text(&mut state, "abc");
        assert_eq!(state.query(), "");
    }

    #[test]
    fn test_ctrl_d_deletes_highlighted_with_visible_index() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut state = make_state(&["Apple", "Banana", "Mango"]);
        state.options.on_delete = Some(Box::new(move |item: &String, idx: usize| {
            sink.borrow_mut().push((item.clone(), idx));
            ActionOutcome::Keep
        }));
        type_text(&mut state, "an");
        handle_key_event(&mut state, key(SheetKeyCode::Down));
        handle_key_event(&mut state, SheetKeyEvent::ctrl(SheetKeyCode::Char('d')));
        assert_eq!(*calls.borrow(), vec![("Mango".to_string(), 1)]);
    }

    #[test]
    fn test_click_row_selects_item() {
        let mut state = make_state(&["Apple", "Banana"]);
        state.layout.rows = vec![
            RowHit {
                visible_idx: 0,
                area: Rect::new(1, 5, 30, 1),
                edit: None,
                delete: None,
            },
            RowHit {
                visible_idx: 1,
                area: Rect::new(1, 6, 30, 1),
                edit: None,
                delete: None,
            },
        ];
        assert!(handle_mouse_event(
            &mut state,
            mouse(SheetMouseKind::LeftDown, 4, 6)
        ));
        assert_eq!(
            state.take_outcome(),
            Some(SheetOutcome::Selected("Banana".to_string()))
        );
    }

    #[test]
    fn test_click_edit_glyph_runs_action_not_selection() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut state = make_state(&["Apple", "Banana"]);
        state.options.on_edit = Some(Box::new(move |item: &String, idx: usize| {
            sink.borrow_mut().push((item.clone(), idx));
            ActionOutcome::Keep
        }));
        state.layout.rows = vec![RowHit {
            visible_idx: 0,
            area: Rect::new(1, 5, 30, 1),
            edit: Some(Rect::new(26, 5, 2, 1)),
            delete: None,
        }];
        handle_mouse_event(&mut state, mouse(SheetMouseKind::LeftDown, 26, 5));
        assert!(!state.is_resolved());
        assert_eq!(*calls.borrow(), vec![("Apple".to_string(), 0)]);
    }

    #[test]
    fn test_click_close_button_dismisses() {
        let mut state = make_state(&["Apple"]);
        state.chrome.sheet_area = Some(Rect::new(0, 2, 40, 10));
        state.layout.close_button = Some(Rect::new(2, 4, 1, 1));
        handle_mouse_event(&mut state, mouse(SheetMouseKind::LeftDown, 2, 4));
        assert_eq!(
            state.take_outcome(),
            Some(SheetOutcome::Dismissed(DismissReason::CloseButton))
        );
    }

    #[test]
    fn test_click_outside_dismisses_when_allowed() {
        let mut state = make_state(&["Apple"]);
        state.chrome.sheet_area = Some(Rect::new(0, 10, 40, 10));
        handle_mouse_event(&mut state, mouse(SheetMouseKind::LeftDown, 5, 1));
        assert_eq!(
            state.take_outcome(),
            Some(SheetOutcome::Dismissed(DismissReason::OutsideTap))
        );

        let mut state = make_state(&["Apple"]);
        state.options.chrome.is_dismissible = false;
        state.chrome.sheet_area = Some(Rect::new(0, 10, 40, 10));
        handle_mouse_event(&mut state, mouse(SheetMouseKind::LeftDown, 5, 1));
        assert!(!state.is_resolved());
    }

    #[test]
    fn test_click_clear_glyph_resets_query() {
        let mut state = make_state(&["Apple", "Banana"]);
        type_text(&mut state, "ban");
        state.layout.search_clear = Some(Rect::new(30, 3, 1, 1));
        handle_mouse_event(&mut state, mouse(SheetMouseKind::LeftDown, 30, 3));
        assert_eq!(state.query(), "");
        assert_eq!(visible(&state).len(), 2);
    }

    #[test]
    fn test_click_search_box_moves_caret() {
        let mut state = make_state(&["Apple"]);
        type_text(&mut state, "abcdef");
        state.layout.search_input = Some(Rect::new(2, 3, 30, 1));
        handle_mouse_event(&mut state, mouse(SheetMouseKind::LeftDown, 4, 3));
        assert_eq!(state.input.cursor(), 2);
    }

    #[test]
    fn test_scroll_over_list_moves_highlight() {
        let mut state = make_state(&["Apple", "Banana", "Cherry"]);
        state.layout.list_content = Some(Rect::new(1, 5, 30, 3));
        assert!(handle_mouse_event(
            &mut state,
            mouse(SheetMouseKind::ScrollDown, 3, 6)
        ));
        assert_eq!(state.highlighted(), Some(SCROLL_LINES as usize));
        assert!(!handle_mouse_event(
            &mut state,
            mouse(SheetMouseKind::ScrollDown, 3, 1)
        ));
    }

    #[test]
    fn test_page_down_counts_rows_not_lines() {
        let items: Vec<String> = (0..10).map(|i| format!("item {i}")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let mut state = make_state(&refs);
        state.options.item_height = Some(2);
        state.layout.list_content = Some(Rect::new(1, 5, 30, 6));
        handle_key_event(&mut state, key(SheetKeyCode::PageDown));
        assert_eq!(state.highlighted(), Some(3));
        handle_key_event(&mut state, key(SheetKeyCode::PageUp));
        assert_eq!(state.highlighted(), Some(0));
    }

    #[test]
    fn test_events_after_resolution_are_ignored() {
        let mut state = make_state(&["Apple", "Banana"]);
        handle_key_event(&mut state, key(SheetKeyCode::Esc));
        handle_key_event(&mut state, key(SheetKeyCode::Enter));
        assert_eq!(
            state.outcome(),
            Some(&SheetOutcome::Dismissed(DismissReason::Escape))
        );
    }
}
