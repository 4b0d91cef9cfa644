use std::time::Instant;

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect, Size},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Padding, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Widget,
    },
};
use tui_scrollview::{ScrollView, ScrollbarVisibility};
use unicode_width::UnicodeWidthChar;

use crate::app_core::custom::CustomSheetState;
use crate::app_core::state::{RowHit, SheetLayout, SheetState};
use crate::filter::capitalize_into;
use crate::options::{SheetChrome, SheetOptions, SheetView};
use crate::theme::ThemeConfig;

/// Rows of the default empty / no-results placeholder region.
pub const PLACEHOLDER_HEIGHT: u16 = 5;
/// Bordered search box.
const SEARCH_HEIGHT: u16 = 3;
/// Width reserved for the close control and the balancing spacer.
const CLOSE_WIDTH: u16 = 3;
/// Width of one row action glyph including its leading space.
const ACTION_WIDTH: u16 = 2;

const EDIT_GLYPH: &str = "✎";
const DELETE_GLYPH: &str = "✗";
const CLEAR_GLYPH: &str = "✕";
const CHECKED_MARK: &str = "[x] ";
const UNCHECKED_MARK: &str = "[ ] ";
const DEFAULT_DRAG_HANDLE: &str = "──────";

/// Regions produced by drawing the sheet container.
struct ChromeFrame {
    sheet: Rect,
    handle: Rect,
    content: Rect,
}

/// Bottom-anchored sheet rectangle: as tall as `desired` rows, capped at
/// `max_height_fraction` of `full`.
pub fn sheet_rect(full: Rect, max_height_fraction: f32, desired: u16) -> Rect {
    let cap = (f32::from(full.height) * max_height_fraction)
        .floor()
        .clamp(0.0, f32::from(full.height)) as u16;
    let height = desired.min(cap);
    Rect::new(
        full.x,
        full.y + full.height.saturating_sub(height),
        full.width,
        height,
    )
}

/// Draws the container chrome (clear, rounded top border, drag handle) and
/// returns the content region below the handle.
fn render_chrome(f: &mut Frame, chrome: &SheetChrome, content_height: u16) -> ChromeFrame {
    let handle_rows = u16::from(chrome.show_drag_handle);
    let desired = content_height.saturating_add(1 + handle_rows);
    let sheet = sheet_rect(f.area(), chrome.max_height_fraction, desired);

    f.render_widget(Clear, sheet);
    let block = Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .border_type(chrome.border_type)
        .border_style(chrome.theme.border)
        .style(chrome.container_style());
    let inner = block.inner(sheet);
    f.render_widget(block, sheet);

    let handle_rows = handle_rows.min(inner.height);
    if handle_rows > 0 {
        let handle_line = chrome.drag_handle.clone().unwrap_or_else(|| {
            Line::from(Span::styled(DEFAULT_DRAG_HANDLE, chrome.theme.accent))
        });
        f.render_widget(
            Paragraph::new(handle_line.centered()),
            Rect::new(inner.x, inner.y, inner.width, 1),
        );
    }

    let handle = Rect::new(sheet.x, sheet.y, sheet.width, (1 + handle_rows).min(sheet.height));
    let content = Rect::new(
        inner.x,
        inner.y + handle_rows,
        inner.width,
        inner.height.saturating_sub(handle_rows),
    );
    ChromeFrame {
        sheet,
        handle,
        content,
    }
}

/// Applies the fade-in to an already drawn region.
fn apply_fade(buf: &mut Buffer, area: Rect, opacity: f32) {
    if opacity < 1.0 {
        buf.set_style(area, Style::default().add_modifier(Modifier::DIM));
    }
}

fn header_visible<T>(options: &SheetOptions<T>) -> bool {
    options.show_close_button || options.title.is_some() || options.header_action.is_some()
}

/// Rows the body wants, never more than `limit`.
fn body_height<T>(state: &SheetState<T>, limit: u16) -> u16 {
    let options = &state.options;
    if state.is_source_empty() {
        return placeholder_height(options.empty_widget.as_ref());
    }
    let visible = state.engine().visible_len();
    if visible == 0 {
        return placeholder_height(options.no_results_widget.as_ref());
    }
    let rows = u16::try_from(visible)
        .unwrap_or(u16::MAX)
        .saturating_mul(options.row_height());
    rows.saturating_add(options.list_padding.top)
        .saturating_add(options.list_padding.bottom)
        .min(limit)
}

fn placeholder_height(custom: Option<&Text<'static>>) -> u16 {
    custom
        .map(|text| u16::try_from(text.height()).unwrap_or(u16::MAX))
        .unwrap_or(PLACEHOLDER_HEIGHT)
}

/// Renders the searchable list sheet over the current frame.
pub fn render_sheet<T>(f: &mut Frame, state: &mut SheetState<T>, now: Instant) {
    let header_rows = u16::from(header_visible(&state.options));
    let search_rows = if state.is_source_empty() {
        0
    } else {
        SEARCH_HEIGHT
    };
    let content_height = (header_rows + search_rows)
        .saturating_add(body_height(state, f.area().height));

    let frame = render_chrome(f, &state.options.chrome, content_height);
    state.chrome.sheet_area = Some(frame.sheet);
    state.chrome.handle_area = Some(frame.handle);
    state.layout = SheetLayout::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_rows),
            Constraint::Length(search_rows),
            Constraint::Min(0),
        ])
        .split(frame.content);

    if header_rows > 0 {
        render_header(f, state, chunks[0]);
    }
    if search_rows > 0 {
        render_search(f, state, chunks[1]);
    }

    let body = chunks[2];
    let theme = &state.options.chrome.theme;
    if state.is_source_empty() {
        let view = state
            .options
            .empty_widget
            .clone()
            .unwrap_or_else(|| default_placeholder("∅", "No data available", theme));
        render_placeholder(f, view, body);
    } else if state.engine().visible_len() == 0 {
        let view = state
            .options
            .no_results_widget
            .clone()
            .unwrap_or_else(|| default_placeholder("⌕", "No results found", theme));
        render_placeholder(f, view, body);
    } else {
        render_item_list(f, state, body);
    }

    apply_fade(f.buffer_mut(), frame.sheet, state.chrome.opacity(now));
}

/// Close control, centred title, header action or balancing spacer.
fn render_header<T>(f: &mut Frame, state: &mut SheetState<T>, area: Rect) {
    let options = &state.options;
    let theme = &options.chrome.theme;
    let left = if options.show_close_button {
        CLOSE_WIDTH
    } else {
        0
    };
    let right = options
        .header_action
        .as_ref()
        .map(|action| action.width() as u16)
        .unwrap_or(left);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(left),
            Constraint::Min(0),
            Constraint::Length(right),
        ])
        .split(area);

    if options.show_close_button {
        f.render_widget(
            Paragraph::new(Line::from(options.close_icon.as_str()).centered()).style(theme.text),
            cols[0],
        );
        state.layout.close_button = Some(cols[0]);
    }

    if let Some(title) = &options.title {
        let style = options.title_style.unwrap_or(theme.title);
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(title.as_str(), style)).centered()),
            cols[1],
        );
    }

    if let Some(action) = &options.header_action {
        f.render_widget(Paragraph::new(action.clone()), cols[2]);
    }
}

/// Renders the search box with its hint, caret and clear glyph.
fn render_search<T>(f: &mut Frame, state: &mut SheetState<T>, area: Rect) {
    let options = &state.options;
    let theme = &options.chrome.theme;
    let focused = state.focus.has_focus();
    let counter = format!(
        " {}/{} ",
        state.engine().visible_len(),
        state.engine().source().len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(options.chrome.border_type)
        .border_style(if focused {
            theme.border_focused
        } else {
            theme.border
        })
        .title_bottom(Line::from(counter).right_aligned())
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text_style = options.search_style.unwrap_or(theme.text);
    let clear_width = if state.input.is_empty() {
        0
    } else {
        ACTION_WIDTH
    };
    let input_area = Rect::new(
        inner.x,
        inner.y,
        inner.width.saturating_sub(clear_width),
        inner.height.min(1),
    );
    state.layout.search_input = Some(input_area);

    let scroll = search_horizontal_scroll(state.input.text(), state.input.cursor(), input_area.width);
    let content = if state.input.is_empty() {
        Line::from(Span::styled(options.hint.as_str(), theme.hint))
    } else {
        Line::from(Span::styled(state.input.text(), text_style))
    };
    f.render_widget(Paragraph::new(content).scroll((0, scroll)), input_area);

    if clear_width > 0 && inner.width > clear_width {
        let clear_area = Rect::new(
            inner.x + inner.width - clear_width,
            inner.y,
            clear_width,
            1,
        );
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(CLEAR_GLYPH, theme.hint)).right_aligned()),
            clear_area,
        );
        state.layout.search_clear = Some(clear_area);
    }

    if focused && input_area.width > 0 && input_area.height > 0 {
        let offset = search_cursor_offset(state.input.text(), state.input.cursor());
        let visible = offset
            .saturating_sub(scroll)
            .min(input_area.width.saturating_sub(1));
        f.set_cursor_position((input_area.x + visible, input_area.y));
    }
}

/// Builds the icon + message view used when no override is configured.
fn default_placeholder(icon: &'static str, message: &'static str, theme: &ThemeConfig) -> Text<'static> {
    Text::from(vec![
        Line::from(Span::styled(icon, theme.accent)),
        Line::from(""),
        Line::from(Span::styled(message, theme.hint)),
    ])
    .centered()
}

fn render_placeholder(f: &mut Frame, view: Text<'static>, area: Rect) {
    let height = u16::try_from(view.height()).unwrap_or(u16::MAX).min(area.height);
    let top = area.y + (area.height - height) / 2;
    f.render_widget(
        Paragraph::new(view),
        Rect::new(area.x, top, area.width, height),
    );
}

/// Renders the visible rows and records their hit regions.
fn render_item_list<T>(f: &mut Frame, state: &mut SheetState<T>, area: Rect) {
    let padding = state.options.list_padding;
    let rows_height = area.height.saturating_sub(padding.top + padding.bottom);
    let height = state.options.row_height();
    let total = state.engine().visible_len();
    let overflows = usize::from(rows_height) < total.saturating_mul(usize::from(height));
    // Reserve a scrollbar column when the right padding has none.
    let scrollbar_column = u16::from(overflows && padding.right == 0);
    let inner = Rect::new(
        area.x + padding.left,
        area.y + padding.top,
        area.width
            .saturating_sub(padding.left + padding.right + scrollbar_column),
        rows_height,
    );
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let items: Vec<ListItem> = state
        .engine()
        .visible_items()
        .map(|item| {
            let mut lines = vec![build_row(state, item, inner.width)];
            lines.resize(usize::from(height), Line::default());
            ListItem::new(Text::from(lines))
        })
        .collect();

    let theme = &state.options.chrome.theme;
    let list = List::new(items)
        .style(theme.list_normal)
        .scroll_padding(1)
        .highlight_style(theme.list_selected);
    f.render_stateful_widget(list, inner, &mut state.list_state);

    let edit = state.options.on_edit.is_some();
    let delete = state.options.on_delete.is_some();
    let actions_width = ACTION_WIDTH * (u16::from(edit) + u16::from(delete));
    let mut y = inner.y;
    for visible_idx in state.list_state.offset()..total {
        if y >= inner.bottom() {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, height.min(inner.bottom() - y));
        let actions_x = inner.right().saturating_sub(actions_width);
        state.layout.rows.push(RowHit {
            visible_idx,
            area: row,
            edit: edit.then(|| Rect::new(actions_x, y, ACTION_WIDTH, 1)),
            delete: delete.then(|| {
                Rect::new(
                    inner.right().saturating_sub(ACTION_WIDTH),
                    y,
                    ACTION_WIDTH,
                    1,
                )
            }),
        });
        y = y.saturating_add(height);
    }
    state.layout.list_content = Some(inner);

    if overflows {
        let mut scrollbar_state =
            ScrollbarState::new(total).position(state.list_state.selected().unwrap_or(0));
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area,
            &mut scrollbar_state,
        );
    }
}

/// Lays out one row: checkbox, item content, trailing content and action
/// glyphs, right-aligning everything after the item content.
fn build_row<T>(state: &SheetState<T>, item: &T, width: u16) -> Line<'static> {
    let options = &state.options;
    let theme = &options.chrome.theme;
    let width = usize::from(width);

    let mut prefix: Vec<Span<'static>> = Vec::new();
    if options.show_checkbox {
        let mark = if state.is_checked(item) {
            CHECKED_MARK
        } else {
            UNCHECKED_MARK
        };
        prefix.push(Span::styled(mark, theme.accent));
    }

    let mut suffix: Vec<Span<'static>> = Vec::new();
    if let Some(trailing) = options
        .trailing_builder
        .as_ref()
        .and_then(|builder| builder(item))
    {
        suffix.push(Span::raw(" "));
        suffix.extend(trailing.spans);
    }
    if options.on_edit.is_some() {
        suffix.push(Span::styled(format!(" {EDIT_GLYPH}"), theme.accent));
    }
    if options.on_delete.is_some() {
        suffix.push(Span::styled(format!(" {DELETE_GLYPH}"), theme.danger));
    }

    let mut label = (options.item_builder)(item);
    if options.auto_capitalize {
        label = capitalize_line(label);
    }
    if let Some(style) = options.item_text_style {
        label = label.patch_style(style);
    }

    let prefix_width: usize = prefix.iter().map(Span::width).sum();
    let suffix_width: usize = suffix.iter().map(Span::width).sum();
    let label_budget = width.saturating_sub(prefix_width + suffix_width);
    let label_style = label.style;
    let label_spans: Vec<Span<'static>> = truncate_spans(label.spans, label_budget)
        .into_iter()
        .map(|span| {
            let style = label_style.patch(span.style);
            span.style(style)
        })
        .collect();
    let label_width: usize = label_spans.iter().map(Span::width).sum();
    let gap = width.saturating_sub(prefix_width + label_width + suffix_width);

    let mut spans = prefix;
    spans.extend(label_spans);
    if !suffix.is_empty() {
        spans.push(Span::raw(" ".repeat(gap)));
        spans.extend(suffix);
    }
    Line::from(spans)
}

/// Display-only word capitalisation across all spans of a line.
fn capitalize_line(line: Line<'static>) -> Line<'static> {
    let style = line.style;
    let alignment = line.alignment;
    let mut at_word_start = true;
    let spans: Vec<Span<'static>> = line
        .spans
        .into_iter()
        .map(|span| {
            let mut content = String::with_capacity(span.content.len());
            capitalize_into(&span.content, &mut content, &mut at_word_start);
            Span::styled(content, span.style)
        })
        .collect();
    let mut out = Line::from(spans).style(style);
    out.alignment = alignment;
    out
}

/// Cuts spans to `max_width` cells, ending with an ellipsis when anything
/// was dropped.
fn truncate_spans(spans: Vec<Span<'static>>, max_width: usize) -> Vec<Span<'static>> {
    let total: usize = spans.iter().map(Span::width).sum();
    if total <= max_width {
        return spans;
    }
    if max_width == 0 {
        return Vec::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = Vec::new();
    for span in spans {
        let span_width = span.width();
        if used + span_width <= budget {
            used += span_width;
            out.push(span);
            continue;
        }
        let mut content = String::new();
        for ch in span.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > budget {
                break;
            }
            used += ch_width;
            content.push(ch);
        }
        content.push('…');
        out.push(Span::styled(content, span.style));
        return out;
    }
    out.push(Span::raw("…"));
    out
}

/// Adapts a [`SheetView`] to ratatui's `Widget`.
struct ViewWidget<'a>(&'a dyn SheetView);

impl Widget for ViewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.0.render(area, buf);
    }
}

/// Renders a custom sheet: the shared chrome around the caller's view, which
/// scrolls when it is taller than the sheet allows.
pub fn render_custom_sheet(f: &mut Frame, state: &mut CustomSheetState, now: Instant) {
    let chrome_width = f.area().width.saturating_sub(2);
    let desired = state.options.view.desired_height(chrome_width);
    let frame = render_chrome(f, &state.options.chrome, desired);
    state.chrome.sheet_area = Some(frame.sheet);
    state.chrome.handle_area = Some(frame.handle);

    let content = frame.content;
    state.content_area = Some(content);
    if content.width > 0 && content.height > 0 {
        let overflows = desired > content.height;
        let width = if overflows {
            content.width.saturating_sub(1)
        } else {
            content.width
        };
        let height = state.options.view.desired_height(width).max(content.height);

        let mut scroll_view = ScrollView::new(Size::new(width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        let scroll_area = scroll_view.area();
        scroll_view
            .buf_mut()
            .set_style(scroll_area, state.options.chrome.container_style());
        scroll_view.render_widget(ViewWidget(state.options.view.as_ref()), scroll_area);
        f.render_stateful_widget(scroll_view, content, &mut state.scroll);
    }

    apply_fade(f.buffer_mut(), frame.sheet, state.chrome.opacity(now));
}

/// Display columns taken by the first `cursor` chars of `text`; wide glyphs
/// count twice.
pub fn search_cursor_offset(text: &str, cursor: usize) -> u16 {
    text.chars()
        .take(cursor)
        .filter_map(|c| c.width())
        .map(|w| w as u16)
        .sum::<u16>()
}

/// Columns to skip so the caret stays inside a box `visible_width` wide.
pub fn search_horizontal_scroll(text: &str, cursor: usize, visible_width: u16) -> u16 {
    if visible_width == 0 {
        return 0;
    }
    let cursor_offset = search_cursor_offset(text, cursor);
    cursor_offset.saturating_sub(visible_width.saturating_sub(1))
}

/// Char index of the caret for a click `target_column` cells into the text.
pub fn search_cursor_for_column(text: &str, target_column: u16) -> usize {
    let mut width = 0u16;
    for (idx, ch) in text.chars().enumerate() {
        let char_width = ch.width().unwrap_or(0) as u16;
        if width + char_width > target_column {
            return idx;
        }
        width += char_width;
    }
    text.chars().count()
}
