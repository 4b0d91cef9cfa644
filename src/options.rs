//! Configuration surface for both sheet flavours.

use std::rc::Rc;
use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Text},
    widgets::{BorderType, Padding},
};

use crate::model::{
    ActionOutcome, CheckedFn, ItemAction, ItemBuilder, SearchFilter, SelectCallback, SortFn,
    TrailingBuilder,
};
use crate::theme::ThemeConfig;

pub const DEFAULT_MAX_HEIGHT_FRACTION: f32 = 0.85;
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);
pub const DEFAULT_CLOSE_ICON: &str = "✕";

/// Container chrome shared by the list sheet and custom sheets.
#[derive(Debug, Clone)]
pub struct SheetChrome {
    pub theme: ThemeConfig,
    pub background_color: Option<Color>,
    /// Corner style of the top edge.
    pub border_type: BorderType,
    /// Fraction of the terminal height the sheet may occupy. Not validated.
    pub max_height_fraction: f32,
    pub is_dismissible: bool,
    pub enable_drag: bool,
    pub show_drag_handle: bool,
    pub drag_handle: Option<Line<'static>>,
    pub animation_duration: Duration,
}

impl Default for SheetChrome {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            background_color: None,
            border_type: BorderType::Rounded,
            max_height_fraction: DEFAULT_MAX_HEIGHT_FRACTION,
            is_dismissible: true,
            enable_drag: true,
            show_drag_handle: true,
            drag_handle: None,
            animation_duration: DEFAULT_ANIMATION_DURATION,
        }
    }
}

impl SheetChrome {
    /// Base style of the container: theme text style over the configured background.
    pub fn container_style(&self) -> Style {
        self.theme
            .text
            .bg(self.background_color.unwrap_or(self.theme.background))
    }
}

/// Options for [`crate::presenter::show`].
pub struct SheetOptions<T> {
    pub data: Rc<Vec<T>>,
    pub hint: String,
    pub item_builder: ItemBuilder<T>,
    pub search_filter: SearchFilter<T>,
    pub title: Option<String>,
    pub show_checkbox: bool,
    pub is_checked: Option<CheckedFn<T>>,
    pub sort_items: Option<SortFn<T>>,
    pub trailing_builder: Option<TrailingBuilder<T>>,
    pub on_edit: Option<ItemAction<T>>,
    pub on_delete: Option<ItemAction<T>>,
    pub on_selected: Option<SelectCallback<T>>,
    pub header_action: Option<Line<'static>>,
    pub empty_widget: Option<Text<'static>>,
    pub no_results_widget: Option<Text<'static>>,
    pub auto_capitalize: bool,
    pub search_style: Option<Style>,
    pub title_style: Option<Style>,
    pub item_text_style: Option<Style>,
    pub list_padding: Padding,
    /// Fixed row height in terminal lines; rows size to content when `None`.
    pub item_height: Option<u16>,
    pub close_icon: String,
    pub show_close_button: bool,
    pub chrome: SheetChrome,
}

impl<T> SheetOptions<T> {
    pub fn new(
        data: Rc<Vec<T>>,
        hint: impl Into<String>,
        item_builder: impl Fn(&T) -> Line<'static> + 'static,
        search_filter: impl Fn(&T, &str) -> bool + 'static,
    ) -> Self {
        Self {
            data,
            hint: hint.into(),
            item_builder: Box::new(item_builder),
            search_filter: Box::new(search_filter),
            title: None,
            show_checkbox: false,
            is_checked: None,
            sort_items: None,
            trailing_builder: None,
            on_edit: None,
            on_delete: None,
            on_selected: None,
            header_action: None,
            empty_widget: None,
            no_results_widget: None,
            auto_capitalize: true,
            search_style: None,
            title_style: None,
            item_text_style: None,
            list_padding: Padding::horizontal(1),
            item_height: None,
            close_icon: DEFAULT_CLOSE_ICON.to_string(),
            show_close_button: true,
            chrome: SheetChrome::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Shows a checkbox on every row, reading its state from `is_checked`.
    pub fn with_checkbox(mut self, is_checked: impl Fn(&T) -> bool + 'static) -> Self {
        self.show_checkbox = true;
        self.is_checked = Some(Box::new(is_checked));
        self
    }

    pub fn with_sort(mut self, sort: impl Fn(&[T]) -> Vec<T> + 'static) -> Self {
        self.sort_items = Some(Box::new(sort));
        self
    }

    pub fn with_trailing(
        mut self,
        trailing: impl Fn(&T) -> Option<Line<'static>> + 'static,
    ) -> Self {
        self.trailing_builder = Some(Box::new(trailing));
        self
    }

    pub fn with_on_edit(
        mut self,
        on_edit: impl FnMut(&T, usize) -> ActionOutcome<T> + 'static,
    ) -> Self {
        self.on_edit = Some(Box::new(on_edit));
        self
    }

    pub fn with_on_delete(
        mut self,
        on_delete: impl FnMut(&T, usize) -> ActionOutcome<T> + 'static,
    ) -> Self {
        self.on_delete = Some(Box::new(on_delete));
        self
    }

    pub fn with_on_selected(mut self, on_selected: impl FnMut(&T) + 'static) -> Self {
        self.on_selected = Some(Box::new(on_selected));
        self
    }

    pub fn with_header_action(mut self, action: impl Into<Line<'static>>) -> Self {
        self.header_action = Some(action.into());
        self
    }

    pub fn with_empty_widget(mut self, widget: impl Into<Text<'static>>) -> Self {
        self.empty_widget = Some(widget.into());
        self
    }

    pub fn with_no_results_widget(mut self, widget: impl Into<Text<'static>>) -> Self {
        self.no_results_widget = Some(widget.into());
        self
    }

    pub fn with_auto_capitalize(mut self, enabled: bool) -> Self {
        self.auto_capitalize = enabled;
        self
    }

    pub fn with_search_style(mut self, style: Style) -> Self {
        self.search_style = Some(style);
        self
    }

    pub fn with_title_style(mut self, style: Style) -> Self {
        self.title_style = Some(style);
        self
    }

    pub fn with_item_text_style(mut self, style: Style) -> Self {
        self.item_text_style = Some(style);
        self
    }

    pub fn with_list_padding(mut self, padding: Padding) -> Self {
        self.list_padding = padding;
        self
    }

    pub fn with_item_height(mut self, height: u16) -> Self {
        self.item_height = Some(height);
        self
    }

    /// Terminal lines per row: the fixed height, else one line.
    pub fn row_height(&self) -> u16 {
        self.item_height.unwrap_or(1).max(1)
    }

    pub fn with_close_icon(mut self, icon: impl Into<String>) -> Self {
        self.close_icon = icon.into();
        self
    }

    pub fn with_close_button(mut self, show: bool) -> Self {
        self.show_close_button = show;
        self
    }

    pub fn with_chrome(mut self, chrome: SheetChrome) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn with_theme(mut self, theme: ThemeConfig) -> Self {
        self.chrome.theme = theme;
        self
    }

    pub fn with_max_height_fraction(mut self, fraction: f32) -> Self {
        self.chrome.max_height_fraction = fraction;
        self
    }

    pub fn with_dismissible(mut self, dismissible: bool) -> Self {
        self.chrome.is_dismissible = dismissible;
        self
    }

    pub fn with_drag(mut self, enable: bool) -> Self {
        self.chrome.enable_drag = enable;
        self
    }

    pub fn with_drag_handle(mut self, show: bool, handle: Option<Line<'static>>) -> Self {
        self.chrome.show_drag_handle = show;
        self.chrome.drag_handle = handle;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.chrome.animation_duration = duration;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.chrome.background_color = Some(color);
        self
    }

    pub fn with_border_type(mut self, border_type: BorderType) -> Self {
        self.chrome.border_type = border_type;
        self
    }
}

/// Arbitrary content shown by [`crate::presenter::show_custom`].
pub trait SheetView {
    /// Rows the view wants at the given width. Content beyond the sheet's
    /// height cap scrolls.
    fn desired_height(&self, width: u16) -> u16;

    fn render(&self, area: Rect, buf: &mut Buffer);
}

impl SheetView for Text<'static> {
    fn desired_height(&self, _width: u16) -> u16 {
        self.height() as u16
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        ratatui::widgets::Widget::render(self, area, buf);
    }
}

/// Options for [`crate::presenter::show_custom`].
pub struct CustomSheetOptions {
    pub view: Box<dyn SheetView>,
    pub chrome: SheetChrome,
}

impl CustomSheetOptions {
    pub fn new(view: impl SheetView + 'static) -> Self {
        Self {
            view: Box::new(view),
            chrome: SheetChrome::default(),
        }
    }

    pub fn with_chrome(mut self, chrome: SheetChrome) -> Self {
        self.chrome = chrome;
        self
    }
}
