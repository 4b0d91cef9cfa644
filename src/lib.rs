//! search-sheet: a modal bottom sheet for the terminal with a search box that
//! filters a caller-supplied list and returns the picked item.

pub mod app_core;
pub mod filter;
pub mod model;
pub mod options;
pub mod presenter;
pub mod theme;
pub mod ui;

pub use model::{ActionOutcome, DismissReason, SheetOutcome};
pub use options::{CustomSheetOptions, SheetChrome, SheetOptions, SheetView};
pub use presenter::{
    CrosstermEvents, EventSource, HostError, ScriptedEvents, show, show_custom, show_custom_in,
    show_in,
};
pub use theme::{Theme, ThemeConfig};
