//! Value types shared between the sheet state, the reducer and the presenter.

use std::rc::Rc;

use ratatui::text::Line;

/// Renders one item as the row's main content.
pub type ItemBuilder<T> = Box<dyn Fn(&T) -> Line<'static>>;
/// `(item, query) -> matches`.
pub type SearchFilter<T> = Box<dyn Fn(&T, &str) -> bool>;
/// Read-only checkbox state source.
pub type CheckedFn<T> = Box<dyn Fn(&T) -> bool>;
/// Produces the base ordering from the caller's list.
pub type SortFn<T> = Box<dyn Fn(&[T]) -> Vec<T>>;
/// Optional per-item trailing content.
pub type TrailingBuilder<T> = Box<dyn Fn(&T) -> Option<Line<'static>>>;
/// Row action callback receiving the item and its index in the visible list.
pub type ItemAction<T> = Box<dyn FnMut(&T, usize) -> ActionOutcome<T>>;
/// Invoked with the picked item right before the sheet resolves.
pub type SelectCallback<T> = Box<dyn FnMut(&T)>;

/// What a row action wants done with the sheet's input list.
pub enum ActionOutcome<T> {
    /// Keep the current list.
    Keep,
    /// Hand the sheet a new list. Only a different `Rc` triggers re-derivation.
    Replace(Rc<Vec<T>>),
}

impl<T> std::fmt::Debug for ActionOutcome<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionOutcome::Keep => f.write_str("Keep"),
            ActionOutcome::Replace(items) => write!(f, "Replace({} items)", items.len()),
        }
    }
}

/// Why a sheet closed without a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    CloseButton,
    OutsideTap,
    Drag,
    Escape,
    /// The host tore the overlay down (event source closed).
    Host,
}

/// Terminal state of a presentation. Recorded once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOutcome<T> {
    Selected(T),
    Dismissed(DismissReason),
}

impl<T> SheetOutcome<T> {
    /// The value `show` resolves with.
    pub fn into_selection(self) -> Option<T> {
        match self {
            SheetOutcome::Selected(item) => Some(item),
            SheetOutcome::Dismissed(_) => None,
        }
    }
}

/// Which row-level control a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}
