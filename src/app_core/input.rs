//! Backend-agnostic input events.
//!
//! The crossterm adapter in [`crate::presenter`] and the scripted test source
//! both produce these types before the reducer sees them.

/// Key codes the sheet reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKeyCode {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetKeyEvent {
    pub code: SheetKeyCode,
    pub ctrl: bool,
    pub alt: bool,
}

impl SheetKeyEvent {
    pub fn new(code: SheetKeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
        }
    }

    pub fn ctrl(code: SheetKeyCode) -> Self {
        Self {
            code,
            ctrl: true,
            alt: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetMouseKind {
    LeftDown,
    LeftUp,
    /// Pointer moved with the left button held.
    Drag,
    ScrollUp,
    ScrollDown,
}

/// Mouse event in terminal cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetMouseEvent {
    pub kind: SheetMouseKind,
    pub column: u16,
    pub row: u16,
}

impl SheetMouseEvent {
    pub fn new(kind: SheetMouseKind, column: u16, row: u16) -> Self {
        Self { kind, column, row }
    }
}

/// Everything the presentation loop can receive from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Key(SheetKeyEvent),
    Mouse(SheetMouseEvent),
    Resize,
    /// The host removed the overlay; resolves the sheet as dismissed.
    Shutdown,
}
