pub mod frame;
pub mod input;
pub mod keybindings;
pub mod keymap;
pub mod layout_helpers;
pub mod pane;
pub mod ratatui_impl;
pub mod style;
pub mod widgets;

pub use frame::Frame;
pub use input::{AppEvent, InputEvent, InputSource, KeyCode, Modifiers, MouseButton, MouseEvent, MouseKind};
pub use keymap::Keymap;
pub use pane::{Action, CellAction, NavAction, Pane, PaneManager, SaveKind, StoreAction};
pub use ratatui_impl::RatatuiBackend;
pub use style::{Color, Style};
