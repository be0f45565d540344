use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as RatatuiRect;

use super::{InputEvent, Keymap, MouseEvent};
use crate::state::{AppState, ButtonAction};

/// Navigation actions between panes
#[derive(Debug, Clone, PartialEq)]
pub enum NavAction {
    /// Push a pane onto the stack (for modals/overlays)
    PushPane(&'static str),
    /// Pop the current pane from the stack
    PopPane,
}

/// Cell selection changes
#[derive(Debug, Clone, PartialEq)]
pub enum CellAction {
    Toggle(String),
    ToggleAll,
}

/// What a name prompt is saving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Preset,
    Theme,
}

impl SaveKind {
    pub fn noun(self) -> &'static str {
        match self {
            SaveKind::Preset => "preset",
            SaveKind::Theme => "theme",
        }
    }
}

/// Preset and theme storage actions
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// Open the name prompt
    PromptSave(SaveKind),
    Save { kind: SaveKind, name: String, overwrite: bool },
    Delete { kind: SaveKind, name: String },
}

/// Actions that can be returned from pane input handling
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action taken, continue as normal
    None,
    /// Quit the application
    Quit,
    Nav(NavAction),
    /// A menu button was pressed
    Button(ButtonAction),
    /// The slider committed a value
    Slider(f64),
    Cell(CellAction),
    Store(StoreAction),
    /// Send the current settings again
    Resend,
}

/// Trait for UI panes (screens/views)
pub trait Pane {
    /// Unique identifier for this pane
    fn id(&self) -> &'static str;

    /// Handle a key event, returning an action
    fn handle_input(&mut self, event: InputEvent, state: &AppState) -> Action;

    /// Handle a mouse event, returning an action
    fn handle_mouse(&mut self, _event: MouseEvent, _state: &AppState) -> Action {
        Action::None
    }

    /// Render the pane into the buffer
    fn render(&self, area: RatatuiRect, buf: &mut Buffer, state: &AppState);

    /// Get the keymap for this pane (for introspection/help)
    fn keymap(&self) -> &Keymap;

    /// Called when this pane becomes active
    fn on_enter(&mut self, _state: &AppState) {}

    /// Called when another pane covers this one or it is closed
    fn on_exit(&mut self, _state: &AppState) {}

    /// Whether global key bindings should be suspended (text entry)
    fn wants_exclusive_input(&self) -> bool {
        false
    }

    /// Return self as Any for downcasting (required for type-specific access)
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Owns every pane and a stack of open ones; the top of the stack has focus
pub struct PaneManager {
    panes: Vec<Box<dyn Pane>>,
    stack: Vec<usize>,
}

impl PaneManager {
    /// Create a new pane manager with the base pane open
    pub fn new(initial_pane: Box<dyn Pane>) -> Self {
        Self {
            panes: vec![initial_pane],
            stack: vec![0],
        }
    }

    /// Register a pane (does not open it)
    pub fn add_pane(&mut self, pane: Box<dyn Pane>) {
        self.panes.push(pane);
    }

    /// Get the currently active pane
    pub fn active(&self) -> &dyn Pane {
        self.panes[self.top()].as_ref()
    }

    /// Get the currently active pane mutably
    pub fn active_mut(&mut self) -> &mut dyn Pane {
        let top = self.top();
        self.panes[top].as_mut()
    }

    fn top(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    /// Open a pane on top of the stack
    pub fn push_to(&mut self, id: &str, state: &AppState) -> bool {
        let Some(index) = self.panes.iter().position(|p| p.id() == id) else {
            log::warn!("push_to: unknown pane {}", id);
            return false;
        };
        let top = self.top();
        if top != index {
            self.panes[top].on_exit(state);
            self.stack.push(index);
        }
        self.panes[index].on_enter(state);
        true
    }

    /// Close the top pane; the base pane always stays open
    pub fn pop(&mut self, state: &AppState) -> bool {
        if self.stack.len() < 2 {
            return false;
        }
        self.active_mut().on_exit(state);
        self.stack.pop();
        self.active_mut().on_enter(state);
        true
    }

    /// Render every open pane bottom to top so modals overlay the menu
    pub fn render(&self, area: RatatuiRect, buf: &mut Buffer, state: &AppState) {
        for &index in &self.stack {
            self.panes[index].render(area, buf, state);
        }
    }

    /// Get the keymap of the active pane
    pub fn active_keymap(&self) -> &Keymap {
        self.active().keymap()
    }

    /// Get a mutable reference to a pane by ID, downcasted to a specific type
    pub fn get_pane_mut<T: 'static>(&mut self, id: &str) -> Option<&mut T> {
        self.panes
            .iter_mut()
            .find(|p| p.id() == id)
            .and_then(|p| p.as_any_mut().downcast_mut::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Catalog, KvStore, PresetStore};

    struct Dummy {
        id: &'static str,
        keymap: Keymap,
        entered: usize,
        exited: usize,
    }

    impl Pane for Dummy {
        fn id(&self) -> &'static str {
            self.id
        }
        fn handle_input(&mut self, _event: InputEvent, _state: &AppState) -> Action {
            Action::None
        }
        fn render(&self, _area: RatatuiRect, _buf: &mut Buffer, _state: &AppState) {}
        fn keymap(&self) -> &Keymap {
            &self.keymap
        }
        fn on_enter(&mut self, _state: &AppState) {
            self.entered += 1;
        }
        fn on_exit(&mut self, _state: &AppState) {
            self.exited += 1;
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn dummy(id: &'static str) -> Box<dyn Pane> {
        Box::new(Dummy { id, keymap: Keymap::new(), entered: 0, exited: 0 })
    }

    #[test]
    fn test_push_and_pop() {
        let state = AppState::new(
            Catalog::embedded(),
            PresetStore::load(KvStore::open_in_memory().unwrap()).unwrap(),
        )
        .unwrap();
        let mut panes = PaneManager::new(dummy("menu"));
        panes.add_pane(dummy("help"));

        assert!(!panes.pop(&state));
        assert!(!panes.push_to("nowhere", &state));
        assert!(panes.push_to("help", &state));
        assert_eq!(panes.active().id(), "help");
        assert_eq!(panes.get_pane_mut::<Dummy>("help").unwrap().entered, 1);
        assert_eq!(panes.get_pane_mut::<Dummy>("menu").unwrap().exited, 1);

        assert!(panes.pop(&state));
        assert_eq!(panes.active().id(), "menu");
        assert_eq!(panes.get_pane_mut::<Dummy>("menu").unwrap().entered, 1);
        assert_eq!(panes.get_pane_mut::<Dummy>("help").unwrap().exited, 1);
        assert!(!panes.pop(&state));
    }
}
