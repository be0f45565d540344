use super::{InputEvent, KeyCode};

/// Pattern for matching key inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    /// Plain character key (no modifiers)
    Char(char),
    /// Special key (arrows, function keys, etc.)
    Key(KeyCode),
    /// Ctrl + character
    Ctrl(char),
}

impl KeyPattern {
    /// Check if this pattern matches an input event
    pub fn matches(&self, event: &InputEvent) -> bool {
        match self {
            KeyPattern::Char(ch) => {
                matches!(event.key, KeyCode::Char(c) if c == *ch)
                    && !event.modifiers.ctrl
                    && !event.modifiers.alt
            }
            KeyPattern::Key(code) => {
                event.key == *code && !event.modifiers.ctrl && !event.modifiers.alt
            }
            KeyPattern::Ctrl(ch) => {
                matches!(event.key, KeyCode::Char(c) if c == *ch) && event.modifiers.ctrl
            }
        }
    }

    /// Get a display string for this key pattern (for help screens)
    pub fn display(&self) -> String {
        match self {
            KeyPattern::Char(' ') => "Space".to_string(),
            KeyPattern::Char(ch) => ch.to_string(),
            KeyPattern::Key(KeyCode::F(n)) => format!("F{}", n),
            KeyPattern::Key(code) => format!("{:?}", code),
            KeyPattern::Ctrl(ch) => format!("Ctrl+{}", ch),
        }
    }
}

/// A single key binding
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub pattern: KeyPattern,
    pub action: &'static str,
    pub description: &'static str,
}

/// A collection of key bindings for a pane.
///
/// Bindings are normally loaded from `keybindings.json`; the builder methods
/// exist for panes assembled in code and for tests.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    /// Create a new empty keymap
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn from_bindings(bindings: Vec<KeyBinding>) -> Self {
        Self { bindings }
    }

    /// Add a character key binding
    pub fn bind(mut self, ch: char, action: &'static str, description: &'static str) -> Self {
        self.bindings.push(KeyBinding {
            pattern: KeyPattern::Char(ch),
            action,
            description,
        });
        self
    }

    /// Add a special key binding
    pub fn bind_key(
        mut self,
        key: KeyCode,
        action: &'static str,
        description: &'static str,
    ) -> Self {
        self.bindings.push(KeyBinding {
            pattern: KeyPattern::Key(key),
            action,
            description,
        });
        self
    }

    /// Look up the action for an input event
    pub fn lookup(&self, event: &InputEvent) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|b| b.pattern.matches(event))
            .map(|b| b.action)
    }

    /// Get all bindings (for help screens)
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }
}
