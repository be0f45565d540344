use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::keymap::{KeyBinding, KeyPattern, Keymap};
use super::KeyCode;

/// Raw JSON structure for the keybindings config file
#[derive(Deserialize)]
struct KeybindingConfig {
    #[serde(default)]
    global: Vec<RawBinding>,
    #[serde(default)]
    panes: HashMap<String, Vec<RawBinding>>,
}

/// A single binding entry from JSON
#[derive(Deserialize)]
struct RawBinding {
    key: String,
    action: String,
    description: String,
    #[serde(default)]
    always_active: bool,
}

/// Parsed global keybindings for use in main.rs
pub struct GlobalBindings {
    bindings: Vec<GlobalBinding>,
}

struct GlobalBinding {
    pattern: KeyPattern,
    action: &'static str,
    always_active: bool,
}

impl GlobalBindings {
    /// Look up a global action for an input event.
    /// If `exclusive_mode` is true, only returns actions marked `always_active`.
    pub fn lookup(&self, event: &super::InputEvent, exclusive_mode: bool) -> Option<&'static str> {
        self.bindings
            .iter()
            .find(|b| b.pattern.matches(event) && (!exclusive_mode || b.always_active))
            .map(|b| b.action)
    }
}

/// Intern a String into a &'static str.
/// These are loaded once at startup and never freed.
fn intern(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Parse a key notation string into a KeyPattern.
///
/// Supported formats:
/// - `"q"` → Char('q')
/// - `"Up"` → Key(KeyCode::Up)
/// - `"Ctrl+c"` → Ctrl('c')
/// - `"Space"` → Char(' ')
/// - `"F1"` → Key(KeyCode::F(1))
fn parse_key(s: &str) -> Option<KeyPattern> {
    let mut chars = s.chars();
    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut rest_chars = rest.chars();
        return match (rest_chars.next(), rest_chars.next()) {
            (Some(ch), None) => Some(KeyPattern::Ctrl(ch)),
            _ => None,
        };
    }
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(KeyPattern::Char(ch)),
        _ if s == "Space" => Some(KeyPattern::Char(' ')),
        _ => parse_named_key(s).map(KeyPattern::Key),
    }
}

/// Parse a named key string (e.g., "Up", "Enter", "F1") into a KeyCode
fn parse_named_key(s: &str) -> Option<KeyCode> {
    let code = match s {
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Insert" => KeyCode::Insert,
        "Delete" => KeyCode::Delete,
        _ => KeyCode::F(s.strip_prefix('F')?.parse::<u8>().ok()?),
    };
    Some(code)
}

/// Embedded default keybindings JSON
const DEFAULT_KEYBINDINGS: &str = include_str!("../../keybindings.json");

/// Load keybindings: embedded default, optionally merged with user override.
/// Returns (GlobalBindings, pane keymaps).
pub fn load_keybindings() -> (GlobalBindings, HashMap<String, Keymap>) {
    let mut config: KeybindingConfig =
        serde_json::from_str(DEFAULT_KEYBINDINGS).expect("Failed to parse embedded keybindings.json");

    if let Some(path) = user_keybindings_path() {
        if path.exists() {
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|contents| {
                    serde_json::from_str::<KeybindingConfig>(&contents).map_err(|e| e.to_string())
                }) {
                Ok(user_config) => merge_config(&mut config, user_config),
                Err(e) => log::warn!("ignoring {}: {}", path.display(), e),
            }
        }
    }

    let global = build_global_bindings(&config.global);
    let pane_keymaps = build_pane_keymaps(&config.panes);

    (global, pane_keymaps)
}

fn user_keybindings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("freyr-panel").join("keybindings.json"))
}

/// Merge user config into the base config.
/// User pane entries fully replace the default pane entries.
/// User globals fully replace default globals.
fn merge_config(base: &mut KeybindingConfig, user: KeybindingConfig) {
    if !user.global.is_empty() {
        base.global = user.global;
    }
    for (pane_id, bindings) in user.panes {
        base.panes.insert(pane_id, bindings);
    }
}

fn parse_or_warn(b: &RawBinding) -> Option<KeyPattern> {
    let pattern = parse_key(&b.key);
    if pattern.is_none() {
        log::warn!("unknown key {:?} for action {}", b.key, b.action);
    }
    pattern
}

fn build_global_bindings(raw: &[RawBinding]) -> GlobalBindings {
    let bindings = raw
        .iter()
        .filter_map(|b| {
            Some(GlobalBinding {
                pattern: parse_or_warn(b)?,
                action: intern(b.action.clone()),
                always_active: b.always_active,
            })
        })
        .collect();
    GlobalBindings { bindings }
}

fn build_pane_keymaps(panes: &HashMap<String, Vec<RawBinding>>) -> HashMap<String, Keymap> {
    panes
        .iter()
        .map(|(pane_id, bindings)| {
            let key_bindings: Vec<KeyBinding> = bindings
                .iter()
                .filter_map(|b| {
                    Some(KeyBinding {
                        pattern: parse_or_warn(b)?,
                        action: intern(b.action.clone()),
                        description: intern(b.description.clone()),
                    })
                })
                .collect();
            (pane_id.clone(), Keymap::from_bindings(key_bindings))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{InputEvent, Modifiers};

    #[test]
    fn test_parse_key_char() {
        assert_eq!(parse_key("q"), Some(KeyPattern::Char('q')));
        assert_eq!(parse_key("+"), Some(KeyPattern::Char('+')));
    }

    #[test]
    fn test_parse_key_named() {
        assert_eq!(parse_key("Up"), Some(KeyPattern::Key(KeyCode::Up)));
        assert_eq!(parse_key("Enter"), Some(KeyPattern::Key(KeyCode::Enter)));
        assert_eq!(parse_key("Space"), Some(KeyPattern::Char(' ')));
        assert_eq!(parse_key("F12"), Some(KeyPattern::Key(KeyCode::F(12))));
        assert_eq!(parse_key("Ctrl+c"), Some(KeyPattern::Ctrl('c')));
    }

    #[test]
    fn test_parse_key_unknown() {
        assert_eq!(parse_key("Hyper"), None);
        assert_eq!(parse_key("Fx"), None);
        assert_eq!(parse_key("Ctrl+Left"), None);
    }

    #[test]
    fn test_load_embedded_keybindings() {
        let (global, panes) = load_keybindings();
        let ctrl_c = InputEvent::new(KeyCode::Char('c'), Modifiers { ctrl: true, ..Modifiers::none() });
        assert_eq!(global.lookup(&ctrl_c, true), Some("quit"));
        assert_eq!(global.lookup(&InputEvent::key(KeyCode::Char('q')), true), None);
        assert!(panes.contains_key("menu"));
        assert!(panes.contains_key("prompt"));
        assert!(panes.contains_key("help"));
    }
}
