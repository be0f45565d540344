use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use super::catalog::Catalog;
use super::preset::{Preset, Theme};

pub const ROOT: &str = "root";
pub const DISPLAY: &str = "display";
pub const PRESETS: &str = "presets";
pub const THEMES: &str = "themes";

/// What a slider binding reads and writes
#[derive(Debug, Clone, PartialEq)]
pub enum SliderTarget {
    Brightness,
    Hue,
    /// A slider parameter of the current preset
    Param(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderBinding {
    pub title: String,
    pub min: f64,
    pub max: f64,
    pub target: SliderTarget,
}

/// Where a preset is activated from
#[derive(Debug, Clone, PartialEq)]
pub enum PresetSource {
    Animation(String),
    Saved(String),
}

/// What pressing a menu button does
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonAction {
    Home,
    Back,
    Push(String),
    Brightness,
    Hue,
    SaveTheme,
    Cue,
    /// Activate a preset and open its screen
    Activate { source: PresetSource, screen: String },
    SavePreset,
    EditParam(String),
    SelectOption { name: String, option: String },
    ApplyTheme(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screen {
    pub id: String,
    buttons: Vec<Button>,
    pub is_animation: bool,
    /// Builtin screens survive a rebuild
    pub builtin: bool,
    pub slider: Option<SliderBinding>,
}

impl Screen {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Add a button; an existing label keeps its position and gets the new action
    pub fn set_button(&mut self, label: &str, action: ButtonAction) {
        match self.buttons.iter_mut().find(|b| b.label == label) {
            Some(button) => button.action = action,
            None => self.buttons.push(Button {
                label: label.to_string(),
                action,
            }),
        }
    }

    fn root() -> Self {
        let mut root = Screen::new(ROOT);
        root.builtin = true;
        root.set_button("DPLY", ButtonAction::Push(DISPLAY.to_string()));
        root.set_button("BRGT", ButtonAction::Brightness);
        root.set_button("THME", ButtonAction::Push(THEMES.to_string()));
        root.set_button("PRST", ButtonAction::Push(PRESETS.to_string()));
        root.set_button("STHM", ButtonAction::SaveTheme);
        root.set_button("CUE", ButtonAction::Cue);
        root.set_button("HUE", ButtonAction::Hue);
        root
    }
}

/// All screens by id
#[derive(Debug, Clone)]
pub struct ScreenTree {
    screens: HashMap<String, Screen>,
}

impl ScreenTree {
    pub fn new() -> Self {
        let mut screens = HashMap::new();
        screens.insert(ROOT.to_string(), Screen::root());
        Self { screens }
    }

    pub fn get(&self, id: &str) -> Option<&Screen> {
        self.screens.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.screens.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// Insert an empty screen, replacing any screen with the same id
    fn add_screen(&mut self, id: &str) -> &mut Screen {
        match self.screens.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(Screen::new(id));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Screen::new(id)),
        }
    }

    fn screen_mut(&mut self, id: &str) -> Option<&mut Screen> {
        self.screens.get_mut(id)
    }

    /// Drop every screen that was generated from data
    pub fn purge_generated(&mut self) {
        self.screens.retain(|_, s| s.builtin);
    }

    /// Regenerate the data-driven screens from the catalog and saved entries
    pub fn rebuild(
        &mut self,
        catalog: &Catalog,
        presets: &BTreeMap<String, Preset>,
        themes: &BTreeMap<String, Theme>,
    ) {
        self.purge_generated();
        self.add_screen(DISPLAY);
        self.add_screen(PRESETS);
        self.add_screen(THEMES);

        for anim in &catalog.animations {
            self.add_animation_screen(
                DISPLAY,
                &anim.id,
                &anim.button,
                PresetSource::Animation(anim.id.clone()),
                catalog,
                &anim.id,
            );
        }
        for (name, preset) in presets {
            if catalog.animation(&preset.animation).is_none() {
                log::warn!("preset {} refers to unknown animation {}", name, preset.animation);
                continue;
            }
            self.add_animation_screen(
                PRESETS,
                name,
                name,
                PresetSource::Saved(name.clone()),
                catalog,
                &preset.animation,
            );
        }

        if let Some(scr_themes) = self.screen_mut(THEMES) {
            for name in themes.keys() {
                scr_themes.set_button(name, ButtonAction::ApplyTheme(name.clone()));
            }
        }
    }

    fn add_animation_screen(
        &mut self,
        parent: &str,
        ident: &str,
        label: &str,
        source: PresetSource,
        catalog: &Catalog,
        anim_id: &str,
    ) {
        let Some(anim) = catalog.animation(anim_id) else {
            return;
        };
        let screen_id = format!("{}.{}", parent, ident);
        if let Some(root) = self.screen_mut(parent) {
            root.set_button(
                label,
                ButtonAction::Activate {
                    source,
                    screen: screen_id.clone(),
                },
            );
        }

        let screen = self.add_screen(&screen_id);
        if !anim.sliders.is_empty() {
            screen.is_animation = true;
            screen.set_button("PRST", ButtonAction::SavePreset);
        }
        for slider in &anim.sliders {
            screen.set_button(&slider.name, ButtonAction::EditParam(slider.name.clone()));
        }
        for e in &anim.enums {
            for option in &e.options {
                screen.set_button(
                    option,
                    ButtonAction::SelectOption {
                        name: e.name.clone(),
                        option: option.clone(),
                    },
                );
            }
        }
    }
}

impl Default for ScreenTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of open screens; the top is the active one and the root is never popped
#[derive(Debug, Clone)]
pub struct ScreenNavigator {
    stack: Vec<String>,
}

impl ScreenNavigator {
    pub fn new() -> Self {
        Self {
            stack: vec![ROOT.to_string()],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    pub fn active_id(&self) -> &str {
        self.stack.last().map(String::as_str).unwrap_or(ROOT)
    }

    pub fn active<'a>(&self, tree: &'a ScreenTree) -> Option<&'a Screen> {
        tree.get(self.active_id())
    }

    pub fn push(&mut self, tree: &ScreenTree, id: &str) -> bool {
        if !tree.contains(id) {
            log::warn!("pushScreen: invalid screen {}", id);
            return false;
        }
        self.stack.push(id.to_string());
        true
    }

    pub fn pop(&mut self) -> bool {
        if self.stack.len() < 2 {
            log::warn!("popScreen: attempted to pop root");
            return false;
        }
        self.stack.pop();
        true
    }

    pub fn home(&mut self) {
        self.stack.truncate(1);
    }

    /// Buttons for the active screen, with HOME and BACK when not at the root
    pub fn visible_buttons(&self, tree: &ScreenTree) -> Vec<Button> {
        let mut buttons = Vec::new();
        if self.stack.len() > 1 {
            buttons.push(Button {
                label: "HOME".to_string(),
                action: ButtonAction::Home,
            });
            buttons.push(Button {
                label: "BACK".to_string(),
                action: ButtonAction::Back,
            });
        }
        if let Some(screen) = self.active(tree) {
            buttons.extend(screen.buttons().iter().cloned());
        }
        buttons
    }

    pub fn breadcrumbs(&self, slider_title: Option<&str>) -> String {
        match slider_title {
            Some(title) => format!("{}:{}", self.active_id(), title),
            None => self.active_id().to_string(),
        }
    }
}

impl Default for ScreenNavigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_tree() -> ScreenTree {
        let catalog = Catalog::embedded();
        let mut presets = BTreeMap::new();
        presets.insert(
            "warm".to_string(),
            Preset {
                animation: "sparkle".to_string(),
                ..Default::default()
            },
        );
        let mut themes = BTreeMap::new();
        themes.insert("calm".to_string(), Theme::new());
        let mut tree = ScreenTree::new();
        tree.rebuild(&catalog, &presets, &themes);
        tree
    }

    #[test]
    fn test_root_buttons() {
        let tree = ScreenTree::new();
        let labels: Vec<_> = tree.get(ROOT).unwrap().buttons().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["DPLY", "BRGT", "THME", "PRST", "STHM", "CUE", "HUE"]);
    }

    #[test]
    fn test_push_unknown_leaves_stack() {
        let tree = ScreenTree::new();
        let mut nav = ScreenNavigator::new();
        assert!(!nav.push(&tree, "nowhere"));
        assert_eq!(nav.stack(), &["root".to_string()]);
    }

    #[test]
    fn test_pop_root_leaves_stack() {
        let mut nav = ScreenNavigator::new();
        assert!(!nav.pop());
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.active_id(), ROOT);
    }

    #[test]
    fn test_push_pop_home() {
        let tree = built_tree();
        let mut nav = ScreenNavigator::new();
        assert!(nav.push(&tree, DISPLAY));
        assert!(nav.push(&tree, "display.sparkle"));
        assert_eq!(nav.depth(), 3);
        assert!(nav.pop());
        assert_eq!(nav.active_id(), DISPLAY);
        nav.push(&tree, "display.sparkle");
        nav.home();
        assert_eq!(nav.stack(), &["root".to_string()]);
    }

    #[test]
    fn test_visible_buttons_add_home_back() {
        let tree = built_tree();
        let mut nav = ScreenNavigator::new();
        assert_eq!(nav.visible_buttons(&tree)[0].label, "DPLY");
        nav.push(&tree, THEMES);
        let buttons = nav.visible_buttons(&tree);
        let labels: Vec<_> = buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["HOME", "BACK", "calm"]);
        assert_eq!(buttons[2].action, ButtonAction::ApplyTheme("calm".to_string()));
    }

    #[test]
    fn test_animation_screens() {
        let tree = built_tree();
        let display = tree.get(DISPLAY).unwrap();
        let rainbow = display.buttons().iter().find(|b| b.label == "RNBW").unwrap();
        assert_eq!(
            rainbow.action,
            ButtonAction::Activate {
                source: PresetSource::Animation("rainbow".to_string()),
                screen: "display.rainbow".to_string(),
            }
        );

        let sparkle = tree.get("display.sparkle").unwrap();
        assert!(sparkle.is_animation);
        assert!(!sparkle.builtin);
        let labels: Vec<_> = sparkle.buttons().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["PRST", "hue", "saturation", "frequency", "FIX", "CYC"]);

        let preset_screen = tree.get("presets.warm").unwrap();
        assert!(preset_screen.is_animation);
        assert!(tree.get(PRESETS).unwrap().buttons().iter().any(|b| b.label == "warm"));
    }

    #[test]
    fn test_rebuild_purges_generated() {
        let mut tree = built_tree();
        let before = tree.len();
        tree.rebuild(&Catalog::default(), &BTreeMap::new(), &BTreeMap::new());
        assert!(tree.len() < before);
        assert!(tree.contains(ROOT));
        assert!(tree.contains(DISPLAY));
        assert!(!tree.contains("presets.warm"));
    }

    #[test]
    fn test_set_button_replaces_in_place() {
        let mut screen = Screen::new("s");
        screen.set_button("A", ButtonAction::Cue);
        screen.set_button("B", ButtonAction::Cue);
        screen.set_button("A", ButtonAction::Hue);
        assert_eq!(screen.buttons()[0].label, "A");
        assert_eq!(screen.buttons()[0].action, ButtonAction::Hue);
        assert_eq!(screen.buttons().len(), 2);
    }

    #[test]
    fn test_breadcrumbs() {
        let nav = ScreenNavigator::new();
        assert_eq!(nav.breadcrumbs(None), "root");
        assert_eq!(nav.breadcrumbs(Some("hue")), "root:hue");
    }
}
