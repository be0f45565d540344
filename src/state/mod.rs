pub mod catalog;
pub mod command;
pub mod persistence;
pub mod preset;
pub mod screens;
pub mod selection;

use std::collections::BTreeMap;

pub use catalog::{Animation, Catalog};
pub use persistence::{KvStore, PresetStore, SaveOutcome, StoreError, StoreResult};
pub use preset::{ActivePreset, Preset, Theme};
pub use screens::{Button, ButtonAction, PresetSource, ScreenNavigator, ScreenTree, SliderBinding, SliderTarget};
pub use selection::Selection;

use crate::backend::CommandSink;

/// Hue used until the user picks one
pub const DEFAULT_HUE: f64 = 200.0;

/// Top-level application state, owned by main.rs and passed to panes by reference.
pub struct AppState {
    pub catalog: Catalog,
    pub store: PresetStore,
    pub screens: ScreenTree,
    pub nav: ScreenNavigator,
    pub selection: Selection,
    pub current: ActivePreset,
    pub brightness: f64,
    /// Last command sent to each cell, used to capture themes
    pub cell_commands: BTreeMap<String, String>,
    pub hue: f64,
    /// What the slider is currently bound to; `None` hides it
    pub slider: Option<SliderBinding>,
    pub battery: Option<u8>,
}

impl AppState {
    pub fn new(catalog: Catalog, store: PresetStore) -> StoreResult<Self> {
        let hue = store.load_hue()?.unwrap_or(DEFAULT_HUE);
        let selection = Selection::new(catalog.cell_ids());
        let mut state = Self {
            catalog,
            store,
            screens: ScreenTree::new(),
            nav: ScreenNavigator::new(),
            selection,
            current: ActivePreset::None,
            brightness: 0.0,
            cell_commands: BTreeMap::new(),
            hue,
            slider: None,
            battery: None,
        };
        state.rebuild_screens();
        Ok(state)
    }

    /// Regenerate screens from the catalog and saved entries; resets navigation
    pub fn rebuild_screens(&mut self) {
        self.current = ActivePreset::None;
        self.slider = None;
        self.nav.home();
        self.screens
            .rebuild(&self.catalog, self.store.presets(), self.store.themes());
    }

    fn apply_screen_slider(&mut self) {
        self.slider = self.nav.active(&self.screens).and_then(|s| s.slider.clone());
    }

    pub fn push_screen(&mut self, id: &str) -> bool {
        if !self.nav.push(&self.screens, id) {
            return false;
        }
        self.apply_screen_slider();
        true
    }

    pub fn pop_screen(&mut self) -> bool {
        if !self.nav.pop() {
            return false;
        }
        self.apply_screen_slider();
        true
    }

    pub fn go_home(&mut self) {
        self.nav.home();
        self.apply_screen_slider();
    }

    pub fn visible_buttons(&self) -> Vec<Button> {
        self.nav.visible_buttons(&self.screens)
    }

    pub fn breadcrumbs(&self) -> String {
        self.nav.breadcrumbs(self.slider.as_ref().map(|b| b.title.as_str()))
    }

    /// Make a preset current. Saved values win over animation defaults.
    pub fn activate(&mut self, source: &PresetSource) -> bool {
        let preset = match source {
            PresetSource::Animation(id) => self.catalog.animation(id).map(Preset::from_animation),
            PresetSource::Saved(name) => self
                .store
                .preset(name)
                .and_then(|saved| {
                    self.catalog
                        .animation(&saved.animation)
                        .map(|anim| Preset::from_saved(saved, anim))
                }),
        };
        match preset {
            Some(p) => {
                self.current = ActivePreset::Animation(p);
                true
            }
            None => {
                log::warn!("activate: nothing to activate for {:?}", source);
                false
            }
        }
    }

    /// Switch to brightness mode and bind the slider to it
    pub fn enter_brightness(&mut self) {
        self.current = ActivePreset::Brightness;
        self.bind_slider(SliderTarget::Brightness);
    }

    pub fn bind_slider(&mut self, target: SliderTarget) -> bool {
        let binding = match &target {
            SliderTarget::Brightness => Some(("brightness".to_string(), 0.0, 1.0)),
            SliderTarget::Hue => Some(("hue".to_string(), 0.0, 360.0)),
            SliderTarget::Param(name) => self
                .current
                .preset()
                .and_then(|p| self.catalog.animation(&p.animation))
                .and_then(|anim| anim.slider(name))
                .map(|s| (s.name.clone(), s.min, s.max)),
        };
        match binding {
            Some((title, min, max)) => {
                self.slider = Some(SliderBinding { title, min, max, target });
                true
            }
            None => {
                log::warn!("bind_slider: no value behind {:?}", target);
                false
            }
        }
    }

    pub fn slider_value(&self, target: &SliderTarget) -> Option<f64> {
        match target {
            SliderTarget::Brightness => Some(self.brightness),
            SliderTarget::Hue => Some(self.hue),
            SliderTarget::Param(name) => self.current.preset().and_then(|p| p.sliders.get(name).copied()),
        }
    }

    /// Write a committed slider value to its target. Hue is persisted.
    pub fn set_slider_value(&mut self, target: &SliderTarget, value: f64) -> StoreResult<()> {
        match target {
            SliderTarget::Brightness => self.brightness = value,
            SliderTarget::Hue => {
                self.hue = value;
                self.store.save_hue(value)?;
            }
            SliderTarget::Param(name) => {
                if let Some(p) = self.current.preset_mut() {
                    p.sliders.insert(name.clone(), value);
                }
            }
        }
        Ok(())
    }

    pub fn select_option(&mut self, name: &str, option: &str) -> bool {
        match self.current.preset_mut() {
            Some(p) => {
                p.enums.insert(name.to_string(), option.to_string());
                true
            }
            None => false,
        }
    }

    /// Send the current preset or brightness to the active cells.
    /// Returns the number of commands emitted.
    pub fn apply_settings(&mut self, sink: &dyn CommandSink) -> usize {
        if !self.selection.has_selection() {
            return 0;
        }
        match &self.current {
            ActivePreset::Animation(preset) => {
                let Some(anim) = self.catalog.animation(&preset.animation) else {
                    log::warn!("apply: unknown animation {}", preset.animation);
                    return 0;
                };
                let cmd = command::animation_command(anim, preset);
                for cell in self.selection.active_cells() {
                    self.cell_commands.insert(cell.to_string(), cmd.clone());
                }
                sink.emit(&command::display_command(&cmd, &self.selection));
                1
            }
            ActivePreset::Brightness => {
                sink.emit(&command::brightness_command(self.brightness, &self.selection));
                1
            }
            ActivePreset::None => 0,
        }
    }

    /// Send a saved theme to the active cells
    pub fn apply_theme(&mut self, name: &str, sink: &dyn CommandSink) -> usize {
        let Some(theme) = self.store.theme(name) else {
            log::warn!("apply_theme: unknown theme {}", name);
            return 0;
        };
        let (commands, applied) = command::theme_commands(theme, &self.selection);
        self.cell_commands.extend(applied);
        for cmd in &commands {
            sink.emit(cmd);
        }
        commands.len()
    }

    /// Remembered commands of the active cells
    pub fn theme_from_selection(&self) -> Theme {
        self.cell_commands
            .iter()
            .filter(|(cell, _)| self.selection.is_active(cell))
            .map(|(cell, cmd)| (cell.clone(), cmd.clone()))
            .collect()
    }

    pub fn save_preset(&mut self, name: &str, overwrite: bool) -> StoreResult<SaveOutcome> {
        let Some(preset) = self.current.preset().cloned() else {
            return Ok(SaveOutcome::Empty);
        };
        let outcome = self.store.save_preset(name, preset, overwrite)?;
        if outcome == SaveOutcome::Saved {
            self.rebuild_screens();
        }
        Ok(outcome)
    }

    pub fn save_theme(&mut self, name: &str, overwrite: bool) -> StoreResult<SaveOutcome> {
        let theme = self.theme_from_selection();
        let outcome = self.store.save_theme(name, theme, overwrite)?;
        if outcome == SaveOutcome::Saved {
            self.rebuild_screens();
        }
        Ok(outcome)
    }

    pub fn delete_preset(&mut self, name: &str) -> StoreResult<bool> {
        let removed = self.store.delete_preset(name)?;
        if removed {
            self.rebuild_screens();
        }
        Ok(removed)
    }

    pub fn delete_theme(&mut self, name: &str) -> StoreResult<bool> {
        let removed = self.store.delete_theme(name)?;
        if removed {
            self.rebuild_screens();
        }
        Ok(removed)
    }
}
