use crate::backend::CommandSink;
use crate::panes::{HelpPane, MenuPane, PromptPane};
use crate::state::{AppState, ButtonAction, SaveOutcome, SliderTarget, StoreResult};
use crate::ui::{Action, CellAction, Frame, NavAction, PaneManager, SaveKind, StoreAction};

/// Dispatch an action. Returns true if the app should quit.
pub fn dispatch_action(
    action: &Action,
    state: &mut AppState,
    panes: &mut PaneManager,
    sink: &dyn CommandSink,
    app_frame: &mut Frame,
) -> bool {
    match action {
        Action::Quit => return true,
        Action::Nav(a) => dispatch_nav(a, state, panes),
        Action::Button(a) => dispatch_button(a, state, panes, sink, app_frame),
        Action::Slider(value) => dispatch_slider(*value, state, sink, app_frame),
        Action::Cell(a) => match a {
            CellAction::Toggle(id) => {
                state.selection.toggle(id);
            }
            CellAction::ToggleAll => state.selection.toggle_all(),
        },
        Action::Store(a) => dispatch_store(a, state, panes, app_frame),
        Action::Resend => {
            if !state.selection.has_selection() {
                app_frame.push_message("no cells selected".to_string());
            } else if state.apply_settings(sink) == 0 {
                app_frame.push_message("nothing to send".to_string());
            }
        }
        Action::None => {}
    }
    if let Some(menu) = panes.get_pane_mut::<MenuPane>("menu") {
        menu.sync(state);
    }
    false
}

fn dispatch_nav(action: &NavAction, state: &AppState, panes: &mut PaneManager) {
    match action {
        NavAction::PushPane("help") => {
            let current_id = panes.active().id();
            if current_id == "help" {
                return;
            }
            let current_keymap = panes.active_keymap().clone();
            if let Some(help) = panes.get_pane_mut::<HelpPane>("help") {
                help.set_context(current_id, &current_keymap);
            }
            panes.push_to("help", state);
        }
        NavAction::PushPane(id) => {
            panes.push_to(id, state);
        }
        NavAction::PopPane => {
            panes.pop(state);
        }
    }
}

fn dispatch_button(
    action: &ButtonAction,
    state: &mut AppState,
    panes: &mut PaneManager,
    sink: &dyn CommandSink,
    app_frame: &mut Frame,
) {
    match action {
        ButtonAction::Home => state.go_home(),
        ButtonAction::Back => {
            state.pop_screen();
        }
        ButtonAction::Push(id) => {
            state.push_screen(id);
        }
        ButtonAction::Brightness => state.enter_brightness(),
        ButtonAction::Hue => {
            state.bind_slider(SliderTarget::Hue);
        }
        ButtonAction::SaveTheme => open_prompt(SaveKind::Theme, state, panes),
        ButtonAction::SavePreset => open_prompt(SaveKind::Preset, state, panes),
        ButtonAction::Cue => {}
        ButtonAction::Activate { source, screen } => {
            if state.activate(source) {
                state.push_screen(screen);
                state.apply_settings(sink);
            }
        }
        ButtonAction::EditParam(name) => {
            state.bind_slider(SliderTarget::Param(name.clone()));
        }
        ButtonAction::SelectOption { name, option } => {
            if state.select_option(name, option) {
                state.apply_settings(sink);
            }
        }
        ButtonAction::ApplyTheme(name) => {
            if !state.selection.has_selection() {
                app_frame.push_message("no cells selected".to_string());
            } else {
                state.apply_theme(name, sink);
            }
        }
    }
}

fn dispatch_slider(value: f64, state: &mut AppState, sink: &dyn CommandSink, app_frame: &mut Frame) {
    let Some(binding) = state.slider.clone() else {
        return;
    };
    if let Err(e) = state.set_slider_value(&binding.target, value) {
        log::warn!("slider {}: {}", binding.title, e);
        app_frame.push_message(format!("could not store {}: {}", binding.title, e));
    }
    // Hue only recolors the panel
    if binding.target != SliderTarget::Hue {
        state.apply_settings(sink);
    }
}

fn open_prompt(kind: SaveKind, state: &AppState, panes: &mut PaneManager) {
    if let Some(prompt) = panes.get_pane_mut::<PromptPane>("prompt") {
        prompt.open(kind);
    }
    panes.push_to("prompt", state);
}

fn dispatch_store(action: &StoreAction, state: &mut AppState, panes: &mut PaneManager, app_frame: &mut Frame) {
    match action {
        StoreAction::PromptSave(kind) => open_prompt(*kind, state, panes),
        StoreAction::Save { kind, name, overwrite } => {
            let result = match kind {
                SaveKind::Preset => state.save_preset(name, *overwrite),
                SaveKind::Theme => state.save_theme(name, *overwrite),
            };
            match result {
                Ok(SaveOutcome::NameTaken) => {
                    if let Some(prompt) = panes.get_pane_mut::<PromptPane>("prompt") {
                        prompt.confirm_overwrite(name.trim());
                    }
                    return;
                }
                Ok(SaveOutcome::Saved) => {
                    app_frame.push_message(format!("{} {} saved", kind.noun(), name.trim()));
                }
                Ok(SaveOutcome::Empty) => {
                    app_frame.push_message(format!("nothing to save as {}", kind.noun()));
                }
                Ok(SaveOutcome::Cancelled) => {}
                Err(e) => report_store_error(e, app_frame),
            }
            panes.pop(state);
        }
        StoreAction::Delete { kind, name } => {
            let result: StoreResult<bool> = match kind {
                SaveKind::Preset => state.delete_preset(name),
                SaveKind::Theme => state.delete_theme(name),
            };
            match result {
                Ok(true) => app_frame.push_message(format!("{} {} deleted", kind.noun(), name)),
                Ok(false) => {}
                Err(e) => report_store_error(e, app_frame),
            }
        }
    }
}

fn report_store_error(e: crate::state::StoreError, app_frame: &mut Frame) {
    log::warn!("store: {}", e);
    app_frame.push_message(format!("store error: {}", e));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::RecordingSink;
    use crate::config::SliderSettings;
    use crate::state::{Catalog, KvStore, PresetSource, PresetStore};
    use crate::ui::keybindings::load_keybindings;
    use crate::ui::widgets::Orientation;
    use crate::ui::{MouseButton, MouseEvent, MouseKind};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    struct Harness {
        state: AppState,
        panes: PaneManager,
        sink: RecordingSink,
        frame: Frame,
    }

    impl Harness {
        fn new() -> Self {
            let state = AppState::new(
                Catalog::embedded(),
                PresetStore::load(KvStore::open_in_memory().unwrap()).unwrap(),
            )
            .unwrap();
            let (_, mut keymaps) = load_keybindings();
            let settings = SliderSettings {
                orientation: Orientation::Vertical,
                immediate: false,
                step: 0.02,
            };
            let menu = MenuPane::new(keymaps.remove("menu").unwrap_or_default(), settings).unwrap();
            let mut panes = PaneManager::new(Box::new(menu));
            panes.add_pane(Box::new(PromptPane::new(keymaps.remove("prompt").unwrap_or_default())));
            panes.add_pane(Box::new(HelpPane::new(keymaps.remove("help").unwrap_or_default())));
            Self {
                state,
                panes,
                sink: RecordingSink::default(),
                frame: Frame::new("test".to_string()),
            }
        }

        fn run(&mut self, action: Action) -> bool {
            dispatch_action(&action, &mut self.state, &mut self.panes, &self.sink, &mut self.frame)
        }

        fn click(&mut self, kind: MouseKind, column: u16, row: u16) {
            let action = self.panes.active_mut().handle_mouse(MouseEvent::new(kind, column, row), &self.state);
            self.run(action);
        }

        /// Render, then locate the empty vertical slider track as (column, top, bottom)
        fn track_rows(&mut self) -> (u16, u16, u16) {
            let area = Rect::new(0, 0, 80, 24);
            let mut buf = Buffer::empty(area);
            self.panes.render(area, &mut buf, &self.state);
            let x = (0..area.width)
                .find(|&x| (0..area.height).any(|y| buf[(x, y)].symbol() == "│"))
                .unwrap();
            let rows: Vec<u16> = (0..area.height).filter(|&y| buf[(x, y)].symbol() == "│").collect();
            (x, rows[0], *rows.last().unwrap())
        }
    }

    #[test]
    fn test_activate_sends_to_selection() {
        let mut h = Harness::new();
        h.run(Action::Cell(CellAction::Toggle("a1".into())));
        h.run(Action::Button(ButtonAction::Push("display".into())));
        h.run(Action::Button(ButtonAction::Activate {
            source: PresetSource::Animation("rainbow".into()),
            screen: "display.rainbow".into(),
        }));
        assert_eq!(h.state.nav.active_id(), "display.rainbow");
        assert_eq!(h.sink.take(), vec!["display rainbow d 1 k 1 phase 0 on a1"]);
    }

    #[test]
    fn test_slider_commit_applies_except_hue() {
        let mut h = Harness::new();
        h.run(Action::Cell(CellAction::ToggleAll));
        h.run(Action::Button(ButtonAction::Brightness));
        h.run(Action::Slider(0.25));
        assert_eq!(h.state.brightness, 0.25);
        assert_eq!(
            h.sink.take(),
            vec!["brightness 0.25 on a1 on a2 on a3 on a4 on b1 on b2 on b3 on b4"]
        );

        h.run(Action::Button(ButtonAction::Hue));
        h.run(Action::Slider(90.0));
        assert_eq!(h.state.hue, 90.0);
        assert!(h.sink.take().is_empty());
    }

    #[test]
    fn test_save_preset_flow_with_overwrite() {
        let mut h = Harness::new();
        h.state.activate(&PresetSource::Animation("sparkle".into()));
        h.run(Action::Button(ButtonAction::SavePreset));
        assert_eq!(h.panes.active().id(), "prompt");

        h.run(Action::Store(StoreAction::Save {
            kind: SaveKind::Preset,
            name: "warm".into(),
            overwrite: false,
        }));
        assert_eq!(h.panes.active().id(), "menu");
        assert!(h.state.screens.contains("presets.warm"));
        assert_eq!(h.frame.last_message(), Some("preset warm saved"));

        h.state.activate(&PresetSource::Animation("sparkle".into()));
        h.run(Action::Button(ButtonAction::SavePreset));
        h.run(Action::Store(StoreAction::Save {
            kind: SaveKind::Preset,
            name: "warm".into(),
            overwrite: false,
        }));
        // Still prompting, now for confirmation
        assert_eq!(h.panes.active().id(), "prompt");
        h.run(Action::Store(StoreAction::Save {
            kind: SaveKind::Preset,
            name: "warm".into(),
            overwrite: true,
        }));
        assert_eq!(h.panes.active().id(), "menu");
    }

    #[test]
    fn test_delete_theme() {
        let mut h = Harness::new();
        h.run(Action::Cell(CellAction::Toggle("a1".into())));
        h.state.activate(&PresetSource::Animation("rainbow".into()));
        h.run(Action::Resend);
        h.run(Action::Store(StoreAction::Save {
            kind: SaveKind::Theme,
            name: "calm".into(),
            overwrite: false,
        }));
        assert!(h.state.store.theme("calm").is_some());
        h.run(Action::Store(StoreAction::Delete {
            kind: SaveKind::Theme,
            name: "calm".into(),
        }));
        assert!(h.state.store.theme("calm").is_none());
        assert_eq!(h.frame.last_message(), Some("theme calm deleted"));
    }

    #[test]
    fn test_help_opened_mid_drag_does_not_strand_slider() {
        let mut h = Harness::new();
        h.run(Action::Button(ButtonAction::Brightness));
        let (x, top, bottom) = h.track_rows();

        h.click(MouseKind::Down(MouseButton::Left), x, top);
        h.run(Action::Nav(NavAction::PushPane("help")));
        h.click(MouseKind::Up(MouseButton::Left), x, top);
        assert_eq!(h.panes.active().id(), "help");
        h.run(Action::Nav(NavAction::PopPane));

        h.click(MouseKind::Down(MouseButton::Left), x, bottom);
        h.click(MouseKind::Up(MouseButton::Left), x, bottom);
        assert!(h.state.brightness < 0.1, "bottom tap gave {}", h.state.brightness);
    }

    #[test]
    fn test_resend_without_selection() {
        let mut h = Harness::new();
        h.run(Action::Resend);
        assert!(h.sink.take().is_empty());
        assert_eq!(h.frame.last_message(), Some("no cells selected"));
    }

    #[test]
    fn test_help_and_quit() {
        let mut h = Harness::new();
        h.run(Action::Nav(NavAction::PushPane("help")));
        assert_eq!(h.panes.active().id(), "help");
        h.run(Action::Nav(NavAction::PopPane));
        assert_eq!(h.panes.active().id(), "menu");
        assert!(h.run(Action::Quit));
    }
}
