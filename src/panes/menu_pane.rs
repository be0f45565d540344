use std::any::Any;
use std::cell::Cell;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as RatatuiRect;
use ratatui::widgets::{Block, Borders, Widget};

use crate::config::SliderSettings;
use crate::state::{AppState, ButtonAction, PresetSource, SliderBinding};
use crate::ui::layout_helpers::contains;
use crate::ui::widgets::{Orientation, Pointer, PointerId, Slider, SliderConfig, SliderError, SliderInput};
use crate::ui::{
    Action, CellAction, Color, InputEvent, KeyCode, Keymap, MouseEvent, MouseKind, Pane, SaveKind,
    StoreAction, Style,
};

const BUTTON_WIDTH: u16 = 18;
const SLIDER_WIDTH: u16 = 9;
const SLIDER_HEIGHT: u16 = 4;
const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;
const BIG_STEPS: f64 = 10.0;

/// Screen regions from the last render, used for mouse hit-testing
#[derive(Debug, Clone, Copy, Default)]
struct MenuLayout {
    buttons: RatatuiRect,
    /// The slider's track (empty when the slider is hidden)
    track: RatatuiRect,
    grid: RatatuiRect,
}

/// Main panel: screen buttons, the shared slider and the cell grid
pub struct MenuPane {
    keymap: Keymap,
    cursor: usize,
    slider: Slider,
    /// Binding the slider widget currently reflects
    bound: Option<SliderBinding>,
    step: f64,
    screen_id: String,
    layout: Cell<MenuLayout>,
}

impl MenuPane {
    pub fn new(keymap: Keymap, settings: SliderSettings) -> Result<Self, SliderError> {
        let config = SliderConfig::default()
            .immediate(settings.immediate)
            .with_orientation(settings.orientation);
        let slider = Slider::new(config)?;
        Ok(Self {
            keymap,
            cursor: 0,
            slider,
            bound: None,
            step: settings.step,
            screen_id: String::new(),
            layout: Cell::new(MenuLayout::default()),
        })
    }

    /// Follow the state's slider binding and active screen
    pub fn sync(&mut self, state: &AppState) {
        if self.screen_id != state.nav.active_id() {
            self.screen_id = state.nav.active_id().to_string();
            self.cursor = 0;
        }
        if self.bound == state.slider {
            return;
        }
        self.bound = state.slider.clone();
        if let Some(binding) = &state.slider {
            let value = state.slider_value(&binding.target).unwrap_or(binding.min);
            if let Err(e) = self.slider.reconfigure(binding.min, binding.max, value) {
                log::warn!("slider {}: {}", binding.title, e);
                self.bound = None;
            }
        }
    }

    pub fn slider_value(&self) -> f64 {
        self.slider.value()
    }

    fn pointer(&self, event: &MouseEvent, button: u8) -> Pointer {
        let track = self.layout.get().track;
        // Pointer positions are taken at the middle of the terminal cell
        let (position, origin) = match self.slider.orientation() {
            Orientation::Vertical => (event.row as f64 + 0.5, track.y as f64),
            Orientation::Horizontal => (event.column as f64 + 0.5, track.x as f64),
        };
        Pointer::new(PointerId::Mouse(button), position, position - origin)
    }

    fn nudge(&mut self, steps: f64) -> Action {
        if self.bound.is_none() {
            return Action::None;
        }
        let delta = (self.slider.max() - self.slider.min()) * self.step * steps;
        match self.slider.handle(SliderInput::Nudge(delta)) {
            Some(change) => Action::Slider(change.value),
            None => Action::None,
        }
    }

    fn delete_action(button: &ButtonAction) -> Action {
        match button {
            ButtonAction::ApplyTheme(name) => Action::Store(StoreAction::Delete {
                kind: SaveKind::Theme,
                name: name.clone(),
            }),
            ButtonAction::Activate {
                source: PresetSource::Saved(name),
                ..
            } => Action::Store(StoreAction::Delete {
                kind: SaveKind::Preset,
                name: name.clone(),
            }),
            _ => Action::None,
        }
    }

    fn cell_rect(grid: RatatuiRect, row: u16, col: u16) -> RatatuiRect {
        RatatuiRect::new(
            grid.x.saturating_add(col.saturating_mul(CELL_WIDTH)),
            grid.y.saturating_add(row.saturating_mul(CELL_HEIGHT)),
            CELL_WIDTH,
            CELL_HEIGHT,
        )
    }

    fn compute_layout(&self, area: RatatuiRect, state: &AppState) -> MenuLayout {
        let buttons = RatatuiRect::new(area.x + 1, area.y + 1, BUTTON_WIDTH.min(area.width), area.height.saturating_sub(1));
        let right_x = buttons.right() + 1;
        let right_w = area.right().saturating_sub(right_x);
        let (rows, cols) = state.catalog.grid_size();
        let grid_size = (cols.saturating_mul(CELL_WIDTH), rows.saturating_mul(CELL_HEIGHT));

        let mut track = RatatuiRect::default();
        let grid;
        match (self.slider.orientation(), state.slider.is_some()) {
            (Orientation::Vertical, true) => {
                // Title above, value below the track
                track = RatatuiRect::new(right_x + 3, area.y + 2, 3, area.height.saturating_sub(4));
                let gx = right_x + SLIDER_WIDTH + 1;
                grid = RatatuiRect::new(gx, area.y + 1, grid_size.0, grid_size.1);
            }
            (Orientation::Horizontal, true) => {
                track = RatatuiRect::new(right_x + 1, area.y + 2, right_w.saturating_sub(2), 1);
                grid = RatatuiRect::new(right_x, area.y + 1 + SLIDER_HEIGHT, grid_size.0, grid_size.1);
            }
            (_, false) => {
                grid = RatatuiRect::new(right_x, area.y + 1, grid_size.0, grid_size.1);
            }
        }
        MenuLayout {
            buttons,
            track: track.intersection(area),
            grid: grid.intersection(area),
        }
    }

    fn render_buttons(&self, rect: RatatuiRect, buf: &mut Buffer, state: &AppState, accent: Color) {
        let current = state.current.preset();
        let cursor = self.cursor;
        for (i, button) in state.visible_buttons().iter().enumerate() {
            let y = rect.y + i as u16;
            if y >= rect.bottom() {
                break;
            }
            let chosen = match (&button.action, current) {
                (ButtonAction::SelectOption { name, option }, Some(p)) => {
                    p.enums.get(name) == Some(option)
                }
                _ => false,
            };
            let marker = if chosen { "* " } else { "  " };
            let mut style = match button.action {
                ButtonAction::Home | ButtonAction::Back => Style::new().fg(Color::GRAY),
                _ => Style::new().fg(accent),
            };
            if i == cursor {
                style = style.bg(Color::SELECTION_BG).bold();
            }
            let text = format!("{}{:<w$}", marker, button.label, w = rect.width.saturating_sub(2) as usize);
            buf.set_stringn(rect.x, y, &text, rect.width as usize, ratatui::style::Style::from(style));
        }
    }

    fn render_slider(&self, track: RatatuiRect, buf: &mut Buffer, binding: &SliderBinding, accent: Color) {
        if track.width == 0 || track.height == 0 {
            return;
        }
        let fill = ratatui::style::Style::from(Style::new().fg(accent));
        let empty = ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY));
        let label = ratatui::style::Style::from(Style::new().fg(Color::WHITE).bold());
        let value = format!("{:.3}", self.slider.value());
        let fraction = self.slider.fraction();

        match self.slider.orientation() {
            Orientation::Vertical => {
                let filled = (fraction * track.height as f64).round() as u16;
                for row in 0..track.height {
                    let from_bottom = track.height - row;
                    let (ch, style) = if from_bottom <= filled { ('█', fill) } else { ('│', empty) };
                    for x in track.x..track.right() {
                        if let Some(cell) = buf.cell_mut((x, track.y + row)) {
                            cell.set_char(ch).set_style(style);
                        }
                    }
                }
                let left = track.x.saturating_sub(3);
                buf.set_stringn(left, track.y.saturating_sub(1), &binding.title, SLIDER_WIDTH as usize, label);
                buf.set_stringn(left, track.bottom(), &value, SLIDER_WIDTH as usize, empty);
            }
            Orientation::Horizontal => {
                let filled = (fraction * track.width as f64).round() as u16;
                for col in 0..track.width {
                    let (ch, style) = if col < filled { ('█', fill) } else { ('─', empty) };
                    if let Some(cell) = buf.cell_mut((track.x + col, track.y)) {
                        cell.set_char(ch).set_style(style);
                    }
                }
                let caption = format!("{} {}", binding.title, value);
                buf.set_stringn(track.x, track.y.saturating_sub(1), &caption, track.width as usize, label);
            }
        }
    }

    fn render_grid(&self, grid: RatatuiRect, buf: &mut Buffer, state: &AppState, accent: Color) {
        for (i, cell) in state.catalog.cells.iter().enumerate() {
            let rect = Self::cell_rect(grid, cell.row, cell.col);
            if rect.right() > grid.right() || rect.bottom() > grid.bottom() {
                continue;
            }
            let active = state.selection.is_active(&cell.id);
            let style = if active {
                Style::new().fg(Color::BLACK).bg(accent).bold()
            } else {
                Style::new().fg(Color::GRAY).bg(Color::CELL_OFF)
            };
            let style = ratatui::style::Style::from(style);
            let mut block = Block::default().borders(Borders::ALL).border_style(style).style(style);
            if i < 9 {
                block = block.title(format!("{}", i + 1));
            }
            let inner = block.inner(rect);
            block.render(rect, buf);
            buf.set_stringn(inner.x, inner.y, &cell.id, inner.width as usize, style);
        }
        if !state.selection.has_selection() && grid.height > 0 {
            let hint = ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY));
            buf.set_string(grid.x, grid.bottom() - 1, "no cells selected", hint);
        }
    }
}

impl Pane for MenuPane {
    fn id(&self) -> &'static str {
        "menu"
    }

    fn handle_input(&mut self, event: InputEvent, state: &AppState) -> Action {
        let buttons = state.visible_buttons();
        self.cursor = self.cursor.min(buttons.len().saturating_sub(1));
        match self.keymap.lookup(&event) {
            Some("up") => {
                self.cursor = self.cursor.saturating_sub(1);
                Action::None
            }
            Some("down") => {
                if self.cursor + 1 < buttons.len() {
                    self.cursor += 1;
                }
                Action::None
            }
            Some("press") => match buttons.get(self.cursor) {
                Some(button) => Action::Button(button.action.clone()),
                None => Action::None,
            },
            Some("back") => Action::Button(ButtonAction::Back),
            Some("home") => Action::Button(ButtonAction::Home),
            Some("slider_up") => self.nudge(1.0),
            Some("slider_down") => self.nudge(-1.0),
            Some("slider_up_big") => self.nudge(BIG_STEPS),
            Some("slider_down_big") => self.nudge(-BIG_STEPS),
            Some("toggle_all") => Action::Cell(CellAction::ToggleAll),
            Some("resend") => Action::Resend,
            Some("delete") => buttons
                .get(self.cursor)
                .map(|b| Self::delete_action(&b.action))
                .unwrap_or(Action::None),
            _ => match event.key {
                // Digits address cells in catalog order
                KeyCode::Char(c @ '1'..='9') if !event.modifiers.ctrl && !event.modifiers.alt => {
                    let index = c as usize - '1' as usize;
                    match state.selection.cells().get(index) {
                        Some(id) => Action::Cell(CellAction::Toggle(id.clone())),
                        None => Action::None,
                    }
                }
                _ => Action::None,
            },
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, state: &AppState) -> Action {
        let layout = self.layout.get();
        match event.kind {
            MouseKind::Down(button) => {
                if self.bound.is_some() && contains(layout.track, event.column, event.row) {
                    let extent = match self.slider.orientation() {
                        Orientation::Vertical => layout.track.height,
                        Orientation::Horizontal => layout.track.width,
                    };
                    self.slider.set_extent(extent as f64);
                    let pointer = self.pointer(&event, button.index());
                    self.slider.handle(SliderInput::Press(pointer));
                    return Action::None;
                }
                if button.index() != 0 {
                    return Action::None;
                }
                if contains(layout.buttons, event.column, event.row) {
                    let index = (event.row - layout.buttons.y) as usize;
                    if let Some(b) = state.visible_buttons().get(index) {
                        self.cursor = index;
                        return Action::Button(b.action.clone());
                    }
                    return Action::None;
                }
                for cell in &state.catalog.cells {
                    if contains(Self::cell_rect(layout.grid, cell.row, cell.col), event.column, event.row) {
                        return Action::Cell(CellAction::Toggle(cell.id.clone()));
                    }
                }
                Action::None
            }
            MouseKind::Drag(button) => {
                // Tracked everywhere, not only over the track
                let pointer = self.pointer(&event, button.index());
                match self.slider.handle(SliderInput::Move(pointer)) {
                    Some(change) => Action::Slider(change.value),
                    None => Action::None,
                }
            }
            MouseKind::Up(button) => {
                match self.slider.handle(SliderInput::Release(PointerId::Mouse(button.index()))) {
                    Some(change) => Action::Slider(change.value),
                    None => Action::None,
                }
            }
        }
    }

    fn render(&self, area: RatatuiRect, buf: &mut Buffer, state: &AppState) {
        let layout = self.compute_layout(area, state);
        self.layout.set(layout);
        let accent = Color::from_hue(state.hue);

        self.render_buttons(layout.buttons, buf, state, accent);
        if let Some(binding) = &state.slider {
            self.render_slider(layout.track, buf, binding, accent);
        }
        self.render_grid(layout.grid, buf, state, accent);
    }

    fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    fn on_enter(&mut self, state: &AppState) {
        self.sync(state);
    }

    fn on_exit(&mut self, _state: &AppState) {
        // The release goes to whichever pane is on top
        if self.slider.cancel() {
            // Resync from the state on return
            self.bound = None;
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::CellSpec;
    use crate::state::{Catalog, KvStore, PresetStore, SliderTarget};
    use crate::ui::keybindings::load_keybindings;
    use crate::ui::MouseButton;

    fn state() -> AppState {
        AppState::new(
            Catalog::embedded(),
            PresetStore::load(KvStore::open_in_memory().unwrap()).unwrap(),
        )
        .unwrap()
    }

    fn pane() -> MenuPane {
        let (_, mut keymaps) = load_keybindings();
        MenuPane::new(
            keymaps.remove("menu").unwrap(),
            SliderSettings {
                orientation: Orientation::Vertical,
                immediate: false,
                step: 0.1,
            },
        )
        .unwrap()
    }

    const AREA: RatatuiRect = RatatuiRect::new(0, 0, 80, 24);

    fn render(pane: &MenuPane, state: &AppState) -> Buffer {
        let mut buf = Buffer::empty(AREA);
        pane.render(AREA, &mut buf, state);
        buf
    }

    fn mouse(kind: MouseKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent::new(kind, column, row)
    }

    #[test]
    fn test_cursor_and_press() {
        let state = state();
        let mut pane = pane();
        pane.handle_input(InputEvent::key(KeyCode::Down), &state);
        let action = pane.handle_input(InputEvent::key(KeyCode::Enter), &state);
        assert_eq!(action, Action::Button(ButtonAction::Brightness));
        // Cursor stops at the end of the list
        for _ in 0..20 {
            pane.handle_input(InputEvent::key(KeyCode::Down), &state);
        }
        let action = pane.handle_input(InputEvent::key(KeyCode::Enter), &state);
        assert_eq!(action, Action::Button(ButtonAction::Hue));
    }

    #[test]
    fn test_digit_toggles_cell() {
        let state = state();
        let mut pane = pane();
        assert_eq!(
            pane.handle_input(InputEvent::key(KeyCode::Char('5')), &state),
            Action::Cell(CellAction::Toggle("b1".to_string()))
        );
        assert_eq!(pane.handle_input(InputEvent::key(KeyCode::Char('9')), &state), Action::None);
    }

    #[test]
    fn test_click_button_and_cell() {
        let state = state();
        let mut pane = pane();
        render(&pane, &state);
        let layout = pane.layout.get();

        let action = pane.handle_mouse(
            mouse(MouseKind::Down(MouseButton::Left), layout.buttons.x, layout.buttons.y),
            &state,
        );
        assert_eq!(action, Action::Button(ButtonAction::Push("display".to_string())));

        let action = pane.handle_mouse(
            mouse(MouseKind::Down(MouseButton::Left), layout.grid.x + CELL_WIDTH + 2, layout.grid.y + 1),
            &state,
        );
        assert_eq!(action, Action::Cell(CellAction::Toggle("a2".to_string())));
    }

    #[test]
    fn test_nudge_needs_binding() {
        let mut state = state();
        let mut pane = pane();
        assert_eq!(pane.handle_input(InputEvent::key(KeyCode::Char('+')), &state), Action::None);

        state.bind_slider(SliderTarget::Hue);
        state.set_slider_value(&SliderTarget::Hue, 100.0).unwrap();
        pane.sync(&state);
        assert_eq!(pane.slider_value(), 100.0);
        assert_eq!(
            pane.handle_input(InputEvent::key(KeyCode::Char('+')), &state),
            Action::Slider(136.0)
        );
    }

    #[test]
    fn test_drag_commits_on_release() {
        let mut state = state();
        state.enter_brightness();
        let mut pane = pane();
        pane.sync(&state);
        render(&pane, &state);
        let track = pane.layout.get().track;
        let x = track.x + 1;

        let down = mouse(MouseKind::Down(MouseButton::Left), x, track.bottom() - 1);
        assert_eq!(pane.handle_mouse(down, &state), Action::None);
        let drag = mouse(MouseKind::Drag(MouseButton::Left), x, track.y);
        assert_eq!(pane.handle_mouse(drag, &state), Action::None);
        assert!(pane.slider_value() > 0.8);

        let up = mouse(MouseKind::Up(MouseButton::Left), x, track.y);
        match pane.handle_mouse(up, &state) {
            Action::Slider(v) => assert_eq!(v, pane.slider_value()),
            other => panic!("expected slider commit, got {:?}", other),
        }
    }

    #[test]
    fn test_tap_sets_value_at_pointer() {
        let mut state = state();
        state.enter_brightness();
        let mut pane = pane();
        pane.sync(&state);
        render(&pane, &state);
        let track = pane.layout.get().track;
        let x = track.x;
        let row = track.y + track.height / 2;

        pane.handle_mouse(mouse(MouseKind::Down(MouseButton::Left), x, row), &state);
        let action = pane.handle_mouse(mouse(MouseKind::Up(MouseButton::Left), x, row), &state);
        let expected = (track.height as f64 - (row - track.y) as f64 - 0.5) / track.height as f64;
        match action {
            Action::Slider(v) => assert!((v - expected).abs() < 1e-9),
            other => panic!("expected slider commit, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_mid_drag_releases_slider() {
        let mut state = state();
        state.enter_brightness();
        let mut pane = pane();
        pane.sync(&state);
        render(&pane, &state);
        let track = pane.layout.get().track;
        let x = track.x;

        pane.handle_mouse(mouse(MouseKind::Down(MouseButton::Left), x, track.y), &state);
        // Another pane takes the release
        pane.on_exit(&state);
        pane.on_enter(&state);
        render(&pane, &state);
        assert_eq!(pane.handle_input(InputEvent::key(KeyCode::Char('+')), &state), Action::Slider(0.1));

        let bottom = track.bottom() - 1;
        pane.handle_mouse(mouse(MouseKind::Down(MouseButton::Left), x, bottom), &state);
        let action = pane.handle_mouse(mouse(MouseKind::Up(MouseButton::Left), x, bottom), &state);
        let expected = 0.5 / track.height as f64;
        match action {
            Action::Slider(v) => assert!((v - expected).abs() < 1e-9),
            other => panic!("expected slider commit, got {:?}", other),
        }
    }

    #[test]
    fn test_render_far_cell_is_skipped() {
        let mut state = state();
        state.catalog.cells.push(CellSpec { id: "far".into(), row: 0, col: 10_000 });
        let mut pane = pane();
        let buf = render(&pane, &state);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("a1"));
        assert!(!text.contains("far"));

        let grid = pane.layout.get().grid;
        let action = pane.handle_mouse(mouse(MouseKind::Down(MouseButton::Left), grid.right() - 1, grid.y), &state);
        assert_ne!(action, Action::Cell(CellAction::Toggle("far".into())));
    }

    #[test]
    fn test_delete_on_saved_entries_only() {
        let mut state = state();
        let mut pane = pane();
        state.push_screen("display");
        pane.sync(&state);
        pane.handle_input(InputEvent::key(KeyCode::Down), &state);
        pane.handle_input(InputEvent::key(KeyCode::Down), &state);
        assert_eq!(pane.handle_input(InputEvent::key(KeyCode::Char('x')), &state), Action::None);

        assert_eq!(
            MenuPane::delete_action(&ButtonAction::ApplyTheme("calm".into())),
            Action::Store(StoreAction::Delete { kind: SaveKind::Theme, name: "calm".into() })
        );
    }

    #[test]
    fn test_render_shows_buttons_and_cells() {
        let mut state = state();
        state.selection.toggle("a1");
        let pane = pane();
        let buf = render(&pane, &state);
        let text: String = (0..AREA.height)
            .flat_map(|y| (0..AREA.width).map(move |x| (x, y)))
            .map(|(x, y)| buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect();
        assert!(text.contains("DPLY"));
        assert!(text.contains("HUE"));
        assert!(text.contains("a1"));
        assert!(text.contains("b4"));
    }
}
