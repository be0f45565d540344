use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as RatatuiRect;
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::state::AppState;
use crate::ui::layout_helpers::center_rect;
use crate::ui::widgets::TextInput;
use crate::ui::{Action, Color, InputEvent, KeyCode, Keymap, NavAction, Pane, SaveKind, StoreAction, Style};

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    /// Typing the name
    Name,
    /// The name exists; waiting for y/n
    Confirm(String),
}

/// Modal asking for a preset or theme name, then for overwrite confirmation
pub struct PromptPane {
    keymap: Keymap,
    kind: SaveKind,
    input: TextInput,
    phase: Phase,
}

impl PromptPane {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            kind: SaveKind::Preset,
            input: TextInput::new("name:"),
            phase: Phase::Name,
        }
    }

    /// Start a fresh name prompt
    pub fn open(&mut self, kind: SaveKind) {
        self.kind = kind;
        self.input.clear();
        self.input.set_label(&format!("{} name:", kind.noun()));
        self.phase = Phase::Name;
    }

    /// Ask whether an existing entry should be replaced
    pub fn confirm_overwrite(&mut self, name: &str) {
        self.phase = Phase::Confirm(name.to_string());
    }

    fn save(&self, name: String, overwrite: bool) -> Action {
        Action::Store(StoreAction::Save {
            kind: self.kind,
            name,
            overwrite,
        })
    }
}

impl Pane for PromptPane {
    fn id(&self) -> &'static str {
        "prompt"
    }

    fn handle_input(&mut self, event: InputEvent, _state: &AppState) -> Action {
        let action = self.keymap.lookup(&event);
        match &self.phase {
            Phase::Name => match action {
                Some("confirm") => self.save(self.input.value().to_string(), false),
                Some("cancel") => Action::Nav(NavAction::PopPane),
                _ => {
                    self.input.handle_input(&event);
                    Action::None
                }
            },
            Phase::Confirm(name) => match (action, event.key) {
                (Some("confirm"), _) | (_, KeyCode::Char('y')) => self.save(name.clone(), true),
                (Some("cancel"), _) | (_, KeyCode::Char('n')) => Action::Nav(NavAction::PopPane),
                _ => Action::None,
            },
        }
    }

    fn render(&self, area: RatatuiRect, buf: &mut Buffer, state: &AppState) {
        let rect = center_rect(area, 50, 5);
        let accent = Color::from_hue(state.hue);
        let title = format!(" Save {} ", self.kind.noun());

        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(ratatui::style::Style::from(Style::new().fg(accent)))
            .title_style(ratatui::style::Style::from(Style::new().fg(accent).bold()));
        let inner = block.inner(rect);
        block.render(rect, buf);
        if inner.height == 0 {
            return;
        }

        let line = RatatuiRect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), 1);
        match &self.phase {
            Phase::Name => self.input.render_buf(line.intersection(inner), buf),
            Phase::Confirm(name) => {
                let text = format!("{} {} exists already. Overwrite? [y/n]", self.kind.noun(), name);
                let style = ratatui::style::Style::from(Style::new().fg(Color::GOLD));
                buf.set_stringn(line.x, line.y, &text, line.width as usize, style);
            }
        }
    }

    fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    fn wants_exclusive_input(&self) -> bool {
        true
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
