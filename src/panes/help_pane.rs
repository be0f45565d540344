use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as RatatuiRect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::state::AppState;
use crate::ui::layout_helpers::center_rect;
use crate::ui::{Action, Color, InputEvent, Keymap, NavAction, Pane, Style};

/// Keys that are handled outside the keymap and still belong in the help list
const EXTRA_KEYS: &[(&str, &str)] = &[
    ("1-9", "Toggle cell"),
    ("Mouse", "Press buttons, drag slider, toggle cells"),
];

pub struct HelpPane {
    keymap: Keymap,
    /// The keymap to display (from another pane)
    display_keymap: Vec<(String, String)>, // (key, description)
    /// Title showing which pane's help this is
    title: String,
    /// Scroll offset for long keymaps
    scroll: usize,
}

impl HelpPane {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            display_keymap: Vec::new(),
            title: String::new(),
            scroll: 0,
        }
    }

    /// Set the keymap to display
    pub fn set_context(&mut self, pane_title: &str, keymap: &Keymap) {
        self.title = pane_title.to_string();
        self.scroll = 0;

        self.display_keymap = keymap
            .bindings()
            .iter()
            .map(|b| (b.pattern.display(), b.description.to_string()))
            .collect();
        if pane_title == "menu" {
            self.display_keymap
                .extend(EXTRA_KEYS.iter().map(|(k, d)| (k.to_string(), d.to_string())));
        }
    }
}

impl Pane for HelpPane {
    fn id(&self) -> &'static str {
        "help"
    }

    fn handle_input(&mut self, event: InputEvent, _state: &AppState) -> Action {
        match self.keymap.lookup(&event) {
            Some("close") => Action::Nav(NavAction::PopPane),
            Some("up") => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            Some("down") => {
                if self.scroll + 1 < self.display_keymap.len() {
                    self.scroll += 1;
                }
                Action::None
            }
            Some("top") => {
                self.scroll = 0;
                Action::None
            }
            Some("bottom") => {
                self.scroll = self.display_keymap.len().saturating_sub(1);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn render(&self, area: RatatuiRect, buf: &mut Buffer, state: &AppState) {
        let rect = center_rect(area, 60, 20);
        let accent = Color::from_hue(state.hue);
        let title = format!(" Help: {} ", self.title);

        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(ratatui::style::Style::from(Style::new().fg(accent)))
            .title_style(ratatui::style::Style::from(Style::new().fg(accent)));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let visible_lines = inner.height.saturating_sub(4) as usize;
        let max_scroll = self.display_keymap.len().saturating_sub(visible_lines);
        let scroll = self.scroll.min(max_scroll);

        let key_style = ratatui::style::Style::from(Style::new().fg(Color::CYAN).bold());
        let desc_style = ratatui::style::Style::from(Style::new().fg(Color::WHITE));

        for (i, (key, desc)) in self.display_keymap.iter().skip(scroll).take(visible_lines).enumerate() {
            let y = inner.y + 1 + i as u16;
            let max_desc_len = inner.width.saturating_sub(14) as usize;
            let desc_truncated: String = desc.chars().take(max_desc_len).collect();

            let line = Line::from(vec![
                Span::styled(format!("{:<12}", key), key_style),
                Span::styled(desc_truncated, desc_style),
            ]);
            let line_area = RatatuiRect::new(inner.x + 1, y, inner.width.saturating_sub(1), 1);
            Paragraph::new(line).render(line_area, buf);
        }

        let dim = ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY));

        // Scroll indicator
        if self.display_keymap.len() > visible_lines && rect.height >= 3 {
            let indicator = format!(
                "{}-{}/{}",
                scroll + 1,
                (scroll + visible_lines).min(self.display_keymap.len()),
                self.display_keymap.len()
            );
            let ind_area = RatatuiRect::new(inner.x + 1, rect.bottom() - 3, inner.width.saturating_sub(1), 1);
            Paragraph::new(Line::from(Span::styled(indicator, dim))).render(ind_area, buf);
        }

        if rect.height >= 2 {
            let help_area = RatatuiRect::new(inner.x + 1, rect.bottom() - 2, inner.width.saturating_sub(1), 1);
            Paragraph::new(Line::from(Span::styled("[ESC/F1] Close  [Up/Down] Scroll", dim)))
                .render(help_area, buf);
        }
    }

    fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Catalog, KvStore, PresetStore};
    use crate::ui::KeyCode;

    #[test]
    fn test_context_and_close() {
        let state = AppState::new(
            Catalog::embedded(),
            PresetStore::load(KvStore::open_in_memory().unwrap()).unwrap(),
        )
        .unwrap();
        let menu_keys = Keymap::new().bind('a', "toggle_all", "Select all / none");
        let mut help = HelpPane::new(Keymap::new().bind_key(KeyCode::Escape, "close", "Close help"));
        help.set_context("menu", &menu_keys);
        assert_eq!(help.display_keymap[0], ("a".to_string(), "Select all / none".to_string()));
        assert_eq!(help.display_keymap.len(), 1 + EXTRA_KEYS.len());

        assert_eq!(
            help.handle_input(InputEvent::key(KeyCode::Escape), &state),
            Action::Nav(NavAction::PopPane)
        );

        let area = RatatuiRect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        help.render(area, &mut buf, &state);
    }
}
