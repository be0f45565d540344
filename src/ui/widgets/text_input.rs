use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::ui::{Color, InputEvent, KeyCode, Style};

/// A single-line text input widget
pub struct TextInput {
    /// The current text content
    value: String,
    /// Cursor position (character index)
    cursor: usize,
    /// Label shown before the input
    label: String,
}

impl TextInput {
    pub fn new(label: &str) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            label: label.to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Handle input, returns true if the event was consumed
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event.key {
            KeyCode::Char(ch) if !event.modifiers.ctrl && !event.modifiers.alt => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, ch);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                true
            }
            _ => false,
        }
    }

    /// Render the label and the bracketed input field on one line
    pub fn render_buf(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height == 0 {
            return;
        }
        let label_style = ratatui::style::Style::from(Style::new().fg(Color::WHITE));
        buf.set_stringn(area.x, area.y, &self.label, area.width as usize, label_style);

        let input_x = area.x + self.label.chars().count() as u16 + 1;
        let input_width = area.right().saturating_sub(input_x);
        if input_width < 3 {
            return;
        }

        let border_style = ratatui::style::Style::from(Style::new().fg(Color::SKY_BLUE));
        buf.set_string(input_x, area.y, "[", border_style);
        buf.set_string(input_x + input_width - 1, area.y, "]", border_style);

        let content_x = input_x + 1;
        let content_width = input_width.saturating_sub(2) as usize;
        let text_style = ratatui::style::Style::from(Style::new().fg(Color::WHITE));
        let display: String = self.value.chars().take(content_width).collect();
        buf.set_string(content_x, area.y, &display, text_style);

        let cursor_x = content_x + self.cursor.min(content_width.saturating_sub(1)) as u16;
        let cursor_char = self.value.chars().nth(self.cursor).unwrap_or(' ');
        if let Some(cell) = buf.cell_mut((cursor_x, area.y)) {
            cell.set_char(cursor_char).set_style(ratatui::style::Style::from(
                Style::new().fg(Color::WHITE).bg(Color::SELECTION_BG),
            ));
        }
    }
}
