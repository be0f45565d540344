use std::collections::VecDeque;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as RatatuiRect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use super::{Color, Style};
use crate::state::AppState;

const CONSOLE_LINES: u16 = 3;
const CONSOLE_CAPACITY: usize = 100;

/// Frame wrapping the panes with border, header bar, and message console
pub struct Frame {
    messages: VecDeque<String>,
    /// Where commands go, shown in the header
    pub backend: String,
}

impl Frame {
    pub fn new(backend: String) -> Self {
        Self {
            messages: VecDeque::with_capacity(CONSOLE_CAPACITY),
            backend,
        }
    }

    /// Push a message to the console ring buffer
    pub fn push_message(&mut self, msg: String) {
        if self.messages.len() >= CONSOLE_CAPACITY {
            self.messages.pop_front();
        }
        self.messages.push_back(msg);
    }

    #[cfg(test)]
    pub fn last_message(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    /// Area left for panes inside the border and above the console
    pub fn content_area(area: RatatuiRect) -> RatatuiRect {
        RatatuiRect::new(
            area.x + 1,
            area.y + 1,
            area.width.saturating_sub(2),
            area.height.saturating_sub(CONSOLE_LINES + 3),
        )
    }

    /// Render the frame using ratatui buffer directly.
    pub fn render_buf(&self, area: RatatuiRect, buf: &mut Buffer, state: &AppState) {
        if area.width < 20 || area.height < CONSOLE_LINES + 6 {
            return;
        }

        let accent = Color::from_hue(state.hue);
        let border_style = ratatui::style::Style::from(Style::new().fg(Color::GRAY));

        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .render(area, buf);

        // Header in the top border: breadcrumbs left, status right
        let crumbs = format!(" {} ", state.breadcrumbs());
        let crumb_style = ratatui::style::Style::from(Style::new().fg(accent).bold());
        buf.set_stringn(area.x + 1, area.y, &crumbs, area.width.saturating_sub(2) as usize, crumb_style);

        let mut status = format!(" -> {} ", self.backend);
        if let Some(level) = state.battery {
            status = format!(" {}%{}", level, status);
        }
        let status_len = status.chars().count() as u16;
        let status_x = area.right().saturating_sub(status_len + 1);
        if status_x > area.x + 1 + crumbs.chars().count() as u16 {
            let status_style = ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY));
            buf.set_string(status_x, area.y, &status, status_style);
        }

        // Console separator line
        let sep_y = area.y + area.height.saturating_sub(CONSOLE_LINES + 2);
        if let Some(cell) = buf.cell_mut((area.x, sep_y)) {
            cell.set_char('├').set_style(border_style);
        }
        for x in (area.x + 1)..(area.x + area.width.saturating_sub(1)) {
            if let Some(cell) = buf.cell_mut((x, sep_y)) {
                cell.set_char('─').set_style(border_style);
            }
        }
        if let Some(cell) = buf.cell_mut((area.x + area.width.saturating_sub(1), sep_y)) {
            cell.set_char('┤').set_style(border_style);
        }

        // Console messages
        let console_y = sep_y + 1;
        let skip = self.messages.len().saturating_sub(CONSOLE_LINES as usize);
        let max_width = area.width.saturating_sub(6) as usize;

        let prompt_style = ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY));
        let msg_style = ratatui::style::Style::from(Style::new().fg(accent));

        for (i, msg) in self.messages.iter().skip(skip).enumerate() {
            let y = console_y + i as u16;
            let truncated: String = msg.chars().take(max_width).collect();
            let line = Line::from(vec![
                Span::styled("> ", prompt_style),
                Span::styled(truncated, msg_style),
            ]);
            Paragraph::new(line).render(
                RatatuiRect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
                buf,
            );
        }
    }
}
