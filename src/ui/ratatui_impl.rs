use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode as CrosstermKeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, layout::Rect as RatatuiRect, Terminal};

use super::{AppEvent, InputEvent, InputSource, KeyCode, Modifiers, MouseButton, MouseEvent, MouseKind};

/// Ratatui-based terminal backend
pub struct RatatuiBackend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl RatatuiBackend {
    /// Create a new ratatui backend (does not start terminal mode)
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    /// Enter raw mode, alternate screen and mouse capture
    pub fn start(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Leave raw mode, alternate screen and mouse capture
    pub fn stop(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Draw one frame by handing the whole buffer to `render`
    pub fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(RatatuiRect, &mut Buffer),
    {
        self.terminal.draw(|f| {
            let area = f.area();
            render(area, f.buffer_mut());
        })?;
        Ok(())
    }
}

impl InputSource for RatatuiBackend {
    fn poll_event(&mut self, timeout: Duration) -> Option<AppEvent> {
        if !event::poll(timeout).ok()? {
            return None;
        }
        match event::read().ok()? {
            // Release and repeat events are reported on some platforms
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                convert_key_event(key_event).map(AppEvent::Key)
            }
            Event::Mouse(mouse_event) => convert_mouse_event(mouse_event).map(AppEvent::Mouse),
            _ => None,
        }
    }
}

fn convert_key_event(event: KeyEvent) -> Option<InputEvent> {
    let key = match event.code {
        CrosstermKeyCode::Char(c) => KeyCode::Char(c),
        CrosstermKeyCode::Enter => KeyCode::Enter,
        CrosstermKeyCode::Esc => KeyCode::Escape,
        CrosstermKeyCode::Backspace => KeyCode::Backspace,
        CrosstermKeyCode::Tab => KeyCode::Tab,
        CrosstermKeyCode::Up => KeyCode::Up,
        CrosstermKeyCode::Down => KeyCode::Down,
        CrosstermKeyCode::Left => KeyCode::Left,
        CrosstermKeyCode::Right => KeyCode::Right,
        CrosstermKeyCode::Home => KeyCode::Home,
        CrosstermKeyCode::End => KeyCode::End,
        CrosstermKeyCode::PageUp => KeyCode::PageUp,
        CrosstermKeyCode::PageDown => KeyCode::PageDown,
        CrosstermKeyCode::Insert => KeyCode::Insert,
        CrosstermKeyCode::Delete => KeyCode::Delete,
        CrosstermKeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };

    let modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    };

    Some(InputEvent::new(key, modifiers))
}

fn convert_button(button: CrosstermMouseButton) -> MouseButton {
    match button {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    }
}

fn convert_mouse_event(event: CrosstermMouseEvent) -> Option<MouseEvent> {
    let kind = match event.kind {
        MouseEventKind::Down(b) => MouseKind::Down(convert_button(b)),
        MouseEventKind::Drag(b) => MouseKind::Drag(convert_button(b)),
        MouseEventKind::Up(b) => MouseKind::Up(convert_button(b)),
        _ => return None,
    };
    Some(MouseEvent::new(kind, event.column, event.row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn test_convert_key_event() {
        let ev = KeyEvent {
            code: CrosstermKeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        let converted = convert_key_event(ev).unwrap();
        assert_eq!(converted.key, KeyCode::Char('c'));
        assert!(converted.modifiers.ctrl);
    }

    #[test]
    fn test_convert_mouse_event() {
        let ev = CrosstermMouseEvent {
            kind: MouseEventKind::Drag(CrosstermMouseButton::Left),
            column: 4,
            row: 9,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            convert_mouse_event(ev),
            Some(MouseEvent::new(MouseKind::Drag(MouseButton::Left), 4, 9))
        );

        let scroll = CrosstermMouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(convert_mouse_event(scroll), None);
    }
}
