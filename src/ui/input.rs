use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use super::{InputEvent, InputSource, PointerPos};

/// Reads mouse and keyboard events from the terminal. Mouse capture must be
/// enabled by the caller.
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(translate(event::read()?))
    }
}

/// Map a terminal event to a game input; irrelevant events give `None`.
fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => translate_key(key),
        Event::Mouse(mouse) => translate_mouse(mouse),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputEvent::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Left | KeyCode::Char('h') => Some(InputEvent::SelectLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(InputEvent::SelectRight),
        KeyCode::Enter | KeyCode::Char(' ') => Some(InputEvent::DropSelected),
        KeyCode::Char('p') => Some(InputEvent::TogglePause),
        KeyCode::Char('r') => Some(InputEvent::NewGame),
        _ => None,
    }
}

fn translate_mouse(mouse: MouseEvent) -> Option<InputEvent> {
    let pos = PointerPos {
        x: f32::from(mouse.column),
        y: f32::from(mouse.row),
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Click(pos)),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(InputEvent::PointerMoved(pos)),
        _ => None,
    }
}
