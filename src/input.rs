use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Move(Dir),
    Start,
    Quit,
}

pub fn action_for(key: &KeyEvent) -> Option<Action> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        KeyEventKind::Release => return None,
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(Dir::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(Dir::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(Dir::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(Dir::Right)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Start),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}
