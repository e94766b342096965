//! Held-key tracking for the mounted game.
//!
//! Terminals that implement the kitty keyboard protocol report key releases;
//! older ones only send presses (plus auto-repeat). For those a key counts as
//! released once no press/repeat has been seen for `release_timeout_ms`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

pub const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

/// The movement/action keys a game reads once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl KeyState {
    pub fn any_direction(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

impl Control {
    const ALL: [Control; 5] = [Control::Left, Control::Right, Control::Up, Control::Down, Control::Fire];

    pub fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Control::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::Right),
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Control::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Control::Down),
            KeyCode::Char(' ') => Some(Control::Fire),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Control::Left => 0,
            Control::Right => 1,
            Control::Up => 2,
            Control::Down => 3,
            Control::Fire => 4,
        }
    }
}

/// Owned by one mounted game session; dropped with it.
#[derive(Debug, Clone)]
pub struct InputAdapter {
    keys: KeyState,
    last_seen_ms: [u64; 5],
    release_timeout_ms: u64,
    saw_release: bool,
}

impl Default for InputAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_RELEASE_TIMEOUT_MS)
    }
}

impl InputAdapter {
    pub fn new(release_timeout_ms: u64) -> Self {
        Self {
            keys: KeyState::default(),
            last_seen_ms: [0; 5],
            release_timeout_ms,
            saw_release: false,
        }
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Feed a terminal key event. Returns true if it mapped to a game control.
    pub fn handle_event(&mut self, key: KeyEvent, now_ms: u64) -> bool {
        let Some(control) = Control::from_code(key.code) else {
            return false;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.press(control, now_ms),
            KeyEventKind::Release => {
                self.saw_release = true;
                self.release(control);
            }
        }
        true
    }

    pub fn press(&mut self, control: Control, now_ms: u64) {
        self.last_seen_ms[control.index()] = now_ms;
        self.set(control, true);
    }

    pub fn release(&mut self, control: Control) {
        self.set(control, false);
    }

    pub fn release_all(&mut self) {
        self.keys = KeyState::default();
    }

    /// Release keys not refreshed within the timeout. No-op once the terminal
    /// has proven it reports real release events.
    pub fn expire(&mut self, now_ms: u64) {
        if self.saw_release {
            return;
        }
        for control in Control::ALL {
            let seen = self.last_seen_ms[control.index()];
            if now_ms.saturating_sub(seen) > self.release_timeout_ms {
                self.set(control, false);
            }
        }
    }

    fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Left => self.keys.left = held,
            Control::Right => self.keys.right = held,
            Control::Up => self.keys.up = held,
            Control::Down => self.keys.down = held,
            Control::Fire => self.keys.fire = held,
        }
    }
}
