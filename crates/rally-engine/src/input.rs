//! Keyboard state polled once per tick.

use std::collections::HashSet;

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left paddle up.
    W,
    /// Left paddle down.
    S,
    /// Right paddle up.
    ArrowUp,
    /// Right paddle down.
    ArrowDown,
}

impl Key {
    /// Map a DOM-style key code (`"KeyW"`, `"ArrowUp"`, ...) to a key.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Self::W),
            "KeyS" => Some(Self::S),
            "ArrowUp" => Some(Self::ArrowUp),
            "ArrowDown" => Some(Self::ArrowDown),
            _ => None,
        }
    }
}

/// Currently held keys.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    held: HashSet<Key>,
}

impl Keyboard {
    /// No keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` held.
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Mark `key` released.
    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Whether `key` is held.
    pub fn pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// `+1` if only `up` is held, `-1` if only `down`, else `0`.
    pub fn axis(&self, up: Key, down: Key) -> f32 {
        f32::from(u8::from(self.pressed(up))) - f32::from(u8::from(self.pressed(down)))
    }

    /// Release every key.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut kb = Keyboard::new();
        assert!(!kb.pressed(Key::W));
        kb.press(Key::W);
        assert!(kb.pressed(Key::W));
        kb.release(Key::W);
        assert!(!kb.pressed(Key::W));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut kb = Keyboard::new();
        kb.press(Key::ArrowUp);
        assert_eq!(kb.axis(Key::ArrowUp, Key::ArrowDown), 1.0);
        kb.press(Key::ArrowDown);
        assert_eq!(kb.axis(Key::ArrowUp, Key::ArrowDown), 0.0);
        kb.release(Key::ArrowUp);
        assert_eq!(kb.axis(Key::ArrowUp, Key::ArrowDown), -1.0);
    }

    #[test]
    fn codes_map_to_keys() {
        assert_eq!(Key::from_code("KeyS"), Some(Key::S));
        assert_eq!(Key::from_code("ArrowDown"), Some(Key::ArrowDown));
        assert_eq!(Key::from_code("Space"), None);
    }
}
