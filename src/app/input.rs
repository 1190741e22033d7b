use std::collections::HashSet;
use winit::event::ElementState;
use winit::keyboard::Key;

/// Keys currently held down, by identifier.
///
/// A key stays down until its own key-up arrives; nothing clears the set
/// behind the input handlers' back.
#[derive(Default, Debug, Clone)]
pub struct KeyState {
    pressed: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        if !self.pressed.contains(key) {
            self.pressed.insert(key.to_string());
        }
    }

    pub fn release(&mut self, key: &str) {
        self.pressed.remove(key);
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    /// Returns the identifier the event was recorded under.
    pub fn handle_key(&mut self, key: &Key, state: ElementState) -> Option<String> {
        let id = key_identifier(key)?;
        match state {
            ElementState::Pressed => self.press(&id),
            ElementState::Released => self.release(&id),
        }
        Some(id)
    }
}

/// Characters are lowercased so Shift does not split a binding in two;
/// named keys use their winit name ("Escape", "Space", ...).
pub fn key_identifier(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_lowercase()),
        Key::Named(named) => Some(format!("{named:?}")),
        Key::Unidentified(_) | Key::Dead(_) => None,
    }
}
