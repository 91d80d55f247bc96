#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowRight,
    ArrowLeft,
    Other,
}

impl Key {
    /// Maps a DOM-style `KeyboardEvent.code`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Key::Space,
            "ArrowRight" => Key::ArrowRight,
            "ArrowLeft" => Key::ArrowLeft,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Absolute(usize),
}

impl Navigation {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Space | Key::ArrowRight => Some(Navigation::Next),
            Key::ArrowLeft => Some(Navigation::Previous),
            Key::Other => None,
        }
    }
}
