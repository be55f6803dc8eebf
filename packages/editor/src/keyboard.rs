//! Keyboard shortcut mapping

/// Key event as seen by the editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    /// `KeyboardEvent.key`
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd+S
    Save,
    /// Ctrl/Cmd+Z
    Undo,
    /// Ctrl/Cmd+Y or Ctrl/Cmd+Shift+Z
    Redo,
    Escape,
}

impl Shortcut {
    pub fn from_key(input: &KeyInput) -> Option<Self> {
        let command = input.ctrl || input.meta;
        let key = input.key.as_str();
        if command {
            match key {
                "s" | "S" => return Some(Shortcut::Save),
                "z" | "Z" if input.shift => return Some(Shortcut::Redo),
                "z" | "Z" => return Some(Shortcut::Undo),
                "y" | "Y" => return Some(Shortcut::Redo),
                _ => {}
            }
        }
        (key == "Escape").then_some(Shortcut::Escape)
    }

    /// Whether the host must suppress the browser's default action
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Shortcut::Escape)
    }
}
