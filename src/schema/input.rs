use serde::{Deserialize, Serialize};

/// Pointer buttons the host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A discrete input event forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    /// A key press, named the way the host names keys (`"Space"`, `"Return"`).
    Key(String),
    Pointer(PointerButton),
}

impl InputEvent {
    pub fn key(name: &str) -> Self {
        Self::Key(name.to_string())
    }

    /// Primary click.
    pub fn click() -> Self {
        Self::Pointer(PointerButton::Primary)
    }
}

/// Which inputs count as "advance".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvanceBinding {
    pub key: Option<String>,
    pub pointer: Option<PointerButton>,
}

impl Default for AdvanceBinding {
    fn default() -> Self {
        Self {
            key: Some("Space".to_string()),
            pointer: Some(PointerButton::Primary),
        }
    }
}

impl AdvanceBinding {
    pub fn matches(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(name) => self.key.as_deref() == Some(name.as_str()),
            InputEvent::Pointer(button) => self.pointer == Some(*button),
        }
    }
}
