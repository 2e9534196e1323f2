//! Keyboard injection interface (text entry, single keys, chords).

use crate::{ToolkitError, ToolkitResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TypeText {
    pub text: String,
    /// Select-all + delete before typing.
    pub clear: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KeyPress {
    /// Key name, e.g. `"enter"`, `"escape"`, `"f5"`.
    pub key: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KeyChord {
    /// Keys pressed together, e.g. `["ctrl", "shift", "t"]`.
    pub keys: Vec<String>,
}

pub trait KeyboardProvider: Send + Sync {
    fn type_text(&self, req: &TypeText) -> ToolkitResult<()>;
    fn press_key(&self, req: &KeyPress) -> ToolkitResult<()>;
    fn shortcut(&self, req: &KeyChord) -> ToolkitResult<()>;
}

/// Stub for platforms without a wired keyboard backend.
pub struct UnavailableKeyboard;

impl KeyboardProvider for UnavailableKeyboard {
    fn type_text(&self, _req: &TypeText) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("keyboard injection not supported".into()))
    }

    fn press_key(&self, _req: &KeyPress) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("keyboard injection not supported".into()))
    }

    fn shortcut(&self, _req: &KeyChord) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("keyboard injection not supported".into()))
    }
}
