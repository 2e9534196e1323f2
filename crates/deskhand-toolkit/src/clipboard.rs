//! System clipboard interface.

use crate::{ToolkitError, ToolkitResult};

pub trait ClipboardProvider: Send + Sync {
    fn read_text(&self) -> ToolkitResult<String>;
    fn write_text(&self, text: &str) -> ToolkitResult<()>;
}

/// Stub for platforms without a wired clipboard backend.
pub struct UnavailableClipboard;

impl ClipboardProvider for UnavailableClipboard {
    fn read_text(&self) -> ToolkitResult<String> {
        Err(ToolkitError::Unavailable("clipboard access not supported".into()))
    }

    fn write_text(&self, _text: &str) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("clipboard access not supported".into()))
    }
}
