//! Window placement interface.

use crate::{ToolkitError, ToolkitResult};

/// Target geometry for a window. `name: None` addresses the foreground
/// window; any geometry field left `None` keeps its current value.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WindowBounds {
    pub name: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl WindowBounds {
    /// True when no geometry change is requested at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }
}

pub trait WindowProvider: Send + Sync {
    fn resize(&self, req: &WindowBounds) -> ToolkitResult<()>;
}

/// Stub for platforms without a wired window backend.
pub struct UnavailableWindow;

impl WindowProvider for UnavailableWindow {
    fn resize(&self, _req: &WindowBounds) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("window control not supported".into()))
    }
}
