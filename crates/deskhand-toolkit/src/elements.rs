//! UI element tree interface.
//!
//! Backends walk the platform accessibility tree (UIA on Windows, AT-SPI on
//! Linux) and return typed element handles grouped by how an agent can use
//! them: interactive (clickable/focusable), textual (readable), scrollable.

use crate::{ToolkitError, ToolkitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UiElement {
    /// Accessibility role, e.g. `"button"`, `"edit"`, `"hyperlink"`.
    pub role: String,
    /// Accessible name (label text, button caption).
    pub name: String,
    /// Owning application title.
    pub app: String,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ElementTree {
    pub interactive: Vec<UiElement>,
    pub textual: Vec<UiElement>,
    pub scrollable: Vec<UiElement>,
}

pub trait ElementProvider: Send + Sync {
    /// Walk the visible UI and return the current element tree. The walk is
    /// racy against the UI by nature; callers treat the result as a
    /// best-effort point-in-time view.
    fn snapshot(&self) -> ToolkitResult<ElementTree>;
}

/// Stub for platforms without a wired accessibility backend.
pub struct UnavailableElements;

impl ElementProvider for UnavailableElements {
    fn snapshot(&self) -> ToolkitResult<ElementTree> {
        Err(ToolkitError::Unavailable("element queries not supported".into()))
    }
}
