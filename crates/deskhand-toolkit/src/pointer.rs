//! Pointer injection interface (move/click/drag/scroll).

use crate::{ToolkitError, ToolkitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Parse the wire representation (`"left"`, `"right"`, `"middle"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "middle" => Some(Self::Middle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PointerMove {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PointerClick {
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
    /// Number of clicks (2 for double-click).
    pub clicks: u32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PointerDrag {
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PointerScroll {
    /// Cursor position before scrolling; `None` scrolls at the current position.
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub direction: ScrollDirection,
    pub wheel_times: u32,
}

pub trait PointerProvider: Send + Sync {
    fn move_to(&self, req: &PointerMove) -> ToolkitResult<()>;
    fn click(&self, req: &PointerClick) -> ToolkitResult<()>;
    fn drag(&self, req: &PointerDrag) -> ToolkitResult<()>;
    fn scroll(&self, req: &PointerScroll) -> ToolkitResult<()>;
}

/// Stub for platforms without a wired pointer backend.
pub struct UnavailablePointer;

impl PointerProvider for UnavailablePointer {
    fn move_to(&self, _req: &PointerMove) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("pointer injection not supported".into()))
    }

    fn click(&self, _req: &PointerClick) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("pointer injection not supported".into()))
    }

    fn drag(&self, _req: &PointerDrag) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("pointer injection not supported".into()))
    }

    fn scroll(&self, _req: &PointerScroll) -> ToolkitResult<()> {
        Err(ToolkitError::Unavailable("pointer injection not supported".into()))
    }
}
