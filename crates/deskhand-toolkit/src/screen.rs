//! Screenshot capture interface.

use crate::{ToolkitError, ToolkitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Screenshot {
    /// Raw encoded image bytes.
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

pub trait ScreenProvider: Send + Sync {
    fn screenshot(&self) -> ToolkitResult<Screenshot>;
}

/// Stub for platforms without a wired capture backend.
pub struct UnavailableScreen;

impl ScreenProvider for UnavailableScreen {
    fn screenshot(&self) -> ToolkitResult<Screenshot> {
        Err(ToolkitError::Unavailable("screen capture not supported".into()))
    }
}
