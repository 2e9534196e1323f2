//! Running-application enumeration interface.

use crate::{ToolkitError, ToolkitResult};

/// One visible application, reported fresh at every call. Automation
/// decisions must never run on cached app lists, so there is no caching
/// layer anywhere behind this trait.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppEntry {
    pub pid: u32,
    pub title: String,
    pub foreground: bool,
}

pub trait AppsProvider: Send + Sync {
    /// Enumerate applications with a visible window, foreground first, then
    /// by most recent activation -- the order the OS reports, unmodified.
    fn list_apps(&self) -> ToolkitResult<Vec<AppEntry>>;
}

/// Stub for platforms without a wired app-enumeration backend.
pub struct UnavailableApps;

impl AppsProvider for UnavailableApps {
    fn list_apps(&self) -> ToolkitResult<Vec<AppEntry>> {
        Err(ToolkitError::Unavailable("app enumeration not supported".into()))
    }
}
