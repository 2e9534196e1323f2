//! System context interface: default input language and default browser.

use crate::{ToolkitError, ToolkitResult};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BrowserContext {
    /// Human-readable default browser name, e.g. `"Firefox"`.
    pub name: String,
    /// Executable path if the OS exposes one.
    pub path: Option<String>,
}

pub trait SystemInfoProvider: Send + Sync {
    /// BCP 47 tag of the default input language, e.g. `"en-US"`.
    fn default_language(&self) -> ToolkitResult<String>;
    fn browser_context(&self) -> ToolkitResult<BrowserContext>;
}

/// Stub for platforms without a wired system-info backend.
pub struct UnavailableSystemInfo;

impl SystemInfoProvider for UnavailableSystemInfo {
    fn default_language(&self) -> ToolkitResult<String> {
        Err(ToolkitError::Unavailable("language query not supported".into()))
    }

    fn browser_context(&self) -> ToolkitResult<BrowserContext> {
        Err(ToolkitError::Unavailable("browser query not supported".into()))
    }
}
