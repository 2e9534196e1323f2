//! Application launch interface.

use crate::{ToolkitError, ToolkitResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LaunchRequest {
    /// Application name as the user would say it (`"notepad"`, `"firefox"`).
    pub name: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LaunchedApp {
    /// Process id of the started application, if the OS reports one.
    pub pid: Option<u32>,
}

pub trait LaunchProvider: Send + Sync {
    fn launch(&self, req: &LaunchRequest) -> ToolkitResult<LaunchedApp>;
}

/// Stub for platforms without a wired launch backend.
pub struct UnavailableLaunch;

impl LaunchProvider for UnavailableLaunch {
    fn launch(&self, _req: &LaunchRequest) -> ToolkitResult<LaunchedApp> {
        Err(ToolkitError::Unavailable("app launch not supported".into()))
    }
}
