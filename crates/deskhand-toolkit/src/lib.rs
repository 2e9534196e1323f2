//! Capability interfaces and platform backends for the deskhand server.
//!
//! Every automation primitive the tool layer can invoke is defined here as a
//! trait (`PointerProvider`, `ClipboardProvider`, ...) together with the
//! request/response types that cross it. Concrete implementations are
//! per-operating-system and selected exactly once at process start by
//! [`platform::Platform::detect`]; platforms without a wired implementation
//! get `Unavailable*` stubs that fail every call with
//! [`ToolkitError::Unavailable`].
//!
//! All provider traits use blocking signatures. Callers that need a deadline
//! run them on a blocking thread and stop waiting when the budget elapses;
//! the OS call itself is never forcibly interrupted.

pub mod apps;
pub mod clipboard;
pub mod elements;
pub mod keyboard;
pub mod launch;
pub mod platform;
pub mod pointer;
pub mod scrape;
pub mod screen;
pub mod shell;
pub mod sysinfo;
pub mod window;

use thiserror::Error;

/// Error produced by a capability backend.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// The capability has no implementation on this platform.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The target of the operation does not exist (window, element, process).
    #[error("not found: {0}")]
    NotFound(String),

    /// The OS denied the operation (missing automation/screen permission).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The request itself cannot be carried out as stated.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

pub type ToolkitResult<T> = Result<T, ToolkitError>;

impl From<std::io::Error> for ToolkitError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => ToolkitError::NotFound(e.to_string()),
            std::io::ErrorKind::PermissionDenied => ToolkitError::PermissionDenied(e.to_string()),
            _ => ToolkitError::Backend(e.to_string()),
        }
    }
}
