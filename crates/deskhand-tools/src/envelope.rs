//! The uniform failure envelope.
//!
//! Every public operation in the core returns `Result<ToolOutput,
//! DispatchError>` -- a tagged union, never a raised fault. Internal code is
//! free to propagate `anyhow::Error`; the dispatcher and the state
//! aggregator are the two places where those faults are converted into a
//! [`DispatchError`] with a machine-checkable [`ErrorKind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-checkable classification carried by every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The requested tool name is not registered.
    UnknownTool,
    /// The request arguments failed validation; no backend was touched.
    InvalidArgument,
    /// The invocation exceeded its deadline and was abandoned.
    Timeout,
    /// An underlying OS/automation fault (element not found, permission
    /// denied, process not found, ...).
    PlatformFailure,
    /// Every capture source of a state snapshot failed.
    AllSourcesFailed,
}

/// Structured failure returned by [`crate::Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("tool {tool} timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    #[error("tool {tool} failed: {source}")]
    PlatformFailure {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("all {attempted} snapshot sources failed")]
    AllSourcesFailed { attempted: usize },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownTool { .. } => ErrorKind::UnknownTool,
            DispatchError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            DispatchError::Timeout { .. } => ErrorKind::Timeout,
            DispatchError::PlatformFailure { .. } => ErrorKind::PlatformFailure,
            DispatchError::AllSourcesFailed { .. } => ErrorKind::AllSourcesFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_one_to_one() {
        assert_eq!(
            DispatchError::UnknownTool { name: "x".into() }.kind(),
            ErrorKind::UnknownTool
        );
        assert_eq!(
            DispatchError::InvalidArgument { reason: "x".into() }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            DispatchError::Timeout {
                tool: "x".into(),
                timeout_ms: 5
            }
            .kind(),
            ErrorKind::Timeout
        );
        assert_eq!(
            DispatchError::PlatformFailure {
                tool: "x".into(),
                source: anyhow::anyhow!("boom")
            }
            .kind(),
            ErrorKind::PlatformFailure
        );
        assert_eq!(
            DispatchError::AllSourcesFailed { attempted: 5 }.kind(),
            ErrorKind::AllSourcesFailed
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorKind::UnknownTool).unwrap(),
            serde_json::json!("unknown_tool")
        );
        assert_eq!(
            serde_json::to_value(ErrorKind::AllSourcesFailed).unwrap(),
            serde_json::json!("all_sources_failed")
        );
    }

    #[test]
    fn platform_failure_preserves_the_cause_chain() {
        let cause = anyhow::anyhow!("access denied").context("walking element tree");
        let err = DispatchError::PlatformFailure {
            tool: "state".into(),
            source: cause,
        };
        let msg = format!("{err}");
        assert!(msg.contains("walking element tree"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn messages_are_human_readable() {
        let err = DispatchError::Timeout {
            tool: "screenshot".into(),
            timeout_ms: 2000,
        };
        assert_eq!(format!("{err}"), "tool screenshot timed out after 2000ms");
    }
}
