//! Desktop automation tools for the deskhand server.
//!
//! This crate binds the generic dispatch core (`deskhand-tools`) to the
//! capability interfaces (`deskhand-toolkit`): one [`ToolDefinition`] per
//! automation action, plus the concurrent state-snapshot aggregator behind
//! the `state` tool. [`register_desktop_tools`] wires the full set into a
//! registry at startup.
//!
//! [`ToolDefinition`]: deskhand_tools::ToolDefinition

pub mod state;
pub mod tools;

pub use state::{SnapshotConfig, SnapshotSource, SourceStatus, StateSnapshot, StateTool};
pub use tools::register_desktop_tools;
