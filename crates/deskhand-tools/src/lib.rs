//! Tool definition, registry, and dispatcher for the deskhand automation server.
//!
//! This crate is the generic dispatch core, independent of any concrete
//! desktop capability:
//!
//! - [`ToolDefinition`] -- the trait every tool implements
//! - [`ToolOutput`] / [`ToolOutputMetadata`] -- structured execution results
//! - [`ToolRegistry`] -- thread-safe tool storage, sealed after startup
//! - [`Dispatcher`] -- validation, deadline enforcement, error normalization
//! - [`DispatchError`] / [`ErrorKind`] -- the uniform failure envelope
//! - [`McpServer`] -- JSON-RPC 2.0 stdio adapter

pub mod definition;
pub mod dispatcher;
pub mod envelope;
pub mod mcp_server;
pub mod registry;

pub use definition::{ToolDefinition, ToolInfo, ToolOutput, ToolOutputMetadata};
pub use dispatcher::{Dispatcher, DispatcherConfig, ToolRequest};
pub use envelope::{DispatchError, ErrorKind};
pub use mcp_server::McpServer;
pub use registry::ToolRegistry;
