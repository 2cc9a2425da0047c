//! Core of the safe-rm MCP server: Content-Length framing, JSON-RPC
//! records, the tool registry, and the adapter around the external
//! safe-rm binary.

pub mod config;
pub mod framing;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod trash;
