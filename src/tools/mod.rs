//! MCP tool implementations for presentation operations.

pub mod inspect;
pub mod presentation;

// Re-export common types
pub use inspect::*;
pub use presentation::*;
