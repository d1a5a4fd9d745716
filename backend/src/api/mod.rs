//! HTTP API module.
//!
//! This module provides the HTTP server, its response types and the log
//! broadcaster shared with the CLI.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{start_server, ServerConfig};
pub use types::*;
pub use logs::*;
