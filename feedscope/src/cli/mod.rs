//! CLI command definitions and handlers
//!
//! This module organizes the CLI into logical submodules:
//! - [`commands`] - Command and subcommand enum definitions
//! - [`session`] - Per-invocation context handed to every handler
//! - [`handlers`] - Command execution handlers

mod commands;
mod handlers;
mod session;

pub use commands::*;
pub use handlers::*;
pub use session::Session;
