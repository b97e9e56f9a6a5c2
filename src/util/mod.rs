//! Shared utilities

pub mod config;
pub mod context;
pub mod dates;
pub mod diagnostic;
pub mod shell;

pub use config::Config;
pub use context::{BerthContext, RemoteEntry, RemoteList};
pub use diagnostic::Diagnostic;
