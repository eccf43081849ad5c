/// Commands and their typed arguments
pub mod commands;
/// Command handlers and reply rendering
pub mod handlers;
/// Inline-query tag autocomplete
pub mod inline;
/// Reply delivery with retry
pub mod resilient;
/// Dispatcher wiring
pub mod runner;

pub use commands::Command;
