#![deny(missing_docs)]
//! Cat as a Service Telegram bot.
//!
//! Proxies random cat pictures and GIFs from cataas.com, with optional tags,
//! captions and filters, and suggests tags through inline queries.

/// Telegram bot implementation
pub mod bot;
/// Cat API client
pub mod cataas;
/// Configuration management
pub mod config;
/// Message pagination
pub mod paginate;
/// Tag cache and autocomplete
pub mod tags;
/// Utility functions
pub mod utils;
