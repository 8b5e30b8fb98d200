//! SmartMark — personal bookmarks kept live across every open view.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod reconciler;
pub mod rpc_handler;
pub mod services;
pub mod store;
pub mod types;
pub mod validation;
