// SmartMark shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod config;
pub mod errors;
pub mod feed;
pub mod identity;
