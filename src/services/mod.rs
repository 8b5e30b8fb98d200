// SmartMark services
// Services hold application-wide concerns: configuration and identity.

pub mod config_engine;
pub mod identity;
