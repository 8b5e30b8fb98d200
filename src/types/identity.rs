use serde::{Deserialize, Serialize};

/// A signed-in user, as known after the external provider verified them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
    pub provider: String,
    pub subject: String,
    pub display_name: String,
    pub created_at: i64,
}

/// Where a request should land given its session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard(String),
}
