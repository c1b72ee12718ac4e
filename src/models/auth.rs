use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// RFC 3339 timestamp of token expiry.
    pub expires_at: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpData {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Session transitions delivered to auth state listeners. `Initial` is only
/// used for the immediate callback fired at subscription time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEvent {
    Initial,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}
