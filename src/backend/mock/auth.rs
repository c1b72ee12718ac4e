use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::models::auth::{AuthEvent, Credentials, Session, SignUpData, User};
use crate::services::auth_service::{
    AuthCallback, AuthService, AuthStateListeners, AuthSubscription,
};

pub const DEMO_EMAIL: &str = "demo@bhakti.app";
pub const DEMO_PASSWORD: &str = "om-namah-shivaya";
const SESSION_TTL_SECS: i64 = 3600;

/// In-memory auth with fixed demo credentials and simulated latency.
/// Deterministic: the demo account always signs in with the same session
/// shape, everything else is rejected as invalid credentials.
pub struct MockAuthService {
    users: Mutex<HashMap<String, (String, User)>>,
    session: Mutex<Option<Session>>,
    listeners: Arc<AuthStateListeners>,
    latency: Duration,
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthService {
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert(
            DEMO_EMAIL.to_string(),
            (
                DEMO_PASSWORD.to_string(),
                User {
                    id: "user-demo".to_string(),
                    email: DEMO_EMAIL.to_string(),
                    display_name: Some("Demo Bhakt".to_string()),
                },
            ),
        );
        Self {
            users: Mutex::new(users),
            session: Mutex::new(None),
            listeners: Arc::new(AuthStateListeners::default()),
            latency: Duration::from_millis(20),
        }
    }

    fn session_for(user: &User) -> Session {
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(SESSION_TTL_SECS);
        Session {
            access_token: format!("mock-access-{}", user.id),
            refresh_token: format!("mock-refresh-{}", user.id),
            expires_at: expires_at.to_rfc3339(),
            user: user.clone(),
        }
    }

    fn set_session(&self, session: Option<Session>, event: AuthEvent) {
        {
            let mut guard = self
                .session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = session.clone();
        }
        self.listeners.notify(event, session.as_ref());
    }

    fn snapshot(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Mint a fresh token pair for the active session, as a token refresh
    /// would.
    pub async fn refresh_session(&self) -> ServiceResult<Session> {
        tokio::time::sleep(self.latency).await;
        let current = self
            .snapshot()
            .ok_or_else(|| ServiceError::Unknown("no active session".to_string()))?;
        let refreshed = Self::session_for(&current.user);
        self.set_session(Some(refreshed.clone()), AuthEvent::TokenRefreshed);
        Ok(refreshed)
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn current_user(&self) -> ServiceResult<Option<User>> {
        Ok(self.snapshot().map(|s| s.user))
    }

    async fn current_session(&self) -> ServiceResult<Option<Session>> {
        Ok(self.snapshot())
    }

    async fn sign_in(&self, credentials: Credentials) -> ServiceResult<Session> {
        tokio::time::sleep(self.latency).await;

        let user = {
            let users = self
                .users
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match users.get(&credentials.email.to_lowercase()) {
                Some((password, user)) if *password == credentials.password => user.clone(),
                _ => return Err(ServiceError::InvalidCredentials),
            }
        };

        let session = Self::session_for(&user);
        self.set_session(Some(session.clone()), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_up(&self, data: SignUpData) -> ServiceResult<Session> {
        tokio::time::sleep(self.latency).await;

        let email = data.email.to_lowercase();
        let user = {
            let mut users = self
                .users
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if users.contains_key(&email) {
                return Err(ServiceError::Unknown(format!(
                    "email already registered: {email}"
                )));
            }
            let user = User {
                id: format!("user-{}", uuid::Uuid::new_v4()),
                email: email.clone(),
                display_name: data.display_name,
            };
            users.insert(email, (data.password, user.clone()));
            user
        };

        let session = Self::session_for(&user);
        self.set_session(Some(session.clone()), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_out(&self) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        self.set_session(None, AuthEvent::SignedOut);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> ServiceResult<()> {
        tokio::time::sleep(self.latency).await;
        let users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if users.contains_key(&email.to_lowercase()) {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("account {email}")))
        }
    }

    async fn update_password(&self, new_password: &str) -> ServiceResult<User> {
        tokio::time::sleep(self.latency).await;
        let session = self
            .snapshot()
            .ok_or_else(|| ServiceError::Unknown("no active session".to_string()))?;

        let mut users = self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match users.get_mut(&session.user.email) {
            Some((password, user)) => {
                *password = new_password.to_string();
                Ok(user.clone())
            }
            None => Err(ServiceError::NotFound(format!(
                "account {}",
                session.user.email
            ))),
        }
    }

    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription {
        AuthStateListeners::subscribe(&self.listeners, callback, self.snapshot())
    }
}
