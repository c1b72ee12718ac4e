use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::backend::live::client::BackendClient;
use crate::error::{ServiceError, ServiceResult};
use crate::models::auth::{AuthEvent, Credentials, Session, SignUpData, User};
use crate::services::auth_service::{
    AuthCallback, AuthService, AuthStateListeners, AuthSubscription,
};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: BackendUser,
}

#[derive(Debug, Deserialize)]
struct BackendUser {
    id: String,
    email: String,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    display_name: Option<String>,
}

impl From<BackendUser> for User {
    fn from(user: BackendUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.user_metadata.display_name,
        }
    }
}

fn session_from_token(token: TokenResponse) -> Session {
    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(token.expires_in);
    Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: expires_at.to_rfc3339(),
        user: token.user.into(),
    }
}

/// Auth against the hosted backend's `/auth/v1` endpoints. Holds the current
/// session and keeps the shared client's bearer token in sync with it.
pub struct LiveAuthService {
    client: Arc<BackendClient>,
    session: Mutex<Option<Session>>,
    listeners: Arc<AuthStateListeners>,
}

impl LiveAuthService {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self {
            client,
            session: Mutex::new(None),
            listeners: Arc::new(AuthStateListeners::default()),
        }
    }

    fn snapshot(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_session(&self, session: Option<Session>, event: AuthEvent) {
        self.client
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));
        {
            let mut guard = self
                .session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = session.clone();
        }
        self.listeners.notify(event, session.as_ref());
    }

    /// Exchange the refresh token for a new session.
    pub async fn refresh_session(&self) -> ServiceResult<Session> {
        let current = self
            .snapshot()
            .ok_or_else(|| ServiceError::Unknown("no active session".to_string()))?;

        let token: TokenResponse = self
            .client
            .post_auth(
                "auth/v1/token?grant_type=refresh_token",
                &json!({ "refresh_token": current.refresh_token }),
            )
            .await?;

        let session = session_from_token(token);
        self.set_session(Some(session.clone()), AuthEvent::TokenRefreshed);
        Ok(session)
    }
}

#[async_trait]
impl AuthService for LiveAuthService {
    async fn current_user(&self) -> ServiceResult<Option<User>> {
        Ok(self.snapshot().map(|s| s.user))
    }

    async fn current_session(&self) -> ServiceResult<Option<Session>> {
        Ok(self.snapshot())
    }

    async fn sign_in(&self, credentials: Credentials) -> ServiceResult<Session> {
        let token: TokenResponse = self
            .client
            .post_auth(
                "auth/v1/token?grant_type=password",
                &json!({
                    "email": credentials.email,
                    "password": credentials.password,
                }),
            )
            .await?;

        let session = session_from_token(token);
        self.set_session(Some(session.clone()), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_up(&self, data: SignUpData) -> ServiceResult<Session> {
        let token: TokenResponse = self
            .client
            .post_auth(
                "auth/v1/signup",
                &json!({
                    "email": data.email,
                    "password": data.password,
                    "data": { "display_name": data.display_name },
                }),
            )
            .await?;

        let session = session_from_token(token);
        self.set_session(Some(session.clone()), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_out(&self) -> ServiceResult<()> {
        // Best-effort revoke; local state is cleared either way so the app
        // never stays signed in after the user asked to leave.
        if let Err(e) = self.client.post_no_content("auth/v1/logout", &json!({})).await {
            tracing::warn!(error = %e, "backend logout failed, clearing local session");
        }
        self.set_session(None, AuthEvent::SignedOut);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> ServiceResult<()> {
        self.client
            .post_no_content("auth/v1/recover", &json!({ "email": email }))
            .await
    }

    async fn update_password(&self, new_password: &str) -> ServiceResult<User> {
        if self.snapshot().is_none() {
            return Err(ServiceError::Unknown("no active session".to_string()));
        }

        let updated: BackendUser = self
            .client
            .put_json("auth/v1/user", &json!({ "password": new_password }))
            .await?;
        let user: User = updated.into();

        let mut guard = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(session) = guard.as_mut() {
            session.user = user.clone();
        }
        Ok(user)
    }

    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription {
        AuthStateListeners::subscribe(&self.listeners, callback, self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_maps_to_session() {
        let raw = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": {
                "id": "u1",
                "email": "mira@example.com",
                "user_metadata": { "display_name": "Mira" }
            }
        }"#;
        let token: TokenResponse = serde_json::from_str(raw).unwrap();
        let session = session_from_token(token);

        assert_eq!(session.access_token, "at");
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.display_name.as_deref(), Some("Mira"));
    }

    #[test]
    fn test_user_metadata_is_optional() {
        let raw = r#"{ "id": "u2", "email": "a@b.c" }"#;
        let user: User = serde_json::from_str::<BackendUser>(raw).unwrap().into();
        assert!(user.display_name.is_none());
    }

    #[tokio::test]
    async fn test_subscription_fires_immediately_without_session() {
        let client = Arc::new(BackendClient::new("https://api.bhakti.app", "anon"));
        let auth = LiveAuthService::new(client);

        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_clone = Arc::clone(&fired);
        let _sub = auth.on_auth_state_change(Box::new(move |event, session| {
            fired_clone.lock().unwrap().push((event, session.is_none()));
        }));

        assert_eq!(*fired.lock().unwrap(), vec![(AuthEvent::Initial, true)]);
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let client = Arc::new(BackendClient::new("https://api.bhakti.app", "anon"));
        let auth = LiveAuthService::new(client);
        let err = auth.update_password("new").await.unwrap_err();
        assert_eq!(err.code(), "unknown");
    }
}
