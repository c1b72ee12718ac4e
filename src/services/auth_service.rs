use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::auth::{AuthEvent, Credentials, Session, SignUpData, User};

pub type AuthCallback = Box<dyn Fn(AuthEvent, Option<Session>) + Send + Sync>;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn current_user(&self) -> ServiceResult<Option<User>>;
    async fn current_session(&self) -> ServiceResult<Option<Session>>;
    async fn sign_in(&self, credentials: Credentials) -> ServiceResult<Session>;
    async fn sign_up(&self, data: SignUpData) -> ServiceResult<Session>;
    async fn sign_out(&self) -> ServiceResult<()>;
    async fn reset_password(&self, email: &str) -> ServiceResult<()>;
    async fn update_password(&self, new_password: &str) -> ServiceResult<User>;

    /// The callback fires once immediately with the current state, then on
    /// every session transition until the subscription is dropped.
    fn on_auth_state_change(&self, callback: AuthCallback) -> AuthSubscription;
}

/// Listener registry shared by the auth implementations.
#[derive(Default)]
pub struct AuthStateListeners {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, Arc<AuthCallback>>>,
}

impl AuthStateListeners {
    pub fn subscribe(
        listeners: &Arc<Self>,
        callback: AuthCallback,
        current_session: Option<Session>,
    ) -> AuthSubscription {
        callback(AuthEvent::Initial, current_session);

        let id = listeners.next_id.fetch_add(1, Ordering::SeqCst);
        listeners
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, Arc::new(callback));

        AuthSubscription {
            id,
            listeners: Arc::downgrade(listeners),
        }
    }

    pub fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        let snapshot: Vec<Arc<AuthCallback>> = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect();

        for callback in snapshot {
            callback(event, session.cloned());
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dropping (or explicitly unsubscribing) detaches the callback.
pub struct AuthSubscription {
    id: u64,
    listeners: Weak<AuthStateListeners>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .listeners
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn session(user_id: &str) -> Session {
        Session {
            access_token: format!("token-{user_id}"),
            refresh_token: format!("refresh-{user_id}"),
            expires_at: "2026-01-01T00:00:00Z".to_string(),
            user: User {
                id: user_id.to_string(),
                email: format!("{user_id}@example.com"),
                display_name: None,
            },
        }
    }

    #[test]
    fn test_subscribe_fires_immediately_with_current_state() {
        let listeners = Arc::new(AuthStateListeners::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let _sub = AuthStateListeners::subscribe(
            &listeners,
            Box::new(move |event, session| {
                seen_clone
                    .lock()
                    .unwrap()
                    .push((event, session.map(|s| s.user.id)));
            }),
            Some(session("u1")),
        );

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], (AuthEvent::Initial, Some("u1".to_string())));
    }

    #[test]
    fn test_notify_reaches_all_subscribers() {
        let listeners = Arc::new(AuthStateListeners::default());
        let count = Arc::new(AtomicUsize::new(0));

        let subs: Vec<AuthSubscription> = (0..3)
            .map(|_| {
                let count = Arc::clone(&count);
                AuthStateListeners::subscribe(
                    &listeners,
                    Box::new(move |event, _| {
                        if event == AuthEvent::SignedIn {
                            count.fetch_add(1, Ordering::SeqCst);
                        }
                    }),
                    None,
                )
            })
            .collect();

        listeners.notify(AuthEvent::SignedIn, Some(&session("u1")));
        assert_eq!(count.load(Ordering::SeqCst), 3);
        drop(subs);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let listeners = Arc::new(AuthStateListeners::default());
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let sub = AuthStateListeners::subscribe(
            &listeners,
            Box::new(move |event, _| {
                if event != AuthEvent::Initial {
                    count_clone.fetch_add(1, Ordering::SeqCst);
                }
            }),
            None,
        );
        assert_eq!(listeners.len(), 1);

        sub.unsubscribe();
        assert!(listeners.is_empty());

        listeners.notify(AuthEvent::SignedOut, None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
