//! Identity collaborator and session-change notifications

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use aichainx_protocol::api::{IdentityErrorResponse, PasswordAuthRequest, PasswordAuthResponse};
use aichainx_protocol::common::User;

use crate::client::BaseClient;
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::store::{SessionStore, StoredSession};

/// External identity service
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Observe session changes; the current user is readable immediately
    fn subscribe(&self) -> SessionSubscription;

    async fn sign_up(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_out(&self) -> Result<()>;
}

// ============================================================================
// Session context
// ============================================================================

/// Publishes the signed-in user to every subscriber
#[derive(Debug)]
pub struct SessionContext {
    sender: watch::Sender<Option<User>>,
}

impl SessionContext {
    pub fn new(initial: Option<User>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn publish(&self, user: Option<User>) {
        tracing::debug!(
            "Session changed: {}",
            user.as_ref().map(|u| u.email.as_str()).unwrap_or("signed out")
        );
        self.sender.send_replace(user);
    }

    pub fn current(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: Some(self.sender.subscribe()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Receiving half of a [`SessionContext`]
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: Option<watch::Receiver<Option<User>>>,
}

impl SessionSubscription {
    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Latest published user; `None` once unsubscribed
    pub fn current(&self) -> Option<User> {
        self.receiver.as_ref().and_then(|rx| rx.borrow().clone())
    }

    /// Wait for the next change. Returns `None` when unsubscribed or when the
    /// context is gone.
    pub async fn changed(&mut self) -> Option<Option<User>> {
        let rx = self.receiver.as_mut()?;
        rx.changed().await.ok()?;
        Some(rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Email/password identity service over REST
#[derive(Debug)]
pub struct HttpIdentityProvider {
    config: Config,
    base: BaseClient,
    store: Mutex<SessionStore>,
    session: SessionContext,
}

impl HttpIdentityProvider {
    /// Restores a persisted session unless it has expired
    pub fn new(config: Config) -> Result<Self> {
        let base = BaseClient::new(Some(Duration::from_secs(config.timeout)))?;
        let store = SessionStore::new(config.session_store_config())?;

        let initial = store
            .session()
            .filter(|s| !s.is_expired(Utc::now()))
            .map(|s| s.user.clone());

        Ok(Self {
            config,
            base,
            store: Mutex::new(store),
            session: SessionContext::new(initial),
        })
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current()
    }

    /// Persisted session, including an expired one
    pub fn stored_session(&self) -> Result<Option<StoredSession>> {
        let store = self.lock_store()?;
        Ok(store.session().cloned())
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, SessionStore>> {
        self.store
            .lock()
            .map_err(|_| MarketError::internal("Session store lock poisoned"))
    }

    fn endpoint(&self, action: &str) -> Result<String> {
        let key = self.config.identity_api_key.as_deref().ok_or_else(|| {
            MarketError::config(
                "Identity API key not configured. Set AICHAINX_IDENTITY_API_KEY or \
                 identity_api_key in the config file.",
            )
        })?;
        Ok(format!("{}?key={}", self.config.identity_url(action), key))
    }

    async fn password_auth(&self, action: &str, email: &str, password: &str) -> Result<User> {
        let url = self.endpoint(action)?;
        let request = PasswordAuthRequest::new(email, password);

        tracing::debug!("identity -> accounts:{} for {}", action, email);
        let raw = self.base.post_json(&url, &request).await?;

        if !raw.is_success() {
            let message = raw
                .json::<IdentityErrorResponse>()
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Identity service returned HTTP {}", raw.status));
            return Err(MarketError::identity(message));
        }

        let response: PasswordAuthResponse = raw.json()?;
        let user = response.user();
        let now = Utc::now();

        self.lock_store()?.store_session(StoredSession {
            user: user.clone(),
            id_token: response.id_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at: now + chrono::Duration::seconds(response.expires_in_secs()),
            created_at: now,
        })?;

        self.session.publish(Some(user.clone()));
        Ok(user)
    }
}

impl IdentityProvider for HttpIdentityProvider {
    fn subscribe(&self) -> SessionSubscription {
        self.session.subscribe()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        self.password_auth("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        self.password_auth("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> Result<()> {
        self.lock_store()?.clear()?;
        self.session.publish(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::{reference_now, test_config};

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            email: "a@b.io".to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscription_sees_changes() {
        let context = SessionContext::default();
        let mut sub = context.subscribe();
        assert_eq!(sub.current(), None);

        context.publish(Some(user()));
        assert_eq!(sub.changed().await, Some(Some(user())));

        context.publish(None);
        assert_eq!(sub.changed().await, Some(None));
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_receiver() {
        let context = SessionContext::new(Some(user()));
        let mut sub = context.subscribe();
        assert_eq!(context.subscriber_count(), 1);

        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(context.subscriber_count(), 0);
        assert_eq!(sub.current(), None);
        assert_eq!(sub.changed().await, None);
    }

    #[test]
    fn test_restores_unexpired_session() {
        let (_dir, config) = test_config();
        let mut store = SessionStore::new(config.session_store_config()).unwrap();
        store
            .store_session(StoredSession {
                user: user(),
                id_token: "t".to_string(),
                refresh_token: "r".to_string(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
                created_at: Utc::now(),
            })
            .unwrap();

        let provider = HttpIdentityProvider::new(config).unwrap();
        assert_eq!(provider.current_user(), Some(user()));
    }

    #[test]
    fn test_session_file_uses_configured_key() {
        let (_dir, mut config) = test_config();
        config.session_encryption_key = Some("local-secret".to_string());
        let mut store = SessionStore::new(config.session_store_config()).unwrap();
        store
            .store_session(StoredSession {
                user: user(),
                id_token: "t".to_string(),
                refresh_token: "r".to_string(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
                created_at: Utc::now(),
            })
            .unwrap();

        let raw = std::fs::read_to_string(config.storage_dir.join("session.json")).unwrap();
        assert!(!raw.contains(&user().email));

        let provider = HttpIdentityProvider::new(config).unwrap();
        assert_eq!(provider.current_user(), Some(user()));
    }

    #[test]
    fn test_expired_session_is_not_restored() {
        let (_dir, config) = test_config();
        let mut store = SessionStore::new(config.session_store_config()).unwrap();
        store
            .store_session(StoredSession {
                user: user(),
                id_token: "t".to_string(),
                refresh_token: "r".to_string(),
                expires_at: reference_now(),
                created_at: reference_now(),
            })
            .unwrap();

        let provider = HttpIdentityProvider::new(config).unwrap();
        assert_eq!(provider.current_user(), None);
        assert!(provider.stored_session().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_out_clears_store_and_notifies() {
        let (_dir, config) = test_config();
        let provider = HttpIdentityProvider::new(config).unwrap();
        provider.session.publish(Some(user()));
        let sub = provider.subscribe();

        provider.sign_out().await.unwrap();
        assert_eq!(sub.current(), None);
        assert!(provider.stored_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let (_dir, config) = test_config();
        let provider = HttpIdentityProvider::new(config).unwrap();
        let err = provider.sign_in("a@b.io", "pw").await.unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::ConfigError);
    }
}
