use crate::{
    auth::{Credentials, LoginResponse, SessionProfile, token},
    session::{
        client::AuthClient,
        storage::{SessionStorage, StorageError},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "authToken";
/// Storage key holding the JSON-serialized [`SessionProfile`].
pub const PROFILE_KEY: &str = "userData";
/// Message used when a failed login carries no text of its own.
pub const LOGIN_FALLBACK: &str = "login failed";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Observable client session state.
pub struct SessionState {
    pub profile: Option<SessionProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Anonymous,
    Authenticating,
    Authenticated(SessionProfile),
}

impl SessionState {
    #[must_use]
    pub fn status(&self) -> Status {
        match (&self.profile, self.loading) {
            (_, true) => Status::Authenticating,
            (Some(profile), false) => Status::Authenticated(profile.clone()),
            (None, false) => Status::Anonymous,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LoginFailure {
    pub message: String,
}

#[derive(Debug, Error)]
enum RestoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid token: {0}")]
    Token(#[from] token::TokenError),
    #[error("invalid profile: {0}")]
    Profile(#[from] serde_json::Error),
}

/// Owns the client session: acquisition, persistence, expiry and logout.
///
/// State changes are published on a watch channel; [`SessionManager::subscribe`]
/// hands out receivers so a view can follow `loading` while a login is in
/// flight.
pub struct SessionManager {
    client: Arc<dyn AuthClient>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Builds the manager and restores any persisted, unexpired session.
    ///
    /// Unreadable or expired data is purged and the session starts anonymous.
    pub fn start(client: Arc<dyn AuthClient>, storage: Arc<dyn SessionStorage>) -> Self {
        let profile = restore(storage.as_ref(), token::now_unix_seconds());

        let (state, _) = watch::channel(SessionState {
            profile,
            loading: false,
            error: None,
        });

        Self {
            client,
            storage,
            state,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn profile(&self) -> Option<SessionProfile> {
        self.state.borrow().profile.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Returns the persisted bearer token while the session is authenticated.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.storage.get(TOKEN_KEY).ok().flatten()
    }

    /// Authenticates and persists the resulting session.
    ///
    /// # Errors
    /// Returns the failure message, also recorded in [`SessionState::error`].
    #[instrument(skip_all)]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionProfile, LoginFailure> {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let credentials = Credentials::new(email, password);
        let result = match self.client.authenticate(&credentials).await {
            Ok(response) => self.persist(&response).map(|()| response.user),
            Err(e) => {
                debug!("Login rejected: {}", e);

                Err(e.to_string())
            }
        };

        match result {
            Ok(profile) => {
                info!("Session established");

                self.state.send_modify(|state| {
                    state.loading = false;
                    state.profile = Some(profile.clone());
                });
                Ok(profile)
            }
            Err(message) => {
                let message = if message.trim().is_empty() {
                    LOGIN_FALLBACK.to_string()
                } else {
                    message
                };
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message.clone());
                });
                Err(LoginFailure { message })
            }
        }
    }

    /// Clears the persisted session and returns to anonymous.
    pub fn logout(&mut self) {
        purge(self.storage.as_ref());
        self.state.send_replace(SessionState::default());
    }

    /// Purges the session if its token has expired since startup.
    ///
    /// Returns `true` while the session remains valid.
    pub fn enforce_expiry(&mut self) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        if restore(self.storage.as_ref(), token::now_unix_seconds()).is_some() {
            true
        } else {
            info!("Session expired");

            self.state.send_modify(|state| state.profile = None);
            false
        }
    }

    /// Writes token then profile; a failed profile write removes the token
    /// again so the pair is never half-present.
    fn persist(&self, response: &LoginResponse) -> Result<(), String> {
        let profile = serde_json::to_string(&response.user).map_err(|e| e.to_string())?;

        let written = self
            .storage
            .set(TOKEN_KEY, &response.token)
            .and_then(|()| self.storage.set(PROFILE_KEY, &profile));

        if let Err(e) = written {
            error!("Failed to persist session: {}", e);

            purge(self.storage.as_ref());
            self.state.send_modify(|state| state.profile = None);
            return Err(e.to_string());
        }

        Ok(())
    }
}

fn purge(storage: &dyn SessionStorage) {
    for key in [TOKEN_KEY, PROFILE_KEY] {
        if let Err(e) = storage.remove(key) {
            warn!("Failed to remove {} from session storage: {}", key, e);
        }
    }
}

/// Returns the persisted profile if a complete, unexpired session exists,
/// purging storage otherwise.
fn restore(storage: &dyn SessionStorage, now: i64) -> Option<SessionProfile> {
    match load(storage, now) {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            purge(storage);
            None
        }
        Err(e) => {
            warn!("Discarding persisted session: {}", e);

            purge(storage);
            None
        }
    }
}

fn load(storage: &dyn SessionStorage, now: i64) -> Result<Option<SessionProfile>, RestoreError> {
    let token = storage.get(TOKEN_KEY)?;
    let profile = storage.get(PROFILE_KEY)?;

    let (Some(token), Some(profile)) = (token, profile) else {
        return Ok(None);
    };

    let claims = token::decode_unverified(&token)?;
    if claims.is_expired_at(now) {
        debug!("Persisted token expired at {}", claims.exp);

        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&profile)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::JwtSigner,
        session::{client::ClientError, storage::MemoryStorage},
    };
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::{sync::Mutex, time::Duration};
    use tokio::sync::oneshot;

    enum Reply {
        Accept(String),
        Reject(String),
    }

    struct StubClient {
        reply: Reply,
        calls: Mutex<usize>,
    }

    impl StubClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl AuthClient for StubClient {
        async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
            if let Ok(mut calls) = self.calls.lock() {
                *calls += 1;
            }
            match &self.reply {
                Reply::Accept(token) => Ok(LoginResponse {
                    token: token.clone(),
                    user: SessionProfile {
                        id: "507f1f77bcf86cd799439011".to_string(),
                        name: "Usuário Teste".to_string(),
                        email: credentials.email.clone(),
                        company: Some("Bondy".to_string()),
                    },
                }),
                Reply::Reject(message) => Err(ClientError::Rejected {
                    status: 401,
                    kind: Some("invalid_credentials".to_string()),
                    message: message.clone(),
                }),
            }
        }
    }

    /// Holds the response until the test releases it.
    struct GatedClient {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        token: String,
    }

    #[async_trait]
    impl AuthClient for GatedClient {
        async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
            let gate = self.gate.lock().ok().and_then(|mut gate| gate.take());
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            Ok(LoginResponse {
                token: self.token.clone(),
                user: SessionProfile {
                    id: "507f1f77bcf86cd799439011".to_string(),
                    name: "Usuário Teste".to_string(),
                    email: credentials.email.clone(),
                    company: None,
                },
            })
        }
    }

    /// Refuses to store the profile key.
    #[derive(Default)]
    struct FailingProfileStorage {
        inner: MemoryStorage,
    }

    impl SessionStorage for FailingProfileStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == PROFILE_KEY {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn signer() -> JwtSigner {
        JwtSigner::new(&SecretString::from("test-jwt-secret-key".to_string())).expect("signer")
    }

    fn fresh_token() -> String {
        signer()
            .sign_at("507f1f77bcf86cd799439011", token::now_unix_seconds(), Duration::from_secs(86_400))
            .expect("sign")
    }

    fn expired_token() -> String {
        signer()
            .sign_at(
                "507f1f77bcf86cd799439011",
                token::now_unix_seconds() - 2 * 86_400,
                Duration::from_secs(86_400),
            )
            .expect("sign")
    }

    fn profile_json() -> String {
        r#"{"id":"507f1f77bcf86cd799439011","name":"Usuário Teste","email":"teste@bondy.com.br","company":"Bondy"}"#
            .to_string()
    }

    #[test]
    fn startup_without_session_is_anonymous() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = SessionManager::start(StubClient::new(Reply::Reject(String::new())), storage);

        assert_eq!(manager.state().status(), Status::Anonymous);
        assert!(!manager.state().loading);
        assert!(manager.token().is_none());
    }

    #[test]
    fn startup_restores_unexpired_session() {
        let storage = Arc::new(MemoryStorage::new());
        let token = fresh_token();
        storage.set(TOKEN_KEY, &token).expect("set");
        storage.set(PROFILE_KEY, &profile_json()).expect("set");

        let manager = SessionManager::start(StubClient::new(Reply::Reject(String::new())), storage);

        let profile = manager.profile().expect("restored profile");
        assert_eq!(profile.email, "teste@bondy.com.br");
        assert_eq!(manager.token(), Some(token));
    }

    #[test]
    fn startup_purges_expired_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, &expired_token()).expect("set");
        storage.set(PROFILE_KEY, &profile_json()).expect("set");

        let manager =
            SessionManager::start(StubClient::new(Reply::Reject(String::new())), storage.clone());

        assert_eq!(manager.state().status(), Status::Anonymous);
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
        assert_eq!(storage.get(PROFILE_KEY).expect("get"), None);
    }

    #[test]
    fn startup_treats_garbage_as_no_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "not-a-token").expect("set");
        storage.set(PROFILE_KEY, "{broken").expect("set");

        let manager =
            SessionManager::start(StubClient::new(Reply::Reject(String::new())), storage.clone());

        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
        assert_eq!(storage.get(PROFILE_KEY).expect("get"), None);
    }

    #[test]
    fn startup_purges_a_lone_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, &fresh_token()).expect("set");

        let manager =
            SessionManager::start(StubClient::new(Reply::Reject(String::new())), storage.clone());

        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
    }

    #[tokio::test]
    async fn login_persists_token_and_profile() {
        let storage = Arc::new(MemoryStorage::new());
        let token = fresh_token();
        let mut manager =
            SessionManager::start(StubClient::new(Reply::Accept(token.clone())), storage.clone());

        let profile = manager
            .login("teste@bondy.com.br", "123456")
            .await
            .expect("login");

        assert_eq!(profile.name, "Usuário Teste");
        assert_eq!(manager.state().status(), Status::Authenticated(profile.clone()));
        assert_eq!(manager.state().error, None);
        assert!(!manager.state().loading);
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), Some(token));

        let stored: SessionProfile =
            serde_json::from_str(&storage.get(PROFILE_KEY).expect("get").expect("profile"))
                .expect("json");
        assert_eq!(stored, profile);
    }

    #[tokio::test]
    async fn failed_login_records_message_and_persists_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = SessionManager::start(
            StubClient::new(Reply::Reject("invalid user or password".to_string())),
            storage.clone(),
        );

        let failure = manager
            .login("teste@bondy.com.br", "senhaErrada")
            .await
            .expect_err("should fail");

        assert_eq!(failure.message, "invalid user or password");
        assert_eq!(manager.state().error.as_deref(), Some("invalid user or password"));
        assert_eq!(manager.state().status(), Status::Anonymous);
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
        assert_eq!(storage.get(PROFILE_KEY).expect("get"), None);
    }

    #[tokio::test]
    async fn empty_failure_message_uses_fallback() {
        let mut manager = SessionManager::start(
            StubClient::new(Reply::Reject("  ".to_string())),
            Arc::new(MemoryStorage::new()),
        );

        let failure = manager.login("a@b.co", "x").await.expect_err("should fail");
        assert_eq!(failure.message, LOGIN_FALLBACK);
    }

    #[tokio::test]
    async fn interrupted_write_leaves_neither_key() {
        let storage = Arc::new(FailingProfileStorage::default());
        let mut manager =
            SessionManager::start(StubClient::new(Reply::Accept(fresh_token())), storage.clone());

        let failure = manager
            .login("teste@bondy.com.br", "123456")
            .await
            .expect_err("should fail");

        assert!(failure.message.contains("quota exceeded"));
        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
        assert_eq!(storage.get(PROFILE_KEY).expect("get"), None);
    }

    #[tokio::test]
    async fn successful_login_clears_previous_error() {
        let storage = Arc::new(MemoryStorage::new());
        let mut failing = SessionManager::start(
            StubClient::new(Reply::Reject("invalid user or password".to_string())),
            storage.clone(),
        );
        assert!(failing.login("a@b.co", "x").await.is_err());
        assert!(failing.state().error.is_some());

        // same storage, new client: the error state belongs to the manager
        let mut manager =
            SessionManager::start(StubClient::new(Reply::Accept(fresh_token())), storage);
        manager
            .state
            .send_modify(|state| state.error = Some("stale".to_string()));
        manager.login("a@b.co", "x").await.expect("login");
        assert_eq!(manager.state().error, None);
    }

    #[tokio::test]
    async fn logout_purges_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager =
            SessionManager::start(StubClient::new(Reply::Accept(fresh_token())), storage.clone());
        manager.login("teste@bondy.com.br", "123456").await.expect("login");

        manager.logout();

        assert_eq!(manager.state(), SessionState::default());
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
        assert_eq!(storage.get(PROFILE_KEY).expect("get"), None);
    }

    #[tokio::test]
    async fn enforce_expiry_drops_expired_session() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager =
            SessionManager::start(StubClient::new(Reply::Accept(expired_token())), storage.clone());

        // the server handed out a token that is already past its exp
        manager.login("teste@bondy.com.br", "123456").await.expect("login");
        assert!(manager.is_authenticated());

        assert!(!manager.enforce_expiry());
        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), None);
    }

    #[tokio::test]
    async fn enforce_expiry_keeps_valid_session() {
        let mut manager = SessionManager::start(
            StubClient::new(Reply::Accept(fresh_token())),
            Arc::new(MemoryStorage::new()),
        );
        manager.login("teste@bondy.com.br", "123456").await.expect("login");

        assert!(manager.enforce_expiry());
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn subscribers_see_authenticating_during_login() {
        let (release, gate) = oneshot::channel();
        let client = Arc::new(GatedClient {
            gate: Mutex::new(Some(gate)),
            token: fresh_token(),
        });
        let mut manager = SessionManager::start(client, Arc::new(MemoryStorage::new()));
        let mut states = manager.subscribe();
        assert_eq!(states.borrow().status(), Status::Anonymous);

        let observer = async move {
            states.changed().await.expect("login started");
            let in_flight = states.borrow_and_update().clone();
            release.send(()).expect("release");

            states.changed().await.expect("login finished");
            let settled = states.borrow_and_update().clone();
            (in_flight, settled)
        };

        let (result, (in_flight, settled)) =
            tokio::join!(manager.login("teste@bondy.com.br", "123456"), observer);

        let profile = result.expect("login");
        assert!(in_flight.loading);
        assert_eq!(in_flight.status(), Status::Authenticating);
        assert!(!settled.loading);
        assert_eq!(settled.status(), Status::Authenticated(profile));
        assert!(!manager.state().loading);
    }

    #[tokio::test]
    async fn failed_login_publishes_loading_reset() {
        let mut manager = SessionManager::start(
            StubClient::new(Reply::Reject("invalid user or password".to_string())),
            Arc::new(MemoryStorage::new()),
        );
        let states = manager.subscribe();

        assert!(manager.login("a@b.co", "x").await.is_err());

        let state = states.borrow().clone();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("invalid user or password"));
    }

    #[test]
    fn status_reports_authenticating_while_loading() {
        let state = SessionState {
            profile: None,
            loading: true,
            error: None,
        };
        assert_eq!(state.status(), Status::Authenticating);
    }
}
