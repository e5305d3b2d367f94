//! The session service.
//!
//! [`SessionManager`] is the single source of truth for "may the current
//! user act". It is constructed explicitly, initialized once at start-up,
//! and shared as `Arc<SessionManager>` with route guards and API clients.
//!
//! Every failure path degrades to the logged-out state. Lifecycle
//! operations return a [`SessionOutcome`] so callers can tell *why* a
//! session was refused, but none of them return an error.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::Timestamp;

use super::store::TokenStore;
use super::token::{decode_claims, SessionUser};

/// Origins the dashboard is deployed on. A session is never honoured
/// anywhere else.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] =
    &["http://localhost:3000", "https://rajibelectricals.in"];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where the application is running and where it is allowed to run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The running origin, e.g. `https://rajibelectricals.in`.
    pub origin: String,
    /// Exact-match allow-list of origins.
    pub allowed_origins: Vec<String>,
}

impl SessionConfig {
    /// Config for `origin` checked against [`DEFAULT_ALLOWED_ORIGINS`].
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }

    /// Replace the allow-list.
    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn origin_allowed(&self) -> bool {
        self.allowed_origins.iter().any(|o| *o == self.origin)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time source used for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of evaluating a token during [`SessionManager::initialize`] or
/// [`SessionManager::login`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The token decoded, is unexpired, and the origin is allowed.
    Authenticated(SessionUser),
    /// Nothing was persisted.
    NoToken,
    /// The token's `exp` is at or before the current time.
    Expired { expired_at: i64 },
    /// The token could not be decoded.
    Invalid,
    /// The running origin is not on the allow-list.
    OriginDenied { origin: String },
    /// The token was valid but could not be persisted.
    StorageUnavailable,
}

impl SessionOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Short machine-readable label, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated(_) => "authenticated",
            Self::NoToken => "no_token",
            Self::Expired { .. } => "expired",
            Self::Invalid => "invalid",
            Self::OriginDenied { .. } => "origin_denied",
            Self::StorageUnavailable => "storage_unavailable",
        }
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ActiveSession {
    token: String,
    user: SessionUser,
    expires_at: i64,
}

#[derive(Debug, Default)]
struct SessionState {
    active: Option<ActiveSession>,
    last_outcome: Option<SessionOutcome>,
}

/// Owns the access token and the user decoded from it.
///
/// Thread-safe via interior `RwLock`; read accessors never perform I/O.
pub struct SessionManager {
    config: SessionConfig,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Create a manager in the logged-out state. Call
    /// [`initialize`](Self::initialize) before consulting it.
    pub fn new(config: SessionConfig, store: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Restore the session from persisted storage.
    ///
    /// Fails closed: a disallowed origin clears everything before the token
    /// is even read, and an undecodable or expired token is removed from
    /// storage.
    pub fn initialize(&self) -> SessionOutcome {
        if !self.config.origin_allowed() {
            tracing::warn!(origin = %self.config.origin, "Session not allowed from this origin");
            self.logout();
            return self.record(SessionOutcome::OriginDenied {
                origin: self.config.origin.clone(),
            });
        }

        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.write_state().active = None;
                return self.record(SessionOutcome::NoToken);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token");
                self.logout();
                return self.record(SessionOutcome::NoToken);
            }
        };

        let (outcome, active) = self.evaluate(&token);
        match active {
            Some(active) => {
                self.write_state().active = Some(active);
                tracing::info!("Session restored from storage");
            }
            None => {
                tracing::warn!(outcome = outcome.as_str(), "Persisted token rejected");
                self.logout();
            }
        }
        self.record(outcome)
    }

    /// Start a session from a freshly issued token.
    ///
    /// Any failure logs out completely, so a stale previous session never
    /// survives a failed login.
    pub fn login(&self, raw_token: &str) -> SessionOutcome {
        if !self.config.origin_allowed() {
            tracing::warn!(origin = %self.config.origin, "Login not allowed from this origin");
            self.logout();
            return self.record(SessionOutcome::OriginDenied {
                origin: self.config.origin.clone(),
            });
        }

        let (outcome, active) = self.evaluate(raw_token);
        let Some(active) = active else {
            tracing::warn!(outcome = outcome.as_str(), "Login token rejected");
            self.logout();
            return self.record(outcome);
        };

        // Persisting and activating happen under one write lock so a
        // concurrent logout is ordered entirely before or after.
        let mut state = self.write_state();
        if let Err(e) = self.store.save(&active.token) {
            drop(state);
            tracing::warn!(error = %e, "Failed to persist token, logging out");
            self.logout();
            return self.record(SessionOutcome::StorageUnavailable);
        }

        tracing::info!(user_id = ?active.user.id, "Logged in");
        state.active = Some(active);
        state.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Clear the persisted token and the in-memory session. Idempotent.
    pub fn logout(&self) {
        let mut state = self.write_state();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted token");
        }
        if state.active.take().is_some() {
            tracing::info!("Logged out");
        }
        state.last_outcome = Some(SessionOutcome::NoToken);
    }

    /// Drop the in-memory session without touching persisted storage.
    ///
    /// This is the teardown counterpart of [`initialize`](Self::initialize):
    /// the next process start restores the same session.
    pub fn close(&self) {
        let mut state = self.write_state();
        state.active = None;
        state.last_outcome = None;
        tracing::debug!("Session manager closed");
    }

    /// The signed-in user, if the session is present and unexpired.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.live_session().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.live_session().is_some()
    }

    /// The raw access token, only while authenticated.
    pub fn bearer_token(&self) -> Option<String> {
        self.live_session().map(|s| s.token)
    }

    /// `Authorization` header value for outbound API calls.
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer_token().map(|token| format!("Bearer {token}"))
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.live_session()
            .and_then(|s| chrono::DateTime::from_timestamp(s.expires_at, 0))
    }

    /// Outcome of the most recent lifecycle operation.
    pub fn last_outcome(&self) -> Option<SessionOutcome> {
        self.read_state().last_outcome.clone()
    }

    // ---- private helpers ----

    fn evaluate(&self, token: &str) -> (SessionOutcome, Option<ActiveSession>) {
        let claims = match decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Token could not be decoded");
                return (SessionOutcome::Invalid, None);
            }
        };

        if claims.is_expired_at(self.clock.now()) {
            return (
                SessionOutcome::Expired {
                    expired_at: claims.exp,
                },
                None,
            );
        }

        let active = ActiveSession {
            token: token.trim().to_string(),
            user: claims.data.clone(),
            expires_at: claims.exp,
        };
        (SessionOutcome::Authenticated(claims.data), Some(active))
    }

    fn live_session(&self) -> Option<ActiveSession> {
        let now = self.clock.now().timestamp();
        self.read_state()
            .active
            .as_ref()
            .filter(|s| s.expires_at > now)
            .cloned()
    }

    fn record(&self, outcome: SessionOutcome) -> SessionOutcome {
        self.write_state().last_outcome = Some(outcome.clone());
        outcome
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
