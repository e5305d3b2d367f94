//! Client-side authentication session.
//!
//! - [`token`] -- decoding of backend-issued access tokens into claims.
//! - [`store`] -- persisted token storage (in-memory and file-backed).
//! - [`manager`] -- the [`SessionManager`] service and its outcomes.
//! - [`guard`] -- route-guard helper for protected views.

pub mod guard;
pub mod manager;
pub mod store;
pub mod token;

pub use guard::require_auth;
pub use manager::{
    Clock, SessionConfig, SessionManager, SessionOutcome, SystemClock, DEFAULT_ALLOWED_ORIGINS,
};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_STORAGE_KEY};
pub use token::{decode_claims, SessionUser, TokenClaims, TokenError};
