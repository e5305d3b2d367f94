//! Route guard for protected views.

use crate::error::CoreError;

use super::manager::SessionManager;
use super::token::SessionUser;

/// Resolve the signed-in user or refuse with [`CoreError::Unauthorized`].
///
/// ```ignore
/// let user = require_auth(&session)?;
/// tracing::info!(user_id = ?user.id, "opening project wizard");
/// ```
pub fn require_auth(session: &SessionManager) -> Result<SessionUser, CoreError> {
    session.current_user().ok_or_else(|| {
        CoreError::Unauthorized("Authentication required. Please log in.".into())
    })
}
