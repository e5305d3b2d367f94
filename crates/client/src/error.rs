use bizdesk_core::error::CoreError;

/// Errors from the dashboard's REST collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No live session; the request was not sent.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend answered 401 or 403.
    #[error("Authentication rejected by server ({status})")]
    AuthRejected { status: u16 },

    /// Any other non-2xx response.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Notice text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated | Self::AuthRejected { .. } => {
                "Authentication failed. Please log in again.".to_string()
            }
            Self::Server { status, message } => format!("Server Error ({status}): {message}"),
            Self::Request(e) => format!("Request Error: {e}"),
            Self::Core(e) => e.to_string(),
        }
    }

    /// True when the caller should drop the session and ask for a new login.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::AuthRejected { .. })
    }
}
