use thiserror::Error;

/// Error surface of the issuing flows and the dispatcher.
///
/// Session-maintenance calls (`refresh`, `logout`, `current_user`) never
/// return this type - they report failure through their return value so that
/// background session checks cannot crash a calling context.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Server rejected an issuing request; carries the server-supplied
    /// message, or a flow-specific fallback when the body had none.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid authorization header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Email transform failed: {0}")]
    Cipher(String),
}

impl AuthError {
    pub fn rejected(message: impl Into<String>) -> Self {
        AuthError::Rejected {
            message: message.into(),
        }
    }

    /// Whether this is a server-side rejection (as opposed to a transport
    /// or local failure).
    pub fn is_rejection(&self) -> bool {
        matches!(self, AuthError::Rejected { .. })
    }
}
