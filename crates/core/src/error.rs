//! Error types for the cloning pipeline and its collaborators.

/// Failure while fetching a remote resource (video posters, placeholders).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    HttpError(u16),

    #[error("Response too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

/// Failure while turning a data URL into an image node.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid data URL: {reason}")]
    InvalidDataUrl { reason: String },

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Empty image payload for {mime}")]
    EmptyImage { mime: String },
}

/// Top-level error of a `clone_node` call.
///
/// Any collaborator failure aborts the whole call; nothing partial is returned.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result type alias using CloneError.
pub type CloneResult<T> = Result<T, CloneError>;

impl DecodeError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDataUrl {
            reason: reason.into(),
        }
    }
}
