//! Error types for chimera generation.

use std::fmt;

/// Maximum length of an upstream error body surfaced to callers.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Failure category of a generation attempt.
///
/// Callers branch on this instead of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// KeyBased provider selected but no credential is stored.
    MissingCredential,
    /// Provider answered with a non-success status.
    ProviderRejected,
    /// Provider answered successfully but without usable image content.
    NoImageReturned,
    /// The request never produced a readable response.
    TransportFailure,
    /// The request was rejected before dispatch.
    InvalidRequest,
    /// No adapter is registered for the selected provider.
    ProviderUnavailable,
    /// Local storage (secret file, output file) failed.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingCredential => "missing_credential",
            Self::ProviderRejected => "provider_rejected",
            Self::NoImageReturned => "no_image_returned",
            Self::TransportFailure => "transport_failure",
            Self::InvalidRequest => "invalid_request",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while generating chimera images.
#[derive(Debug, thiserror::Error)]
pub enum ChimeraError {
    /// No credential configured for a provider that needs one.
    #[error("{0}")]
    MissingCredential(String),

    /// Provider returned a non-success status.
    #[error("{message}")]
    ProviderRejected { status: u16, message: String },

    /// Success status, but no image part in the response.
    #[error("{0}")]
    NoImageReturned(String),

    /// Network or HTTP body error.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Selected provider has no registered adapter.
    #[error("provider not available: {0}")]
    ProviderUnavailable(String),

    /// I/O error (e.g., secret file, saving an image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),
}

impl ChimeraError {
    /// Returns the failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::ProviderRejected { .. } => ErrorKind::ProviderRejected,
            Self::NoImageReturned(_) => ErrorKind::NoImageReturned,
            Self::Transport(_) => ErrorKind::TransportFailure,
            Self::InvalidRequest(_) | Self::Decode(_) => ErrorKind::InvalidRequest,
            Self::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            Self::Io(_) | Self::Json(_) => ErrorKind::Storage,
        }
    }

    /// Returns the user-facing message, without any category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::MissingCredential(m)
            | Self::NoImageReturned(m)
            | Self::InvalidRequest(m)
            | Self::ProviderUnavailable(m)
            | Self::Decode(m) => m.clone(),
            Self::ProviderRejected { message, .. } => message.clone(),
            Self::Transport(_) => sanitize_error_message(&self.to_string()),
            other => other.to_string(),
        }
    }

    /// Returns true for failures that may succeed if the user re-submits.
    ///
    /// Nothing in this crate retries; this only informs the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::ProviderRejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, ChimeraError>;

/// Cleans an upstream error body before it is shown to a user.
///
/// Redacts `key=` query parameters echoed back by the API and caps the length.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN));
    let mut rest = text.trim();

    while let Some(pos) = rest.find("key=") {
        out.push_str(&rest[..pos + 4]);
        out.push_str("[REDACTED]");
        rest = &rest[pos + 4..];
        let end = rest
            .find(|c: char| c == '&' || c == '"' || c == '\'' || c.is_whitespace())
            .unwrap_or(rest.len());
        rest = &rest[end..];
    }
    out.push_str(rest);

    if out.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = out.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        return format!("{truncated}...");
    }
    out
}
