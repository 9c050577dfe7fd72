//! Error types for the Zoomlion provider.
//!
//! Remote, transport and decode failures are surfaced unchanged to the caller.
//! [`ProviderError::Unauthorized`] is kept apart from transport failures so a
//! host can render "access denied" instead of "service unavailable".

/// Errors that can occur while talking to Zoomlion or mapping its resources.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The remote service answered with a non-success status.
    #[error("Request failed, got status code: {status}. Response: {body}")]
    RemoteHttp {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The token endpoint reported an OAuth error.
    #[error("Received error from zoomlion {error}, description from zoomlion {description}")]
    RemoteAuth {
        /// The OAuth error code.
        error: String,
        /// The remote error description (empty when absent).
        description: String,
    },

    /// A response body could not be decoded or lacks a required field.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A principal id does not follow `<provider>_<type>://<externalID>`.
    #[error("invalid id {0}")]
    InvalidPrincipalId(String),

    /// A principal id decoded to a type this provider cannot look up.
    #[error("Cannot get the zoomlion account due to invalid externalIDType {0}")]
    UnsupportedPrincipalType(String),

    /// The access gate rejected the authenticated identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Provider configuration or a secret could not be read or written.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failed to parse a URL.
    #[error("URL error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A login failure wrapped with the operation it interrupted.
    #[error("{context}: {source}")]
    Authentication {
        /// What was being attempted.
        context: String,
        /// The underlying failure.
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Creates a `RemoteAuth` error from a token endpoint response.
    #[must_use]
    pub fn remote_auth(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::RemoteAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates a `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates the generic rejection returned when the access gate says no.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized("unauthorized".to_string())
    }

    /// Wraps this error with a description of the interrupted operation.
    #[must_use]
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Authentication {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns `true` if the access gate rejected the identity.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Returns `true` if this is a network or remote service error.
    #[must_use]
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            Self::RemoteHttp { .. } | Self::RemoteAuth { .. } | Self::Transport(_)
        )
    }

    /// Returns `true` if the error comes from a malformed principal id.
    #[must_use]
    pub fn is_principal_id_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrincipalId(_) | Self::UnsupportedPrincipalType(_)
        )
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
