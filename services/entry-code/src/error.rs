use crate::handlers::connect::ConnectResponse;

/// Error code returned to the contact flow when the code is not accepted.
pub const INVALID_CODE_ERROR: &str = "410";
/// Error code returned to the contact flow when the unlock message could not be sent.
pub const PUBLISH_FAILED_ERROR: &str = "408";

/// Entry-code function error variants.
#[derive(Debug, thiserror::Error)]
pub enum EntryCodeServiceError {
    #[error("secret unavailable")]
    SecretUnavailable(#[source] anyhow::Error),
    #[error("invalid entry code")]
    InvalidCode,
    #[error("malformed event: {0}")]
    MalformedEvent(&'static str),
    #[error("entry code validation failed")]
    Validation(#[from] anyhow::Error),
    #[error("unlock publish failed")]
    Publish(#[source] anyhow::Error),
}

impl EntryCodeServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SecretUnavailable(_) => "SECRET_UNAVAILABLE",
            Self::InvalidCode => "INVALID_CODE",
            Self::MalformedEvent(_) => "MALFORMED_EVENT",
            Self::Validation(_) => "VALIDATION",
            Self::Publish(_) => "PUBLISH",
        }
    }

    /// Stable code the contact flow branches on. `None` for faults that fail the invocation.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCode | Self::MalformedEvent(_) | Self::Validation(_) => {
                Some(INVALID_CODE_ERROR)
            }
            Self::Publish(_) => Some(PUBLISH_FAILED_ERROR),
            Self::SecretUnavailable(_) => None,
        }
    }

    /// Whether this error fails the whole invocation instead of producing a result.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SecretUnavailable(_))
    }

    /// Convert into the result handed back to the contact flow.
    ///
    /// Negative validation outcomes are expected and logged at `info`.
    /// Store and publish faults carry a cause chain and are logged at `error`.
    pub fn into_response(self) -> ConnectResponse {
        let message = match &self {
            Self::InvalidCode | Self::MalformedEvent(_) => "Invalid Entry Code",
            Self::Validation(_) => "Unable to validate entry code",
            Self::Publish(_) => "Unable to publish to queue",
            Self::SecretUnavailable(_) => "Unable to resolve device secret",
        };
        match &self {
            Self::Validation(e) | Self::Publish(e) | Self::SecretUnavailable(e) => {
                tracing::error!(error = %format_args!("{e:#}"), kind = self.kind(), "{}", self);
            }
            Self::InvalidCode | Self::MalformedEvent(_) => {
                tracing::info!(kind = self.kind(), "{}", self);
            }
        }
        ConnectResponse::failure(message, self.error_code().unwrap_or(INVALID_CODE_ERROR))
    }
}
