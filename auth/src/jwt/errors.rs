use thiserror::Error;

/// Error type for JWT encoding and decoding.
///
/// Carries the concrete reason and is meant for server-side diagnostics.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}

/// Uniform access-token rejection.
///
/// Deliberately carries no detail about which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid access token")]
pub struct AuthError;
