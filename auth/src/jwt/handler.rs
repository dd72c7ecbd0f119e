use std::fmt::Display;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::claims::AccessClaims;
use super::claims::Claims;
use super::claims::ACCESS_TOKEN_TYPE;
use super::errors::AuthError;
use super::errors::JwtError;

/// JWT token handler for encoding and verifying tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a single shared secret. Decoding only
/// accepts HS256: a token whose header names any other algorithm is rejected
/// before its signature is looked at.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Checks structure, algorithm, signature, `exp` (required) and `nbf`
    /// (when present) with zero leeway.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `TokenExpired` - Token `exp` is in the past
    /// * `MissingClaim` - Token has no `exp` claim
    /// * `InvalidToken` - Algorithm or signature mismatch, or token not yet valid
    /// * `DecodingFailed` - Token is malformed or claims have the wrong shape
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let token_data =
            decode::<T>(token, &self.decoding_key, &self.validation()).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    ErrorKind::MissingRequiredClaim(claim) => {
                        JwtError::MissingClaim(claim.to_string())
                    }
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::ImmatureSignature => JwtError::InvalidToken(e.to_string()),
                    _ => JwtError::DecodingFailed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Verify a raw bearer token as an access token.
    ///
    /// Runs, in order: structure, algorithm and signature, time bounds, the
    /// `type` marker, then the `sub` and `role` claims. The first failing check
    /// ends verification. Every failure collapses into the same [`AuthError`];
    /// the concrete reason is only written to the debug log.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims: Claims = self.decode(token).map_err(reject)?;

        if claims.token_type() != Some(ACCESS_TOKEN_TYPE) {
            return Err(reject("token type is not an access token"));
        }

        let subject = claims
            .sub
            .clone()
            .ok_or_else(|| reject(JwtError::MissingClaim("sub".to_string())))?;

        let role = claims
            .role()
            .map(str::to_owned)
            .ok_or_else(|| reject(JwtError::MissingClaim("role".to_string())))?;

        Ok(AccessClaims { subject, role })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation
    }
}

fn reject(reason: impl Display) -> AuthError {
    tracing::debug!(reason = %reason, "Access token rejected");
    AuthError
}
