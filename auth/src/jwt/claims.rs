use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Value of the `type` claim that marks a token as an access token.
pub const ACCESS_TOKEN_TYPE: &str = "access-token";

/// Generic JWT claims structure.
///
/// Supports standard RFC 7519 claims plus custom fields via `extra` map.
/// All standard fields are optional here; which ones are required is decided
/// by the verifier, not by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Subject (user/entity identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Additional custom fields (flattened into token), e.g. `type` and `role`
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create access-token claims for a user with automatic expiration.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier (becomes `sub`)
    /// * `role` - Role name (stored in `extra.role`)
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// Claims with sub, exp, iat, type and role set
    pub fn for_access(user_id: impl ToString, role: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self::new()
            .with_subject(user_id)
            .with_issued_at(now.timestamp())
            .with_expiration((now + ttl).timestamp())
            .with_extra("type", ACCESS_TOKEN_TYPE)
            .with_extra("role", role.to_string())
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set not before (Unix timestamp).
    pub fn with_not_before(mut self, nbf: i64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Remove a custom field.
    pub fn without_extra(mut self, key: &str) -> Self {
        self.extra.remove(key);
        self
    }

    /// Token kind from the `type` claim, if it is a string.
    pub fn token_type(&self) -> Option<&str> {
        self.extra.get("type").and_then(|v| v.as_str())
    }

    /// Role from the `role` claim, if it is a string.
    pub fn role(&self) -> Option<&str> {
        self.extra.get("role").and_then(|v| v.as_str())
    }
}

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub subject: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = Claims::new().with_subject("user123");
        assert_eq!(claims.sub, Some("user123".to_string()));
        assert!(claims.exp.is_none());
        assert!(claims.role().is_none());
    }

    #[test]
    fn test_for_access() {
        let claims = Claims::for_access("user123", "admin", Duration::hours(1));

        assert_eq!(claims.sub, Some("user123".to_string()));
        assert_eq!(claims.token_type(), Some(ACCESS_TOKEN_TYPE));
        assert_eq!(claims.role(), Some("admin"));

        let exp = claims.exp.unwrap();
        let iat = claims.iat.unwrap();
        assert_eq!(exp - iat, 60 * 60);
    }

    #[test]
    fn test_non_string_role_is_not_a_role() {
        let claims = Claims::new().with_extra("role", 7);
        assert!(claims.role().is_none());
        assert!(claims.extra.contains_key("role"));
    }

    #[test]
    fn test_without_extra() {
        let claims = Claims::for_access("user123", "user", Duration::hours(1)).without_extra("type");
        assert!(claims.token_type().is_none());
        assert_eq!(claims.role(), Some("user"));
    }

    #[test]
    fn test_type_and_role_flatten_into_payload() {
        let claims = Claims::for_access("u1", "user", Duration::minutes(5));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["type"], "access-token");
        assert_eq!(json["role"], "user");
        assert_eq!(json["sub"], "u1");
        assert!(json.get("nbf").is_none());
    }
}
