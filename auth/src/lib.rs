//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the user directory:
//! - Password hashing (Argon2id, tunable cost)
//! - Access-token verification (HS256 JWT with a fixed `type` marker)
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_access("user123", "admin", Duration::hours(1));
//! let token = handler.encode(&claims).unwrap();
//!
//! let access = handler.verify_access(&token).unwrap();
//! assert_eq!(access.subject, "user123");
//! assert_eq!(access.role, "admin");
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::AuthError;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::ACCESS_TOKEN_TYPE;
pub use password::PasswordError;
pub use password::PasswordHasher;
