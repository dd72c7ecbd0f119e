pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::AccessClaims;
pub use claims::Claims;
pub use claims::ACCESS_TOKEN_TYPE;
pub use errors::AuthError;
pub use errors::JwtError;
pub use handler::JwtHandler;
