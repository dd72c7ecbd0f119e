use auth::JwtHandler;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::Role;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, bound to the request by [`authenticate`].
///
/// Lives in the request extensions for exactly one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    /// Role claim exactly as it appeared in the token.
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

/// Middleware that validates the bearer token and adds the caller to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate_header(req.headers().get(AUTHORIZATION), &state.jwt_handler)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Middleware that only lets admins through. Must run after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    authorize_admin(req.extensions().get::<AuthenticatedUser>())?;

    Ok(next.run(req).await)
}

/// Resolve an `Authorization` header value into the caller's identity.
///
/// # Errors
/// * `Unauthorized` - Header absent, not `Bearer <token>`, or token rejected
pub fn authenticate_header(
    header: Option<&HeaderValue>,
    jwt_handler: &JwtHandler,
) -> Result<AuthenticatedUser, ApiError> {
    let token = header
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            tracing::debug!("Missing or malformed Authorization header");
            ApiError::unauthorized()
        })?;

    let claims = jwt_handler.verify_access(token).map_err(|e| {
        tracing::warn!("Access token validation failed: {}", e);
        ApiError::unauthorized()
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.subject,
        role: claims.role,
    })
}

/// Decide whether the bound identity may use an admin route.
///
/// # Errors
/// * `InternalServerError` - No identity bound; the authenticate stage did not run
/// * `Unauthorized` - Identity is not an admin
pub fn authorize_admin(user: Option<&AuthenticatedUser>) -> Result<(), ApiError> {
    let user = user.ok_or_else(|| {
        tracing::error!("Admin check reached without an authenticated user");
        ApiError::internal()
    })?;

    if user.is_admin() {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.user_id, role = %user.role, "Admin access denied");
        Err(ApiError::unauthorized())
    }
}
