use std::sync::Arc;
use std::time::Duration;

use auth::JwtHandler;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::update_user::update_info;
use super::handlers::update_user::update_password;
use super::handlers::update_user::update_role;
use super::middleware::authenticate;
use super::middleware::require_admin;
use crate::config::ServerConfig;
use crate::domain::user::ports::UserServicePort;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub jwt_handler: Arc<JwtHandler>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    jwt_handler: Arc<JwtHandler>,
    server: &ServerConfig,
) -> Router {
    let state = AppState {
        user_service,
        jwt_handler,
    };

    let admin_routes = Router::new()
        .route("/user/create", post(create_user))
        .route("/user/update-password", post(update_password))
        .route("/user/update-role", post(update_role))
        .route("/user/update-info", post(update_info))
        .route("/user/delete", post(delete_user))
        .route_layer(middleware::from_fn(require_admin));

    // `authenticate` wraps everything here, including the admin routes, so it
    // always runs before `require_admin`.
    let protected_routes = Router::new()
        .route("/user/get", get(list_users))
        .route("/user/get/:username", get(get_user))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .nest_service("/docs", ServeDir::new(&server.docs_dir))
        .merge(protected_routes)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::Claims;
    use axum::http::header::AUTHORIZATION;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::StatusCode;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::models::CreateUserCommand;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::UpdateOutcome;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;
    use crate::user::errors::UserError;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserService {}

        #[async_trait]
        impl UserServicePort for TestUserService {
            async fn create_user(&self, command: CreateUserCommand) -> Result<UserId, UserError>;
            async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
            async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;
            async fn list_users(&self) -> Result<Vec<User>, UserError>;
            async fn update_password(&self, username: &Username, password: Password) -> Result<UpdateOutcome, UserError>;
            async fn update_info(&self, username: &Username, info: String) -> Result<UpdateOutcome, UserError>;
            async fn update_role(&self, username: &Username, role: Role) -> Result<UpdateOutcome, UserError>;
            async fn delete_user(&self, username: &Username) -> Result<(), UserError>;
        }
    }

    fn router(service: MockTestUserService) -> Router {
        let server = ServerConfig {
            http_port: 0,
            request_timeout_secs: 15,
            shutdown_timeout_secs: 1,
            docs_dir: "docs".to_string(),
        };
        create_router(Arc::new(service), Arc::new(JwtHandler::new(SECRET)), &server)
    }

    fn token(role: &str) -> String {
        JwtHandler::new(SECRET)
            .encode(&Claims::for_access("user-1", role, chrono::Duration::hours(1)))
            .unwrap()
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_read_routes_require_token() {
        // No expectations: reaching the service would panic.
        let app = router(MockTestUserService::new());

        let response = app
            .oneshot(request("GET", "/user/get", None, ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["status_code"], 401);
        assert_eq!(body["data"]["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_list_with_user_token() {
        let mut service = MockTestUserService::new();
        service
            .expect_list_users()
            .times(1)
            .returning(|| Ok(Vec::new()));

        let response = router(service)
            .oneshot(request("GET", "/user/get", Some(&token("user")), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_admin_routes_reject_user_role() {
        let response = router(MockTestUserService::new())
            .oneshot(request(
                "POST",
                "/user/delete",
                Some(&token("user")),
                r#"{"username":"alice"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_route_reaches_service() {
        let mut service = MockTestUserService::new();
        service
            .expect_delete_user()
            .withf(|username| username.as_str() == "alice")
            .times(1)
            .returning(|_| Ok(()));

        let response = router(service)
            .oneshot(request(
                "POST",
                "/user/delete",
                Some(&token("admin")),
                r#"{"username":"alice"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": true })
        );
    }
}
