use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Claims;
use auth::JwtHandler;
use auth::PasswordHasher;
use user_service::config::ServerConfig;
use user_service::domain::user::models::NewUser;
use user_service::domain::user::models::Role;
use user_service::domain::user::models::UpdateOutcome;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::models::Username;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::user::errors::UserError;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub repository: Arc<InMemoryUserRepository>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server = ServerConfig {
            http_port: port,
            request_timeout_secs: 15,
            shutdown_timeout_secs: 1,
            docs_dir: "docs".to_string(),
        };

        let repository = Arc::new(InMemoryUserRepository::default());
        // Minimum Argon2 cost keeps the suite fast.
        let password_hasher = PasswordHasher::with_params(8, 1, 1).expect("Invalid Argon2 params");
        let user_service = Arc::new(UserService::new(repository.clone(), password_hasher));
        let router = create_router(user_service, Arc::new(JwtHandler::new(TEST_SECRET)), &server);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(TEST_SECRET),
            repository,
        }
    }

    /// Sign an access token for `role` with the server's secret.
    pub fn token_for(&self, role: &str) -> String {
        let claims = Claims::for_access(uuid::Uuid::new_v4(), role, chrono::Duration::hours(1));
        self.jwt_handler
            .encode(&claims)
            .expect("Failed to encode token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for("admin")
    }

    pub fn user_token(&self) -> String {
        self.token_for("user")
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Create a user through the API as an admin and assert it succeeded.
    pub async fn create_user(&self, username: &str, password: &str, role: &str, info: &str) {
        let response = self
            .post_authenticated("/user/create", &self.admin_token())
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "role": role,
                "info": info,
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }
}

/// `UserRepository` backed by a map keyed on username.
///
/// Mirrors the Postgres store: unique usernames, `NotModified` when the user
/// is absent or the value is unchanged, idempotent delete.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn stored(&self, username: &str) -> Option<User> {
        self.users.lock().unwrap().get(username).cloned()
    }

    fn modify(&self, username: &Username, apply: impl FnOnce(&mut User) -> bool) -> UpdateOutcome {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(username.as_str()) {
            Some(user) => {
                if apply(user) {
                    UpdateOutcome::Applied
                } else {
                    UpdateOutcome::NotModified
                }
            }
            None => UpdateOutcome::NotModified,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<UserId, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(user.username.as_str()) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }

        let id = UserId(uuid::Uuid::new_v4());
        users.insert(
            user.username.as_str().to_string(),
            User {
                id,
                username: user.username,
                password_hash: user.password_hash,
                role: user.role,
                info: user.info,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|user| user.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self.stored(username.as_str()))
    }

    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().cloned().collect())
    }

    async fn update_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<UpdateOutcome, UserError> {
        Ok(self.modify(username, |user| {
            if user.password_hash == password_hash {
                return false;
            }
            user.password_hash = password_hash.to_string();
            true
        }))
    }

    async fn update_info(
        &self,
        username: &Username,
        info: &str,
    ) -> Result<UpdateOutcome, UserError> {
        Ok(self.modify(username, |user| {
            if user.info == info {
                return false;
            }
            user.info = info.to_string();
            true
        }))
    }

    async fn update_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<UpdateOutcome, UserError> {
        Ok(self.modify(username, |user| {
            if user.role == role {
                return false;
            }
            user.role = role;
            true
        }))
    }

    async fn delete_by_username(&self, username: &Username) -> Result<(), UserError> {
        self.users.lock().unwrap().remove(username.as_str());
        Ok(())
    }
}
