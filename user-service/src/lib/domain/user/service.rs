use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateOutcome;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher carrying the configured Argon2 cost
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow.
    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let hasher = self.password_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(password.expose()))
            .await
            .map_err(|e| UserError::Hashing(e.to_string()))?
            .map_err(|e| UserError::Hashing(e.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<UserId, UserError> {
        let password_hash = self.hash_password(command.password).await?;

        let user_id = self
            .repository
            .insert(NewUser {
                username: command.username,
                password_hash,
                role: command.role,
                info: command.info,
            })
            .await?;

        tracing::info!(user_id = %user_id, "User created");
        Ok(user_id)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.find_all().await
    }

    async fn update_password(
        &self,
        username: &Username,
        password: Password,
    ) -> Result<UpdateOutcome, UserError> {
        let password_hash = self.hash_password(password).await?;
        self.repository
            .update_password(username, &password_hash)
            .await
    }

    async fn update_info(
        &self,
        username: &Username,
        info: String,
    ) -> Result<UpdateOutcome, UserError> {
        self.repository.update_info(username, &info).await
    }

    async fn update_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<UpdateOutcome, UserError> {
        self.repository.update_role(username, role).await
    }

    async fn delete_user(&self, username: &Username) -> Result<(), UserError> {
        self.repository.delete_by_username(username).await
    }
}
