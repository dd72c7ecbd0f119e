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

/// Port for user domain service operations.
///
/// All methods are cancellable: dropping the returned future abandons the
/// operation.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create new user, hashing the supplied password.
    ///
    /// # Returns
    /// Identifier assigned by the store
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Hashing` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<UserId, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by unique username.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;

    /// Retrieve every user. Unbounded.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Replace a user's password with a fresh hash of `password`.
    ///
    /// # Errors
    /// * `Hashing` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn update_password(
        &self,
        username: &Username,
        password: Password,
    ) -> Result<UpdateOutcome, UserError>;

    /// Replace a user's free-text info.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_info(&self, username: &Username, info: String)
        -> Result<UpdateOutcome, UserError>;

    /// Change a user's role.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_role(&self, username: &Username, role: Role)
        -> Result<UpdateOutcome, UserError>;

    /// Delete a user. Deleting an unknown username succeeds.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, username: &Username) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
///
/// Uniqueness of `username` and atomicity of each single-record update are
/// the store's responsibility; callers hold no locks.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Returns
    /// Identifier assigned by the store
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, user: NewUser) -> Result<UserId, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_all(&self) -> Result<Vec<User>, UserError>;

    /// Set the password hash of the user with `username`.
    ///
    /// # Returns
    /// `NotModified` when no record changed (absent user or identical value)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<UpdateOutcome, UserError>;

    /// Set the info of the user with `username`.
    ///
    /// # Returns
    /// `NotModified` when no record changed (absent user or identical value)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_info(&self, username: &Username, info: &str)
        -> Result<UpdateOutcome, UserError>;

    /// Set the role of the user with `username`.
    ///
    /// # Returns
    /// `NotModified` when no record changed (absent user or identical value)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_role(&self, username: &Username, role: Role)
        -> Result<UpdateOutcome, UserError>;

    /// Remove the user with `username`, if any.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_by_username(&self, username: &Username) -> Result<(), UserError>;
}
