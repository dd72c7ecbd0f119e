use async_trait::async_trait;
use sqlx::postgres::PgQueryResult;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateOutcome;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERNAME_CONSTRAINT: &str = "users_username_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    info: String,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username)?,
            password_hash: row.password_hash,
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| UserError::DatabaseError(format!("corrupt role column: {}", e)))?,
            info: row.info,
        })
    }
}

/// Zero affected rows means nothing changed: the `IS DISTINCT FROM` guard in
/// every update skips rows that already hold the new value.
fn update_outcome(result: PgQueryResult) -> UpdateOutcome {
    if result.rows_affected() == 0 {
        UpdateOutcome::NotModified
    } else {
        UpdateOutcome::Applied
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: NewUser) -> Result<UserId, UserError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, role, info)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.info)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_CONSTRAINT)
                {
                    return UserError::UsernameAlreadyExists(user.username.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(UserId(id))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, info
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, info
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, info
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_password(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<UpdateOutcome, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE username = $1 AND password_hash IS DISTINCT FROM $2
            "#,
        )
        .bind(username.as_str())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            UserError::DatabaseError(format!(
                "updating password of {}: {}",
                username.as_str(),
                e
            ))
        })?;

        Ok(update_outcome(result))
    }

    async fn update_info(
        &self,
        username: &Username,
        info: &str,
    ) -> Result<UpdateOutcome, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET info = $2
            WHERE username = $1 AND info IS DISTINCT FROM $2
            "#,
        )
        .bind(username.as_str())
        .bind(info)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            UserError::DatabaseError(format!("updating info of {}: {}", username.as_str(), e))
        })?;

        Ok(update_outcome(result))
    }

    async fn update_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<UpdateOutcome, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2
            WHERE username = $1 AND role IS DISTINCT FROM $2
            "#,
        )
        .bind(username.as_str())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            UserError::DatabaseError(format!("updating role of {}: {}", username.as_str(), e))
        })?;

        Ok(update_outcome(result))
    }

    async fn delete_by_username(&self, username: &Username) -> Result<(), UserError> {
        sqlx::query(
            r#"
            DELETE FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            UserError::DatabaseError(format!("deleting {}: {}", username.as_str(), e))
        })?;

        Ok(())
    }
}
