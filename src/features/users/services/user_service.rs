use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::{is_unique_violation, violated_constraint};
use crate::core::error::{AppError, Result};
use crate::features::auth::password::hash_password_blocking;
use crate::features::users::dtos::UpdateProfileDto;
use crate::features::users::models::{CreateUser, UpdateUser, User};

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, first_name, last_name, role,
    is_premium, is_blocked, is_staff, is_active, created_at, updated_at
"#;

/// Service for user account storage
pub struct UserService {
    pool: PgPool,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    /// Insert a new user; duplicate email or username is a field error
    pub async fn create(&self, data: CreateUser) -> Result<User> {
        self.ensure_available(&data.username, &data.email, None)
            .await?;

        let query = format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&data.username)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_user_write_error(e, "create user"))?;

        tracing::info!("Created user {} ({})", user.username, user.id);

        Ok(user)
    }

    /// Email lookup is case-insensitive
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user by email: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user by id: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Apply a profile update from the user themselves
    pub async fn update_profile(&self, id: Uuid, dto: UpdateProfileDto) -> Result<User> {
        let password_hash = match dto.password {
            Some(password) => Some(hash_password_blocking(password, self.bcrypt_cost).await?),
            None => None,
        };

        self.update(
            id,
            UpdateUser {
                username: dto.username,
                email: dto.email,
                password_hash,
                first_name: dto.first_name,
                last_name: dto.last_name,
            },
        )
        .await
    }

    pub async fn update(&self, id: Uuid, data: UpdateUser) -> Result<User> {
        let current = self.get_by_id(id).await?;

        let username = data.username.unwrap_or(current.username);
        let email = data.email.unwrap_or(current.email);
        self.ensure_available(&username, &email, Some(id)).await?;

        let query = format!(
            r#"
            UPDATE users
            SET username = $2,
                email = $3,
                password_hash = $4,
                first_name = $5,
                last_name = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&username)
            .bind(&email)
            .bind(data.password_hash.unwrap_or(current.password_hash))
            .bind(data.first_name.unwrap_or(current.first_name))
            .bind(data.last_name.unwrap_or(current.last_name))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_user_write_error(e, "update user"))
    }

    /// Ids of every active user, the audience of periodic reports
    pub async fn list_active_ids(&self) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE is_active = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list active users: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn ensure_available(
        &self,
        username: &str,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<()> {
        let (username_taken, email_taken) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($3::uuid IS NULL OR id <> $3)),
                EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($2) AND ($3::uuid IS NULL OR id <> $3))
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check user uniqueness: {:?}", e);
            AppError::Database(e)
        })?;

        if username_taken {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }
        if email_taken {
            return Err(AppError::field(
                "email",
                "A user with that email already exists.",
            ));
        }

        Ok(())
    }
}

/// Translate a lost uniqueness race into the same error the pre-check gives
fn map_user_write_error(e: sqlx::Error, action: &str) -> AppError {
    if is_unique_violation(&e) {
        return match violated_constraint(&e) {
            Some("users_email_key") => {
                AppError::field("email", "A user with that email already exists.")
            }
            _ => AppError::field("username", "A user with that username already exists."),
        };
    }

    tracing::error!("Failed to {}: {:?}", action, e);
    AppError::Database(e)
}
