use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::{is_foreign_key_violation, is_unique_violation};
use crate::core::error::{AppError, Result};
use crate::features::auth::access::{can_access, OwnedResource};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::Category;
use crate::shared::constants::DUPLICATE_CATEGORY_MESSAGE;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Categories owned by the caller, by name
    pub async fn list(&self, actor: &AuthenticatedUser) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM categories
            WHERE user_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(actor.user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn create(&self, actor: &AuthenticatedUser, name: String) -> Result<Category> {
        self.ensure_unique_name(actor.user_id, &name, None).await?;

        let category = self.insert(actor.user_id, &name).await?;

        tracing::debug!("Created category {} for user {}", category.id, actor.user_id);

        Ok(category)
    }

    /// Load a category by id without any ownership check
    pub async fn find(&self, id: Uuid) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category: {:?}", e);
            AppError::Database(e)
        })
    }

    /// A category the caller may act on; anything else is not found
    pub async fn get(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<Category> {
        match self.find(id).await? {
            Some(category) if can_access(actor, OwnedResource::Category(&category)) => {
                Ok(category)
            }
            _ => Err(category_not_found(id)),
        }
    }

    /// Rename a category; `None` keeps the current name
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        name: Option<String>,
    ) -> Result<Category> {
        let category = self.get(actor, id).await?;

        let name = match name {
            Some(name) => name,
            None => return Ok(category),
        };

        // Uniqueness is scoped to the owner, who may differ from an admin caller
        self.ensure_unique_name(category.user_id, &name, Some(category.id))
            .await?;

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(category.id)
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_name_conflict(e, "update category"))
    }

    /// Delete a category that no transaction references
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let category = self.get(actor, id).await?;

        let referenced = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM transactions WHERE category_id = $1",
        )
        .bind(category.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count category transactions: {:?}", e);
            AppError::Database(e)
        })?;

        if referenced > 0 {
            return Err(category_in_use(&category.name));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // A transaction may have been added since the count
                if is_foreign_key_violation(&e) {
                    return category_in_use(&category.name);
                }
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn insert(&self, owner_id: Uuid, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_name_conflict(e, "create category"))
    }

    async fn ensure_unique_name(
        &self,
        owner_id: Uuid,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE user_id = $1
                  AND LOWER(name) = LOWER($2)
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check category name: {:?}", e);
            AppError::Database(e)
        })?;

        if exists {
            return Err(AppError::field("name", DUPLICATE_CATEGORY_MESSAGE));
        }

        Ok(())
    }
}

fn category_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Category with id {} not found", id))
}

fn category_in_use(name: &str) -> AppError {
    AppError::Conflict(format!(
        "Category '{}' is used by existing transactions and cannot be deleted",
        name
    ))
}

/// The unique index is the final word on duplicate names
fn map_name_conflict(e: sqlx::Error, action: &str) -> AppError {
    if is_unique_violation(&e) {
        return AppError::field("name", DUPLICATE_CATEGORY_MESSAGE);
    }

    tracing::error!("Failed to {}: {:?}", action, e);
    AppError::Database(e)
}
