use std::sync::Arc;

use chrono::{Local, NaiveDate};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::access::{can_access, OwnedResource};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::Category;
use crate::features::categories::services::CategoryService;
use crate::features::transactions::dtos::{
    TransactionFilterQuery, TransactionRequestDto, UpdateTransactionDto,
};
use crate::features::transactions::models::{CategoryTotal, Transaction, TransactionInput};
use crate::shared::constants::FOREIGN_CATEGORY_MESSAGE;
use crate::shared::types::PaginationQuery;

const TRANSACTION_SELECT: &str = r#"
    SELECT t.id, t.category_id, c.user_id AS owner_id, c.name AS category_name,
           t.type, t.amount, t.date, t.note, t.created_at, t.updated_at
    FROM transactions t
    JOIN categories c ON c.id = t.category_id
"#;

const INSERT_TRANSACTION: &str = r#"
    WITH t AS (
        INSERT INTO transactions (category_id, type, amount, date, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
    )
    SELECT t.id, t.category_id, c.user_id AS owner_id, c.name AS category_name,
           t.type, t.amount, t.date, t.note, t.created_at, t.updated_at
    FROM t
    JOIN categories c ON c.id = t.category_id
"#;

const UPDATE_TRANSACTION: &str = r#"
    WITH t AS (
        UPDATE transactions
        SET category_id = $2, type = $3, amount = $4, date = $5, note = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
    )
    SELECT t.id, t.category_id, c.user_id AS owner_id, c.name AS category_name,
           t.type, t.amount, t.date, t.note, t.created_at, t.updated_at
    FROM t
    JOIN categories c ON c.id = t.category_id
"#;

const DEFAULT_ORDERING: &str = "t.created_at DESC";

/// Service for transaction operations
pub struct TransactionService {
    pool: PgPool,
    categories: Arc<CategoryService>,
}

impl TransactionService {
    pub fn new(pool: PgPool, categories: Arc<CategoryService>) -> Self {
        Self { pool, categories }
    }

    /// One page of the caller's transactions plus the total matching count
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        filter: &TransactionFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Transaction>, i64)> {
        if let Some(category_id) = filter.category {
            let owned = self
                .categories
                .find(category_id)
                .await?
                .is_some_and(|c| c.user_id == actor.user_id);
            if !owned {
                return Err(AppError::field(
                    "category",
                    "Select a valid choice. That choice is not one of the available choices.",
                ));
            }
        }

        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM transactions t JOIN categories c ON c.id = t.category_id",
        );
        push_filters(&mut count_query, actor.user_id, filter);

        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count transactions: {:?}", e);
                AppError::Database(e)
            })?;

        if pagination.is_out_of_range(total) {
            return Err(AppError::NotFound("Invalid page.".to_string()));
        }

        let mut query = QueryBuilder::<Postgres>::new(TRANSACTION_SELECT);
        push_filters(&mut query, actor.user_id, filter);
        query.push(" ORDER BY ");
        query.push(order_clause(filter.ordering.as_deref()));
        query.push(" LIMIT ");
        query.push_bind(pagination.limit());
        query.push(" OFFSET ");
        query.push_bind(pagination.offset());

        let transactions = query
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list transactions: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((transactions, total))
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: TransactionRequestDto,
    ) -> Result<Transaction> {
        let category = self.owned_category(actor, dto.category).await?;

        let input = TransactionInput {
            category_id: category.id,
            transaction_type: dto.transaction_type,
            amount: dto.amount,
            date: dto.date.unwrap_or_else(today),
            note: dto.note,
        };

        let transaction = sqlx::query_as::<_, Transaction>(INSERT_TRANSACTION)
            .bind(input.category_id)
            .bind(input.transaction_type)
            .bind(input.amount)
            .bind(input.date)
            .bind(&input.note)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create transaction: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::debug!(
            "Created {} transaction {} for user {}",
            transaction.transaction_type,
            transaction.id,
            actor.user_id
        );

        Ok(transaction)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Transaction>> {
        let query = format!("{} WHERE t.id = $1", TRANSACTION_SELECT);

        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get transaction: {:?}", e);
                AppError::Database(e)
            })
    }

    /// A transaction the caller may act on; anything else is not found
    pub async fn get(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<Transaction> {
        match self.find(id).await? {
            Some(t) if can_access(actor, OwnedResource::Transaction(&t)) => Ok(t),
            _ => Err(AppError::NotFound(format!(
                "Transaction with id {} not found",
                id
            ))),
        }
    }

    /// Full replacement of every writable field
    pub async fn replace(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: TransactionRequestDto,
    ) -> Result<Transaction> {
        let current = self.get(actor, id).await?;
        let category = self.owned_category(actor, dto.category).await?;

        self.write(
            current.id,
            TransactionInput {
                category_id: category.id,
                transaction_type: dto.transaction_type,
                amount: dto.amount,
                date: dto.date.unwrap_or(current.date),
                note: dto.note,
            },
        )
        .await
    }

    /// Partial update; absent fields keep their stored values
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateTransactionDto,
    ) -> Result<Transaction> {
        let current = self.get(actor, id).await?;

        let category_id = match dto.category {
            Some(category_id) => self.owned_category(actor, category_id).await?.id,
            None => current.category_id,
        };

        self.write(
            current.id,
            TransactionInput {
                category_id,
                transaction_type: dto.transaction_type.unwrap_or(current.transaction_type),
                amount: dto.amount.unwrap_or(current.amount),
                date: dto.date.unwrap_or(current.date),
                note: dto.note.unwrap_or(current.note),
            },
        )
        .await
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let transaction = self.get(actor, id).await?;

        sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(transaction.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete transaction: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    /// Per-category sum and count of all of a user's transactions, by name.
    ///
    /// Income and expense amounts are added together.
    pub async fn by_category(&self, user_id: Uuid) -> Result<Vec<CategoryTotal>> {
        sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT c.id AS category_id,
                   c.name AS category_name,
                   SUM(t.amount) AS total_amount,
                   COUNT(t.id) AS txn_count
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE c.user_id = $1
            GROUP BY c.id, c.name
            ORDER BY c.name, c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to group transactions by category: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Most recent transactions dated within `[start, end]`
    pub async fn recent_in_window(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Transaction>> {
        let query = format!(
            r#"
            {}
            WHERE c.user_id = $1 AND t.date BETWEEN $2 AND $3
            ORDER BY t.date DESC, t.created_at DESC
            LIMIT $4
            "#,
            TRANSACTION_SELECT
        );

        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load recent transactions: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Transactions may only be filed under the caller's own categories
    async fn owned_category(&self, actor: &AuthenticatedUser, category_id: Uuid) -> Result<Category> {
        match self.categories.find(category_id).await? {
            Some(category) if category.user_id == actor.user_id => Ok(category),
            _ => Err(AppError::field("category", FOREIGN_CATEGORY_MESSAGE)),
        }
    }

    async fn write(&self, id: Uuid, input: TransactionInput) -> Result<Transaction> {
        sqlx::query_as::<_, Transaction>(UPDATE_TRANSACTION)
            .bind(id)
            .bind(input.category_id)
            .bind(input.transaction_type)
            .bind(input.amount)
            .bind(input.date)
            .bind(&input.note)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update transaction: {:?}", e);
                AppError::Database(e)
            })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Owner scope plus every filter present in the query string
fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    filter: &TransactionFilterQuery,
) {
    builder.push(" WHERE c.user_id = ");
    builder.push_bind(user_id);

    if let Some(date_after) = filter.date_after {
        builder.push(" AND t.date >= ");
        builder.push_bind(date_after);
    }
    if let Some(date_before) = filter.date_before {
        builder.push(" AND t.date <= ");
        builder.push_bind(date_before);
    }
    if let Some(amount_min) = filter.amount_min {
        builder.push(" AND t.amount >= ");
        builder.push_bind(amount_min);
    }
    if let Some(amount_max) = filter.amount_max {
        builder.push(" AND t.amount <= ");
        builder.push_bind(amount_max);
    }
    if let Some(transaction_type) = filter.transaction_type {
        builder.push(" AND t.type = ");
        builder.push_bind(transaction_type);
    }
    if let Some(category) = filter.category {
        builder.push(" AND t.category_id = ");
        builder.push_bind(category);
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND t.category_id = ");
        builder.push_bind(category_id);
    }
    if let Some(name) = filter.category_name.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND c.name ILIKE ");
        builder.push_bind(contains_pattern(name));
    }
    if let Some(note) = filter.note.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND t.note ILIKE ");
        builder.push_bind(contains_pattern(note));
    }
}

/// `%term%` with LIKE wildcards in `term` escaped
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Translate `?ordering=-date,amount` into an ORDER BY list.
///
/// Only `date`, `amount` and `type` are sortable; anything else is ignored.
fn order_clause(ordering: Option<&str>) -> String {
    let terms: Vec<String> = ordering
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|term| {
            let (field, direction) = match term.strip_prefix('-') {
                Some(field) => (field, "DESC"),
                None => (term, "ASC"),
            };
            let column = match field {
                "date" => "t.date",
                "amount" => "t.amount",
                "type" => "t.type",
                _ => return None,
            };
            Some(format!("{} {}", column, direction))
        })
        .collect();

    if terms.is_empty() {
        DEFAULT_ORDERING.to_string()
    } else {
        // Stable pages when the requested keys tie
        format!("{}, {}", terms.join(", "), DEFAULT_ORDERING)
    }
}
