use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::transactions::models::{CategoryTotal, Transaction, TransactionType};
use crate::shared::money::serialize_money;
use crate::shared::validation::{empty_as_none, trimmed_opt, trimmed_patch};

/// Response DTO for transaction
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionResponseDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Fixed two-decimal string, e.g. "42.50"
    #[serde(serialize_with = "serialize_money")]
    #[schema(value_type = String, example = "42.50")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub category: Uuid,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponseDto {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            transaction_type: t.transaction_type,
            amount: t.amount,
            date: t.date,
            note: t.note,
            category: t.category_id,
            category_name: t.category_name,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Request DTO for creating or replacing a transaction
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TransactionRequestDto {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    #[validate(custom(function = "crate::shared::validation::validate_amount"))]
    #[schema(value_type = String, example = "42.50")]
    pub amount: Decimal,

    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    pub note: Option<String>,

    /// Category id; must be one of the caller's categories
    pub category: Uuid,
}

/// Request DTO for partially updating a transaction
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTransactionDto {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,

    #[validate(custom(function = "crate::shared::validation::validate_amount"))]
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "42.50")]
    pub amount: Option<Decimal>,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// `null` clears the note
    #[serde(default, deserialize_with = "trimmed_patch")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,

    #[serde(default)]
    pub category: Option<Uuid>,
}

/// Filters for the transaction listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilterQuery {
    /// Only transactions on or after this date
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_after: Option<NaiveDate>,
    /// Only transactions on or before this date
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_before: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>)]
    pub amount_min: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[param(value_type = Option<String>)]
    pub amount_max: Option<Decimal>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub transaction_type: Option<TransactionType>,
    /// One of the caller's category ids
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<Uuid>,
    /// Case-insensitive substring of the category name
    pub category_name: Option<String>,
    /// Case-insensitive substring of the note
    pub note: Option<String>,
    /// Older alias of `category`
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category_id: Option<Uuid>,
    /// Comma-separated list of `date`, `amount`, `type`; prefix `-` for descending
    pub ordering: Option<String>,
}

/// Sum and count of a user's transactions in one category
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryTotalDto {
    pub category: Uuid,
    #[serde(rename = "category__name")]
    pub category_name: String,
    /// Income and expense amounts added together
    #[serde(serialize_with = "serialize_money")]
    #[schema(value_type = String, example = "15.00")]
    pub total_amount: Decimal,
    pub txn_count: i64,
}

impl From<CategoryTotal> for CategoryTotalDto {
    fn from(row: CategoryTotal) -> Self {
        Self {
            category: row.category_id,
            category_name: row.category_name,
            total_amount: row.total_amount,
            txn_count: row.txn_count,
        }
    }
}
