use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Transaction direction, stored as the `transaction_type` enum.
///
/// The single-letter codes `I` and `E` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "I", alias = "Income")]
    Income,
    #[serde(alias = "E", alias = "Expense")]
    Expense,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

/// A transaction joined with the category it is filed under
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub category_id: Uuid,
    /// Owner of the category, and therefore of the transaction
    pub owner_id: Uuid,
    pub category_name: String,
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the per-category breakdown
#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub category_name: String,
    pub total_amount: Decimal,
    pub txn_count: i64,
}

/// Fields written on insert and full update
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub category_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}
