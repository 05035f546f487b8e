use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::FinancialSummaryDto;

/// Read-only aggregates over a user's transactions
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Income and expense totals for `user_id`, optionally bounded by
    /// `start <= date <= end`. Empty ranges sum to zero.
    pub async fn financial_summary(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<FinancialSummaryDto> {
        let (total_income, total_expense) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(t.amount) FILTER (WHERE t.type = 'income'), 0) AS total_income,
                COALESCE(SUM(t.amount) FILTER (WHERE t.type = 'expense'), 0) AS total_expense
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE c.user_id = $1
              AND ($2::date IS NULL OR t.date >= $2)
              AND ($3::date IS NULL OR t.date <= $3)
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute financial summary: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(FinancialSummaryDto::from_totals(total_income, total_expense))
    }
}
