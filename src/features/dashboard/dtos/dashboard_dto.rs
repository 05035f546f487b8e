use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::money::{serialize_money, to_money};

/// Optional inclusive date range for the summary
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryRangeQuery {
    /// Include transactions dated on or after this day
    pub start: Option<NaiveDate>,
    /// Include transactions dated on or before this day
    pub end: Option<NaiveDate>,
}

/// Income, expense and their difference, as two-decimal strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FinancialSummaryDto {
    #[serde(serialize_with = "serialize_money")]
    #[schema(value_type = String, example = "0.00")]
    pub total_income: Decimal,
    #[serde(serialize_with = "serialize_money")]
    #[schema(value_type = String, example = "42.50")]
    pub total_expense: Decimal,
    #[serde(serialize_with = "serialize_money")]
    #[schema(value_type = String, example = "-42.50")]
    pub balance: Decimal,
}

impl FinancialSummaryDto {
    pub fn from_totals(total_income: Decimal, total_expense: Decimal) -> Self {
        let total_income = to_money(total_income);
        let total_expense = to_money(total_expense);
        Self {
            total_income,
            total_expense,
            balance: to_money(total_income - total_expense),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = FinancialSummaryDto::from_totals(Decimal::ZERO, Decimal::ZERO);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_income"], "0.00");
        assert_eq!(json["total_expense"], "0.00");
        assert_eq!(json["balance"], "0.00");
    }

    #[test]
    fn test_balance_is_income_minus_expense() {
        let summary = FinancialSummaryDto::from_totals(Decimal::ZERO, dec("42.50"));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_income"], "0.00");
        assert_eq!(json["total_expense"], "42.50");
        assert_eq!(json["balance"], "-42.50");
    }

    #[test]
    fn test_balance_is_exact_for_many_small_amounts() {
        let income = (0..9_999).fold(Decimal::ZERO, |acc, _| acc + dec("0.01"));
        let summary = FinancialSummaryDto::from_totals(income, dec("0.02"));

        assert_eq!(summary.balance, dec("99.97"));
        assert_eq!(summary.balance, summary.total_income - summary.total_expense);
    }
}
