use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use minijinja::Environment;
use serde::Serialize;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::services::DashboardService;
use crate::features::reports::period::ReportPeriod;
use crate::features::reports::services::fan_out::UserReportJob;
use crate::features::transactions::models::Transaction;
use crate::features::transactions::services::TransactionService;
use crate::features::users::services::UserService;
use crate::modules::mail::{EmailMessage, Mailer};
use crate::shared::constants::REPORT_RECENT_TRANSACTIONS;
use crate::shared::money::to_money;

const SUMMARY_TEMPLATE_NAME: &str = "summary_report.txt";
const SUMMARY_TEMPLATE: &str = include_str!("../../../../templates/email/summary_report.txt");

static EMAIL_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn email_environment() -> &'static Environment<'static> {
    EMAIL_ENV.get_or_init(|| {
        let mut env = Environment::new();
        if let Err(e) = env.add_template(SUMMARY_TEMPLATE_NAME, SUMMARY_TEMPLATE) {
            tracing::warn!("Failed to load email template {}: {}", SUMMARY_TEMPLATE_NAME, e);
        }
        env
    })
}

/// One line of the "Recent Transactions" block
#[derive(Debug, Clone, Serialize)]
pub struct RecentTransactionLine {
    pub kind: &'static str,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub note: Option<String>,
}

impl From<&Transaction> for RecentTransactionLine {
    fn from(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.transaction_type.label(),
            amount: to_money(transaction.amount).to_string(),
            date: transaction.date.format("%Y-%m-%d").to_string(),
            category: transaction.category_name.clone(),
            note: transaction.note.clone().filter(|n| !n.is_empty()),
        }
    }
}

/// Values interpolated into the summary email
#[derive(Debug, Clone, Serialize)]
pub struct SummaryEmailContext {
    pub greeting_name: String,
    pub period: ReportPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_income: String,
    pub total_expense: String,
    pub balance: String,
    pub recent: Vec<RecentTransactionLine>,
    pub product_name: String,
}

pub fn summary_subject(period: ReportPeriod, product_name: &str) -> String {
    format!(
        "Your {} Financial Summary Report - {}",
        period.title(),
        product_name
    )
}

pub fn render_summary(context: &SummaryEmailContext) -> Result<String> {
    email_environment()
        .get_template(SUMMARY_TEMPLATE_NAME)
        .and_then(|template| template.render(context))
        .map_err(|e| AppError::Internal(format!("Failed to render summary email: {}", e)))
}

/// Builds and mails one user's periodic financial summary
pub struct SummaryReportService {
    users: Arc<UserService>,
    dashboard: Arc<DashboardService>,
    transactions: Arc<TransactionService>,
    mailer: Arc<dyn Mailer>,
    product_name: String,
}

impl SummaryReportService {
    pub fn new(
        users: Arc<UserService>,
        dashboard: Arc<DashboardService>,
        transactions: Arc<TransactionService>,
        mailer: Arc<dyn Mailer>,
        product_name: String,
    ) -> Self {
        Self {
            users,
            dashboard,
            transactions,
            mailer,
            product_name,
        }
    }

    /// Send the `period` summary covering the window that ends today.
    ///
    /// A missing user or an unrecognised period is logged and skipped.
    /// Delivery failures are logged and do not surface as errors.
    pub async fn send_summary(&self, user_id: Uuid, period: &str) -> Result<()> {
        self.send_summary_ending(user_id, period, Local::now().date_naive())
            .await
    }

    pub async fn send_summary_ending(
        &self,
        user_id: Uuid,
        period: &str,
        end_date: NaiveDate,
    ) -> Result<()> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            tracing::error!("User {} not found, skipping summary report", user_id);
            return Ok(());
        };

        let Some(period) = ReportPeriod::parse(period) else {
            tracing::warn!(
                "Unknown report period '{}' for user {}, no report generated",
                period,
                user_id
            );
            return Ok(());
        };

        let (start_date, end_date) = period.window(end_date);

        let summary = self
            .dashboard
            .financial_summary(user.id, Some(start_date), Some(end_date))
            .await?;
        let recent = self
            .transactions
            .recent_in_window(user.id, start_date, end_date, REPORT_RECENT_TRANSACTIONS)
            .await?;

        let context = SummaryEmailContext {
            greeting_name: user.greeting_name().to_string(),
            period,
            start_date,
            end_date,
            total_income: summary.total_income.to_string(),
            total_expense: summary.total_expense.to_string(),
            balance: summary.balance.to_string(),
            recent: recent.iter().map(RecentTransactionLine::from).collect(),
            product_name: self.product_name.clone(),
        };

        let message = EmailMessage {
            to: vec![user.email.clone()],
            subject: summary_subject(period, &self.product_name),
            body: render_summary(&context)?,
        };

        match self.mailer.send(&message).await {
            Ok(()) => tracing::info!("Sent {} summary report to {}", period, user.email),
            Err(e) => tracing::error!(
                "Failed to send {} summary report to {}: {}",
                period,
                user.email,
                e
            ),
        }

        Ok(())
    }
}

/// Per-user job that sends one fixed period
pub struct SummaryReportJob {
    service: Arc<SummaryReportService>,
    period: String,
}

impl SummaryReportJob {
    pub fn new(service: Arc<SummaryReportService>, period: impl Into<String>) -> Self {
        Self {
            service,
            period: period.into(),
        }
    }
}

#[async_trait]
impl UserReportJob for SummaryReportJob {
    async fn run(&self, user_id: Uuid) -> Result<()> {
        self.service.send_summary(user_id, &self.period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::categories::services::CategoryService;
    use crate::features::transactions::dtos::TransactionRequestDto;
    use crate::features::transactions::models::TransactionType;
    use crate::features::users::models::CreateUser;
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use std::sync::Mutex;

    fn context(recent: Vec<RecentTransactionLine>) -> SummaryEmailContext {
        SummaryEmailContext {
            greeting_name: "Ana".to_string(),
            period: ReportPeriod::Weekly,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 24).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            total_income: "100.00".to_string(),
            total_expense: "42.50".to_string(),
            balance: "57.50".to_string(),
            recent,
            product_name: "Kantong".to_string(),
        }
    }

    #[test]
    fn test_subject_names_period_and_product() {
        assert_eq!(
            summary_subject(ReportPeriod::Monthly, "Kantong"),
            "Your Monthly Financial Summary Report - Kantong"
        );
    }

    #[test]
    fn test_render_totals_and_recent_lines() {
        let body = render_summary(&context(vec![
            RecentTransactionLine {
                kind: "Expense",
                amount: "42.50".to_string(),
                date: "2024-03-30".to_string(),
                category: "Groceries".to_string(),
                note: Some("weekly shop".to_string()),
            },
            RecentTransactionLine {
                kind: "Income",
                amount: "100.00".to_string(),
                date: "2024-03-25".to_string(),
                category: "Salary".to_string(),
                note: None,
            },
        ]))
        .unwrap();

        assert!(body.starts_with("Dear Ana,"));
        assert!(body.contains("from 2024-03-24 to 2024-03-31"));
        assert!(body.contains("Total Income: $100.00"));
        assert!(body.contains("Total Expenses: $42.50"));
        assert!(body.contains("Net Balance Change (Income - Expenses): $57.50"));
        assert!(body.contains("Recent Transactions:"));
        assert!(body.contains("- Expense: $42.50 on 2024-03-30 (Groceries) - weekly shop"));
        assert!(body.contains("- Income: $100.00 on 2024-03-25 (Salary) - No note"));
        assert!(!body.contains("No transactions recorded"));
        assert!(body.contains("The Kantong Team"));
    }

    #[test]
    fn test_render_without_transactions() {
        let body = render_summary(&context(Vec::new())).unwrap();

        assert!(body.contains("No transactions recorded for this period."));
        assert!(!body.contains("Recent Transactions:"));
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<()> {
            Err(AppError::ExternalServiceError("smtp down".to_string()))
        }
    }

    fn service(pool: &PgPool, mailer: Arc<dyn Mailer>) -> SummaryReportService {
        let categories = Arc::new(CategoryService::new(pool.clone()));
        SummaryReportService::new(
            Arc::new(UserService::new(pool.clone(), 4)),
            Arc::new(DashboardService::new(pool.clone())),
            Arc::new(TransactionService::new(pool.clone(), Arc::clone(&categories))),
            mailer,
            "Kantong".to_string(),
        )
    }

    async fn seed_user(pool: &PgPool) -> AuthenticatedUser {
        let user = UserService::new(pool.clone(), 4)
            .create(CreateUser {
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
                password_hash: "x".to_string(),
                first_name: "Ana".to_string(),
                last_name: String::new(),
            })
            .await
            .unwrap();
        AuthenticatedUser::from(&user)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_sends_weekly_summary(pool: PgPool) {
        let actor = seed_user(&pool).await;
        let categories = Arc::new(CategoryService::new(pool.clone()));
        let category = categories
            .create(&actor, "Groceries".to_string())
            .await
            .unwrap();
        let transactions = TransactionService::new(pool.clone(), categories);
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        for (amount, date) in [("42.50", end), ("9.99", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())] {
            transactions
                .create(
                    &actor,
                    TransactionRequestDto {
                        transaction_type: TransactionType::Expense,
                        amount: amount.parse::<Decimal>().unwrap(),
                        date: Some(date),
                        note: None,
                        category: category.id,
                    },
                )
                .await
                .unwrap();
        }

        let mailer = Arc::new(RecordingMailer::default());
        service(&pool, mailer.clone())
            .send_summary_ending(actor.user_id, "weekly", end)
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["ana@example.com".to_string()]);
        assert_eq!(
            sent[0].subject,
            "Your Weekly Financial Summary Report - Kantong"
        );
        assert!(sent[0].body.contains("Total Expenses: $42.50"));
        assert!(sent[0].body.contains("Net Balance Change (Income - Expenses): $-42.50"));
        assert!(sent[0].body.contains("(Groceries) - No note"));
        assert!(!sent[0].body.contains("9.99"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unknown_period_and_missing_user_send_nothing(pool: PgPool) {
        let actor = seed_user(&pool).await;
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(&pool, mailer.clone());

        service.send_summary(actor.user_id, "daily").await.unwrap();
        service.send_summary(actor.user_id, "Weekly").await.unwrap();
        service.send_summary(Uuid::new_v4(), "weekly").await.unwrap();

        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_delivery_failure_is_swallowed(pool: PgPool) {
        let actor = seed_user(&pool).await;

        let result = service(&pool, Arc::new(FailingMailer))
            .send_summary(actor.user_id, "monthly")
            .await;

        assert!(result.is_ok());
    }
}
