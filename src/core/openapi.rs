use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::reports::{dtos as reports_dtos, handlers as reports_handlers};
use crate::features::transactions::{
    dtos as transactions_dtos, handlers as transactions_handlers, models as transactions_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::refresh_token,
        auth_handlers::logout,
        auth_handlers::get_me,
        // Users
        users_handlers::get_profile,
        users_handlers::update_profile,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::update_category,
        categories_handlers::patch_category,
        categories_handlers::delete_category,
        // Transactions
        transactions_handlers::list_transactions,
        transactions_handlers::create_transaction,
        transactions_handlers::by_category,
        transactions_handlers::get_transaction,
        transactions_handlers::update_transaction,
        transactions_handlers::patch_transaction,
        transactions_handlers::delete_transaction,
        // Dashboard
        dashboard_handlers::get_summary,
        // Reports (admin)
        reports_handlers::dispatch_reports,
    ),
    components(
        schemas(
            Meta,
            users_models::UserRole,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::RefreshTokenRequestDto,
            auth_dtos::RefreshTokenResponseDto,
            auth_dtos::AuthResponseDto,
            auth_dtos::MeResponseDto,
            ApiResponse<auth_dtos::AuthResponseDto>,
            ApiResponse<auth_dtos::RefreshTokenResponseDto>,
            ApiResponse<auth_dtos::MeResponseDto>,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::UserResponseDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryRequestDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Transactions
            transactions_models::TransactionType,
            transactions_dtos::TransactionResponseDto,
            transactions_dtos::TransactionRequestDto,
            transactions_dtos::UpdateTransactionDto,
            transactions_dtos::CategoryTotalDto,
            ApiResponse<transactions_dtos::TransactionResponseDto>,
            ApiResponse<Vec<transactions_dtos::TransactionResponseDto>>,
            ApiResponse<Vec<transactions_dtos::CategoryTotalDto>>,
            // Dashboard
            dashboard_dtos::FinancialSummaryDto,
            ApiResponse<dashboard_dtos::FinancialSummaryDto>,
            // Reports
            reports_dtos::DispatchReportsDto,
            reports_dtos::DispatchReportsResponseDto,
            ApiResponse<reports_dtos::DispatchReportsResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and token management"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "categories", description = "Per-user transaction categories"),
        (name = "transactions", description = "Income and expense records"),
        (name = "Dashboard", description = "Financial summary for the signed-in user"),
        (name = "reports", description = "Scheduled summary emails (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Kantong API",
        version = "0.1.0",
        description = "Personal finance tracking API",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_finance_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/auth/login",
            "/api/categories/{id}",
            "/api/transactions",
            "/api/transactions/by-category",
            "/api/dashboard",
            "/api/admin/reports/dispatch",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
