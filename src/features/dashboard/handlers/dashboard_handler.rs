use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::{FinancialSummaryDto, SummaryRangeQuery};
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Income, expense and balance for the caller
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(SummaryRangeQuery),
    responses(
        (status = 200, description = "Financial summary", body = ApiResponse<FinancialSummaryDto>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_summary(
    user: AuthenticatedUser,
    State(service): State<Arc<DashboardService>>,
    AppQuery(range): AppQuery<SummaryRangeQuery>,
) -> Result<Json<ApiResponse<FinancialSummaryDto>>, AppError> {
    let summary = service
        .financial_summary(user.user_id, range.start, range.end)
        .await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}
