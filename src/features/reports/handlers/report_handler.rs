use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::reports::dtos::{DispatchReportsDto, DispatchReportsResponseDto};
use crate::features::reports::services::ReportDispatcher;
use crate::shared::types::ApiResponse;

/// Queue a summary report for every active user
#[utoipa::path(
    post,
    path = "/api/admin/reports/dispatch",
    request_body = DispatchReportsDto,
    responses(
        (status = 202, description = "Report jobs queued", body = ApiResponse<DispatchReportsResponseDto>),
        (status = 400, description = "Unknown period"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "reports",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dispatch_reports(
    RequireAdmin(admin): RequireAdmin,
    State(dispatcher): State<Arc<ReportDispatcher>>,
    AppJson(dto): AppJson<DispatchReportsDto>,
) -> Result<(StatusCode, Json<ApiResponse<DispatchReportsResponseDto>>)> {
    dto.validate()?;

    let period = dto
        .period
        .unwrap_or_else(|| dispatcher.default_period().to_string());
    let queued_users = dispatcher.spawn(&period).await?;

    tracing::info!(
        "Admin {} queued {} summary reports for {} users",
        admin.username,
        period,
        queued_users
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            Some(DispatchReportsResponseDto {
                period,
                queued_users,
            }),
            Some("Report jobs queued".to_string()),
            None,
        )),
    ))
}
