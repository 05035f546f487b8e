use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::transactions::dtos::{
    CategoryTotalDto, TransactionFilterQuery, TransactionRequestDto, TransactionResponseDto,
    UpdateTransactionDto,
};
use crate::features::transactions::services::TransactionService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List the caller's transactions
///
/// Filterable, sortable and paginated (5 per page by default).
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "One page of transactions", body = ApiResponse<Vec<TransactionResponseDto>>),
        (status = 400, description = "Malformed filter or category not owned by the caller"),
        (status = 404, description = "Invalid page")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_transactions(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
    AppQuery(filter): AppQuery<TransactionFilterQuery>,
    AppQuery(pagination): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionResponseDto>>>> {
    let (transactions, total) = service.list(&user, &filter, &pagination).await?;
    let data = transactions
        .into_iter()
        .map(TransactionResponseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta::paginated(&pagination, total)),
    )))
}

/// Record a transaction
#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = TransactionRequestDto,
    responses(
        (status = 201, description = "Transaction created", body = ApiResponse<TransactionResponseDto>),
        (status = 400, description = "Invalid amount or category not owned by the caller")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_transaction(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
    AppJson(dto): AppJson<TransactionRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponseDto>>)> {
    dto.validate()?;

    let transaction = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(transaction.into()), None, None)),
    ))
}

/// Get a transaction by id
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction found", body = ApiResponse<TransactionResponseDto>),
        (status = 404, description = "Transaction not found")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_transaction(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransactionResponseDto>>> {
    let transaction = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(transaction.into()), None, None)))
}

/// Replace a transaction
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = TransactionRequestDto,
    responses(
        (status = 200, description = "Transaction updated", body = ApiResponse<TransactionResponseDto>),
        (status = 400, description = "Invalid amount or category not owned by the caller"),
        (status = 404, description = "Transaction not found")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_transaction(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<TransactionRequestDto>,
) -> Result<Json<ApiResponse<TransactionResponseDto>>> {
    dto.validate()?;

    let transaction = service.replace(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(transaction.into()), None, None)))
}

/// Partially update a transaction
#[utoipa::path(
    patch,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = UpdateTransactionDto,
    responses(
        (status = 200, description = "Transaction updated", body = ApiResponse<TransactionResponseDto>),
        (status = 400, description = "Invalid amount or category not owned by the caller"),
        (status = 404, description = "Transaction not found")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn patch_transaction(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTransactionDto>,
) -> Result<Json<ApiResponse<TransactionResponseDto>>> {
    dto.validate()?;

    let transaction = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(transaction.into()), None, None)))
}

/// Delete a transaction
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 404, description = "Transaction not found")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_transaction(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Totals per category
///
/// `total_amount` adds income and expense amounts together.
#[utoipa::path(
    get,
    path = "/api/transactions/by-category",
    responses(
        (status = 200, description = "Per-category totals ordered by category name", body = ApiResponse<Vec<CategoryTotalDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "transactions",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn by_category(
    user: AuthenticatedUser,
    State(service): State<Arc<TransactionService>>,
) -> Result<Json<ApiResponse<Vec<CategoryTotalDto>>>> {
    let rows: Vec<CategoryTotalDto> = service
        .by_category(user.user_id)
        .await?
        .into_iter()
        .map(CategoryTotalDto::from)
        .collect();
    let total = rows.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(rows),
        None,
        Some(Meta::total(total)),
    )))
}
