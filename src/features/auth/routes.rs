use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh_token))
        .with_state(service)
}

/// Protected auth routes (require JWT authentication)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handlers::get_me))
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::middleware::auth_middleware;
    use crate::features::auth::services::TokenService;
    use crate::features::auth::JwtValidator;
    use crate::features::categories::{routes as category_routes, services::CategoryService};
    use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
    use crate::features::transactions::{routes as transaction_routes, services::TransactionService};
    use crate::features::users::services::UserService;
    use crate::shared::test_helpers::{lazy_pool, test_auth_config};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use sqlx::PgPool;

    fn app(pool: PgPool) -> Router {
        let config = test_auth_config();
        let validator = Arc::new(JwtValidator::new(&config));
        let users = Arc::new(UserService::new(pool.clone(), config.bcrypt_cost));
        let tokens = Arc::new(TokenService::new(
            pool.clone(),
            Arc::clone(&validator),
            &config,
        ));
        let auth = Arc::new(AuthService::new(users, tokens, config.bcrypt_cost));
        let categories = Arc::new(CategoryService::new(pool.clone()));

        let protected = Router::new()
            .merge(protected_routes(Arc::clone(&auth)))
            .merge(category_routes::routes(Arc::clone(&categories)))
            .merge(transaction_routes::routes(Arc::new(TransactionService::new(
                pool.clone(),
                categories,
            ))))
            .merge(dashboard_routes::routes(Arc::new(DashboardService::new(
                pool,
            ))))
            .route_layer(axum::middleware::from_fn_with_state(
                validator,
                auth_middleware,
            ));

        Router::new().merge(public_routes(auth)).merge(protected)
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_the_store() {
        let server = TestServer::new(app(lazy_pool())).unwrap();

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "ana",
                "email": "not-an-email",
                "password": "short",
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_token() {
        let server = TestServer::new(app(lazy_pool())).unwrap();

        for path in ["/api/auth/me", "/api/categories", "/api/transactions", "/api/dashboard"] {
            server.get(path).await.assert_status_unauthorized();
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_register_login_and_record_an_expense(pool: PgPool) {
        let server = TestServer::new(app(pool)).unwrap();

        server
            .post("/api/auth/register")
            .json(&json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": "correct-horse",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let login: Value = server
            .post("/api/auth/login")
            .json(&json!({ "email": "ana@example.com", "password": "correct-horse" }))
            .await
            .json();
        let token = login["data"]["access_token"].as_str().unwrap().to_string();

        let category: Value = server
            .post("/api/categories")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Groceries" }))
            .await
            .json();

        server
            .post("/api/transactions")
            .authorization_bearer(&token)
            .json(&json!({
                "type": "expense",
                "amount": "42.50",
                "category": category["data"]["id"],
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let summary: Value = server
            .get("/api/dashboard")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(
            summary["data"],
            json!({ "total_income": "0.00", "total_expense": "42.50", "balance": "-42.50" })
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_logged_out_refresh_token_is_rejected(pool: PgPool) {
        let server = TestServer::new(app(pool)).unwrap();

        let registered: Value = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "ben",
                "email": "ben@example.com",
                "password": "correct-horse",
            }))
            .await
            .json();
        let access = registered["data"]["access_token"].as_str().unwrap().to_string();
        let refresh = registered["data"]["refresh_token"].as_str().unwrap().to_string();

        server
            .post("/api/auth/logout")
            .authorization_bearer(&access)
            .json(&json!({ "refresh_token": refresh }))
            .await
            .assert_status(StatusCode::RESET_CONTENT);

        server
            .post("/api/auth/refresh")
            .json(&json!({ "refresh_token": refresh }))
            .await
            .assert_status_unauthorized();
    }
}
