use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::transactions::handlers;
use crate::features::transactions::services::TransactionService;

pub fn routes(service: Arc<TransactionService>) -> Router {
    Router::new()
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/api/transactions/by-category", get(handlers::by_category))
        .route(
            "/api/transactions/{id}",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .patch(handlers::patch_transaction)
                .delete(handlers::delete_transaction),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::categories::{routes as category_routes, services::CategoryService};
    use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
    use crate::features::users::models::{CreateUser, UserRole};
    use crate::features::users::services::UserService;
    use crate::shared::test_helpers::{authenticated_user, lazy_pool, with_user_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn app(pool: PgPool) -> Router {
        let categories = Arc::new(CategoryService::new(pool.clone()));
        Router::new()
            .merge(category_routes::routes(Arc::clone(&categories)))
            .merge(routes(Arc::new(TransactionService::new(
                pool.clone(),
                categories,
            ))))
            .merge(dashboard_routes::routes(Arc::new(DashboardService::new(
                pool,
            ))))
    }

    fn server_as(pool: PgPool, user: AuthenticatedUser) -> TestServer {
        TestServer::new(with_user_auth(app(pool), user)).unwrap()
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let server = server_as(lazy_pool(), authenticated_user(UserRole::User));

        let response = server
            .post("/api/transactions")
            .json(&json!({
                "type": "expense",
                "amount": "0.00",
                "category": Uuid::new_v4(),
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["errors"][0].as_str().unwrap().starts_with("amount:"));
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let server = server_as(lazy_pool(), authenticated_user(UserRole::User));

        let response = server
            .post("/api/transactions")
            .json(&json!({
                "type": "transfer",
                "amount": "10.00",
                "category": Uuid::new_v4(),
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_malformed_filter_is_rejected() {
        let server = server_as(lazy_pool(), authenticated_user(UserRole::User));

        let response = server
            .get("/api/transactions")
            .add_query_param("date_after", "yesterday")
            .await;

        response.assert_status_bad_request();
    }

    async fn seed_user(pool: &PgPool, username: &str) -> AuthenticatedUser {
        let user = UserService::new(pool.clone(), 4)
            .create(CreateUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "x".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await
            .unwrap();
        AuthenticatedUser::from(&user)
    }

    async fn create_category(server: &TestServer, name: &str) -> String {
        let response = server
            .post("/api/categories")
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn create_transaction(
        server: &TestServer,
        category: &str,
        kind: &str,
        amount: &str,
    ) -> Value {
        let response = server
            .post("/api/transactions")
            .json(&json!({
                "type": kind,
                "amount": amount,
                "date": "2024-03-30",
                "category": category,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_expense_flows_into_summary(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let server = server_as(pool, ana);

        let groceries = create_category(&server, "Groceries").await;
        let created = create_transaction(&server, &groceries, "expense", "42.5").await;
        assert_eq!(created["amount"], "42.50");
        assert_eq!(created["category_name"], "Groceries");

        let summary: Value = server.get("/api/dashboard").await.json();
        assert_eq!(summary["data"]["total_income"], "0.00");
        assert_eq!(summary["data"]["total_expense"], "42.50");
        assert_eq!(summary["data"]["balance"], "-42.50");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_category_names_are_unique_per_user_ignoring_case(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let ben = seed_user(&pool, "ben").await;
        let ana_server = server_as(pool.clone(), ana);
        let ben_server = server_as(pool, ben);

        create_category(&ana_server, "Rent").await;

        let duplicate = ana_server
            .post("/api/categories")
            .json(&json!({ "name": "rent" }))
            .await;
        duplicate.assert_status_bad_request();
        assert_eq!(
            duplicate.json::<Value>()["errors"][0],
            "name: You already have a category with this name."
        );

        create_category(&ben_server, "Rent").await;
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_other_users_objects_are_not_found(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let ben = seed_user(&pool, "ben").await;
        let ana_server = server_as(pool.clone(), ana);
        let ben_server = server_as(pool, ben);

        let rent = create_category(&ana_server, "Rent").await;
        let txn = create_transaction(&ana_server, &rent, "expense", "800.00").await;
        let txn_id = txn["id"].as_str().unwrap();

        ben_server
            .get(&format!("/api/categories/{}", rent))
            .await
            .assert_status_not_found();
        ben_server
            .get(&format!("/api/transactions/{}", txn_id))
            .await
            .assert_status_not_found();
        ben_server
            .delete(&format!("/api/transactions/{}", txn_id))
            .await
            .assert_status_not_found();

        let own = create_category(&ben_server, "Mine").await;
        ben_server
            .put(&format!("/api/categories/{}", rent))
            .json(&json!({ "name": "Taken" }))
            .await
            .assert_status_not_found();
        ben_server
            .patch(&format!("/api/categories/{}", rent))
            .json(&json!({ "name": "Taken" }))
            .await
            .assert_status_not_found();
        ben_server
            .delete(&format!("/api/categories/{}", rent))
            .await
            .assert_status_not_found();
        ben_server
            .put(&format!("/api/transactions/{}", txn_id))
            .json(&json!({
                "type": "income",
                "amount": "1.00",
                "date": "2024-03-30",
                "category": own,
            }))
            .await
            .assert_status_not_found();
        ben_server
            .patch(&format!("/api/transactions/{}", txn_id))
            .json(&json!({ "amount": "1.00" }))
            .await
            .assert_status_not_found();

        let still_rent: Value = ana_server
            .get(&format!("/api/categories/{}", rent))
            .await
            .json();
        assert_eq!(still_rent["data"]["name"], "Rent");
        let still_txn: Value = ana_server
            .get(&format!("/api/transactions/{}", txn_id))
            .await
            .json();
        assert_eq!(still_txn["data"]["amount"], "800.00");
        assert_eq!(still_txn["data"]["type"], "expense");

        let foreign = ben_server
            .post("/api/transactions")
            .json(&json!({ "type": "expense", "amount": "1.00", "category": rent }))
            .await;
        foreign.assert_status_bad_request();
        assert_eq!(
            foreign.json::<Value>()["errors"][0],
            "category: Cannot use a category you don't own."
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_category_in_use_cannot_be_deleted(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let server = server_as(pool, ana);

        let food = create_category(&server, "Food").await;
        let txn = create_transaction(&server, &food, "expense", "5.00").await;

        server
            .delete(&format!("/api/categories/{}", food))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .delete(&format!("/api/transactions/{}", txn["id"].as_str().unwrap()))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format!("/api/categories/{}", food))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_by_category_sums_and_counts(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let server = server_as(pool, ana);

        let food = create_category(&server, "Food").await;
        let travel = create_category(&server, "Travel").await;
        create_category(&server, "Unused").await;
        create_transaction(&server, &food, "expense", "10.00").await;
        create_transaction(&server, &food, "income", "5.00").await;
        create_transaction(&server, &travel, "income", "3.00").await;

        let body: Value = server.get("/api/transactions/by-category").await.json();
        let rows = body["data"].as_array().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["category__name"], "Food");
        assert_eq!(rows[0]["total_amount"], "15.00");
        assert_eq!(rows[0]["txn_count"], 2);
        assert_eq!(rows[1]["category__name"], "Travel");
        assert_eq!(rows[1]["total_amount"], "3.00");
        assert_eq!(rows[1]["txn_count"], 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_pages_hold_five_and_overflow_is_not_found(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let server = server_as(pool, ana);

        let food = create_category(&server, "Food").await;
        for amount in ["1.00", "2.00", "3.00", "4.00", "5.00", "6.00"] {
            create_transaction(&server, &food, "expense", amount).await;
        }

        let first: Value = server
            .get("/api/transactions")
            .add_query_param("ordering", "amount")
            .await
            .json();
        assert_eq!(first["data"].as_array().unwrap().len(), 5);
        assert_eq!(first["data"][0]["amount"], "1.00");
        assert_eq!(first["meta"]["total"], 6);

        let second: Value = server
            .get("/api/transactions")
            .add_query_param("page", 2)
            .await
            .json();
        assert_eq!(second["data"].as_array().unwrap().len(), 1);

        server
            .get("/api/transactions")
            .add_query_param("page", 3)
            .await
            .assert_status_not_found();
    }

    async fn record(server: &TestServer, body: Value) -> Value {
        let response = server.post("/api/transactions").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    /// Amounts of the listed transactions, smallest first
    async fn amounts(server: &TestServer, params: &[(&str, &str)]) -> Vec<String> {
        let mut request = server
            .get("/api/transactions")
            .add_query_param("ordering", "amount");
        for (key, value) in params {
            request = request.add_query_param(key, value);
        }
        let response = request.await;
        response.assert_status_ok();

        response.json::<Value>()["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["amount"].as_str().unwrap().to_string())
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_list_filters(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let ben = seed_user(&pool, "ben").await;
        let server = server_as(pool.clone(), ana);
        let ben_server = server_as(pool, ben);

        let food = create_category(&server, "Food").await;
        let travel = create_category(&server, "Travel").await;
        for body in [
            json!({ "type": "expense", "amount": "10.00", "date": "2024-03-01", "note": "Weekly GROCERIES", "category": food }),
            json!({ "type": "income", "amount": "25.00", "date": "2024-03-10", "note": "refund", "category": food }),
            json!({ "type": "expense", "amount": "120.00", "date": "2024-03-20", "note": "Train tickets", "category": travel }),
            json!({ "type": "expense", "amount": "3.50", "date": "2024-03-25", "category": travel }),
        ] {
            record(&server, body).await;
        }

        assert_eq!(
            amounts(&server, &[("date_after", "2024-03-10")]).await,
            ["3.50", "25.00", "120.00"]
        );
        assert_eq!(
            amounts(&server, &[("date_before", "2024-03-10")]).await,
            ["10.00", "25.00"]
        );
        assert_eq!(
            amounts(&server, &[("amount_min", "5"), ("amount_max", "25.00")]).await,
            ["10.00", "25.00"]
        );
        assert_eq!(
            amounts(&server, &[("type", "expense")]).await,
            ["3.50", "10.00", "120.00"]
        );
        assert_eq!(amounts(&server, &[("type", "I")]).await, ["25.00"]);
        assert_eq!(
            amounts(&server, &[("category", travel.as_str())]).await,
            ["3.50", "120.00"]
        );
        assert_eq!(
            amounts(&server, &[("category_id", food.as_str())]).await,
            ["10.00", "25.00"]
        );
        assert_eq!(
            amounts(&server, &[("category_name", "TRAV")]).await,
            ["3.50", "120.00"]
        );
        assert_eq!(amounts(&server, &[("note", "groceries")]).await, ["10.00"]);
        assert_eq!(amounts(&server, &[("note", "TICKET")]).await, ["120.00"]);
        assert_eq!(
            amounts(&server, &[("date_after", "2024-03-05"), ("type", "expense")]).await,
            ["3.50", "120.00"]
        );
        assert_eq!(
            amounts(&server, &[("amount_min", ""), ("date_after", "")]).await,
            ["3.50", "10.00", "25.00", "120.00"]
        );

        let bens = create_category(&ben_server, "Ben's").await;
        server
            .get("/api/transactions")
            .add_query_param("category", &bens)
            .await
            .assert_status_bad_request();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_patch_can_clear_note(pool: PgPool) {
        let ana = seed_user(&pool, "ana").await;
        let server = server_as(pool, ana);

        let food = create_category(&server, "Food").await;
        let txn = record(
            &server,
            json!({ "type": "expense", "amount": "4.00", "note": "coffee", "category": food }),
        )
        .await;
        let path = format!("/api/transactions/{}", txn["id"].as_str().unwrap());

        let kept: Value = server
            .patch(&path)
            .json(&json!({ "amount": "4.50" }))
            .await
            .json();
        assert_eq!(kept["data"]["note"], "coffee");
        assert_eq!(kept["data"]["amount"], "4.50");

        let cleared: Value = server
            .patch(&path)
            .json(&json!({ "note": null }))
            .await
            .json();
        assert_eq!(cleared["data"]["note"], Value::Null);
        assert_eq!(cleared["data"]["amount"], "4.50");
    }
}
