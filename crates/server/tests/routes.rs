use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use ledger::Ledger;
use migration::MigratorTrait;
use server::{Mailer, ServerState, router};

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    // Points at nothing; only the email endpoint ever dials it.
    let mailer = Mailer::new(
        "localhost",
        2525,
        String::new(),
        String::new(),
        "reports@centavo.test",
    )
    .unwrap();
    router(ServerState {
        ledger: Arc::new(ledger),
        mailer,
    })
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register_and_login(app: &Router) -> String {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "hunter2",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": "alice@example.com",
                "password": "hunter2",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_category(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/categories",
            Some(token),
            Some(json!({ "name": name, "kind": "expense" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_profile_round_trip() {
    let app = test_router().await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "hunter2",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password").is_none());

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "hunter2" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, request("GET", "/api/auth/profile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = test_router().await;
    register_and_login(&app).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Imposter",
                "email": "alice@example.com",
                "password": "hunter2",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("alice@example.com"));

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Bob",
                "email": "not-an-email",
                "password": "hunter2",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn protected_routes_require_a_live_token() {
    let app = test_router().await;

    let (status, _) = send(&app, request("GET", "/api/dashboard/stats", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request("GET", "/api/dashboard/stats", Some("garbage"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_presented_token() {
    let app = test_router().await;
    let token = register_and_login(&app).await;

    let (status, body) = send(&app, request("POST", "/api/auth/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "successfully logged out");

    let (status, _) = send(&app, request("GET", "/api/auth/profile", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn category_and_entry_flow() {
    let app = test_router().await;
    let token = register_and_login(&app).await;
    let category_id = create_category(&app, &token, "Groceries").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/expenses",
            Some(&token),
            Some(json!({
                "description": "Market",
                "amount_cents": 3500,
                "date": "2024-06-10",
                "kind": "expense",
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amount_cents"], 3500);
    let entry_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/expenses?month=6&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/api/expenses/{entry_id}"),
            Some(&token),
            Some(json!({ "amount_cents": 4200 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount_cents"], 4200);
    assert_eq!(body["description"], "Market");

    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/expenses/{entry_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "expense deleted");

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/expenses/{entry_id}"),
            Some(&token),
            Some(json!({ "amount_cents": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn entry_listing_requires_year_with_month() {
    let app = test_router().await;
    let token = register_and_login(&app).await;

    let (status, body) = send(&app, request("GET", "/api/expenses?month=6", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn process_monthly_posts_templates_and_reports_the_count() {
    let app = test_router().await;
    let token = register_and_login(&app).await;
    let category_id = create_category(&app, &token, "Housing").await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/fixed-expenses",
            Some(&token),
            Some(json!({
                "description": "Rent",
                "amount_cents": 90000,
                "day_of_month": 5,
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/fixed-expenses/process-monthly?month=3&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 fixed expenses processed");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/fixed-expenses/process-monthly?month=3&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "0 fixed expenses processed");
}

#[tokio::test]
async fn income_endpoints_round_trip() {
    let app = test_router().await;
    let token = register_and_login(&app).await;

    let (status, body) = send(&app, request("GET", "/api/income", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fixed_amount_cents"], 0);

    let (status, body) = send(
        &app,
        request(
            "PUT",
            "/api/income",
            Some(&token),
            Some(json!({ "fixed_amount_cents": 100000 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fixed_amount_cents"], 100000);
    assert_eq!(body["bonus_amount_cents"], 0);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/income/variable",
            Some(&token),
            Some(json!({ "description": "Freelance", "amount_cents": 30000 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_active"], true);
    let line_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/income/variable/{line_id}"),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "variable income deleted");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/income/fixed",
            Some(&token),
            Some(json!({ "description": "Pension", "amount_cents": 15000 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["description"], "Pension");
}

#[tokio::test]
async fn dashboard_endpoints_aggregate_and_validate() {
    let app = test_router().await;
    let token = register_and_login(&app).await;
    let category_id = create_category(&app, &token, "Groceries").await;

    let today = chrono::Utc::now().date_naive();
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/expenses",
            Some(&token),
            Some(json!({
                "description": "Market",
                "amount_cents": 1500,
                "date": today.to_string(),
                "kind": "expense",
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request("GET", "/api/dashboard/stats", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_expense_cents"], 1500);
    assert_eq!(body["active_categories"], 1);
    assert_eq!(
        body["total_balance_cents"].as_i64().unwrap(),
        body["total_income_cents"].as_i64().unwrap() - 1500
    );

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/dashboard/recent-transactions",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        request(
            "GET",
            "/api/dashboard/recent-transactions?limit=0",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        request("GET", "/api/dashboard/all-transactions", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn analytics_endpoints_summarize_and_chart() {
    let app = test_router().await;
    let token = register_and_login(&app).await;
    let category_id = create_category(&app, &token, "Groceries").await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/expenses",
            Some(&token),
            Some(json!({
                "description": "Market",
                "amount_cents": 2000,
                "date": "2024-03-10",
                "kind": "expense",
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/analytics/summary?month=3&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_expenses_cents"], 2000);
    assert_eq!(body["total_income_cents"], 0);

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/analytics/chart-data?metric=categories&month=3&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labels"], json!(["Groceries"]));
    assert_eq!(body["values"], json!([2000]));

    let (status, _) = send(
        &app,
        request(
            "GET",
            "/api/analytics/chart-data?metric=bogus&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_endpoints_return_json_and_pdf() {
    let app = test_router().await;
    let token = register_and_login(&app).await;
    let category_id = create_category(&app, &token, "Groceries").await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/expenses",
            Some(&token),
            Some(json!({
                "description": "Market",
                "amount_cents": 2000,
                "date": "2024-06-10",
                "kind": "expense",
                "category_id": category_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        request(
            "GET",
            "/api/reports/generate?kind=monthly&month=6&year=2024",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "monthly");
    assert_eq!(body["total_expense_cents"], 2000);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/reports/pdf?kind=monthly&month=6&year=2024",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap(),
        "application/pdf"
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("report_6_2024.pdf")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn report_email_validates_the_recipient() {
    let app = test_router().await;
    let token = register_and_login(&app).await;

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/reports/email",
            Some(&token),
            Some(json!({ "email": "not an address", "kind": "monthly" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing listens on the configured relay port.
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/reports/email",
            Some(&token),
            Some(json!({ "email": "someone@example.com", "kind": "monthly" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "failed to deliver the report email");
}
