use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app_with_db() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, display_name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, display_name, password) VALUES (?, ?, ?)",
            vec![username.into(), display_name.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (server::app(engine, db.clone()), db)
}

fn basic(user: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {token}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "password"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn get(app: &Router, uri: &str, user: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, user, None).await
}

async fn post(app: &Router, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, user, Some(body)).await
}

/// alice creates a group, bob and carol join. Returns the group id.
async fn household(app: &Router) -> String {
    let (status, group) = post(app, "/groups", "alice", json!({"name": "Flat 4B"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let code = group["invite_code"].as_str().unwrap().to_lowercase();
    for user in ["bob", "carol"] {
        let (status, _) = post(app, "/groups/join", user, json!({"invite_code": code})).await;
        assert_eq!(status, StatusCode::OK);
    }
    group["id"].as_str().unwrap().to_string()
}

fn equal_expense(group_id: &str, title: &str, amount_minor: i64) -> Value {
    json!({
        "group_id": group_id,
        "title": title,
        "amount_minor": amount_minor,
        "payer": "alice",
        "split": {"mode": "equal", "members": ["alice", "bob", "carol"]},
    })
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_rejected() {
    let (app, _db) = app_with_db().await;

    let request = Request::builder()
        .uri("/groups")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/groups")
        .header(header::AUTHORIZATION, basic("alice", "pass"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_authenticated_user() {
    let (app, _db) = app_with_db().await;
    let (status, body) = get(&app, "/me", "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"username": "bob", "name": "Bob"}));
}

#[tokio::test]
async fn create_and_list_groups() {
    let (app, _db) = app_with_db().await;
    let (status, group) = post(
        &app,
        "/groups",
        "alice",
        json!({"name": "Flat 4B", "currency": "GBP"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["currency"], "GBP");
    assert_eq!(group["members"][0]["role"], "owner");

    let (status, body) = get(&app, "/groups", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"].as_array().unwrap().len(), 1);

    let (_, body) = get(&app, "/groups", "bob").await;
    assert!(body["groups"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn joining_twice_conflicts_and_unknown_code_is_404() {
    let (app, _db) = app_with_db().await;
    let (_, group) = post(&app, "/groups", "alice", json!({"name": "Flat"})).await;
    let code = group["invite_code"].as_str().unwrap();

    let (status, body) = post(&app, "/groups/join", "alice", json!({"invite_code": code})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = post(&app, "/groups/join", "bob", json!({"invite_code": "QQQQQQ"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expense_settlement_and_balances_flow() {
    let (app, _db) = app_with_db().await;
    let group_id = household(&app).await;
    let balances_uri = format!("/groups/{group_id}/balances");

    let mut groceries = equal_expense(&group_id, "Groceries", 9000);
    groceries["category"] = json!("food");
    let (status, expense) = post(&app, "/expenses", "alice", groceries).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["splits"].as_array().unwrap().len(), 3);

    let (status, balances) = get(&app, &balances_uri, "carol").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        balances["balances"],
        json!([
            {"username": "alice", "name": "Alice", "amount_minor": 6000},
            {"username": "bob", "name": "Bob", "amount_minor": -3000},
            {"username": "carol", "name": "Carol", "amount_minor": -3000},
        ])
    );
    assert_eq!(
        balances["debts"],
        json!([
            {
                "from": "bob",
                "from_name": "Bob",
                "to": "alice",
                "to_name": "Alice",
                "amount_minor": 3000,
            },
            {
                "from": "carol",
                "from_name": "Carol",
                "to": "alice",
                "to_name": "Alice",
                "amount_minor": 3000,
            },
        ])
    );

    let (status, _) = post(
        &app,
        "/settlements",
        "bob",
        json!({
            "group_id": group_id,
            "payer": "bob",
            "receiver": "alice",
            "amount_minor": 3000,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, balances) = get(&app, &balances_uri, "alice").await;
    let debts = balances["debts"].as_array().unwrap();
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0]["from"], "carol");
    assert_eq!(debts[0]["to"], "alice");
    assert_eq!(debts[0]["amount_minor"], 3000);

    let (status, body) = get(&app, &format!("/groups/{group_id}/settlements"), "carol").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settlements"].as_array().unwrap().len(), 1);

    let (status, detail) = get(&app, &format!("/groups/{group_id}"), "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["expenses"][0]["title"], "Groceries");
    assert_eq!(detail["group"]["members"].as_array().unwrap().len(), 3);

    let (status, summary) = get(&app, &format!("/groups/{group_id}/summary"), "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_minor"], 9000);
    assert_eq!(
        summary["by_category"],
        json!([{"category": "food", "amount_minor": 9000}])
    );
}

#[tokio::test]
async fn validation_errors_are_422() {
    let (app, _db) = app_with_db().await;
    let group_id = household(&app).await;

    let (status, body) = post(
        &app,
        "/expenses",
        "alice",
        json!({
            "group_id": group_id,
            "title": "Internet",
            "amount_minor": 1000,
            "payer": "alice",
            "split": {"mode": "custom", "splits": [
                {"username": "alice", "amount_minor": 500},
                {"username": "bob", "amount_minor": 400},
            ]},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("do not match"));

    let (status, _) = post(
        &app,
        "/settlements",
        "alice",
        json!({
            "group_id": group_id,
            "payer": "alice",
            "receiver": "alice",
            "amount_minor": 100,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn one_cent_slack_on_many_expenses_still_balances() {
    let (app, _db) = app_with_db().await;
    let group_id = household(&app).await;

    for title in ["Cleaning", "Plants", "Soap", "Bulbs"] {
        let (status, expense) = post(
            &app,
            "/expenses",
            "alice",
            json!({
                "group_id": group_id,
                "title": title,
                "amount_minor": 1000,
                "payer": "alice",
                "split": {"mode": "custom", "splits": [
                    {"username": "alice", "amount_minor": 333},
                    {"username": "bob", "amount_minor": 333},
                    {"username": "carol", "amount_minor": 333},
                ]},
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let stored: i64 = expense["splits"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["amount_minor"].as_i64().unwrap())
            .sum();
        assert_eq!(stored, 1000);
    }

    let (status, balances) = get(&app, &format!("/groups/{group_id}/balances"), "bob").await;
    assert_eq!(status, StatusCode::OK);
    let total: i64 = balances["balances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["amount_minor"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 0);
    assert_eq!(balances["debts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn oversized_amounts_are_422() {
    let (app, _db) = app_with_db().await;
    let group_id = household(&app).await;

    let (status, body) = post(
        &app,
        "/expenses",
        "alice",
        json!({
            "group_id": group_id,
            "title": "Yacht",
            "amount_minor": 1,
            "payer": "alice",
            "split": {"mode": "custom", "splits": [
                {"username": "alice", "amount_minor": i64::MAX},
                {"username": "bob", "amount_minor": i64::MAX},
                {"username": "carol", "amount_minor": 3},
            ]},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("must be <="));

    let (status, _) = post(
        &app,
        "/expenses",
        "alice",
        equal_expense(&group_id, "Castle", i64::MAX),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post(
        &app,
        "/settlements",
        "bob",
        json!({
            "group_id": group_id,
            "payer": "bob",
            "receiver": "alice",
            "amount_minor": i64::MAX,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, detail) = get(&app, &format!("/groups/{group_id}"), "alice").await;
    assert!(detail["expenses"].as_array().unwrap().is_empty());
    let (status, balances) = get(&app, &format!("/groups/{group_id}/balances"), "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert!(balances["debts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn outsiders_get_403() {
    let (app, _db) = app_with_db().await;
    let (_, group) = post(&app, "/groups", "alice", json!({"name": "Flat"})).await;
    let group_id = group["id"].as_str().unwrap();

    for path in ["", "/balances", "/summary", "/settlements"] {
        let (status, _) = get(&app, &format!("/groups/{group_id}{path}"), "bob").await;
        assert_eq!(status, StatusCode::FORBIDDEN, "GET /groups/{{id}}{path}");
    }
}

#[tokio::test]
async fn residual_imbalance_is_a_500_without_details() {
    let (app, db) = app_with_db().await;
    let group_id = household(&app).await;

    let (status, _) = post(
        &app,
        "/expenses",
        "alice",
        equal_expense(&group_id, "Groceries", 9000),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM group_members WHERE group_id = ? AND user_id = ?",
        vec![group_id.clone().into(), "carol".into()],
    ))
    .await
    .unwrap();

    let (status, body) = get(&app, &format!("/groups/{group_id}/balances"), "alice").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal server error"}));
}
