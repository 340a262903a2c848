// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tool behavior: tool service and HTTP tool host.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot
use whoop_tools::services::telemetry::{
    AGING_PATH, BODY_MEASUREMENT_PATH, CYCLES_PATH, PROFILE_PATH, RECOVERY_PATH, SLEEP_PATH,
    WORKOUTS_PATH,
};
use whoop_tools::services::{ToolArgs, ToolName};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{
    cognito_error, cycle_json, login_mock, mount_data, mount_login, page, recovery_json,
    sleep_json, workout_json, TestStack,
};

async fn mount_recovery_history(api: &MockServer) {
    let mut records = vec![recovery_json(10, "2025-03-10T07:00:00Z", 72.0, 65.0, 52.0)];
    for day in 1..=5 {
        records.push(recovery_json(
            day,
            &format!("2025-03-0{}T07:00:00Z", day),
            58.0,
            60.0,
            53.6,
        ));
    }
    mount_data(api, RECOVERY_PATH, page(Value::Array(records), None)).await;
}

async fn mount_main_sleep(api: &MockServer, performance: f64, efficiency: f64) {
    mount_data(
        api,
        SLEEP_PATH,
        page(
            json!([sleep_json(
                "s-main",
                "2025-03-09T22:30:00Z",
                "2025-03-10T06:30:00Z",
                performance,
                efficiency
            )]),
            None,
        ),
    )
    .await;
}

/// Any data call fails the test when it is expected not to happen.
async fn forbid_data_calls(api: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(0)
        .mount(api)
        .await;
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_tool(name: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/tools/{}", name))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ─── Tool service ────────────────────────────────────────────

#[tokio::test]
async fn test_recovery_green_day_with_trends() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_recovery_history(&stack.api).await;
    mount_main_sleep(&stack.api, 94.0, 93.0).await;

    let response = stack.tools.recovery(Some("2025-03-10")).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["score"], 72.0);
    assert_eq!(json["band"], "green");
    assert_eq!(json["hrv_ms"]["value"], 65.0);
    assert_eq!(json["hrv_ms"]["trend_pct"], 8);
    assert_eq!(json["resting_heart_rate_bpm"]["trend_pct"], -3);
    assert_eq!(json["respiratory_rate"], 14.6);
    assert_eq!(json["insight"]["key"], "green");
}

#[tokio::test]
async fn test_sleep_low_efficiency_insight() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_main_sleep(&stack.api, 85.0, 80.0).await;

    let response = stack.tools.sleep(None).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["date"], "2025-03-10");
    assert_eq!(json["efficiency_pct"], 80.0);
    assert_eq!(json["performance_pct"], 85.0);
    assert_eq!(json["hours_slept"], 7.2);
    assert_eq!(json["hours_needed"], 7.5);
    assert_eq!(json["insight"]["key"], "efficiency");
}

#[tokio::test]
async fn test_rejected_credentials_stop_before_data_calls() {
    let stack = TestStack::start().await;
    login_mock()
        .respond_with(cognito_error(401, "NotAuthorizedException"))
        .expect(1)
        .mount(&stack.auth)
        .await;
    forbid_data_calls(&stack.api).await;

    let err = stack.tools.overview(None).await.unwrap_err();
    assert_eq!(err.code(), "authentication_error");
}

#[tokio::test]
async fn test_future_date_is_rejected_without_upstream_calls() {
    let stack = TestStack::start().await;
    login_mock()
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&stack.auth)
        .await;
    forbid_data_calls(&stack.api).await;

    let err = stack.tools.strain(Some("2025-03-11")).await.unwrap_err();
    assert_eq!(err.code(), "invalid_argument");

    let err = stack.tools.sleep(Some("10/03/2025")).await.unwrap_err();
    assert_eq!(err.code(), "invalid_argument");

    let err = stack.tools.recovery(Some("-262143-01-05")).await.unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
}

#[tokio::test]
async fn test_overview_digest() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_recovery_history(&stack.api).await;
    mount_main_sleep(&stack.api, 94.0, 93.0).await;
    mount_data(
        &stack.api,
        CYCLES_PATH,
        page(
            json!([cycle_json(501, "2025-03-10T06:40:00Z", 14.2, 10460.0)]),
            None,
        ),
    )
    .await;
    mount_data(
        &stack.api,
        WORKOUTS_PATH,
        page(
            json!([workout_json(
                "w1",
                "running",
                "2025-03-10T17:00:00Z",
                "2025-03-10T17:45:00Z"
            )]),
            None,
        ),
    )
    .await;
    mount_data(
        &stack.api,
        BODY_MEASUREMENT_PATH,
        json!({ "height_meter": 1.83, "weight_kilogram": 80.2, "max_heart_rate": 192 }),
    )
    .await;

    let response = stack
        .tools
        .invoke(ToolName::Overview, &ToolArgs::default())
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["tool"], "overview");
    assert_eq!(json["recovery_score"], 72.0);
    assert_eq!(json["recovery_band"], "green");
    assert_eq!(json["day_strain"], 14.2);
    assert_eq!(json["calories"], 2500);
    assert_eq!(json["hours_slept"], 7.2);
    assert_eq!(json["weight_kg"], 80.2);
    assert_eq!(json["activities"][0]["name"], "Running");
    assert_eq!(json["activities"][0]["start"], "17:00");
    assert_eq!(json["activities"][0]["end"], "17:45");
    assert_eq!(stack.session.exchange_count(), 1);
}

#[tokio::test]
async fn test_strain_zones_and_missing_steps() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_data(
        &stack.api,
        CYCLES_PATH,
        page(
            json!([cycle_json(501, "2025-03-10T06:40:00Z", 14.2, 10460.0)]),
            None,
        ),
    )
    .await;
    mount_data(
        &stack.api,
        WORKOUTS_PATH,
        page(
            json!([
                workout_json("w1", "running", "2025-03-10T07:00:00Z", "2025-03-10T07:30:00Z"),
                workout_json(
                    "w2",
                    "weightlifting",
                    "2025-03-10T18:00:00Z",
                    "2025-03-10T18:30:00Z"
                ),
            ]),
            None,
        ),
    )
    .await;

    let json = serde_json::to_value(stack.tools.strain(Some("2025-03-10")).await.unwrap()).unwrap();

    assert_eq!(json["day_strain"], 14.2);
    assert_eq!(json["heart_rate_zones"][0]["zone"], 1);
    assert_eq!(json["heart_rate_zones"][0]["minutes"], 20.0);
    assert_eq!(json["heart_rate_zones"][3]["minutes"], 0.0);
    assert_eq!(json["strength_minutes"], 30.0);
    assert_eq!(json["steps"], "unavailable");
    assert_eq!(json["workouts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_healthspan_trend() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_data(
        &stack.api,
        AGING_PATH,
        page(
            json!([
                { "date": "2025-02-24", "biological_age": 33.9, "pace_of_aging": 0.9 },
                { "date": "2025-03-03", "biological_age": 33.7, "pace_of_aging": 0.85 },
                { "date": "2025-03-10", "biological_age": 33.6, "pace_of_aging": 0.8 }
            ]),
            None,
        ),
    )
    .await;
    mount_data(
        &stack.api,
        PROFILE_PATH,
        json!({ "user_id": 10129, "first_name": "Sam", "birthdate": "1990-03-10" }),
    )
    .await;

    let json = serde_json::to_value(stack.tools.healthspan(None).await.unwrap()).unwrap();

    assert_eq!(json["measured_on"], "2025-03-10");
    assert_eq!(json["biological_age"], 33.6);
    assert_eq!(json["chronological_age"], 35.0);
    assert_eq!(json["age_delta"], -1.4);
    assert_eq!(json["weekly_trend"].as_array().unwrap().len(), 2);
    assert_eq!(json["weekly_trend"][1]["delta_years"], -0.1);
}

#[tokio::test]
async fn test_healthspan_without_measurements() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_data(&stack.api, AGING_PATH, page(json!([]), None)).await;
    mount_data(&stack.api, PROFILE_PATH, json!({ "user_id": 10129 })).await;

    let json = serde_json::to_value(stack.tools.healthspan(None).await.unwrap()).unwrap();
    assert_eq!(json["measured_on"], "unavailable");
    assert_eq!(json["biological_age"], "unavailable");
    assert_eq!(json["weekly_trend"], json!([]));
}

// ─── Tool host ───────────────────────────────────────────────

#[tokio::test]
async fn test_health_is_public() {
    let stack = TestStack::start().await;
    let app = stack.router(Some("s3cret"));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_list_tools() {
    let stack = TestStack::start().await;
    let app = stack.router(None);

    let response = app
        .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["overview", "sleep", "recovery", "strain", "healthspan"]);
}

#[tokio::test]
async fn test_call_tool_over_http() {
    let stack = TestStack::start().await;
    mount_login(&stack.auth, "token-1").await;
    mount_recovery_history(&stack.api).await;
    mount_main_sleep(&stack.api, 94.0, 93.0).await;
    let app = stack.router(None);

    let response = app
        .oneshot(post_tool("recovery", r#"{"date":"2025-03-10"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["tool"], "recovery");
    assert_eq!(json["band"], "green");
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let stack = TestStack::start().await;
    let app = stack.router(None);

    let response = app.oneshot(post_tool("calories", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "unknown_tool");
}

#[tokio::test]
async fn test_malformed_arguments_are_400() {
    let stack = TestStack::start().await;
    forbid_data_calls(&stack.api).await;
    let app = stack.router(None);

    let response = app
        .clone()
        .oneshot(post_tool("sleep", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_argument");

    let response = app
        .oneshot(post_tool("sleep", r#"{"date":"2099-01-01"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "invalid_argument");
    assert!(json["message"].as_str().unwrap().contains("future"));
}

#[tokio::test]
async fn test_authentication_failure_maps_to_502() {
    let stack = TestStack::start().await;
    login_mock()
        .respond_with(cognito_error(400, "NotAuthorizedException"))
        .mount(&stack.auth)
        .await;
    forbid_data_calls(&stack.api).await;
    let app = stack.router(None);

    let response = app.oneshot(post_tool("overview", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "authentication_error");
    assert!(!json["message"].as_str().unwrap().contains("test_password"));
}

#[tokio::test]
async fn test_tool_routes_require_bearer_token_when_configured() {
    let stack = TestStack::start().await;
    let app = stack.router(Some("s3cret"));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "unauthorized");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/tools")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tools")
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
