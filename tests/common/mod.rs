// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use whoop_tools::config::Config;
use whoop_tools::routes::create_router;
use whoop_tools::services::identity::AUTH_PATH;
use whoop_tools::services::{
    IdentityClient, RetryPolicy, SessionManager, TelemetryClient, WhoopTools,
};
use whoop_tools::time_utils::{Clock, ManualClock};
use whoop_tools::AppState;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wall-clock time the test clock starts at.
pub const NOW: &str = "2025-03-10T12:00:00Z";

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Retry policy without sleeps.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::ZERO,
    }
}

/// Full client stack pointed at two mock servers.
pub struct TestStack {
    pub auth: MockServer,
    pub api: MockServer,
    pub clock: Arc<ManualClock>,
    pub session: SessionManager,
    pub telemetry: TelemetryClient,
    pub tools: WhoopTools,
}

impl TestStack {
    pub async fn start() -> Self {
        Self::with_timeout(std::time::Duration::from_secs(5)).await
    }

    /// Stack whose HTTP client gives up after `timeout`.
    pub async fn with_timeout(timeout: std::time::Duration) -> Self {
        let auth = MockServer::start().await;
        let api = MockServer::start().await;
        let clock = Arc::new(ManualClock::new(at(NOW)));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap();
        let identity = IdentityClient::new(http.clone(), auth.uri());
        let session = SessionManager::new(
            identity,
            Config::test_default().credentials,
            dyn_clock.clone(),
            fast_retry(),
        );
        let telemetry = TelemetryClient::new(http, api.uri(), session.clone());
        let tools = WhoopTools::new(telemetry.clone(), dyn_clock, chrono_tz::Tz::UTC);

        Self {
            auth,
            api,
            clock,
            session,
            telemetry,
            tools,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Router over this stack, with an optional tool bearer token.
    pub fn router(&self, mcp_auth_token: Option<&str>) -> axum::Router {
        let mut config = Config::test_default();
        config.auth_url = self.auth.uri();
        config.api_url = self.api.uri();
        config.mcp_auth_token = mcp_auth_token.map(|t| secrecy::SecretString::from(t.to_string()));

        let state = Arc::new(AppState {
            config,
            tools: self.tools.clone(),
        });
        create_router(state)
    }
}

// ─── Identity mocks ──────────────────────────────────────────

pub fn auth_result(access_token: &str, refresh_token: Option<&str>, expires_in: i64) -> Value {
    let mut result = json!({
        "AccessToken": access_token,
        "ExpiresIn": expires_in,
        "TokenType": "Bearer",
    });
    if let Some(refresh) = refresh_token {
        result["RefreshToken"] = json!(refresh);
    }
    json!({ "AuthenticationResult": result })
}

pub fn login_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(header(
            "X-Amz-Target",
            "AWSCognitoIdentityProviderService.InitiateAuth",
        ))
        .and(body_partial_json(json!({ "AuthFlow": "USER_PASSWORD_AUTH" })))
}

pub fn refresh_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(body_partial_json(json!({ "AuthFlow": "REFRESH_TOKEN_AUTH" })))
}

/// Login that always succeeds with `access_token` (1 hour, with refresh token).
pub async fn mount_login(server: &MockServer, access_token: &str) {
    login_mock()
        .respond_with(
            ResponseTemplate::new(200).set_body_json(auth_result(
                access_token,
                Some("refresh-1"),
                3600,
            )),
        )
        .mount(server)
        .await;
}

pub fn cognito_error(status: u16, error_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "__type": error_type,
        "message": "rejected",
    }))
}

// ─── Data mocks ──────────────────────────────────────────────

pub fn page(records: Value, next_token: Option<&str>) -> Value {
    json!({ "records": records, "next_token": next_token })
}

/// Serve `body` on GET `data_path` for any bearer token.
pub async fn mount_data(server: &MockServer, data_path: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(data_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ─── Record fixtures ─────────────────────────────────────────

pub fn cycle_json(id: i64, start: &str, strain: f64, kilojoule: f64) -> Value {
    json!({
        "id": id,
        "user_id": 10129,
        "start": start,
        "end": null,
        "timezone_offset": "+00:00",
        "score_state": "SCORED",
        "score": {
            "strain": strain,
            "kilojoule": kilojoule,
            "average_heart_rate": 68,
            "max_heart_rate": 151
        }
    })
}

pub fn recovery_json(cycle_id: i64, created_at: &str, score: f64, hrv: f64, rhr: f64) -> Value {
    json!({
        "cycle_id": cycle_id,
        "sleep_id": format!("sleep-{}", cycle_id),
        "user_id": 10129,
        "created_at": created_at,
        "updated_at": created_at,
        "score_state": "SCORED",
        "score": {
            "user_calibrating": false,
            "recovery_score": score,
            "resting_heart_rate": rhr,
            "hrv_rmssd_milli": hrv,
            "spo2_percentage": 96.2,
            "skin_temp_celsius": 33.4
        }
    })
}

pub fn sleep_json(id: &str, start: &str, end: &str, performance: f64, efficiency: f64) -> Value {
    json!({
        "id": id,
        "user_id": 10129,
        "start": start,
        "end": end,
        "nap": false,
        "score_state": "SCORED",
        "score": {
            "stage_summary": {
                "total_in_bed_time_milli": 28_800_000,
                "total_awake_time_milli": 2_880_000,
                "total_light_sleep_time_milli": 13_000_000,
                "total_slow_wave_sleep_time_milli": 6_000_000,
                "total_rem_sleep_time_milli": 6_920_000,
                "disturbance_count": 9
            },
            "sleep_needed": {
                "baseline_milli": 27_000_000,
                "need_from_sleep_debt_milli": 0,
                "need_from_recent_strain_milli": 0,
                "need_from_recent_nap_milli": 0
            },
            "respiratory_rate": 14.6,
            "sleep_performance_percentage": performance,
            "sleep_consistency_percentage": 88.0,
            "sleep_efficiency_percentage": efficiency
        }
    })
}

pub fn workout_json(id: &str, sport: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "user_id": 10129,
        "start": start,
        "end": end,
        "sport_name": sport,
        "score_state": "SCORED",
        "score": {
            "strain": 9.1,
            "average_heart_rate": 131,
            "max_heart_rate": 168,
            "kilojoule": 1200.0,
            "zone_durations": {
                "zone_zero_milli": 0,
                "zone_one_milli": 600_000,
                "zone_two_milli": 600_000,
                "zone_three_milli": 600_000,
                "zone_four_milli": 0,
                "zone_five_milli": 0
            }
        }
    })
}
