// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP identity client.
//!
//! WHOOP fronts AWS Cognito behind its own auth service. Login is a direct
//! `USER_PASSWORD_AUTH` exchange; refresh is `REFRESH_TOKEN_AUTH`. Both return
//! an `AuthenticationResult` carrying the tokens and their lifetime.

use crate::error::AppError;
use crate::models::Credentials;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

/// Path of the Cognito proxy under the auth base URL.
pub const AUTH_PATH: &str = "/auth-service/v3/whoop";

const AMZ_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Token lifetime assumed when the provider omits `ExpiresIn` (24 hours).
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 24 * 60 * 60;

/// Longest token lifetime accepted from the provider (7 days).
pub const MAX_EXPIRES_IN_SECS: i64 = 7 * 24 * 60 * 60;

/// Tokens returned by a successful identity exchange.
pub struct TokenGrant {
    pub access_token: SecretString,
    /// Cognito omits this on refresh; the old refresh token stays valid.
    pub refresh_token: Option<SecretString>,
    pub expires_in_secs: i64,
}

/// Low-level client for the identity exchange.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    auth_url: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, auth_url: impl Into<String>) -> Self {
        Self {
            http,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Log in with the account credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenGrant, AppError> {
        if !credentials.is_complete() {
            return Err(AppError::Authentication(
                "WHOOP_EMAIL and WHOOP_PASSWORD must be set".to_string(),
            ));
        }

        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": "",
            "AuthParameters": {
                "USERNAME": credentials.account_id(),
                "PASSWORD": credentials.secret(),
            },
        });

        self.initiate_auth(&body, "Login").await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AppError> {
        let body = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": "",
            "AuthParameters": {
                "REFRESH_TOKEN": refresh_token,
            },
        });

        self.initiate_auth(&body, "Token refresh").await
    }

    async fn initiate_auth(
        &self,
        body: &serde_json::Value,
        what: &str,
    ) -> Result<TokenGrant, AppError> {
        let url = format!("{}{}", self.auth_url, AUTH_PATH);

        // The body is serialized by hand because Cognito wants its own content type.
        let payload = serde_json::to_vec(body)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode auth body: {}", e)))?;

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "*/*")
            .header(reqwest::header::CONTENT_TYPE, AMZ_CONTENT_TYPE)
            .header("X-Amz-Target", AMZ_TARGET)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::TransientAuth(format!("{} request timed out", what))
                } else {
                    AppError::TransientAuth(format!("{} request failed: {}", what, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body, what));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::TransientAuth(format!("{} response interrupted: {}", what, e)))?;
        let parsed: InitiateAuthResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::DataFormat(format!("Failed to parse auth response: {}", e)))?;

        let Some(result) = parsed.authentication_result else {
            // A challenge (MFA, new password) cannot be answered non-interactively.
            let challenge = parsed.challenge_name.unwrap_or_else(|| "none".to_string());
            return Err(AppError::Authentication(format!(
                "{} returned no tokens (challenge: {})",
                what, challenge
            )));
        };

        let expires_in_secs = result.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        if !(1..=MAX_EXPIRES_IN_SECS).contains(&expires_in_secs) {
            return Err(AppError::DataFormat(format!(
                "{} returned ExpiresIn {} outside 1..={}",
                what, expires_in_secs, MAX_EXPIRES_IN_SECS
            )));
        }

        Ok(TokenGrant {
            access_token: SecretString::from(result.access_token),
            refresh_token: result.refresh_token.map(SecretString::from),
            expires_in_secs,
        })
    }
}

/// Map a non-success identity response onto the error taxonomy.
fn classify_failure(status: reqwest::StatusCode, body: &str, what: &str) -> AppError {
    let error_type = serde_json::from_str::<CognitoError>(body)
        .ok()
        .and_then(|e| e.error_type)
        .unwrap_or_default();

    if status.as_u16() == 429 || status.is_server_error() {
        tracing::warn!(status = %status, "Identity service unavailable");
        return AppError::TransientAuth(format!("{} failed with status {}", what, status));
    }

    // Cognito reports bad credentials and throttling both as 400
    if error_type.contains("TooManyRequests") || error_type.contains("LimitExceeded") {
        return AppError::TransientAuth(format!("{} throttled ({})", what, error_type));
    }

    tracing::warn!(status = %status, error_type = %error_type, "Identity exchange rejected");
    let reason = if error_type.is_empty() {
        format!("status {}", status)
    } else {
        error_type
    };
    AppError::Authentication(format!("{} rejected: {}", what, reason))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct CognitoError {
    #[serde(rename = "__type")]
    error_type: Option<String>,
}
