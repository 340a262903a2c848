// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP data API client.
//!
//! Handles:
//! - Bearer authorization via the session manager
//! - One forced re-authentication when a token is rejected (401)
//! - Cursor pagination for range queries
//! - Typed decoding, with shape mismatches reported as data format errors

use crate::error::{AppError, Result};
use crate::models::{
    AgingMetric, BodyMeasurement, Cycle, Page, Record, Recovery, Sleep, UserProfile, Workout,
};
use crate::services::session::{AccessToken, SessionManager};
use crate::time_utils::{format_utc_rfc3339, DateRange};
use serde::de::DeserializeOwned;
use std::collections::HashSet;

pub const CYCLES_PATH: &str = "/v2/cycle";
pub const SLEEP_PATH: &str = "/v2/activity/sleep";
pub const RECOVERY_PATH: &str = "/v2/recovery";
pub const WORKOUTS_PATH: &str = "/v2/activity/workout";
pub const BODY_MEASUREMENT_PATH: &str = "/v2/user/measurement/body";
pub const AGING_PATH: &str = "/v2/healthspan/aging";
pub const PROFILE_PATH: &str = "/v2/user/profile/basic";

/// Records requested per page (provider maximum).
pub const PAGE_SIZE: u32 = 25;
/// Upper bound on pages followed for one query.
pub const MAX_PAGES: usize = 50;

/// Outcome of a single authorized request.
enum Attempt<T> {
    Done(T),
    Unauthorized,
}

/// WHOOP data API client.
#[derive(Clone)]
pub struct TelemetryClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionManager,
}

impl TelemetryClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: SessionManager) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    // ─── Collections ─────────────────────────────────────────────────────────

    /// Physiological cycles overlapping `range`.
    pub async fn get_cycles(&self, range: DateRange, limit: Option<usize>) -> Result<Vec<Cycle>> {
        self.get_collection(CYCLES_PATH, range, limit).await
    }

    /// Sleep activities (including naps) in `range`.
    pub async fn get_sleep(&self, range: DateRange, limit: Option<usize>) -> Result<Vec<Sleep>> {
        self.get_collection(SLEEP_PATH, range, limit).await
    }

    /// Recovery assessments in `range`.
    pub async fn get_recovery(
        &self,
        range: DateRange,
        limit: Option<usize>,
    ) -> Result<Vec<Recovery>> {
        self.get_collection(RECOVERY_PATH, range, limit).await
    }

    /// Logged workouts in `range`.
    pub async fn get_workouts(
        &self,
        range: DateRange,
        limit: Option<usize>,
    ) -> Result<Vec<Workout>> {
        self.get_collection(WORKOUTS_PATH, range, limit).await
    }

    /// Weekly biological-age estimates in `range`.
    pub async fn get_aging_metrics(
        &self,
        range: DateRange,
        limit: Option<usize>,
    ) -> Result<Vec<AgingMetric>> {
        self.get_collection(AGING_PATH, range, limit).await
    }

    // ─── Single records ──────────────────────────────────────────────────────

    /// Latest body measurement (not date-ranged).
    pub async fn get_body_measurement(&self) -> Result<BodyMeasurement> {
        self.get_json(BODY_MEASUREMENT_PATH, &[]).await
    }

    /// Basic account profile.
    pub async fn get_profile(&self) -> Result<UserProfile> {
        self.get_json(PROFILE_PATH, &[]).await
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    /// Fetch every page of a range query.
    ///
    /// Pages are merged, de-duplicated by record key and returned oldest
    /// first. With `limit`, only the most recent `limit` records are kept
    /// and paging stops once enough unique records have been seen.
    async fn get_collection<T>(
        &self,
        path: &str,
        range: DateRange,
        limit: Option<usize>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Record,
    {
        let mut records: Vec<T> = Vec::new();
        let mut seen_keys = HashSet::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let mut query = vec![
                ("start", format_utc_rfc3339(range.start)),
                ("end", format_utc_rfc3339(range.end)),
                ("limit", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &cursor {
                query.push(("nextToken", token.clone()));
            }

            let page: Page<T> = self.get_json(path, &query).await?;
            tracing::debug!(
                path,
                page = page_number,
                records = page.records.len(),
                "Fetched page"
            );

            for record in page.records {
                if seen_keys.insert(record.key()) {
                    records.push(record);
                }
            }

            let limit_reached = limit.is_some_and(|n| records.len() >= n);
            match page.next_token.filter(|t| !t.is_empty()) {
                Some(next) if !limit_reached => {
                    if !seen_cursors.insert(next.clone()) {
                        return Err(AppError::DataFormat(format!(
                            "{} returned a repeated page cursor",
                            path
                        )));
                    }
                    cursor = Some(next);
                }
                _ => {
                    records.sort_by_key(|r| r.timestamp());
                    if let Some(n) = limit {
                        let excess = records.len().saturating_sub(n);
                        records.drain(..excess);
                    }
                    return Ok(records);
                }
            }
        }

        Err(AppError::DataFormat(format!(
            "{} did not finish paging within {} pages",
            path, MAX_PAGES
        )))
    }

    /// Authorized GET with a single forced re-authentication on 401.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.session.get_valid_token().await?;
        if let Attempt::Done(value) = self.send(path, query, &token).await? {
            return Ok(value);
        }

        tracing::warn!(path, "Access token rejected, re-authenticating");
        self.session.invalidate(&token).await;
        let token = self.session.get_valid_token().await?;

        match self.send(path, query, &token).await? {
            Attempt::Done(value) => Ok(value),
            Attempt::Unauthorized => Err(AppError::UpstreamUnavailable(format!(
                "{} rejected a freshly issued token",
                path
            ))),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &AccessToken,
    ) -> Result<Attempt<T>> {
        let url = format!("{}{}", self.base_url, path);

        let request = token.authorize(self.http.get(&url).query(query));
        let response = request
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("{}: {}", path, describe(&e))))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Ok(Attempt::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                tracing::warn!(path, "WHOOP rate limit hit (429)");
            } else {
                tracing::warn!(path, status = %status, body_length = body.len(), "WHOOP request failed");
            }
            return Err(AppError::UpstreamUnavailable(format!(
                "{} failed with status {}",
                path, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("{}: {}", path, describe(&e))))?;

        serde_json::from_slice(&bytes)
            .map(Attempt::Done)
            .map_err(|e| AppError::DataFormat(format!("{}: {}", path, e)))
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    }
}
