// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The five WHOOP tools.
//!
//! Each tool resolves its date argument, makes sure a session exists, fetches
//! the records it needs concurrently and hands them to the shaper. A tool
//! either returns a complete response or the first error; nothing partial.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::responses::{
    HealthspanResponse, OverviewResponse, RecoveryResponse, SleepResponse, StrainResponse,
};
use crate::models::ToolResponse;
use crate::services::identity::IdentityClient;
use crate::services::session::{RetryPolicy, SessionManager};
use crate::services::shaper::{self, DayContext, BASELINE_DAYS};
use crate::services::telemetry::TelemetryClient;
use crate::time_utils::{resolve_date, Clock, DateRange, SystemClock};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Weeks of biological-age history fetched by the healthspan tool.
pub const HEALTHSPAN_LOOKBACK_WEEKS: u32 = 8;
/// Sleeps ending on the target day usually start the evening before.
const SLEEP_LOOKBACK_DAYS: u32 = 2;

/// Tool identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Overview,
    Sleep,
    Recovery,
    Strain,
    Healthspan,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::Overview,
        ToolName::Sleep,
        ToolName::Recovery,
        ToolName::Strain,
        ToolName::Healthspan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Overview => "overview",
            ToolName::Sleep => "sleep",
            ToolName::Recovery => "recovery",
            ToolName::Strain => "strain",
            ToolName::Healthspan => "healthspan",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::Overview => {
                "Daily digest: recovery, strain, calories, heart rate, sleep and logged activities."
            }
            ToolName::Sleep => {
                "Sleep performance, hours slept vs. needed, consistency, efficiency, stages and an insight."
            }
            ToolName::Recovery => {
                "Recovery score and band, HRV and resting heart rate with 30-day trends, and an insight."
            }
            ToolName::Strain => {
                "Day strain, minutes in heart-rate zones 1-5, strength minutes, steps and workouts."
            }
            ToolName::Healthspan => {
                "Biological age, pace of aging and the week-over-week biological-age trend."
            }
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| AppError::UnknownTool(s.to_string()))
    }
}

/// Arguments accepted by every tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolArgs {
    /// Local date `YYYY-MM-DD`; today when absent
    #[serde(default)]
    pub date: Option<String>,
}

/// Tool listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<ArgumentDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Descriptors for every tool, in listing order.
pub fn descriptors() -> Vec<ToolDescriptor> {
    ToolName::ALL
        .iter()
        .map(|tool| ToolDescriptor {
            name: tool.as_str(),
            description: tool.description(),
            arguments: vec![ArgumentDescriptor {
                name: "date",
                description: "Local date as YYYY-MM-DD (defaults to today, must not be in the future)",
                required: false,
            }],
        })
        .collect()
}

/// Tool service over one WHOOP account.
#[derive(Clone)]
pub struct WhoopTools {
    telemetry: TelemetryClient,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl WhoopTools {
    pub fn new(telemetry: TelemetryClient, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self {
            telemetry,
            clock,
            timezone,
        }
    }

    /// Wire up the production stack from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("whoop-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let identity = IdentityClient::new(http.clone(), config.auth_url.as_str());
        let session = SessionManager::new(
            identity,
            config.credentials.clone(),
            clock.clone(),
            RetryPolicy::default(),
        );
        let telemetry = TelemetryClient::new(http, config.api_url.as_str(), session);

        Ok(Self::new(telemetry, clock, config.timezone))
    }

    /// Run `tool` with `args`.
    pub async fn invoke(&self, tool: ToolName, args: &ToolArgs) -> Result<ToolResponse> {
        let date = args.date.as_deref();
        tracing::info!(tool = %tool, date = date.unwrap_or("today"), "Tool invoked");

        let result = match tool {
            ToolName::Overview => self.overview(date).await.map(ToolResponse::Overview),
            ToolName::Sleep => self.sleep(date).await.map(ToolResponse::Sleep),
            ToolName::Recovery => self.recovery(date).await.map(ToolResponse::Recovery),
            ToolName::Strain => self.strain(date).await.map(ToolResponse::Strain),
            ToolName::Healthspan => self.healthspan(date).await.map(ToolResponse::Healthspan),
        };

        if let Err(err) = &result {
            tracing::warn!(tool = %tool, code = err.code(), "Tool failed");
        }
        result
    }

    pub async fn overview(&self, date: Option<&str>) -> Result<OverviewResponse> {
        let ctx = self.prepare(date).await?;
        let day = ctx.range();
        let t = &self.telemetry;

        let (recoveries, cycles, sleeps, workouts, body) = tokio::try_join!(
            t.get_recovery(day, None),
            t.get_cycles(self.lookback(ctx, SLEEP_LOOKBACK_DAYS), None),
            t.get_sleep(self.lookback(ctx, SLEEP_LOOKBACK_DAYS), None),
            t.get_workouts(day, None),
            t.get_body_measurement(),
        )?;

        Ok(shaper::shape_overview(
            ctx,
            &recoveries,
            &cycles,
            &sleeps,
            &workouts,
            &body,
        ))
    }

    pub async fn sleep(&self, date: Option<&str>) -> Result<SleepResponse> {
        let ctx = self.prepare(date).await?;
        let sleeps = self
            .telemetry
            .get_sleep(self.lookback(ctx, SLEEP_LOOKBACK_DAYS), None)
            .await?;
        Ok(shaper::shape_sleep(ctx, &sleeps))
    }

    pub async fn recovery(&self, date: Option<&str>) -> Result<RecoveryResponse> {
        let ctx = self.prepare(date).await?;
        let t = &self.telemetry;

        let (recoveries, sleeps) = tokio::try_join!(
            t.get_recovery(self.lookback(ctx, BASELINE_DAYS as u32 + 1), None),
            t.get_sleep(self.lookback(ctx, SLEEP_LOOKBACK_DAYS), None),
        )?;

        Ok(shaper::shape_recovery(ctx, &recoveries, &sleeps))
    }

    pub async fn strain(&self, date: Option<&str>) -> Result<StrainResponse> {
        let ctx = self.prepare(date).await?;
        let t = &self.telemetry;

        let (cycles, workouts) = tokio::try_join!(
            t.get_cycles(self.lookback(ctx, SLEEP_LOOKBACK_DAYS), None),
            t.get_workouts(ctx.range(), None),
        )?;

        Ok(shaper::shape_strain(ctx, &cycles, &workouts))
    }

    pub async fn healthspan(&self, date: Option<&str>) -> Result<HealthspanResponse> {
        let ctx = self.prepare(date).await?;
        let t = &self.telemetry;

        let (metrics, profile) = tokio::try_join!(
            t.get_aging_metrics(self.lookback(ctx, HEALTHSPAN_LOOKBACK_WEEKS * 7), None),
            t.get_profile(),
        )?;

        Ok(shaper::shape_healthspan(&metrics, &profile))
    }

    /// Validate the date, then establish a session before any data call.
    ///
    /// Authenticating up front means a credential failure surfaces once,
    /// instead of once per concurrent fetch.
    async fn prepare(&self, date: Option<&str>) -> Result<DayContext> {
        let date = resolve_date(date, self.clock.as_ref(), self.timezone)?;
        self.telemetry.session().get_valid_token().await?;
        Ok(DayContext::new(date, self.timezone))
    }

    fn lookback(&self, ctx: DayContext, days: u32) -> DateRange {
        DateRange::days_ending(ctx.date, days, self.timezone)
    }
}
