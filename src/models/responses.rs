// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tool response shapes returned to the agent.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Marker rendered in place of a value the provider did not supply.
pub const UNAVAILABLE: &str = "unavailable";

/// A metric that is either present or explicitly unavailable.
///
/// Serializes as the bare value, or as the string `"unavailable"`, so the
/// agent can tell "no data" apart from a real zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric<T> {
    Value(T),
    Unavailable,
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Value(v),
            None => Metric::Unavailable,
        }
    }
}

impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => v.serialize(serializer),
            Metric::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

/// Recovery color band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryBand {
    Green,
    Yellow,
    Red,
}

impl RecoveryBand {
    /// Band for a 0-100 recovery score.
    pub fn from_score(score: f64) -> Self {
        if score >= 67.0 {
            RecoveryBand::Green
        } else if score >= 34.0 {
            RecoveryBand::Yellow
        } else {
            RecoveryBand::Red
        }
    }
}

/// Coaching text chosen from an insight rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub key: &'static str,
    pub text: &'static str,
}

/// Response of any tool, tagged with the tool name.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolResponse {
    Overview(OverviewResponse),
    Sleep(SleepResponse),
    Recovery(RecoveryResponse),
    Strain(StrainResponse),
    Healthspan(HealthspanResponse),
}

// ─── Overview ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct OverviewResponse {
    pub date: NaiveDate,
    pub recovery_score: Metric<f64>,
    pub recovery_band: Metric<RecoveryBand>,
    pub day_strain: Metric<f64>,
    pub calories: Metric<u32>,
    pub average_heart_rate: Metric<u32>,
    pub max_heart_rate: Metric<u32>,
    pub sleep_performance_pct: Metric<f64>,
    pub hours_slept: Metric<f64>,
    pub weight_kg: Metric<f64>,
    pub activities: Vec<ActivityEntry>,
}

/// A logged activity in the overview.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub name: String,
    /// Local start time (HH:MM)
    pub start: String,
    /// Local end time (HH:MM)
    pub end: String,
    pub strain: Metric<f64>,
}

// ─── Sleep ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SleepResponse {
    pub date: NaiveDate,
    pub performance_pct: Metric<f64>,
    pub hours_slept: Metric<f64>,
    pub hours_needed: Metric<f64>,
    pub consistency_pct: Metric<f64>,
    pub efficiency_pct: Metric<f64>,
    pub respiratory_rate: Metric<f64>,
    pub stages: SleepStages,
    pub disturbances: Metric<u32>,
    pub insight: Insight,
}

/// Hours spent in each sleep stage.
#[derive(Debug, Clone, Serialize)]
pub struct SleepStages {
    pub light_hours: Metric<f64>,
    pub deep_hours: Metric<f64>,
    pub rem_hours: Metric<f64>,
    pub awake_hours: Metric<f64>,
}

// ─── Recovery ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryResponse {
    pub date: NaiveDate,
    pub score: Metric<f64>,
    pub band: Metric<RecoveryBand>,
    pub calibrating: bool,
    pub hrv_ms: TrendMetric,
    pub resting_heart_rate_bpm: TrendMetric,
    pub respiratory_rate: Metric<f64>,
    pub spo2_pct: Metric<f64>,
    pub skin_temp_celsius: Metric<f64>,
    pub insight: Insight,
}

/// A value paired with its trailing baseline.
#[derive(Debug, Clone, Serialize)]
pub struct TrendMetric {
    pub value: Metric<f64>,
    pub baseline: Metric<f64>,
    /// Whole-percent change vs. baseline
    pub trend_pct: Metric<i32>,
}

// ─── Strain ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StrainResponse {
    pub date: NaiveDate,
    pub day_strain: Metric<f64>,
    pub heart_rate_zones: Vec<ZoneMinutes>,
    pub strength_minutes: Metric<f64>,
    pub steps: Metric<u32>,
    pub workouts: Vec<WorkoutSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneMinutes {
    /// Zone number, 1-5
    pub zone: u8,
    pub minutes: Metric<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    pub name: String,
    pub start: String,
    pub duration_minutes: f64,
    pub average_heart_rate: Metric<u32>,
    pub max_heart_rate: Metric<u32>,
    pub strain: Metric<f64>,
}

// ─── Healthspan ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct HealthspanResponse {
    /// Date of the measurement the response describes
    pub measured_on: Metric<NaiveDate>,
    pub biological_age: Metric<f64>,
    pub chronological_age: Metric<f64>,
    /// Biological minus chronological age, in years
    pub age_delta: Metric<f64>,
    pub pace_of_aging: Metric<f64>,
    /// Week-over-week biological-age changes, oldest first
    pub weekly_trend: Vec<WeeklyDelta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyDelta {
    pub week_ending: NaiveDate,
    pub delta_years: Metric<f64>,
}
