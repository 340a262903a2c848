// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Typed WHOOP API records.
//!
//! Payloads are deserialized straight into these structs at the telemetry
//! boundary. Required fields are non-optional so that a payload of the wrong
//! shape fails to parse instead of flowing into the response shaper. Score
//! fields are optional because the provider omits them for unscored records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Paginated collection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    /// Cursor for the next page (absent on the last page)
    #[serde(default)]
    pub next_token: Option<String>,
}

/// A record from a paginated collection.
pub trait Record {
    /// Stable identity used to drop duplicates across pages.
    fn key(&self) -> String;
    /// Instant used for chronological ordering.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Provider scoring status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreState {
    Scored,
    PendingScore,
    Unscorable,
}

// ─── Cycle ───────────────────────────────────────────────────

/// Physiological day (strain accumulates over one cycle).
#[derive(Debug, Clone, Deserialize)]
pub struct Cycle {
    pub id: i64,
    pub start: DateTime<Utc>,
    /// Absent while the cycle is still in progress
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    pub score_state: ScoreState,
    #[serde(default)]
    pub score: Option<CycleScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CycleScore {
    /// Day strain (0-21)
    pub strain: Option<f64>,
    /// Energy expenditure in kilojoules
    pub kilojoule: Option<f64>,
    pub average_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    /// Step count (only reported by newer straps)
    #[serde(default)]
    pub steps: Option<u32>,
}

impl Cycle {
    pub fn scored(&self) -> Option<&CycleScore> {
        if self.score_state == ScoreState::Scored {
            self.score.as_ref()
        } else {
            None
        }
    }
}

impl Record for Cycle {
    fn key(&self) -> String {
        self.id.to_string()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.start
    }
}

// ─── Recovery ────────────────────────────────────────────────

/// Morning recovery assessment tied to a cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct Recovery {
    pub cycle_id: i64,
    #[serde(default)]
    pub sleep_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub score_state: ScoreState,
    #[serde(default)]
    pub score: Option<RecoveryScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryScore {
    #[serde(default)]
    pub user_calibrating: bool,
    /// Recovery percentage (0-100)
    pub recovery_score: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    /// HRV (RMSSD) in milliseconds
    pub hrv_rmssd_milli: Option<f64>,
    #[serde(default)]
    pub spo2_percentage: Option<f64>,
    #[serde(default)]
    pub skin_temp_celsius: Option<f64>,
}

impl Recovery {
    pub fn scored(&self) -> Option<&RecoveryScore> {
        if self.score_state == ScoreState::Scored {
            self.score.as_ref()
        } else {
            None
        }
    }
}

impl Record for Recovery {
    fn key(&self) -> String {
        self.cycle_id.to_string()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ─── Sleep ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Sleep {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub nap: bool,
    pub score_state: ScoreState,
    #[serde(default)]
    pub score: Option<SleepScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleepScore {
    #[serde(default)]
    pub stage_summary: Option<StageSummary>,
    #[serde(default)]
    pub sleep_needed: Option<SleepNeeded>,
    pub respiratory_rate: Option<f64>,
    pub sleep_performance_percentage: Option<f64>,
    pub sleep_consistency_percentage: Option<f64>,
    pub sleep_efficiency_percentage: Option<f64>,
}

/// Stage breakdown, all durations in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct StageSummary {
    pub total_in_bed_time_milli: Option<i64>,
    pub total_awake_time_milli: Option<i64>,
    pub total_light_sleep_time_milli: Option<i64>,
    pub total_slow_wave_sleep_time_milli: Option<i64>,
    pub total_rem_sleep_time_milli: Option<i64>,
    #[serde(default)]
    pub disturbance_count: Option<u32>,
}

/// Provider-computed sleep need components, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepNeeded {
    pub baseline_milli: Option<i64>,
    #[serde(default)]
    pub need_from_sleep_debt_milli: Option<i64>,
    #[serde(default)]
    pub need_from_recent_strain_milli: Option<i64>,
    #[serde(default)]
    pub need_from_recent_nap_milli: Option<i64>,
}

impl Sleep {
    pub fn scored(&self) -> Option<&SleepScore> {
        if self.score_state == ScoreState::Scored {
            self.score.as_ref()
        } else {
            None
        }
    }
}

impl Record for Sleep {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.start
    }
}

// ─── Workout ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Workout {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Provider sport slug, e.g. "running" or "weightlifting"
    pub sport_name: String,
    pub score_state: ScoreState,
    #[serde(default)]
    pub score: Option<WorkoutScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutScore {
    pub strain: Option<f64>,
    pub average_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    #[serde(default)]
    pub kilojoule: Option<f64>,
    #[serde(default)]
    pub zone_durations: Option<ZoneDurations>,
}

/// Time in each heart-rate zone, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneDurations {
    #[serde(default)]
    pub zone_zero_milli: Option<i64>,
    pub zone_one_milli: Option<i64>,
    pub zone_two_milli: Option<i64>,
    pub zone_three_milli: Option<i64>,
    pub zone_four_milli: Option<i64>,
    pub zone_five_milli: Option<i64>,
}

impl ZoneDurations {
    /// Zones 1-5 in order.
    pub fn scored_zones(&self) -> [Option<i64>; 5] {
        [
            self.zone_one_milli,
            self.zone_two_milli,
            self.zone_three_milli,
            self.zone_four_milli,
            self.zone_five_milli,
        ]
    }
}

impl Workout {
    pub fn scored(&self) -> Option<&WorkoutScore> {
        if self.score_state == ScoreState::Scored {
            self.score.as_ref()
        } else {
            None
        }
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds().max(0) as f64 / 60.0
    }
}

impl Record for Workout {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.start
    }
}

// ─── Healthspan ──────────────────────────────────────────────

/// Weekly biological-age estimate.
#[derive(Debug, Clone, Deserialize)]
pub struct AgingMetric {
    pub date: NaiveDate,
    /// Biological ("WHOOP") age in years
    pub biological_age: Option<f64>,
    /// Years of biological aging per calendar year
    pub pace_of_aging: Option<f64>,
}

impl Record for AgingMetric {
    fn key(&self) -> String {
        self.date.to_string()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
    }
}

// ─── Single records ──────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct BodyMeasurement {
    pub height_meter: Option<f64>,
    pub weight_kilogram: Option<f64>,
    pub max_heart_rate: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
}
