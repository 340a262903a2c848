// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response shaping: raw WHOOP records to tool responses.
//!
//! Every function here is pure. Inputs are the records fetched for one tool
//! call; outputs are complete responses where each metric the provider did
//! not supply is `Metric::Unavailable`.

use crate::models::records::{CycleScore, SleepScore};
use crate::models::responses::{
    ActivityEntry, HealthspanResponse, OverviewResponse, RecoveryResponse, SleepResponse,
    SleepStages, StrainResponse, TrendMetric, WeeklyDelta, WorkoutSummary, ZoneMinutes,
};
use crate::models::{
    AgingMetric, BodyMeasurement, Cycle, Metric, RecoveryBand, Recovery, Sleep, UserProfile,
    Workout,
};
use crate::services::insights::{self, RecoverySignals, SleepSignals};
use crate::time_utils::{format_local_time, DateRange};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

/// Days of prior recoveries averaged into the HRV/RHR baseline.
pub const BASELINE_DAYS: i64 = 30;
/// Fewer prior samples than this leaves the baseline unavailable.
pub const MIN_BASELINE_SAMPLES: usize = 3;
/// Number of heart-rate zones reported by the strain tool.
pub const ZONE_COUNT: usize = 5;
/// Week-over-week deltas included in the healthspan trend.
pub const HEALTHSPAN_TREND_WEEKS: usize = 4;

const KILOJOULES_PER_KCAL: f64 = 4.184;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;
const DAYS_PER_YEAR: f64 = 365.2425;

/// Sports counted as strength work.
pub const STRENGTH_SPORTS: &[&str] = &[
    "weightlifting",
    "powerlifting",
    "strength-trainer",
    "functional-fitness",
    "crossfit",
    "bodybuilding",
];

/// The day a tool call is about.
#[derive(Debug, Clone, Copy)]
pub struct DayContext {
    pub date: NaiveDate,
    pub timezone: Tz,
}

impl DayContext {
    pub fn new(date: NaiveDate, timezone: Tz) -> Self {
        Self { date, timezone }
    }

    pub fn range(&self) -> DateRange {
        DateRange::day(self.date, self.timezone)
    }
}

// ─── Overview ────────────────────────────────────────────────

pub fn shape_overview(
    ctx: DayContext,
    recoveries: &[Recovery],
    cycles: &[Cycle],
    sleeps: &[Sleep],
    workouts: &[Workout],
    body: &BodyMeasurement,
) -> OverviewResponse {
    let recovery_score = day_recovery(ctx, recoveries)
        .and_then(|r| r.scored())
        .and_then(|s| s.recovery_score);
    let cycle_score = day_cycle(ctx, cycles).and_then(Cycle::scored);
    let sleep_score = main_sleep(ctx, sleeps).and_then(Sleep::scored);

    let activities = day_workouts(ctx, workouts)
        .map(|w| ActivityEntry {
            name: display_sport_name(&w.sport_name),
            start: format_local_time(w.start, ctx.timezone),
            end: format_local_time(w.end, ctx.timezone),
            strain: w.scored().and_then(|s| s.strain).map(round1).into(),
        })
        .collect();

    OverviewResponse {
        date: ctx.date,
        recovery_score: recovery_score.into(),
        recovery_band: recovery_score.map(RecoveryBand::from_score).into(),
        day_strain: cycle_score.and_then(|s| s.strain).map(round1).into(),
        calories: cycle_score.and_then(calories).into(),
        average_heart_rate: cycle_score.and_then(|s| s.average_heart_rate).into(),
        max_heart_rate: cycle_score.and_then(|s| s.max_heart_rate).into(),
        sleep_performance_pct: sleep_score
            .and_then(|s| s.sleep_performance_percentage)
            .into(),
        hours_slept: sleep_score.and_then(hours_asleep).into(),
        weight_kg: body.weight_kilogram.map(round1).into(),
        activities,
    }
}

fn calories(score: &CycleScore) -> Option<u32> {
    score
        .kilojoule
        .filter(|kj| *kj >= 0.0)
        .map(|kj| (kj / KILOJOULES_PER_KCAL).round() as u32)
}

// ─── Sleep ───────────────────────────────────────────────────

pub fn shape_sleep(ctx: DayContext, sleeps: &[Sleep]) -> SleepResponse {
    let score = main_sleep(ctx, sleeps).and_then(Sleep::scored);
    let stages = score.and_then(|s| s.stage_summary.as_ref());

    let signals = SleepSignals {
        performance_pct: score.and_then(|s| s.sleep_performance_percentage),
        efficiency_pct: score.and_then(|s| s.sleep_efficiency_percentage),
        consistency_pct: score.and_then(|s| s.sleep_consistency_percentage),
    };

    SleepResponse {
        date: ctx.date,
        performance_pct: signals.performance_pct.into(),
        hours_slept: score.and_then(hours_asleep).into(),
        hours_needed: score.and_then(hours_needed).into(),
        consistency_pct: signals.consistency_pct.into(),
        efficiency_pct: signals.efficiency_pct.into(),
        respiratory_rate: score.and_then(|s| s.respiratory_rate).map(round1).into(),
        stages: SleepStages {
            light_hours: hours(stages.and_then(|s| s.total_light_sleep_time_milli)),
            deep_hours: hours(stages.and_then(|s| s.total_slow_wave_sleep_time_milli)),
            rem_hours: hours(stages.and_then(|s| s.total_rem_sleep_time_milli)),
            awake_hours: hours(stages.and_then(|s| s.total_awake_time_milli)),
        },
        disturbances: stages.and_then(|s| s.disturbance_count).into(),
        insight: insights::sleep_insight(&signals),
    }
}

/// Time asleep: in bed minus awake.
fn hours_asleep(score: &SleepScore) -> Option<f64> {
    let stages = score.stage_summary.as_ref()?;
    let asleep = stages.total_in_bed_time_milli? - stages.total_awake_time_milli?;
    Some(round2(asleep.max(0) as f64 / MILLIS_PER_HOUR))
}

/// Provider sleep need: baseline plus debt, strain and nap adjustments.
///
/// Adjustments the provider omits count as zero; a missing baseline makes
/// the whole need unavailable.
fn hours_needed(score: &SleepScore) -> Option<f64> {
    let need = score.sleep_needed.as_ref()?;
    let total = need.baseline_milli?
        + need.need_from_sleep_debt_milli.unwrap_or(0)
        + need.need_from_recent_strain_milli.unwrap_or(0)
        + need.need_from_recent_nap_milli.unwrap_or(0);
    Some(round2(total.max(0) as f64 / MILLIS_PER_HOUR))
}

fn hours(millis: Option<i64>) -> Metric<f64> {
    millis
        .map(|ms| round2(ms.max(0) as f64 / MILLIS_PER_HOUR))
        .into()
}

// ─── Recovery ────────────────────────────────────────────────

pub fn shape_recovery(
    ctx: DayContext,
    recoveries: &[Recovery],
    sleeps: &[Sleep],
) -> RecoveryResponse {
    let score = day_recovery(ctx, recoveries).and_then(Recovery::scored);
    let recovery_score = score.and_then(|s| s.recovery_score);

    // Baseline window: the BASELINE_DAYS before the target day
    let day_start = ctx.range().start;
    let window_start = day_start - Duration::days(BASELINE_DAYS);
    let prior: Vec<_> = recoveries
        .iter()
        .filter(|r| r.created_at >= window_start && r.created_at < day_start)
        .filter_map(Recovery::scored)
        .collect();

    let hrv = score.and_then(|s| s.hrv_rmssd_milli);
    let hrv_baseline = mean(prior.iter().filter_map(|s| s.hrv_rmssd_milli));
    let rhr = score.and_then(|s| s.resting_heart_rate);
    let rhr_baseline = mean(prior.iter().filter_map(|s| s.resting_heart_rate));

    let respiratory_rate = main_sleep(ctx, sleeps)
        .and_then(Sleep::scored)
        .and_then(|s| s.respiratory_rate);

    RecoveryResponse {
        date: ctx.date,
        score: recovery_score.into(),
        band: recovery_score.map(RecoveryBand::from_score).into(),
        calibrating: score.is_some_and(|s| s.user_calibrating),
        hrv_ms: trend(hrv, hrv_baseline),
        resting_heart_rate_bpm: trend(rhr, rhr_baseline),
        respiratory_rate: respiratory_rate.map(round1).into(),
        spo2_pct: score.and_then(|s| s.spo2_percentage).map(round1).into(),
        skin_temp_celsius: score.and_then(|s| s.skin_temp_celsius).map(round1).into(),
        insight: insights::recovery_insight(&RecoverySignals {
            score: recovery_score,
        }),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let samples: Vec<f64> = values.collect();
    if samples.len() < MIN_BASELINE_SAMPLES {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

fn trend(value: Option<f64>, baseline: Option<f64>) -> TrendMetric {
    let trend_pct = match (value, baseline) {
        (Some(v), Some(b)) if b > 0.0 => Some(((v - b) / b * 100.0).round() as i32),
        _ => None,
    };
    TrendMetric {
        value: value.map(round1).into(),
        baseline: baseline.map(round1).into(),
        trend_pct: trend_pct.into(),
    }
}

// ─── Strain ──────────────────────────────────────────────────

pub fn shape_strain(ctx: DayContext, cycles: &[Cycle], workouts: &[Workout]) -> StrainResponse {
    let cycle_score = day_cycle(ctx, cycles).and_then(Cycle::scored);
    let day_workouts: Vec<&Workout> = day_workouts(ctx, workouts).collect();

    let heart_rate_zones = (0..ZONE_COUNT)
        .map(|index| ZoneMinutes {
            zone: index as u8 + 1,
            minutes: if cycle_score.is_some() {
                zone_minutes(&day_workouts, index)
            } else {
                Metric::Unavailable
            },
        })
        .collect();

    let strength_minutes: f64 = day_workouts
        .iter()
        .filter(|w| is_strength(&w.sport_name))
        .map(|w| w.duration_minutes())
        .sum();

    let summaries = day_workouts
        .iter()
        .map(|w| {
            let score = w.scored();
            WorkoutSummary {
                name: display_sport_name(&w.sport_name),
                start: format_local_time(w.start, ctx.timezone),
                duration_minutes: round1(w.duration_minutes()),
                average_heart_rate: score.and_then(|s| s.average_heart_rate).into(),
                max_heart_rate: score.and_then(|s| s.max_heart_rate).into(),
                strain: score.and_then(|s| s.strain).map(round1).into(),
            }
        })
        .collect();

    StrainResponse {
        date: ctx.date,
        day_strain: cycle_score.and_then(|s| s.strain).map(round1).into(),
        heart_rate_zones,
        strength_minutes: Metric::Value(round1(strength_minutes)),
        steps: cycle_score.and_then(|s| s.steps).into(),
        workouts: summaries,
    }
}

/// Minutes in zone `index` (0-based) summed over workouts.
///
/// Unavailable as soon as one workout lacks zone data.
fn zone_minutes(workouts: &[&Workout], index: usize) -> Metric<f64> {
    let mut total_ms = 0i64;
    for workout in workouts {
        let zone = workout
            .scored()
            .and_then(|s| s.zone_durations.as_ref())
            .and_then(|z| z.scored_zones()[index]);
        match zone {
            Some(ms) => total_ms += ms.max(0),
            None => return Metric::Unavailable,
        }
    }
    Metric::Value(round1(total_ms as f64 / MILLIS_PER_MINUTE))
}

fn is_strength(sport_name: &str) -> bool {
    let normalized = sport_name.trim().to_ascii_lowercase().replace([' ', '_'], "-");
    STRENGTH_SPORTS.contains(&normalized.as_str())
}

/// "functional-fitness" -> "Functional Fitness"
fn display_sport_name(sport_name: &str) -> String {
    sport_name
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Healthspan ──────────────────────────────────────────────

pub fn shape_healthspan(metrics: &[AgingMetric], profile: &UserProfile) -> HealthspanResponse {
    let mut ordered: Vec<&AgingMetric> = metrics.iter().collect();
    ordered.sort_by_key(|m| m.date);

    let latest = ordered.last().copied();
    let biological_age = latest.and_then(|m| m.biological_age);
    let chronological_age = latest
        .zip(profile.birthdate)
        .and_then(|(m, birthdate)| age_in_years(birthdate, m.date));

    let age_delta = biological_age
        .zip(chronological_age)
        .map(|(bio, chrono)| round1(bio - chrono));

    let recent = &ordered[ordered.len().saturating_sub(HEALTHSPAN_TREND_WEEKS + 1)..];
    let weekly_trend = recent
        .windows(2)
        .map(|pair| WeeklyDelta {
            week_ending: pair[1].date,
            delta_years: pair[0]
                .biological_age
                .zip(pair[1].biological_age)
                .map(|(before, after)| round1(after - before))
                .into(),
        })
        .collect();

    HealthspanResponse {
        measured_on: latest.map(|m| m.date).into(),
        biological_age: biological_age.map(round1).into(),
        chronological_age: chronological_age.into(),
        age_delta: age_delta.into(),
        pace_of_aging: latest.and_then(|m| m.pace_of_aging).map(round2).into(),
        weekly_trend,
    }
}

fn age_in_years(birthdate: NaiveDate, on: NaiveDate) -> Option<f64> {
    let days = (on - birthdate).num_days();
    (days >= 0).then(|| round1(days as f64 / DAYS_PER_YEAR))
}

// ─── Record selection ────────────────────────────────────────

/// Latest recovery created on the target day.
fn day_recovery(ctx: DayContext, recoveries: &[Recovery]) -> Option<&Recovery> {
    let range = ctx.range();
    recoveries
        .iter()
        .filter(|r| range.contains(r.created_at))
        .max_by_key(|r| r.created_at)
}

/// Latest cycle that started before the end of the target day.
fn day_cycle(ctx: DayContext, cycles: &[Cycle]) -> Option<&Cycle> {
    let range = ctx.range();
    cycles
        .iter()
        .filter(|c| c.start < range.end && c.end.is_none_or(|end| end > range.start))
        .max_by_key(|c| c.start)
}

/// Latest non-nap sleep that ended on the target day.
fn main_sleep(ctx: DayContext, sleeps: &[Sleep]) -> Option<&Sleep> {
    let range = ctx.range();
    sleeps
        .iter()
        .filter(|s| !s.nap && range.contains(s.end))
        .max_by_key(|s| s.end)
}

fn day_workouts(ctx: DayContext, workouts: &[Workout]) -> impl Iterator<Item = &Workout> {
    let range = ctx.range();
    workouts.iter().filter(move |w| range.contains(w.start))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
