// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credentials;
pub mod records;
pub mod responses;

pub use credentials::Credentials;
pub use records::{
    AgingMetric, BodyMeasurement, Cycle, Page, Record, Recovery, ScoreState, Sleep, UserProfile,
    Workout,
};
pub use responses::{Insight, Metric, RecoveryBand, ToolResponse};
