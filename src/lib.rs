// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! WHOOP tools: read-only access to a WHOOP account for an AI agent.
//!
//! This crate keeps an authenticated session with WHOOP, fetches the raw
//! physiological records and shapes them into compact tool responses
//! (overview, sleep, recovery, strain, healthspan).

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::WhoopTools;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tools: WhoopTools,
}
