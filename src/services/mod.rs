// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod insights;
pub mod session;
pub mod shaper;
pub mod telemetry;
pub mod tools;

pub use identity::{IdentityClient, TokenGrant};
pub use session::{AccessToken, RetryPolicy, SessionManager};
pub use telemetry::TelemetryClient;
pub use tools::{ToolArgs, ToolName, WhoopTools};
