// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session management for the WHOOP account.
//!
//! Holds the single process-wide session and hands out valid access tokens:
//! - Cached token returned while it is outside the refresh margin
//! - Refresh exchange first when the token expires, login as fallback
//! - One renewal at a time, whatever the number of concurrent callers
//! - Bounded retry with exponential backoff for transient auth failures

use crate::error::{AppError, Result};
use crate::models::Credentials;
use crate::services::identity::{IdentityClient, TokenGrant};
use crate::time_utils::Clock;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Margin before token expiration when we proactively renew (60 seconds).
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Opaque handle to a bearer token.
///
/// The token text never leaves this type except onto an outgoing request.
#[derive(Clone)]
pub struct AccessToken(Arc<SecretString>);

impl AccessToken {
    fn new(secret: SecretString) -> Self {
        Self(Arc::new(secret))
    }

    /// Attach the token to a request as a bearer credential.
    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.0.expose_secret())
    }

    fn same_as(&self, other: &AccessToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.expose_secret() == other.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Cached tokens with expiry information.
struct Session {
    access_token: AccessToken,
    refresh_token: Option<Arc<SecretString>>,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Retry policy for transient identity failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure
    pub base_delay: std::time::Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay_after(&self, attempt: u32) -> std::time::Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Owner of the process-wide WHOOP session.
///
/// Cloning is cheap; clones share the same session slot.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    identity: IdentityClient,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    /// Current session (read without blocking other readers).
    slot: RwLock<Option<Session>>,
    /// Serializes renewals; held by the renewal task, never by readers.
    refresh_lock: Arc<Mutex<()>>,
    /// Identity exchanges performed (logins + refreshes).
    exchanges: AtomicU64,
}

impl SessionManager {
    pub fn new(
        identity: IdentityClient,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                identity,
                credentials,
                clock,
                retry,
                slot: RwLock::new(None),
                refresh_lock: Arc::new(Mutex::new(())),
                exchanges: AtomicU64::new(0),
            }),
        }
    }

    /// Get a valid (non-expired) access token.
    ///
    /// 1. Check the cached session (fast path - no I/O)
    /// 2. Acquire the refresh lock so only one task renews
    /// 3. Re-check after the lock (another task may have renewed)
    /// 4. Renew in a detached task and wait for it
    ///
    /// The renewal task owns the lock guard, so a caller that is cancelled
    /// while waiting does not abandon a half-finished exchange.
    pub async fn get_valid_token(&self) -> Result<AccessToken> {
        if let Some(token) = self.inner.cached_token().await {
            return Ok(token);
        }

        let guard = self.inner.refresh_lock.clone().lock_owned().await;

        if let Some(token) = self.inner.cached_token().await {
            return Ok(token);
        }

        let inner = self.inner.clone();
        let renewal = tokio::spawn(async move {
            let _guard = guard;
            inner.renew().await
        });

        renewal
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Session renewal task failed: {}", e)))?
    }

    /// Drop the session if it still holds `stale`.
    ///
    /// Used after the data API rejects a token. The next
    /// [`get_valid_token`](Self::get_valid_token) performs a full login.
    /// Concurrent callers holding the same stale token cause one login.
    pub async fn invalidate(&self, stale: &AccessToken) {
        let mut slot = self.inner.slot.write().await;
        if slot
            .as_ref()
            .is_some_and(|session| session.access_token.same_as(stale))
        {
            *slot = None;
            tracing::info!("Session invalidated after token rejection");
        }
    }

    /// Number of identity exchanges performed so far.
    pub fn exchange_count(&self) -> u64 {
        self.inner.exchanges.load(Ordering::Relaxed)
    }

    /// Expiry of the cached session, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner.slot.read().await.as_ref().map(|s| s.expires_at)
    }
}

impl SessionInner {
    async fn cached_token(&self) -> Option<AccessToken> {
        let now = self.clock.now();
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|session| session.is_valid(now))
            .map(|session| session.access_token.clone())
    }

    /// Renew the session, retrying transient failures, and publish it.
    async fn renew(&self) -> Result<AccessToken> {
        let mut attempt = 1;
        loop {
            match self.exchange().await {
                Ok(session) => {
                    let token = session.access_token.clone();
                    tracing::info!(expires_at = %session.expires_at, "WHOOP session established");
                    *self.slot.write().await = Some(session);
                    return Ok(token);
                }
                Err(err @ AppError::TransientAuth(_)) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient auth failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One refresh-or-login exchange.
    async fn exchange(&self) -> Result<Session> {
        let refresh_token = self
            .slot
            .read()
            .await
            .as_ref()
            .and_then(|session| session.refresh_token.clone());

        if let Some(refresh_token) = refresh_token {
            self.exchanges.fetch_add(1, Ordering::Relaxed);
            match self.identity.refresh(refresh_token.expose_secret()).await {
                Ok(grant) => {
                    tracing::info!("Access token refreshed");
                    return self.session_from(grant, Some(refresh_token));
                }
                Err(AppError::Authentication(reason)) => {
                    tracing::warn!(reason = %reason, "Refresh token rejected, logging in again");
                    if let Some(session) = self.slot.write().await.as_mut() {
                        session.refresh_token = None;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        self.exchanges.fetch_add(1, Ordering::Relaxed);
        let grant = self.identity.login(&self.credentials).await?;
        tracing::info!("Logged in to WHOOP");
        self.session_from(grant, None)
    }

    fn session_from(
        &self,
        grant: TokenGrant,
        previous_refresh: Option<Arc<SecretString>>,
    ) -> Result<Session> {
        let expires_at = Duration::try_seconds(grant.expires_in_secs)
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::DataFormat(format!(
                    "Token lifetime of {}s is out of range",
                    grant.expires_in_secs
                ))
            })?;

        Ok(Session {
            access_token: AccessToken::new(grant.access_token),
            refresh_token: grant.refresh_token.map(Arc::new).or(previous_refresh),
            expires_at,
        })
    }
}
