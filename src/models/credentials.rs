// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! WHOOP account credentials.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

/// Account identifier and password, supplied once at startup.
///
/// The password is never logged: `Debug` prints only the account identifier.
#[derive(Clone)]
pub struct Credentials {
    account_id: String,
    secret: Arc<SecretString>,
}

impl Credentials {
    pub fn new(account_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            secret: Arc::new(SecretString::from(secret.into())),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub(crate) fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn is_complete(&self) -> bool {
        !self.account_id.is_empty() && !self.secret.expose_secret().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
