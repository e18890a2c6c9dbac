// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bearer tokens for Garmin Connect
//!
//! Logging in is done outside this server (the Garmin login flow writes
//! `oauth2_token.json` into the token directory). The server only reads the
//! stored token.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::ProviderError;
use crate::constants::garmin::OAUTH2_TOKEN_FILE;

/// An access token and, when known, its expiry
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn session(&self) -> Result<Session, ProviderError>;
}

/// A fixed token from configuration
#[derive(Debug, Clone)]
pub struct StaticTokenStore {
    session: Session,
}

impl StaticTokenStore {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            session: Session::new(access_token, None),
        }
    }
}

#[async_trait]
impl CredentialStore for StaticTokenStore {
    async fn session(&self) -> Result<Session, ProviderError> {
        Ok(self.session.clone())
    }
}

#[derive(Debug, Deserialize)]
struct StoredOAuth2Token {
    access_token: String,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Reads `oauth2_token.json` from a token directory on every request, so a
/// token refreshed by the login tool is picked up without a restart
#[derive(Debug, Clone)]
pub struct TokenFileStore {
    path: PathBuf,
}

impl TokenFileStore {
    pub fn new(token_dir: impl AsRef<Path>) -> Self {
        Self {
            path: token_dir.as_ref().join(OAUTH2_TOKEN_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, contents: &str) -> Result<Session, ProviderError> {
        let stored: StoredOAuth2Token = serde_json::from_str(contents).map_err(|e| {
            ProviderError::Credentials(format!("{} is not a valid token file: {e}", self.path.display()))
        })?;

        let expires_at = match stored.expires_at {
            Some(seconds) => Some(DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
                ProviderError::Credentials(format!("{} has an out of range expires_at", self.path.display()))
            })?),
            None => None,
        };

        Ok(Session::new(stored.access_token, expires_at))
    }
}

#[async_trait]
impl CredentialStore for TokenFileStore {
    async fn session(&self) -> Result<Session, ProviderError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ProviderError::Credentials(format!("cannot read {}: {e}", self.path.display()))
        })?;

        let session = self.parse(&contents)?;
        if session.access_token().is_empty() {
            return Err(ProviderError::Credentials(format!(
                "{} holds an empty access token",
                self.path.display()
            )));
        }
        if session.is_expired_at(Utc::now()) {
            return Err(ProviderError::Credentials(format!(
                "token in {} has expired; log in to Garmin again",
                self.path.display()
            )));
        }
        Ok(session)
    }
}
