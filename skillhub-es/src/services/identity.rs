//! User identity resolution
//!
//! Maps an optional requested user id to the authoritative user id for a
//! submission. Resolution failures are authentication failures and are
//! never retried.

use async_trait::async_trait;
use skillhub_common::{Error, Result};
use sqlx::SqlitePool;

/// User id used when anonymous resolution is permitted
pub const ANONYMOUS_USER: &str = "anonymous";

/// Authenticated caller context attached to each request by the API layer
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    pub caller_id: Option<String>,
}

impl RequestIdentity {
    pub fn new(caller_id: Option<String>) -> Self {
        Self { caller_id }
    }

    /// Caller identifier for diagnostics
    pub fn caller_label(&self) -> &str {
        self.caller_id.as_deref().unwrap_or("<unauthenticated>")
    }
}

/// Identity resolution seam between the submission core and user storage
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the effective user id for a submission.
    ///
    /// A requested id must name a known user. Absent a requested id, the
    /// authenticated caller is used. `allow_anonymous` only applies when
    /// neither is present; the submission path always passes `false`.
    async fn resolve(
        &self,
        identity: &RequestIdentity,
        requested: Option<&str>,
        allow_anonymous: bool,
    ) -> Result<String>;
}

/// Resolver backed by the users table
pub struct DbIdentityResolver {
    db: SqlitePool,
}

impl DbIdentityResolver {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityResolver for DbIdentityResolver {
    async fn resolve(
        &self,
        identity: &RequestIdentity,
        requested: Option<&str>,
        allow_anonymous: bool,
    ) -> Result<String> {
        if let Some(requested) = requested {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?)")
                    .bind(requested)
                    .fetch_one(&self.db)
                    .await?;

            if !exists {
                return Err(Error::Auth(format!("unknown user id [{}]", requested)));
            }

            return Ok(requested.to_string());
        }

        // Caller identity was established upstream by the auth layer
        if let Some(caller) = &identity.caller_id {
            return Ok(caller.clone());
        }

        if allow_anonymous {
            return Ok(ANONYMOUS_USER.to_string());
        }

        Err(Error::Auth(
            "no authenticated caller and no user id supplied".to_string(),
        ))
    }
}
