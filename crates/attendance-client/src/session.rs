//! Authentication session and its persisted record.
//!
//! At most one [`Session`] is live per client. It is either established by a
//! successful login or restored from durable storage at startup. A persisted
//! record that cannot be read back is treated as "logged out": it is removed
//! and never reported to the user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use attendance_core::error::{AppError, ErrorKind};
use attendance_core::result::AppResult;
use attendance_core::types::{Role, UserId};

use crate::storage::DurableStorage;

/// Fixed storage key of the persisted session.
pub const SESSION_KEY: &str = "attendance_session";

/// An authenticated session. Token, role and user id always come together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// API base URL the session was established against.
    pub api_base: String,
    /// Bearer token.
    pub token: String,
    /// Role of the user.
    pub role: Role,
    /// Id of the user.
    pub user_id: UserId,
}

impl Session {
    /// Whether the user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Lenient shape of the persisted record; validated as a whole.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    user_id: Option<UserId>,
}

impl PersistedSession {
    fn into_session(self, default_api_base: &str) -> AppResult<Session> {
        let api_base = self
            .api_base
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| default_api_base.to_string());

        match (self.token.filter(|t| !t.is_empty()), self.role, self.user_id) {
            (Some(token), Some(role), Some(user_id)) => Ok(Session {
                api_base,
                token,
                role,
                user_id,
            }),
            _ => Err(AppError::session_corrupt(
                "persisted session is missing token, role or userId",
            )),
        }
    }
}

/// Owner of the live session and its persisted copy.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    current: Option<Session>,
}

impl SessionStore {
    /// Create a store with no live session.
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            storage,
            current: None,
        }
    }

    /// The live session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Whether a session is live.
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Role of the live session.
    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(|s| s.role)
    }

    /// Restore the persisted session.
    ///
    /// Never fails: unreadable or incomplete data is removed from storage
    /// and reported as "no session".
    pub async fn restore(&mut self, default_api_base: &str) -> Option<Session> {
        let raw = match self.storage.get(SESSION_KEY).await {
            Ok(Some(raw)) => Ok(raw),
            Ok(None) => return None,
            Err(e) if e.kind == ErrorKind::Serialization => Err(AppError::session_corrupt(
                format!("undecodable session record: {}", e.message),
            )),
            Err(e) => {
                warn!(error = %e, "could not read persisted session; starting logged out");
                self.current = None;
                return None;
            }
        };

        let parsed = raw
            .and_then(|raw| {
                serde_json::from_str::<PersistedSession>(&raw).map_err(|e| {
                    AppError::session_corrupt(format!("unparseable session record: {e}"))
                })
            })
            .and_then(|record| record.into_session(default_api_base));

        match parsed {
            Ok(session) => {
                info!(role = %session.role, user_id = %session.user_id, "session restored");
                self.current = Some(session.clone());
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "discarding persisted session");
                self.current = None;
                if let Err(remove_err) = self.storage.remove(SESSION_KEY).await {
                    warn!(error = %remove_err, "failed to remove corrupt session record");
                }
                None
            }
        }
    }

    /// Set and persist a new session. All four fields are written in one record.
    pub async fn establish(
        &mut self,
        api_base: &str,
        token: &str,
        role: Role,
        user_id: UserId,
    ) -> AppResult<&Session> {
        let session = Session {
            api_base: api_base.to_string(),
            token: token.to_string(),
            role,
            user_id,
        };
        let record = serde_json::to_string(&session)?;
        self.storage.set(SESSION_KEY, &record).await?;

        info!(role = %role, user_id = %user_id, "session established");
        Ok(self.current.insert(session))
    }

    /// Drop the live session and remove the persisted record.
    pub async fn clear(&mut self) -> AppResult<()> {
        self.current = None;
        self.storage.remove(SESSION_KEY).await?;
        info!("session cleared");
        Ok(())
    }
}
