//! Client session lifecycle.
//!
//! A [`Session`] is passed explicitly to every authenticated call. The
//! [`SessionContext`] owns the current one: it is loaded from a
//! [`SessionStore`] on start, replaced on sign-in, and cleared on sign-out
//! or as soon as the server answers 401.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::models::Role;

/// The signed-in user, as cached alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role.
    #[serde(default)]
    pub role: Role,
}

/// Bearer token plus the user it belongs to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque access token.
    pub token: String,
    /// Cached user profile.
    pub user: SessionUser,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Whether the cached user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// JSON file holding the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session.
    ///
    /// A missing file means signed out. An unreadable file is discarded and
    /// also treated as signed out.
    pub async fn load(&self) -> ClientResult<Option<Session>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding malformed session file");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Persist a session, replacing any previous one.
    pub async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    /// Remove the saved session. Succeeds if there was none.
    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The current session and where it is persisted.
#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    current: Option<Session>,
}

impl SessionContext {
    /// Start from whatever the store holds.
    pub async fn load(store: SessionStore) -> ClientResult<Self> {
        let current = store.load().await?;
        debug!(signed_in = current.is_some(), "Session loaded");
        Ok(Self { store, current })
    }

    /// The current session, if signed in.
    #[must_use]
    pub const fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Adopt and persist a freshly issued session.
    pub async fn sign_in(&mut self, session: Session) -> ClientResult<()> {
        self.store.save(&session).await?;
        self.current = Some(session);
        Ok(())
    }

    /// Forget the session locally and on disk.
    pub async fn sign_out(&mut self) -> ClientResult<()> {
        self.current = None;
        self.store.clear().await
    }

    /// Pass a call's result through, signing out first if it was a 401.
    pub async fn check<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        if matches!(result, Err(ClientError::Unauthorized)) && self.current.is_some() {
            debug!("Server rejected session token, signing out");
            if let Err(e) = self.sign_out().await {
                warn!(error = %e, "Failed to clear rejected session");
            }
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_session() -> Session {
        Session::new(
            "token-123",
            SessionUser {
                id: "user1".to_string(),
                name: "Frank Castle".to_string(),
                role: Role::User,
            },
        )
    }

    #[tokio::test]
    async fn test_load_missing_file_is_signed_out() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&create_test_session()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(create_test_session()));
    }

    #[tokio::test]
    async fn test_malformed_file_is_discarded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = SessionStore::new(&path);

        assert!(store.load().await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unauthorized_result_signs_out() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&create_test_session()).await.unwrap();

        let mut ctx = SessionContext::load(store.clone()).await.unwrap();
        assert!(ctx.current().is_some());

        let result: ClientResult<()> = ctx.check(Err(ClientError::Unauthorized)).await;

        assert!(matches!(result, Err(ClientError::Unauthorized)));
        assert!(ctx.current().is_none());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_errors_keep_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let mut ctx = SessionContext::load(store).await.unwrap();
        ctx.sign_in(create_test_session()).await.unwrap();

        let result: ClientResult<()> = ctx
            .check(Err(ClientError::Api {
                status: 403,
                code: "FORBIDDEN".to_string(),
                message: "Admin access required".to_string(),
            }))
            .await;

        assert!(result.is_err());
        assert!(ctx.current().is_some());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", create_test_session());
        assert!(!rendered.contains("token-123"));
    }
}
