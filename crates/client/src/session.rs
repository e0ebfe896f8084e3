use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use api_types::auth::AuthResponse;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;

pub const DEFAULT_SESSION_PATH: &str = "config/session.json";

/// Bearer credentials returned by `login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
}

impl Session {
    /// Value of the `Authorization` header, e.g. `bearer eyJ...`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl From<AuthResponse> for Session {
    fn from(value: AuthResponse) -> Self {
        Self {
            access_token: value.access_token,
            token_type: value.token_type,
        }
    }
}

/// Shared slot holding the current session, optionally mirrored to a JSON
/// file so that it survives between runs.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn in_memory(session: Option<Session>) -> Self {
        Self {
            path: None,
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Loads the session file at `path`. A missing file means "logged out".
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = match fs::read_to_string(&path) {
            Ok(content) => Some(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            inner: Arc::new(RwLock::new(session)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn store(&self, session: Session) -> Result<()> {
        let mut guard = self.inner.write().await;
        if let Some(path) = &self.path {
            write_session_file(path, &session)?;
        }
        *guard = Some(session);
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        let mut guard = self.inner.write().await;
        *guard = None;
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

fn write_session_file(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(session)?;
    fs::write(path, payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("homebook_session_{}_{name}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn authorization_joins_type_and_token() {
        let session = Session {
            access_token: "abc".to_string(),
            token_type: "bearer".to_string(),
        };
        assert_eq!(session.authorization(), "bearer abc");
    }

    #[tokio::test]
    async fn missing_file_loads_as_logged_out() {
        let store = SessionStore::load(temp_path("missing")).unwrap();
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn store_and_clear_round_trip_through_the_file() {
        let path = temp_path("roundtrip");
        let store = SessionStore::load(&path).unwrap();
        let session = Session {
            access_token: "token".to_string(),
            token_type: "bearer".to_string(),
        };
        store.store(session.clone()).await.unwrap();

        let reloaded = SessionStore::load(&path).unwrap();
        assert_eq!(reloaded.current().await, Some(session));

        reloaded.clear().await.unwrap();
        assert!(!path.exists());
        assert!(SessionStore::load(&path).unwrap().current().await.is_none());
    }
}
