//! JSON file credential store
//!
//! File layout: `{ "users": [ { "email", "password", "user_type" } ] }`.
//! Passwords are stored as given, so the file is replaced through a
//! staging copy that only the owner can read.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::application::ports::{CredentialError, CredentialStore};
use crate::domain::auth::{StoredUser, UserType};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    users: Vec<StoredUser>,
}

/// Credential store backed by a JSON file, cached in memory after `load`
pub struct JsonCredentialStore {
    path: PathBuf,
    users: Mutex<Vec<StoredUser>>,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            users: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of users currently held in memory
    pub fn len(&self) -> usize {
        self.users.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.lock().is_empty()
    }

    fn parse(content: &str) -> Result<Vec<StoredUser>, CredentialError> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file: CredentialsFile =
            serde_json::from_str(content).map_err(|e| CredentialError::ParseError(e.to_string()))?;
        Ok(file.users)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "users.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    #[cfg(unix)]
    async fn restrict_permissions(path: &Path) -> Result<(), CredentialError> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| CredentialError::WriteError(e.to_string()))
    }

    #[cfg(not(unix))]
    async fn restrict_permissions(_path: &Path) -> Result<(), CredentialError> {
        Ok(())
    }

    async fn persist(&self, users: Vec<StoredUser>) -> Result<(), CredentialError> {
        let write_err = |e: std::io::Error| CredentialError::WriteError(e.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(&CredentialsFile { users })
            .map_err(|e| CredentialError::WriteError(e.to_string()))?;

        let staging = self.staging_path();
        fs::write(&staging, content).await.map_err(write_err)?;
        Self::restrict_permissions(&staging).await?;
        fs::rename(&staging, &self.path).await.map_err(write_err)
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn load(&self) -> Result<usize, CredentialError> {
        let users = match fs::read_to_string(&self.path).await {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(CredentialError::ReadError(e.to_string())),
        };

        let count = users.len();
        *self.users.lock() = users;
        tracing::debug!(path = %self.path.display(), users = count, "credentials loaded");
        Ok(count)
    }

    fn verify(&self, email: &str, password: &str) -> Option<StoredUser> {
        self.users
            .lock()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()) && u.password == password)
            .cloned()
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<(), CredentialError> {
        let email = email.trim();
        let snapshot = {
            let mut users = self.users.lock();
            if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
                return Err(CredentialError::AlreadyExists(email.to_string()));
            }
            users.push(StoredUser {
                email: email.to_string(),
                password: password.to_string(),
                user_type,
            });
            users.clone()
        };

        if let Err(e) = self.persist(snapshot).await {
            self.users
                .lock()
                .retain(|u| !u.email.eq_ignore_ascii_case(email));
            return Err(e);
        }

        tracing::info!(email, %user_type, "user registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCredentialStore::new(dir.path().join("users.json"));
        assert_eq!(store.load().await.unwrap(), 0);
        assert!(store.is_empty());
        assert!(store.verify("a@example.com", "pw").is_none());
    }

    #[tokio::test]
    async fn load_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"users":[
                {"email":"rec@example.com","password":"secret","user_type":"recruiter"},
                {"email":"cand@example.com","password":"pw"}
            ]}"#,
        )
        .unwrap();

        let store = JsonCredentialStore::new(&path);
        assert_eq!(store.load().await.unwrap(), 2);

        let user = store.verify("REC@example.com", "secret").unwrap();
        assert_eq!(user.user_type, UserType::Recruiter);
        assert_eq!(
            store.verify("cand@example.com", "pw").unwrap().user_type,
            UserType::Candidate
        );
        assert!(store.verify("rec@example.com", "wrong").is_none());
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "[not json").unwrap();

        let store = JsonCredentialStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(CredentialError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn register_persists_and_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.json");

        let store = JsonCredentialStore::new(&path);
        store.load().await.unwrap();
        store
            .register("new@example.com", "pw", UserType::Candidate)
            .await
            .unwrap();

        let err = store
            .register("New@Example.com", "other", UserType::Recruiter)
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::AlreadyExists(_)));

        let reloaded = JsonCredentialStore::new(&path);
        assert_eq!(reloaded.load().await.unwrap(), 1);
        assert!(reloaded.verify("new@example.com", "pw").is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn registered_users_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"users":[]}"#).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = JsonCredentialStore::new(&path);
        store.load().await.unwrap();
        store
            .register("new@example.com", "pw", UserType::Candidate)
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!store.staging_path().exists());
    }
}
