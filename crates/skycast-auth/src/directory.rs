//! User directory: a read-only baseline list merged with local registrations.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::instrument;

use crate::error::AuthError;
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, KeyValueStoreExt, StorageError, REGISTRATIONS_KEY};
use crate::user::{Session, SignupRequest, UserRecord};

/// Where the baseline `users.json` comes from
#[derive(Debug, Clone)]
pub enum BaselineSource {
    File(PathBuf),
    Url(String),
    Inline(Vec<UserRecord>),
}

impl BaselineSource {
    /// Interpret a config value: http(s) URLs are fetched, anything else is a path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

/// Deserialize each entry on its own; entries that are not user records are
/// skipped so one bad record cannot hide the rest.
fn records_from(entries: &[serde_json::Value], origin: &str) -> Vec<UserRecord> {
    entries
        .iter()
        .filter_map(|entry| match UserRecord::deserialize(entry) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Skipping unreadable {} user record: {}", origin, e);
                None
            }
        })
        .collect()
}

/// Extract `users` from a directory document; a non-array value means no users.
fn users_from_document(raw: &str) -> Result<Vec<UserRecord>, AuthError> {
    let document: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AuthError::BaselineUnavailable(format!("invalid JSON: {}", e)))?;

    match document.get("users") {
        Some(serde_json::Value::Array(users)) => Ok(records_from(users, "baseline")),
        _ => Ok(Vec::new()),
    }
}

pub struct DirectoryService {
    store: Arc<dyn KeyValueStore>,
    sessions: SessionStore,
    source: BaselineSource,
    client: Client,
    baseline: OnceCell<Vec<UserRecord>>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn KeyValueStore>, source: BaselineSource) -> Self {
        Self::with_client(store, source, Client::new())
    }

    pub fn with_client(store: Arc<dyn KeyValueStore>, source: BaselineSource, client: Client) -> Self {
        Self {
            sessions: SessionStore::new(store.clone()),
            store,
            source,
            client,
            baseline: OnceCell::new(),
        }
    }

    async fn fetch_baseline(&self) -> Result<Vec<UserRecord>, AuthError> {
        let users = match &self.source {
            BaselineSource::Inline(users) => users.clone(),
            BaselineSource::File(path) => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    AuthError::BaselineUnavailable(format!("{}: {}", path.display(), e))
                })?;
                users_from_document(&raw)?
            }
            BaselineSource::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| AuthError::BaselineUnavailable(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AuthError::BaselineUnavailable(format!("HTTP {}", status)));
                }
                let raw = response
                    .text()
                    .await
                    .map_err(|e| AuthError::BaselineUnavailable(e.to_string()))?;
                users_from_document(&raw)?
            }
        };
        tracing::info!("Loaded {} baseline users", users.len());
        Ok(users)
    }

    /// Baseline users, fetched once per service and cached after the first success.
    pub async fn baseline(&self) -> Result<&[UserRecord], AuthError> {
        self.baseline
            .get_or_try_init(|| self.fetch_baseline())
            .await
            .map(Vec::as_slice)
    }

    /// Stored registration entries as raw JSON.
    ///
    /// A corrupt or non-array stored value is treated as an empty list.
    fn stored_registrations(&self) -> Result<Vec<serde_json::Value>, AuthError> {
        let Some(raw) = self.store.get(REGISTRATIONS_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&raw) {
            Ok(serde_json::Value::Array(entries)) => Ok(entries),
            Ok(_) => {
                tracing::warn!("Local registrations are not a list, ignoring");
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!("Unable to parse local registrations: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Locally registered users, read fresh from the store.
    pub fn local_registrations(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(records_from(&self.stored_registrations()?, "local"))
    }

    /// Baseline followed by local registrations, without deduplication.
    #[instrument(skip(self), level = "debug")]
    pub async fn load_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        let mut users = self.baseline().await?.to_vec();
        users.extend(self.local_registrations()?);
        Ok(users)
    }

    /// Case-insensitive username match with exact password equality.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        let users = self.load_users().await?;
        Ok(users
            .into_iter()
            .find(|u| u.has_username(username) && u.password == password))
    }

    /// Append `record` to the local registrations.
    ///
    /// Fails without touching the store when the username already exists in
    /// the merged directory, ignoring case.
    #[instrument(skip(self, record), fields(username = %record.username), level = "info")]
    pub async fn register(&self, record: UserRecord) -> Result<(), AuthError> {
        let users = self.load_users().await?;
        if users.iter().any(|u| u.has_username(&record.username)) {
            return Err(AuthError::DuplicateUsername(record.username));
        }

        // Appended to the raw entries so records this build cannot read are kept.
        let mut local = self.stored_registrations()?;
        local.push(serde_json::to_value(&record).map_err(StorageError::from)?);
        self.store.set_json(REGISTRATIONS_KEY, &local)?;
        tracing::info!("Registered user ({} local registrations)", local.len());
        Ok(())
    }

    /// Validate a signup form and register the resulting record.
    pub async fn signup(&self, request: SignupRequest) -> Result<UserRecord, AuthError> {
        let record = request.into_record(Utc::now())?;
        self.register(record.clone()).await?;
        Ok(record)
    }

    /// Check credentials and persist the session on success.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(self.sessions.save(&user)?)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        Ok(self.sessions.clear()?)
    }

    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.current()?)
    }
}
