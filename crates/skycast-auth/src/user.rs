use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AuthError;

pub const DEFAULT_ROLE: &str = "member";
pub const MIN_PASSWORD_LEN: usize = 6;

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// Directory entry, in the `users.json` field layout.
///
/// Passwords are kept in plaintext; this is a demo directory, not a
/// credential store. `createdAt` and unknown fields are carried through
/// verbatim so exports reproduce what was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Case-insensitive username comparison.
    pub fn has_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}

/// The `users.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFile {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

/// Signed-in user, one slot overwritten on every login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub name: String,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn for_user(user: &UserRecord, now: DateTime<Utc>) -> Self {
        Self {
            username: user.username.clone(),
            name: user.name.clone(),
            signed_in_at: now,
        }
    }
}

/// Raw signup form input
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

impl SignupRequest {
    /// Trim and validate the form, producing the record to register.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<UserRecord, AuthError> {
        let full_name = self.full_name.trim();
        let username = self.username.trim();
        let password = self.password.trim();

        if full_name.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort(MIN_PASSWORD_LEN));
        }

        let role = self
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE);

        Ok(UserRecord {
            username: username.to_string(),
            password: password.to_string(),
            name: full_name.to_string(),
            role: role.to_string(),
            created_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            extra: Map::new(),
        })
    }
}
