//! Account-specific error types.

use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Required signup fields missing")]
    MissingFields,

    #[error("Username or password missing")]
    MissingCredentials,

    #[error("Password shorter than {0} characters")]
    PasswordTooShort(usize),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Baseline user list unavailable: {0}")]
    BaselineUnavailable(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields => "Please fill in all required fields.".to_string(),
            Self::MissingCredentials => "Please fill in both username and password.".to_string(),
            Self::PasswordTooShort(min) => {
                format!("Password must be at least {} characters long.", min)
            }
            Self::DuplicateUsername(_) => {
                "That username is already taken. Please choose another.".to_string()
            }
            Self::InvalidCredentials => {
                "Invalid username or password. Please try again.".to_string()
            }
            Self::BaselineUnavailable(_) => {
                "Unable to load user database. Please try again later.".to_string()
            }
            Self::Storage(e) => e.user_message().to_string(),
        }
    }

    /// Whether the user can fix this by changing their input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFields
                | Self::MissingCredentials
                | Self::PasswordTooShort(_)
                | Self::DuplicateUsername(_)
                | Self::InvalidCredentials
        )
    }
}
