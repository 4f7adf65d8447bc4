//! Light/dark theme preference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::storage::{KeyValueStore, StorageError, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "☀️",
            Self::Dark => "🌙",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme {:?}, expected light or dark", other)),
        }
    }
}

/// Answers whether the host environment prefers a dark theme.
pub trait SystemTheme {
    fn prefers_dark(&self) -> bool;
}

impl<F: Fn() -> bool> SystemTheme for F {
    fn prefers_dark(&self) -> bool {
        self()
    }
}

#[derive(Clone)]
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme, or the system preference when none is stored.
    pub fn current(&self, system: &dyn SystemTheme) -> Result<Theme, StorageError> {
        let stored = self.store.get(THEME_KEY)?;
        if let Some(theme) = stored.as_deref().and_then(|s| s.parse().ok()) {
            return Ok(theme);
        }
        Ok(if system.prefers_dark() {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    pub fn apply(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(THEME_KEY, theme.as_str())?;
        tracing::debug!("Theme set to {}", theme);
        Ok(())
    }

    pub fn toggle(&self, system: &dyn SystemTheme) -> Result<Theme, StorageError> {
        let next = self.current(system)?.toggled();
        self.apply(next)?;
        Ok(next)
    }
}
