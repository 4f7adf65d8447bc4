//! Demo accounts for SkyCast.
//!
//! A static baseline user list merged with locally stored registrations,
//! plus session, theme and export helpers over the same key-value store.

pub mod directory;
pub mod error;
pub mod export;
pub mod session;
pub mod storage;
pub mod theme;
pub mod user;

pub use directory::{BaselineSource, DirectoryService};
pub use error::AuthError;
pub use export::{
    combined_json, download, ExportError, Exporter, FileAccess, FilePicker, FixedPathPicker,
    PickerOptions,
};
pub use session::SessionStore;
pub use storage::{FileStore, KeyValueStore, KeyValueStoreExt, MemoryStore, StorageError};
pub use theme::{SystemTheme, Theme, ThemePreference};
pub use user::{Session, SignupRequest, UserFile, UserRecord};
