//! Export of the merged directory as a `users.json` document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::directory::DirectoryService;
use crate::error::AuthError;
use crate::user::UserFile;

pub const EXPORT_FILE_NAME: &str = "users.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Direct file access is not supported")]
    Unsupported,

    #[error("No file was selected")]
    Cancelled,

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ExportError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Unsupported => {
                "Direct file access is not available. Use the download option instead.".to_string()
            }
            Self::Cancelled => "No file selected. users.json was not changed.".to_string(),
            Self::Io { .. } | Self::Serialization(_) => {
                "Unable to update users.json. Please use the download option.".to_string()
            }
            Self::Auth(e) => e.user_message(),
        }
    }
}

/// File chooser request, mirroring a JSON-only picker dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    pub suggested_name: Option<&'static str>,
    pub description: &'static str,
    pub mime_type: &'static str,
    pub extensions: &'static [&'static str],
    pub multiple: bool,
}

impl PickerOptions {
    pub fn save_json() -> Self {
        Self {
            suggested_name: Some(EXPORT_FILE_NAME),
            ..Self::open_json()
        }
    }

    pub fn open_json() -> Self {
        Self {
            suggested_name: None,
            description: "JSON",
            mime_type: "application/json",
            extensions: &[".json"],
            multiple: false,
        }
    }
}

/// Lets the user choose a file to write to.
pub trait FilePicker: Send + Sync {
    fn pick(&self, options: &PickerOptions) -> Result<PathBuf, ExportError>;
}

/// Picker that always answers with one preselected path.
#[derive(Debug, Clone)]
pub struct FixedPathPicker(pub PathBuf);

impl FilePicker for FixedPathPicker {
    fn pick(&self, _options: &PickerOptions) -> Result<PathBuf, ExportError> {
        Ok(self.0.clone())
    }
}

/// Direct file-write capability of the host, decided once at startup.
pub enum FileAccess {
    Unsupported,
    SavePicker(Box<dyn FilePicker>),
    OpenPicker(Box<dyn FilePicker>),
}

impl FileAccess {
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Baseline plus local registrations as pretty-printed `{"users": [...]}`.
pub async fn combined_json(directory: &DirectoryService) -> Result<String, ExportError> {
    let users = directory.load_users().await?;
    Ok(serde_json::to_string_pretty(&UserFile { users })?)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Save `users.json` into `dir`, returning the written path.
pub async fn download(directory: &DirectoryService, dir: &Path) -> Result<PathBuf, ExportError> {
    let json = combined_json(directory).await?;
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(EXPORT_FILE_NAME);
    write_file(&path, &json)?;
    tracing::info!("Exported directory to {:?}", path);
    Ok(path)
}

pub struct Exporter {
    access: FileAccess,
}

impl Exporter {
    pub fn new(access: FileAccess) -> Self {
        Self { access }
    }

    pub fn is_sync_available(&self) -> bool {
        self.access.is_supported()
    }

    /// Write the merged directory to a file chosen through the picker.
    pub async fn sync(&self, directory: &DirectoryService) -> Result<PathBuf, ExportError> {
        let json = combined_json(directory).await?;

        let path = match &self.access {
            FileAccess::SavePicker(picker) => picker.pick(&PickerOptions::save_json())?,
            FileAccess::OpenPicker(picker) => picker.pick(&PickerOptions::open_json())?,
            FileAccess::Unsupported => return Err(ExportError::Unsupported),
        };

        write_file(&path, &json)?;
        tracing::info!("Synced directory to {:?}", path);
        Ok(path)
    }
}
