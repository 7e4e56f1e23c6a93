use axum::body::Bytes;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::StartupError;

/// Background image read once at startup. Missing is not fatal.
#[derive(Debug, Clone)]
pub enum Background {
    Loaded(Bytes),
    Missing(PathBuf),
}

impl Background {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        match fs::read(path) {
            Ok(data) => Ok(Background::Loaded(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("background image {} not found; continuing without it", path.display());
                Ok(Background::Missing(path.to_path_buf()))
            }
            Err(e) => Err(StartupError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Background::Loaded(b) => Some(b),
            Background::Missing(_) => None,
        }
    }

    /// Text of the on-page warning, if the image was missing.
    pub fn warning(&self) -> Option<String> {
        match self {
            Background::Loaded(_) => None,
            Background::Missing(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Some(format!("Image not found! Please check the filename '{}'", name))
            }
        }
    }
}
