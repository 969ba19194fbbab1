//! Last-access log.
//!
//! A one-entry JSON file, `{"time": "..."}`, read when the program starts and
//! rewritten when it exits.

use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Human-readable timestamp format, e.g. `Sat, 01 May 2021 at 14:05`.
pub const TIME_FORMAT: &str = "%a, %d %b %Y at %H:%M";

/// When the flight log was last used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAccess {
    /// Formatted with [`TIME_FORMAT`].
    pub time: String,
}

impl LastAccess {
    /// A record for the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            time: Local::now().format(TIME_FORMAT).to_string(),
        }
    }

    /// Read the previous access, if one was recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No last-access log at {}", path.display());
            return Ok(None);
        }

        let text = std::fs::read_to_string(path)?;
        let access = serde_json::from_str(&text)?;
        Ok(Some(access))
    }

    /// Write this access to `path`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        std::fs::write(path, serde_json::to_string(self)?)?;
        debug!("Recorded last access at {}", self.time);
        Ok(())
    }

    /// Record the current time as the last access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn record(path: impl AsRef<Path>) -> Result<Self> {
        let access = Self::now();
        access.save(path)?;
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "flightlog_session_{}_{name}.json",
            std::process::id()
        ))
    }

    #[test]
    fn test_load_missing_is_none() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        assert!(LastAccess::load(&path).unwrap().is_none());
    }

    #[test]
    fn test_record_then_load() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let written = LastAccess::record(&path).unwrap();
        let loaded = LastAccess::load(&path).unwrap().unwrap();
        assert_eq!(loaded, written);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\"time\":"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_now_uses_readable_format() {
        let access = LastAccess::now();
        assert!(access.time.contains(" at "));
        assert!(NaiveDateTime::parse_from_str(&access.time, TIME_FORMAT).is_ok());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_path("garbage");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            LastAccess::load(&path).unwrap_err(),
            Error::Json(_)
        ));

        let _ = std::fs::remove_file(&path);
    }
}
