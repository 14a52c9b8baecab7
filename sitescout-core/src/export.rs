// JSON export of discovery results

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sitescout_scanner::{FeedDiscoveryResult, LoginDiscoveryResult};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub feeds: Option<FeedDiscoveryResult>,
    pub logins: Option<LoginDiscoveryResult>,
    pub exported_at: String,
    pub url: Option<String>,
}

impl ExportDocument {
    /// Fails with [`ExportError::Empty`] when there is nothing to export.
    pub fn new(
        feeds: Option<FeedDiscoveryResult>,
        logins: Option<LoginDiscoveryResult>,
        url: Option<String>,
    ) -> Result<Self, ExportError> {
        if feeds.is_none() && logins.is_none() {
            return Err(ExportError::Empty);
        }

        Ok(Self {
            feeds,
            logins,
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
        })
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `feeds-<unix millis>.json`
pub fn default_export_file_name() -> String {
    format!("feeds-{}.json", Utc::now().timestamp_millis())
}
