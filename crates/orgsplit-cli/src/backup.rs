//! Timestamped JSON backups of every mutation.
//!
//! Renames and combines cannot be undone through the Dashboard API, so each
//! workflow writes what it changed to `{orgname}_{operation}_{timestamp}.json`.

use crate::error::CliError;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp format used in backup file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Kinds of backup written by the workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// Networks renamed, with old and new names
    Rename,
    /// Combination groups about to be submitted
    ToCombine,
    /// Results of the combine calls
    Combined,
}

impl BackupKind {
    /// Operation label embedded in the file name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::ToCombine => "to_combine",
            Self::Combined => "combined",
        }
    }
}

/// Replace characters that are unsafe in file names with `_`.
#[must_use]
pub fn sanitize_org_name(orgname: &str) -> String {
    orgname
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Backup file name for an operation started at `timestamp`.
#[must_use]
pub fn backup_file_name(orgname: &str, kind: BackupKind, timestamp: &DateTime<Local>) -> String {
    format!(
        "{}_{}_{}.json",
        sanitize_org_name(orgname),
        kind.as_str(),
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Write `data` as pretty-printed JSON into `dir`.
///
/// # Errors
///
/// Returns [`CliError::Backup`] if serialization or the write fails.
pub fn write_backup<T>(
    dir: &Path,
    orgname: &str,
    kind: BackupKind,
    timestamp: &DateTime<Local>,
    data: &T,
) -> Result<PathBuf, CliError>
where
    T: Serialize + ?Sized,
{
    let path = dir.join(backup_file_name(orgname, kind, timestamp));
    let json = serde_json::to_string_pretty(data).map_err(|err| CliError::Backup {
        path: path.clone(),
        source: std::io::Error::other(err),
    })?;
    std::fs::write(&path, json).map_err(|source| CliError::Backup {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), operation = kind.as_str(), "Wrote backup file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn file_name_layout() {
        assert_eq!(
            backup_file_name("Acme", BackupKind::Rename, &fixed_time()),
            "Acme_rename_20240309-140507.json"
        );
        assert_eq!(
            backup_file_name("Acme", BackupKind::ToCombine, &fixed_time()),
            "Acme_to_combine_20240309-140507.json"
        );
    }

    #[test]
    fn org_names_are_sanitized() {
        assert_eq!(sanitize_org_name("Acme Corp / EMEA"), "Acme_Corp___EMEA");
        assert_eq!(sanitize_org_name(" all "), "all");
        assert_eq!(sanitize_org_name("lab-01.v2"), "lab-01.v2");
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_backup(
            dir.path(),
            "Acme Corp",
            BackupKind::Combined,
            &fixed_time(),
            &json!([{"recombined_network_name": "Site1"}]),
        )
        .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Acme_Corp_combined_20240309-140507.json"
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n    "));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["recombined_network_name"], "Site1");
    }

    #[test]
    fn missing_directory_is_backup_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_backup(&missing, "Acme", BackupKind::Rename, &fixed_time(), &json!([]))
            .unwrap_err();
        assert!(matches!(err, CliError::Backup { .. }));
    }
}
