//! Remote storage zone access

pub mod bunny;
pub mod memory;

use crate::cancel::Cancellation;
use crate::types::{BunError, FileRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};

pub use bunny::{BunnyStorage, DEFAULT_ENDPOINT};
pub use memory::MemoryStorage;

/// Byte-progress callback: `(transferred, expected)`
///
/// `expected` is 0 when the length is not known up front.
pub type ProgressFn<'a> = dyn FnMut(u64, u64) + Send + 'a;

/// One object in a zone listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteEntry {
    /// Directory containing the object, prefixed with the zone name
    /// (`/myzone/some/dir/`)
    #[serde(rename = "Path")]
    pub object_path: String,

    pub object_name: String,

    pub is_directory: bool,

    #[serde(default)]
    pub length: u64,

    #[serde(with = "timestamp")]
    pub last_changed: DateTime<Utc>,

    #[serde(with = "timestamp")]
    pub date_created: DateTime<Utc>,

    pub storage_zone_name: String,
}

impl RemoteEntry {
    /// Path of the object relative to the zone root
    pub fn relative_path(&self) -> String {
        let prefix = format!("/{}/", self.storage_zone_name);
        let dir = match self.object_path.strip_prefix(&prefix) {
            Some(rest) => rest,
            // Listing paths always start with the zone; fall back to dropping
            // the first segment if the casing differs.
            None => self
                .object_path
                .trim_start_matches('/')
                .split_once('/')
                .map(|(_, rest)| rest)
                .unwrap_or(""),
        };

        let dir = dir.trim_matches('/');
        if dir.is_empty() {
            self.object_name.clone()
        } else {
            format!("{}/{}", dir, self.object_name)
        }
    }

    /// Convert to a FileRecord; directories have no record
    ///
    /// Entries whose path would resolve outside the sync root are skipped
    /// with a warning.
    pub fn to_record(&self) -> Option<FileRecord> {
        if self.is_directory {
            return None;
        }
        let record = FileRecord::new(self.relative_path(), self.last_changed, self.length);
        if !record.is_contained() {
            tracing::warn!(path = %record.path, "skipping remote entry outside the sync root");
            return None;
        }
        Some(record)
    }
}

/// Result of listing a whole zone
#[derive(Debug, Clone)]
pub struct Listing {
    pub status: StatusCode,
    pub entries: Vec<RemoteEntry>,
}

impl Listing {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Operations the sync engine and the verbs need from a storage zone
///
/// Non-success HTTP statuses are returned as values, not errors, so callers
/// can report them the way each verb needs. Transport failures are errors.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// List every entry in the zone, directories included
    async fn list_files(&self) -> Result<Listing, BunError>;

    /// Stream an object into `sink`
    ///
    /// Stops with `BunError::Cancelled` as soon as cancellation is observed
    /// between chunks. Nothing is written to `sink` on a non-success status.
    async fn get_file(
        &self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        on_progress: &mut ProgressFn<'_>,
        cancel: &Cancellation,
    ) -> Result<StatusCode, BunError>;

    /// Upload `source` as `name`
    async fn put_file(
        &self,
        name: &str,
        source: Box<dyn AsyncRead + Unpin + Send + Sync>,
        length: Option<u64>,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<StatusCode, BunError>;

    async fn delete_file(&self, name: &str) -> Result<StatusCode, BunError>;
}

/// Zone timestamps: `2024-03-01T10:15:30.123` without an offset, read as UTC
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, FORMAT) {
            return Some(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(path: &str, name: &str, is_directory: bool) -> RemoteEntry {
        RemoteEntry {
            object_path: path.to_string(),
            object_name: name.to_string(),
            is_directory,
            length: 42,
            last_changed: Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap(),
            date_created: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            storage_zone_name: "myzone".to_string(),
        }
    }

    #[test]
    fn test_relative_path_strips_zone_prefix() {
        assert_eq!(entry("/myzone/", "a.txt", false).relative_path(), "a.txt");
        assert_eq!(
            entry("/myzone/docs/2024/", "b.txt", false).relative_path(),
            "docs/2024/b.txt"
        );
    }

    #[test]
    fn test_relative_path_tolerates_zone_case_mismatch() {
        assert_eq!(
            entry("/MyZone/docs/", "c.txt", false).relative_path(),
            "docs/c.txt"
        );
    }

    #[test]
    fn test_directories_have_no_record() {
        assert!(entry("/myzone/", "docs", true).to_record().is_none());
    }

    #[test]
    fn test_dot_segments_have_no_record() {
        assert!(entry("/myzone/", "..", false).to_record().is_none());
        assert!(entry("/myzone/../", "escape.txt", false).to_record().is_none());
        assert!(entry("/myzone/docs/./", "a.txt", false).to_record().is_none());
        assert!(entry("/myzone/docs/", "..notes", false).to_record().is_some());
    }

    #[test]
    fn test_to_record_copies_size_and_time() {
        let remote = entry("/myzone/docs/", "b.txt", false);
        let record = remote.to_record().expect("file entry");

        assert_eq!(record.path, "docs/b.txt");
        assert_eq!(record.size, 42);
        assert_eq!(record.last_modified, remote.last_changed);
    }

    #[test]
    fn test_deserialize_listing_json() {
        let json = r#"[
            {
                "Guid": "6b1b1c66-0000-0000-0000-000000000000",
                "StorageZoneName": "myzone",
                "Path": "/myzone/",
                "ObjectName": "photo.jpg",
                "Length": 1024,
                "LastChanged": "2024-03-01T10:15:30.123",
                "ServerId": 12,
                "IsDirectory": false,
                "UserId": "abc",
                "DateCreated": "2024-02-01T00:00:00",
                "StorageZoneId": 99
            },
            {
                "StorageZoneName": "myzone",
                "Path": "/myzone/",
                "ObjectName": "docs",
                "Length": 0,
                "LastChanged": "2024-01-01T00:00:00Z",
                "IsDirectory": true,
                "DateCreated": "2024-01-01T00:00:00Z"
            }
        ]"#;

        let entries: Vec<RemoteEntry> = serde_json::from_str(json).expect("valid listing");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].object_name, "photo.jpg");
        assert_eq!(entries[0].length, 1024);
        assert_eq!(
            entries[0].last_changed,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap()
                + chrono::Duration::milliseconds(123)
        );
        assert!(entries[1].is_directory);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        assert!(timestamp::parse("yesterday").is_none());
        assert!(timestamp::parse("2024-03-01").is_none());
    }
}
