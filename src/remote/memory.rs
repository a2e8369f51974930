//! In-memory storage zone
//!
//! Behaves like a Bunny zone without the network: listings include
//! intermediate directories, uploads answer `201 Created`, and missing
//! objects answer `404`. Used to exercise the sync engine offline.

use super::{Listing, ProgressFn, RemoteEntry, RemoteStorage};
use crate::cancel::Cancellation;
use crate::types::BunError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const CHUNK_SIZE: usize = 4;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    last_changed: DateTime<Utc>,
    date_created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<String, StoredObject>,
    list_status: Option<StatusCode>,
    failures: HashMap<String, StatusCode>,
    cancel_on_get: Option<(String, Cancellation)>,
    requests: Vec<String>,
}

/// A storage zone held in memory
#[derive(Debug)]
pub struct MemoryStorage {
    zone: String,
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    /// Store an object as if it had been uploaded at `last_changed`
    pub fn insert(&self, path: &str, data: &[u8], last_changed: DateTime<Utc>) {
        self.state().objects.insert(
            path.trim_start_matches('/').to_string(),
            StoredObject {
                data: data.to_vec(),
                last_changed,
                date_created: last_changed,
            },
        );
    }

    /// Contents of an object, if present
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.state().objects.get(path).map(|o| o.data.clone())
    }

    /// Paths of every stored object, sorted
    pub fn paths(&self) -> Vec<String> {
        self.state().objects.keys().cloned().collect()
    }

    /// Answer every listing request with `status`
    pub fn fail_listing(&self, status: StatusCode) {
        self.state().list_status = Some(status);
    }

    /// Answer every request for `path` with `status`
    pub fn fail_object(&self, path: &str, status: StatusCode) {
        self.state().failures.insert(path.to_string(), status);
    }

    /// Request `cancel` once the first chunk of `path` has been served
    pub fn cancel_during_get(&self, path: &str, cancel: Cancellation) {
        self.state().cancel_on_get = Some((path.to_string(), cancel));
    }

    /// Requests seen so far, as `"<METHOD> <path>"`
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_request(&self, method: &str, path: &str) -> Option<StatusCode> {
        let mut state = self.state();
        state.requests.push(format!("{} {}", method, path));
        state.failures.get(path).copied()
    }

    fn entry(&self, dir: &str, name: &str, object: Option<&StoredObject>) -> RemoteEntry {
        let object_path = if dir.is_empty() {
            format!("/{}/", self.zone)
        } else {
            format!("/{}/{}/", self.zone, dir)
        };
        let now = Utc::now();
        RemoteEntry {
            object_path,
            object_name: name.to_string(),
            is_directory: object.is_none(),
            length: object.map(|o| o.data.len() as u64).unwrap_or(0),
            last_changed: object.map(|o| o.last_changed).unwrap_or(now),
            date_created: object.map(|o| o.date_created).unwrap_or(now),
            storage_zone_name: self.zone.clone(),
        }
    }
}

fn split_path(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

#[async_trait]
impl RemoteStorage for MemoryStorage {
    async fn list_files(&self) -> Result<Listing, BunError> {
        let state = self.state();
        if let Some(status) = state.list_status {
            return Ok(Listing {
                status,
                entries: Vec::new(),
            });
        }

        let mut directories = BTreeSet::new();
        for path in state.objects.keys() {
            let mut dir = split_path(path).0;
            while !dir.is_empty() {
                directories.insert(dir.to_string());
                dir = split_path(dir).0;
            }
        }

        let mut entries: Vec<RemoteEntry> = directories
            .iter()
            .map(|dir| {
                let (parent, name) = split_path(dir);
                self.entry(parent, name, None)
            })
            .collect();
        entries.extend(state.objects.iter().map(|(path, object)| {
            let (dir, name) = split_path(path);
            self.entry(dir, name, Some(object))
        }));

        Ok(Listing {
            status: StatusCode::OK,
            entries,
        })
    }

    async fn get_file(
        &self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        on_progress: &mut ProgressFn<'_>,
        cancel: &Cancellation,
    ) -> Result<StatusCode, BunError> {
        if let Some(status) = self.record_request("GET", name) {
            return Ok(status);
        }

        let (data, trigger) = {
            let state = self.state();
            let Some(object) = state.objects.get(name) else {
                return Ok(StatusCode::NOT_FOUND);
            };
            let trigger = state
                .cancel_on_get
                .as_ref()
                .filter(|(path, _)| path == name)
                .map(|(_, cancel)| cancel.clone());
            (object.data.clone(), trigger)
        };

        let expected = data.len() as u64;
        let mut received = 0u64;
        for chunk in data.chunks(CHUNK_SIZE) {
            if cancel.is_requested() {
                return Err(BunError::Cancelled);
            }
            sink.write_all(chunk).await?;
            received += chunk.len() as u64;
            on_progress(received, expected);

            if let Some(trigger) = &trigger {
                trigger.request();
            }
        }

        sink.flush().await?;
        Ok(StatusCode::OK)
    }

    async fn put_file(
        &self,
        name: &str,
        mut source: Box<dyn AsyncRead + Unpin + Send + Sync>,
        length: Option<u64>,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<StatusCode, BunError> {
        if let Some(status) = self.record_request("PUT", name) {
            return Ok(status);
        }

        let mut data = Vec::new();
        source.read_to_end(&mut data).await?;
        on_progress(data.len() as u64, length.unwrap_or(0));

        let now = Utc::now();
        let mut state = self.state();
        let date_created = state
            .objects
            .get(name)
            .map(|o| o.date_created)
            .unwrap_or(now);
        state.objects.insert(
            name.to_string(),
            StoredObject {
                data,
                last_changed: now,
                date_created,
            },
        );
        Ok(StatusCode::CREATED)
    }

    async fn delete_file(&self, name: &str) -> Result<StatusCode, BunError> {
        if let Some(status) = self.record_request("DELETE", name) {
            return Ok(status);
        }

        match self.state().objects.remove(name) {
            Some(_) => Ok(StatusCode::OK),
            None => Ok(StatusCode::NOT_FOUND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_listing_includes_intermediate_directories() {
        let storage = MemoryStorage::new("zone");
        storage.insert("a.txt", b"a", at(1));
        storage.insert("docs/2024/b.txt", b"bb", at(2));

        let listing = storage.list_files().await.unwrap();
        assert!(listing.is_success());

        let mut dirs: Vec<String> = listing
            .entries
            .iter()
            .filter(|e| e.is_directory)
            .map(|e| e.relative_path())
            .collect();
        dirs.sort();
        assert_eq!(dirs, vec!["docs", "docs/2024"]);

        let files: Vec<_> = listing.entries.iter().filter_map(|e| e.to_record()).collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].path, "docs/2024/b.txt");
        assert_eq!(files[1].size, 2);
        assert_eq!(files[1].last_modified, at(2));
    }

    #[tokio::test]
    async fn test_get_streams_in_chunks() {
        let storage = MemoryStorage::new("zone");
        storage.insert("a.txt", b"0123456789", at(1));

        let mut sink = Vec::new();
        let mut calls = Vec::new();
        let mut on_progress = |t: u64, e: u64| calls.push((t, e));
        let status = storage
            .get_file("a.txt", &mut sink, &mut on_progress, &Cancellation::new())
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(sink, b"0123456789");
        assert_eq!(calls, vec![(4, 10), (8, 10), (10, 10)]);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let storage = MemoryStorage::new("zone");
        let mut sink = Vec::new();
        let status = storage
            .get_file("nope", &mut sink, &mut |_, _| {}, &Cancellation::new())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            storage.delete_file("nope").await.unwrap(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_put_stores_and_answers_created() {
        let storage = MemoryStorage::new("zone");
        let status = storage
            .put_file("up/new.txt", Box::new(&b"hello"[..]), Some(5), &mut |_, _| {})
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(storage.object("up/new.txt").unwrap(), b"hello");
        assert_eq!(storage.requests(), vec!["PUT up/new.txt"]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let storage = MemoryStorage::new("zone");
        storage.insert("a.txt", b"a", at(1));
        storage.fail_object("a.txt", StatusCode::INTERNAL_SERVER_ERROR);
        storage.fail_listing(StatusCode::UNAUTHORIZED);

        assert_eq!(
            storage.list_files().await.unwrap().status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            storage.delete_file("a.txt").await.unwrap(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(storage.object("a.txt").is_some());
    }
}
