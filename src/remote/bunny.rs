//! HTTP client for a Bunny storage zone

use super::{Listing, ProgressFn, RemoteEntry, RemoteStorage};
use crate::cancel::Cancellation;
use crate::types::BunError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_LENGTH};
use reqwest::{Body, Client, StatusCode, Url};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

/// Primary storage endpoint; regional endpoints use the same layout
pub const DEFAULT_ENDPOINT: &str = "https://storage.bunnycdn.com";

const ACCESS_KEY: &str = "AccessKey";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one storage zone
pub struct BunnyStorage {
    http: Client,
    endpoint: Url,
    zone: String,
    key: String,
}

impl BunnyStorage {
    pub fn new(endpoint: &str, zone: &str, key: &str) -> Result<Self, BunError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| BunError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(BunError::Config(format!(
                "Invalid endpoint '{}': not an http(s) base URL",
                endpoint
            )));
        }

        let http = Client::builder()
            .user_agent(concat!("buncli/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            zone: zone.to_string(),
            key: key.to_string(),
        })
    }

    /// URL of an object: `<endpoint>/<zone>/<name>`
    pub fn object_url(&self, name: &str) -> Url {
        self.zone_url(name, false)
    }

    /// URL listing a directory; always ends with `/`
    pub fn directory_url(&self, dir: &str) -> Url {
        self.zone_url(dir, true)
    }

    fn zone_url(&self, path: &str, trailing_slash: bool) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&self.zone)
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if trailing_slash {
                segments.push("");
            }
        }
        url
    }

    async fn list_directory(&self, dir: &str) -> Result<(StatusCode, Vec<RemoteEntry>), BunError> {
        let url = self.directory_url(dir);
        tracing::debug!(%url, "listing directory");

        let response = self
            .http
            .get(url)
            .header(ACCESS_KEY, &self.key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok((status, Vec::new()));
        }
        Ok((status, response.json().await?))
    }
}

#[async_trait]
impl RemoteStorage for BunnyStorage {
    async fn list_files(&self) -> Result<Listing, BunError> {
        let mut pending = VecDeque::from([String::new()]);
        let mut entries = Vec::new();

        while let Some(dir) = pending.pop_front() {
            let (status, page) = self.list_directory(&dir).await?;
            if !status.is_success() {
                tracing::warn!(dir = %dir, %status, "listing failed");
                return Ok(Listing {
                    status,
                    entries: Vec::new(),
                });
            }

            for entry in page {
                if entry.is_directory {
                    pending.push_back(entry.relative_path());
                }
                entries.push(entry);
            }
        }

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
        let url = self.object_url(name);
        tracing::debug!(%url, "downloading");

        let mut response = self
            .http
            .get(url)
            .header(ACCESS_KEY, &self.key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(status);
        }

        let expected = response.content_length().unwrap_or(0);
        let mut received = 0u64;
        loop {
            let chunk = tokio::select! {
                chunk = response.chunk() => chunk?,
                _ = cancel.cancelled() => return Err(BunError::Cancelled),
            };
            let Some(chunk) = chunk else { break };

            if cancel.is_requested() {
                return Err(BunError::Cancelled);
            }
            sink.write_all(&chunk).await?;
            received += chunk.len() as u64;
            on_progress(received, expected);
        }

        sink.flush().await?;
        Ok(status)
    }

    async fn put_file(
        &self,
        name: &str,
        source: Box<dyn AsyncRead + Unpin + Send + Sync>,
        length: Option<u64>,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<StatusCode, BunError> {
        let url = self.object_url(name);
        tracing::debug!(%url, ?length, "uploading");

        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel::<u64>();
        let stream = ReaderStream::new(source).inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                let _ = sent_tx.send(bytes.len() as u64);
            }
        });

        let mut request = self
            .http
            .put(url)
            .header(ACCESS_KEY, &self.key)
            .body(Body::wrap_stream(stream));
        if let Some(length) = length {
            request = request.header(CONTENT_LENGTH, length);
        }

        let expected = length.unwrap_or(0);
        let mut sent = 0u64;
        let response = request.send();
        tokio::pin!(response);

        let response = loop {
            tokio::select! {
                Some(bytes) = sent_rx.recv() => {
                    sent += bytes;
                    on_progress(sent, expected);
                }
                response = &mut response => break response?,
            }
        };

        while let Ok(bytes) = sent_rx.try_recv() {
            sent += bytes;
            on_progress(sent, expected);
        }

        Ok(response.status())
    }

    async fn delete_file(&self, name: &str) -> Result<StatusCode, BunError> {
        let url = self.object_url(name);
        tracing::debug!(%url, "deleting");

        let response = self
            .http
            .delete(url)
            .header(ACCESS_KEY, &self.key)
            .send()
            .await?;
        Ok(response.status())
    }
}
