//! JSON-RPC client for a remote songbook server.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::api::SongApi;
use crate::error::{Error, Result};
use crate::protocol::{METHOD_ADD_SONG, METHOD_DELETE_SONG, METHOD_SONGS};
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcReply};
use crate::types::song::{NewSong, Song, SongId};

/// Song API client over HTTP POST.
pub struct SongClient {
    endpoint: String,
    client: reqwest::Client,
    request_id: AtomicI64,
}

impl SongClient {
    /// Client for the given endpoint (e.g. "http://127.0.0.1:4000/rpc").
    pub fn new(endpoint: &str) -> Self {
        Self::with_http_client(endpoint, reqwest::Client::new())
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(endpoint, client))
    }

    fn with_http_client(endpoint: &str, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            request_id: AtomicI64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> i64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    #[tracing::instrument(skip(self, params), fields(rpc.url = %self.endpoint))]
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<T> {
        let request = JsonRpcMessage::request(self.next_id(), method, params);

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let reply: JsonRpcReply = serde_json::from_slice(&body).map_err(|e| {
            Error::Protocol(format!("HTTP {} with unreadable body: {}", status, e))
        })?;

        if let Some(error) = reply.error {
            return Err(error.into());
        }

        let result = reply
            .result
            .ok_or_else(|| Error::Protocol("Missing result in response".into()))?;

        serde_json::from_value(result)
            .map_err(|e| Error::Protocol(format!("Invalid {} result: {}", method, e)))
    }
}

#[async_trait]
impl SongApi for SongClient {
    async fn list(&self) -> Result<Vec<Song>> {
        self.call(METHOD_SONGS, None).await
    }

    async fn create(&self, song: NewSong) -> Result<Song> {
        let params =
            serde_json::to_value(&song).map_err(|e| Error::InvalidParams(e.to_string()))?;
        self.call(METHOD_ADD_SONG, Some(params)).await
    }

    async fn delete(&self, id: SongId) -> Result<SongId> {
        self.call(
            METHOD_DELETE_SONG,
            Some(serde_json::json!({ "id": id.to_string() })),
        )
        .await
    }
}
