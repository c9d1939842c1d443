//! JSON-RPC dispatch
//!
//! Routes `songs`, `addSong`, and `deleteSong` onto a [`SongApi`].

use serde::Deserialize;
use serde_json::Value;
use tracing::Instrument;

use crate::api::SongApi;
use crate::types::error::ErrorData;
use crate::types::jsonrpc::JsonRpcMessage;
use crate::types::song::{NewSong, SongId};

pub const METHOD_SONGS: &str = "songs";
pub const METHOD_ADD_SONG: &str = "addSong";
pub const METHOD_DELETE_SONG: &str = "deleteSong";

#[derive(Debug, Deserialize)]
struct DeleteSongParams {
    id: String,
}

/// Dispatch one request to the song API, returning its JSON result.
pub async fn dispatch(api: &dyn SongApi, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let span = tracing::info_span!(
        "rpc.dispatch",
        rpc.system = "jsonrpc",
        rpc.method = %message.method,
        rpc.jsonrpc.request_id = ?message.id,
        rpc.jsonrpc.error_code = tracing::field::Empty,
    );

    let result = async {
        match message.method.as_str() {
            METHOD_SONGS => {
                let songs = api.list().await.map_err(|e| ErrorData::from(&e))?;
                to_value(&songs)
            }
            METHOD_ADD_SONG => {
                let params: NewSong = parse_params(message.params.as_ref())?;
                let song = api.create(params).await.map_err(|e| ErrorData::from(&e))?;
                to_value(&song)
            }
            METHOD_DELETE_SONG => {
                let params: DeleteSongParams = parse_params(message.params.as_ref())?;
                let id: SongId = params.id.parse().map_err(|e| {
                    ErrorData::invalid_params(format!("invalid song id {:?}: {}", params.id, e))
                })?;
                let id = api.delete(id).await.map_err(|e| ErrorData::from(&e))?;
                to_value(&id)
            }
            other => Err(ErrorData::method_not_found(other)),
        }
    }
    .instrument(span.clone())
    .await;

    if let Err(ref error) = result {
        span.record("rpc.jsonrpc.error_code", error.code);
        tracing::warn!(parent: &span, error = %error, "Request failed");
    }

    result
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<&Value>) -> Result<T, ErrorData> {
    let params = params.ok_or_else(|| ErrorData::invalid_params("missing params"))?;
    serde_json::from_value(params.clone()).map_err(|e| ErrorData::invalid_params(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(value).map_err(|e| ErrorData::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::SongService;
    use crate::types::song::Song;
    use serde_json::json;
    use std::time::Duration;

    fn request(method: &str, params: Option<Value>) -> JsonRpcMessage {
        JsonRpcMessage::request(1, method, params)
    }

    #[tokio::test]
    async fn add_then_list() {
        let service = SongService::in_memory(Duration::ZERO);

        let added = dispatch(
            &service,
            &request(
                METHOD_ADD_SONG,
                Some(json!({
                    "title": "etude",
                    "events": [
                        {"delayMs": 0, "note": 60, "state": true},
                        {"delayMs": 500, "note": 60, "state": false}
                    ],
                    "durationSeconds": 1
                })),
            ),
        )
        .await
        .unwrap();
        let added: Song = serde_json::from_value(added).unwrap();
        assert_eq!(added.title, "etude");

        let listed = dispatch(&service, &request(METHOD_SONGS, None)).await.unwrap();
        let listed: Vec<Song> = serde_json::from_value(listed).unwrap();
        assert_eq!(listed, vec![added]);
    }

    #[tokio::test]
    async fn delete_returns_id() {
        let service = SongService::in_memory(Duration::ZERO);
        let id = SongId::new();

        let result = dispatch(
            &service,
            &request(METHOD_DELETE_SONG, Some(json!({"id": id.to_string()}))),
        )
        .await
        .unwrap();
        assert_eq!(result, json!(id.to_string()));
    }

    #[tokio::test]
    async fn bad_id_is_invalid_params() {
        let service = SongService::in_memory(Duration::ZERO);
        let err = dispatch(
            &service,
            &request(METHOD_DELETE_SONG, Some(json!({"id": "42"}))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorData::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn missing_params_is_invalid_params() {
        let service = SongService::in_memory(Duration::ZERO);
        let err = dispatch(&service, &request(METHOD_ADD_SONG, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorData::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method() {
        let service = SongService::in_memory(Duration::ZERO);
        let err = dispatch(&service, &request("updateSong", None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorData::METHOD_NOT_FOUND);
    }
}
