//! SongClient against a live server on an ephemeral port.
#![cfg(feature = "client")]

use songbook::{router, Error, NewSong, NoteEvent, SongApi, SongClient, SongId, SongService};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_server(latency: Duration) -> String {
    let service = Arc::new(SongService::in_memory(latency));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(service)).await.unwrap();
    });

    format!("http://{}/rpc", addr)
}

#[tokio::test]
async fn client_roundtrip_preserves_delays() {
    let endpoint = spawn_server(Duration::ZERO).await;
    let client = SongClient::new(&endpoint);

    let events = vec![
        NoteEvent::on(60, 0.0),
        NoteEvent::off(60, 512.337_1),
        NoteEvent::on(64, 0.0),
        NoteEvent::off(64, 700.0),
    ];
    let created = client
        .create(NewSong::new("etude", events.clone(), 2))
        .await
        .unwrap();
    assert_eq!(created.events, events);

    let songs = client.list().await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0], created);
    for (stored, original) in songs[0].events.iter().zip(&events) {
        assert_eq!(stored.delay_ms.to_bits(), original.delay_ms.to_bits());
    }

    assert_eq!(client.delete(created.id).await.unwrap(), created.id);
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_unknown_song_echoes_id() {
    let endpoint = spawn_server(Duration::ZERO).await;
    let client = SongClient::new(&endpoint);

    let id = SongId::new();
    assert_eq!(client.delete(id).await.unwrap(), id);
}

#[tokio::test]
async fn timeout_surfaces_as_transport_error() {
    let endpoint = spawn_server(Duration::from_millis(500)).await;
    let client = SongClient::with_timeout(&endpoint, Duration::from_millis(50)).unwrap();

    let err = client.list().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_server_is_an_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SongClient::new(&format!("http://{}/rpc", addr));
    assert!(client.list().await.is_err());
}
