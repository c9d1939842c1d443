//! Song Service
//!
//! [`SongApi`] over a [`SongStore`], with an artificial delay on `list` and
//! `create` so clients get to show their loading state. `delete` answers
//! immediately.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::api::SongApi;
use crate::error::Result;
use crate::store::{InMemorySongStore, SongStore};
use crate::types::song::{NewSong, Song, SongId};

pub struct SongService {
    store: Arc<dyn SongStore>,
    latency: Duration,
}

impl SongService {
    pub fn new(store: Arc<dyn SongStore>, latency: Duration) -> Self {
        Self { store, latency }
    }

    /// Service over a fresh in-memory store.
    pub fn in_memory(latency: Duration) -> Self {
        Self::new(InMemorySongStore::new_shared(), latency)
    }

    pub fn store(&self) -> &Arc<dyn SongStore> {
        &self.store
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn simulate_network(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl SongApi for SongService {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Song>> {
        self.simulate_network().await;
        let songs = self.store.list()?;
        tracing::debug!(count = songs.len(), "Listed songs");
        Ok(songs)
    }

    #[tracing::instrument(skip(self, song), fields(song.title = %song.title, song.events = song.events.len()))]
    async fn create(&self, song: NewSong) -> Result<Song> {
        self.simulate_network().await;
        let song = self.store.insert(song)?;
        tracing::info!(song.id = %song.id, "Song added");
        Ok(song)
    }

    #[tracing::instrument(skip(self), fields(song.id = %id))]
    async fn delete(&self, id: SongId) -> Result<SongId> {
        self.store.delete(&id)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::song::NoteEvent;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn list_and_create_wait_out_the_latency() {
        let service = SongService::in_memory(Duration::from_millis(2000));

        let start = Instant::now();
        let song = service
            .create(NewSong::new("etude", vec![NoteEvent::on(60, 0.0)], 0))
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(2000));

        let start = Instant::now();
        let songs = service.list().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
        assert_eq!(songs, vec![song]);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_answers_immediately_with_the_id() {
        let service = SongService::in_memory(Duration::from_millis(2000));
        let missing = SongId::new();

        let start = Instant::now();
        assert_eq!(service.delete(missing).await.unwrap(), missing);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
