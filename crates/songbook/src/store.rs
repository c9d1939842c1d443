//! Song Store
//!
//! Trait and in-memory implementation for song storage.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::types::song::{NewSong, Song, SongId};

/// Song store trait for pluggable storage backends.
pub trait SongStore: Send + Sync {
    /// Insert a song, assigning it a fresh id.
    fn insert(&self, song: NewSong) -> Result<Song>;

    /// All songs in insertion order.
    fn list(&self) -> Result<Vec<Song>>;

    /// Remove a song. Returns whether anything was removed.
    fn delete(&self, id: &SongId) -> Result<bool>;

    /// Number of stored songs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct StoredSong {
    seq: u64,
    song: Song,
}

/// In-memory song store using DashMap.
#[derive(Debug, Default)]
pub struct InMemorySongStore {
    songs: DashMap<SongId, StoredSong>,
    next_seq: AtomicU64,
}

impl InMemorySongStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SongStore for InMemorySongStore {
    fn insert(&self, song: NewSong) -> Result<Song> {
        let id = SongId::new();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let song = song.into_song(id);

        self.songs.insert(
            id,
            StoredSong {
                seq,
                song: song.clone(),
            },
        );

        tracing::debug!(
            song.id = %id,
            song.title = %song.title,
            song.events = song.events.len(),
            "Stored song"
        );

        Ok(song)
    }

    fn list(&self) -> Result<Vec<Song>> {
        let mut entries: Vec<(u64, Song)> = self
            .songs
            .iter()
            .map(|entry| (entry.seq, entry.song.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);

        Ok(entries.into_iter().map(|(_, song)| song).collect())
    }

    fn delete(&self, id: &SongId) -> Result<bool> {
        let removed = self.songs.remove(id).is_some();
        if removed {
            tracing::debug!(song.id = %id, "Deleted song");
        } else {
            tracing::debug!(song.id = %id, "Delete of unknown song ignored");
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.songs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::song::NoteEvent;

    fn new_song(title: &str) -> NewSong {
        NewSong::new(title, vec![NoteEvent::on(60, 0.0), NoteEvent::off(60, 250.0)], 1)
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = InMemorySongStore::new();
        for title in ["one", "two", "three", "four"] {
            store.insert(new_song(title)).unwrap();
        }

        let titles: Vec<String> = store.list().unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn insert_keeps_events_verbatim() {
        let store = InMemorySongStore::new();
        let song = store.insert(new_song("etude")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![song.clone()]);
        assert_eq!(song.events[1].delay_ms, 250.0);
    }

    #[test]
    fn delete_unknown_is_not_an_error() {
        let store = InMemorySongStore::new();
        store.insert(new_song("keep")).unwrap();

        assert!(!store.delete(&SongId::new()).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleted_ids_are_not_reissued() {
        let store = InMemorySongStore::new();
        let first = store.insert(new_song("a")).unwrap();
        assert!(store.delete(&first.id).unwrap());
        assert!(store.is_empty());

        let second = store.insert(new_song("b")).unwrap();
        assert_ne!(first.id, second.id);
    }
}
