//! In-memory catalog backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use fingerprint::{Address, Couple, FingerprintSet};

use crate::{song_key, FingerprintStore, Song, StoreError};

/// `RwLock`-guarded in-process store.
///
/// Couples live in an address-keyed map, songs in an id-keyed map with a
/// side index on the uniqueness key. The id counter is atomic and never
/// rewound, so ids stay unique even across [`FingerprintStore::wipe`].
pub struct MemoryStore {
    couples: RwLock<HashMap<Address, Vec<Couple>>>,
    songs: RwLock<HashMap<u32, Song>>,
    keys: RwLock<HashMap<String, u32>>,
    next_id: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            couples: RwLock::new(HashMap::new()),
            songs: RwLock::new(HashMap::new()),
            keys: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintStore for MemoryStore {
    fn store_fingerprints(&self, fingerprints: &FingerprintSet) -> Result<(), StoreError> {
        let mut guard = self
            .couples
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for (&address, couple) in fingerprints {
            let rows = guard.entry(address).or_default();
            if !rows.contains(couple) {
                rows.push(*couple);
            }
        }
        Ok(())
    }

    fn get_couples(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Vec<Couple>>, StoreError> {
        let guard = self
            .couples
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let mut result = HashMap::new();
        for &address in addresses {
            if let Some(rows) = guard.get(&address) {
                result.insert(address, rows.clone());
            }
        }
        Ok(result)
    }

    fn register_song(
        &self,
        title: &str,
        artist: &str,
        external_id: &str,
    ) -> Result<u32, StoreError> {
        let key = song_key(title, artist);
        let mut keys = self
            .keys
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        if keys.contains_key(&key) {
            return Err(StoreError::DuplicateSong { key });
        }

        let song_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        keys.insert(key, song_id);
        self.songs
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(
                song_id,
                Song {
                    title: title.to_string(),
                    artist: artist.to_string(),
                    external_id: external_id.to_string(),
                },
            );
        Ok(song_id)
    }

    fn get_song_by_id(&self, song_id: u32) -> Result<Option<Song>, StoreError> {
        let guard = self
            .songs
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(&song_id).cloned())
    }

    fn delete_song_by_id(&self, song_id: u32) -> Result<(), StoreError> {
        let mut songs = self
            .songs
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        if let Some(song) = songs.remove(&song_id) {
            self.keys
                .write()
                .map_err(|_| StoreError::backend("poisoned lock"))?
                .remove(&song_key(&song.title, &song.artist));
        }
        Ok(())
    }

    fn total_songs(&self) -> Result<usize, StoreError> {
        let guard = self
            .songs
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.len())
    }

    fn wipe(&self) -> Result<(), StoreError> {
        self.couples
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .clear();
        self.songs
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .clear();
        self.keys
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .clear();
        Ok(())
    }
}
