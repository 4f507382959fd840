//! Persistent catalog backend on top of redb.
//!
//! redb is a pure-Rust ACID embedded database, which keeps the catalog free
//! of C++ build dependencies. Couples and songs are stored bincode-encoded;
//! the song-id counter lives in a one-row meta table so allocated ids
//! survive restarts and wipes.

use std::collections::HashMap;
use std::path::Path;

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use fingerprint::{Address, Couple, FingerprintSet};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::{song_key, FingerprintStore, Song, StoreError};

/// address → bincode-encoded `Vec<Couple>`.
const COUPLES: TableDefinition<i64, &[u8]> = TableDefinition::new("couples");
/// song id → bincode-encoded [`Song`].
const SONGS: TableDefinition<u32, &[u8]> = TableDefinition::new("songs");
/// `title___artist` key → song id.
const SONG_KEYS: TableDefinition<&str, u32> = TableDefinition::new("song_keys");
/// Store-level counters; currently only `next_song_id`.
const META: TableDefinition<&str, u32> = TableDefinition::new("meta");

const NEXT_SONG_ID: &str = "next_song_id";

/// Embedded persistent store.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) a catalog database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;
        let store = Self { db };
        // Materialize every table up front so later read transactions never
        // observe a missing table.
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            txn.open_table(COUPLES).map_err(StoreError::backend)?;
            txn.open_table(SONGS).map_err(StoreError::backend)?;
            txn.open_table(SONG_KEYS).map_err(StoreError::backend)?;
            txn.open_table(META).map_err(StoreError::backend)?;
        }
        txn.commit().map_err(StoreError::backend)
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        encode_to_vec(value, standard()).map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        decode_from_slice(bytes, standard())
            .map(|(value, _)| value)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl FingerprintStore for RedbStore {
    fn store_fingerprints(&self, fingerprints: &FingerprintSet) -> Result<(), StoreError> {
        if fingerprints.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = txn.open_table(COUPLES).map_err(StoreError::backend)?;
            for (&address, couple) in fingerprints {
                let mut rows: Vec<Couple> = match table.get(address).map_err(StoreError::backend)? {
                    Some(guard) => Self::decode(guard.value())?,
                    None => Vec::new(),
                };
                if rows.contains(couple) {
                    continue;
                }
                rows.push(*couple);
                let bytes = Self::encode(&rows)?;
                table
                    .insert(address, bytes.as_slice())
                    .map_err(StoreError::backend)?;
            }
        }
        txn.commit().map_err(StoreError::backend)
    }

    fn get_couples(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Vec<Couple>>, StoreError> {
        let txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = txn.open_table(COUPLES).map_err(StoreError::backend)?;

        let mut result = HashMap::new();
        for &address in addresses {
            if let Some(guard) = table.get(address).map_err(StoreError::backend)? {
                result.insert(address, Self::decode(guard.value())?);
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
        let txn = self.db.begin_write().map_err(StoreError::backend)?;
        let song_id = {
            let mut keys = txn.open_table(SONG_KEYS).map_err(StoreError::backend)?;
            if keys.get(key.as_str()).map_err(StoreError::backend)?.is_some() {
                return Err(StoreError::DuplicateSong { key });
            }

            let mut meta = txn.open_table(META).map_err(StoreError::backend)?;
            let song_id = meta
                .get(NEXT_SONG_ID)
                .map_err(StoreError::backend)?
                .map(|guard| guard.value())
                .unwrap_or(1);
            meta.insert(NEXT_SONG_ID, song_id + 1)
                .map_err(StoreError::backend)?;
            keys.insert(key.as_str(), song_id)
                .map_err(StoreError::backend)?;

            let song = Song {
                title: title.to_string(),
                artist: artist.to_string(),
                external_id: external_id.to_string(),
            };
            let bytes = Self::encode(&song)?;
            let mut songs = txn.open_table(SONGS).map_err(StoreError::backend)?;
            songs
                .insert(song_id, bytes.as_slice())
                .map_err(StoreError::backend)?;
            song_id
        };
        txn.commit().map_err(StoreError::backend)?;
        Ok(song_id)
    }

    fn get_song_by_id(&self, song_id: u32) -> Result<Option<Song>, StoreError> {
        let txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = txn.open_table(SONGS).map_err(StoreError::backend)?;
        match table.get(song_id).map_err(StoreError::backend)? {
            Some(guard) => Ok(Some(Self::decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn delete_song_by_id(&self, song_id: u32) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut songs = txn.open_table(SONGS).map_err(StoreError::backend)?;
            let removed: Option<Song> = match songs.remove(song_id).map_err(StoreError::backend)? {
                Some(guard) => Some(Self::decode(guard.value())?),
                None => None,
            };
            if let Some(song) = removed {
                let mut keys = txn.open_table(SONG_KEYS).map_err(StoreError::backend)?;
                keys.remove(song_key(&song.title, &song.artist).as_str())
                    .map_err(StoreError::backend)?;
            }
        }
        txn.commit().map_err(StoreError::backend)
    }

    fn total_songs(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = txn.open_table(SONGS).map_err(StoreError::backend)?;
        let count = table.len().map_err(StoreError::backend)?;
        Ok(count as usize)
    }

    fn wipe(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(StoreError::backend)?;
        // Dropping and recreating the tables is cheaper than draining them
        // row by row. META survives so the id counter is not rewound.
        txn.delete_table(COUPLES).map_err(StoreError::backend)?;
        txn.delete_table(SONGS).map_err(StoreError::backend)?;
        txn.delete_table(SONG_KEYS).map_err(StoreError::backend)?;
        {
            txn.open_table(COUPLES).map_err(StoreError::backend)?;
            txn.open_table(SONGS).map_err(StoreError::backend)?;
            txn.open_table(SONG_KEYS).map_err(StoreError::backend)?;
        }
        txn.commit().map_err(StoreError::backend)
    }
}
