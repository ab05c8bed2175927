//! Transient store for uploaded files shared across the two-call creation
//! flow (upload, then alias/metadata by file id).
//!
//! Bounded both ways: entries expire after a TTL and the map never grows
//! past a fixed capacity (oldest evicted first). Expired entries are purged
//! lazily on access.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    stored_at: Instant,
    /// Insertion order; ties on `stored_at` are possible on coarse clocks.
    seq: u64,
}

pub struct UploadStore {
    entries: Mutex<HashMap<Uuid, StoredUpload>>,
    ttl: Duration,
    max_entries: usize,
    next_seq: Mutex<u64>,
}

impl UploadStore {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            next_seq: Mutex::new(0),
        }
    }

    pub fn from_config(config: &examforge_core::config::UploadConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    /// Store an upload and return its opaque handle.
    pub async fn insert(&self, filename: String, bytes: Vec<u8>) -> Uuid {
        let id = Uuid::new_v4();
        let seq = {
            let mut next = self.next_seq.lock().await;
            *next += 1;
            *next
        };
        let mut entries = self.entries.lock().await;
        Self::purge_expired(&mut entries, self.ttl);

        // At capacity: evict the oldest entry.
        if entries.len() >= self.max_entries {
            if let Some(&oldest) = entries.iter().min_by_key(|(_, v)| v.seq).map(|(k, _)| k) {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            id,
            StoredUpload {
                filename,
                bytes,
                stored_at: Instant::now(),
                seq,
            },
        );
        id
    }

    /// Fetch a stored upload if it exists and has not expired.
    pub async fn get(&self, id: Uuid) -> Option<StoredUpload> {
        let mut entries = self.entries.lock().await;
        Self::purge_expired(&mut entries, self.ttl);
        entries.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    fn purge_expired(entries: &mut HashMap<Uuid, StoredUpload>, ttl: Duration) {
        let now = Instant::now();
        entries.retain(|_, v| now.duration_since(v.stored_at) < ttl);
    }
}
