use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CricResult;
use crate::ingest;
use crate::innings::InningsTable;
use crate::source::{DataSource, SourceSnapshot};

/// How a table was obtained from the cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Same source, same content digest: the cached table was reused
    Hit,
    /// Nothing cached for this source yet
    Loaded,
    /// The source content changed since the last load; the entry was replaced
    Reloaded,
}

struct CacheEntry {
    digest: String,
    /// Binding the table was decoded with. Delimiter, compression or sheet changes
    /// invalidate the entry even when the bytes are the same.
    source: DataSource,
    table: Arc<InningsTable>,
}

/// Normalized tables keyed by source identity, valid only while the source bytes hash the same.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<String, CacheEntry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `source` and return its normalized table, re-normalizing only when the content
    /// digest differs from the cached one.
    pub fn load(&mut self, source: &DataSource) -> CricResult<(Arc<InningsTable>, CacheOutcome)> {
        let snapshot = source.fetch()?;
        self.get_or_decode(source, &snapshot)
    }

    /// Like [`TableCache::load`] for bytes that were already fetched.
    pub fn get_or_decode(
        &mut self,
        source: &DataSource,
        snapshot: &SourceSnapshot,
    ) -> CricResult<(Arc<InningsTable>, CacheOutcome)> {
        let key = source.key();
        let outcome = match self.entries.get(&key) {
            Some(entry) if entry.digest == snapshot.digest && entry.source == *source => {
                debug!("cache hit for {}", key);
                return Ok((Arc::clone(&entry.table), CacheOutcome::Hit));
            }
            Some(_) => CacheOutcome::Reloaded,
            None => CacheOutcome::Loaded,
        };

        // A failed decode must not leave a stale table behind for this source.
        let table = match ingest::decode(source, snapshot) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                self.entries.remove(&key);
                return Err(e);
            }
        };
        if outcome == CacheOutcome::Reloaded {
            info!("source {} changed; table reloaded", key);
        }
        self.entries.insert(
            key,
            CacheEntry {
                digest: snapshot.digest.clone(),
                source: source.clone(),
                table: Arc::clone(&table),
            },
        );
        Ok((table, outcome))
    }

    /// Get the cached digest for a source, if any
    pub fn digest(&self, source: &DataSource) -> Option<&str> {
        self.entries.get(&source.key()).map(|e| e.digest.as_str())
    }

    /// Drop the entry of one source. Returns whether there was one.
    pub fn invalidate(&mut self, source: &DataSource) -> bool {
        self.entries.remove(&source.key()).is_some()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
