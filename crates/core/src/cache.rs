//! Memoized catalog lookups with per-key single-flight.
//!
//! The table maps a normalized query to either a finished candidate list or a pending fetch.
//! Callers that find a pending entry subscribe to its `watch` channel instead of issuing their
//! own request. Failures are never stored: the entry is dropped and the next caller fetches
//! again.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::catalog::CatalogClient;
use crate::domain::candidate::CandidateRecord;
use crate::errors::CatalogError;

pub type Candidates = Arc<[CandidateRecord]>;
type FetchOutcome = Result<Candidates, CatalogError>;

/// Trimmed, case-folded form of an observed product name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_query(query: &str) -> Self {
        Self(query.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

enum CacheEntry {
    Pending(watch::Receiver<Option<FetchOutcome>>),
    Ready(Candidates),
}

#[derive(Default)]
struct Table {
    entries: HashMap<CacheKey, CacheEntry>,
    ready_order: VecDeque<CacheKey>,
}

impl Table {
    fn insert_ready(&mut self, key: CacheKey, candidates: Candidates, max_entries: Option<usize>) {
        self.entries.insert(key.clone(), CacheEntry::Ready(candidates));
        self.ready_order.push_back(key);

        let Some(limit) = max_entries else {
            return;
        };
        while self.ready_order.len() > limit {
            let Some(oldest) = self.ready_order.pop_front() else {
                break;
            };
            if matches!(self.entries.get(&oldest), Some(CacheEntry::Ready(_))) {
                self.entries.remove(&oldest);
            }
        }
    }

    fn remove_pending(&mut self, key: &CacheKey) {
        if matches!(self.entries.get(key), Some(CacheEntry::Pending(_))) {
            self.entries.remove(key);
        }
    }
}

enum Role {
    Leader(watch::Sender<Option<FetchOutcome>>, watch::Receiver<Option<FetchOutcome>>),
    Waiter(watch::Receiver<Option<FetchOutcome>>),
}

pub struct LookupCache {
    client: Arc<dyn CatalogClient>,
    table: Arc<Mutex<Table>>,
    max_entries: Option<usize>,
}

impl LookupCache {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client, table: Arc::new(Mutex::new(Table::default())), max_entries: None }
    }

    /// Caps the number of finished entries; the oldest is evicted first.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.filter(|limit| *limit > 0);
        self
    }

    /// Returns the cached candidates for `query`, fetching them at most once per key.
    ///
    /// The fetch runs on its own task, so dropping the caller that started it does not cancel
    /// the lookup other callers are waiting on.
    pub async fn get_or_fetch(&self, query: &str) -> Result<Candidates, CatalogError> {
        let key = CacheKey::from_query(query);

        let role = {
            let mut table = lock(&self.table);
            match table.entries.get(&key) {
                Some(CacheEntry::Ready(candidates)) => {
                    debug!(
                        event_name = "leafscore.cache.hit",
                        cache_key = key.as_str(),
                        candidates = candidates.len(),
                        "serving catalog lookup from cache"
                    );
                    return Ok(Arc::clone(candidates));
                }
                Some(CacheEntry::Pending(receiver)) => Role::Waiter(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    table.entries.insert(key.clone(), CacheEntry::Pending(receiver.clone()));
                    Role::Leader(sender, receiver)
                }
            }
        };

        match role {
            Role::Waiter(receiver) => {
                debug!(
                    event_name = "leafscore.cache.join",
                    cache_key = key.as_str(),
                    "joining in-flight catalog lookup"
                );
                wait_for_fetch(receiver).await
            }
            Role::Leader(sender, receiver) => {
                debug!(
                    event_name = "leafscore.cache.miss",
                    cache_key = key.as_str(),
                    "fetching catalog candidates"
                );
                let fetch = PendingFetch {
                    client: Arc::clone(&self.client),
                    table: Arc::clone(&self.table),
                    max_entries: self.max_entries,
                    key,
                    query: query.to_string(),
                };
                tokio::spawn(fetch.run(sender));
                wait_for_fetch(receiver).await
            }
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.table)
            .entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when a finished entry exists for the normalized form of `query`.
    pub fn contains(&self, query: &str) -> bool {
        matches!(
            lock(&self.table).entries.get(&CacheKey::from_query(query)),
            Some(CacheEntry::Ready(_))
        )
    }
}

fn lock(table: &Mutex<Table>) -> MutexGuard<'_, Table> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A catalog fetch detached from the caller that started it.
struct PendingFetch {
    client: Arc<dyn CatalogClient>,
    table: Arc<Mutex<Table>>,
    max_entries: Option<usize>,
    key: CacheKey,
    query: String,
}

impl PendingFetch {
    async fn run(self, sender: watch::Sender<Option<FetchOutcome>>) {
        let mut guard = PendingGuard { table: &self.table, key: Some(self.key.clone()) };
        let outcome = self.client.lookup(&self.query).await.map(Candidates::from);
        guard.key = None;

        {
            let mut table = lock(&self.table);
            match &outcome {
                Ok(candidates) => {
                    table.insert_ready(self.key.clone(), Arc::clone(candidates), self.max_entries)
                }
                Err(_) => {
                    table.entries.remove(&self.key);
                }
            }
        }
        if let Err(error) = &outcome {
            debug!(
                event_name = "leafscore.cache.fetch_failed",
                cache_key = self.key.as_str(),
                error = %error,
                "catalog lookup failed; entry not cached"
            );
        }

        sender.send_replace(Some(outcome));
    }
}

async fn wait_for_fetch(mut receiver: watch::Receiver<Option<FetchOutcome>>) -> FetchOutcome {
    let outcome = match receiver.wait_for(Option::is_some).await {
        Ok(value) => value.as_ref().cloned(),
        Err(_) => None,
    };
    outcome.unwrap_or_else(|| {
        Err(CatalogError::Network("catalog lookup ended before completion".to_string()))
    })
}

/// Clears the pending entry if the fetch task dies before recording an outcome.
struct PendingGuard<'a> {
    table: &'a Mutex<Table>,
    key: Option<CacheKey>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            lock(self.table).remove_pending(&key);
        }
    }
}
