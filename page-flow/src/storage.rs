use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Trait for storing and retrieving per-user session state
#[async_trait]
pub trait SessionStorage<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    async fn save(&self, id: &str, session: S) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<S>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

struct Entry<S> {
    session: S,
    touched: Instant,
}

/// In-memory implementation of SessionStorage.
///
/// With an idle timeout, a session not saved or read for that long is treated as gone;
/// [`InMemorySessionStorage::evict_idle`] drops such entries in bulk.
pub struct InMemorySessionStorage<S> {
    sessions: Arc<DashMap<String, Entry<S>>>,
    idle_timeout: Option<Duration>,
}

impl<S> InMemorySessionStorage<S> {
    /// Storage whose sessions never expire
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout: None,
        }
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout: Some(idle_timeout),
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove every idle session, returning how many were dropped
    pub fn evict_idle(&self) -> usize {
        let Some(timeout) = self.idle_timeout else {
            return 0;
        };

        let mut evicted = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.touched.elapsed() < timeout;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    fn is_idle(&self, entry: &Entry<S>) -> bool {
        self.idle_timeout
            .is_some_and(|timeout| entry.touched.elapsed() >= timeout)
    }
}

impl<S> Default for InMemorySessionStorage<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> SessionStorage<S> for InMemorySessionStorage<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn save(&self, id: &str, session: S) -> Result<()> {
        self.sessions.insert(
            id.to_string(),
            Entry {
                session,
                touched: Instant::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<S>> {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                if !self.is_idle(&entry) {
                    entry.touched = Instant::now();
                    return Ok(Some(entry.session.clone()));
                }
            }
            None => return Ok(None),
        }

        self.sessions.remove(id);
        Ok(None)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
