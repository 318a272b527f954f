//! Bounded render cache.
//!
//! Source documents are treated as immutable for the cache's lifetime;
//! entries are evicted FIFO when the capacity is reached and are only
//! invalidated explicitly, never automatically.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::pipeline::RenderedPage;

/// Bounded FIFO cache of rendered pages keyed by document path.
///
/// Safe to share between worker threads; all access goes through one
/// internal mutex held only for map operations.
pub struct RenderCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    pages: HashMap<String, RenderedPage>,
    order: VecDeque<String>,
}

impl RenderCache {
    /// Create a cache holding at most `capacity` pages.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                pages: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
        }
    }

    /// Look up a rendered page by path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<RenderedPage> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.pages.get(path).cloned()
    }

    /// Store a rendered page, evicting the oldest entry when full.
    pub fn insert(&self, path: impl Into<String>, page: RenderedPage) {
        let path = path.into();
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if inner.pages.insert(path.clone(), page).is_none() {
            inner.order.push_back(path);
            if inner.order.len() > self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.pages.remove(&oldest);
                }
            }
        }
    }

    /// Drop the cached entry for one path.
    pub fn invalidate(&self, path: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.pages.remove(path).is_some() {
            inner.order.retain(|p| p != path);
        }
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.pages.clear();
        inner.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
