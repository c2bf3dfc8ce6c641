//! Asset cache
//!
//! Parsed originals keyed by URL. Entries are never mutated; every load
//! normalizes its own clone, so a cache hit reproduces the previous result.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use meshview_core::MeshScene;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct AssetCache {
    scenes: RwLock<AHashMap<String, Arc<MeshScene>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Arc<MeshScene>> {
        let scene = self.scenes.read().get(url).cloned();
        let counter = if scene.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        scene
    }

    pub fn insert(&self, url: impl Into<String>, scene: Arc<MeshScene>) {
        self.scenes.write().insert(url.into(), scene);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.scenes.read().contains_key(url)
    }

    pub fn evict(&self, url: &str) -> Option<Arc<MeshScene>> {
        self.scenes.write().remove(url)
    }

    pub fn clear(&self) {
        self.scenes.write().clear();
    }

    pub fn len(&self) -> usize {
        self.scenes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.read().is_empty()
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}
