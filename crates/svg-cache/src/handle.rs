//! Handle table
//!
//! Maps render configurations to caller-held handles. Keys are bucketed by
//! their hash and compared in full inside a bucket, so two configurations whose
//! hashes collide still get distinct handles. Handle ids come from a counter
//! and are never handed out twice.

use std::collections::HashMap;
use std::num::NonZeroU64;

use svg_render::Point;

use crate::document::DocumentId;
use crate::key::HandleKey;

/// Caller-held token for one configuration. There is no zero handle;
/// a failed request is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SvgHandle(NonZeroU64);

impl SvgHandle {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// A live handle and the back-references needed to evict its tiers
#[derive(Debug, Clone)]
pub struct HandleEntry {
    key: HandleKey,
    hash: u64,
    ref_count: usize,
    document: DocumentId,
    /// Intrinsic size, or the content box size under ContentFit
    intrinsic: Point,
}

impl HandleEntry {
    pub fn key(&self) -> &HandleKey {
        &self.key
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn intrinsic_dimensions(&self) -> Point {
        self.intrinsic
    }
}

/// Outcome of [`HandleTable::release`]
#[derive(Debug)]
pub enum HandleRelease {
    Retained { remaining: usize },
    /// Count reached zero; the entry is gone from the table
    Evicted(HandleEntry),
}

#[derive(Debug)]
pub struct HandleTable {
    entries: HashMap<SvgHandle, HandleEntry>,
    buckets: HashMap<u64, Vec<SvgHandle>>,
    next_id: u64,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            buckets: HashMap::new(),
            next_id: 1,
        }
    }

    /// Bump and return the live handle for `key`, if any
    pub fn acquire(&mut self, key: &HandleKey) -> Option<SvgHandle> {
        self.acquire_hashed(key, key.hash_value())
    }

    pub(crate) fn acquire_hashed(&mut self, key: &HandleKey, hash: u64) -> Option<SvgHandle> {
        let handle = self
            .buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|h| self.entries.get(h).is_some_and(|e| e.key == *key))?;
        let entry = self.entries.get_mut(&handle)?;
        entry.ref_count += 1;
        Some(handle)
    }

    /// Register a new handle with a count of one
    pub fn insert(&mut self, key: HandleKey, document: DocumentId, intrinsic: Point) -> SvgHandle {
        let hash = key.hash_value();
        self.insert_hashed(key, hash, document, intrinsic)
    }

    pub(crate) fn insert_hashed(&mut self, key: HandleKey, hash: u64, document: DocumentId, intrinsic: Point) -> SvgHandle {
        let handle = self.next_handle();
        self.buckets.entry(hash).or_default().push(handle);
        self.entries.insert(
            handle,
            HandleEntry {
                key,
                hash,
                ref_count: 1,
                document,
                intrinsic,
            },
        );
        handle
    }

    fn next_handle(&mut self) -> SvgHandle {
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if let Some(id) = NonZeroU64::new(id) {
                return SvgHandle(id);
            }
        }
    }

    pub fn get(&self, handle: SvgHandle) -> Option<&HandleEntry> {
        self.entries.get(&handle)
    }

    /// Drop one reference. `None` if the handle is not live.
    pub fn release(&mut self, handle: SvgHandle) -> Option<HandleRelease> {
        let entry = self.entries.get_mut(&handle)?;
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return Some(HandleRelease::Retained {
                remaining: entry.ref_count,
            });
        }

        let entry = self.entries.remove(&handle)?;
        if let Some(bucket) = self.buckets.get_mut(&entry.hash) {
            bucket.retain(|h| *h != handle);
            if bucket.is_empty() {
                self.buckets.remove(&entry.hash);
            }
        }
        Some(HandleRelease::Evicted(entry))
    }

    /// Drop every entry. Ids keep counting, so cleared handles stay dead.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStore;
    use crate::files::MemoryFileInterface;
    use crate::key::FitPolicy;
    use crate::testing::{StubEngine, stub_svg};
    use svg_render::{Color, PixelSize};

    fn document_id() -> DocumentId {
        let files = MemoryFileInterface::new().with_file("a.svg", stub_svg(10.0, 10.0, None));
        let mut store = DocumentStore::new();
        store.get_or_load("a.svg", &files, &StubEngine::default()).unwrap().0
    }

    fn key(color: Color) -> HandleKey {
        HandleKey::new("a.svg", PixelSize::new(16, 16), FitPolicy::Stretch, color)
    }

    #[test]
    fn test_acquire_bumps_count() {
        let mut table = HandleTable::new();
        let doc = document_id();
        let handle = table.insert(key(Color::RED), doc, Point::new(10.0, 10.0));

        assert_eq!(table.acquire(&key(Color::RED)), Some(handle));
        assert_eq!(table.get(handle).unwrap().ref_count(), 2);
        assert_eq!(table.acquire(&key(Color::BLUE)), None);
    }

    #[test]
    fn test_release_to_zero_evicts() {
        let mut table = HandleTable::new();
        let handle = table.insert(key(Color::RED), document_id(), Point::ZERO);
        table.acquire(&key(Color::RED));

        assert!(matches!(table.release(handle), Some(HandleRelease::Retained { remaining: 1 })));
        match table.release(handle) {
            Some(HandleRelease::Evicted(entry)) => assert_eq!(entry.key(), &key(Color::RED)),
            other => panic!("expected eviction, got {other:?}"),
        }
        assert!(table.is_empty());
        assert!(table.release(handle).is_none());
        assert!(table.acquire(&key(Color::RED)).is_none());
    }

    #[test]
    fn test_hash_collision_keeps_keys_apart() {
        let mut table = HandleTable::new();
        let doc = document_id();

        let red = table.insert_hashed(key(Color::RED), 42, doc, Point::ZERO);
        let blue = table.insert_hashed(key(Color::BLUE), 42, doc, Point::ZERO);

        assert_ne!(red, blue);
        assert_eq!(table.acquire_hashed(&key(Color::RED), 42), Some(red));
        assert_eq!(table.acquire_hashed(&key(Color::BLUE), 42), Some(blue));

        // Evicting one entry of a shared bucket must not hide the other
        for _ in 0..2 {
            table.release(red);
        }
        assert_eq!(table.acquire_hashed(&key(Color::BLUE), 42), Some(blue));
        assert_eq!(table.acquire_hashed(&key(Color::RED), 42), None);
    }

    #[test]
    fn test_evicted_ids_are_not_reused() {
        let mut table = HandleTable::new();
        let doc = document_id();

        let first = table.insert(key(Color::RED), doc, Point::ZERO);
        table.release(first);
        let second = table.insert(key(Color::RED), doc, Point::ZERO);

        assert_ne!(first, second);
        assert!(table.release(first).is_none());
        assert_eq!(table.get(second).unwrap().ref_count(), 1);

        table.clear();
        let third = table.insert(key(Color::RED), doc, Point::ZERO);
        assert_ne!(third, first);
        assert_ne!(third, second);
    }
}
