//! Document tier
//!
//! One parsed document per source, loaded lazily on first request. A document
//! owns its size variants, so none of them can outlive it.

use std::collections::HashMap;

use svg_render::Point;

use crate::arena::{GenArena, GenIndex};
use crate::engine::{Bounds, VectorDocument, VectorEngine};
use crate::error::LoadError;
use crate::files::FileInterface;
use crate::key::FitPolicy;
use crate::size_variant::SizeVariantStore;

/// Generation-checked reference to a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(GenIndex);

/// A loaded source and everything rendered from it
#[derive(Debug)]
pub struct Document<D> {
    source: String,
    parsed: D,
    /// Native size clamped to at least 1x1
    intrinsic: Point,
    /// Content box, `None` when missing or degenerate
    content: Option<Bounds>,
    sizes: SizeVariantStore,
}

impl<D: VectorDocument> Document<D> {
    fn new(source: &str, parsed: D) -> Self {
        let (width, height) = parsed.native_size();
        let content = parsed.content_bounds().filter(|b| !b.is_empty());
        Self {
            source: source.to_owned(),
            parsed,
            intrinsic: Point::new(width.max(1.0), height.max(1.0)),
            content,
            sizes: SizeVariantStore::new(),
        }
    }
}

impl<D> Document<D> {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parsed(&self) -> &D {
        &self.parsed
    }

    pub fn intrinsic_dimensions(&self) -> Point {
        self.intrinsic
    }

    pub fn content_bounds(&self) -> Option<Bounds> {
        self.content
    }

    /// Dimensions a handle reports: the content box under ContentFit, the
    /// intrinsic size otherwise
    pub fn fitted_dimensions(&self, fit: FitPolicy) -> Point {
        match (fit, self.content) {
            (FitPolicy::ContentFit, Some(b)) => Point::new(b.width, b.height),
            _ => self.intrinsic,
        }
    }

    pub fn sizes(&self) -> &SizeVariantStore {
        &self.sizes
    }

    pub fn sizes_mut(&mut self) -> &mut SizeVariantStore {
        &mut self.sizes
    }
}

/// Documents keyed by source
#[derive(Debug)]
pub struct DocumentStore<D> {
    arena: GenArena<Document<D>>,
    by_source: HashMap<String, DocumentId>,
}

impl<D: VectorDocument> DocumentStore<D> {
    pub fn new() -> Self {
        Self {
            arena: GenArena::new(),
            by_source: HashMap::new(),
        }
    }

    /// Return the document for `source`, loading and parsing it first if needed.
    /// On failure nothing is inserted.
    pub fn get_or_load<E>(
        &mut self,
        source: &str,
        files: &dyn FileInterface,
        engine: &E,
    ) -> Result<(DocumentId, &mut Document<D>), LoadError>
    where
        E: VectorEngine<Document = D>,
    {
        let id = match self.by_source.get(source) {
            Some(&id) => id,
            None => {
                let document = Self::load(source, files, engine)?;
                tracing::debug!(
                    "Loaded SVG {} ({}x{})",
                    source,
                    document.intrinsic.x,
                    document.intrinsic.y
                );
                let id = DocumentId(self.arena.insert(document));
                self.by_source.insert(source.to_owned(), id);
                id
            }
        };

        let Some(document) = self.arena.get_mut(id.0) else {
            panic!("SVG document index for {source} points at an evicted slot");
        };
        Ok((id, document))
    }

    fn load<E>(source: &str, files: &dyn FileInterface, engine: &E) -> Result<Document<D>, LoadError>
    where
        E: VectorEngine<Document = D>,
    {
        if source.is_empty() {
            return Err(LoadError::EmptySource);
        }

        let data = files.load_file(source).map_err(|err| LoadError::Io {
            path: source.to_owned(),
            source: err,
        })?;

        let parsed = engine.parse(&data).map_err(|err| LoadError::Parse {
            path: source.to_owned(),
            source: err,
        })?;

        Ok(Document::new(source, parsed))
    }
}

impl<D> DocumentStore<D> {
    pub fn find(&self, source: &str) -> Option<DocumentId> {
        self.by_source.get(source).copied()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document<D>> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document<D>> {
        self.arena.get_mut(id.0)
    }

    /// Destroy a document and its parsed data. It must have no size variants left.
    pub fn remove(&mut self, id: DocumentId) -> Option<Document<D>> {
        let document = self.arena.remove(id.0)?;
        assert!(
            document.sizes.is_empty(),
            "SVG document {} removed with {} live size variants",
            document.source,
            document.sizes.len()
        );
        self.by_source.remove(&document.source);
        tracing::debug!("Evicted SVG document {}", document.source);
        Some(document)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &Document<D>)> {
        self.arena.iter().map(|(idx, doc)| (DocumentId(idx), doc))
    }

    /// Drop everything without per-document teardown
    pub fn clear(&mut self) {
        self.arena.clear();
        self.by_source.clear();
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

impl<D: VectorDocument> Default for DocumentStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFileInterface;
    use crate::testing::{StubEngine, stub_svg};

    fn files() -> MemoryFileInterface {
        MemoryFileInterface::new()
            .with_file("a.svg", stub_svg(100.0, 50.0, Some(Bounds::new(10.0, 10.0, 80.0, 30.0))))
            .with_file("zero.svg", stub_svg(0.0, -3.0, None))
            .with_file("flat.svg", stub_svg(100.0, 50.0, Some(Bounds::new(5.0, 5.0, 0.0, 10.0))))
            .with_file("bad.svg", "garbage")
    }

    #[test]
    fn test_load_once_per_source() {
        let mut store = DocumentStore::new();
        let (files, engine) = (files(), StubEngine::default());

        let (a, _) = store.get_or_load("a.svg", &files, &engine).unwrap();
        let (b, _) = store.get_or_load("a.svg", &files, &engine).unwrap();

        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(engine.parse_count(), 1);
    }

    #[test]
    fn test_failures_insert_nothing() {
        let mut store = DocumentStore::new();
        let (files, engine) = (files(), StubEngine::default());

        assert!(matches!(store.get_or_load("", &files, &engine), Err(LoadError::EmptySource)));
        assert!(matches!(store.get_or_load("missing.svg", &files, &engine), Err(LoadError::Io { .. })));
        assert!(matches!(store.get_or_load("bad.svg", &files, &engine), Err(LoadError::Parse { .. })));
        assert!(store.is_empty());
        assert!(store.find("bad.svg").is_none());
    }

    #[test]
    fn test_intrinsic_dimensions_clamped() {
        let mut store = DocumentStore::new();
        let (files, engine) = (files(), StubEngine::default());

        let (_, doc) = store.get_or_load("zero.svg", &files, &engine).unwrap();
        assert_eq!(doc.intrinsic_dimensions(), Point::new(1.0, 1.0));
    }

    #[test]
    fn test_fitted_dimensions() {
        let mut store = DocumentStore::new();
        let (files, engine) = (files(), StubEngine::default());

        let (_, doc) = store.get_or_load("a.svg", &files, &engine).unwrap();
        assert_eq!(doc.fitted_dimensions(FitPolicy::Stretch), Point::new(100.0, 50.0));
        assert_eq!(doc.fitted_dimensions(FitPolicy::ContentFit), Point::new(80.0, 30.0));
    }

    #[test]
    fn test_degenerate_content_box_falls_back_to_canvas() {
        let mut store = DocumentStore::new();
        let (files, engine) = (files(), StubEngine::default());

        let (_, doc) = store.get_or_load("flat.svg", &files, &engine).unwrap();
        assert_eq!(doc.content_bounds(), None);
        assert_eq!(doc.fitted_dimensions(FitPolicy::ContentFit), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_remove_makes_id_stale() {
        let mut store = DocumentStore::new();
        let (files, engine) = (files(), StubEngine::default());

        let (id, _) = store.get_or_load("a.svg", &files, &engine).unwrap();
        assert!(store.remove(id).is_some());
        assert!(store.get(id).is_none());
        assert!(store.find("a.svg").is_none());

        let (again, _) = store.get_or_load("a.svg", &files, &engine).unwrap();
        assert_ne!(id, again);
        assert_eq!(engine.parse_count(), 2);
    }
}
