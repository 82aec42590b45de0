//! Deterministic engine for unit tests
//!
//! Documents are plain text: `stub <width> <height> [<x> <y> <w> <h>]`.

use std::cell::RefCell;
use std::error::Error as StdError;
use std::rc::Rc;

use tiny_skia::{PixmapMut, Transform};

use crate::engine::{Bounds, VectorDocument, VectorEngine};

pub fn stub_svg(width: f32, height: f32, content: Option<Bounds>) -> String {
    match content {
        Some(b) => format!("stub {width} {height} {} {} {} {}", b.x, b.y, b.width, b.height),
        None => format!("stub {width} {height}"),
    }
}

#[derive(Debug, Default)]
struct StubLog {
    parses: usize,
    renders: usize,
    last_transform: Option<Transform>,
}

#[derive(Debug, Default)]
pub struct StubEngine {
    log: Rc<RefCell<StubLog>>,
}

impl StubEngine {
    pub fn parse_count(&self) -> usize {
        self.log.borrow().parses
    }

    pub fn render_count(&self) -> usize {
        self.log.borrow().renders
    }

    pub fn last_transform(&self) -> Option<Transform> {
        self.log.borrow().last_transform
    }
}

#[derive(Debug)]
pub struct StubDocument {
    size: (f32, f32),
    content: Option<Bounds>,
    log: Rc<RefCell<StubLog>>,
}

impl VectorEngine for StubEngine {
    type Document = StubDocument;

    fn parse(&self, data: &[u8]) -> Result<StubDocument, Box<dyn StdError + Send + Sync>> {
        let text = std::str::from_utf8(data)?;
        let mut parts = text.split_whitespace();
        if parts.next() != Some("stub") {
            return Err("not a stub document".into());
        }
        let numbers = parts.map(str::parse::<f32>).collect::<Result<Vec<_>, _>>()?;

        let (size, content) = match numbers.as_slice() {
            [w, h] => ((*w, *h), None),
            [w, h, x, y, bw, bh] => ((*w, *h), Some(Bounds::new(*x, *y, *bw, *bh))),
            _ => return Err(format!("expected 2 or 6 numbers, got {}", numbers.len()).into()),
        };

        self.log.borrow_mut().parses += 1;
        Ok(StubDocument {
            size,
            content,
            log: Rc::clone(&self.log),
        })
    }
}

impl VectorDocument for StubDocument {
    fn native_size(&self) -> (f32, f32) {
        self.size
    }

    fn content_bounds(&self) -> Option<Bounds> {
        self.content
    }

    fn render(&self, pixmap: &mut PixmapMut<'_>, transform: Transform) {
        pixmap.data_mut().fill(255);
        let mut log = self.log.borrow_mut();
        log.renders += 1;
        log.last_transform = Some(transform);
    }
}
