//! Edge case tests for svg-render
//!
//! Geometry, texture realization and the recording backend through the public API.

use svg_render::*;

// ============================================================================
// COLOR EDGE CASES
// ============================================================================

#[test]
fn test_opacity_folding() {
    let color = Color::rgba(10, 20, 30, 255);
    assert_eq!(color.with_opacity(1.0), color);
    assert_eq!(color.with_opacity(0.0).a, 0);
    assert_eq!(color.with_opacity(2.0), color);
    assert_eq!(color.with_opacity(-1.0).a, 0);
    assert_eq!(Color::rgba(0, 0, 0, 201).with_opacity(0.5).a, 100);
}

#[test]
fn test_color_packing_keeps_all_channels() {
    assert_eq!(Color::rgba(0x12, 0x34, 0x56, 0x78).to_u32(), 0x1234_5678);
    assert_ne!(Color::rgba(1, 2, 3, 4).to_u32(), Color::rgba(1, 2, 3, 5).to_u32());
}

// ============================================================================
// GEOMETRY EDGE CASES
// ============================================================================

#[test]
fn test_empty_geometry_draws_nothing() {
    let mut backend = RecordingRenderer::new();
    Geometry::default().render(&mut backend, Point::ZERO, None);
    assert!(backend.commands().is_empty());
}

#[test]
fn test_zero_sized_quad_is_still_submitted() {
    let mut db = TextureDatabase::new();
    let texture = db.insert(());
    let geometry = Geometry::textured_quad(Point::ZERO, Point::ZERO, Color::WHITE, texture);

    let mut backend = RecordingRenderer::new();
    geometry.render(&mut backend, Point::new(1.0, 1.0), None);
    assert_eq!(backend.draw_calls().count(), 1);
}

#[test]
fn test_render_passes_translation_and_texture() {
    let mut db = TextureDatabase::new();
    let mut backend = RecordingRenderer::new();
    let id = db.insert(PixelSize::new(2, 2));
    let (handle, _) = db
        .ensure_loaded(id, &mut backend, |size| {
            Ok(PixelBuffer::new(vec![0; size.rgba_len()], *size).unwrap())
        })
        .unwrap();

    let geometry = Geometry::textured_quad(Point::ZERO, Point::new(2.0, 2.0), Color::RED, id);
    geometry.render(&mut backend, Point::new(7.0, 9.0), Some(handle));

    match backend.draw_calls().next() {
        Some(RenderCommand::RenderGeometry {
            vertices,
            indices,
            translation,
            texture,
        }) => {
            assert_eq!(vertices.len(), 4);
            assert_eq!(indices.len(), 6);
            assert_eq!(*translation, Point::new(7.0, 9.0));
            assert_eq!(*texture, Some(handle));
        }
        other => panic!("expected a draw call, got {other:?}"),
    }
}

// ============================================================================
// TEXTURE DATABASE EDGE CASES
// ============================================================================

#[test]
fn test_ids_are_never_reused() {
    let mut db = TextureDatabase::new();
    let a = db.insert(());
    db.remove(a);
    let b = db.insert(());
    assert_ne!(a, b);
    assert!(!db.contains(a));
}

#[test]
fn test_pending_releases_flush_on_next_realize() {
    let mut db = TextureDatabase::new();
    let mut backend = RecordingRenderer::new();
    let solid = |size: PixelSize| PixelBuffer::new(vec![255; size.rgba_len()], size).unwrap();

    let old = db.insert(());
    db.ensure_loaded(old, &mut backend, |_| Ok(solid(PixelSize::new(1, 1)))).unwrap();
    db.remove(old);
    assert_eq!(backend.live_textures(), 1);

    let new = db.insert(());
    db.ensure_loaded(new, &mut backend, |_| Ok(solid(PixelSize::new(1, 1)))).unwrap();
    assert_eq!(backend.live_textures(), 1);
    assert_eq!(db.pending_releases(), 0);
}

#[test]
fn test_clear_queues_realized_textures() {
    let mut db = TextureDatabase::new();
    let mut backend = RecordingRenderer::new();
    for _ in 0..3 {
        let id = db.insert(());
        db.ensure_loaded(id, &mut backend, |_| Ok(PixelBuffer::new(vec![0; 4], PixelSize::new(1, 1)).unwrap()))
            .unwrap();
    }
    db.insert(());

    db.clear();
    assert!(db.is_empty());
    assert_eq!(db.pending_releases(), 3);
    assert_eq!(db.release_pending(&mut backend), 3);
    assert_eq!(backend.live_textures(), 0);
}

#[test]
fn test_backend_rejects_mismatched_upload() {
    let mut backend = RecordingRenderer::new();
    assert!(backend.generate_texture(&[0; 3], PixelSize::new(1, 1)).is_none());
    assert!(backend.generate_texture(&[0; 4], PixelSize::new(1, 1)).is_some());
    assert_eq!(backend.live_textures(), 1);
}
