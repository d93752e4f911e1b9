mod common;

use common::{current_buffer, init_logging, solid_sprite};
use sprite_engine::{
    AnimationClock, ColorBuffer, Costume, CostumeStore, EngineError, MotionEvent, Rgba,
    StageContext, StampCropping, StampMethod,
};
use sprite_geom::{Vec2, Viewport};

#[test]
fn test_overlapping_sprites_touch() {
    init_logging();
    let mut store = CostumeStore::new();
    let (a, _) = solid_sprite(&mut store, "a", 10, 10, Rgba::WHITE, Vec2::ZERO);
    let (mut b, _) = solid_sprite(&mut store, "b", 10, 10, Rgba::WHITE, Vec2::new(1.0, 1.0));
    assert!(a.is_touching(&b, &store));
    assert!(b.is_touching(&a, &store));

    b.go_to(Vec2::new(50.0, 50.0));
    assert!(!a.is_touching(&b, &store));
    assert!(!b.is_touching(&a, &store));
}

#[test]
fn test_hidden_sprite_does_not_touch() {
    let mut store = CostumeStore::new();
    let (a, _) = solid_sprite(&mut store, "a", 10, 10, Rgba::WHITE, Vec2::ZERO);
    let (mut b, _) = solid_sprite(&mut store, "b", 10, 10, Rgba::WHITE, Vec2::ZERO);
    b.hide();
    assert!(!a.is_touching(&b, &store));
    b.show();
    assert!(a.is_touching(&b, &store));
}

#[test]
fn test_rotated_sprites_touch_symmetrically() {
    let mut store = CostumeStore::new();
    let (mut a, _) = solid_sprite(&mut store, "a", 12, 4, Rgba::WHITE, Vec2::ZERO);
    let (mut b, _) = solid_sprite(&mut store, "b", 12, 4, Rgba::WHITE, Vec2::new(0.0, 5.0));
    assert!(!a.is_touching(&b, &store));

    a.set_rotation(90.0);
    b.set_rotation(90.0);
    assert!(a.is_touching(&b, &store));
    assert!(b.is_touching(&a, &store));
}

#[test]
fn test_normal_stamp_scenario() {
    init_logging();
    let mut store = CostumeStore::new();
    let (subject, subject_id) =
        solid_sprite(&mut store, "canvas", 8, 8, Rgba::TRANSPARENT, Vec2::new(-20.0, 30.0));
    let (donor, donor_id) = solid_sprite(&mut store, "brush", 4, 4, Rgba::RED, Vec2::new(-20.0, 30.0));

    subject
        .stamp(&mut store, &donor, StampMethod::Normal, StampCropping::CropToSubject)
        .unwrap();

    let out = current_buffer(&store, subject_id);
    assert_eq!((out.width(), out.height()), (8, 8));
    for y in 0..8 {
        for x in 0..8 {
            let inside = (2..=5).contains(&x) && (2..=5).contains(&y);
            let expected = if inside { Rgba::RED } else { Rgba::TRANSPARENT };
            assert_eq!(out.get(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
    // The donor is never modified.
    assert_eq!(current_buffer(&store, donor_id).opaque_count(), 16);
}

#[test]
fn test_normal_stamp_with_rotated_sprite() {
    let mut store = CostumeStore::new();
    let (subject, subject_id) =
        solid_sprite(&mut store, "canvas", 8, 8, Rgba::TRANSPARENT, Vec2::new(-20.0, 30.0));
    let (mut donor, _) = solid_sprite(&mut store, "bar", 4, 2, Rgba::RED, Vec2::new(-20.0, 30.0));
    donor.set_rotation(90.0);

    subject
        .stamp(&mut store, &donor, StampMethod::Normal, StampCropping::CropToSubject)
        .unwrap();

    let out = current_buffer(&store, subject_id);
    for y in 0..8 {
        for x in 0..8 {
            let inside = (3..=4).contains(&x) && (2..=5).contains(&y);
            let expected = if inside { Rgba::RED } else { Rgba::TRANSPARENT };
            assert_eq!(out.get(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_stamp_is_visible_to_collision() {
    let mut store = CostumeStore::new();
    let (subject, _) = solid_sprite(&mut store, "canvas", 8, 8, Rgba::TRANSPARENT, Vec2::ZERO);
    let (donor, _) = solid_sprite(&mut store, "brush", 4, 4, Rgba::RED, Vec2::ZERO);
    let (dot, _) = solid_sprite(&mut store, "dot", 2, 2, Rgba::WHITE, Vec2::ZERO);

    assert!(!subject.is_touching(&dot, &store));
    subject
        .stamp(&mut store, &donor, StampMethod::Normal, StampCropping::CropToSubject)
        .unwrap();
    assert!(subject.is_touching(&dot, &store));
}

fn cutout_scenario(method: StampMethod) -> ColorBuffer {
    let mut store = CostumeStore::new();
    let (subject, subject_id) = solid_sprite(&mut store, "subject", 4, 4, Rgba::WHITE, Vec2::ZERO);
    // A 2x2 donor centred on the subject's top-left quadrant.
    let (donor, _) = solid_sprite(&mut store, "donor", 2, 2, Rgba::WHITE, Vec2::new(-1.0, 1.0));
    subject
        .stamp(&mut store, &donor, method, StampCropping::CropToSubject)
        .unwrap();
    current_buffer(&store, subject_id).clone()
}

fn in_top_left_quadrant(x: usize, y: usize) -> bool {
    x < 2 && y < 2
}

#[test]
fn test_cutout_clears_covered_quadrant() {
    let out = cutout_scenario(StampMethod::Cutout);
    for y in 0..4 {
        for x in 0..4 {
            let alpha = out.get(x, y).unwrap().a;
            if in_top_left_quadrant(x, y) {
                assert_eq!(alpha, 0, "pixel ({x}, {y}) should be cleared");
            } else {
                assert_eq!(alpha, 255, "pixel ({x}, {y}) should be kept");
            }
        }
    }
}

#[test]
fn test_cutout_inverted_keeps_only_covered_quadrant() {
    let out = cutout_scenario(StampMethod::CutoutInverted);
    for y in 0..4 {
        for x in 0..4 {
            let alpha = out.get(x, y).unwrap().a;
            if in_top_left_quadrant(x, y) {
                assert_eq!(alpha, 255, "pixel ({x}, {y}) should be kept");
            } else {
                assert_eq!(alpha, 0, "pixel ({x}, {y}) should be cleared");
            }
        }
    }
}

#[test]
fn test_cutout_then_inverted_does_not_restore() {
    let mut store = CostumeStore::new();
    let (subject, subject_id) = solid_sprite(&mut store, "subject", 4, 4, Rgba::WHITE, Vec2::ZERO);
    let original = current_buffer(&store, subject_id).clone();
    let (donor, _) = solid_sprite(&mut store, "donor", 2, 2, Rgba::WHITE, Vec2::new(-1.0, 1.0));

    subject
        .stamp(&mut store, &donor, StampMethod::Cutout, StampCropping::CropToSubject)
        .unwrap();
    subject
        .stamp(&mut store, &donor, StampMethod::CutoutInverted, StampCropping::CropToSubject)
        .unwrap();
    let out = current_buffer(&store, subject_id);
    assert_ne!(out, &original);
    assert_eq!(out.opaque_count(), 0);
}

#[test]
fn test_grow_subject_leaves_buffer_alone() {
    let mut store = CostumeStore::new();
    let (subject, subject_id) = solid_sprite(&mut store, "subject", 4, 4, Rgba::WHITE, Vec2::ZERO);
    let (donor, _) = solid_sprite(&mut store, "donor", 2, 2, Rgba::WHITE, Vec2::ZERO);
    let err = subject
        .stamp(&mut store, &donor, StampMethod::Normal, StampCropping::GrowSubject)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedStamp { .. }));
    assert_eq!(current_buffer(&store, subject_id).opaque_count(), 16);
}

#[test]
fn test_animation_wrap_scenario() {
    let mut clock = AnimationClock::new(vec![0.1, 0.1, 0.1]);
    assert_eq!(clock.advance(0.35), 1);
    assert!((clock.elapsed() - 0.05).abs() < 1e-4);
}

#[test]
fn test_sheet_costume_animates_through_store() {
    let mut store = CostumeStore::new();
    let sheet = ColorBuffer::filled(6, 2, Rgba::WHITE);
    let id = store
        .insert(Costume::from_sheet("walk", &sheet, 3, 1, 0.1).unwrap())
        .unwrap();
    store.advance_all(0.25);
    assert_eq!(store.get(id).unwrap().current_frame_number(), 3);
    assert!(matches!(
        Costume::from_sheet("bad", &sheet, 4, 1, 0.1),
        Err(EngineError::UnevenSheet { .. })
    ));
}

#[test]
fn test_copied_costume_is_independent_after_stamp() {
    let mut store = CostumeStore::new();
    let (mut subject, original_id) =
        solid_sprite(&mut store, "subject", 4, 4, Rgba::WHITE, Vec2::ZERO);
    let copy_id = store.copy(original_id, "subject-copy").unwrap();
    subject.add_costume(copy_id);
    let (donor, _) = solid_sprite(&mut store, "donor", 8, 8, Rgba::WHITE, Vec2::ZERO);

    subject
        .stamp(&mut store, &donor, StampMethod::Cutout, StampCropping::CropToSubject)
        .unwrap();
    assert_eq!(current_buffer(&store, copy_id).opaque_count(), 0);
    assert_eq!(current_buffer(&store, original_id).opaque_count(), 16);
}

#[test]
fn test_glide_scenario() {
    let ctx = StageContext::default();
    let mut store = CostumeStore::new();
    let (mut sprite, _) = solid_sprite(&mut store, "ball", 4, 4, Rgba::WHITE, Vec2::ZERO);
    let target = Vec2::new(30.0, -60.0);
    sprite.glide_to(target, 0.5);

    let mut events = Vec::new();
    for _ in 0..10 {
        if let Some(event) = sprite.update(&ctx, 0.125) {
            events.push(event);
        }
    }
    assert_eq!(events, vec![MotionEvent::GlideComplete]);
    assert_eq!(sprite.position(), target);
}

#[test]
fn test_edge_detection_follows_viewport() {
    let mut store = CostumeStore::new();
    let (mut sprite, _) = solid_sprite(&mut store, "ball", 10, 10, Rgba::WHITE, Vec2::ZERO);
    let wide = Viewport::new(1600, 400);
    let square = Viewport::new(400, 400);

    sprite.go_to(Vec2::new(150.0, 0.0));
    // Square stage ends at x = 100, wide stage at x = 400.
    assert!(sprite.edges(&store, &square).right);
    assert!(!sprite.edges(&store, &wide).right);
    assert!(sprite.is_off_screen(&store, &square));
    assert!(!sprite.is_off_screen(&store, &wide));
}

#[test]
fn test_touching_points() {
    let mut store = CostumeStore::new();
    let (sprite, _) = solid_sprite(&mut store, "ball", 10, 10, Rgba::WHITE, Vec2::new(40.0, 0.0));
    assert!(sprite.is_touching_point(Vec2::new(40.0, 0.0), &store));
    assert!(!sprite.is_touching_point(Vec2::ZERO, &store));
    assert!(sprite.is_touching_any_point(&[Vec2::ZERO, Vec2::new(42.0, 2.0)], &store));
}
