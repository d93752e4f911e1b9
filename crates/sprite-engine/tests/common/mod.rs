#![allow(dead_code)]

use sprite_engine::{ColorBuffer, Costume, CostumeId, CostumeStore, Rgba, Sprite};
use sprite_geom::Vec2;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Register a solid `w` x `h` still costume and return a sprite wearing it at `position`.
pub fn solid_sprite(
    store: &mut CostumeStore,
    name: &str,
    w: usize,
    h: usize,
    color: Rgba,
    position: Vec2,
) -> (Sprite, CostumeId) {
    let id = store
        .insert(Costume::still(name, ColorBuffer::filled(w, h, color)))
        .expect("unique costume name");
    let mut sprite = Sprite::with_costume(id);
    sprite.go_to(position);
    (sprite, id)
}

pub fn current_buffer(store: &CostumeStore, id: CostumeId) -> &ColorBuffer {
    store.get(id).expect("costume exists").current_frame().buffer()
}
