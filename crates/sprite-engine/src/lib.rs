//! Sprite state, pixel-exact collision, stamping and stage text on top of
//! `sprite-geom`.

pub mod animation;
pub mod background;
pub mod buffer;
pub mod collision;
pub mod compositing;
pub mod config;
pub mod costume;
pub mod error;
pub mod motion;
pub mod recorder;
pub mod sprite;
pub mod store;
pub mod text;
pub mod traits;
pub mod transformable;
pub mod view;

pub use animation::{Animation, AnimationClock, AnimationStep};
pub use background::{Background, BackgroundLayer};
pub use buffer::{ColorBuffer, Rgba};
pub use collision::{intersect_pixels, touching, touching_pairs, touching_point};
pub use compositing::{StampCropping, StampMethod, stamp};
pub use config::{StageConfig, StageContext};
pub use costume::{Costume, CostumeId, Frame, HorizontalAlign, VerticalAlign};
pub use error::{EngineError, Result};
pub use motion::{Motion, MotionEvent};
pub use recorder::{CommandRecorder, DrawCommand};
pub use sprite::{EdgeContacts, Sprite};
pub use store::CostumeStore;
pub use text::Text;
pub use traits::draw::{DrawContext, DrawSink, Drawable, draw_in_layer_order, render_frame};
pub use traits::text::{FixedWidthMeasure, TextMeasure};
pub use traits::time::{DeltaTimer, MockTimeProvider, SystemTimeProvider, TimeProvider};
pub use transformable::Transformable;
pub use view::SpriteView;
