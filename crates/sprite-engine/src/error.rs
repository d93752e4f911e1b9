use thiserror::Error;

use crate::compositing::{StampCropping, StampMethod};
use crate::costume::CostumeId;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("color buffer of {width}x{height} needs {} samples, got {len}", .width * .height)]
    BufferSize {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("cannot split a {width}x{height} sheet into {columns} columns and {rows} rows")]
    UnevenSheet {
        width: usize,
        height: usize,
        columns: usize,
        rows: usize,
    },

    #[error("stamping does not support method {method:?} with cropping {cropping:?}")]
    UnsupportedStamp {
        method: StampMethod,
        cropping: StampCropping,
    },

    #[error("{role} has no color buffer")]
    MissingBuffer { role: &'static str },

    #[error("placement cannot be inverted (zero scale?)")]
    DegenerateTransform,

    #[error("frame {number} is out of range (costume has {count} frames)")]
    FrameOutOfRange { number: usize, count: usize },

    #[error("costume {number} is out of range (sprite has {count} costumes)")]
    CostumeOutOfRange { number: usize, count: usize },

    #[error("background layer {number} is out of range ({count} layers)")]
    LayerOutOfRange { number: usize, count: usize },

    #[error("unknown costume: {0:?}")]
    UnknownCostume(CostumeId),

    #[error("a costume named {0:?} is already registered")]
    DuplicateCostume(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
