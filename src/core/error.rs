//! Engine error types
//!
//! Content/config loading is the only fallible surface that returns
//! `EngineError`. Particle creation has its own small error so the hot path
//! never builds strings.

use thiserror::Error;

use crate::elements::ElementId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("too many elements for u8 ids: max_id={0}")]
    TooManyElements(u16),

    #[error("duplicate element id: {0}")]
    DuplicateElement(ElementId),

    #[error("missing element id {0}")]
    MissingElement(usize),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown behavior kind: {0}")]
    UnknownBehavior(String),

    #[error("element {id} references unknown transition target {target}")]
    BadTransition { id: ElementId, target: u16 },

    #[error("elementKeyToId mismatch for key {key}: map={map} elements={elements}")]
    KeyMismatch {
        key: String,
        map: u16,
        elements: ElementId,
    },

    #[error("simulation size {width}x{height} must be a non-zero multiple of CELL={cell}")]
    BadDimensions { width: u32, height: u32, cell: u32 },
}

/// Why a `create` call produced no particle.
///
/// `NoCapacity` is the store-full sentinel; callers usually drop the spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("particle store is full")]
    NoCapacity,
    #[error("position is outside the simulation")]
    OutOfBounds,
    #[error("pixel already holds an incompatible particle")]
    Occupied,
    #[error("the wall at this position does not admit the element")]
    Walled,
    #[error("element id is not registered")]
    UnknownElement,
}
