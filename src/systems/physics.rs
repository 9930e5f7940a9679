//! Generic per-particle physics
//!
//! Velocity integration inputs for the dispatch loop: particle/air drag
//! coupling and the per-tick velocity update (loss, advection, gravity,
//! diffusion). Moving along the resulting velocity is the resolver's job.

mod forces;

pub use forces::{accelerate, drag_air};
