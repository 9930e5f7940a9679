//! Spatial structures: the coarse field grid and the fine occupancy index.

pub mod fields;
pub mod occupancy;
