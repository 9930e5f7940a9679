//! Domain: element descriptors, content registry and the wall catalog.

pub mod elements;
pub mod content;
pub mod walls;
