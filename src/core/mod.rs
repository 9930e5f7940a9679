//! Core: safety macros, configuration, errors, logging, RNG and the
//! particle store.

#[macro_use]
pub mod utils {
    #[macro_use]
    pub mod safety;
}

pub mod config;
pub mod error;
pub mod logging;
pub mod random;
pub mod parts;
