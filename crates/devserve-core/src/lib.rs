//! Core constants shared across all devserve crates

mod constants;

pub use constants::*;
