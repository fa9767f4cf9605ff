//! Utils Module - Helper Functions & Shared Utilities

pub mod address;
pub mod cache;
pub mod constants;
pub mod progress;

pub use address::*;
pub use cache::*;
pub use constants::*;
pub use progress::*;
