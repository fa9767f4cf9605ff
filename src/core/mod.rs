//! Core Module - Discovery Engine
//!
//! Structural matchers, the resilient call executor and the scanner that
//! drives them.

pub mod patterns;
pub mod retry;
pub mod scanner;

pub use patterns::*;
pub use retry::*;
pub use scanner::*;
