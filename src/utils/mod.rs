//! Utilities Module
//!
//! Common utilities used across the crate.

pub mod crypto;
pub mod encoding;
pub mod logging;
pub mod units;

pub use crypto::*;
pub use encoding::*;
pub use units::*;
