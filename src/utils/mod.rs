//! Utility functions.
//!
//! This module provides:
//! - The bounded worker pool shared by every batch program

mod pool;

pub use pool::run_bounded;
