//! State management for stitch attempts.
//!
//! This module provides:
//! - ProcessingStateStore, the session's single observable state cell

pub mod store;

pub use store::ProcessingStateStore;
