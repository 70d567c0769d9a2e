//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (session roots, input images, options files)
//! - Custom assertions over state sequences
//! - Gated collaborators that hold an attempt inside a blocking step

pub mod assertions;
pub mod fixtures;
pub mod gates;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use gates::*;
