//! Configuration loading and management.
//!
//! This module loads the session configuration and stitch options from the
//! `.stitch-kit/` directory and turns options into their canonical form.

pub mod error;
pub mod loader;
pub mod models;
pub mod options;
