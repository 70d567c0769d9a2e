//! # sk-protocol
//!
//! Core protocol definitions and data models for stitch-kit.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (TOML session config and stitch options)
//! - Observable processing state of stitch attempts
//! - Communication between an embedding host and a stitch session
//!
//! ## Modules
//!
//! - [`config_models`]: Session configuration from config.toml
//! - [`options_models`]: Stitch options handed to the engine
//! - [`state_models`]: Processing state and input locators
//! - [`export_models`]: Gallery export results
//! - [`ipc`]: Operations and Events for host-session communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, and uuid
//! - TypeScript generation: All types derive `TS` for host compatibility
//! - Independent compilation: No dependencies on other stitch-kit crates

pub mod config_models;
pub mod export_models;
pub mod ipc;
pub mod options_models;
pub mod state_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use export_models::*;
pub use ipc::*;
pub use options_models::*;
pub use state_models::*;
