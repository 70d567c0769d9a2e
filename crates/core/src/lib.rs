//! # sk-core
//!
//! Stitch pipeline orchestration for stitch-kit.
//!
//! This crate provides:
//! - An observable processing state store
//! - Cancellable stitch attempts driven against a native engine
//! - Input opening, output staging and gallery export
//! - Configuration loading from the `.stitch-kit/` directory
//!
//! ## Modules
//!
//! - [`session`]: Host-facing session that owns the selection and attempts
//! - [`pipeline`]: The attempt orchestrator
//! - [`state`]: Processing state store
//! - [`engine`]: Native engine boundary
//! - [`inputs`]: Resolving input locators to readable handles
//! - [`staging`]: Temporary output files
//! - [`export`]: Copying results into the gallery
//! - [`config`]: Configuration loading and stitch options
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod inputs;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod staging;
pub mod state;

pub use error::{StitchError, StitchResult};
pub use session::{OpOutcome, StitchSession};
