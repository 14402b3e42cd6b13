//! One-time deployment of bundled read-only resources.
//!
//! An application ships resource bundles (voice data, preference snapshots,
//! model files) inside a read-only package and needs them copied into its
//! private, writable data directory before first use.  This crate performs
//! that copy once, remembers that it happened, and copes with bundle formats
//! that report a directory as a leaf.
//!
//! The public API is organised into layers:
//!
//! - **[`resources`]**: read-only bundle trees and the writable data directory
//! - **[`state`]**: the persisted deployment flag
//! - **[`deploy`]**: the idempotent, best-effort deployer
//! - **[`verify`]**: digest comparison of a bundle with its deployed copy
//! - **[`config`]**: `deploy.toml` loading and validation
//! - **[`commands`]**: top-level subcommand orchestration (`deploy`, `status`, `verify`, `reset`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod error;
pub mod logging;
pub mod resources;
pub mod state;
pub mod verify;
