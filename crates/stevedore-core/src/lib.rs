//! Core types and configuration for stevedore.
//!
//! This crate defines the `stevedore.toml` schema ([`StevedoreConfig`]),
//! the process-wide [`Settings`] resolved from the environment, the
//! [`ImageRef`] naming scheme, and shared error types.

pub mod config;
pub mod error;
pub mod image;
pub mod settings;

pub use config::{DeployConfig, DepsConfig, ImageConfig, StevedoreConfig};
pub use error::{Error, Result};
pub use image::{DIRTY_SUFFIX, ImageRef};
pub use settings::{MachineSpec, Settings};
