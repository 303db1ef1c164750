//! Build-context preparation for stevedore.
//!
//! # Build pipeline
//!
//! ```text
//! stevedore build
//!   1. Deps layer ── mirror Gemfile / Gemfile.lock / *.gemspec → build/depslayer/
//!   2. Image      ── docker build -t <repo>:<tag> .
//! ```
//!
//! # Deps layer
//!
//! The Dockerfile copies `build/depslayer/` and installs dependencies
//! before copying the rest of the source tree. Only manifests whose bytes
//! changed are rewritten, so an unchanged dependency set keeps the
//! install layer cached.
//!
//! Mirrored copies are never pruned: a deleted or renamed manifest leaves
//! its old copy behind.

pub mod depslayer;
pub mod manifest;

pub use depslayer::{DepsLayer, MirrorUpdate, SyncError, SyncReport, UpdateReason};
pub use manifest::ManifestPatterns;
