//! Core types, configuration, and error handling for evilmerge.
//!
//! This crate provides the shared foundation used by all other evilmerge crates:
//! - [`EvilMergeError`]: unified error type using `thiserror`
//! - [`EvilMergeConfig`]: configuration loaded from `.evilmerge.toml`
//! - [`VersionControl`]: the four repository queries the detectors need
//! - Shared types: [`CommitId`], [`TreeSnapshot`], [`Suspect`],
//!   [`SuspectReason`], [`OutputFormat`]

mod config;
mod error;
mod snapshot;
mod types;
mod vcs;

pub use config::{AnalysisConfig, EvilMergeConfig, OutputConfig};
pub use error::EvilMergeError;
pub use snapshot::{changed_paths, TreeSnapshot, ABSENT_HASH};
pub use types::{CommitId, OutputFormat, Suspect, SuspectReason};
pub use vcs::VersionControl;

/// A convenience `Result` type for evilmerge operations.
pub type Result<T> = std::result::Result<T, EvilMergeError>;
