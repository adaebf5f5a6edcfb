//! Repository access via git2.
//!
//! Provides [`GitRepository`], the [`evilmerge_core::VersionControl`]
//! implementation used against real repositories: parent and merge-base
//! lookup, recursive tree listings, and patch-format diffs.

pub mod repository;

pub use repository::GitRepository;
