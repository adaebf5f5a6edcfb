//! Unified diff parsing and hunk-level interdiff analysis.
//!
//! Parses `git diff` output into per-file hunks, strips hunks two diffs have
//! in common, and builds diffs of diffs whose doubly-signed lines point at
//! edits a merge resolved inconsistently.

pub mod hunkset;
pub mod interdiff;
pub mod parser;
