//! Evil merge detection.
//!
//! Two detectors look at a merge commit, its parents and their merge bases:
//! - [`tree`] compares content hashes per file and flags files where the
//!   merge result is one side's version although the other side changed it.
//! - [`hunks`] diffs each side's changes against what the merge did to the
//!   other side and flags lines the two change sets disagree on.
//!
//! [`merge::MergeSpec`] describes what to analyze; [`report`] renders results.

pub mod hunks;
pub mod merge;
pub mod report;
pub mod tree;

pub use hunks::analyze_hunks;
pub use merge::{MergeSpec, ResolvedMerge};
pub use report::{HunkReport, SuspiciousFile, TreeReport};
pub use tree::{analyze_tree, classify_files};
