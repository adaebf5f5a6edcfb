use crate::error::EvilMergeError;
use crate::snapshot::TreeSnapshot;
use crate::types::CommitId;

/// The repository queries the detectors depend on.
///
/// Implemented by `evilmerge_gitpulse::GitRepository` for real repositories;
/// tests supply in-memory fixtures. Legitimately empty answers (no merge
/// base, no differences) are `Ok`, never errors.
pub trait VersionControl {
    /// The two parents of `commit`.
    ///
    /// # Errors
    ///
    /// [`EvilMergeError::NotAMergeCommit`] if the commit does not have exactly
    /// two parents, [`EvilMergeError::Git`] if it cannot be resolved.
    fn resolve_parents(&self, commit: &CommitId) -> Result<(CommitId, CommitId), EvilMergeError>;

    /// All best common ancestors of `a` and `b`; empty for unrelated histories.
    fn merge_bases(&self, a: &CommitId, b: &CommitId) -> Result<Vec<CommitId>, EvilMergeError>;

    /// Recursive path → content-hash listing of `commit`.
    fn tree_snapshot(&self, commit: &CommitId) -> Result<TreeSnapshot, EvilMergeError>;

    /// Unified diff text from `from` to `to`; empty when they are identical.
    fn unified_diff(&self, from: &CommitId, to: &CommitId) -> Result<String, EvilMergeError>;
}
