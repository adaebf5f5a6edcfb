//! File-level evilness detection on tree snapshots.
//!
//! History looks like this on a high level:
//!
//! ```text
//!     M
//!    / \
//!   A   B
//!    \ /
//!     Y...
//! ```
//!
//! Two cases are suspect:
//!
//! 1. A file changed on both sides relative to every base needed a real
//!    file-level merge, so the result should differ from both parents.
//!    If it equals one of them, the other side's change was dropped.
//! 2. A file changed on only one side should come out as the changed
//!    version. If the merge kept the unchanged side's version verbatim, the
//!    change was discarded.

use evilmerge_core::{
    changed_paths, EvilMergeError, Suspect, SuspectReason, TreeSnapshot, VersionControl,
};
use tracing::debug;

use crate::merge::MergeSpec;
use crate::report::TreeReport;

/// Classify files of a merge from the snapshots of the merge, its parents
/// and its merge bases.
///
/// With no bases every file counts as changed relative to "every base", so
/// any file where the merge equals exactly one differing parent is reported
/// under case 1. The result is sorted by path.
///
/// # Examples
///
/// ```
/// use evilmerge_core::{SuspectReason, TreeSnapshot};
/// use evilmerge_detect::classify_files;
///
/// let base: TreeSnapshot = [("x.txt", "y")].into_iter().collect();
/// let first: TreeSnapshot = [("x.txt", "a")].into_iter().collect();
/// let second: TreeSnapshot = [("x.txt", "b")].into_iter().collect();
/// let merge = first.clone();
///
/// let suspects = classify_files(&merge, &first, &second, &[base]);
/// assert_eq!(suspects.len(), 1);
/// assert_eq!(suspects[0].reason, SuspectReason::TookSide1DroppedSide2);
/// ```
pub fn classify_files(
    merge: &TreeSnapshot,
    first: &TreeSnapshot,
    second: &TreeSnapshot,
    bases: &[TreeSnapshot],
) -> Vec<Suspect> {
    let diverged =
        |side: &TreeSnapshot, path: &str| bases.iter().all(|y| side.get(path) != y.get(path));

    let mut changed = changed_paths(merge, first);
    changed.extend(changed_paths(merge, second));

    let mut suspects = Vec::new();
    for path in changed {
        let m = merge.get(path);
        let a = first.get(path);
        let b = second.get(path);

        let a_diverged = diverged(first, path);
        let b_diverged = diverged(second, path);

        // case 1
        if a_diverged && b_diverged {
            if m == a {
                suspects.push(Suspect::new(path, SuspectReason::TookSide1DroppedSide2));
            } else if m == b {
                suspects.push(Suspect::new(path, SuspectReason::TookSide2DroppedSide1));
            }
            continue;
        }

        // case 2
        if a == m && b_diverged {
            suspects.push(Suspect::new(path, SuspectReason::ModifiedSide2TookSide1));
        } else if b == m && a_diverged {
            suspects.push(Suspect::new(path, SuspectReason::ModifiedSide1TookSide2));
        }
    }

    suspects.sort();
    suspects
}

/// Run the file-level detector on a merge.
///
/// Any number of merge bases is supported, including none.
///
/// # Errors
///
/// [`EvilMergeError::NotAMergeCommit`] if parents must be looked up and the
/// commit is not a merge; [`EvilMergeError::Git`] on query failures.
pub fn analyze_tree<V: VersionControl + ?Sized>(
    vcs: &V,
    spec: &MergeSpec,
) -> Result<TreeReport, EvilMergeError> {
    let resolved = spec.resolve(vcs)?;

    let merge = vcs.tree_snapshot(&resolved.merge)?;
    let first = vcs.tree_snapshot(&resolved.first)?;
    let second = vcs.tree_snapshot(&resolved.second)?;
    let bases = resolved
        .bases
        .iter()
        .map(|y| vcs.tree_snapshot(y))
        .collect::<Result<Vec<_>, _>>()?;

    let suspects = classify_files(&merge, &first, &second, &bases);
    debug!(merge = %resolved.merge, suspects = suspects.len(), "tree analysis done");

    Ok(TreeReport {
        merge: resolved.merge,
        first: resolved.first,
        second: resolved.second,
        bases: resolved.bases,
        suspects,
    })
}
