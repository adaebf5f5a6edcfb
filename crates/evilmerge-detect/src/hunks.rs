//! Hunk-level evilness detection via interdiffs.
//!
//! For the first parent `A`, the hunks only the second side introduced
//! (`Y..B` minus what `Y..A` did identically) are compared with what the
//! merge did on top of `A` (`A..M`). An honest merge applies B's hunks to A
//! more or less verbatim, so the interdiff only shows context noise. Lines
//! signed on both levels mean B's change was altered or dropped. The second
//! parent is checked symmetrically.

use evilmerge_core::{AnalysisConfig, CommitId, EvilMergeError, VersionControl};
use evilmerge_difflens::hunkset::remove_common_hunks;
use evilmerge_difflens::interdiff::suspicious_interdiffs;
use evilmerge_difflens::parser::{parse_unified_diff, FileDiff};
use tracing::{debug, warn};

use crate::merge::{MergeSpec, ResolvedMerge};
use crate::report::{HunkReport, SuspiciousFile};

/// Run the hunk-level detector on a merge.
///
/// The interdiff is defined against a single merge base. Looked-up bases
/// must therefore be unique; if several bases are passed explicitly the
/// first one is used. Without any base the base-to-parent diffs are empty.
///
/// # Errors
///
/// [`EvilMergeError::MultipleMergeBases`] if no base was given and the
/// parents have more than one; [`EvilMergeError::NotAMergeCommit`] if
/// parents must be looked up and the commit is not a merge;
/// [`EvilMergeError::Git`] or [`EvilMergeError::Parse`] when the repository
/// queries fail.
pub fn analyze_hunks<V: VersionControl + ?Sized>(
    vcs: &V,
    spec: &MergeSpec,
    config: &AnalysisConfig,
) -> Result<HunkReport, EvilMergeError> {
    let resolved = spec.resolve(vcs)?;
    let base = effective_base(&resolved)?;

    let first_to_merge = fetch_diff(vcs, &resolved.first, &resolved.merge)?;
    let second_to_merge = fetch_diff(vcs, &resolved.second, &resolved.merge)?;
    let (base_to_first, base_to_second) = match base {
        Some(y) => (
            fetch_diff(vcs, y, &resolved.first)?,
            fetch_diff(vcs, y, &resolved.second)?,
        ),
        None => (FileDiff::default(), FileDiff::default()),
    };

    let (only_first, only_second) = remove_common_hunks(&base_to_first, &base_to_second);

    let from_first = suspicious_interdiffs(&only_second, &first_to_merge, config.context_lines)
        .into_iter()
        .map(SuspiciousFile::from)
        .collect::<Vec<_>>();
    let from_second = suspicious_interdiffs(&only_first, &second_to_merge, config.context_lines)
        .into_iter()
        .map(SuspiciousFile::from)
        .collect::<Vec<_>>();

    debug!(
        merge = %resolved.merge,
        from_first = from_first.len(),
        from_second = from_second.len(),
        "hunk analysis done"
    );

    Ok(HunkReport {
        merge: resolved.merge,
        first: resolved.first,
        second: resolved.second,
        bases: resolved.bases,
        from_first,
        from_second,
    })
}

fn effective_base(resolved: &ResolvedMerge) -> Result<Option<&CommitId>, EvilMergeError> {
    match resolved.bases.as_slice() {
        [] => {
            debug!(merge = %resolved.merge, "no merge base; comparing against empty diffs");
            Ok(None)
        }
        [only] => Ok(Some(only)),
        [first, ..] if resolved.bases_given => {
            warn!(
                merge = %resolved.merge,
                base = %first,
                ignored = resolved.bases.len() - 1,
                "hunk analysis uses a single merge base; extra bases ignored"
            );
            Ok(Some(first))
        }
        many => Err(EvilMergeError::MultipleMergeBases {
            parent1: resolved.first.to_string(),
            parent2: resolved.second.to_string(),
            count: many.len(),
        }),
    }
}

fn fetch_diff<V: VersionControl + ?Sized>(
    vcs: &V,
    from: &CommitId,
    to: &CommitId,
) -> Result<FileDiff, EvilMergeError> {
    let text = vcs.unified_diff(from, to)?;
    parse_unified_diff(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(bases: &[&str], bases_given: bool) -> ResolvedMerge {
        ResolvedMerge {
            merge: CommitId::from("M"),
            first: CommitId::from("A"),
            second: CommitId::from("B"),
            bases: bases.iter().map(|b| CommitId::from(*b)).collect(),
            bases_given,
        }
    }

    #[test]
    fn single_base_is_used() {
        let r = resolved(&["Y"], false);
        assert_eq!(effective_base(&r).unwrap(), Some(&CommitId::from("Y")));
    }

    #[test]
    fn no_base_means_empty_diffs() {
        let r = resolved(&[], false);
        assert_eq!(effective_base(&r).unwrap(), None);
    }

    #[test]
    fn several_looked_up_bases_are_refused() {
        let r = resolved(&["Y1", "Y2"], false);
        let err = effective_base(&r).unwrap_err();
        assert!(matches!(
            err,
            EvilMergeError::MultipleMergeBases { count: 2, .. }
        ));
    }

    #[test]
    fn first_of_several_given_bases_is_used() {
        let r = resolved(&["Y1", "Y2"], true);
        assert_eq!(effective_base(&r).unwrap(), Some(&CommitId::from("Y1")));
    }
}
