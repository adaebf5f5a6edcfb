//! What to analyze: a merge commit plus optional parents and bases.

use evilmerge_core::{CommitId, EvilMergeError, VersionControl};
use tracing::debug;

/// A merge to analyze, as given on the command line or a batch input line.
///
/// Parents are only used when both are given; otherwise they are looked up.
/// Bases are looked up when none are given.
///
/// # Examples
///
/// ```
/// use evilmerge_detect::MergeSpec;
///
/// let spec = MergeSpec::from_args(&["M", "A", "B", "--", "Y"]).unwrap();
/// assert_eq!(spec.merge.as_str(), "M");
/// assert_eq!(spec.bases.len(), 1);
///
/// assert!(MergeSpec::from_args::<&str>(&[]).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpec {
    /// The merge commit.
    pub merge: CommitId,
    /// Its first and second parent, if known.
    pub parents: Option<(CommitId, CommitId)>,
    /// Merge bases of the parents, if known.
    pub bases: Vec<CommitId>,
}

impl MergeSpec {
    /// A merge whose parents and bases are looked up.
    pub fn new(merge: impl Into<CommitId>) -> Self {
        Self {
            merge: merge.into(),
            parents: None,
            bases: Vec::new(),
        }
    }

    /// Parse `<merge> [<parent1> <parent2> [--] [<mergebase>...]]`.
    ///
    /// Returns `None` when `<merge>` is missing. A lone first parent is
    /// ignored.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Option<Self> {
        let mut args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        if args.len() > 3 && args[3] == "--" {
            args.remove(3);
        }
        let (&merge, rest) = args.split_first()?;
        let parents = match rest {
            [first, second, ..] => Some((CommitId::from(*first), CommitId::from(*second))),
            _ => None,
        };
        let bases = rest.iter().skip(2).map(|b| CommitId::from(*b)).collect();
        Some(Self {
            merge: CommitId::from(merge),
            parents,
            bases,
        })
    }

    /// Fill in parents and merge bases from `vcs` where not given.
    ///
    /// # Errors
    ///
    /// [`EvilMergeError::NotAMergeCommit`] if parents have to be looked up and
    /// the commit is not a two-parent merge; any query failure otherwise.
    pub fn resolve<V: VersionControl + ?Sized>(
        &self,
        vcs: &V,
    ) -> Result<ResolvedMerge, EvilMergeError> {
        let (first, second) = match &self.parents {
            Some(parents) => parents.clone(),
            None => vcs.resolve_parents(&self.merge)?,
        };
        let bases_given = !self.bases.is_empty();
        let bases = if bases_given {
            self.bases.clone()
        } else {
            vcs.merge_bases(&first, &second)?
        };
        debug!(
            merge = %self.merge,
            %first,
            %second,
            bases = bases.len(),
            bases_given,
            "resolved merge"
        );
        Ok(ResolvedMerge {
            merge: self.merge.clone(),
            first,
            second,
            bases,
            bases_given,
        })
    }
}

/// A merge with both parents and its bases known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMerge {
    /// The merge commit.
    pub merge: CommitId,
    /// First parent (`^1`).
    pub first: CommitId,
    /// Second parent (`^2`).
    pub second: CommitId,
    /// Merge bases, possibly empty.
    pub bases: Vec<CommitId>,
    /// Whether the bases were supplied rather than looked up.
    pub bases_given: bool,
}
