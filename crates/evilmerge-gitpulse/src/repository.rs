//! [`VersionControl`] over a git2 repository.

use std::path::Path;

use evilmerge_core::{CommitId, EvilMergeError, TreeSnapshot, VersionControl};
use git2::{
    Commit, DiffFindOptions, DiffFormat, DiffOptions, ErrorCode, ObjectType, Repository,
    TreeWalkMode, TreeWalkResult,
};
use tracing::debug;

/// A git repository answering the detectors' queries.
///
/// Commit ids may be any revision expression `git rev-parse` understands.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use evilmerge_core::{CommitId, VersionControl};
/// use evilmerge_gitpulse::GitRepository;
///
/// let repo = GitRepository::discover(Path::new(".")).unwrap();
/// let (first, second) = repo.resolve_parents(&CommitId::from("HEAD")).unwrap();
/// println!("{} {}", first.abbrev(7), second.abbrev(7));
/// ```
pub struct GitRepository {
    repo: Repository,
    detect_renames: bool,
}

impl GitRepository {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EvilMergeError::Git`] if no repository is found.
    pub fn discover(path: &Path) -> Result<Self, EvilMergeError> {
        let repo = Repository::discover(path)
            .map_err(|e| EvilMergeError::Git(format!("failed to open repository: {e}")))?;
        Ok(Self::from_repository(repo))
    }

    /// Wrap an already opened repository. Rename detection is enabled.
    pub fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            detect_renames: true,
        }
    }

    /// Toggle rename detection for [`VersionControl::unified_diff`].
    pub fn with_rename_detection(mut self, enabled: bool) -> Self {
        self.detect_renames = enabled;
        self
    }

    fn find_commit(&self, id: &CommitId) -> Result<Commit<'_>, EvilMergeError> {
        self.repo
            .revparse_single(id.as_str())
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| EvilMergeError::Git(format!("failed to resolve commit '{id}': {e}")))
    }
}

impl VersionControl for GitRepository {
    fn resolve_parents(&self, commit: &CommitId) -> Result<(CommitId, CommitId), EvilMergeError> {
        let found = self.find_commit(commit)?;
        if found.parent_count() != 2 {
            return Err(EvilMergeError::NotAMergeCommit(commit.to_string()));
        }
        let parent = |i: usize| {
            found
                .parent_id(i)
                .map(|oid| CommitId::new(oid.to_string()))
                .map_err(|e| EvilMergeError::Git(format!("failed to get parent: {e}")))
        };
        Ok((parent(0)?, parent(1)?))
    }

    fn merge_bases(&self, a: &CommitId, b: &CommitId) -> Result<Vec<CommitId>, EvilMergeError> {
        let one = self.find_commit(a)?.id();
        let two = self.find_commit(b)?.id();
        match self.repo.merge_bases(one, two) {
            Ok(bases) => Ok(bases
                .iter()
                .map(|oid| CommitId::new(oid.to_string()))
                .collect()),
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(%a, %b, "no merge base");
                Ok(Vec::new())
            }
            Err(e) => Err(EvilMergeError::Git(format!(
                "failed to compute merge bases of {a} and {b}: {e}"
            ))),
        }
    }

    fn tree_snapshot(&self, commit: &CommitId) -> Result<TreeSnapshot, EvilMergeError> {
        let tree = self
            .find_commit(commit)?
            .tree()
            .map_err(|e| EvilMergeError::Git(format!("failed to get commit tree: {e}")))?;

        let mut entries = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            // Subtrees are descended into; blobs and submodule links are content.
            if entry.kind() != Some(ObjectType::Tree) {
                let name = String::from_utf8_lossy(entry.name_bytes());
                entries.push((format!("{root}{name}"), entry.id().to_string()));
            }
            TreeWalkResult::Ok
        })
        .map_err(|e| EvilMergeError::Git(format!("failed to walk tree: {e}")))?;

        debug!(%commit, files = entries.len(), "tree snapshot");
        Ok(entries.into_iter().collect())
    }

    fn unified_diff(&self, from: &CommitId, to: &CommitId) -> Result<String, EvilMergeError> {
        let old_tree = self
            .find_commit(from)?
            .tree()
            .map_err(|e| EvilMergeError::Git(format!("failed to get commit tree: {e}")))?;
        let new_tree = self
            .find_commit(to)?
            .tree()
            .map_err(|e| EvilMergeError::Git(format!("failed to get commit tree: {e}")))?;

        let mut diff_opts = DiffOptions::new();
        let mut diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))
            .map_err(|e| EvilMergeError::Git(format!("failed to compute diff: {e}")))?;

        if self.detect_renames {
            let mut find_opts = DiffFindOptions::new();
            find_opts.renames(true);
            diff.find_similar(Some(&mut find_opts))
                .map_err(|e| EvilMergeError::Git(format!("failed to find renames: {e}")))?;
        }

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(|e| EvilMergeError::Git(format!("failed to render diff: {e}")))?;

        debug!(%from, %to, bytes = text.len(), "unified diff");
        Ok(text)
    }
}
