use std::path::PathBuf;

/// Errors that can occur while analyzing merges.
///
/// Library crates use this type directly; the binary crate reports it as a
/// `miette` diagnostic.
///
/// # Examples
///
/// ```
/// use evilmerge_core::EvilMergeError;
///
/// let err = EvilMergeError::NotAMergeCommit("HEAD".into());
/// assert!(err.to_string().contains("does not appear to be a merge"));
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EvilMergeError {
    /// The commit does not have exactly two parents.
    #[error("{0} does not appear to be a merge")]
    #[diagnostic(
        code(evilmerge::not_a_merge),
        help("pass both parents explicitly, or pick a commit with exactly two parents")
    )]
    NotAMergeCommit(String),

    /// More than one merge base was found and none was given explicitly.
    #[error("{parent1} and {parent2} have {count} merge bases; pass one explicitly")]
    #[diagnostic(code(evilmerge::multiple_merge_bases))]
    MultipleMergeBases {
        /// First parent of the merge.
        parent1: String,
        /// Second parent of the merge.
        parent2: String,
        /// Number of merge bases found.
        count: usize,
    },

    /// Repository query failure.
    #[error("git error: {0}")]
    Git(String),

    /// Diff text that could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("see `evilmerge init` for a template"))]
    Config(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

impl EvilMergeError {
    /// Whether the error only means "this input does not apply".
    ///
    /// Batch mode skips the current line on recoverable errors and aborts on
    /// everything else, since those point at a broken repository or query
    /// layer rather than at the input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EvilMergeError::NotAMergeCommit(_) | EvilMergeError::MultipleMergeBases { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EvilMergeError = io_err.into();
        assert!(err.to_string().contains("gone"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn multiple_bases_names_both_parents() {
        let err = EvilMergeError::MultipleMergeBases {
            parent1: "abc".into(),
            parent2: "def".into(),
            count: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("def"));
        assert!(msg.contains('2'));
        assert!(err.is_recoverable());
    }

    #[test]
    fn git_errors_abort() {
        let err = EvilMergeError::Git("object not found".into());
        assert_eq!(err.to_string(), "git error: object not found");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = EvilMergeError::FileNotFound(PathBuf::from("/tmp/.evilmerge.toml"));
        assert!(err.to_string().contains("/tmp/.evilmerge.toml"));
    }
}
