use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An opaque commit identifier as understood by the version-control system.
///
/// Any revision expression the backend accepts is valid (`HEAD~2`, a branch
/// name, a full or abbreviated hash). No structure is interpreted beyond
/// [`CommitId::abbrev`] for display.
///
/// # Examples
///
/// ```
/// use evilmerge_core::CommitId;
///
/// let id = CommitId::from("3f2a9c1d0e8b7a6f5e4d3c2b1a09f8e7d6c5b4a3");
/// assert_eq!(id.abbrev(7), "3f2a9c1");
/// assert_eq!(CommitId::from("HEAD").abbrev(7), "HEAD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Create an id from any revision expression.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// At most the first `len` characters of the id.
    pub fn abbrev(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a file was flagged by the file-level detector.
///
/// "Side 1" is the first parent (`^1`), "side 2" the second (`^2`).
///
/// # Examples
///
/// ```
/// use evilmerge_core::SuspectReason;
///
/// let reason = SuspectReason::TookSide1DroppedSide2;
/// assert_eq!(reason.to_string(), "modified in both, took ^1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuspectReason {
    /// Both sides modified the file; the merge is the first parent's version.
    TookSide1DroppedSide2,
    /// Both sides modified the file; the merge is the second parent's version.
    TookSide2DroppedSide1,
    /// Only the first parent modified the file; the merge kept the second's.
    ModifiedSide1TookSide2,
    /// Only the second parent modified the file; the merge kept the first's.
    ModifiedSide2TookSide1,
}

impl fmt::Display for SuspectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspectReason::TookSide1DroppedSide2 => write!(f, "modified in both, took ^1"),
            SuspectReason::TookSide2DroppedSide1 => write!(f, "modified in both, took ^2"),
            SuspectReason::ModifiedSide1TookSide2 => write!(f, "modified in ^1, took ^2"),
            SuspectReason::ModifiedSide2TookSide1 => write!(f, "modified in ^2, took ^1"),
        }
    }
}

/// A file whose merge result looks like one side was silently discarded.
///
/// Ordering is by path first, which is how reports are sorted.
///
/// # Examples
///
/// ```
/// use evilmerge_core::{Suspect, SuspectReason};
///
/// let suspect = Suspect::new("src/auth.rs", SuspectReason::ModifiedSide1TookSide2);
/// assert_eq!(suspect.path, "src/auth.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suspect {
    /// Path relative to the repository root.
    pub path: String,
    /// Which case of the detector fired.
    pub reason: SuspectReason,
}

impl Suspect {
    /// Create a suspect for `path`.
    pub fn new(path: impl Into<String>, reason: SuspectReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// Output format for CLI reports.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use evilmerge_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
