use std::fmt::{self, Write as _};

use evilmerge_core::{CommitId, Suspect};
use evilmerge_difflens::interdiff::Interdiff;
use serde::Serialize;

/// Findings of the file-level detector for one merge.
///
/// # Examples
///
/// ```
/// use evilmerge_core::{CommitId, Suspect, SuspectReason};
/// use evilmerge_detect::TreeReport;
///
/// let report = TreeReport {
///     merge: CommitId::from("M"),
///     first: CommitId::from("A"),
///     second: CommitId::from("B"),
///     bases: vec![CommitId::from("Y")],
///     suspects: vec![Suspect::new("x.txt", SuspectReason::TookSide1DroppedSide2)],
/// };
/// assert_eq!(
///     report.to_string(),
///     "commit M\nsuspicious merge in files:\n\tx.txt\tmodified in both, took ^1\n\n"
/// );
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeReport {
    /// The analyzed merge.
    pub merge: CommitId,
    /// First parent.
    pub first: CommitId,
    /// Second parent.
    pub second: CommitId,
    /// Merge bases used.
    pub bases: Vec<CommitId>,
    /// Suspicious files, sorted by path.
    pub suspects: Vec<Suspect>,
}

impl TreeReport {
    /// Whether nothing suspicious was found.
    pub fn is_clean(&self) -> bool {
        self.suspects.is_empty()
    }

    /// Render as GitHub-flavored Markdown. Clean merges render as nothing.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if self.is_clean() {
            return out;
        }
        let _ = writeln!(out, "## Merge `{}`\n", self.merge);
        let _ = writeln!(out, "| File | Reason |");
        let _ = writeln!(out, "|------|--------|");
        for suspect in &self.suspects {
            let _ = writeln!(out, "| `{}` | {} |", suspect.path, suspect.reason);
        }
        out.push('\n');
        out
    }
}

impl fmt::Display for TreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return Ok(());
        }
        writeln!(f, "commit {}", self.merge)?;
        writeln!(f, "suspicious merge in files:")?;
        for suspect in &self.suspects {
            writeln!(f, "\t{}\t{}", suspect.path, suspect.reason)?;
        }
        writeln!(f)
    }
}

/// A file whose interdiff shows lines the two sides disagree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousFile {
    /// File path.
    pub path: String,
    /// The doubly-signed lines that triggered the finding.
    pub flagged_lines: Vec<String>,
    /// Full interdiff text for inspection.
    pub interdiff: String,
}

impl From<Interdiff> for SuspiciousFile {
    fn from(idiff: Interdiff) -> Self {
        let flagged_lines = idiff
            .suspicious_lines()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            path: idiff.path,
            flagged_lines,
            interdiff: idiff.text,
        }
    }
}

/// Findings of the hunk-level detector for one merge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkReport {
    /// The analyzed merge.
    pub merge: CommitId,
    /// First parent.
    pub first: CommitId,
    /// Second parent.
    pub second: CommitId,
    /// Merge bases known for the parents.
    pub bases: Vec<CommitId>,
    /// Files where the merge on top of the first parent mishandled the
    /// second side's hunks.
    pub from_first: Vec<SuspiciousFile>,
    /// Files where the merge on top of the second parent mishandled the
    /// first side's hunks.
    pub from_second: Vec<SuspiciousFile>,
}

impl HunkReport {
    /// Whether nothing suspicious was found.
    pub fn is_clean(&self) -> bool {
        self.from_first.is_empty() && self.from_second.is_empty()
    }

    /// Plain-text report with commit ids shortened to `abbrev` characters.
    /// Clean merges render as nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use evilmerge_core::CommitId;
    /// use evilmerge_detect::{HunkReport, SuspiciousFile};
    ///
    /// let report = HunkReport {
    ///     merge: CommitId::from("mmmmmmmmmm"),
    ///     first: CommitId::from("aaaaaaaaaa"),
    ///     second: CommitId::from("bbbbbbbbbb"),
    ///     bases: vec![CommitId::from("yyyyyyyyyy")],
    ///     from_first: vec![SuspiciousFile {
    ///         path: "x.txt".into(),
    ///         flagged_lines: vec!["--x".into()],
    ///         interdiff: "--- x.txt\n+++ x.txt\n@@ -1 +1 @@\n--x\n".into(),
    ///     }],
    ///     from_second: vec![],
    /// };
    /// let text = report.render_text(7);
    /// assert!(text.starts_with("commit mmmmmmmmmm\nparents aaaaaaa bbbbbbb\n"));
    /// assert!(text.contains("suspicious hunks from aaaaaaa..mmmmmmm\n    x.txt\n        --- x.txt\n"));
    /// ```
    pub fn render_text(&self, abbrev: usize) -> String {
        let mut out = String::new();
        if self.is_clean() {
            return out;
        }
        let bases: Vec<&str> = self.bases.iter().map(|y| y.abbrev(abbrev)).collect();
        let _ = writeln!(out, "commit {}", self.merge);
        let _ = writeln!(
            out,
            "parents {} {}",
            self.first.abbrev(abbrev),
            self.second.abbrev(abbrev)
        );
        let _ = writeln!(out, "merge bases {}", bases.join(" "));
        for (parent, files) in self.directions() {
            if files.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "suspicious hunks from {}..{}",
                parent.abbrev(abbrev),
                self.merge.abbrev(abbrev)
            );
            for file in files {
                let _ = writeln!(out, "    {}", file.path);
                for line in file.interdiff.lines() {
                    let _ = writeln!(out, "        {line}");
                }
            }
        }
        out.push('\n');
        out
    }

    /// Render as GitHub-flavored Markdown. Clean merges render as nothing.
    pub fn to_markdown(&self, abbrev: usize) -> String {
        let mut out = String::new();
        if self.is_clean() {
            return out;
        }
        let bases: Vec<String> = self
            .bases
            .iter()
            .map(|y| format!("`{}`", y.abbrev(abbrev)))
            .collect();
        let _ = writeln!(out, "## Merge `{}`\n", self.merge);
        let _ = writeln!(
            out,
            "Parents `{}` `{}`, merge bases {}\n",
            self.first.abbrev(abbrev),
            self.second.abbrev(abbrev),
            if bases.is_empty() {
                "none".to_string()
            } else {
                bases.join(" ")
            }
        );
        for (parent, files) in self.directions() {
            if files.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "### Suspicious hunks from `{}..{}`\n",
                parent.abbrev(abbrev),
                self.merge.abbrev(abbrev)
            );
            for file in files {
                let _ = writeln!(out, "#### `{}`\n", file.path);
                let _ = writeln!(out, "```diff\n{}```\n", file.interdiff);
            }
        }
        out
    }

    fn directions(&self) -> [(&CommitId, &[SuspiciousFile]); 2] {
        [
            (&self.first, self.from_first.as_slice()),
            (&self.second, self.from_second.as_slice()),
        ]
    }
}
