//! Diffs of diffs.
//!
//! Two hunk lists for the same file are flattened into line streams and
//! diffed against each other. Every body line of the result carries two
//! signs: the outer one from this comparison, the inner one from the
//! original hunk. A line signed on both levels (`--`, `-+`, `+-`, `++`) is
//! an edit that one change set made and the other treated differently.

use std::fmt;

use serde::Serialize;
use similar::TextDiff;

use crate::parser::{FileDiff, Hunk};

/// Separator inserted between reassembled hunks.
pub const HUNK_SEPARATOR: &str = "@@";

const SUSPICIOUS_PREFIXES: [&str; 4] = ["--", "+-", "-+", "++"];

/// The interdiff of one file.
///
/// # Examples
///
/// ```
/// use evilmerge_difflens::interdiff::Interdiff;
///
/// let idiff = Interdiff::new("x.txt", "--- x.txt\n+++ x.txt\n@@ -1 +1 @@\n--a\n+-b\n");
/// assert!(idiff.is_suspicious());
/// assert_eq!(idiff.suspicious_lines(), vec!["--a", "+-b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interdiff {
    /// File the interdiff belongs to.
    pub path: String,
    /// Full unified diff text, newline-terminated lines.
    pub text: String,
}

impl Interdiff {
    /// Wrap already rendered interdiff text.
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Lines of the interdiff without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Body lines whose two leading characters are both change signs.
    ///
    /// The `---`/`+++` preamble is skipped: scanning starts after the first
    /// line beginning with `@@ `.
    pub fn suspicious_lines(&self) -> Vec<&str> {
        self.lines()
            .skip_while(|line| !line.starts_with("@@ "))
            .skip(1)
            .filter(|line| is_suspicious_line(line))
            .collect()
    }

    /// Whether at least one line shows second-order disagreement.
    pub fn is_suspicious(&self) -> bool {
        !self.suspicious_lines().is_empty()
    }

    /// Whether the two hunk streams were identical.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Interdiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn is_suspicious_line(line: &str) -> bool {
    SUSPICIOUS_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Flatten hunks into one line stream, separated by [`HUNK_SEPARATOR`].
///
/// No separator precedes the first hunk.
///
/// # Examples
///
/// ```
/// use evilmerge_difflens::interdiff::assemble_hunks;
/// use evilmerge_difflens::parser::parse_unified_diff;
///
/// let diff = parse_unified_diff("--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n@@ -5 +5 @@\n-c\n+d\n").unwrap();
/// assert_eq!(assemble_hunks(diff.hunks("f")), vec!["-a", "+b", "@@", "-c", "+d"]);
/// ```
pub fn assemble_hunks(hunks: &[Hunk]) -> Vec<&str> {
    let mut out = Vec::new();
    for (i, hunk) in hunks.iter().enumerate() {
        if i > 0 {
            out.push(HUNK_SEPARATOR);
        }
        out.extend(hunk.lines.iter().map(|l| l.text.as_str()));
    }
    out
}

fn join_lines(lines: &[&str]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Diff the reassembled `before` hunks against the reassembled `after` hunks.
///
/// The result is labelled with `path` as both file names and uses
/// `context_lines` lines of context. Identical streams give an empty
/// interdiff.
///
/// # Examples
///
/// ```
/// use evilmerge_difflens::interdiff::generate_interdiff;
/// use evilmerge_difflens::parser::parse_unified_diff;
///
/// let before = parse_unified_diff("--- a/f\n+++ b/f\n@@ -1 +1 @@\n-x\n+b\n").unwrap();
/// let after = parse_unified_diff("--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n").unwrap();
/// let idiff = generate_interdiff("f", before.hunks("f"), after.hunks("f"), 3);
/// assert!(idiff.text.starts_with("--- f\n+++ f\n"));
/// assert!(idiff.is_suspicious());
/// ```
pub fn generate_interdiff(
    path: &str,
    before: &[Hunk],
    after: &[Hunk],
    context_lines: usize,
) -> Interdiff {
    let old = join_lines(&assemble_hunks(before));
    let new = join_lines(&assemble_hunks(after));
    let diff = TextDiff::from_lines(old.as_str(), new.as_str());
    let text = diff
        .unified_diff()
        .context_radius(context_lines)
        .header(path, path)
        .to_string();
    Interdiff::new(path, text)
}

/// Interdiffs of every file in `before` ∪ `after` that contain suspicious
/// lines, in path order.
pub fn suspicious_interdiffs(
    before: &FileDiff,
    after: &FileDiff,
    context_lines: usize,
) -> Vec<Interdiff> {
    let mut paths: Vec<&str> = before.paths().chain(after.paths()).collect();
    paths.sort_unstable();
    paths.dedup();

    paths
        .into_iter()
        .map(|path| {
            generate_interdiff(path, before.hunks(path), after.hunks(path), context_lines)
        })
        .filter(Interdiff::is_suspicious)
        .collect()
}
