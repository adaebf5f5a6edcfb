use std::collections::BTreeMap;
use std::fmt;

use evilmerge_core::EvilMergeError;
use serde::Serialize;

/// Where a line inside a hunk comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineOrigin {
    /// Unchanged line (` ` prefix).
    Context,
    /// Line only in the old version (`-` prefix).
    Removed,
    /// Line only in the new version (`+` prefix).
    Added,
    /// `\ No newline at end of file`.
    NoNewlineMarker,
}

impl LineOrigin {
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            ' ' => Some(LineOrigin::Context),
            '-' => Some(LineOrigin::Removed),
            '+' => Some(LineOrigin::Added),
            '\\' => Some(LineOrigin::NoNewlineMarker),
            _ => None,
        }
    }
}

/// One line of a hunk, kept verbatim including its sign prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    /// Classification derived from the prefix.
    pub origin: LineOrigin,
    /// Raw text, prefix included, without the trailing newline.
    pub text: String,
}

/// A contiguous change region of one file.
///
/// The header ranges are informational. Hunk identity is [`Hunk::key`],
/// which only covers the line text, so the same edit at a shifted offset
/// still compares equal.
///
/// # Examples
///
/// ```
/// use evilmerge_difflens::parser::parse_unified_diff;
///
/// let diff = parse_unified_diff("\
/// diff --git a/f b/f
/// --- a/f
/// +++ b/f
/// @@ -1 +1 @@
/// -old
/// +new
/// ").unwrap();
/// let hunk = &diff.hunks("f")[0];
/// assert_eq!(hunk.key(), "-old\n+new\n");
/// assert_eq!(hunk.old_start, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// The `@@ ... @@` line that opened the hunk.
    pub header: String,
    /// Starting line in the old version.
    pub old_start: u32,
    /// Number of lines in the old version.
    pub old_lines: u32,
    /// Starting line in the new version.
    pub new_start: u32,
    /// Number of lines in the new version.
    pub new_lines: u32,
    /// Body lines in file order.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Literal content of the hunk: every line's raw text, newline-terminated.
    pub fn key(&self) -> String {
        let mut key = String::new();
        for line in &self.lines {
            key.push_str(&line.text);
            key.push('\n');
        }
        key
    }

    fn is_complete(&self, remaining: (u32, u32)) -> bool {
        remaining == (0, 0) && !self.lines.is_empty()
    }
}

/// Per-file hunks of one commit-pair comparison.
///
/// Files with zero hunks (pure renames, mode changes) are kept as empty
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    files: BTreeMap<String, Vec<Hunk>>,
}

impl FileDiff {
    /// Hunks recorded for `path`, empty if the file is not part of the diff.
    pub fn hunks(&self, path: &str) -> &[Hunk] {
        self.files.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `path` is part of the diff.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// All paths in the diff, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// `(path, hunks)` pairs, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Hunk])> {
        self.files.iter().map(|(p, h)| (p.as_str(), h.as_slice()))
    }

    /// Number of files in the diff.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the diff touches no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Replace the hunks of `path`.
    pub fn insert(&mut self, path: impl Into<String>, hunks: Vec<Hunk>) {
        self.files.insert(path.into(), hunks);
    }

    fn register(&mut self, path: &str) {
        self.files.entry(path.to_string()).or_default();
    }

    fn push_hunk(&mut self, path: &str, hunk: Hunk) {
        self.files.entry(path.to_string()).or_default().push(hunk);
    }
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hunks: usize = self.files.values().map(Vec::len).sum();
        write!(f, "{} files ({} hunks)", self.files.len(), hunks)
    }
}

/// Parse a unified diff string (as produced by `git diff`) into a [`FileDiff`].
///
/// A `diff ` line starts a new file section, `+++ ` names the file (the old
/// name is used for deletions), `@@ ` opens a hunk, and lines starting with
/// space, `+`, `-` or `\` belong to the open hunk. Everything else is
/// ignored.
///
/// # Errors
///
/// Returns [`EvilMergeError::Parse`] if a hunk header is malformed or appears
/// before any file name.
///
/// # Examples
///
/// ```
/// use evilmerge_difflens::parser::parse_unified_diff;
///
/// let diff = parse_unified_diff("").unwrap();
/// assert!(diff.is_empty());
/// ```
pub fn parse_unified_diff(input: &str) -> Result<FileDiff, EvilMergeError> {
    let mut diff = FileDiff::default();
    let mut path: Option<String> = None;
    let mut old_path: Option<String> = None;
    let mut hunk: Option<Hunk> = None;
    // Old/new lines still expected by the open hunk.
    let mut remaining = (0u32, 0u32);

    for line in input.lines() {
        let in_body = hunk
            .as_ref()
            .is_some_and(|h| !h.is_complete(remaining));

        if line.starts_with("diff ") {
            flush_hunk(&mut diff, &path, &mut hunk);
            path = None;
            old_path = None;
            continue;
        }

        if !in_body {
            if let Some(raw) = line.strip_prefix("--- ") {
                flush_hunk(&mut diff, &path, &mut hunk);
                old_path = Some(parse_path(raw));
                continue;
            }

            if let Some(raw) = line.strip_prefix("+++ ") {
                flush_hunk(&mut diff, &path, &mut hunk);
                let name = parse_path(raw);
                let name = if name == "/dev/null" {
                    old_path.clone().unwrap_or(name)
                } else {
                    name
                };
                diff.register(&name);
                path = Some(name);
                continue;
            }

            if let Some(raw) = line.strip_prefix("rename to ") {
                let name = raw.trim_matches('"').to_string();
                diff.register(&name);
                path = Some(name);
                continue;
            }
        }

        if line.starts_with("@@ ") {
            flush_hunk(&mut diff, &path, &mut hunk);
            if path.is_none() {
                return Err(EvilMergeError::Parse(format!(
                    "hunk header outside of a file section: {line}"
                )));
            }
            let (old_start, old_lines, new_start, new_lines) = parse_hunk_header(line)?;
            remaining = (old_lines, new_lines);
            hunk = Some(Hunk {
                header: line.to_string(),
                old_start,
                old_lines,
                new_start,
                new_lines,
                lines: Vec::new(),
            });
            continue;
        }

        let Some(open) = hunk.as_mut() else {
            continue;
        };
        let Some(origin) = line.chars().next().and_then(LineOrigin::from_prefix) else {
            continue;
        };
        match origin {
            LineOrigin::Context => {
                remaining.0 = remaining.0.saturating_sub(1);
                remaining.1 = remaining.1.saturating_sub(1);
            }
            LineOrigin::Removed => remaining.0 = remaining.0.saturating_sub(1),
            LineOrigin::Added => remaining.1 = remaining.1.saturating_sub(1),
            LineOrigin::NoNewlineMarker => {}
        }
        open.lines.push(DiffLine {
            origin,
            text: line.to_string(),
        });
    }

    flush_hunk(&mut diff, &path, &mut hunk);
    Ok(diff)
}

fn flush_hunk(diff: &mut FileDiff, path: &Option<String>, hunk: &mut Option<Hunk>) {
    if let Some(h) = hunk.take() {
        if h.lines.is_empty() {
            return;
        }
        if let Some(p) = path {
            diff.push_hunk(p, h);
        }
    }
}

fn parse_path(raw: &str) -> String {
    // git appends a tab before timestamps in some patch flavours
    let raw = raw.split('\t').next().unwrap_or(raw);
    let normalized = raw.trim_matches('"');

    if normalized == "/dev/null" {
        return normalized.to_string();
    }

    normalized
        .strip_prefix("a/")
        .or_else(|| normalized.strip_prefix("b/"))
        .unwrap_or(normalized)
        .to_string()
}

fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32), EvilMergeError> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| EvilMergeError::Parse(format!("invalid hunk header: {line}")))?;

    let parts: Vec<&str> = inner.split(' ').collect();
    if parts.len() != 2 {
        return Err(EvilMergeError::Parse(format!("invalid hunk header: {line}")));
    }

    let old = parts[0]
        .strip_prefix('-')
        .ok_or_else(|| EvilMergeError::Parse(format!("invalid old range in hunk: {line}")))?;
    let new = parts[1]
        .strip_prefix('+')
        .ok_or_else(|| EvilMergeError::Parse(format!("invalid new range in hunk: {line}")))?;

    let (old_start, old_lines) = parse_range(old, line)?;
    let (new_start, new_lines) = parse_range(new, line)?;

    Ok((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str, context: &str) -> Result<(u32, u32), EvilMergeError> {
    if let Some((start, count)) = range.split_once(',') {
        let s = start
            .parse()
            .map_err(|_| EvilMergeError::Parse(format!("invalid range number in: {context}")))?;
        let c = count
            .parse()
            .map_err(|_| EvilMergeError::Parse(format!("invalid range count in: {context}")))?;
        Ok((s, c))
    } else {
        let s = range
            .parse()
            .map_err(|_| EvilMergeError::Parse(format!("invalid range number in: {context}")))?;
        Ok((s, 1))
    }
}
