//! Removal of hunks shared verbatim by two diffs.

use std::collections::HashSet;

use crate::parser::{FileDiff, Hunk};

/// Drop every hunk that appears with identical text in both diffs.
///
/// For each path present in both `a` and `b`, a hunk is removed from one side
/// when its full literal text ([`Hunk::key`]) is among the other side's hunks
/// for that path. Matching is exact: a single differing character keeps the
/// hunk on both sides. Paths present on only one side are returned untouched.
///
/// Returns `(unique to a, unique to b)`.
///
/// # Examples
///
/// ```
/// use evilmerge_difflens::hunkset::remove_common_hunks;
/// use evilmerge_difflens::parser::parse_unified_diff;
///
/// let shared = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-x\n+y\n";
/// let a = parse_unified_diff(shared).unwrap();
/// let b = parse_unified_diff(shared).unwrap();
/// let (only_a, only_b) = remove_common_hunks(&a, &b);
/// assert!(only_a.hunks("f").is_empty());
/// assert!(only_b.hunks("f").is_empty());
/// ```
pub fn remove_common_hunks(a: &FileDiff, b: &FileDiff) -> (FileDiff, FileDiff) {
    let mut only_a = a.clone();
    let mut only_b = b.clone();

    for path in a.paths().filter(|p| b.contains(p)) {
        let keys_a = hunk_keys(a.hunks(path));
        let keys_b = hunk_keys(b.hunks(path));
        only_a.insert(path, retain_unique(a.hunks(path), &keys_b));
        only_b.insert(path, retain_unique(b.hunks(path), &keys_a));
    }

    (only_a, only_b)
}

fn hunk_keys(hunks: &[Hunk]) -> HashSet<String> {
    hunks.iter().map(Hunk::key).collect()
}

fn retain_unique(hunks: &[Hunk], other: &HashSet<String>) -> Vec<Hunk> {
    hunks
        .iter()
        .filter(|h| !other.contains(&h.key()))
        .cloned()
        .collect()
}
