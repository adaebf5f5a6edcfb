use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Hash reported for a path that does not exist in a snapshot.
///
/// Git never produces the all-zero object id for real content, so comparisons
/// against it are safe without special-casing absence.
pub const ABSENT_HASH: &str = "0000000000000000000000000000000000000000";

/// The full path → content-hash state of one commit.
///
/// Lookups of paths the commit does not contain return [`ABSENT_HASH`]
/// instead of failing. Snapshots are immutable once built.
///
/// # Examples
///
/// ```
/// use evilmerge_core::{TreeSnapshot, ABSENT_HASH};
///
/// let tree: TreeSnapshot = [("src/lib.rs", "1111111111111111111111111111111111111111")]
///     .into_iter()
///     .collect();
/// assert_eq!(tree.get("src/lib.rs"), "1111111111111111111111111111111111111111");
/// assert_eq!(tree.get("missing.rs"), ABSENT_HASH);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot {
    entries: BTreeMap<String, String>,
}

impl TreeSnapshot {
    /// Content hash of `path`, or [`ABSENT_HASH`] if the path is not present.
    pub fn get(&self, path: &str) -> &str {
        self.entries
            .get(path)
            .map(String::as_str)
            .unwrap_or(ABSENT_HASH)
    }

    /// Whether `path` exists in this snapshot.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// All paths, in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, H: Into<String>> FromIterator<(P, H)> for TreeSnapshot {
    fn from_iter<I: IntoIterator<Item = (P, H)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(path, hash)| (path.into(), hash.into()))
                .collect(),
        }
    }
}

/// Paths whose content differs between two snapshots.
///
/// Symmetric in its arguments. A path present on only one side is included.
///
/// # Examples
///
/// ```
/// use evilmerge_core::{changed_paths, TreeSnapshot};
///
/// let x: TreeSnapshot = [("a", "1"), ("b", "2")].into_iter().collect();
/// let y: TreeSnapshot = [("a", "1"), ("c", "3")].into_iter().collect();
/// let changed: Vec<_> = changed_paths(&x, &y).into_iter().collect();
/// assert_eq!(changed, vec!["b", "c"]);
/// ```
pub fn changed_paths<'a>(x: &'a TreeSnapshot, y: &'a TreeSnapshot) -> BTreeSet<&'a str> {
    x.paths()
        .chain(y.paths())
        .filter(|path| x.get(path) != y.get(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> TreeSnapshot {
        entries.iter().copied().collect()
    }

    #[test]
    fn absent_path_returns_sentinel() {
        let tree = snapshot(&[("a.txt", "aaaa")]);
        assert_eq!(tree.get("b.txt"), ABSENT_HASH);
        assert!(!tree.contains("b.txt"));
        assert_eq!(TreeSnapshot::default().get(""), ABSENT_HASH);
    }

    #[test]
    fn paths_are_sorted() {
        let tree = snapshot(&[("z", "1"), ("a", "2"), ("m/n", "3")]);
        let paths: Vec<_> = tree.paths().collect();
        assert_eq!(paths, vec!["a", "m/n", "z"]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn changed_paths_is_symmetric() {
        let x = snapshot(&[("same", "1"), ("edited", "2"), ("only_x", "3")]);
        let y = snapshot(&[("same", "1"), ("edited", "9"), ("only_y", "4")]);
        let xy = changed_paths(&x, &y);
        let yx = changed_paths(&y, &x);
        assert_eq!(xy, yx);
        assert!(xy.contains("edited"));
        assert!(xy.contains("only_x"));
        assert!(xy.contains("only_y"));
        assert!(!xy.contains("same"));
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let x = snapshot(&[("a", "1"), ("b", "2")]);
        assert!(changed_paths(&x, &x.clone()).is_empty());
    }
}
