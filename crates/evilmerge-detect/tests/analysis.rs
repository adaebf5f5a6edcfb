//! Detector orchestration against an in-memory repository.

use std::collections::HashMap;

use evilmerge_core::{
    AnalysisConfig, CommitId, EvilMergeError, Suspect, SuspectReason, TreeSnapshot,
    VersionControl,
};
use evilmerge_detect::{analyze_hunks, analyze_tree, MergeSpec};

#[derive(Default)]
struct FakeRepo {
    parents: HashMap<String, (String, String)>,
    bases: Vec<String>,
    trees: HashMap<String, TreeSnapshot>,
    diffs: HashMap<(String, String), String>,
}

impl FakeRepo {
    fn tree(mut self, id: &str, entries: &[(&str, &str)]) -> Self {
        self.trees
            .insert(id.to_string(), entries.iter().copied().collect());
        self
    }

    fn diff(mut self, from: &str, to: &str, text: &str) -> Self {
        self.diffs
            .insert((from.to_string(), to.to_string()), text.to_string());
        self
    }

    fn merge(mut self, id: &str, first: &str, second: &str) -> Self {
        self.parents
            .insert(id.to_string(), (first.to_string(), second.to_string()));
        self
    }

    fn bases(mut self, bases: &[&str]) -> Self {
        self.bases = bases.iter().map(|b| b.to_string()).collect();
        self
    }
}

impl VersionControl for FakeRepo {
    fn resolve_parents(&self, commit: &CommitId) -> Result<(CommitId, CommitId), EvilMergeError> {
        self.parents
            .get(commit.as_str())
            .map(|(a, b)| (CommitId::from(a.as_str()), CommitId::from(b.as_str())))
            .ok_or_else(|| EvilMergeError::NotAMergeCommit(commit.to_string()))
    }

    fn merge_bases(&self, _a: &CommitId, _b: &CommitId) -> Result<Vec<CommitId>, EvilMergeError> {
        Ok(self.bases.iter().map(|b| CommitId::from(b.as_str())).collect())
    }

    fn tree_snapshot(&self, commit: &CommitId) -> Result<TreeSnapshot, EvilMergeError> {
        self.trees
            .get(commit.as_str())
            .cloned()
            .ok_or_else(|| EvilMergeError::Git(format!("unknown commit {commit}")))
    }

    fn unified_diff(&self, from: &CommitId, to: &CommitId) -> Result<String, EvilMergeError> {
        Ok(self
            .diffs
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

fn tree_repo() -> FakeRepo {
    FakeRepo::default()
        .merge("M", "A", "B")
        .bases(&["Y"])
        .tree("Y", &[("x.txt", "y"), ("same.txt", "s")])
        .tree("A", &[("x.txt", "a"), ("same.txt", "s")])
        .tree("B", &[("x.txt", "b"), ("same.txt", "s")])
        .tree("M", &[("x.txt", "a"), ("same.txt", "s")])
}

#[test]
fn tree_analysis_looks_up_parents_and_bases() {
    let repo = tree_repo();
    let report = analyze_tree(&repo, &MergeSpec::new("M")).unwrap();
    assert_eq!(report.first, CommitId::from("A"));
    assert_eq!(report.bases, vec![CommitId::from("Y")]);
    assert_eq!(
        report.suspects,
        vec![Suspect::new("x.txt", SuspectReason::TookSide1DroppedSide2)]
    );
}

#[test]
fn tree_analysis_rejects_non_merge() {
    let repo = tree_repo();
    let err = analyze_tree(&repo, &MergeSpec::new("A")).unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn given_parents_skip_lookup() {
    // "A" is not a merge, but explicit parents make that irrelevant
    let repo = tree_repo();
    let spec = MergeSpec::from_args(&["M", "B", "A"]).unwrap();
    let report = analyze_tree(&repo, &spec).unwrap();
    assert_eq!(
        report.suspects,
        vec![Suspect::new("x.txt", SuspectReason::TookSide2DroppedSide1)]
    );
}

#[test]
fn given_bases_override_lookup() {
    // with A itself as the base only B changed x.txt, and M kept A's version
    let repo = tree_repo();
    let spec = MergeSpec::from_args(&["M", "A", "B", "--", "A"]).unwrap();
    let report = analyze_tree(&repo, &spec).unwrap();
    assert_eq!(report.bases, vec![CommitId::from("A")]);
    assert_eq!(
        report.suspects,
        vec![Suspect::new("x.txt", SuspectReason::ModifiedSide2TookSide1)]
    );
}

#[test]
fn tree_analysis_supports_several_bases() {
    let repo = tree_repo()
        .bases(&["Y", "Y2"])
        .tree("Y2", &[("x.txt", "a"), ("same.txt", "s")]);
    let report = analyze_tree(&repo, &MergeSpec::new("M")).unwrap();
    assert_eq!(
        report.suspects,
        vec![Suspect::new("x.txt", SuspectReason::ModifiedSide2TookSide1)]
    );
}

const Y_TO_A: &str = "\
--- a/x.txt
+++ b/x.txt
@@ -1,3 +1,3 @@
 1
-2
+A2
 3
";

const Y_TO_B: &str = "\
--- a/x.txt
+++ b/x.txt
@@ -7,3 +7,3 @@
 7
-8
+B8
 9
";

fn hunk_repo(a_to_m: &str, b_to_m: &str) -> FakeRepo {
    FakeRepo::default()
        .merge("M", "A", "B")
        .bases(&["Y"])
        .diff("Y", "A", Y_TO_A)
        .diff("Y", "B", Y_TO_B)
        .diff("A", "M", a_to_m)
        .diff("B", "M", b_to_m)
}

#[test]
fn honest_merge_has_no_suspicious_hunks() {
    // the merge applies exactly the other side's hunks to each parent
    let repo = hunk_repo(Y_TO_B, Y_TO_A);
    let report = analyze_hunks(&repo, &MergeSpec::new("M"), &AnalysisConfig::default()).unwrap();
    assert!(report.is_clean());
}

#[test]
fn dropped_second_side_is_reported_from_first_parent() {
    // M == A: nothing changes on top of A, and B's edit is reverted on top of B
    let b_to_m = "\
--- a/x.txt
+++ b/x.txt
@@ -1,3 +1,3 @@
 1
-2
+A2
 3
@@ -7,3 +7,3 @@
 7
-B8
+8
 9
";
    let repo = hunk_repo("", b_to_m);
    let report = analyze_hunks(&repo, &MergeSpec::new("M"), &AnalysisConfig::default()).unwrap();

    assert_eq!(report.from_first.len(), 1);
    let file = &report.from_first[0];
    assert_eq!(file.path, "x.txt");
    assert_eq!(file.flagged_lines, vec!["--8", "-+B8"]);

    // on top of B the merge did more than A's hunk
    assert_eq!(report.from_second.len(), 1);
    assert!(report.from_second[0]
        .flagged_lines
        .iter()
        .any(|l| l == "+-B8"));
}

#[test]
fn identical_changes_on_both_sides_are_not_expected_from_the_merge() {
    // both sides made the same edit; the merge needs to do nothing
    let repo = hunk_repo("", "").diff("Y", "B", Y_TO_A);
    let report = analyze_hunks(&repo, &MergeSpec::new("M"), &AnalysisConfig::default()).unwrap();
    assert!(report.is_clean());
}

#[test]
fn multiple_looked_up_bases_are_refused_in_hunk_mode() {
    let repo = hunk_repo(Y_TO_B, Y_TO_A).bases(&["Y", "Y2"]);
    let err = analyze_hunks(&repo, &MergeSpec::new("M"), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        EvilMergeError::MultipleMergeBases { count: 2, .. }
    ));
    assert!(err.is_recoverable());
}

#[test]
fn first_given_base_is_used_in_hunk_mode() {
    let repo = hunk_repo(Y_TO_B, Y_TO_A);
    let spec = MergeSpec::from_args(&["M", "A", "B", "--", "Y", "Z"]).unwrap();
    let report = analyze_hunks(&repo, &spec, &AnalysisConfig::default()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.bases.len(), 2);
}

#[test]
fn no_base_treats_every_merge_change_as_suspicious() {
    let repo = hunk_repo(Y_TO_B, "").bases(&[]);
    let report = analyze_hunks(&repo, &MergeSpec::new("M"), &AnalysisConfig::default()).unwrap();
    assert!(report.bases.is_empty());
    assert_eq!(report.from_first.len(), 1);
    assert!(report.from_first[0].flagged_lines.contains(&"+-8".to_string()));
    assert!(report.from_second.is_empty());
}

#[test]
fn malformed_diff_is_a_parse_error() {
    let repo = hunk_repo("--- a/x.txt\n+++ b/x.txt\n@@ nonsense @@\n", Y_TO_A);
    let err = analyze_hunks(&repo, &MergeSpec::new("M"), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, EvilMergeError::Parse(_)));
    assert!(!err.is_recoverable());
}
