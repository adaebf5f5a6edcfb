//! Integration test: query a throwaway repository built with git2.

use evilmerge_core::{CommitId, EvilMergeError, VersionControl, ABSENT_HASH};
use evilmerge_gitpulse::GitRepository;
use git2::{Oid, Repository, Signature};

fn commit(repo: &Repository, files: &[(&str, &str)], parents: &[Oid]) -> Oid {
    let sig = Signature::now("tester", "tester@example.com").unwrap();
    let mut root = repo.treebuilder(None).unwrap();
    let mut dirs: Vec<(&str, git2::TreeBuilder<'_>)> = Vec::new();
    for (path, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        match path.split_once('/') {
            Some((dir, name)) => {
                if !dirs.iter().any(|(d, _)| *d == dir) {
                    dirs.push((dir, repo.treebuilder(None).unwrap()));
                }
                let (_, builder) = dirs.iter_mut().find(|(d, _)| *d == dir).unwrap();
                builder.insert(name, blob, 0o100644).unwrap();
            }
            None => {
                root.insert(*path, blob, 0o100644).unwrap();
            }
        }
    }
    for (dir, builder) in dirs {
        let sub = builder.write().unwrap();
        root.insert(dir, sub, 0o040000).unwrap();
    }
    let tree = repo.find_tree(root.write().unwrap()).unwrap();
    let parents: Vec<git2::Commit<'_>> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(None, &sig, &sig, "test", &tree, &parent_refs)
        .unwrap()
}

struct Fixture {
    dir: tempfile::TempDir,
    repo: GitRepository,
    base: CommitId,
    first: CommitId,
    second: CommitId,
    merge: CommitId,
}

/// base: x.txt = "x", src/lib.rs = "lib"
/// first: x.txt = "a"; second: x.txt = "b", adds new.txt
/// merge: keeps the first parent's x.txt and new.txt
fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let raw = Repository::init(dir.path()).unwrap();
    let base = commit(&raw, &[("x.txt", "x\n"), ("src/lib.rs", "lib\n")], &[]);
    let first = commit(&raw, &[("x.txt", "a\n"), ("src/lib.rs", "lib\n")], &[base]);
    let second = commit(
        &raw,
        &[("x.txt", "b\n"), ("src/lib.rs", "lib\n"), ("new.txt", "n\n")],
        &[base],
    );
    let merge = commit(
        &raw,
        &[("x.txt", "a\n"), ("src/lib.rs", "lib\n"), ("new.txt", "n\n")],
        &[first, second],
    );
    Fixture {
        repo: GitRepository::from_repository(raw),
        dir,
        base: CommitId::new(base.to_string()),
        first: CommitId::new(first.to_string()),
        second: CommitId::new(second.to_string()),
        merge: CommitId::new(merge.to_string()),
    }
}

#[test]
fn parents_of_merge_are_resolved_in_order() {
    let f = fixture();
    let (p1, p2) = f.repo.resolve_parents(&f.merge).unwrap();
    assert_eq!(p1, f.first);
    assert_eq!(p2, f.second);
}

#[test]
fn non_merge_commit_is_rejected() {
    let f = fixture();
    let err = f.repo.resolve_parents(&f.first).unwrap_err();
    assert!(matches!(err, EvilMergeError::NotAMergeCommit(_)));
    assert!(err.is_recoverable());
}

#[test]
fn unknown_revision_is_a_git_error() {
    let f = fixture();
    let err = f
        .repo
        .resolve_parents(&CommitId::from("no-such-branch"))
        .unwrap_err();
    assert!(matches!(err, EvilMergeError::Git(_)));
}

#[test]
fn merge_base_of_parents() {
    let f = fixture();
    let bases = f.repo.merge_bases(&f.first, &f.second).unwrap();
    assert_eq!(bases, vec![f.base.clone()]);
}

#[test]
fn unrelated_histories_have_no_merge_base() {
    let f = fixture();
    let raw = Repository::open(f.dir.path()).unwrap();
    let orphan = commit(&raw, &[("other.txt", "o\n")], &[]);
    let bases = f
        .repo
        .merge_bases(&f.first, &CommitId::new(orphan.to_string()))
        .unwrap();
    assert!(bases.is_empty());
}

#[test]
fn snapshot_lists_nested_files() {
    let f = fixture();
    let tree = f.repo.tree_snapshot(&f.second).unwrap();
    let paths: Vec<_> = tree.paths().collect();
    assert_eq!(paths, vec!["new.txt", "src/lib.rs", "x.txt"]);
    assert_eq!(tree.get("gone.txt"), ABSENT_HASH);
    assert_eq!(tree.get("x.txt").len(), 40);

    let merge = f.repo.tree_snapshot(&f.merge).unwrap();
    let first = f.repo.tree_snapshot(&f.first).unwrap();
    assert_eq!(merge.get("x.txt"), first.get("x.txt"));
}

#[test]
fn unified_diff_is_parseable_patch_text() {
    let f = fixture();
    let text = f.repo.unified_diff(&f.base, &f.second).unwrap();
    assert!(text.contains("diff --git a/x.txt b/x.txt"));
    assert!(text.contains("+++ b/new.txt"));
    assert!(text.contains("\n-x\n+b\n"));
}

#[test]
fn identical_commits_have_empty_diff() {
    let f = fixture();
    let text = f.repo.unified_diff(&f.first, &f.first).unwrap();
    assert!(text.is_empty());
}

#[test]
fn revision_expressions_are_accepted() {
    let f = fixture();
    let raw = Repository::open(f.dir.path()).unwrap();
    let oid = Oid::from_str(f.merge.as_str()).unwrap();
    raw.branch("topic", &raw.find_commit(oid).unwrap(), false)
        .unwrap();
    let (p1, _) = f.repo.resolve_parents(&CommitId::from("topic")).unwrap();
    assert_eq!(p1, f.first);
}
