use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, RepositoryInitOptions, Signature};
use tagflow_core::{RepositoryStateProvider, capture_state};
use tagflow_git::GitRepository;
use tempfile::TempDir;

fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(path, &opts).unwrap()
}

fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::now("tagflow", "tagflow@example.com").unwrap();
    let head = repo.head();

    match head {
        Ok(head) => {
            let parent = repo.find_commit(head.target().unwrap()).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .unwrap()
        }
        Err(_) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

fn repo_with_commit() -> (TempDir, Repository, git2::Oid) {
    let temp = TempDir::new().unwrap();
    let repo = init_repo(temp.path());
    fs::write(temp.path().join("Dockerfile"), "FROM alpine\n").unwrap();
    let oid = commit_all(&repo, "initial");
    (temp, repo, oid)
}

#[test]
fn outside_repository_is_not_git() {
    let temp = TempDir::new().unwrap();
    let git = GitRepository::discover(temp.path());

    assert!(!git.is_repository());
    assert!(git.is_dirty());
    assert!(git.revision(false).is_err());
    assert!(capture_state(&git, false).unwrap().is_none());
}

#[test]
fn repository_without_commits_has_no_state() {
    let temp = TempDir::new().unwrap();
    let _repo = init_repo(temp.path());
    fs::write(temp.path().join("Dockerfile"), "FROM alpine\n").unwrap();
    let git = GitRepository::discover(temp.path());

    assert!(!git.is_repository());
    assert!(capture_state(&git, false).unwrap().is_none());
    assert!(capture_state(&git, true).unwrap().is_none());
}

#[test]
fn revision_short_and_long() {
    let (temp, _repo, oid) = repo_with_commit();
    let git = GitRepository::discover(temp.path());

    let long = git.revision(true).unwrap();
    let short = git.revision(false).unwrap();
    assert_eq!(long, oid.to_string());
    assert_eq!(long.len(), 40);
    assert_eq!(short.len(), 7);
    assert!(long.starts_with(&short));
}

#[test]
fn discover_from_subdirectory() {
    let (temp, _repo, _) = repo_with_commit();
    let sub = temp.path().join("services/web");
    fs::create_dir_all(&sub).unwrap();

    let git = GitRepository::discover(&sub);
    assert!(git.is_repository());
}

#[test]
fn current_branch() {
    let (temp, _repo, _) = repo_with_commit();
    let git = GitRepository::discover(temp.path());

    assert_eq!(git.branches(false).unwrap(), vec!["main"]);
}

#[test]
fn all_branches_pointing_at_head() {
    let (temp, repo, _) = repo_with_commit();
    let first = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("old", &first, false).unwrap();

    fs::write(temp.path().join("app.txt"), "v2").unwrap();
    commit_all(&repo, "second");
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("feature/login", &head, false).unwrap();

    let git = GitRepository::discover(temp.path());
    assert_eq!(git.branches(false).unwrap(), vec!["main"]);
    assert_eq!(git.branches(true).unwrap(), vec!["main", "feature/login"]);

    let state = capture_state(&git, true).unwrap().unwrap();
    assert_eq!(state.labels(), vec!["main", "feature.login"]);
}

#[test]
fn detached_head_reports_head() {
    let (temp, repo, oid) = repo_with_commit();
    repo.set_head_detached(oid).unwrap();

    let git = GitRepository::discover(temp.path());
    assert_eq!(git.branches(false).unwrap(), vec!["HEAD"]);
}

#[test]
fn tags_at_head_only() {
    let (temp, repo, _) = repo_with_commit();
    let first = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight("v0.1", first.as_object(), false).unwrap();

    fs::write(temp.path().join("app.txt"), "v2").unwrap();
    commit_all(&repo, "second");
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    let sig = Signature::now("tagflow", "tagflow@example.com").unwrap();
    repo.tag("v1.0", head.as_object(), &sig, "release", false)
        .unwrap();
    repo.tag_lightweight("stable", head.as_object(), false)
        .unwrap();

    let git = GitRepository::discover(temp.path());
    let mut tags = git.tags_at_head().unwrap();
    tags.sort();
    assert_eq!(tags, vec!["stable", "v1.0"]);
}

#[test]
fn dirty_tracking() {
    let (temp, repo, _) = repo_with_commit();
    let git = GitRepository::discover(temp.path());
    assert!(!git.is_dirty());

    // 無視されたファイルは変更として扱わない
    fs::write(temp.path().join(".gitignore"), "*.log\n").unwrap();
    commit_all(&repo, "ignore logs");
    fs::write(temp.path().join("build.log"), "noise").unwrap();
    let git = GitRepository::discover(temp.path());
    assert!(!git.is_dirty());

    // 未追跡ファイルは変更として扱う
    fs::write(temp.path().join("new.txt"), "untracked").unwrap();
    assert!(git.is_dirty());

    commit_all(&repo, "add new");
    assert!(!git.is_dirty());

    fs::write(temp.path().join("Dockerfile"), "FROM alpine:3\n").unwrap();
    assert!(git.is_dirty());

    let state = capture_state(&git, false).unwrap().unwrap();
    assert!(state.dirty);
}
