//! タグ解決
//!
//! push/pull で扱うタグ一覧を決定します。同じ入力からは常に同じ順序の
//! 一覧が得られ、push と pull で違うのは呼び出すエンジン操作だけです。

use crate::model::{RepositoryState, RunOptions};

/// 1アプリケーション・1操作分のタグ一覧
///
/// 先頭は必ず `latest`。重複は含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlan {
    tags: Vec<String>,
}

impl TagPlan {
    fn new() -> Self {
        Self {
            tags: vec!["latest".to_string()],
        }
    }

    fn push(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// push/pull の対象タグを決定
///
/// 順序:
/// 1. `latest`
/// 2. ブランチ（`branch_tags` 時）
/// 3. リビジョン（`commit_tags` 時）
/// 4. `{branch}-{revision}`（両方指定時）
/// 5. ユーザー指定タグ
///
/// リポジトリがない場合は 2〜4 を省略する。
pub fn resolve_tags(repo: Option<&RepositoryState>, opts: &RunOptions) -> TagPlan {
    let mut plan = TagPlan::new();

    if let Some(repo) = repo {
        let labels = repo.labels();
        let revision = repo.revision_tag(opts.long_sha);

        if opts.branch_tags {
            for branch in &labels {
                plan.push(branch.as_str());
            }
        }
        if opts.commit_tags {
            plan.push(revision);
        }
        if opts.branch_tags && opts.commit_tags {
            for branch in &labels {
                plan.push(composite_tag(branch, revision));
            }
        }
    }

    if let Some(tag) = opts.user_tag() {
        plan.push(tag);
    }

    plan
}

/// `{branch}-{revision}` 形式のタグ
pub fn composite_tag(branch: &str, revision: &str) -> String {
    format!("{}-{}", branch, revision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryState {
        RepositoryState::new(
            "abc1234567890abcdef1234567890abcdef12345",
            false,
            vec!["master".into(), "develop".into()],
        )
    }

    #[test]
    fn test_full_order() {
        let opts = RunOptions {
            tag: Some("release".into()),
            ..Default::default()
        };
        let plan = resolve_tags(Some(&repo()), &opts);
        assert_eq!(
            plan.tags(),
            [
                "latest",
                "master",
                "develop",
                "abc1234",
                "master-abc1234",
                "develop-abc1234",
                "release"
            ]
        );
    }

    #[test]
    fn test_no_branch_tags() {
        let opts = RunOptions {
            branch_tags: false,
            ..Default::default()
        };
        let plan = resolve_tags(Some(&repo()), &opts);
        assert_eq!(plan.tags(), ["latest", "abc1234"]);
    }

    #[test]
    fn test_no_commit_tags() {
        let opts = RunOptions {
            commit_tags: false,
            ..Default::default()
        };
        let plan = resolve_tags(Some(&repo()), &opts);
        assert_eq!(plan.tags(), ["latest", "master", "develop"]);
    }

    #[test]
    fn test_long_sha() {
        let opts = RunOptions {
            branch_tags: false,
            long_sha: true,
            ..Default::default()
        };
        let plan = resolve_tags(Some(&repo()), &opts);
        assert_eq!(
            plan.tags(),
            ["latest", "abc1234567890abcdef1234567890abcdef12345"]
        );
    }

    #[test]
    fn test_without_repository() {
        let opts = RunOptions {
            tag: Some("nightly".into()),
            ..Default::default()
        };
        let plan = resolve_tags(None, &opts);
        assert_eq!(plan.tags(), ["latest", "nightly"]);
    }

    #[test]
    fn test_collisions_are_dropped() {
        let repo = RepositoryState::new("abc1234ffff", false, vec!["latest".into()]);
        let opts = RunOptions {
            tag: Some("abc1234".into()),
            ..Default::default()
        };
        let plan = resolve_tags(Some(&repo), &opts);
        assert_eq!(plan.tags(), ["latest", "abc1234", "latest-abc1234"]);
    }

    #[test]
    fn test_always_starts_with_latest() {
        for branch_tags in [true, false] {
            for commit_tags in [true, false] {
                let opts = RunOptions {
                    branch_tags,
                    commit_tags,
                    ..Default::default()
                };
                let plan = resolve_tags(Some(&repo()), &opts);
                assert_eq!(plan.tags()[0], "latest");
                let mut unique = plan.tags().to_vec();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), plan.len());
            }
        }
    }
}
