//! 不要イメージの選別

use crate::model::{AppDefinition, RepositoryState, RunOptions};
use crate::tags::composite_tag;
use std::collections::BTreeSet;

/// 削除してはいけない `image:tag` の集合
///
/// `latest`、現在のリビジョン、現在のブランチ、`{branch}-{revision}`。
pub fn protected_tags(
    app: &AppDefinition,
    repo: &RepositoryState,
    opts: &RunOptions,
) -> BTreeSet<String> {
    let revision = repo.revision_tag(opts.long_sha);

    let mut protected = BTreeSet::new();
    protected.insert(app.reference("latest"));
    protected.insert(app.reference(revision));
    for branch in repo.labels() {
        protected.insert(app.reference(&composite_tag(&branch, revision)));
        protected.insert(app.reference(&branch));
    }
    protected
}

/// 削除候補を選別
///
/// 既存タグから保護対象を除いた新しい集合を返す。入力は変更しない。
pub fn select_deletable(
    app: &AppDefinition,
    repo: &RepositoryState,
    opts: &RunOptions,
    existing: &BTreeSet<String>,
) -> BTreeSet<String> {
    let protected = protected_tags(app, repo, opts);
    existing.difference(&protected).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_only_stale_revision_is_deletable() {
        let app = AppDefinition::new("app", "app");
        let repo = RepositoryState::new("abc1234", false, vec!["master".into()]);
        let existing = set(&[
            "app:latest",
            "app:abc1234",
            "app:master",
            "app:master-abc1234",
            "app:old1111",
        ]);

        let deletable = select_deletable(&app, &repo, &RunOptions::default(), &existing);
        assert_eq!(deletable, set(&["app:old1111"]));
        assert_eq!(existing.len(), 5);
    }

    #[test]
    fn test_old_composite_of_current_branch_is_deletable() {
        let app = AppDefinition::new("app", "harbur/app");
        let repo = RepositoryState::new("abc1234", false, vec!["master".into()]);
        let existing = set(&[
            "harbur/app:latest",
            "harbur/app:master-old1111",
            "harbur/app:feature",
        ]);

        let deletable = select_deletable(&app, &repo, &RunOptions::default(), &existing);
        assert_eq!(
            deletable,
            set(&["harbur/app:feature", "harbur/app:master-old1111"])
        );
    }

    #[test]
    fn test_protected_set_contents() {
        let app = AppDefinition::new("app", "app");
        let repo = RepositoryState::new("abc1234ffff", false, vec!["master".into()])
            .with_tags(vec!["v1.0".into()]);

        let protected = protected_tags(&app, &repo, &RunOptions::default());
        assert_eq!(
            protected,
            set(&[
                "app:latest",
                "app:abc1234",
                "app:master",
                "app:master-abc1234",
                "app:v1.0",
                "app:v1.0-abc1234",
            ])
        );
    }

    #[test]
    fn test_long_sha_protects_full_revision() {
        let app = AppDefinition::new("app", "app");
        let repo = RepositoryState::new("abc1234ffff", false, vec!["master".into()]);
        let opts = RunOptions {
            long_sha: true,
            ..Default::default()
        };
        let existing = set(&["app:abc1234ffff", "app:abc1234"]);

        let deletable = select_deletable(&app, &repo, &opts, &existing);
        assert_eq!(deletable, set(&["app:abc1234"]));
    }
}
