//! ビルド計画
//!
//! リポジトリの状態と既存イメージから、ビルドが必要かどうかと
//! ビルド後（またはスキップ時）に付けるタグを決定します。

use crate::model::{RepositoryState, RunOptions};
use crate::tags::composite_tag;

/// `source` タグのイメージに `target` タグを付ける操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAction {
    pub source: String,
    pub target: String,
}

impl TagAction {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// タグ付けを行わない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntaggedReason {
    /// 作業ツリーに未コミットの変更がある
    DirtyWorkingTree,
}

/// 1アプリケーション分のビルド計画
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub build_required: bool,
    pub tag_actions: Vec<TagAction>,
    pub untagged: Option<UntaggedReason>,
}

/// ビルドをスキップできるか
///
/// リポジトリがあり、変更がなく、リビジョンのイメージが既にあり、`force` でない場合のみ。
pub fn can_skip_build(repo: Option<&RepositoryState>, image_exists: bool, opts: &RunOptions) -> bool {
    matches!(repo, Some(repo) if !repo.dirty) && image_exists && !opts.force
}

/// ビルド計画を作成
///
/// `image_exists` は現在のリビジョンのタグを持つイメージが既に存在するか。
pub fn plan_build(
    repo: Option<&RepositoryState>,
    image_exists: bool,
    opts: &RunOptions,
) -> BuildPlan {
    let Some(repo) = repo else {
        // リビジョンがないので latest のビルドとユーザータグのみ
        let tag_actions = opts
            .user_tag()
            .map(|tag| vec![TagAction::new("latest", tag)])
            .unwrap_or_default();
        return BuildPlan {
            build_required: true,
            tag_actions,
            untagged: None,
        };
    };

    let revision = repo.revision_tag(opts.long_sha);
    let labels = repo.labels();

    if can_skip_build(Some(repo), image_exists, opts) {
        let mut tag_actions = vec![TagAction::new(revision, "latest")];
        for branch in &labels {
            tag_actions.push(TagAction::new(revision, branch.as_str()));
            tag_actions.push(TagAction::new(revision, composite_tag(branch, revision)));
        }
        if let Some(tag) = opts.user_tag() {
            tag_actions.push(TagAction::new(revision, tag));
        }
        return BuildPlan {
            build_required: false,
            tag_actions,
            untagged: None,
        };
    }

    if repo.dirty {
        return BuildPlan {
            build_required: true,
            tag_actions: Vec::new(),
            untagged: Some(UntaggedReason::DirtyWorkingTree),
        };
    }

    let mut tag_actions = vec![TagAction::new("latest", revision)];
    for branch in &labels {
        tag_actions.push(TagAction::new("latest", branch.as_str()));
        tag_actions.push(TagAction::new(revision, composite_tag(branch, revision)));
    }
    if let Some(tag) = opts.user_tag() {
        tag_actions.push(TagAction::new("latest", tag));
    }
    BuildPlan {
        build_required: true,
        tag_actions,
        untagged: None,
    }
}
