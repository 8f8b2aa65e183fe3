use crate::error::{Result, TagflowError};
use crate::model::RepositoryState;

/// バージョン管理の状態を取得するトレイト
pub trait RepositoryStateProvider {
    /// HEADがコミットを指すリポジトリ内か
    fn is_repository(&self) -> bool;
    /// HEADのリビジョン（`long` でなければ7文字）
    fn revision(&self, long: bool) -> anyhow::Result<String>;
    /// HEADに対応するブランチ名（`all` で同じコミットを指す全ブランチ）
    fn branches(&self, all: bool) -> anyhow::Result<Vec<String>>;
    /// HEADを指しているタグ名
    fn tags_at_head(&self) -> anyhow::Result<Vec<String>>;
    /// 読み取りに失敗した場合も変更ありとして扱う
    fn is_dirty(&self) -> bool;
}

/// 実行開始時のリポジトリ状態を取得
///
/// 1回の実行中にリポジトリは変化しないので、以降はこの結果を使い回す。
/// リポジトリの外、またはコミットがない場合は `None`。
pub fn capture_state(
    provider: &impl RepositoryStateProvider,
    all_branches: bool,
) -> Result<Option<RepositoryState>> {
    if !provider.is_repository() {
        tracing::debug!("No git repository found");
        return Ok(None);
    }

    let git_err = |e: anyhow::Error| TagflowError::Git(format!("{:#}", e));

    let revision = provider.revision(true).map_err(git_err)?;
    let branches = provider.branches(all_branches).map_err(git_err)?;
    let tags = provider.tags_at_head().map_err(git_err)?;
    let dirty = provider.is_dirty();

    tracing::debug!(
        "Repository state: revision={} dirty={} branches={:?} tags={:?}",
        revision,
        dirty,
        branches,
        tags
    );

    Ok(Some(
        RepositoryState::new(revision, dirty, branches).with_tags(tags),
    ))
}
