use crate::model::AppDefinition;
use anyhow::Result;
use std::collections::BTreeSet;

/// コンテナイメージエンジンのトレイト
///
/// タグは `image:tag` の `tag` 部分。
#[allow(async_fn_in_trait)]
pub trait ImageEngine {
    /// アプリケーションのイメージを `tag` としてビルド
    async fn build(&self, app: &AppDefinition, tag: &str, no_cache: bool) -> Result<()>;
    /// `image:source` に `image:target` を付ける
    async fn tag(&self, app: &AppDefinition, source: &str, target: &str) -> Result<()>;
    async fn push(&self, image: &str, tag: &str) -> Result<()>;
    async fn pull(&self, image: &str, tag: &str) -> Result<()>;
    /// `image:tag` を削除
    async fn remove(&self, reference: &str) -> Result<()>;
    /// アプリケーションのイメージに付いている `image:tag` の一覧
    async fn list_existing_tags(&self, app: &AppDefinition) -> Result<BTreeSet<String>>;
    async fn exists(&self, app: &AppDefinition, tag: &str) -> Result<bool>;
}

/// フックコマンドの実行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// 終了コード（シグナル終了時は `None`）
    Failed(Option<i32>),
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        matches!(self, CommandStatus::Success)
    }
}

/// コマンド文字列を同期的に実行するトレイト
pub trait CommandExecutor {
    fn execute(&self, command: &str) -> Result<CommandStatus>;
}
