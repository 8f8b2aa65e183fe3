use std::path::PathBuf;
use thiserror::Error;

/// プロセス終了コード
///
/// 失敗の種類ごとに固有のコードを持つ。CIからは終了コードだけで原因を判別できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    BuildFailed,
    TagFailed,
    ExecuteFailed,
    NoGit,
    GitDirty,
    DeleteImageFailed,
    InvalidConfig,
    LegacyConfig,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::BuildFailed => 1,
            ExitStatus::TagFailed => 2,
            ExitStatus::ExecuteFailed => 3,
            ExitStatus::NoGit => 4,
            ExitStatus::GitDirty => 5,
            ExitStatus::DeleteImageFailed => 6,
            ExitStatus::InvalidConfig => 7,
            ExitStatus::LegacyConfig => 8,
        }
    }
}

#[derive(Error, Debug)]
pub enum TagflowError {
    #[error("イメージ {image} のビルドに失敗しました: {message}")]
    BuildFailed { image: String, message: String },

    #[error("タグ付けに失敗しました: {image}:{from} → {image}:{to}\n理由: {message}")]
    TagFailed {
        image: String,
        from: String,
        to: String,
        message: String,
    },

    #[error("コマンドの実行に失敗しました: {command}\n理由: {message}")]
    CommandFailed { command: String, message: String },

    #[error("{app} の pre コマンドが失敗したため、{app} の処理を中断しました")]
    PreHookFailed { app: String },

    #[error("プッシュに失敗しました: {image}:{tag}\n理由: {message}")]
    PushFailed {
        image: String,
        tag: String,
        message: String,
    },

    #[error("プルに失敗しました: {image}:{tag}\n理由: {message}")]
    PullFailed {
        image: String,
        tag: String,
        message: String,
    },

    #[error("イメージエンジンの操作に失敗しました: {0}")]
    Engine(String),

    #[error("Gitリポジトリの読み取りに失敗しました: {0}")]
    Git(String),

    #[error("Gitリポジトリが見つかりません。{operation} にはGitリポジトリが必要です")]
    NoGit { operation: &'static str },

    #[error("Gitリポジトリにコミットされていない変更があります。{operation} できません")]
    GitDirty { operation: &'static str },

    #[error("イメージの削除に失敗しました: {image}\n理由: {message}")]
    DeleteImageFailed { image: String, message: String },

    #[error("設定ファイルが不正です: {path}\n{message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error(
        "旧形式の設定ファイルが検出されました: {0}\n\nヒント:\n  • build.images セクションはサポートされていません\n  • アプリケーション名をトップレベルのキーにした形式に書き換えてください"
    )]
    LegacyConfig(PathBuf),
}

impl TagflowError {
    /// このエラーで終了する際の終了コード
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            TagflowError::BuildFailed { .. } => ExitStatus::BuildFailed,
            TagflowError::TagFailed { .. } => ExitStatus::TagFailed,
            TagflowError::CommandFailed { .. }
            | TagflowError::PreHookFailed { .. }
            | TagflowError::PushFailed { .. }
            | TagflowError::PullFailed { .. }
            | TagflowError::Engine(_)
            | TagflowError::Git(_) => ExitStatus::ExecuteFailed,
            TagflowError::NoGit { .. } => ExitStatus::NoGit,
            TagflowError::GitDirty { .. } => ExitStatus::GitDirty,
            TagflowError::DeleteImageFailed { .. } => ExitStatus::DeleteImageFailed,
            TagflowError::InvalidConfig { .. } => ExitStatus::InvalidConfig,
            TagflowError::LegacyConfig(_) => ExitStatus::LegacyConfig,
        }
    }
}

pub type Result<T> = std::result::Result<T, TagflowError>;
