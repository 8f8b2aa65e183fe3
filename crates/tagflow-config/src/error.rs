use std::path::PathBuf;
use tagflow_core::TagflowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("旧形式の設定ファイルが検出されました: {0}")]
    Legacy(PathBuf),

    #[error("{diagnostic}")]
    Syntax { path: PathBuf, diagnostic: String },

    #[error("設定ファイルのトップレベルはアプリケーション名のマッピングである必要があります")]
    NotAMapping(PathBuf),

    #[error("アプリケーション '{app}' の定義が不正です: {message}")]
    InvalidApp {
        path: PathBuf,
        app: String,
        message: String,
    },

    #[error("設定ファイルを読み込めません: {path}\n理由: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dockerfileの検索パターンが不正です: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl From<ConfigError> for TagflowError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Legacy(path) => TagflowError::LegacyConfig(path),
            ConfigError::Syntax { ref path, .. }
            | ConfigError::NotAMapping(ref path)
            | ConfigError::InvalidApp { ref path, .. }
            | ConfigError::Io { ref path, .. } => TagflowError::InvalidConfig {
                path: path.clone(),
                message: err.to_string(),
            },
            ConfigError::Pattern(_) => TagflowError::InvalidConfig {
                path: PathBuf::from("."),
                message: err.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
