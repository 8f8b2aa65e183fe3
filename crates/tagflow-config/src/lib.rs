//! tagflow の設定ファイル読み込み
//!
//! `tagflow.yml` を探してアプリケーション一覧を組み立てます。
//! 設定ファイルがない場合は Dockerfile から推論します。

pub mod error;
pub mod infer;
pub mod parser;

pub use error::*;
pub use infer::infer_apps;
pub use parser::parse_config;

use std::path::{Path, PathBuf};
use tagflow_core::{AppRegistry, Reporter};

/// 設定ファイルのパスを指定する環境変数
pub const CONFIG_ENV: &str = "TAGFLOW_CONFIG";

/// 探索する設定ファイル名（優先順）
pub const CONFIG_CANDIDATES: &[&str] = &["tagflow.yml", "tagflow.yaml", ".tagflow.yml"];

/// 推論時の既定の名前空間
pub const DEFAULT_NAMESPACE: &str = "tagflow";

/// 読み込み元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Inferred,
}

/// プロジェクトの設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 明示指定されたパス
/// 2. 環境変数 TAGFLOW_CONFIG
/// 3. `dir` 内: tagflow.yml, tagflow.yaml, .tagflow.yml
///
/// 指定されたファイルが存在しない場合は `None`（推論に切り替える）。
pub fn find_config_file_in(dir: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    if let Ok(config_path) = std::env::var(CONFIG_ENV)
        && !config_path.is_empty()
    {
        let path = PathBuf::from(config_path);
        return path.exists().then_some(path);
    }

    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// 名前空間を決定: 指定値、USER、既定値の順
pub fn resolve_namespace(explicit: Option<&str>) -> String {
    explicit
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

/// 設定ファイルを読み込む
pub fn load_config_file(path: &Path) -> Result<AppRegistry> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let apps = parse_config(&content, path)?;

    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok(AppRegistry::new(apps, root))
}

/// `dir` を基準にアプリケーション一覧を読み込む
pub fn load_registry_in(
    dir: &Path,
    explicit: Option<&Path>,
    namespace: &str,
    reporter: &Reporter,
) -> Result<(AppRegistry, ConfigSource)> {
    match find_config_file_in(dir, explicit) {
        Some(path) => {
            reporter.debug(&format!("Located configuration {}", path.display()));
            let registry = load_config_file(&path)?;
            Ok((registry, ConfigSource::File(path)))
        }
        None => {
            let missing = explicit
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| CONFIG_CANDIDATES[0].to_string());
            reporter.info(&format!("No configuration found {} - inferring values", missing));

            let apps = infer_apps(dir, namespace)?;
            for app in &apps {
                reporter.info(&format!(
                    "Located {}/{} as {}",
                    app.context, app.build, app.image
                ));
            }
            Ok((AppRegistry::new(apps, dir.to_path_buf()), ConfigSource::Inferred))
        }
    }
}

/// カレントディレクトリを基準にアプリケーション一覧を読み込む
pub fn load_registry(
    explicit: Option<&Path>,
    namespace: &str,
    reporter: &Reporter,
) -> Result<(AppRegistry, ConfigSource)> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    load_registry_in(&cwd, explicit, namespace, reporter)
}
