use crate::error::{BuildError, BuildResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tagflow_core::AppDefinition;

/// 機密情報を含みやすいビルド引数名
const SENSITIVE_PATTERNS: &[&str] = &["password", "token", "secret", "api_key", "private_key"];

/// アプリケーション定義からビルド入力を解決する
pub struct BuildResolver {
    project_root: PathBuf,
}

impl BuildResolver {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// ビルドコンテキストのパスを解決
    pub fn resolve_context(&self, app: &AppDefinition) -> BuildResult<PathBuf> {
        let context = app.context_path(&self.project_root);

        if !context.exists() {
            return Err(BuildError::ContextNotFound(context));
        }

        if !context.is_dir() {
            return Err(BuildError::InvalidConfig(format!(
                "Build context is not a directory: {}",
                context.display()
            )));
        }

        Ok(context)
    }

    /// Dockerfileのパスを解決（コンテキストからの相対パス）
    pub fn resolve_dockerfile(&self, app: &AppDefinition) -> BuildResult<PathBuf> {
        let path = app.dockerfile_path(&self.project_root);
        if path.is_file() {
            tracing::debug!("Found Dockerfile for '{}' at: {}", app.name, path.display());
            Ok(path)
        } else {
            Err(BuildError::DockerfileNotFound(path))
        }
    }

    /// ビルド引数を検証してエンジンに渡す形にする
    pub fn resolve_build_args(&self, args: &BTreeMap<String, String>) -> HashMap<String, String> {
        args.iter()
            .map(|(key, value)| {
                self.validate_build_arg(key);
                (key.clone(), value.clone())
            })
            .collect()
    }

    /// ビルド引数の検証（機密情報の警告）
    ///
    /// 警告した場合は `true`。
    pub fn validate_build_arg(&self, key: &str) -> bool {
        let key_lower = key.to_lowercase();
        let sensitive = SENSITIVE_PATTERNS
            .iter()
            .any(|pattern| key_lower.contains(pattern));

        if sensitive {
            tracing::warn!(
                "警告: ビルド引数 '{}' は機密情報を含む可能性があります。\n\
                 ビルド引数はイメージ履歴に記録されます。\n\
                 機密情報はビルド引数ではなく、環境変数やシークレットマウントを使用してください。",
                key
            );
        }
        sensitive
    }
}
