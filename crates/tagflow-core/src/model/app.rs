//! アプリケーション定義

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// アプリケーション定義
///
/// YAML形式：
/// ```yaml
/// web:
///   build: Dockerfile
///   image: harbur/test_web
///   context: .
///   pre:
///     - echo preparing
///   test:
///     - cargo test
///   build_arg:
///     VERSION: "1.0"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppDefinition {
    /// 設定ファイル上のキー
    #[serde(skip)]
    pub name: String,
    /// Dockerfile名（コンテキストからの相対パス）
    #[serde(default = "default_dockerfile")]
    pub build: String,
    /// 対象イメージ名。空の場合はフック実行専用
    #[serde(default)]
    pub image: String,
    /// ビルドコンテキスト
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default)]
    pub pre: Vec<String>,
    #[serde(default)]
    pub post: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(default)]
    pub build_arg: BTreeMap<String, String>,
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_context() -> String {
    ".".to_string()
}

impl Default for AppDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            build: default_dockerfile(),
            image: String::new(),
            context: default_context(),
            pre: Vec::new(),
            post: Vec::new(),
            test: Vec::new(),
            build_arg: BTreeMap::new(),
        }
    }
}

impl AppDefinition {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// イメージを持つか（持たない場合はフックのみ実行できる）
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// `image:tag` 形式の参照
    pub fn reference(&self, tag: &str) -> String {
        format!("{}:{}", self.image, tag)
    }

    /// プロジェクトルートを基準にしたビルドコンテキスト
    pub fn context_path(&self, root: &Path) -> PathBuf {
        root.join(&self.context)
    }

    /// プロジェクトルートを基準にしたDockerfileのパス
    pub fn dockerfile_path(&self, root: &Path) -> PathBuf {
        self.context_path(root).join(&self.build)
    }
}

/// 読み込み済みのアプリケーション一覧
///
/// 順序は設定ファイルの記述順（推論時は発見順）。
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    apps: Vec<AppDefinition>,
    root: PathBuf,
}

impl AppRegistry {
    pub fn new(apps: Vec<AppDefinition>, root: PathBuf) -> Self {
        Self { apps, root }
    }

    pub fn apps(&self) -> &[AppDefinition] {
        &self.apps
    }

    pub fn get(&self, name: &str) -> Option<&AppDefinition> {
        self.apps.iter().find(|app| app.name == name)
    }

    /// 設定ファイルのあるディレクトリ
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// 名前でアプリケーションを絞り込む
    ///
    /// フィルタが空なら何もしない。1つでも除外した場合は `false` を返す。
    pub fn filter(&mut self, names: &[String]) -> bool {
        if names.is_empty() {
            return true;
        }
        let before = self.apps.len();
        self.apps.retain(|app| names.iter().any(|n| *n == app.name));
        self.apps.len() == before
    }
}
