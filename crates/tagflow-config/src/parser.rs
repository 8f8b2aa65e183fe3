//! tagflow.yml のパーサー

use crate::error::{ConfigError, Result};
use serde_yaml::Value;
use std::path::Path;
use tagflow_core::AppDefinition;

/// 設定ファイルの内容をアプリケーション定義に変換
///
/// アプリケーションの順序はファイル上の記述順を保つ。
/// 旧形式（`build.images`）は他の内容に関わらず拒否する。
pub fn parse_config(content: &str, path: &Path) -> Result<Vec<AppDefinition>> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::Syntax {
        path: path.to_path_buf(),
        diagnostic: render_syntax_error(content, path, &e),
    })?;

    if is_legacy(&value) {
        return Err(ConfigError::Legacy(path.to_path_buf()));
    }

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        // 空ファイル
        Value::Null => return Ok(Vec::new()),
        _ => return Err(ConfigError::NotAMapping(path.to_path_buf())),
    };

    let mut apps = Vec::with_capacity(mapping.len());
    for (key, body) in mapping {
        let name = match key {
            Value::String(name) => name,
            other => {
                return Err(ConfigError::InvalidApp {
                    path: path.to_path_buf(),
                    app: format!("{:?}", other),
                    message: "アプリケーション名は文字列である必要があります".to_string(),
                });
            }
        };

        let mut app = match body {
            Value::Null => AppDefinition::default(),
            body => serde_yaml::from_value::<AppDefinition>(body).map_err(|e| {
                ConfigError::InvalidApp {
                    path: path.to_path_buf(),
                    app: name.clone(),
                    message: e.to_string(),
                }
            })?,
        };
        app.name = name;

        tracing::debug!(app = %app.name, image = %app.image, "Parsed application");
        apps.push(app);
    }

    Ok(apps)
}

/// 旧形式の判定: トップレベルの `build.images` が空でないマッピング
fn is_legacy(value: &Value) -> bool {
    value
        .get("build")
        .and_then(|build| build.get("images"))
        .and_then(Value::as_mapping)
        .is_some_and(|images| !images.is_empty())
}

/// 構文エラーを行・列付きで整形
fn render_syntax_error(content: &str, path: &Path, err: &serde_yaml::Error) -> String {
    let Some(location) = err.location() else {
        return format!("設定ファイルの構文エラー ({}): {}", path.display(), err);
    };

    let line = location.line();
    let column = location.column();
    let source_line = content.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let caret = format!("{}^", " ".repeat(column.saturating_sub(1)));

    format!(
        "設定ファイルの構文エラー ({}:{}:{}): {}\n{}\n{}",
        path.display(),
        line,
        column,
        err,
        source_line,
        caret
    )
}
