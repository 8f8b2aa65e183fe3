//! 設定ファイルがない場合のアプリケーション推論
//!
//! `Dockerfile` / `Dockerfile.<suffix>` を探し、1ファイルを1アプリケーションとして扱う。

use crate::error::Result;
use std::collections::HashSet;
use std::path::{Component, Path};
use tagflow_core::AppDefinition;

/// 探索対象外のディレクトリ
const SKIPPED_DIRS: &[&str] = &["target"];

/// `root` 以下のDockerfileからアプリケーションを推論
pub fn infer_apps(root: &Path, namespace: &str) -> Result<Vec<AppDefinition>> {
    let pattern = format!("{}/**/Dockerfile*", glob::Pattern::escape(&root.to_string_lossy()));

    let mut apps = Vec::new();
    let mut seen = HashSet::new();

    for entry in glob::glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", e.path().display(), e);
                continue;
            }
        };

        if !path.is_file() || !is_dockerfile(&path) || is_skipped(root, &path) {
            continue;
        }

        let Some(app) = app_from_dockerfile(root, &path, namespace) else {
            continue;
        };

        if !seen.insert(app.name.clone()) {
            tracing::warn!(
                "Dockerfile {} resolves to already inferred image {}",
                path.display(),
                app.image
            );
            continue;
        }

        tracing::debug!(image = %app.image, dockerfile = %path.display(), "Inferred application");
        apps.push(app);
    }

    Ok(apps)
}

fn is_dockerfile(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some("Dockerfile") => true,
        Some(name) => name
            .strip_prefix("Dockerfile.")
            .is_some_and(|suffix| !suffix.is_empty()),
        None => false,
    }
}

/// 隠しディレクトリと除外ディレクトリ配下か
fn is_skipped(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let Some(parent) = relative.parent() else {
        return false;
    };

    parent.components().any(|component| match component {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
        }
        _ => false,
    })
}

fn app_from_dockerfile(root: &Path, path: &Path, namespace: &str) -> Option<AppDefinition> {
    let file_name = path.file_name()?.to_str()?.to_string();
    let dir = path.parent()?;

    // ルート直下のDockerfileはルートディレクトリ名を使う
    let dir_name = if dir == root {
        root.canonicalize().ok()?.file_name()?.to_string_lossy().to_string()
    } else {
        dir.file_name()?.to_string_lossy().to_string()
    };

    let suffix = if file_name == "Dockerfile" {
        String::new()
    } else {
        Path::new(&file_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    };

    let repository = format!("{}{}", dir_name, suffix).to_lowercase();
    let image = if namespace.is_empty() {
        repository
    } else {
        format!("{}/{}", namespace, repository)
    };

    let context = match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().to_string(),
        Err(_) => dir.to_string_lossy().to_string(),
    };

    let mut app = AppDefinition::new(image.clone(), image);
    app.build = file_name;
    app.context = context;
    Some(app)
}
