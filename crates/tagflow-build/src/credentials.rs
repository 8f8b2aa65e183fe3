//! Docker config.json からのレジストリ認証情報

use base64::Engine;
use bollard::auth::DockerCredentials;
use std::path::PathBuf;

/// レジストリを含まないイメージの認証キー
pub const DOCKER_HUB_KEY: &str = "https://index.docker.io/v1/";

fn docker_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".docker").join("config.json"))
}

/// Docker config.json からレジストリの認証情報を取得
pub fn get_docker_credentials(registry: &str) -> Option<DockerCredentials> {
    let config_content = std::fs::read_to_string(docker_config_path()?).ok()?;
    let config: serde_json::Value = serde_json::from_str(&config_content).ok()?;

    // auths セクションからレジストリの認証情報を取得
    let auths = config.get("auths")?.as_object()?;
    let auth_entry = auths.get(registry)?;
    let auth_b64 = auth_entry.get("auth")?.as_str()?;

    // Base64 デコード (username:password 形式)
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64)
        .ok()?;
    let auth_str = String::from_utf8(decoded).ok()?;
    let (username, password) = auth_str.split_once(':')?;

    Some(DockerCredentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        serveraddress: Some(registry.to_string()),
        ..Default::default()
    })
}

/// イメージ名からレジストリを抽出
///
/// 最初の `/` の前が `.` か `:` を含むか `localhost` ならレジストリ。
pub fn extract_registry(image: &str) -> Option<&str> {
    let (first, _) = image.split_once('/')?;
    if first.contains('.') || first.contains(':') || first == "localhost" {
        Some(first)
    } else {
        None
    }
}

/// イメージに対応する認証情報（なければ `None`）
pub fn credentials_for(image: &str) -> Option<DockerCredentials> {
    let registry = extract_registry(image).unwrap_or(DOCKER_HUB_KEY);
    let credentials = get_docker_credentials(registry);
    if credentials.is_some() {
        tracing::debug!("Using stored credentials for {}", registry);
    }
    credentials
}
