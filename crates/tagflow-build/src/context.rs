use crate::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;

/// アーカイブに追加するDockerfileのエントリ名
///
/// コンテキスト内の既存ファイルと衝突しない名前にする。
pub const DOCKERFILE_ENTRY: &str = ".tagflow.Dockerfile";

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// Dockerfileは [`DOCKERFILE_ENTRY`] として末尾に追加される。
    pub fn create_context(context_path: &Path, dockerfile_path: &Path) -> BuildResult<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        if !context_path.is_dir() {
            return Err(BuildError::ContextNotFound(context_path.to_path_buf()));
        }

        let dockerfile_content = std::fs::read(dockerfile_path)
            .map_err(|_| BuildError::DockerfileNotFound(dockerfile_path.to_path_buf()))?;

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            tar.append_dir_all(".", context_path)
                .map_err(BuildError::Io)?;

            let mut header = tar::Header::new_gnu();
            header.set_path(DOCKERFILE_ENTRY).map_err(|e| {
                BuildError::InvalidConfig(format!("Failed to set Dockerfile path: {}", e))
            })?;
            header.set_size(dockerfile_content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();

            tar.append(&header, &dockerfile_content[..])
                .map_err(BuildError::Io)?;

            // GzEncoder まで閉じないとアーカイブが途中で切れる
            tar.into_inner()
                .map_err(BuildError::Io)?
                .finish()
                .map_err(BuildError::Io)?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 .dockerignoreファイルで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    fn entries(archive: Vec<u8>) -> Vec<(String, String)> {
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(archive));
        let mut tar = tar::Archive::new(decoder);
        let mut result = Vec::new();
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = entry.path().unwrap().to_string_lossy().to_string();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            result.push((path.trim_start_matches("./").to_string(), content));
        }
        result
    }

    #[test]
    fn test_create_context() {
        let temp_dir = tempdir().unwrap();

        fs::write(temp_dir.path().join("file1.txt"), "content1").unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("file2.txt"), "content2").unwrap();

        let dockerfile = temp_dir.path().join("Dockerfile.dev");
        fs::write(&dockerfile, "FROM alpine\nRUN echo test").unwrap();

        let archive = ContextBuilder::create_context(temp_dir.path(), &dockerfile).unwrap();
        let entries = entries(archive);

        let names: Vec<_> = entries.iter().map(|(p, _)| p.as_str()).collect();
        assert!(names.contains(&"file1.txt"));
        assert!(names.contains(&"subdir/file2.txt"));

        // Dockerfileは専用の名前で末尾に入る
        let (last_path, last_content) = entries.last().unwrap();
        assert_eq!(last_path, DOCKERFILE_ENTRY);
        assert_eq!(last_content, "FROM alpine\nRUN echo test");
    }

    #[test]
    fn test_create_context_dockerfile_outside_context() {
        let temp_dir = tempdir().unwrap();
        let context = temp_dir.path().join("app");
        fs::create_dir(&context).unwrap();
        fs::write(context.join("main.rs"), "fn main() {}").unwrap();

        let dockerfile = temp_dir.path().join("Dockerfile");
        fs::write(&dockerfile, "FROM rust").unwrap();

        let archive = ContextBuilder::create_context(&context, &dockerfile).unwrap();
        let entries = entries(archive);
        assert!(entries.iter().any(|(p, c)| p == DOCKERFILE_ENTRY && c == "FROM rust"));
    }

    #[test]
    fn test_create_context_missing_dockerfile() {
        let temp_dir = tempdir().unwrap();
        let result =
            ContextBuilder::create_context(temp_dir.path(), &temp_dir.path().join("Dockerfile"));
        assert!(matches!(result, Err(BuildError::DockerfileNotFound(_))));
    }

    #[test]
    fn test_create_context_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        let result = ContextBuilder::create_context(&missing, &missing.join("Dockerfile"));
        assert!(matches!(result, Err(BuildError::ContextNotFound(_))));
    }
}
