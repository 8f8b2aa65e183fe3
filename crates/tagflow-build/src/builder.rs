use crate::context::DOCKERFILE_ENTRY;
use crate::error::{BuildError, BuildResult};
use crate::progress::BuildProgress;
use bollard::Docker;
use colored::Colorize;
use futures_util::stream::StreamExt;
use std::collections::{BTreeSet, HashMap};

/// ローカルのイメージを操作する
pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをビルド
    ///
    /// `context_data` は [`crate::ContextBuilder`] で作成したアーカイブ。
    pub async fn build_image(
        &self,
        context_data: Vec<u8>,
        reference: &str,
        build_args: HashMap<String, String>,
        no_cache: bool,
    ) -> BuildResult<()> {
        tracing::info!("Building image: {}", reference);

        let build_args_refs: HashMap<&str, &str> = build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: DOCKERFILE_ENTRY,
            t: reference,
            buildargs: build_args_refs,
            nocache: no_cache,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        let progress = BuildProgress::new(reference);
        while let Some(msg) = stream.next().await {
            let result = match msg {
                Ok(output) => self.handle_build_output(output, &progress),
                Err(e) => Err(BuildError::DockerConnection(e)),
            };
            if let Err(e) = result {
                progress.finish_error(&e.to_string());
                return Err(e);
            }
        }
        progress.finish_success();

        tracing::info!("Successfully built: {}", reference);
        Ok(())
    }

    /// ビルド出力の処理
    fn handle_build_output(
        &self,
        output: bollard::models::BuildInfo,
        progress: &BuildProgress,
    ) -> BuildResult<()> {
        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(BuildError::BuildFailed(error_msg));
        }

        if let Some(stream) = output.stream {
            let line = stream.trim_end();
            if !line.is_empty() {
                progress.println(line);
            }
        }

        if let Some(status) = output.status {
            progress.println(&status.cyan().to_string());
        }

        Ok(())
    }

    /// `source`（`image:tag`）に `repo:tag` を付ける
    pub async fn tag_image(&self, source: &str, repo: &str, tag: &str) -> BuildResult<()> {
        tracing::debug!("Tagging {} as {}:{}", source, repo, tag);

        let options = bollard::query_parameters::TagImageOptions {
            repo: Some(repo.to_string()),
            tag: Some(tag.to_string()),
        };

        self.docker.tag_image(source, Some(options)).await?;
        Ok(())
    }

    /// イメージの存在確認
    pub async fn image_exists(&self, reference: &str) -> BuildResult<bool> {
        match self.docker.inspect_image(reference).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(BuildError::DockerConnection(e)),
        }
    }

    /// リポジトリ `image` に付いている `image:tag` の一覧
    pub async fn list_tags(&self, image: &str) -> BuildResult<BTreeSet<String>> {
        let mut filters = HashMap::new();
        filters.insert("reference".to_string(), vec![image.to_string()]);

        let options = bollard::query_parameters::ListImagesOptions {
            filters: Some(filters),
            ..Default::default()
        };

        let summaries = self.docker.list_images(Some(options)).await?;
        Ok(filter_repo_tags(
            image,
            summaries.into_iter().flat_map(|summary| summary.repo_tags),
        ))
    }

    /// `image:tag` を削除
    pub async fn remove_image(&self, reference: &str) -> BuildResult<()> {
        self.docker
            .remove_image(
                reference,
                None::<bollard::query_parameters::RemoveImageOptions>,
                None,
            )
            .await?;
        Ok(())
    }
}

/// 他のリポジトリのタグを除く
///
/// `reference` フィルタは `image` 以外の名前にもマッチしうる。
fn filter_repo_tags(image: &str, repo_tags: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    let prefix = format!("{}:", image);
    repo_tags
        .into_iter()
        .filter(|reference| {
            reference
                .strip_prefix(&prefix)
                .is_some_and(|tag| !tag.is_empty() && !tag.contains('/'))
        })
        .collect()
}
