//! Docker を使った [`ImageEngine`] 実装

use crate::builder::ImageBuilder;
use crate::context::ContextBuilder;
use crate::pusher::{ImagePusher, validate_tag};
use crate::resolver::BuildResolver;
use anyhow::Context;
use bollard::Docker;
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tagflow_core::{AppDefinition, ImageEngine};

pub struct DockerEngine {
    builder: ImageBuilder,
    pusher: ImagePusher,
    resolver: BuildResolver,
}

impl DockerEngine {
    /// `project_root` はアプリケーションの context の基準ディレクトリ
    pub fn new(docker: Docker, project_root: PathBuf) -> Self {
        Self {
            builder: ImageBuilder::new(docker.clone()),
            pusher: ImagePusher::new(docker),
            resolver: BuildResolver::new(project_root),
        }
    }

    /// ローカルのDockerデーモンに接続（エラーハンドリング付き）
    pub async fn connect(project_root: PathBuf) -> anyhow::Result<Self> {
        let docker = match Docker::connect_with_local_defaults() {
            Ok(docker) => docker,
            Err(e) => {
                print_connection_help(&e);
                anyhow::bail!("Docker接続に失敗しました");
            }
        };

        // 接続テスト
        if let Err(e) = docker.ping().await {
            print_connection_help(&e);
            anyhow::bail!("Docker接続に失敗しました");
        }

        Ok(Self::new(docker, project_root))
    }
}

fn print_connection_help(e: &bollard::errors::Error) {
    eprintln!();
    eprintln!("{}", "✗ Docker接続エラー".red().bold());
    eprintln!();
    eprintln!("{}", "原因:".yellow());
    eprintln!("  {}", e);
    eprintln!();
    eprintln!("{}", "解決方法:".yellow());
    eprintln!("  • Dockerが起動しているか確認してください");
    eprintln!("  • DOCKER_HOST が正しいか確認してください");
    eprintln!("  • docker ps コマンドが正常に動作するか確認してください");
}

impl ImageEngine for DockerEngine {
    async fn build(&self, app: &AppDefinition, tag: &str, no_cache: bool) -> anyhow::Result<()> {
        validate_tag(tag)?;

        let context = self.resolver.resolve_context(app)?;
        let dockerfile = self.resolver.resolve_dockerfile(app)?;
        let build_args = self.resolver.resolve_build_args(&app.build_arg);

        let context_data = ContextBuilder::create_context(&context, &dockerfile)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;

        self.builder
            .build_image(context_data, &app.reference(tag), build_args, no_cache)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))
    }

    async fn tag(&self, app: &AppDefinition, source: &str, target: &str) -> anyhow::Result<()> {
        validate_tag(target)?;
        self.builder
            .tag_image(&app.reference(source), &app.image, target)
            .await?;
        Ok(())
    }

    async fn push(&self, image: &str, tag: &str) -> anyhow::Result<()> {
        self.pusher
            .push(image, tag)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        Ok(())
    }

    async fn pull(&self, image: &str, tag: &str) -> anyhow::Result<()> {
        self.pusher.pull(image, tag).await?;
        Ok(())
    }

    async fn remove(&self, reference: &str) -> anyhow::Result<()> {
        self.builder
            .remove_image(reference)
            .await
            .with_context(|| format!("イメージを削除できません: {}", reference))
    }

    async fn list_existing_tags(&self, app: &AppDefinition) -> anyhow::Result<BTreeSet<String>> {
        Ok(self.builder.list_tags(&app.image).await?)
    }

    async fn exists(&self, app: &AppDefinition, tag: &str) -> anyhow::Result<bool> {
        Ok(self.builder.image_exists(&app.reference(tag)).await?)
    }
}
