//! 操作の実行
//!
//! アプリケーションを登録順に1つずつ処理し、フック・ビルド判定・
//! イメージエンジン呼び出しを順番に行います。並行処理は行いません。

use crate::engine::{CommandExecutor, CommandStatus, ImageEngine};
use crate::error::{Result, TagflowError};
use crate::model::{AppDefinition, AppRegistry, RepositoryState, RunOptions};
use crate::planner::{TagAction, UntaggedReason, plan_build};
use crate::purge::select_deletable;
use crate::report::Reporter;
use crate::tags::resolve_tags;

/// トップレベルの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Build,
    Test,
    Push,
    Pull,
    Purge,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Build => "build",
            Operation::Test => "test",
            Operation::Push => "push",
            Operation::Pull => "pull",
            Operation::Purge => "purge",
        }
    }
}

/// 操作に必要なリポジトリの状態を満たしているか
///
/// push はコミット済みでクリーンな作業ツリー、purge はリポジトリが必要。
pub fn check_repository(operation: Operation, repo: Option<&RepositoryState>) -> Result<()> {
    match (operation, repo) {
        (Operation::Push, None) => Err(TagflowError::NoGit { operation: "push" }),
        (Operation::Push, Some(r)) if r.dirty => Err(TagflowError::GitDirty { operation: "push" }),
        (Operation::Purge, None) => Err(TagflowError::NoGit { operation: "purge" }),
        _ => Ok(()),
    }
}

/// push/pull の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Push,
    Pull,
}

#[derive(Debug, Clone, Copy)]
enum HookKind {
    Pre,
    Post,
}

impl HookKind {
    fn commands(self, app: &AppDefinition) -> &[String] {
        match self {
            HookKind::Pre => &app.pre,
            HookKind::Post => &app.post,
        }
    }

    fn name(self) -> &'static str {
        match self {
            HookKind::Pre => "pre",
            HookKind::Post => "post",
        }
    }
}

pub struct Orchestrator<'a, E, X> {
    registry: &'a AppRegistry,
    engine: &'a E,
    executor: &'a X,
    repo: Option<RepositoryState>,
    opts: RunOptions,
    reporter: Reporter,
}

impl<'a, E, X> Orchestrator<'a, E, X>
where
    E: ImageEngine,
    X: CommandExecutor,
{
    pub fn new(registry: &'a AppRegistry, engine: &'a E, executor: &'a X) -> Self {
        Self {
            registry,
            engine,
            executor,
            repo: None,
            opts: RunOptions::default(),
            reporter: Reporter::default(),
        }
    }

    /// 実行開始時に取得したリポジトリ状態（リポジトリ外では `None`）
    pub fn with_repository(mut self, repo: Option<RepositoryState>) -> Self {
        self.repo = repo;
        self
    }

    pub fn with_options(mut self, opts: RunOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub async fn run(&self, operation: Operation) -> Result<()> {
        tracing::debug!(
            "Running {} for {} app(s)",
            operation.name(),
            self.registry.len()
        );
        match operation {
            Operation::Build => self.build().await,
            Operation::Test => run_tests(self.registry, self.executor, self.reporter),
            Operation::Push => self.transfer(TransferDirection::Push).await,
            Operation::Pull => self.transfer(TransferDirection::Pull).await,
            Operation::Purge => self.purge().await,
        }
    }

    /// 全アプリケーションをビルド
    ///
    /// pre フックが失敗したアプリケーションは中断して次へ進み、最後に失敗を返す。
    /// ビルド・タグ付けの失敗はその時点で全体を中断する。
    pub async fn build(&self) -> Result<()> {
        let mut aborted: Option<TagflowError> = None;

        for app in self.registry.apps() {
            if let Err(e) = self.run_hooks(app, HookKind::Pre) {
                self.reporter.error(format!(
                    "Pre execution returned non-zero status, skipping {}",
                    app.name
                ));
                tracing::debug!("pre hook of {} failed: {}", app.name, e);
                aborted.get_or_insert(TagflowError::PreHookFailed {
                    app: app.name.clone(),
                });
                continue;
            }

            if app.has_image() {
                self.build_app(app).await?;
            } else {
                self.reporter
                    .debug(format!("{} has no image, running hooks only", app.name));
            }

            // post フックの失敗は記録のみ
            if let Err(e) = self.run_hooks(app, HookKind::Post) {
                self.reporter
                    .error(format!("Post execution returned non-zero status: {}", e));
            }
        }

        match aborted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn build_app(&self, app: &AppDefinition) -> Result<()> {
        let repo = self.repo.as_ref();
        let revision = repo.map(|r| r.revision_tag(self.opts.long_sha).to_string());

        // スキップ可能な場合だけ既存イメージを確認する
        let image_exists = match (repo, revision.as_deref()) {
            (Some(repo), Some(rev)) if !repo.dirty && !self.opts.force => self
                .engine
                .exists(app, rev)
                .await
                .map_err(|e| TagflowError::Engine(format!("{:#}", e)))?,
            _ => false,
        };

        let plan = plan_build(repo, image_exists, &self.opts);

        if plan.build_required {
            if repo.is_none() {
                self.reporter
                    .debug("No local git repository found, just building latest");
            }
            self.reporter
                .info(format!("Building image {}", app.reference("latest")));
            self.engine
                .build(app, "latest", self.opts.force)
                .await
                .map_err(|e| TagflowError::BuildFailed {
                    image: app.reference("latest"),
                    message: format!("{:#}", e),
                })?;
        } else if let Some(rev) = revision.as_deref() {
            self.reporter.info(format!(
                "Skipping build of {} - image is already built",
                app.reference(rev)
            ));
        }

        if let Some(UntaggedReason::DirtyWorkingTree) = plan.untagged {
            self.reporter.debug(format!(
                "Skipping tag of {} - local changes exist",
                app.reference(revision.as_deref().unwrap_or("latest"))
            ));
        }

        for action in &plan.tag_actions {
            self.apply_tag(app, action).await?;
        }

        Ok(())
    }

    async fn apply_tag(&self, app: &AppDefinition, action: &TagAction) -> Result<()> {
        self.reporter.info(format!(
            "Tagging image {} as {}",
            app.reference(&action.source),
            app.reference(&action.target)
        ));
        self.engine
            .tag(app, &action.source, &action.target)
            .await
            .map_err(|e| TagflowError::TagFailed {
                image: app.image.clone(),
                from: action.source.clone(),
                to: action.target.clone(),
                message: format!("{:#}", e),
            })
    }

    /// タグ一覧を順に push/pull する
    ///
    /// push はコミット済みでクリーンな作業ツリーが必要。最初の失敗で中断する。
    pub async fn transfer(&self, direction: TransferDirection) -> Result<()> {
        let repo = self.repo.as_ref();

        if direction == TransferDirection::Push {
            check_repository(Operation::Push, repo)?;
        }

        for app in self.registry.apps() {
            if !app.has_image() {
                self.reporter
                    .debug(format!("{} has no image, nothing to transfer", app.name));
                continue;
            }

            let plan = resolve_tags(repo, &self.opts);
            for tag in plan.iter() {
                match direction {
                    TransferDirection::Push => {
                        self.reporter
                            .info(format!("Pushing image {}", app.reference(tag)));
                        self.engine.push(&app.image, tag).await.map_err(|e| {
                            TagflowError::PushFailed {
                                image: app.image.clone(),
                                tag: tag.to_string(),
                                message: format!("{:#}", e),
                            }
                        })?;
                    }
                    TransferDirection::Pull => {
                        self.reporter
                            .info(format!("Pulling image {}", app.reference(tag)));
                        self.engine.pull(&app.image, tag).await.map_err(|e| {
                            TagflowError::PullFailed {
                                image: app.image.clone(),
                                tag: tag.to_string(),
                                message: format!("{:#}", e),
                            }
                        })?;
                    }
                }
            }
        }

        Ok(())
    }

    /// 不要なイメージを削除
    ///
    /// 削除に失敗したアプリケーションは残りをスキップして次へ進み、最後に失敗を返す。
    /// 途中まで削除された状態は再実行で解消される。
    pub async fn purge(&self) -> Result<()> {
        let repo = self
            .repo
            .as_ref()
            .ok_or(TagflowError::NoGit { operation: "purge" })?;
        let mut failed: Option<TagflowError> = None;

        for app in self.registry.apps() {
            if !app.has_image() {
                continue;
            }

            let existing = self
                .engine
                .list_existing_tags(app)
                .await
                .map_err(|e| TagflowError::Engine(format!("{:#}", e)))?;
            let deletable = select_deletable(app, repo, &self.opts, &existing);

            if deletable.is_empty() {
                self.reporter
                    .debug(format!("No stale images found for {}", app.image));
                continue;
            }

            for reference in &deletable {
                self.reporter.info(format!("Deleting image {}", reference));
                if let Err(e) = self.engine.remove(reference).await {
                    self.reporter.error(format!(
                        "Deleting image failed: {}, skipping the rest of {}",
                        reference, app.name
                    ));
                    failed.get_or_insert(TagflowError::DeleteImageFailed {
                        image: reference.clone(),
                        message: format!("{:#}", e),
                    });
                    break;
                }
            }
        }

        match failed {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn run_hooks(&self, app: &AppDefinition, kind: HookKind) -> Result<()> {
        for command in kind.commands(app) {
            self.reporter
                .info(format!("Running {} command: {}", kind.name(), command));
            run_command(self.executor, command)?;
        }
        Ok(())
    }
}

/// 全アプリケーションのテストコマンドを実行
///
/// イメージエンジンを使わないので単独で呼べる。最初の失敗で中断する。
pub fn run_tests(
    registry: &AppRegistry,
    executor: &impl CommandExecutor,
    reporter: Reporter,
) -> Result<()> {
    for app in registry.apps() {
        for command in &app.test {
            reporter.info(format!("Running test command: {}", command));
            if let Err(e) = run_command(executor, command) {
                reporter.error("Test execution returned non-zero status");
                return Err(e);
            }
        }
    }
    Ok(())
}

fn run_command(executor: &impl CommandExecutor, command: &str) -> Result<()> {
    match executor.execute(command) {
        Ok(CommandStatus::Success) => Ok(()),
        Ok(CommandStatus::Failed(code)) => Err(TagflowError::CommandFailed {
            command: command.to_string(),
            message: match code {
                Some(code) => format!("終了コード {}", code),
                None => "シグナルにより終了しました".to_string(),
            },
        }),
        Err(e) => Err(TagflowError::CommandFailed {
            command: command.to_string(),
            message: format!("{:#}", e),
        }),
    }
}
