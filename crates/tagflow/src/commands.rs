//! サブコマンドの実行

use std::path::PathBuf;
use tagflow_build::DockerEngine;
use tagflow_config::{load_registry, resolve_namespace};
use tagflow_core::{
    Operation, Orchestrator, Reporter, Result, RunOptions, ShellExecutor, TagflowError,
    capture_state, check_repository, run_tests,
};
use tagflow_git::GitRepository;

/// 1回の実行に必要な入力
pub struct Invocation {
    pub operation: Operation,
    pub apps: Vec<String>,
    pub options: RunOptions,
    pub config: Option<PathBuf>,
    pub namespace: Option<String>,
    pub reporter: Reporter,
}

pub async fn run(invocation: Invocation) -> Result<()> {
    let Invocation {
        operation,
        apps,
        options,
        config,
        namespace,
        reporter,
    } = invocation;

    let namespace = resolve_namespace(namespace.as_deref());
    let (mut registry, _) = load_registry(config.as_deref(), &namespace, &reporter)?;

    if !registry.filter(&apps) {
        reporter.debug(format!("Filtered applications: {}", apps.join(", ")));
    }
    if registry.is_empty() {
        reporter.warn("No applications to process");
        return Ok(());
    }

    let executor = ShellExecutor::default();

    // test はイメージエンジンもGitも使わない
    if operation == Operation::Test {
        return run_tests(&registry, &executor, reporter);
    }

    let git = GitRepository::discover_current().map_err(|e| TagflowError::Git(format!("{:#}", e)))?;
    let repo = capture_state(&git, options.all_branches)?;
    match &repo {
        Some(state) => reporter.debug(format!(
            "Repository at {} (dirty: {}, branches: {})",
            state.short_revision,
            state.dirty,
            state.branches.join(", ")
        )),
        None => reporter.debug("No local git repository found"),
    }

    check_repository(operation, repo.as_ref())?;

    let engine = DockerEngine::connect(registry.root().to_path_buf())
        .await
        .map_err(|e| TagflowError::Engine(format!("{:#}", e)))?;

    Orchestrator::new(&registry, &engine, &executor)
        .with_repository(repo)
        .with_options(options)
        .with_reporter(reporter)
        .run(operation)
        .await
}
