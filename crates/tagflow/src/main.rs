mod commands;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tagflow_core::{Operation, Reporter, RunOptions};

#[derive(Parser)]
#[command(name = "tagflow")]
#[command(about = "Gitの状態からコンテナイメージをビルド・タグ付け・配布する", long_about = None)]
struct Cli {
    /// 設定ファイルのパス（環境変数 TAGFLOW_CONFIG でも指定可）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// 設定ファイルがない場合に推論するイメージの名前空間
    #[arg(short = 'N', long, env = "TAGFLOW_NAMESPACE", global = true)]
    namespace: Option<String>,
    /// デバッグ出力を有効にする
    #[arg(short = 'D', long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドしてタグ付け
    Build(RunArgs),
    /// test コマンドを実行
    Test(RunArgs),
    /// タグ付けしたイメージをレジストリにプッシュ
    Push(RunArgs),
    /// タグ付けされたイメージをレジストリからプル
    Pull(RunArgs),
    /// 現在のリビジョン・ブランチに関係しないローカルイメージを削除
    Purge(RunArgs),
    /// バージョン情報を表示
    Version,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// 対象アプリケーション（省略時は全て）
    apps: Vec<String>,
    /// 追加で付けるタグ
    #[arg(short, long)]
    tag: Option<String>,
    /// 既存イメージがあってもキャッシュなしで再ビルド
    #[arg(short, long)]
    force: bool,
    /// HEADを指す全てのローカルブランチをタグにする
    #[arg(short, long)]
    all_branches: bool,
    /// 省略しないコミットハッシュを使う
    #[arg(short, long)]
    long_sha: bool,
    /// ブランチ名のタグを使う
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    branch_tags: bool,
    /// コミットハッシュのタグを使う
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    commit_tags: bool,
}

impl From<&RunArgs> for RunOptions {
    fn from(args: &RunArgs) -> Self {
        Self {
            tag: args.tag.clone(),
            force: args.force,
            long_sha: args.long_sha,
            all_branches: args.all_branches,
            branch_tags: args.branch_tags,
            commit_tags: args.commit_tags,
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.debug);
    let reporter = Reporter::new(cli.debug);

    let (operation, args) = match cli.command {
        // Versionコマンドは設定ファイル不要
        Commands::Version => {
            println!("tagflow {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Commands::Build(args) => (Operation::Build, args),
        Commands::Test(args) => (Operation::Test, args),
        Commands::Push(args) => (Operation::Push, args),
        Commands::Pull(args) => (Operation::Pull, args),
        Commands::Purge(args) => (Operation::Purge, args),
    };

    let invocation = commands::Invocation {
        operation,
        apps: args.apps.clone(),
        options: RunOptions::from(&args),
        config: cli.config,
        namespace: cli.namespace,
        reporter,
    };

    if let Err(e) = commands::run(invocation).await {
        let code = e.exit_status().code();
        tracing::debug!("{} failed with exit code {}: {:?}", operation.name(), code, e);
        reporter.error(e.to_string());
        std::process::exit(code);
    }
}
