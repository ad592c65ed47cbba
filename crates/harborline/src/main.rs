mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use harborline::{ClientConfig, ImageOps};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harborline")]
#[command(about = "Build, push and verify container images against a Harbor registry", long_about = None)]
struct Cli {
    /// Docker デーモンのエンドポイント（例: tcp://10.0.0.5:2375）
    #[arg(long, global = true, env = "DOCKER_HOST")]
    docker_host: Option<String>,
    /// 設定ファイル
    #[arg(short, long, global = true, env = "HARBORLINE_CONFIG")]
    config: Option<PathBuf>,
    /// debug ログを出力
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルド
    Build {
        /// 付与するイメージ名（例: harbor.example.com/proj/app:1.0）
        image: String,
        /// ビルドコンテキストのディレクトリ、または Dockerfile
        #[arg(default_value = ".")]
        path: PathBuf,
        /// ビルド引数（KEY=VALUE、複数指定可）
        #[arg(long = "build-arg", value_name = "KEY=VALUE")]
        build_args: Vec<String>,
    },
    /// イメージを pull
    Pull {
        image: String,
        /// レジストリ認証情報を使う
        #[arg(short, long)]
        auth: bool,
        /// 待機の上限（秒）
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// イメージを push
    Push {
        image: String,
        /// レジストリ認証情報を使う
        #[arg(short, long)]
        auth: bool,
        /// 待機の上限（秒）
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// 既存イメージに別名のタグを付ける
    Tag { source: String, target: String },
    /// ローカルのイメージ一覧
    Images {
        /// リポジトリ名で絞り込む
        filter: Option<String>,
    },
    /// ローカルのイメージを削除
    Rmi {
        /// イメージ名またはID
        image: String,
        /// ID として扱う
        #[arg(long)]
        id: bool,
    },
    /// レジストリにイメージ（タグ）が存在するか確認
    Exists { image: String },
    /// レジストリからタグを削除
    Untag { image: String },
    /// レジストリのタグ一覧
    Tags { namespace: String, repository: String },
    /// プロジェクトIDを表示
    #[command(name = "project-id")]
    ProjectId { name: String },
    /// ラベル操作
    Label {
        #[command(subcommand)]
        command: LabelCommands,
    },
    /// バージョン情報を表示
    Version,
}

#[derive(Subcommand)]
enum LabelCommands {
    /// 名前でラベルを取得
    Get {
        name: String,
        /// プロジェクトID（省略時はグローバル）
        #[arg(short, long)]
        project_id: Option<i64>,
    },
    /// ラベルを作成
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        project_id: Option<i64>,
    },
    /// ラベルを更新
    Update {
        id: i64,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?.apply_env(),
        None => ClientConfig::load()?,
    };
    if let Some(host) = &cli.docker_host {
        config.docker_host = Some(host.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Versionコマンドは設定不要
    if matches!(cli.command, Commands::Version) {
        println!("harborline {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&cli)?;
    tracing::debug!("Config: {:?}", config);

    let ops = ImageOps::from_config(&config)?;

    let outcome = match cli.command {
        Commands::Build {
            image,
            path,
            build_args,
        } => commands::image::handle_build(&ops, &image, &path, &build_args).await,
        Commands::Pull {
            image,
            auth,
            timeout,
        } => commands::image::handle_pull(&ops, &image, auth, timeout).await,
        Commands::Push {
            image,
            auth,
            timeout,
        } => commands::image::handle_push(&ops, &image, auth, timeout).await,
        Commands::Tag { source, target } => {
            commands::image::handle_tag(&ops, &source, &target).await
        }
        Commands::Images { filter } => commands::image::handle_images(&ops, filter.as_deref()).await,
        Commands::Rmi { image, id } => commands::image::handle_rmi(&ops, &image, id).await,
        Commands::Exists { image } => commands::registry::handle_exists(&ops, &image).await,
        Commands::Untag { image } => commands::registry::handle_untag(&ops, &image).await,
        Commands::Tags {
            namespace,
            repository,
        } => commands::registry::handle_tags(&ops, &namespace, &repository).await,
        Commands::ProjectId { name } => commands::registry::handle_project_id(&ops, &name).await,
        Commands::Label { command } => match command {
            LabelCommands::Get { name, project_id } => {
                commands::registry::handle_label_get(&ops, &name, project_id).await
            }
            LabelCommands::Add {
                name,
                description,
                project_id,
            } => commands::registry::handle_label_add(&ops, &name, description, project_id).await,
            LabelCommands::Update {
                id,
                name,
                description,
            } => commands::registry::handle_label_update(&ops, id, &name, description).await,
        },
        Commands::Version => Ok(()),
    };

    if let Err(e) = outcome {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
