mod commands;
mod progress;

use cacheflow_cloud_cloudways::{CloudwaysClient, CloudwaysConfig};
use cacheflow_config::Settings;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cacheflow")]
#[command(about = "Cloudways の Varnish キャッシュを操作し、完了まで見届ける", long_about = None)]
struct Cli {
    /// Cloudways API のベースURL（省略時は設定ファイルまたは公式エンドポイント）
    #[arg(long, global = true, env = "CLOUDWAYS_API_BASE")]
    api_base: Option<String>,

    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Cloudways の認証情報（設定ファイルには保存しない）
///
/// 省略した値は CLOUDWAYS_EMAIL / CLOUDWAYS_API_KEY から読み込む
#[derive(Args)]
struct AuthArgs {
    /// アカウントのメールアドレス（省略時は CLOUDWAYS_EMAIL）
    #[arg(long)]
    email: Option<String>,

    /// API キー（省略時は CLOUDWAYS_API_KEY）
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Varnish アクションを実行
    Varnish {
        /// アクション (enable, disable, purge)。省略時は設定ファイルまたは purge
        action: Option<String>,
        /// 対象サーバーID
        #[arg(short = 's', long = "server", env = "CLOUDWAYS_SERVER_ID")]
        server: Option<String>,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// オペレーションが完了するまで一定間隔で状態を確認
    Wait {
        /// オペレーションID
        operation_id: String,
        #[command(flatten)]
        auth: AuthArgs,
        /// 状態確認の最大回数
        #[arg(long)]
        max_attempts: Option<u32>,
        /// 状態確認の間隔（ミリ秒）
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// オペレーションの状態を1回だけ取得
    Status {
        /// オペレーションID
        operation_id: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if verbose {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }

    // stdout は結果表示に使うので、ログは stderr に出力
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// API クライアントを作成（フラグ/環境変数 > 設定ファイル > 公式エンドポイント）
fn build_client(api_base: Option<String>, settings: &Settings) -> anyhow::Result<CloudwaysClient> {
    let config = match api_base.or_else(|| settings.api_base.clone()) {
        Some(api_base) => CloudwaysConfig::with_api_base(api_base)?,
        None => CloudwaysConfig::default(),
    };
    tracing::debug!("Using Cloudways API at {}", config.api_base);
    Ok(CloudwaysClient::with_config(config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("cacheflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Varnish { action, server, auth } => {
            let settings = Settings::load()?;
            let client = build_client(cli.api_base, &settings)?;
            commands::varnish::handle(
                &client,
                &settings,
                commands::varnish::VarnishOptions {
                    action,
                    server,
                    email: auth.email,
                    api_key: auth.api_key,
                },
            )
            .await
        }
        Commands::Wait {
            operation_id,
            auth,
            max_attempts,
            interval_ms,
        } => {
            let settings = Settings::load()?;
            let client = build_client(cli.api_base, &settings)?;
            commands::wait::handle(
                &client,
                &settings,
                commands::wait::WaitOptions {
                    operation_id,
                    email: auth.email,
                    api_key: auth.api_key,
                    max_attempts,
                    interval_ms,
                },
            )
            .await
        }
        Commands::Status { operation_id, auth } => {
            let settings = Settings::load()?;
            let client = build_client(cli.api_base, &settings)?;
            commands::status::handle(&client, &operation_id, auth.email, auth.api_key).await
        }
    }
}
