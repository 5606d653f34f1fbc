use cacheflow_cloud_cloudways::{CloudwaysClient, Credentials, ServerId, VarnishAction};
use cacheflow_config::Settings;
use colored::Colorize;

/// `cacheflow varnish` の引数
pub struct VarnishOptions {
    pub action: Option<String>,
    pub server: Option<String>,
    pub email: Option<String>,
    pub api_key: Option<String>,
}

/// アクションの決定（引数 > 設定ファイル > purge）
fn resolve_action(options: &VarnishOptions, settings: &Settings) -> anyhow::Result<VarnishAction> {
    let raw = options
        .action
        .as_deref()
        .or(settings.action.as_deref())
        .unwrap_or("purge");
    Ok(raw.parse()?)
}

/// サーバーIDの決定（引数/環境変数 > 設定ファイル）
fn resolve_server(options: &VarnishOptions, settings: &Settings) -> anyhow::Result<ServerId> {
    match (&options.server, settings.server_id) {
        (Some(raw), _) => Ok(raw.parse()?),
        (None, Some(id)) => Ok(ServerId::new(id)),
        (None, None) => Err(anyhow::anyhow!(
            "サーバーIDが指定されていません。--server か CLOUDWAYS_SERVER_ID、または設定ファイルの server_id で指定してください"
        )),
    }
}

pub async fn handle(
    client: &CloudwaysClient,
    settings: &Settings,
    options: VarnishOptions,
) -> anyhow::Result<()> {
    // ネットワークに出る前に入力を検証
    let action = resolve_action(&options, settings)?;
    let server_id = resolve_server(&options, settings)?;
    let credentials = Credentials::resolve(options.email, options.api_key)?;

    println!(
        "{}",
        format!("Varnish {} をサーバー {} に送信中...", action, server_id).yellow()
    );

    client.run_action(&credentials, server_id, action).await?;

    println!(
        "{}",
        format!("✓ Varnish {} が完了しました（サーバー {}）", action, server_id)
            .green()
            .bold()
    );

    Ok(())
}
