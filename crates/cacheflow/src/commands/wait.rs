use crate::progress::WaitSpinner;
use cacheflow_cloud_cloudways::{CloudwaysClient, Credentials, WaitConfig};
use cacheflow_config::Settings;
use colored::Colorize;
use std::time::Duration;

/// `cacheflow wait` の引数
pub struct WaitOptions {
    pub operation_id: String,
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub max_attempts: Option<u32>,
    pub interval_ms: Option<u64>,
}

/// 待機設定の決定（引数 > 設定ファイル > 既定値）
fn resolve_wait(options: &WaitOptions, settings: &Settings) -> WaitConfig {
    let defaults = WaitConfig::default();
    WaitConfig::new(
        options
            .max_attempts
            .or(settings.wait.max_attempts)
            .unwrap_or(defaults.max_attempts),
        options
            .interval_ms
            .or(settings.wait.interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval),
    )
}

pub async fn handle(
    client: &CloudwaysClient,
    settings: &Settings,
    options: WaitOptions,
) -> anyhow::Result<()> {
    let wait = resolve_wait(&options, settings);
    let credentials = Credentials::resolve(options.email, options.api_key)?;
    let operation_id = options.operation_id;

    let token = client
        .obtain_access_token(&credentials.email, &credentials.api_key)
        .await?;

    println!(
        "{}",
        format!(
            "オペレーション {} を最大 {} 回確認します（{}ms 間隔）",
            operation_id,
            wait.max_attempts,
            wait.interval.as_millis()
        )
        .yellow()
    );

    let spinner = WaitSpinner::new(&operation_id);
    let result = client
        .wait_for_completion_with(&token, &operation_id, &wait, |progress| {
            spinner.update(progress)
        })
        .await;

    let operation = match result {
        Ok(operation) => {
            spinner.finish_success();
            operation
        }
        Err(e) => {
            spinner.finish_error(&e.to_string());
            return Err(e.into());
        }
    };

    println!();
    println!(
        "{}",
        format!("✓ オペレーション {} が完了しました", operation_id)
            .green()
            .bold()
    );
    if let Some(message) = operation.message {
        println!("  {}", message.dimmed());
    }

    Ok(())
}
