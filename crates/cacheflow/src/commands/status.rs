use cacheflow_cloud_cloudways::{CloudwaysClient, Credentials};
use colored::Colorize;

pub async fn handle(
    client: &CloudwaysClient,
    operation_id: &str,
    email: Option<String>,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let credentials = Credentials::resolve(email, api_key)?;
    let token = client
        .obtain_access_token(&credentials.email, &credentials.api_key)
        .await?;

    let status = client.get_operation_status(&token, operation_id).await?;

    match &status.operation {
        Some(operation) if operation.is_completed => {
            println!(
                "{}",
                format!("✓ オペレーション {} は完了しています", operation_id)
                    .green()
                    .bold()
            );
        }
        Some(_) => {
            println!(
                "{}",
                format!("… オペレーション {} は実行中です", operation_id).yellow()
            );
        }
        None => {
            println!(
                "{}",
                format!(
                    "ℹ オペレーション {} の情報が応答に含まれていません",
                    operation_id
                )
                .dimmed()
            );
        }
    }
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}
