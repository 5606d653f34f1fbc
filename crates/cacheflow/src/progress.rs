use cacheflow_cloud_cloudways::{Observation, WaitProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// オペレーション待機中のスピナー
pub struct WaitSpinner {
    progress_bar: ProgressBar,
}

impl WaitSpinner {
    pub fn new(operation_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("オペレーション {} の完了を待機中...", operation_id));
        pb.enable_steady_tick(Duration::from_millis(120));

        Self { progress_bar: pb }
    }

    /// 未完了だった試行を1件反映
    pub fn update(&self, progress: &WaitProgress) {
        let detail = match &progress.observation {
            Observation::Pending { message: Some(message) } => format!(" - {}", message),
            Observation::Pending { message: None } => String::new(),
            Observation::Missing => " - operation が応答にありません".to_string(),
        };

        self.progress_bar.set_message(format!(
            "オペレーション {} 待機中 ({}/{}){}",
            progress.operation_id, progress.attempt, progress.max_attempts, detail
        ));
    }

    pub fn finish_success(&self) {
        self.progress_bar.finish_with_message("オペレーション完了 ✓");
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("オペレーション失敗: {}", error));
    }
}
