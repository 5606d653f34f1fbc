pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 2] = ["cacheflow.yaml", ".cacheflow.yaml"];

/// cacheflow.yaml の設定（すべて省略可能）
///
/// 認証情報はこのファイルに書けない。未知のキー（`email` / `api_key` を含む）はエラー。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_base: Option<String>,
    pub server_id: Option<u64>,
    pub action: Option<String>,
    pub wait: WaitSettings,
}

/// ポーリング設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitSettings {
    pub max_attempts: Option<u32>,
    pub interval_ms: Option<u64>,
}

impl Settings {
    /// 設定ファイルを探して読み込む（見つからなければ空の設定）
    pub fn load() -> Result<Self> {
        match find_settings_file()? {
            Some(path) => load_settings(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(api_base) = &self.api_base {
            if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base must be an http(s) URL: {}",
                    api_base
                )));
            }
        }
        Ok(())
    }
}

/// cacheflow のユーザー設定ディレクトリ
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cacheflow"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 CACHEFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: cacheflow.yaml, .cacheflow.yaml
/// 3. ~/.config/cacheflow/config.yaml (グローバル設定)
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("CACHEFLOW_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!(
            "CACHEFLOW_CONFIG_PATH points to a missing file: {}",
            path.display()
        );
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. グローバル設定ファイル
    if let Some(dir) = config_dir() {
        let global_config = dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 設定ファイルを読み込む
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    // 空ファイルは空の設定として扱う
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    let settings: Settings = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}
