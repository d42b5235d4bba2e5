// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込み、検証する
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        debug!(path = %path.display(), vendor = %config.vendor, "Loaded config");
        Ok(config)
    }

    /// YAML文字列から設定を読み込み、検証する
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Config> {
        let config: Config =
            serde_saphyr::from_str(content).with_context(|| "Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// デフォルトパスから設定を読み込む
    pub fn load_default() -> Result<Config> {
        let path = Path::new(Config::DEFAULT_CONFIG_PATH);
        Self::from_file(path)
    }

    /// 設定ファイルがあれば読み込む
    ///
    /// ファイルが存在しない場合はNoneを返し、存在するが不正な場合はエラーです。
    pub fn load_optional(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }
}
