// detectコマンドハンドラー
//
// 接続先データベースの製品名からベンダーを判定します。

use crate::adapters::database::StatementExecutor;
use crate::adapters::registry;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::vendor::Vendor;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// detectコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DetectCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 環境名
    pub env: String,
    /// 接続URL（環境設定より優先）
    pub url: Option<String>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// detectコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct DetectOutput {
    /// ドライバーが報告した製品名
    pub product_name: String,
    /// 判定したベンダー
    pub vendor: Vendor,
}

impl CommandOutput for DetectOutput {
    fn to_text(&self) -> String {
        format!(
            "{} Detected {} (product name: {})",
            "✓".green(),
            self.vendor.canonical_name().bold(),
            self.product_name
        )
    }
}

/// detectコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct DetectCommandHandler {}

impl DetectCommandHandler {
    /// 新しいDetectCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// detectコマンドを実行
    pub async fn execute(&self, command: &DetectCommand) -> Result<String> {
        debug!(env = %command.env, "Executing detect command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let executor = context
            .connect(&command.env, command.url.as_deref(), None)
            .await?;

        let output = self.detect(&executor).await;
        context.disconnect(executor).await;
        render_output(&output?, &command.format)
    }

    /// 製品名を取得してベンダーを解決
    pub async fn detect(&self, executor: &dyn StatementExecutor) -> Result<DetectOutput> {
        let product_name = executor
            .product_name()
            .await
            .with_context(|| "Failed to read database product name")?;
        let vendor = registry::lookup(&product_name)?;
        debug!(product_name = %product_name, vendor = %vendor, "Detected vendor");

        Ok(DetectOutput {
            product_name,
            vendor,
        })
    }
}
