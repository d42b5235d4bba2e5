// applyコマンドハンドラー
//
// 生成したDDLを接続先データベースに適用します。
// - 接続先の製品名からベンダーを判定
// - 依存関係順にDDLを生成
// - 単一トランザクションで実行（dry-run時は表示のみ）

use crate::adapters::database::StatementExecutor;
use crate::adapters::registry;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{build_batch, render_output, CommandOutput};
use crate::cli::{DdlMode, OutputFormat};
use crate::core::schema::Schema;
use crate::core::vendor::Vendor;
use crate::services::ddl_generator::{DdlGenerator, GeneratorOptions};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// applyコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ApplyCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 環境名
    pub env: String,
    /// 接続URL（環境設定より優先）
    pub url: Option<String>,
    /// スキーマファイルのパス
    pub schema: Option<PathBuf>,
    /// 適用するDDLの種類
    pub mode: DdlMode,
    /// 条件付きDDLを使用する
    pub if_not_exists: bool,
    /// ドライランモード
    pub dry_run: bool,
    /// 接続取得のタイムアウト（秒）
    pub timeout: Option<u64>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// applyコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutput {
    /// 判定したベンダー
    pub vendor: Vendor,
    /// 適用モード
    pub mode: DdlMode,
    /// ドライランかどうか
    pub dry_run: bool,
    /// 実行（dry-run時は実行予定）の文数
    pub statement_count: usize,
    /// 実行した文
    pub statements: Vec<String>,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for ApplyOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// applyコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct ApplyCommandHandler {}

impl ApplyCommandHandler {
    /// 新しいApplyCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// applyコマンドを実行
    pub async fn execute(&self, command: &ApplyCommand) -> Result<String> {
        debug!(env = %command.env, mode = ?command.mode, dry_run = command.dry_run, "Executing apply command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let schema = context.load_schema(command.schema.as_deref())?;

        let mut options = GeneratorOptions::from(&context.output_config());
        options.if_not_exists |= command.if_not_exists;

        let executor = context
            .connect(&command.env, command.url.as_deref(), command.timeout)
            .await?;
        let result = self
            .apply(&executor, &schema, command, options)
            .await;
        context.disconnect(executor).await;

        render_output(&result?, &command.format)
    }

    /// ベンダーを判定してDDLを生成・実行
    pub async fn apply(
        &self,
        executor: &dyn StatementExecutor,
        schema: &Schema,
        command: &ApplyCommand,
        options: GeneratorOptions,
    ) -> Result<ApplyOutput> {
        let product_name = executor
            .product_name()
            .await
            .with_context(|| "Failed to read database product name")?;
        let vendor = registry::lookup(&product_name)?;

        let generator = DdlGenerator::for_vendor(vendor)?.with_options(options);
        let batch = build_batch(&generator, schema, command.mode)?;

        if command.dry_run {
            let text_message = format!(
                "{}\n\n{} {} statement(s) for {} (dry run, nothing executed)",
                batch.to_script().trim_end(),
                "→".cyan(),
                batch.len(),
                vendor.canonical_name()
            );
            return Ok(ApplyOutput {
                vendor,
                mode: command.mode,
                dry_run: true,
                statement_count: batch.len(),
                statements: batch.statements,
                text_message,
            });
        }

        let spinner = self.spinner(&command.format);
        spinner.set_message(format!(
            "Applying {} statement(s) to {}",
            batch.len(),
            vendor.canonical_name()
        ));

        let executed = executor.execute_batch(&batch.statements).await;
        spinner.finish_and_clear();
        let executed = executed.with_context(|| "Failed to apply DDL")?;

        info!(vendor = %vendor, statements = executed, "Applied DDL");

        let text_message = format!(
            "{} Applied {} statement(s) to {}",
            "✓".green(),
            executed,
            vendor.canonical_name()
        );
        Ok(ApplyOutput {
            vendor,
            mode: command.mode,
            dry_run: false,
            statement_count: executed,
            statements: batch.statements,
            text_message,
        })
    }

    /// 実行中のスピナー（JSON出力時は非表示）
    fn spinner(&self, format: &OutputFormat) -> ProgressBar {
        if matches!(format, OutputFormat::Json) {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}
