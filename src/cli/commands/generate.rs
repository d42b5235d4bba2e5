// generateコマンドハンドラー
//
// スキーマ定義からベンダー別のDDLスクリプトを生成します。
// - 設定ファイルとCLIフラグから対象ベンダー・出力オプションを解決
// - 継承展開と依存関係順の並び替え
// - ヘッダーコメント（チェックサム・生成日時）付きのスクリプト出力

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{build_batch, render_output, script_header, CommandOutput};
use crate::cli::{DdlMode, OutputFormat};
use crate::core::error::IoError;
use crate::core::vendor::Vendor;
use crate::services::ddl_generator::{DdlGenerator, GeneratorOptions};
use crate::services::schema_checksum::SchemaChecksumService;
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// generateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct GenerateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 対象ベンダー（未指定の場合は設定ファイルから取得）
    pub vendor: Option<Vendor>,
    /// スキーマファイルのパス（未指定の場合は設定ファイルから取得）
    pub schema: Option<PathBuf>,
    /// 生成するDDLの種類
    pub mode: DdlMode,
    /// 条件付きDDLを出力する
    pub if_not_exists: bool,
    /// CREATE INDEXを出力しない
    pub no_indexes: bool,
    /// ENUMのCHECK制約を出力しない
    pub no_enum_checks: bool,
    /// ヘッダーコメントを出力しない
    pub no_header: bool,
    /// 出力ファイル
    pub output: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// generateコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    /// 対象ベンダー
    pub vendor: Vendor,
    /// 生成モード
    pub mode: DdlMode,
    /// スキーマ名
    pub schema: String,
    /// スキーマのチェックサム
    pub checksum: String,
    /// 生成した文（実行順）
    pub statements: Vec<String>,
    /// 書き出したファイル
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// テキスト出力メッセージ
    #[serde(skip)]
    pub text_message: String,
}

impl CommandOutput for GenerateOutput {
    fn to_text(&self) -> String {
        self.text_message.clone()
    }
}

/// generateコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct GenerateCommandHandler {}

impl GenerateCommandHandler {
    /// 新しいGenerateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// generateコマンドを実行
    pub fn execute(&self, command: &GenerateCommand) -> Result<String> {
        debug!(vendor = ?command.vendor, mode = ?command.mode, "Executing generate command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let vendor = context.vendor(command.vendor)?;
        let schema = context.load_schema(command.schema.as_deref())?;

        let mut output_config = context.output_config();
        output_config.if_not_exists |= command.if_not_exists;
        output_config.include_indexes &= !command.no_indexes;
        output_config.include_enum_checks &= !command.no_enum_checks;
        output_config.header &= !command.no_header;

        let generator =
            DdlGenerator::for_vendor(vendor)?.with_options(GeneratorOptions::from(&output_config));
        let batch = build_batch(&generator, &schema, command.mode)?;
        let checksum = SchemaChecksumService::new().calculate_checksum(&schema);

        let mut script = String::new();
        if output_config.header {
            script.push_str(&script_header(vendor, &schema.name, &checksum, Utc::now()));
        }
        script.push_str(&batch.to_script());

        let output_file = match &command.output {
            Some(path) => {
                fs::write(path, &script).map_err(|e| IoError::FileWrite {
                    path: path.display().to_string(),
                    cause: e.to_string(),
                })?;
                info!(path = %path.display(), statements = batch.len(), "Wrote DDL script");
                Some(path.display().to_string())
            }
            None => None,
        };

        let text_message = match &output_file {
            Some(path) => format!(
                "{} Wrote {} statement(s) for {} to {}",
                "✓".green(),
                batch.len(),
                vendor.canonical_name(),
                path
            ),
            None => script.trim_end().to_string(),
        };

        let output = GenerateOutput {
            vendor,
            mode: command.mode,
            schema: schema.name.clone(),
            checksum,
            statements: batch.statements,
            output_file,
            text_message,
        };
        render_output(&output, &command.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
name: shop
tables:
  - name: order_item
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
      - { name: order_id, type: { kind: INTEGER, width: 4 }, references: { table: orders, column: id } }
  - name: orders
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
"#;

    fn command(dir: &std::path::Path, vendor: Vendor, mode: DdlMode) -> GenerateCommand {
        GenerateCommand {
            project_path: dir.to_path_buf(),
            config_path: None,
            vendor: Some(vendor),
            schema: None,
            mode,
            if_not_exists: false,
            no_indexes: false,
            no_enum_checks: false,
            no_header: false,
            output: None,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_generate_create_script() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();

        let text = GenerateCommandHandler::new()
            .execute(&command(dir.path(), Vendor::Sqlite, DdlMode::Create))
            .unwrap();
        assert!(text.starts_with("-- Generated by ddlforge"));
        let orders = text.find("CREATE TABLE \"orders\"").unwrap();
        let items = text.find("CREATE TABLE \"order_item\"").unwrap();
        assert!(orders < items);
    }

    #[test]
    fn test_generate_json_without_header() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();

        let mut cmd = command(dir.path(), Vendor::MySql, DdlMode::Drop);
        cmd.no_header = true;
        cmd.format = OutputFormat::Json;
        let json = GenerateCommandHandler::new().execute(&cmd).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vendor"], "mysql");
        assert_eq!(value["mode"], "drop");
        assert_eq!(value["statements"][0], "DROP TABLE `order_item`");
        assert_eq!(value["statements"][1], "DROP TABLE `orders`");
        assert_eq!(value["checksum"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_generate_to_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();
        let target = dir.path().join("out.sql");

        let mut cmd = command(dir.path(), Vendor::Db2, DdlMode::Truncate);
        cmd.output = Some(target.clone());
        let text = GenerateCommandHandler::new().execute(&cmd).unwrap();
        assert!(text.contains("Wrote 2 statement(s)"));

        let script = fs::read_to_string(target).unwrap();
        assert!(script.contains("TRUNCATE TABLE order_item IMMEDIATE;"));
    }

    #[test]
    fn test_generate_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();

        let mut cmd = command(dir.path(), Vendor::Sqlite, DdlMode::Create);
        cmd.output = Some(dir.path().join("missing").join("out.sql"));
        let err = GenerateCommandHandler::new().execute(&cmd).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IoError>(),
            Some(IoError::FileWrite { .. })
        ));
        assert!(err.to_string().starts_with("Failed to write file:"));
    }

    #[test]
    fn test_generate_requires_vendor() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();

        let mut cmd = command(dir.path(), Vendor::Sqlite, DdlMode::Create);
        cmd.vendor = None;
        let err = GenerateCommandHandler::new().execute(&cmd).unwrap_err();
        assert!(err.to_string().contains("No vendor specified"));
    }
}
