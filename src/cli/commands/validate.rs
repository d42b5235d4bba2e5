// validateコマンドハンドラー
//
// スキーマ検証機能を実装します。
// - スキーマ定義ファイルの読み込み
// - 構造検証（重複・参照・継承・循環参照）
// - ベンダー指定時は方言の型上限と参照アクションの検証
// - エラーと警告のフォーマットされた表示

use crate::adapters::registry;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::error::{ValidationError, ValidationResult, ValidationWarning};
use crate::core::schema::Schema;
use crate::core::vendor::Vendor;
use crate::services::schema_validator::SchemaValidatorService;
use anyhow::{anyhow, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// validateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ValidateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 対象ベンダー（未指定の場合は設定ファイルから取得、どちらもなければ構造検証のみ）
    pub vendor: Option<Vendor>,
    /// スキーマファイルのパス
    pub schema: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// 検証で見つかった問題
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// メッセージ
    pub message: String,
    /// テーブル名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// カラム名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// 修正提案
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&ValidationError> for ValidationIssue {
    fn from(error: &ValidationError) -> Self {
        let location = error.location();
        Self {
            message: error.to_string(),
            table: location.and_then(|l| l.table.clone()),
            column: location.and_then(|l| l.column.clone()),
            suggestion: error.suggestion().map(str::to_string),
        }
    }
}

impl From<&ValidationWarning> for ValidationIssue {
    fn from(warning: &ValidationWarning) -> Self {
        Self {
            message: warning.format(),
            table: warning.location.as_ref().and_then(|l| l.table.clone()),
            column: warning.location.as_ref().and_then(|l| l.column.clone()),
            suggestion: None,
        }
    }
}

/// スキーマの統計情報
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStatistics {
    pub tables: usize,
    pub columns: usize,
    pub indexes: usize,
    pub constraints: usize,
}

impl ValidationStatistics {
    fn from_schema(schema: &Schema) -> Self {
        schema
            .tables
            .iter()
            .fold(Self::default(), |mut stats, table| {
                stats.tables += 1;
                stats.columns += table.columns.len();
                stats.indexes += table.indexes.len();
                stats.constraints += table.constraints.len();
                stats
            })
    }
}

/// validateコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ValidateOutput {
    /// 検証が成功したかどうか
    pub is_valid: bool,
    /// 方言検証の対象ベンダー
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
    /// エラー一覧
    pub errors: Vec<ValidationIssue>,
    /// 警告一覧
    pub warnings: Vec<ValidationIssue>,
    /// 統計情報
    pub statistics: ValidationStatistics,
}

impl CommandOutput for ValidateOutput {
    fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("=== Schema Validation Results ===\n");
        if let Some(vendor) = self.vendor {
            output.push_str(&format!("Vendor: {}\n", vendor.canonical_name()));
        }
        output.push('\n');

        if !self.errors.is_empty() {
            output.push_str(&format!(
                "{} {} error(s) found:\n\n",
                "✗".red(),
                self.errors.len()
            ));
            for (i, error) in self.errors.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, error.message));
                if let Some(suggestion) = &error.suggestion {
                    output.push_str(&format!("   Suggestion: {}\n", suggestion));
                }
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str(&format!(
                "{} {} warning(s) found:\n\n",
                "⚠".yellow(),
                self.warnings.len()
            ));
            for warning in &self.warnings {
                output.push_str(&format!("  - {}\n", warning.message));
            }
            output.push('\n');
        }

        output.push_str("=== Validation Statistics ===\n");
        output.push_str(&format!("Tables: {}\n", self.statistics.tables));
        output.push_str(&format!("Columns: {}\n", self.statistics.columns));
        output.push_str(&format!("Indexes: {}\n", self.statistics.indexes));
        output.push_str(&format!("Constraints: {}\n", self.statistics.constraints));

        output.push_str("\n=== Result ===\n");
        if self.is_valid {
            output.push_str(&format!(
                "{} Validation complete. No errors found.",
                "✓".green()
            ));
        } else {
            output.push_str(&format!(
                "{} Validation complete. {} error(s) found.",
                "✗".red(),
                self.errors.len()
            ));
        }
        output
    }
}

/// validateコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct ValidateCommandHandler {}

impl ValidateCommandHandler {
    /// 新しいValidateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// validateコマンドを実行
    ///
    /// 検証エラーがある場合は、フォーマット済みの結果をエラーとして返します。
    pub fn execute(&self, command: &ValidateCommand) -> Result<String> {
        debug!(vendor = ?command.vendor, "Executing validate command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let schema = context.load_schema(command.schema.as_deref())?;
        let vendor = context.vendor(command.vendor).ok();

        let validator = SchemaValidatorService::new();
        let mut result = validator.validate(&schema);
        if let Some(vendor) = vendor {
            let dialect = registry::dialect_for(vendor)?;
            result.merge(validator.validate_for_dialect(&schema, dialect));
        }

        let output = self.build_output(&result, &schema, vendor);
        let rendered = render_output(&output, &command.format)?;
        if output.is_valid {
            Ok(rendered)
        } else {
            Err(anyhow!(rendered))
        }
    }

    fn build_output(
        &self,
        result: &ValidationResult,
        schema: &Schema,
        vendor: Option<Vendor>,
    ) -> ValidateOutput {
        ValidateOutput {
            is_valid: result.is_valid(),
            vendor,
            errors: result.errors.iter().map(ValidationIssue::from).collect(),
            warnings: result.warnings.iter().map(ValidationIssue::from).collect(),
            statistics: ValidationStatistics::from_schema(schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn command(dir: &std::path::Path, vendor: Option<Vendor>) -> ValidateCommand {
        ValidateCommand {
            project_path: dir.to_path_buf(),
            config_path: None,
            vendor,
            schema: None,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_valid_schema() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("schema.yaml"),
            r#"
name: shop
tables:
  - name: customer
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
      - { name: email, type: { kind: CHAR, length: 255, varying: true } }
"#,
        )
        .unwrap();

        colored::control::set_override(false);
        let text = ValidateCommandHandler::new()
            .execute(&command(dir.path(), Some(Vendor::Oracle)))
            .unwrap();
        assert!(text.contains("Vendor: Oracle"));
        assert!(text.contains("Tables: 1\nColumns: 2"));
        assert!(text.ends_with("Validation complete. No errors found."));
    }

    #[test]
    fn test_dialect_errors_fail_the_command() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("schema.yaml"),
            r#"
name: shop
tables:
  - name: note
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
      - { name: body, type: { kind: CHAR, length: 5000, varying: true } }
"#,
        )
        .unwrap();

        assert!(ValidateCommandHandler::new()
            .execute(&command(dir.path(), None))
            .is_ok());

        let mut cmd = command(dir.path(), Some(Vendor::Oracle));
        cmd.format = OutputFormat::Json;
        let err = ValidateCommandHandler::new().execute(&cmd).unwrap_err();
        let value: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(value["is_valid"], false);
        assert_eq!(value["vendor"], "oracle");
        assert_eq!(value["errors"][0]["table"], "note");
        assert_eq!(value["errors"][0]["column"], "body");
    }
}
