// orderコマンドハンドラー
//
// 外部キー依存関係に基づくテーブルの作成順（または削除順）を表示します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::dependency::DependencyGraph;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// orderコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct OrderCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// スキーマファイルのパス
    pub schema: Option<PathBuf>,
    /// 削除順で表示する
    pub reverse: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// 並び順の1エントリ
#[derive(Debug, Clone, Serialize)]
pub struct OrderEntry {
    /// 1始まりの位置
    pub position: usize,
    /// テーブル名
    pub table: String,
    /// 依存先テーブル
    pub depends_on: Vec<String>,
}

/// orderコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct OrderOutput {
    /// スキーマ名
    pub schema: String,
    /// 削除順かどうか
    pub reverse: bool,
    /// 並び順
    pub entries: Vec<OrderEntry>,
}

impl CommandOutput for OrderOutput {
    fn to_text(&self) -> String {
        if self.entries.is_empty() {
            return "No tables to order.".to_string();
        }

        let heading = if self.reverse {
            "Drop order"
        } else {
            "Creation order"
        };
        let mut output = format!("=== {} ({}) ===\n", heading, self.schema);
        for entry in &self.entries {
            output.push_str(&format!("{:>3}. {}", entry.position, entry.table));
            if !entry.depends_on.is_empty() {
                output.push_str(&format!("  -> {}", entry.depends_on.join(", ")));
            }
            output.push('\n');
        }
        output.trim_end().to_string()
    }
}

/// orderコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct OrderCommandHandler {}

impl OrderCommandHandler {
    /// 新しいOrderCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// orderコマンドを実行
    pub fn execute(&self, command: &OrderCommand) -> Result<String> {
        debug!(reverse = command.reverse, "Executing order command");

        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let schema = context.load_schema(command.schema.as_deref())?;
        let resolved = schema
            .resolve_inheritance()
            .with_context(|| "Failed to resolve table inheritance")?;

        let graph = DependencyGraph::build(&resolved);
        let mut tables = graph
            .topological_order()
            .with_context(|| "Failed to order tables")?;
        if command.reverse {
            tables.reverse();
        }

        let entries = tables
            .iter()
            .enumerate()
            .map(|(i, table)| OrderEntry {
                position: i + 1,
                table: table.name.clone(),
                depends_on: graph
                    .dependencies_of(&table.name)
                    .unwrap_or_default()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect();

        let output = OrderOutput {
            schema: schema.name.clone(),
            reverse: command.reverse,
            entries,
        };
        render_output(&output, &command.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

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
      - { name: customer_id, type: { kind: INTEGER, width: 4 }, references: { table: customer, column: id } }
  - name: customer
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
"#;

    fn command(dir: &std::path::Path, reverse: bool, format: OutputFormat) -> OrderCommand {
        OrderCommand {
            project_path: dir.to_path_buf(),
            config_path: None,
            schema: None,
            reverse,
            format,
        }
    }

    #[test]
    fn test_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();

        let json = OrderCommandHandler::new()
            .execute(&command(dir.path(), false, OutputFormat::Json))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let tables: Vec<&str> = value["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["table"].as_str().unwrap())
            .collect();
        assert_eq!(tables, vec!["customer", "orders", "order_item"]);
        assert_eq!(value["entries"][2]["depends_on"][0], "orders");
    }

    #[test]
    fn test_reverse_order_text() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();

        let text = OrderCommandHandler::new()
            .execute(&command(dir.path(), true, OutputFormat::Text))
            .unwrap();
        assert!(text.starts_with("=== Drop order (shop) ==="));
        assert!(text.contains("  1. order_item  -> orders"));
        assert!(text.contains("  3. customer"));
    }

    #[test]
    fn test_cycle_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("schema.yaml"),
            r#"
name: loop
tables:
  - name: a
    columns:
      - { name: b_id, type: { kind: INTEGER, width: 4 }, references: { table: b, column: id } }
  - name: b
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, references: { table: a, column: b_id } }
"#,
        )
        .unwrap();

        let err = OrderCommandHandler::new()
            .execute(&command(dir.path(), false, OutputFormat::Text))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to order tables"));
    }
}
