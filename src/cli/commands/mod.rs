// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod apply;
pub mod detect;
pub mod generate;
pub mod order;
pub mod validate;

use crate::cli::{DdlMode, OutputFormat};
use crate::core::naming::APP_NAME;
use crate::core::schema::Schema;
use crate::core::vendor::Vendor;
use crate::services::ddl_generator::{DdlBatch, DdlGenerator};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// コマンド出力（テキストとJSONの両形式で表示可能）
pub trait CommandOutput: Serialize {
    /// テキスト形式の表示
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じてコマンド出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}

/// モードに応じたDDLバッチを生成
pub(crate) fn build_batch(
    generator: &DdlGenerator,
    schema: &Schema,
    mode: DdlMode,
) -> Result<DdlBatch> {
    let batch = match mode {
        DdlMode::Create => generator.create_batch(schema),
        DdlMode::Drop => generator.drop_batch(schema),
        DdlMode::Truncate => generator.truncate_batch(schema),
    };
    batch.with_context(|| format!("Failed to generate {:?} statements", mode))
}

/// 生成スクリプトのヘッダーコメント
pub(crate) fn script_header(
    vendor: Vendor,
    schema_name: &str,
    checksum: &str,
    generated_at: DateTime<Utc>,
) -> String {
    format!(
        "-- Generated by {} {}\n-- Vendor: {}\n-- Schema: {} (sha256: {})\n-- Generated at: {}\n\n",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        vendor.canonical_name(),
        schema_name,
        checksum,
        generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}
