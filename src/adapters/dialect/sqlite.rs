// SQLite方言
//
// 型はストレージクラスへの親和性のみを持つため、整数は常にINTEGERです。
// TRUNCATEとスキーマは存在しません。

use crate::adapters::dialect::{
    check_fractional_precision, quote_with, validate_length, Dialect, DialectLimits,
};
use crate::core::error::DdlError;
use crate::core::numeric_width::IntegerWidth;
use crate::core::vendor::Vendor;

/// SQLITE_MAX_LENGTH の既定値
const MAX_LENGTH: u64 = 1_000_000_000;

const LIMITS: DialectLimits = DialectLimits {
    max_precision: 15,
    max_scale: None,
    max_char_length: MAX_LENGTH,
    max_varchar_length: MAX_LENGTH,
    max_binary_length: MAX_LENGTH,
    max_varbinary_length: MAX_LENGTH,
    max_clob_length: MAX_LENGTH,
    max_blob_length: MAX_LENGTH,
    fractional_seconds_max: None,
};

/// SQLite用方言
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn vendor(&self) -> Vendor {
        Vendor::Sqlite
    }

    fn limits(&self) -> &DialectLimits {
        &LIMITS
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '"', '"')
    }

    fn declare_integer(&self, _width: IntegerWidth, _unsigned: bool) -> String {
        "INTEGER".to_string()
    }

    fn declare_float(&self, _double: bool, _unsigned: bool) -> String {
        "REAL".to_string()
    }

    fn declare_binary(&self, varying: bool, length: u64) -> Result<String, DdlError> {
        validate_length(if varying { "VARBINARY" } else { "BINARY" }, length, MAX_LENGTH)?;
        Ok("BLOB".to_string())
    }

    fn declare_clob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("TEXT", length, MAX_LENGTH)?;
        }
        Ok("TEXT".to_string())
    }

    fn declare_blob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("BLOB", length, MAX_LENGTH)?;
        }
        Ok("BLOB".to_string())
    }

    fn declare_time(&self, precision: Option<u8>) -> Result<String, DdlError> {
        check_fractional_precision(&LIMITS, "TIME", precision)?;
        Ok("TIME".to_string())
    }

    fn declare_datetime(&self, precision: Option<u8>) -> Result<String, DdlError> {
        check_fractional_precision(&LIMITS, "DATETIME", precision)?;
        Ok("DATETIME".to_string())
    }

    fn declare_interval(&self) -> Result<String, DdlError> {
        Ok("TEXT".to_string())
    }

    fn identity_clause(&self) -> &'static str {
        "PRIMARY KEY AUTOINCREMENT"
    }

    fn identity_is_inline_primary_key(&self) -> bool {
        true
    }

    fn truncate(&self, table: &str) -> String {
        format!("DELETE FROM {}", self.quote_identifier(table))
    }

    fn create_schema_if_not_exists(&self, _schema: &str) -> Result<String, DdlError> {
        Err(DdlError::unsupported(
            "CREATE SCHEMA (SQLite has no schemas)",
            Vendor::Sqlite.canonical_name(),
        ))
    }
}
