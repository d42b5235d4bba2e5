// PostgreSQL方言
//
// 識別子はダブルクォート、ENUMは名前付き型（CREATE TYPE ... AS ENUM）で表現します。
// 符号なし整数型を持たないため、unsignedは一段広い符号付き型に昇格します。

use crate::adapters::dialect::{
    enum_length, enum_literals, quote_with, signed_integer_type, validate_length, Dialect,
    DialectLimits,
};
use crate::core::error::DdlError;
use crate::core::numeric_width::IntegerWidth;
use crate::core::schema::IndexType;
use crate::core::vendor::Vendor;

const LIMITS: DialectLimits = DialectLimits {
    max_precision: 1000,
    max_scale: None,
    max_char_length: 10_485_760,
    max_varchar_length: 10_485_760,
    max_binary_length: 1_073_741_823,
    max_varbinary_length: 1_073_741_823,
    max_clob_length: 1_073_741_823,
    max_blob_length: 1_073_741_823,
    fractional_seconds_max: Some(6),
};

/// PostgreSQL用方言
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn vendor(&self) -> Vendor {
        Vendor::PostgreSql
    }

    fn limits(&self) -> &DialectLimits {
        &LIMITS
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '"', '"')
    }

    fn declare_integer(&self, width: IntegerWidth, unsigned: bool) -> String {
        signed_integer_type(width, unsigned)
    }

    fn declare_binary(&self, varying: bool, length: u64) -> Result<String, DdlError> {
        let max = if varying {
            LIMITS.max_varbinary_length
        } else {
            LIMITS.max_binary_length
        };
        validate_length("BYTEA", length, max)?;
        Ok("BYTEA".to_string())
    }

    fn declare_clob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("TEXT", length, LIMITS.max_clob_length)?;
        }
        Ok("TEXT".to_string())
    }

    fn declare_blob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("BYTEA", length, LIMITS.max_blob_length)?;
        }
        Ok("BYTEA".to_string())
    }

    fn declare_interval(&self) -> Result<String, DdlError> {
        Ok("INTERVAL".to_string())
    }

    fn declare_enum(&self, type_name: &str, values: Option<&[String]>) -> String {
        match values {
            Some(values) if !values.is_empty() => self.quote_identifier(type_name),
            _ => format!("VARCHAR({})", enum_length(values)),
        }
    }

    fn create_enum_type(&self, type_name: &str, values: &[String]) -> Option<String> {
        if values.is_empty() {
            return None;
        }
        Some(format!(
            "CREATE TYPE {} AS ENUM ({})",
            self.quote_identifier(type_name),
            enum_literals(values)
        ))
    }

    fn drop_enum_type(&self, type_name: &str) -> Option<String> {
        Some(format!("DROP TYPE IF EXISTS {}", self.quote_identifier(type_name)))
    }

    fn enum_check_constraint(&self, _column: &str, _values: &[String]) -> Option<String> {
        None
    }

    fn create_index(
        &self,
        unique: bool,
        name: &str,
        index_type: Option<IndexType>,
        table: &str,
        columns: &[String],
    ) -> String {
        let using = index_type
            .map(|t| format!(" USING {}", t.as_sql()))
            .unwrap_or_default();
        format!(
            "CREATE {}INDEX {} ON {}{} ({})",
            if unique { "UNIQUE " } else { "" },
            self.quote_identifier(name),
            self.quote_identifier(table),
            using,
            self.quote_columns(columns)
        )
    }
}
