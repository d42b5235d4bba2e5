// MySQL方言
//
// 識別子はバッククォート、ENUMはカラム定義内のインライン ENUM('a', ...) で表現します。
// 数値型は UNSIGNED 修飾子をサポートします。

use crate::adapters::dialect::{
    decimal_declaration, enum_length, enum_literals, fractional_declaration, quote_with,
    validate_length, Dialect, DialectLimits,
};
use crate::core::error::DdlError;
use crate::core::numeric_width::IntegerWidth;
use crate::core::schema::IndexType;
use crate::core::vendor::Vendor;

const LIMITS: DialectLimits = DialectLimits {
    max_precision: 65,
    max_scale: Some(30),
    max_char_length: 255,
    max_varchar_length: 65_535,
    max_binary_length: 255,
    max_varbinary_length: 65_535,
    max_clob_length: 4_294_967_295,
    max_blob_length: 4_294_967_295,
    fractional_seconds_max: Some(6),
};

/// MySQL用方言
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

fn unsigned_suffix(unsigned: bool) -> &'static str {
    if unsigned {
        " UNSIGNED"
    } else {
        ""
    }
}

/// 長さに応じたTEXT/BLOB系の型名を選択
fn sized_lob(prefix: &str, length: Option<u64>) -> String {
    let size = match length {
        Some(l) if l <= 255 => "TINY",
        Some(l) if l <= 65_535 => "",
        Some(l) if l <= 16_777_215 => "MEDIUM",
        _ => "LONG",
    };
    format!("{}{}", size, prefix)
}

impl Dialect for MySqlDialect {
    fn vendor(&self) -> Vendor {
        Vendor::MySql
    }

    fn limits(&self) -> &DialectLimits {
        &LIMITS
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '`', '`')
    }

    fn declare_integer(&self, width: IntegerWidth, unsigned: bool) -> String {
        let base = match width {
            IntegerWidth::One => "TINYINT",
            IntegerWidth::Two => "SMALLINT",
            IntegerWidth::Four => "INT",
            IntegerWidth::Eight => "BIGINT",
        };
        format!("{}{}", base, unsigned_suffix(unsigned))
    }

    fn declare_decimal(
        &self,
        precision: Option<u16>,
        scale: Option<u16>,
        unsigned: bool,
    ) -> Result<String, DdlError> {
        decimal_declaration(&LIMITS, "DECIMAL", precision, scale, unsigned_suffix(unsigned))
    }

    fn declare_float(&self, double: bool, unsigned: bool) -> String {
        let base = if double { "DOUBLE" } else { "FLOAT" };
        format!("{}{}", base, unsigned_suffix(unsigned))
    }

    fn declare_clob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("TEXT", length, LIMITS.max_clob_length)?;
        }
        Ok(sized_lob("TEXT", length))
    }

    fn declare_blob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("BLOB", length, LIMITS.max_blob_length)?;
        }
        Ok(sized_lob("BLOB", length))
    }

    fn declare_datetime(&self, precision: Option<u8>) -> Result<String, DdlError> {
        fractional_declaration(&LIMITS, "DATETIME", precision)
    }

    fn declare_interval(&self) -> Result<String, DdlError> {
        // TIMEは -838:59:59 から 838:59:59 までの期間を保持できる
        Ok("TIME".to_string())
    }

    fn declare_enum(&self, _type_name: &str, values: Option<&[String]>) -> String {
        match values {
            Some(values) if !values.is_empty() => format!("ENUM({})", enum_literals(values)),
            _ => format!("VARCHAR({})", enum_length(values)),
        }
    }

    fn enum_check_constraint(&self, _column: &str, _values: &[String]) -> Option<String> {
        None
    }

    fn identity_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
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
            "CREATE {}INDEX {}{} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.quote_identifier(name),
            using,
            self.quote_identifier(table),
            self.quote_columns(columns)
        )
    }
}
