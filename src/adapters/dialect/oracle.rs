// Oracle方言
//
// 符号なし型・BOOLEAN・TIME・ネイティブの条件付きDDLを持たないため、
// NUMBER(d) への変換やPL/SQL無名ブロックで代替します。

use crate::adapters::dialect::{
    check_fractional_precision, decimal_declaration, enum_length, escape_literal,
    fractional_declaration, validate_length, Dialect, DialectLimits,
};
use crate::core::error::DdlError;
use crate::core::numeric_width::IntegerWidth;
use crate::core::schema::ReferentialAction;
use crate::core::vendor::Vendor;

const LIMITS: DialectLimits = DialectLimits {
    max_precision: 38,
    max_scale: None,
    max_char_length: 1000,
    max_varchar_length: 2000,
    max_binary_length: 2000,
    max_varbinary_length: 2000,
    max_clob_length: 4_294_967_295,
    max_blob_length: 4_294_967_295,
    fractional_seconds_max: Some(9),
};

/// Oracle用方言
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// カタログ照会の結果が条件を満たす場合のみDDLを実行するPL/SQLブロック
    fn guarded_block(catalog_query: &str, condition: &str, ddl: &str) -> String {
        format!(
            "DECLARE\n    existing NUMBER;\nBEGIN\n    SELECT COUNT(*) INTO existing FROM {};\n    IF existing {} THEN\n        EXECUTE IMMEDIATE '{}';\n    END IF;\nEND;",
            catalog_query,
            condition,
            escape_literal(ddl)
        )
    }
}

impl Dialect for OracleDialect {
    fn vendor(&self) -> Vendor {
        Vendor::Oracle
    }

    fn limits(&self) -> &DialectLimits {
        &LIMITS
    }

    fn declare_boolean(&self) -> String {
        "NUMBER(1)".to_string()
    }

    fn declare_integer(&self, width: IntegerWidth, unsigned: bool) -> String {
        format!("NUMBER({})", width.decimal_digits(unsigned))
    }

    fn declare_decimal(
        &self,
        precision: Option<u16>,
        scale: Option<u16>,
        _unsigned: bool,
    ) -> Result<String, DdlError> {
        decimal_declaration(&LIMITS, "NUMBER", precision, scale, "")
    }

    fn declare_float(&self, double: bool, _unsigned: bool) -> String {
        if double {
            "BINARY_DOUBLE".to_string()
        } else {
            "BINARY_FLOAT".to_string()
        }
    }

    fn declare_char(&self, varying: bool, length: u64) -> Result<String, DdlError> {
        if varying {
            validate_length("NVARCHAR2", length, LIMITS.max_varchar_length)?;
            Ok(format!("NVARCHAR2({})", length))
        } else {
            validate_length("NCHAR", length, LIMITS.max_char_length)?;
            // 長さ1のNCHARは2文字分で宣言する
            Ok(format!("NCHAR({})", length.max(2)))
        }
    }

    fn declare_binary(&self, _varying: bool, length: u64) -> Result<String, DdlError> {
        validate_length("RAW", length, LIMITS.max_binary_length)?;
        Ok(format!("RAW({})", length))
    }

    fn declare_clob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("CLOB", length, LIMITS.max_clob_length)?;
        }
        Ok("CLOB".to_string())
    }

    fn declare_blob(&self, length: Option<u64>) -> Result<String, DdlError> {
        if let Some(length) = length {
            validate_length("BLOB", length, LIMITS.max_blob_length)?;
        }
        Ok("BLOB".to_string())
    }

    fn declare_time(&self, precision: Option<u8>) -> Result<String, DdlError> {
        check_fractional_precision(&LIMITS, "TIME", precision)?;
        Ok(match precision {
            Some(p) => format!("INTERVAL DAY(0) TO SECOND({})", p),
            None => "INTERVAL DAY(0) TO SECOND".to_string(),
        })
    }

    fn declare_datetime(&self, precision: Option<u8>) -> Result<String, DdlError> {
        fractional_declaration(&LIMITS, "TIMESTAMP", precision)
    }

    fn declare_interval(&self) -> Result<String, DdlError> {
        Ok("INTERVAL DAY TO SECOND".to_string())
    }

    fn declare_enum(&self, _type_name: &str, values: Option<&[String]>) -> String {
        match enum_length(values) {
            0 => "VARCHAR(0)".to_string(),
            length => format!("VARCHAR2({})", length),
        }
    }

    fn current_time_function(&self) -> &'static str {
        "(SYSTIMESTAMP - TRUNC(SYSTIMESTAMP))"
    }

    fn current_date_function(&self) -> &'static str {
        "TRUNC(SYSDATE)"
    }

    fn check_referential_action(
        &self,
        on_update: bool,
        action: ReferentialAction,
    ) -> Result<(), DdlError> {
        if on_update {
            return Err(DdlError::unsupported(
                format!("ON UPDATE {}", action.as_sql()),
                Vendor::Oracle.canonical_name(),
            ));
        }
        match action {
            ReferentialAction::NoAction | ReferentialAction::Cascade | ReferentialAction::SetNull => {
                Ok(())
            }
            ReferentialAction::Restrict | ReferentialAction::SetDefault => {
                Err(DdlError::unsupported(
                    format!("ON DELETE {}", action.as_sql()),
                    Vendor::Oracle.canonical_name(),
                ))
            }
        }
    }

    fn referential_clause(
        &self,
        on_update: bool,
        action: ReferentialAction,
    ) -> Result<Option<String>, DdlError> {
        self.check_referential_action(on_update, action)?;
        // NO ACTIONは既定動作で、構文上も記述できない
        if action == ReferentialAction::NoAction {
            return Ok(None);
        }
        Ok(Some(format!("ON DELETE {}", action.as_sql())))
    }

    fn create_table_if_not_exists(&self, table: &str, create_sql: &str) -> String {
        Self::guarded_block(
            &format!(
                "USER_TABLES WHERE TABLE_NAME = '{}'",
                escape_literal(&table.to_uppercase())
            ),
            "= 0",
            create_sql,
        )
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        Self::guarded_block(
            &format!(
                "USER_TABLES WHERE TABLE_NAME = '{}'",
                escape_literal(&table.to_uppercase())
            ),
            "> 0",
            &self.drop_table(table),
        )
    }

    fn create_schema_if_not_exists(&self, schema: &str) -> Result<String, DdlError> {
        Ok(Self::guarded_block(
            &format!(
                "ALL_USERS WHERE USERNAME = '{}'",
                escape_literal(&schema.to_uppercase())
            ),
            "= 0",
            &format!("CREATE USER {} NO AUTHENTICATION", schema),
        ))
    }
}
