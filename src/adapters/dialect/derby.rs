// Derby方言
//
// 条件付きDDLの構文を持たないため、カタログ（SYS.SYSTABLES / SYS.SYSSCHEMAS）を確認してから
// DDLを実行するストアドプロシージャの呼び出しとして出力します。

use crate::adapters::dialect::{
    check_fractional_precision, escape_literal, restrict_only_on_update, signed_integer_type,
    validate_length, Dialect, DialectLimits,
};
use crate::core::error::DdlError;
use crate::core::naming::DERBY_PROCEDURE_PREFIX;
use crate::core::numeric_width::IntegerWidth;
use crate::core::schema::ReferentialAction;
use crate::core::vendor::Vendor;

const LIMITS: DialectLimits = DialectLimits {
    max_precision: 31,
    max_scale: None,
    max_char_length: 254,
    max_varchar_length: 32_672,
    max_binary_length: 254,
    max_varbinary_length: 32_672,
    max_clob_length: 2_147_483_647,
    max_blob_length: 2_147_483_647,
    fractional_seconds_max: Some(9),
};

/// Derby用方言
#[derive(Debug, Clone, Copy, Default)]
pub struct DerbyDialect;

impl DerbyDialect {
    /// 条件付きDDLプロシージャの呼び出し文
    ///
    /// プロシージャ名は `DDLFORGE_` 接頭辞付きで、引数はすべて文字列リテラルです。
    fn procedure_call(procedure: &str, arguments: &[&str]) -> String {
        let arguments = arguments
            .iter()
            .map(|a| format!("'{}'", escape_literal(a)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CALL {}{}({})", DERBY_PROCEDURE_PREFIX, procedure, arguments)
    }
}

impl Dialect for DerbyDialect {
    fn vendor(&self) -> Vendor {
        Vendor::Derby
    }

    fn limits(&self) -> &DialectLimits {
        &LIMITS
    }

    fn declare_integer(&self, width: IntegerWidth, unsigned: bool) -> String {
        signed_integer_type(width, unsigned)
    }

    fn declare_float(&self, double: bool, _unsigned: bool) -> String {
        if double {
            "DOUBLE".to_string()
        } else {
            "REAL".to_string()
        }
    }

    fn declare_binary(&self, varying: bool, length: u64) -> Result<String, DdlError> {
        if varying {
            validate_length("VARCHAR FOR BIT DATA", length, LIMITS.max_varbinary_length)?;
            Ok(format!("VARCHAR({}) FOR BIT DATA", length))
        } else {
            validate_length("CHAR FOR BIT DATA", length, LIMITS.max_binary_length)?;
            Ok(format!("CHAR({}) FOR BIT DATA", length))
        }
    }

    fn declare_time(&self, precision: Option<u8>) -> Result<String, DdlError> {
        check_fractional_precision(&LIMITS, "TIME", precision)?;
        Ok("TIME".to_string())
    }

    fn declare_datetime(&self, precision: Option<u8>) -> Result<String, DdlError> {
        // TIMESTAMPは常にナノ秒精度で、精度指定の構文を持たない
        check_fractional_precision(&LIMITS, "TIMESTAMP", precision)?;
        Ok("TIMESTAMP".to_string())
    }

    fn check_referential_action(
        &self,
        on_update: bool,
        action: ReferentialAction,
    ) -> Result<(), DdlError> {
        restrict_only_on_update(Vendor::Derby, on_update, action)
    }

    fn create_table_if_not_exists(&self, table: &str, create_sql: &str) -> String {
        Self::procedure_call(
            "CREATE_TABLE_IF_NOT_EXISTS",
            &[table.to_uppercase().as_str(), create_sql],
        )
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        Self::procedure_call("DROP_TABLE_IF_EXISTS", &[table.to_uppercase().as_str()])
    }

    fn create_schema_if_not_exists(&self, schema: &str) -> Result<String, DdlError> {
        Ok(Self::procedure_call(
            "CREATE_SCHEMA_IF_NOT_EXISTS",
            &[schema.to_uppercase().as_str()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::IndexType;

    #[test]
    fn test_integer_types() {
        let d = DerbyDialect;
        assert_eq!(d.declare_integer(IntegerWidth::One, false), "SMALLINT");
        assert_eq!(d.declare_integer(IntegerWidth::Two, false), "SMALLINT");
        assert_eq!(d.declare_integer(IntegerWidth::Two, true), "INTEGER");
        assert_eq!(d.declare_integer(IntegerWidth::Eight, false), "BIGINT");
        assert_eq!(d.declare_integer(IntegerWidth::Eight, true), "DECIMAL(20, 0)");
    }

    #[test]
    fn test_binary_for_bit_data() {
        let d = DerbyDialect;
        assert_eq!(d.declare_binary(false, 16).unwrap(), "CHAR(16) FOR BIT DATA");
        assert_eq!(d.declare_binary(true, 300).unwrap(), "VARCHAR(300) FOR BIT DATA");
        assert!(d.declare_binary(false, 255).is_err());
    }

    #[test]
    fn test_temporal_types_ignore_precision() {
        let d = DerbyDialect;
        assert_eq!(d.declare_time(Some(3)).unwrap(), "TIME");
        assert_eq!(d.declare_datetime(Some(6)).unwrap(), "TIMESTAMP");
        assert!(d.declare_datetime(Some(10)).is_err());
    }

    #[test]
    fn test_decimal_limit() {
        let d = DerbyDialect;
        assert_eq!(d.declare_decimal(Some(31), Some(5), false).unwrap(), "DECIMAL(31, 5)");
        assert_eq!(
            d.declare_decimal(Some(32), Some(5), false).unwrap_err().bound(),
            Some("max_precision")
        );
    }

    #[test]
    fn test_conditional_ddl_calls_procedures() {
        let d = DerbyDialect;
        assert_eq!(
            d.create_table_if_not_exists("users", "CREATE TABLE users (name VARCHAR(5) DEFAULT 'x')"),
            "CALL DDLFORGE_CREATE_TABLE_IF_NOT_EXISTS('USERS', 'CREATE TABLE users (name VARCHAR(5) DEFAULT ''x'')')"
        );
        assert_eq!(
            d.drop_table_if_exists("users"),
            "CALL DDLFORGE_DROP_TABLE_IF_EXISTS('USERS')"
        );
        assert_eq!(
            d.create_schema_if_not_exists("app").unwrap(),
            "CALL DDLFORGE_CREATE_SCHEMA_IF_NOT_EXISTS('APP')"
        );
    }

    #[test]
    fn test_index_and_truncate() {
        let d = DerbyDialect;
        assert_eq!(
            d.create_index(false, "idx_a", Some(IndexType::Hash), "t", &["a".to_string()]),
            "CREATE INDEX idx_a ON t (a)"
        );
        assert_eq!(d.truncate("t"), "TRUNCATE TABLE t");
        assert_eq!(d.identity_clause(), "GENERATED BY DEFAULT AS IDENTITY");
    }

    #[test]
    fn test_on_update_restrictions() {
        let d = DerbyDialect;
        assert!(d
            .check_referential_action(true, ReferentialAction::SetNull)
            .unwrap_err()
            .to_string()
            .contains("Derby"));
        assert!(d.check_referential_action(false, ReferentialAction::SetNull).is_ok());
    }
}
