// DB2方言
//
// BOOLEANはSMALLINT、条件付きDDLはSYSCATを参照する複合SQLブロックで表現します。

use crate::adapters::dialect::{
    escape_literal, restrict_only_on_update, signed_integer_type, Dialect, DialectLimits,
};
use crate::core::error::DdlError;
use crate::core::numeric_width::IntegerWidth;
use crate::core::schema::ReferentialAction;
use crate::core::vendor::Vendor;

const LIMITS: DialectLimits = DialectLimits {
    max_precision: 31,
    max_scale: None,
    max_char_length: 254,
    max_varchar_length: 32_672,
    max_binary_length: 255,
    max_varbinary_length: 32_672,
    max_clob_length: 2_147_483_647,
    max_blob_length: 2_147_483_647,
    fractional_seconds_max: Some(12),
};

/// DB2用方言
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Dialect;

impl Db2Dialect {
    fn guarded_block(predicate: &str, ddl: &str) -> String {
        format!(
            "BEGIN\n    IF {} THEN\n        EXECUTE IMMEDIATE '{}';\n    END IF;\nEND",
            predicate,
            escape_literal(ddl)
        )
    }

    fn table_exists(table: &str) -> String {
        format!(
            "EXISTS (SELECT 1 FROM SYSCAT.TABLES WHERE TABSCHEMA = CURRENT SCHEMA AND TABNAME = '{}')",
            escape_literal(&table.to_uppercase())
        )
    }
}

impl Dialect for Db2Dialect {
    fn vendor(&self) -> Vendor {
        Vendor::Db2
    }

    fn limits(&self) -> &DialectLimits {
        &LIMITS
    }

    fn declare_boolean(&self) -> String {
        "SMALLINT".to_string()
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

    fn current_time_function(&self) -> &'static str {
        "CURRENT TIME"
    }

    fn current_date_function(&self) -> &'static str {
        "CURRENT DATE"
    }

    fn current_datetime_function(&self) -> &'static str {
        "CURRENT TIMESTAMP"
    }

    fn check_referential_action(
        &self,
        on_update: bool,
        action: ReferentialAction,
    ) -> Result<(), DdlError> {
        restrict_only_on_update(Vendor::Db2, on_update, action)
    }

    fn truncate(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {} IMMEDIATE", self.quote_identifier(table))
    }

    fn create_table_if_not_exists(&self, table: &str, create_sql: &str) -> String {
        Self::guarded_block(&format!("NOT {}", Self::table_exists(table)), create_sql)
    }

    fn drop_table_if_exists(&self, table: &str) -> String {
        Self::guarded_block(&Self::table_exists(table), &self.drop_table(table))
    }

    fn create_schema_if_not_exists(&self, schema: &str) -> Result<String, DdlError> {
        Ok(Self::guarded_block(
            &format!(
                "NOT EXISTS (SELECT 1 FROM SYSCAT.SCHEMATA WHERE SCHEMANAME = '{}')",
                escape_literal(&schema.to_uppercase())
            ),
            &format!("CREATE SCHEMA {}", schema),
        ))
    }
}
