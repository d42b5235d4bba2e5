// スキーマバリデーターサービス
//
// スキーマ定義の整合性、参照整合性、ベンダー固有の型制約を検証するサービス。
// 検出した問題はすべてValidationResultに集約し、最初のエラーで中断しません。

use std::collections::HashSet;

use tracing::debug;

use crate::adapters::dialect::Dialect;
use crate::core::dependency::resolve_creation_order;
use crate::core::error::{
    DdlError, ErrorLocation, ValidationError, ValidationResult, ValidationWarning,
};
use crate::core::schema::{ColumnType, Constraint, ReferentialAction, Schema, Table};
use crate::services::ddl_generator::enum_type_name;

/// スキーマバリデーターサービス
#[derive(Debug, Clone, Default)]
pub struct SchemaValidatorService;

impl SchemaValidatorService {
    /// 新しいSchemaValidatorServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// ベンダー非依存の構造検証を実行
    ///
    /// 重複定義、参照整合性、継承、外部キーの循環を検証します。
    pub fn validate(&self, schema: &Schema) -> ValidationResult {
        let mut result = ValidationResult::new();

        let mut seen_tables = HashSet::new();
        let mut seen_indexes = HashSet::new();
        for table in &schema.tables {
            if !seen_tables.insert(table.name.as_str()) {
                result.add_error(ValidationError::Constraint {
                    message: format!("Table '{}' is defined more than once", table.name),
                    location: Some(ErrorLocation::with_table(&table.name)),
                    suggestion: Some("Rename or remove the duplicate table".to_string()),
                });
            }
            for index in &table.indexes {
                if !seen_indexes.insert(index.name.as_str()) {
                    result.add_error(ValidationError::Constraint {
                        message: format!("Index '{}' is defined more than once", index.name),
                        location: Some(ErrorLocation::with_table(&table.name)),
                        suggestion: None,
                    });
                }
            }
            self.validate_table(schema, table, &mut result);
        }

        match schema.resolve_inheritance() {
            Ok(resolved) => {
                if let Err(DdlError::SchemaCycle { tables }) = resolve_creation_order(&resolved) {
                    result.add_error(ValidationError::Constraint {
                        message: format!(
                            "Circular foreign key reference between tables: {}",
                            tables.join(", ")
                        ),
                        location: tables.first().map(|t| ErrorLocation::with_table(t)),
                        suggestion: Some(
                            "Remove one of the foreign keys or mark a table as skip".to_string(),
                        ),
                    });
                }
            }
            Err(e) => result.add_error(ValidationError::Constraint {
                message: e.to_string(),
                location: None,
                suggestion: None,
            }),
        }

        debug!(
            schema = %schema.name,
            errors = result.error_count(),
            warnings = result.warning_count(),
            "Validated schema structure"
        );
        result
    }

    /// 構造検証に加えて、方言で型宣言と参照アクションを変換できるか検証
    pub fn validate_for_dialect(&self, schema: &Schema, dialect: &dyn Dialect) -> ValidationResult {
        let mut result = self.validate(schema);
        let Ok(resolved) = schema.resolve_inheritance() else {
            // 継承エラーは構造検証で報告済み
            return result;
        };

        let vendor = dialect.vendor().canonical_name().to_string();
        for table in resolved.generated_tables() {
            for column in &table.columns {
                if let Err(e) =
                    dialect.declare_type(&column.column_type, &enum_type_name(table, column))
                {
                    result.add_error(ValidationError::DialectConstraint {
                        message: e.to_string(),
                        location: Some(ErrorLocation::with_table_and_column(
                            &table.name,
                            &column.name,
                        )),
                        dialect: vendor.clone(),
                    });
                }
                if let Some(reference) = &column.references {
                    self.check_actions(
                        dialect,
                        table,
                        reference.on_delete,
                        reference.on_update,
                        &mut result,
                    );
                }
            }
            for constraint in &table.constraints {
                if let Constraint::FOREIGN_KEY {
                    on_delete,
                    on_update,
                    ..
                } = constraint
                {
                    self.check_actions(dialect, table, *on_delete, *on_update, &mut result);
                }
            }
        }

        debug!(
            schema = %schema.name,
            vendor = %dialect.vendor(),
            errors = result.error_count(),
            "Validated schema for dialect"
        );
        result
    }

    fn validate_table(&self, schema: &Schema, table: &Table, result: &mut ValidationResult) {
        if table.columns.is_empty() && table.extends.is_none() && !table.is_abstract {
            result.add_error(ValidationError::Constraint {
                message: format!("Table '{}' has no columns", table.name),
                location: Some(ErrorLocation::with_table(&table.name)),
                suggestion: Some("Define at least one column".to_string()),
            });
        }

        let mut seen_columns = HashSet::new();
        for column in &table.columns {
            if !seen_columns.insert(column.name.as_str()) {
                result.add_error(ValidationError::Constraint {
                    message: format!(
                        "Column '{}' is defined more than once in table '{}'",
                        column.name, table.name
                    ),
                    location: Some(ErrorLocation::with_table_and_column(&table.name, &column.name)),
                    suggestion: None,
                });
            }

            match &column.column_type {
                ColumnType::Enum { values } if values.as_deref().map_or(true, <[String]>::is_empty) => {
                    result.add_warning(ValidationWarning::new(
                        format!(
                            "Enum column '{}' has no values and will be declared with zero length",
                            column.name
                        ),
                        Some(ErrorLocation::with_table_and_column(&table.name, &column.name)),
                    ));
                }
                ColumnType::Integer { .. } => {}
                _ if column.is_auto_increment() => {
                    result.add_error(ValidationError::Constraint {
                        message: format!(
                            "AUTO_INCREMENT column '{}' must be an INTEGER",
                            column.name
                        ),
                        location: Some(ErrorLocation::with_table_and_column(
                            &table.name,
                            &column.name,
                        )),
                        suggestion: Some("Change the column type to INTEGER".to_string()),
                    });
                }
                _ => {}
            }

            if let Some(reference) = &column.references {
                self.check_reference(
                    schema,
                    table,
                    std::slice::from_ref(&column.name),
                    &reference.table,
                    std::slice::from_ref(&reference.column),
                    result,
                );
            }
        }

        for index in &table.indexes {
            for column_name in &index.columns {
                self.check_local_column(table, column_name, &format!("Index '{}'", index.name), result);
            }
        }

        for constraint in &table.constraints {
            match constraint {
                Constraint::PRIMARY_KEY { columns } | Constraint::UNIQUE { columns } => {
                    let owner = format!("{} constraint", constraint.kind());
                    for column_name in columns {
                        self.check_local_column(table, column_name, &owner, result);
                    }
                }
                Constraint::FOREIGN_KEY {
                    columns,
                    referenced_table,
                    referenced_columns,
                    ..
                } => {
                    self.check_reference(
                        schema,
                        table,
                        columns,
                        referenced_table,
                        referenced_columns,
                        result,
                    );
                }
                Constraint::CHECK { .. } => {}
            }
        }

        if table.is_generated()
            && table.extends.is_none()
            && table.declared_primary_key().is_none()
            && table.flagged_primary_key().is_empty()
        {
            result.add_warning(ValidationWarning::new(
                format!("Table '{}' has no primary key", table.name),
                Some(ErrorLocation::with_table(&table.name)),
            ));
        }
    }

    /// 継承を考慮してカラムの存在を確認
    fn check_local_column(
        &self,
        table: &Table,
        column_name: &str,
        owner: &str,
        result: &mut ValidationResult,
    ) {
        // 継承元のカラムは展開後に検証できないため、extendsを持つテーブルでは省略する
        if table.extends.is_some() || table.get_column(column_name).is_some() {
            return;
        }
        result.add_error(ValidationError::Reference {
            message: format!(
                "{} references column '{}' which does not exist in table '{}'",
                owner, column_name, table.name
            ),
            location: Some(ErrorLocation::with_table_and_column(&table.name, column_name)),
            suggestion: Some(format!("Define column '{}'", column_name)),
        });
    }

    fn check_reference(
        &self,
        schema: &Schema,
        table: &Table,
        columns: &[String],
        referenced_table: &str,
        referenced_columns: &[String],
        result: &mut ValidationResult,
    ) {
        for column_name in columns {
            self.check_local_column(table, column_name, "Foreign key", result);
        }

        if columns.len() != referenced_columns.len() {
            result.add_error(ValidationError::Constraint {
                message: format!(
                    "Foreign key on table '{}' has {} column(s) but references {} column(s)",
                    table.name,
                    columns.len(),
                    referenced_columns.len()
                ),
                location: Some(ErrorLocation::with_table(&table.name)),
                suggestion: None,
            });
        }

        let Some(target) = schema.get_table(referenced_table) else {
            result.add_error(ValidationError::Reference {
                message: format!(
                    "Foreign key on table '{}' references table '{}' which does not exist",
                    table.name, referenced_table
                ),
                location: Some(ErrorLocation::with_table(&table.name)),
                suggestion: Some(format!(
                    "Define table '{}' or mark it as skip if it is managed elsewhere",
                    referenced_table
                )),
            });
            return;
        };

        if target.is_abstract {
            result.add_error(ValidationError::Reference {
                message: format!(
                    "Foreign key on table '{}' references abstract table '{}'",
                    table.name, referenced_table
                ),
                location: Some(ErrorLocation::with_table(&table.name)),
                suggestion: None,
            });
        }
        if target.skip {
            result.add_warning(ValidationWarning::new(
                format!(
                    "Table '{}' references skipped table '{}'; it must exist before the generated DDL runs",
                    table.name, referenced_table
                ),
                Some(ErrorLocation::with_table(&table.name)),
            ));
        }

        if target.extends.is_none() {
            for column_name in referenced_columns {
                if target.get_column(column_name).is_none() {
                    result.add_error(ValidationError::Reference {
                        message: format!(
                            "Foreign key on table '{}' references column '{}' which does not exist in table '{}'",
                            table.name, column_name, referenced_table
                        ),
                        location: Some(ErrorLocation::with_table_and_column(
                            referenced_table,
                            column_name,
                        )),
                        suggestion: Some(format!(
                            "Define column '{}' in table '{}'",
                            column_name, referenced_table
                        )),
                    });
                }
            }
        }
    }

    fn check_actions(
        &self,
        dialect: &dyn Dialect,
        table: &Table,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
        result: &mut ValidationResult,
    ) {
        for (is_update, action) in [(false, on_delete), (true, on_update)] {
            let Some(action) = action else { continue };
            if let Err(e) = dialect.check_referential_action(is_update, action) {
                result.add_error(ValidationError::DialectConstraint {
                    message: e.to_string(),
                    location: Some(ErrorLocation::with_table(&table.name)),
                    dialect: dialect.vendor().canonical_name().to_string(),
                });
            }
        }
    }
}
