// DDL生成サービス
//
// スキーマ定義と方言から、ベンダー別のCREATE / DROP / TRUNCATE文のバッチを生成します。
// テーブルの並び順は依存関係解決の結果に従い、途中でエラーが発生した場合は
// バッチ全体を破棄します。

use tracing::{debug, info};

use crate::adapters::dialect::Dialect;
use crate::adapters::registry;
use crate::core::config::OutputConfig;
use crate::core::dependency::{resolve_creation_order, resolve_truncation_order};
use crate::core::error::DdlError;
use crate::core::schema::{
    Column, ColumnType, Constraint, DefaultValue, Generation, ReferentialAction, Schema, Table,
};
use crate::core::vendor::Vendor;

/// 生成オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// 条件付きDDL（存在しない場合のみCREATE、存在する場合のみDROP）
    pub if_not_exists: bool,
    /// CREATE INDEX文を含める
    pub include_indexes: bool,
    /// ネイティブENUMを持たないベンダーで値を制限するCHECK制約を含める
    pub include_enum_checks: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            if_not_exists: false,
            include_indexes: true,
            include_enum_checks: true,
        }
    }
}

impl From<&OutputConfig> for GeneratorOptions {
    fn from(output: &OutputConfig) -> Self {
        Self {
            if_not_exists: output.if_not_exists,
            include_indexes: output.include_indexes,
            include_enum_checks: output.include_enum_checks,
        }
    }
}

/// 生成されたDDL文のバッチ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlBatch {
    /// 対象ベンダー
    pub vendor: Vendor,
    /// 実行順に並んだ文（終端記号なし）
    pub statements: Vec<String>,
}

impl DdlBatch {
    /// 空のバッチを作成
    pub fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            statements: Vec::new(),
        }
    }

    /// 文の数
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// 文が1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// スクリプトとして出力
    ///
    /// 各文を `;` で終端します。既に `;` で終わるブロックはそのまま出力し、
    /// OracleのPL/SQLブロックの後には `/` 行を置きます。
    pub fn to_script(&self) -> String {
        let mut script = String::new();
        for statement in &self.statements {
            script.push_str(statement);
            if !statement.trim_end().ends_with(';') {
                script.push(';');
            }
            if self.vendor == Vendor::Oracle && is_plsql_block(statement) {
                script.push_str("\n/");
            }
            script.push_str("\n\n");
        }
        script
    }
}

fn is_plsql_block(statement: &str) -> bool {
    let head = statement.trim_start();
    head.starts_with("DECLARE") || head.starts_with("BEGIN")
}

/// DDLジェネレーター
///
/// 方言は状態を持たないため、ジェネレーター自体も軽量にコピーできます。
#[derive(Debug, Clone, Copy)]
pub struct DdlGenerator {
    dialect: &'static dyn Dialect,
    options: GeneratorOptions,
}

impl DdlGenerator {
    /// 方言を指定してジェネレーターを作成
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            options: GeneratorOptions::default(),
        }
    }

    /// ベンダーを指定してジェネレーターを作成
    pub fn for_vendor(vendor: Vendor) -> Result<Self, DdlError> {
        Ok(Self::new(registry::dialect_for(vendor)?))
    }

    /// 生成オプションを設定
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// 使用する方言
    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    /// 生成オプション
    pub fn options(&self) -> GeneratorOptions {
        self.options
    }

    /// スキーマ全体のCREATE文バッチを生成
    ///
    /// 継承を展開した上で作成順に並べ、テーブルごとに
    /// 名前付きENUM型、CREATE TABLE、CREATE INDEXの順で出力します。
    pub fn create_batch(&self, schema: &Schema) -> Result<DdlBatch, DdlError> {
        let resolved = schema.resolve_inheritance()?;
        let order = resolve_creation_order(&resolved)?;

        let mut batch = DdlBatch::new(self.dialect.vendor());
        for table in &order {
            batch.statements.extend(self.create_table(table)?);
        }

        info!(
            vendor = %batch.vendor,
            tables = order.len(),
            statements = batch.len(),
            "Generated create batch"
        );
        Ok(batch)
    }

    /// スキーマ全体のDROP文バッチを生成
    ///
    /// 作成順の逆順で削除し、テーブルの後にそのテーブルの名前付きENUM型を削除します。
    pub fn drop_batch(&self, schema: &Schema) -> Result<DdlBatch, DdlError> {
        let resolved = schema.resolve_inheritance()?;
        let order = resolve_truncation_order(&resolved)?;

        let mut batch = DdlBatch::new(self.dialect.vendor());
        for table in &order {
            batch.statements.push(if self.options.if_not_exists {
                self.dialect.drop_table_if_exists(&table.name)
            } else {
                self.dialect.drop_table(&table.name)
            });
            for column in enum_columns(table) {
                if let Some(stmt) = self.dialect.drop_enum_type(&enum_type_name(table, column)) {
                    batch.statements.push(stmt);
                }
            }
        }

        info!(vendor = %batch.vendor, statements = batch.len(), "Generated drop batch");
        Ok(batch)
    }

    /// スキーマ全体の全行削除バッチを生成（参照元テーブルが先）
    pub fn truncate_batch(&self, schema: &Schema) -> Result<DdlBatch, DdlError> {
        let resolved = schema.resolve_inheritance()?;
        let order = resolve_truncation_order(&resolved)?;

        let mut batch = DdlBatch::new(self.dialect.vendor());
        batch.statements = order
            .iter()
            .map(|table| self.dialect.truncate(&table.name))
            .collect();

        info!(vendor = %batch.vendor, statements = batch.len(), "Generated truncate batch");
        Ok(batch)
    }

    /// 単一テーブルの作成に必要な文を生成
    ///
    /// 継承は展開済みであることを前提とします。
    pub fn create_table(&self, table: &Table) -> Result<Vec<String>, DdlError> {
        let mut statements = Vec::new();

        for column in enum_columns(table) {
            if let ColumnType::Enum {
                values: Some(values),
            } = &column.column_type
            {
                if let Some(stmt) = self
                    .dialect
                    .create_enum_type(&enum_type_name(table, column), values)
                {
                    statements.push(stmt);
                }
            }
        }

        let primary_key = self.primary_key_columns(table)?;
        let inline_identity = self.inline_identity_column(table, &primary_key)?;

        let mut definitions = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            definitions.push(self.column_definition(table, column)?);
        }
        definitions.extend(self.table_constraints(table, &primary_key, inline_identity)?);

        let create_sql = format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.dialect.quote_identifier(&table.name),
            definitions.join(",\n    ")
        );
        statements.push(if self.options.if_not_exists {
            self.dialect.create_table_if_not_exists(&table.name, &create_sql)
        } else {
            create_sql
        });

        if self.options.include_indexes {
            for index in &table.indexes {
                statements.push(self.dialect.create_index(
                    index.unique,
                    &index.name,
                    index.index_type,
                    &table.name,
                    &index.columns,
                ));
            }
        }

        debug!(table = %table.name, statements = statements.len(), "Generated table DDL");
        Ok(statements)
    }

    /// カラム定義句
    ///
    /// `名前 型 [生成指示 | DEFAULT] [NOT NULL] [UNIQUE]` の順で組み立てます。
    fn column_definition(&self, table: &Table, column: &Column) -> Result<String, DdlError> {
        let declared = self
            .dialect
            .declare_type(&column.column_type, &enum_type_name(table, column))?;

        let mut definition = format!("{} {}", self.dialect.quote_identifier(&column.name), declared);

        match &column.default {
            Some(DefaultValue::Generated { generate }) => {
                let clause = match generate {
                    Generation::AutoIncrement => self.dialect.identity_clause().to_string(),
                    Generation::CurrentDate => {
                        format!("DEFAULT {}", self.dialect.current_date_function())
                    }
                    Generation::CurrentTime => {
                        format!("DEFAULT {}", self.dialect.current_time_function())
                    }
                    Generation::CurrentTimestamp => {
                        format!("DEFAULT {}", self.dialect.current_datetime_function())
                    }
                };
                definition.push(' ');
                definition.push_str(&clause);
            }
            Some(DefaultValue::Literal(literal)) => {
                definition.push_str(" DEFAULT ");
                definition.push_str(literal);
            }
            None => {}
        }

        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        if column.unique {
            definition.push_str(" UNIQUE");
        }
        Ok(definition)
    }

    /// プライマリキーのカラム
    ///
    /// PRIMARY_KEY制約とカラムのprimary_keyフラグのどちらで宣言してもよいが、
    /// 両方で異なるカラムを宣言した場合や制約が複数ある場合はエラーです。
    fn primary_key_columns(&self, table: &Table) -> Result<Vec<String>, DdlError> {
        let declared_count = table
            .constraints
            .iter()
            .filter(|c| matches!(c, Constraint::PRIMARY_KEY { .. }))
            .count();
        if declared_count > 1 {
            return Err(DdlError::invalid_schema(format!(
                "Table '{}' declares {} primary key constraints",
                table.name, declared_count
            )));
        }

        let flagged = table.flagged_primary_key();
        match table.declared_primary_key() {
            Some(declared) if !flagged.is_empty() && declared != flagged.as_slice() => {
                Err(DdlError::invalid_schema(format!(
                    "Table '{}' declares primary key ({}) but columns ({}) are flagged as primary key",
                    table.name,
                    declared.join(", "),
                    flagged.join(", ")
                )))
            }
            Some(declared) => Ok(declared.to_vec()),
            None => Ok(flagged.into_iter().map(str::to_string).collect()),
        }
    }

    /// 自動増分をカラム定義内のPRIMARY KEYとして出力するカラム
    ///
    /// 該当する方言（SQLite）では、自動増分は単一カラムの整数プライマリキーでのみ使用できます。
    fn inline_identity_column<'t>(
        &self,
        table: &'t Table,
        primary_key: &[String],
    ) -> Result<Option<&'t Column>, DdlError> {
        if !self.dialect.identity_is_inline_primary_key() {
            return Ok(None);
        }

        let mut identities = table.columns.iter().filter(|c| c.is_auto_increment());
        let Some(column) = identities.next() else {
            return Ok(None);
        };

        let single_integer_key = identities.next().is_none()
            && primary_key.len() == 1
            && primary_key[0] == column.name
            && matches!(column.column_type, ColumnType::Integer { .. });
        if !single_integer_key {
            return Err(DdlError::unsupported(
                format!(
                    "AUTO_INCREMENT on {}.{} outside a single-column integer primary key",
                    table.name, column.name
                ),
                self.dialect.vendor().canonical_name(),
            ));
        }
        Ok(Some(column))
    }

    /// テーブルレベルの制約句
    ///
    /// PRIMARY KEY、UNIQUE、FOREIGN KEY（カラム単位の参照を含む）、CHECK、ENUMのCHECKの順です。
    fn table_constraints(
        &self,
        table: &Table,
        primary_key: &[String],
        inline_identity: Option<&Column>,
    ) -> Result<Vec<String>, DdlError> {
        let mut clauses = Vec::new();

        if !primary_key.is_empty() && inline_identity.is_none() {
            clauses.push(format!(
                "PRIMARY KEY ({})",
                self.dialect.quote_columns(primary_key)
            ));
        }

        for constraint in &table.constraints {
            if let Constraint::UNIQUE { columns } = constraint {
                clauses.push(format!("UNIQUE ({})", self.dialect.quote_columns(columns)));
            }
        }

        for constraint in &table.constraints {
            if let Constraint::FOREIGN_KEY {
                columns,
                referenced_table,
                referenced_columns,
                on_delete,
                on_update,
            } = constraint
            {
                clauses.push(self.foreign_key_clause(
                    columns,
                    referenced_table,
                    referenced_columns,
                    *on_delete,
                    *on_update,
                )?);
            }
        }
        for column in &table.columns {
            if let Some(reference) = &column.references {
                clauses.push(self.foreign_key_clause(
                    std::slice::from_ref(&column.name),
                    &reference.table,
                    std::slice::from_ref(&reference.column),
                    reference.on_delete,
                    reference.on_update,
                )?);
            }
        }

        for constraint in &table.constraints {
            if let Constraint::CHECK { check_expression } = constraint {
                clauses.push(format!("CHECK ({})", check_expression));
            }
        }

        if self.options.include_enum_checks {
            for column in enum_columns(table) {
                if let ColumnType::Enum {
                    values: Some(values),
                } = &column.column_type
                {
                    if let Some(check) = self.dialect.enum_check_constraint(&column.name, values) {
                        clauses.push(check);
                    }
                }
            }
        }

        Ok(clauses)
    }

    fn foreign_key_clause(
        &self,
        columns: &[String],
        referenced_table: &str,
        referenced_columns: &[String],
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
    ) -> Result<String, DdlError> {
        let mut clause = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.dialect.quote_columns(columns),
            self.dialect.quote_identifier(referenced_table),
            self.dialect.quote_columns(referenced_columns)
        );
        for (on_update, action) in [(false, on_delete), (true, on_update)] {
            let Some(action) = action else { continue };
            if let Some(referential) = self.dialect.referential_clause(on_update, action)? {
                clause.push(' ');
                clause.push_str(&referential);
            }
        }
        Ok(clause)
    }
}

/// 名前付きENUM型の型名（`テーブル名_カラム名`）
pub fn enum_type_name(table: &Table, column: &Column) -> String {
    format!("{}_{}", table.name, column.name)
}

fn enum_columns(table: &Table) -> impl Iterator<Item = &Column> {
    table
        .columns
        .iter()
        .filter(|c| matches!(c.column_type, ColumnType::Enum { .. }))
}
