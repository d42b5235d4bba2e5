// スキーマドメインモデル
//
// ベンダー非依存のスキーマ記述子を表現する型システム。
// Schema, Table, Column, ColumnType, Index, Constraint などの構造体を提供します。

use crate::core::error::DdlError;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// スキーマ定義
///
/// テーブル定義を記述順に保持します。
/// 記述順は依存関係解決時のタイブレークに使用されるため、並び替えません。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// スキーマ名
    pub name: String,

    /// テーブル定義のリスト（記述順）
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    /// 新しいスキーマを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// テーブルを追加
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// 指定されたテーブルが存在するか確認
    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.iter().any(|t| t.name == table_name)
    }

    /// 指定されたテーブルを取得
    pub fn get_table(&self, table_name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == table_name)
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// DDL生成対象のテーブル（abstract・skipを除く）
    pub fn generated_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| t.is_generated())
    }

    /// abstractテーブルの継承（extends）を展開したスキーマを返す
    ///
    /// 親テーブルのカラム・制約・インデックスを子テーブルの先頭に取り込みます。
    /// 同名カラムは子テーブルの定義で上書きされます。
    /// 継承元のインデックス名には子テーブル名を接頭辞として付与します。
    pub fn resolve_inheritance(&self) -> Result<Schema, DdlError> {
        let mut resolved: HashMap<String, Table> = HashMap::new();
        let mut tables = Vec::with_capacity(self.tables.len());

        for table in &self.tables {
            let mut visiting = Vec::new();
            tables.push(self.flatten_table(table, &mut resolved, &mut visiting)?);
        }

        Ok(Schema {
            name: self.name.clone(),
            tables,
        })
    }

    fn flatten_table(
        &self,
        table: &Table,
        resolved: &mut HashMap<String, Table>,
        visiting: &mut Vec<String>,
    ) -> Result<Table, DdlError> {
        if let Some(done) = resolved.get(&table.name) {
            return Ok(done.clone());
        }

        let Some(parent_name) = &table.extends else {
            return Ok(table.clone());
        };

        if visiting.contains(&table.name) {
            return Err(DdlError::invalid_schema(format!(
                "Inheritance cycle detected: {} -> {}",
                visiting.join(" -> "),
                table.name
            )));
        }
        visiting.push(table.name.clone());

        let parent = self.get_table(parent_name).ok_or_else(|| {
            DdlError::invalid_schema(format!(
                "Table '{}' extends unknown table '{}'",
                table.name, parent_name
            ))
        })?;
        if !parent.is_abstract {
            return Err(DdlError::invalid_schema(format!(
                "Table '{}' extends '{}', which is not abstract",
                table.name, parent_name
            )));
        }
        let parent = self.flatten_table(parent, resolved, visiting)?;
        visiting.pop();

        let mut columns = parent.columns.clone();
        for column in &table.columns {
            match columns.iter().position(|c| c.name == column.name) {
                Some(pos) => columns[pos] = column.clone(),
                None => columns.push(column.clone()),
            }
        }

        let inherited_indexes = parent.indexes.iter().map(|index| Index {
            name: format!("{}_{}", table.name, index.name),
            ..index.clone()
        });

        let merged = Table {
            name: table.name.clone(),
            columns,
            constraints: parent
                .constraints
                .iter()
                .chain(table.constraints.iter())
                .cloned()
                .collect(),
            indexes: inherited_indexes.chain(table.indexes.iter().cloned()).collect(),
            is_abstract: table.is_abstract,
            skip: table.skip,
            extends: None,
        };

        resolved.insert(table.name.clone(), merged.clone());
        Ok(merged)
    }
}

/// テーブル定義
///
/// 単一のテーブルの構造を表現します。
/// カラム、制約、インデックスの定義を保持します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// テーブル名
    pub name: String,

    /// カラム定義のリスト
    #[serde(default)]
    pub columns: Vec<Column>,

    /// 制約定義のリスト
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// インデックス定義のリスト
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// 継承専用のテンプレートテーブル（DDLを生成しない）
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,

    /// 生成対象から除外するテーブル
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip: bool,

    /// 継承元のabstractテーブル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

impl Table {
    /// 新しいテーブルを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            is_abstract: false,
            skip: false,
            extends: None,
        }
    }

    /// カラムを追加
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// 制約を追加
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// インデックスを追加
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// 指定されたカラムを取得
    pub fn get_column(&self, column_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == column_name)
    }

    /// DDL生成対象かどうか
    pub fn is_generated(&self) -> bool {
        !self.is_abstract && !self.skip
    }

    /// PRIMARY KEY制約で宣言されたカラム
    pub fn declared_primary_key(&self) -> Option<&[String]> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::PRIMARY_KEY { columns } => Some(columns.as_slice()),
            _ => None,
        })
    }

    /// primary_keyフラグが立っているカラム名（記述順）
    pub fn flagged_primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// このテーブルが外部キーで参照しているテーブル名（重複なし、出現順）
    ///
    /// テーブルレベルのFOREIGN_KEY制約と、カラム単位の参照の両方を対象とします。
    pub fn referenced_tables(&self) -> Vec<&str> {
        let from_constraints = self.constraints.iter().filter_map(|c| match c {
            Constraint::FOREIGN_KEY {
                referenced_table, ..
            } => Some(referenced_table.as_str()),
            _ => None,
        });
        let from_columns = self
            .columns
            .iter()
            .filter_map(|c| c.references.as_ref().map(|r| r.table.as_str()));

        let mut tables: Vec<&str> = Vec::new();
        for name in from_constraints.chain(from_columns) {
            if !tables.contains(&name) {
                tables.push(name);
            }
        }
        tables
    }
}

/// カラム定義
///
/// テーブル内の単一カラムの構造を表現します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// カラム名
    pub name: String,

    /// カラム型
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// NULL許可フラグ
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// ユニークフラグ
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    /// プライマリキー構成カラムかどうか
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,

    /// デフォルト値（リテラルまたは生成指示）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    /// カラム単位の外部キー参照
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnReference>,
}

impl Column {
    /// 新しいカラムを作成
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
            unique: false,
            primary_key: false,
            default: None,
            references: None,
        }
    }

    /// プライマリキーとして設定
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// 外部キー参照を設定
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnReference {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
        });
        self
    }

    /// 自動増分カラムかどうか
    pub fn is_auto_increment(&self) -> bool {
        matches!(
            self.default,
            Some(DefaultValue::Generated {
                generate: Generation::AutoIncrement
            })
        )
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_true() -> bool {
    true
}

/// カラム単位の外部キー参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReference {
    /// 参照先テーブル
    pub table: String,

    /// 参照先カラム
    pub column: String,

    /// 参照先レコード削除時のアクション
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,

    /// 参照先レコード更新時のアクション
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

/// デフォルト値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// 生成指示（INSERT時に値を生成）
    Generated {
        /// 生成方法
        generate: Generation,
    },
    /// SQLリテラル（そのまま出力）
    Literal(String),
}

/// 値の生成指示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Generation {
    /// 自動増分
    AutoIncrement,
    /// 現在日付
    CurrentDate,
    /// 現在時刻
    CurrentTime,
    /// 現在日時
    CurrentTimestamp,
}

/// カラム型
///
/// ベンダー非依存の抽象型を表現します。
/// unsignedは数値型にのみ存在します。
/// 既知の型名に対してはフィールドの誤りをそのまま読み込みエラーとし、
/// 未知の型名だけを `Unrecognized` として受け入れます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// 真偽値型
    Boolean,

    /// 整数型
    ///
    /// widthが省略された場合はprecision（10進桁数）またはmin/maxから幅を算出します。
    Integer {
        /// バイト幅 (1, 2, 4, 8)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u8>,
        /// 10進桁数
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u16>,
        /// 符号なしかどうか
        #[serde(default, skip_serializing_if = "is_false")]
        unsigned: bool,
        /// 明示的な最小値
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// 明示的な最大値
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },

    /// 固定小数点数型
    Decimal {
        /// 全体の桁数
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u16>,
        /// 小数点以下の桁数 (0 <= scale <= precision)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<u16>,
        /// 符号なしかどうか
        #[serde(default, skip_serializing_if = "is_false")]
        unsigned: bool,
    },

    /// 浮動小数点型
    Float {
        /// 倍精度かどうか
        #[serde(default, skip_serializing_if = "is_false")]
        double: bool,
        /// 符号なしかどうか
        #[serde(default, skip_serializing_if = "is_false")]
        unsigned: bool,
    },

    /// 文字列型
    Char {
        /// 長さ
        length: u64,
        /// 可変長かどうか
        #[serde(default, skip_serializing_if = "is_false")]
        varying: bool,
    },

    /// バイナリ型
    Binary {
        /// 長さ
        length: u64,
        /// 可変長かどうか
        #[serde(default, skip_serializing_if = "is_false")]
        varying: bool,
    },

    /// 文字ラージオブジェクト型
    Clob {
        /// 最大長
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u64>,
    },

    /// バイナリラージオブジェクト型
    Blob {
        /// 最大長
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u64>,
    },

    /// 日付型
    Date,

    /// 時刻型
    Time {
        /// 秒の小数部桁数
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u8>,
    },

    /// 日時型
    #[serde(rename = "DATETIME")]
    DateTime {
        /// 秒の小数部桁数
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u8>,
    },

    /// 期間型
    Interval,

    /// 列挙型
    ///
    /// valuesが省略された場合は長さ0のプレースホルダ型になります。
    Enum {
        /// 許可される値（順序を保持）
        #[serde(default)]
        values: Option<Vec<String>>,
    },

    /// 認識できない型
    ///
    /// 読み込み時には受け入れ、型宣言の生成時にUnsupportedOperationとして扱います。
    #[serde(skip)]
    Unrecognized {
        /// 型名
        kind: String,
    },
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ColumnType::Unrecognized { kind } => {
                let mut state = serializer.serialize_struct("ColumnType", 1)?;
                state.serialize_field("kind", kind)?;
                state.end()
            }
            known => ColumnType::serialize(known, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = match value.get("kind") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(_) => return Err(de::Error::custom("column type kind must be a string")),
            None => return Err(de::Error::missing_field("kind")),
        };

        if !ColumnType::KINDS.contains(&kind.as_str()) {
            return Ok(ColumnType::Unrecognized { kind });
        }
        ColumnType::deserialize(value)
            .map_err(|e| de::Error::custom(format!("invalid {} column type: {}", kind, e)))
    }
}

impl ColumnType {
    /// 認識できる型名
    pub const KINDS: [&'static str; 13] = [
        "BOOLEAN", "INTEGER", "DECIMAL", "FLOAT", "CHAR", "BINARY", "CLOB", "BLOB", "DATE",
        "TIME", "DATETIME", "INTERVAL", "ENUM",
    ];

    /// 型名を取得
    pub fn kind_name(&self) -> &str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer { .. } => "INTEGER",
            ColumnType::Decimal { .. } => "DECIMAL",
            ColumnType::Float { .. } => "FLOAT",
            ColumnType::Char { .. } => "CHAR",
            ColumnType::Binary { .. } => "BINARY",
            ColumnType::Clob { .. } => "CLOB",
            ColumnType::Blob { .. } => "BLOB",
            ColumnType::Date => "DATE",
            ColumnType::Time { .. } => "TIME",
            ColumnType::DateTime { .. } => "DATETIME",
            ColumnType::Interval => "INTERVAL",
            ColumnType::Enum { .. } => "ENUM",
            ColumnType::Unrecognized { kind } => kind,
        }
    }

    /// 数値型かどうか
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer { .. } | ColumnType::Decimal { .. } | ColumnType::Float { .. }
        )
    }

    /// 整数型の簡易コンストラクタ
    pub fn integer(width: u8) -> Self {
        ColumnType::Integer {
            width: Some(width),
            precision: None,
            unsigned: false,
            min: None,
            max: None,
        }
    }

    /// 可変長文字列型の簡易コンストラクタ
    pub fn varchar(length: u64) -> Self {
        ColumnType::Char {
            length,
            varying: true,
        }
    }
}

/// インデックスの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "BTREE")]
    BTree,
    #[serde(rename = "HASH")]
    Hash,
}

impl IndexType {
    /// SQL句として出力する文字列を返す
    pub fn as_sql(&self) -> &'static str {
        match self {
            IndexType::BTree => "BTREE",
            IndexType::Hash => "HASH",
        }
    }
}

/// インデックス定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// インデックス名
    pub name: String,

    /// インデックス対象のカラム名リスト
    pub columns: Vec<String>,

    /// ユニークインデックスかどうか
    #[serde(default)]
    pub unique: bool,

    /// インデックスの種類
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<IndexType>,
}

impl Index {
    /// 新しいインデックスを作成
    pub fn new(name: impl Into<String>, columns: Vec<String>, unique: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            unique,
            index_type: None,
        }
    }
}

/// 参照アクション
///
/// FOREIGN KEY制約のON DELETE / ON UPDATE句で使用するアクションを表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    /// 何もしない（デフォルト）
    #[default]
    NoAction,
    /// 参照先の変更に追従して削除/更新
    Cascade,
    /// 参照先の削除/更新時にNULLに設定
    SetNull,
    /// 参照先の削除/更新時にデフォルト値に設定
    SetDefault,
    /// 参照先の削除/更新を制限
    Restrict,
}

impl ReferentialAction {
    /// SQL句として出力する文字列を返す
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
        }
    }
}

/// 制約定義
///
/// テーブルの制約（PRIMARY KEY, FOREIGN KEY, UNIQUE, CHECK）を表現します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(non_camel_case_types)]
pub enum Constraint {
    /// プライマリキー制約
    PRIMARY_KEY {
        /// 対象カラム
        columns: Vec<String>,
    },

    /// 外部キー制約
    FOREIGN_KEY {
        /// 対象カラム
        columns: Vec<String>,

        /// 参照先テーブル
        referenced_table: String,

        /// 参照先カラム
        referenced_columns: Vec<String>,

        /// 参照先レコード削除時のアクション
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_delete: Option<ReferentialAction>,

        /// 参照先レコード更新時のアクション
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_update: Option<ReferentialAction>,
    },

    /// ユニーク制約
    UNIQUE {
        /// 対象カラム
        columns: Vec<String>,
    },

    /// チェック制約
    CHECK {
        /// チェック式
        check_expression: String,
    },
}

impl Constraint {
    /// 制約の種類を文字列で取得
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::PRIMARY_KEY { .. } => "PRIMARY_KEY",
            Constraint::FOREIGN_KEY { .. } => "FOREIGN_KEY",
            Constraint::UNIQUE { .. } => "UNIQUE",
            Constraint::CHECK { .. } => "CHECK",
        }
    }
}
