// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、DdlError, ValidationError, ConfigError, IoError, DatabaseError を定義します。

use thiserror::Error;

/// DDL生成エラー
///
/// 型変換・依存関係解決・DDL組み立て時に発生するエラーを表現します。
/// いずれも生成時に確定する決定的なエラーであり、リトライされることはありません。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DdlError {
    /// ベンダーの能力を超える型定義（精度・スケール・長さ）
    #[error("Data type error: {message} (bound: {bound})")]
    DataType {
        /// エラーメッセージ
        message: String,
        /// 違反した境界の名前（例: "max_precision"）
        bound: String,
    },

    /// 未対応のベンダー
    #[error("Unsupported vendor: {vendor}")]
    UnsupportedVendor {
        /// ベンダー名（製品名または識別子）
        vendor: String,
    },

    /// 外部キーの循環参照
    #[error("Circular foreign key reference detected between tables: {}", .tables.join(", "))]
    SchemaCycle {
        /// 循環に含まれるテーブル名（宣言順）
        tables: Vec<String>,
    },

    /// 方言に対応する変換が存在しない操作
    #[error("Unsupported operation for {vendor}: {operation}")]
    UnsupportedOperation {
        /// 操作の説明
        operation: String,
        /// 対象ベンダー
        vendor: String,
    },

    /// スキーマ定義の構造的な不正（継承の不整合など）
    #[error("Invalid schema: {message}")]
    InvalidSchema {
        /// エラーメッセージ
        message: String,
    },
}

impl DdlError {
    /// DataTypeエラーを作成
    pub fn data_type(message: impl Into<String>, bound: impl Into<String>) -> Self {
        DdlError::DataType {
            message: message.into(),
            bound: bound.into(),
        }
    }

    /// UnsupportedOperationエラーを作成
    pub fn unsupported(operation: impl Into<String>, vendor: impl ToString) -> Self {
        DdlError::UnsupportedOperation {
            operation: operation.into(),
            vendor: vendor.to_string(),
        }
    }

    /// InvalidSchemaエラーを作成
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        DdlError::InvalidSchema {
            message: message.into(),
        }
    }

    /// 型エラーかどうか
    pub fn is_data_type(&self) -> bool {
        matches!(self, DdlError::DataType { .. })
    }

    /// 未対応ベンダーエラーかどうか
    pub fn is_unsupported_vendor(&self) -> bool {
        matches!(self, DdlError::UnsupportedVendor { .. })
    }

    /// 循環参照エラーかどうか
    pub fn is_schema_cycle(&self) -> bool {
        matches!(self, DdlError::SchemaCycle { .. })
    }

    /// 未対応操作エラーかどうか
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self, DdlError::UnsupportedOperation { .. })
    }

    /// 違反した境界名を取得（DataTypeエラーのみ）
    pub fn bound(&self) -> Option<&str> {
        match self {
            DdlError::DataType { bound, .. } => Some(bound),
            _ => None,
        }
    }
}

/// バリデーションエラー
///
/// スキーマ定義ファイルの検証時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// Reference error
    #[error("Reference error: {message}{}", format_location_opt(.location))]
    Reference {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
        /// 修正提案
        suggestion: Option<String>,
    },

    /// Constraint error
    #[error("Constraint error: {message}{}", format_location_opt(.location))]
    Constraint {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
        /// 修正提案
        suggestion: Option<String>,
    },

    /// Dialect constraint error (type not supported in specific database)
    #[error("Dialect constraint error ({dialect}): {message}{}", format_location_opt(.location))]
    DialectConstraint {
        /// エラーメッセージ
        message: String,
        /// エラー発生位置
        location: Option<ErrorLocation>,
        /// 対象のデータベース方言
        dialect: String,
    },
}

impl ValidationError {
    /// 参照エラーかどうか
    pub fn is_reference(&self) -> bool {
        matches!(self, ValidationError::Reference { .. })
    }

    /// 制約エラーかどうか
    pub fn is_constraint(&self) -> bool {
        matches!(self, ValidationError::Constraint { .. })
    }

    /// 方言制約エラーかどうか
    pub fn is_dialect_constraint(&self) -> bool {
        matches!(self, ValidationError::DialectConstraint { .. })
    }

    /// エラー発生位置を取得
    pub fn location(&self) -> Option<&ErrorLocation> {
        match self {
            ValidationError::Reference { location, .. }
            | ValidationError::Constraint { location, .. }
            | ValidationError::DialectConstraint { location, .. } => location.as_ref(),
        }
    }

    /// 修正提案を取得
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ValidationError::Reference { suggestion, .. }
            | ValidationError::Constraint { suggestion, .. } => suggestion.as_deref(),
            ValidationError::DialectConstraint { .. } => None,
        }
    }
}

/// バリデーション警告
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// 警告メッセージ
    pub message: String,
    /// 警告発生位置
    pub location: Option<ErrorLocation>,
}

impl ValidationWarning {
    /// 新しい警告を作成
    pub fn new(message: String, location: Option<ErrorLocation>) -> Self {
        Self { message, location }
    }

    /// 位置情報をフォーマット
    pub fn format(&self) -> String {
        let location_str = self
            .location
            .as_ref()
            .map_or(String::new(), |loc| loc.format());
        format!("Warning: {}{}", self.message, location_str)
    }
}

/// エラー発生位置
///
/// スキーマファイル内のエラー発生位置を表現します。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorLocation {
    /// テーブル名
    pub table: Option<String>,
    /// カラム名
    pub column: Option<String>,
}

impl ErrorLocation {
    /// テーブル名を指定してエラー位置を作成
    pub fn with_table(table: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: None,
        }
    }

    /// テーブル名とカラム名を指定してエラー位置を作成
    pub fn with_table_and_column(table: &str, column: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: Some(column.to_string()),
        }
    }

    /// 位置情報をフォーマット
    pub fn format(&self) -> String {
        let mut parts = Vec::new();

        if let Some(table) = &self.table {
            parts.push(format!("table: {}", table));
        }
        if let Some(column) = &self.column {
            parts.push(format!("column: {}", column));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

/// 位置情報をフォーマットするヘルパー関数
fn format_location_opt(location: &Option<ErrorLocation>) -> String {
    location.as_ref().map_or(String::new(), |loc| loc.format())
}

/// バリデーション結果
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// エラーのリスト
    pub errors: Vec<ValidationError>,
    /// 警告のリスト
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// 新しいバリデーション結果を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// エラーを追加
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 警告を追加
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 検証が成功したかどうか（エラーがない場合は成功）
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// エラーの数を取得
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告の数を取得
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 他のバリデーション結果をマージ
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// 全エラーを改行区切りの文字列に変換
    pub fn errors_to_string(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 設定エラー
///
/// 設定ファイルの読み込み・検証時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// バージョン未指定
    #[error("Config file version is not specified")]
    MissingVersion,

    /// 環境が見つからない
    #[error("Environment '{name}' not found. Available environments: {available:?}")]
    EnvironmentNotFound {
        /// 指定された環境名
        name: String,
        /// 利用可能な環境名リスト
        available: Vec<String>,
    },

    /// 接続URL未指定
    #[error("Database URL is not specified for environment '{environment}'")]
    MissingUrl {
        /// 環境名
        environment: String,
    },
}

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

/// データベースエラー
///
/// 生成済みSQLの実行時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// Transaction error
    #[error("Transaction error: {message}")]
    Transaction {
        /// エラーメッセージ
        message: String,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }

    /// トランザクションエラーかどうか
    pub fn is_transaction(&self) -> bool {
        matches!(self, DatabaseError::Transaction { .. })
    }
}
