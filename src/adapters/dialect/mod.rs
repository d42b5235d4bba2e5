// SQL方言アダプター
//
// ベンダー非依存のカラム型・DDL断片を各データベースの具体的な構文に変換します。
// 方言ごとの差異はDialectトレイトの実装に、共通処理はこのモジュールの関数に置きます。

pub mod db2;
pub mod derby;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

pub use db2::Db2Dialect;
pub use derby::DerbyDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::core::error::DdlError;
use crate::core::numeric_width::{self, integer_width_for, IntegerWidth};
use crate::core::schema::{ColumnType, IndexType, ReferentialAction};
use crate::core::vendor::Vendor;

/// ベンダーごとの型能力の上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectLimits {
    /// DECIMALの最大精度
    pub max_precision: u16,
    /// DECIMALの最大スケール（Noneは精度以外の上限なし）
    pub max_scale: Option<u16>,
    /// 固定長文字列の最大長
    pub max_char_length: u64,
    /// 可変長文字列の最大長
    pub max_varchar_length: u64,
    /// 固定長バイナリの最大長
    pub max_binary_length: u64,
    /// 可変長バイナリの最大長
    pub max_varbinary_length: u64,
    /// CLOBの最大長
    pub max_clob_length: u64,
    /// BLOBの最大長
    pub max_blob_length: u64,
    /// 秒の小数部の最大桁数（Noneは小数秒の指定をサポートしない）
    pub fractional_seconds_max: Option<u8>,
}

/// SQL方言トレイト
///
/// 状態を持たないベンダー別の実装が、型宣言とDDL断片の生成を担います。
/// 能力を超える型定義は `DdlError::DataType`、変換の存在しない操作は
/// `DdlError::UnsupportedOperation` として返します。
pub trait Dialect: Send + Sync + fmt::Debug {
    /// 対応するベンダー
    fn vendor(&self) -> Vendor;

    /// 型能力の上限
    fn limits(&self) -> &DialectLimits;

    /// 識別子をクォート（デフォルトはクォートなし）
    fn quote_identifier(&self, name: &str) -> String {
        name.to_string()
    }

    /// カラム名リストをクォートしてカンマ区切りで結合
    fn quote_columns(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 真偽値型
    fn declare_boolean(&self) -> String {
        "BOOLEAN".to_string()
    }

    /// 整数型
    ///
    /// 要求された幅より狭い型を返してはいけません。
    fn declare_integer(&self, width: IntegerWidth, unsigned: bool) -> String;

    /// 固定小数点数型
    fn declare_decimal(
        &self,
        precision: Option<u16>,
        scale: Option<u16>,
        _unsigned: bool,
    ) -> Result<String, DdlError> {
        decimal_declaration(self.limits(), "DECIMAL", precision, scale, "")
    }

    /// 浮動小数点型
    fn declare_float(&self, double: bool, _unsigned: bool) -> String {
        if double {
            "DOUBLE PRECISION".to_string()
        } else {
            "REAL".to_string()
        }
    }

    /// 文字列型
    fn declare_char(&self, varying: bool, length: u64) -> Result<String, DdlError> {
        if varying {
            validate_length("VARCHAR", length, self.limits().max_varchar_length)?;
            Ok(format!("VARCHAR({})", length))
        } else {
            validate_length("CHAR", length, self.limits().max_char_length)?;
            Ok(format!("CHAR({})", length))
        }
    }

    /// バイナリ型
    fn declare_binary(&self, varying: bool, length: u64) -> Result<String, DdlError> {
        if varying {
            validate_length("VARBINARY", length, self.limits().max_varbinary_length)?;
            Ok(format!("VARBINARY({})", length))
        } else {
            validate_length("BINARY", length, self.limits().max_binary_length)?;
            Ok(format!("BINARY({})", length))
        }
    }

    /// 文字ラージオブジェクト型
    fn declare_clob(&self, length: Option<u64>) -> Result<String, DdlError> {
        match length {
            Some(length) => {
                validate_length("CLOB", length, self.limits().max_clob_length)?;
                Ok(format!("CLOB({})", length))
            }
            None => Ok("CLOB".to_string()),
        }
    }

    /// バイナリラージオブジェクト型
    fn declare_blob(&self, length: Option<u64>) -> Result<String, DdlError> {
        match length {
            Some(length) => {
                validate_length("BLOB", length, self.limits().max_blob_length)?;
                Ok(format!("BLOB({})", length))
            }
            None => Ok("BLOB".to_string()),
        }
    }

    /// 日付型
    fn declare_date(&self) -> String {
        "DATE".to_string()
    }

    /// 時刻型
    fn declare_time(&self, precision: Option<u8>) -> Result<String, DdlError> {
        fractional_declaration(self.limits(), "TIME", precision)
    }

    /// 日時型
    fn declare_datetime(&self, precision: Option<u8>) -> Result<String, DdlError> {
        fractional_declaration(self.limits(), "TIMESTAMP", precision)
    }

    /// 期間型
    fn declare_interval(&self) -> Result<String, DdlError> {
        Err(DdlError::unsupported(
            "INTERVAL column type",
            self.vendor().canonical_name(),
        ))
    }

    /// 列挙型
    ///
    /// ネイティブENUMを持たないベンダーでは最長値の長さのVARCHARになります。
    /// 値が空または未指定の場合は長さ0のプレースホルダになります。
    fn declare_enum(&self, _type_name: &str, values: Option<&[String]>) -> String {
        format!("VARCHAR({})", enum_length(values))
    }

    /// 名前付きENUM型の作成文（名前付き型を持つベンダーのみ）
    fn create_enum_type(&self, _type_name: &str, _values: &[String]) -> Option<String> {
        None
    }

    /// 名前付きENUM型の削除文（名前付き型を持つベンダーのみ）
    fn drop_enum_type(&self, _type_name: &str) -> Option<String> {
        None
    }

    /// ENUM値を制限するCHECK制約（ネイティブENUMを持たないベンダーのみ）
    fn enum_check_constraint(&self, column: &str, values: &[String]) -> Option<String> {
        if values.is_empty() {
            return None;
        }
        Some(format!(
            "CHECK ({} IN ({}))",
            self.quote_identifier(column),
            enum_literals(values)
        ))
    }

    /// 自動増分カラムの生成指示
    fn identity_clause(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    /// 自動増分をカラム定義内のPRIMARY KEYとして出力するかどうか
    fn identity_is_inline_primary_key(&self) -> bool {
        false
    }

    /// 現在時刻を返す関数
    fn current_time_function(&self) -> &'static str {
        "CURRENT_TIME"
    }

    /// 現在日付を返す関数
    fn current_date_function(&self) -> &'static str {
        "CURRENT_DATE"
    }

    /// 現在日時を返す関数
    fn current_datetime_function(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    /// 参照アクションがこのベンダーで使用可能か検証
    fn check_referential_action(
        &self,
        _on_update: bool,
        _action: ReferentialAction,
    ) -> Result<(), DdlError> {
        Ok(())
    }

    /// ON DELETE / ON UPDATE句を生成
    ///
    /// 句を省略すべき場合はNoneを返します。
    fn referential_clause(
        &self,
        on_update: bool,
        action: ReferentialAction,
    ) -> Result<Option<String>, DdlError> {
        self.check_referential_action(on_update, action)?;
        let event = if on_update { "UPDATE" } else { "DELETE" };
        Ok(Some(format!("ON {} {}", event, action.as_sql())))
    }

    /// CREATE INDEX文を生成（インデックス種別はデフォルトで無視）
    fn create_index(
        &self,
        unique: bool,
        name: &str,
        _index_type: Option<IndexType>,
        table: &str,
        columns: &[String],
    ) -> String {
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.quote_identifier(name),
            self.quote_identifier(table),
            self.quote_columns(columns)
        )
    }

    /// テーブルの全行を削除する文
    fn truncate(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.quote_identifier(table))
    }

    /// DROP TABLE文
    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote_identifier(table))
    }

    /// テーブルが存在しない場合のみCREATE TABLEを実行する文
    fn create_table_if_not_exists(&self, _table: &str, create_sql: &str) -> String {
        create_sql.replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1)
    }

    /// テーブルが存在する場合のみDROP TABLEを実行する文
    fn drop_table_if_exists(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote_identifier(table))
    }

    /// スキーマが存在しない場合のみ作成する文
    fn create_schema_if_not_exists(&self, schema: &str) -> Result<String, DdlError> {
        Ok(format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            self.quote_identifier(schema)
        ))
    }

    /// 抽象カラム型を型宣言に変換
    ///
    /// `enum_type_name` は名前付きENUM型を持つベンダーで使用する型名です。
    fn declare_type(&self, column_type: &ColumnType, enum_type_name: &str) -> Result<String, DdlError> {
        match column_type {
            ColumnType::Boolean => Ok(self.declare_boolean()),
            ColumnType::Integer {
                width,
                precision,
                unsigned,
                min,
                max,
            } => match integer_width_for(*width, *precision, *unsigned, *min, *max)? {
                Some(width) => Ok(self.declare_integer(width, *unsigned)),
                None => self.declare_decimal(Some(precision.unwrap_or(19)), Some(0), *unsigned),
            },
            ColumnType::Decimal {
                precision,
                scale,
                unsigned,
            } => self.declare_decimal(*precision, *scale, *unsigned),
            ColumnType::Float { double, unsigned } => Ok(self.declare_float(*double, *unsigned)),
            ColumnType::Char { length, varying } => self.declare_char(*varying, *length),
            ColumnType::Binary { length, varying } => self.declare_binary(*varying, *length),
            ColumnType::Clob { length } => self.declare_clob(*length),
            ColumnType::Blob { length } => self.declare_blob(*length),
            ColumnType::Date => Ok(self.declare_date()),
            ColumnType::Time { precision } => self.declare_time(*precision),
            ColumnType::DateTime { precision } => self.declare_datetime(*precision),
            ColumnType::Interval => self.declare_interval(),
            ColumnType::Enum { values } => {
                if values.as_deref().map_or(true, <[String]>::is_empty) {
                    warn!(
                        vendor = %self.vendor(),
                        type_name = %enum_type_name,
                        "Enum has no values, declaring zero-length placeholder"
                    );
                }
                Ok(self.declare_enum(enum_type_name, values.as_deref()))
            }
            ColumnType::Unrecognized { kind } => Err(DdlError::unsupported(
                format!("column type {}", kind),
                self.vendor().canonical_name(),
            )),
        }
    }
}

/// 指定文字で識別子をクォート（閉じ文字は二重にエスケープ）
pub fn quote_with(name: &str, open: char, close: char) -> String {
    let escaped = name.replace(close, &format!("{}{}", close, close));
    format!("{}{}{}", open, escaped, close)
}

/// SQL文字列リテラル用にシングルクォートをエスケープ
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// ENUM値を `'a', 'b'` 形式のリテラルリストに変換
pub fn enum_literals(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", escape_literal(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// ENUM値を格納するのに必要な文字列長（最長値の文字数）
///
/// 値が空または未指定の場合は0です。
pub fn enum_length(values: Option<&[String]>) -> usize {
    values
        .unwrap_or_default()
        .iter()
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
}

/// `ENUM('a', 'b')` または `'a', 'b'` 形式の宣言からENUM値を取り出す
///
/// 二重化されたシングルクォートは1つに戻します。形式が不正な場合はNoneを返します。
pub fn parse_enum(declaration: &str) -> Option<Vec<String>> {
    let trimmed = declaration.trim();
    let body = match trimmed.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ENUM(") => trimmed[5..].strip_suffix(')')?,
        _ => trimmed,
    };

    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some('\'') => {}
            Some(_) => return None,
        }

        let mut value = String::new();
        loop {
            match chars.next()? {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                '\'' => break,
                c => value.push(c),
            }
        }
        values.push(value);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => {}
            Some(_) => return None,
        }
    }
    Some(values)
}

/// 長さ指定を検証（1以上、上限以下）
pub fn validate_length(type_name: &str, length: u64, max_length: u64) -> Result<(), DdlError> {
    if length == 0 {
        return Err(DdlError::data_type(
            format!("{} length must be at least 1", type_name),
            "min_length",
        ));
    }
    if length > max_length {
        return Err(DdlError::data_type(
            format!(
                "{} length {} exceeds maximum length {}",
                type_name, length, max_length
            ),
            "max_length",
        ));
    }
    Ok(())
}

/// 固定小数点数の型宣言を組み立て
///
/// 精度・スケールともに未指定なら `(5, 0)`、スケールのみ未指定なら0とし、
/// 精度なしでスケールだけを指定した場合はエラーです。
/// ベンダーの上限で検証した上で `TYPE(p, s)` に `suffix` を付けて返します。
pub fn decimal_declaration(
    limits: &DialectLimits,
    type_name: &str,
    precision: Option<u16>,
    scale: Option<u16>,
    suffix: &str,
) -> Result<String, DdlError> {
    let (precision, scale) = match (precision, scale) {
        (None, None) => (5, 0),
        (Some(p), s) => (p, s.unwrap_or(0)),
        (None, Some(s)) => {
            return Err(DdlError::data_type(
                format!("scale {} requires an explicit precision", s),
                "precision",
            ))
        }
    };
    numeric_width::validate(precision, scale, limits.max_precision, limits.max_scale)?;
    Ok(format!("{}({}, {}){}", type_name, precision, scale, suffix))
}

/// 秒の小数部を持つ時刻・日時型の宣言を組み立て
///
/// 小数秒をサポートしないベンダーでは精度を無視します。
pub fn fractional_declaration(
    limits: &DialectLimits,
    type_name: &str,
    precision: Option<u8>,
) -> Result<String, DdlError> {
    match (precision, limits.fractional_seconds_max) {
        (Some(p), Some(max)) => {
            if p > max {
                return Err(DdlError::data_type(
                    format!(
                        "{} fractional seconds precision {} exceeds maximum {}",
                        type_name, p, max
                    ),
                    "fractional_seconds_max",
                ));
            }
            Ok(format!("{}({})", type_name, p))
        }
        _ => Ok(type_name.to_string()),
    }
}

/// 小数秒精度を上限に対して検証のみ行う（宣言に精度を含めないベンダー用）
pub fn check_fractional_precision(
    limits: &DialectLimits,
    type_name: &str,
    precision: Option<u8>,
) -> Result<(), DdlError> {
    fractional_declaration(limits, type_name, precision).map(|_| ())
}

/// 符号付き整数型のみを持つベンダーの整数型選択
///
/// unsignedの場合は値域を収容できるよう一段広い型を選び、
/// 8バイトの符号なし整数は `DECIMAL(20, 0)` で表現します。
pub fn signed_integer_type(width: IntegerWidth, unsigned: bool) -> String {
    let effective = if unsigned { width.wider() } else { Some(width) };
    match effective {
        Some(IntegerWidth::One) | Some(IntegerWidth::Two) => "SMALLINT".to_string(),
        Some(IntegerWidth::Four) => "INTEGER".to_string(),
        Some(IntegerWidth::Eight) => "BIGINT".to_string(),
        None => format!("DECIMAL({}, 0)", IntegerWidth::Eight.decimal_digits(true)),
    }
}

/// ON UPDATE で NO ACTION / RESTRICT のみを受け付けるベンダーの検証
///
/// ON DELETE では SET DEFAULT を受け付けません。
pub(crate) fn restrict_only_on_update(
    vendor: Vendor,
    on_update: bool,
    action: ReferentialAction,
) -> Result<(), DdlError> {
    let allowed = match action {
        ReferentialAction::NoAction | ReferentialAction::Restrict => true,
        ReferentialAction::Cascade | ReferentialAction::SetNull => !on_update,
        ReferentialAction::SetDefault => false,
    };
    if allowed {
        Ok(())
    } else {
        let event = if on_update { "UPDATE" } else { "DELETE" };
        Err(DdlError::unsupported(
            format!("ON {} {}", event, action.as_sql()),
            vendor.canonical_name(),
        ))
    }
}

static NUMERIC_DECLARATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:DECIMAL|NUMERIC|NUMBER)\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").ok()
});

/// 数値型の宣言から `(precision, scale)` を取り出す
///
/// `DECIMAL(10, 2)`, `NUMERIC(5)`, `NUMBER(19, 0) UNSIGNED` などを受け付けます。
pub fn parse_numeric_declaration(declaration: &str) -> Option<(u16, u16)> {
    let re = NUMERIC_DECLARATION.as_ref()?;
    let captures = re.captures(declaration)?;
    let precision = captures.get(1)?.as_str().parse().ok()?;
    let scale = match captures.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some((precision, scale))
}

/// 全ベンダーの方言（登録順）
pub fn all_dialects() -> [&'static dyn Dialect; 6] {
    [
        &DerbyDialect,
        &MySqlDialect,
        &PostgresDialect,
        &OracleDialect,
        &SqliteDialect,
        &Db2Dialect,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quote_with_doubles_closing_char() {
        assert_eq!(quote_with("users", '"', '"'), r#""users""#);
        assert_eq!(quote_with(r#"a"b"#, '"', '"'), r#""a""b""#);
        assert_eq!(quote_with("a`b", '`', '`'), "`a``b`");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("it's"), "it''s");
        assert_eq!(enum_literals(&values(&["a", "o'k"])), "'a', 'o''k'");
    }

    #[test]
    fn test_enum_length() {
        let digits = values(&[
            "ZERO", "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE",
        ]);
        assert_eq!(enum_length(Some(digits.as_slice())), 5);
        assert_eq!(enum_length(Some(&[][..])), 0);
        assert_eq!(enum_length(None), 0);
        assert_eq!(enum_length(Some(values(&["ÄÖÜ"]).as_slice())), 3);
    }

    #[test]
    fn test_parse_enum() {
        assert_eq!(
            parse_enum("ENUM('a', 'b''c', 'd')"),
            Some(values(&["a", "b'c", "d"]))
        );
        assert_eq!(parse_enum("'x','y'"), Some(values(&["x", "y"])));
        assert_eq!(parse_enum("enum()"), Some(vec![]));
        assert_eq!(parse_enum("ENUM('a' 'b')"), None);
        assert_eq!(parse_enum("ENUM('unterminated)"), None);
    }

    #[test]
    fn test_validate_length_bounds() {
        assert_eq!(
            validate_length("CHAR", 0, 10).unwrap_err().bound(),
            Some("min_length")
        );
        assert_eq!(
            validate_length("CHAR", 11, 10).unwrap_err().bound(),
            Some("max_length")
        );
        assert!(validate_length("CHAR", 10, 10).is_ok());
    }

    #[test]
    fn test_parse_numeric_declaration() {
        assert_eq!(parse_numeric_declaration("DECIMAL(10, 2)"), Some((10, 2)));
        assert_eq!(parse_numeric_declaration("numeric(7)"), Some((7, 0)));
        assert_eq!(
            parse_numeric_declaration("DECIMAL(20, 0) UNSIGNED"),
            Some((20, 0))
        );
        assert_eq!(parse_numeric_declaration("NUMBER(38,10)"), Some((38, 10)));
        assert_eq!(parse_numeric_declaration("INTEGER"), None);
    }

    #[test]
    fn test_decimal_defaults() {
        let limits = MySqlDialect.limits();
        assert_eq!(
            decimal_declaration(limits, "DECIMAL", None, None, "").unwrap(),
            "DECIMAL(5, 0)"
        );
        assert_eq!(
            decimal_declaration(limits, "DECIMAL", Some(12), None, "").unwrap(),
            "DECIMAL(12, 0)"
        );
        assert_eq!(
            decimal_declaration(limits, "DECIMAL", Some(10), Some(11), "")
                .unwrap_err()
                .bound(),
            Some("precision")
        );
        // 精度なしのスケール指定は補完しない
        let err = decimal_declaration(limits, "DECIMAL", None, Some(2), "").unwrap_err();
        assert!(err.is_data_type());
        assert_eq!(err.bound(), Some("precision"));
    }

    #[test]
    fn test_decimal_declarations_reparse_on_every_vendor() {
        for dialect in all_dialects() {
            let max = dialect.limits().max_precision.min(40);
            for precision in 1..=max {
                for scale in [0, 1, precision / 2, precision] {
                    let Ok(declared) = dialect.declare_decimal(Some(precision), Some(scale), false)
                    else {
                        assert!(dialect.limits().max_scale.is_some_and(|s| scale > s));
                        continue;
                    };
                    assert_eq!(
                        parse_numeric_declaration(&declared),
                        Some((precision, scale)),
                        "{:?} {}",
                        dialect.vendor(),
                        declared
                    );
                }
            }
        }
    }

    #[test]
    fn test_unrecognized_type_is_unsupported() {
        for dialect in all_dialects() {
            let err = dialect
                .declare_type(
                    &ColumnType::Unrecognized {
                        kind: "GEOMETRY".to_string(),
                    },
                    "t",
                )
                .unwrap_err();
            assert!(err.is_unsupported_operation());
            assert!(err.to_string().contains("GEOMETRY"));
        }
    }

    #[test]
    fn test_oversized_integer_precision_falls_back_to_decimal() {
        let column_type = ColumnType::Integer {
            width: None,
            precision: Some(25),
            unsigned: false,
            min: None,
            max: None,
        };
        assert_eq!(
            PostgresDialect.declare_type(&column_type, "t").unwrap(),
            "DECIMAL(25, 0)"
        );
        assert_eq!(
            OracleDialect.declare_type(&column_type, "t").unwrap(),
            "NUMBER(25, 0)"
        );
    }

    #[test]
    fn test_fractional_declaration() {
        let limits = PostgresDialect.limits();
        assert_eq!(
            fractional_declaration(limits, "TIME", Some(3)).unwrap(),
            "TIME(3)"
        );
        assert_eq!(fractional_declaration(limits, "TIME", None).unwrap(), "TIME");
        assert_eq!(
            fractional_declaration(limits, "TIME", Some(7))
                .unwrap_err()
                .bound(),
            Some("fractional_seconds_max")
        );
    }
}
