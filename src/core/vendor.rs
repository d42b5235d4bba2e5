// データベースベンダー識別子
//
// 対応するデータベース製品の固定列挙を提供します。

use crate::core::error::DdlError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// データベースベンダー
///
/// 不変の識別子であり、レジストリを通じて方言（Dialect）と1対1で対応します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vendor {
    #[serde(rename = "derby")]
    Derby,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgresql", alias = "postgres")]
    PostgreSql,
    #[serde(rename = "oracle")]
    Oracle,
    #[serde(rename = "sqlite")]
    Sqlite,
    #[serde(rename = "db2")]
    Db2,
}

impl Vendor {
    /// 全ベンダー（登録順）
    pub const ALL: [Vendor; 6] = [
        Vendor::Derby,
        Vendor::MySql,
        Vendor::PostgreSql,
        Vendor::Oracle,
        Vendor::Sqlite,
        Vendor::Db2,
    ];

    /// 製品名の照合に使用する正規名
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Vendor::Derby => "Derby",
            Vendor::MySql => "MySQL",
            Vendor::PostgreSql => "PostgreSQL",
            Vendor::Oracle => "Oracle",
            Vendor::Sqlite => "SQLite",
            Vendor::Db2 => "DB2",
        }
    }

    /// 製品名がこのベンダーを指しているか（大文字小文字を無視した部分一致）
    pub fn matches_product_name(&self, product_name: &str) -> bool {
        product_name
            .to_lowercase()
            .contains(&self.canonical_name().to_lowercase())
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vendor::Derby => write!(f, "derby"),
            Vendor::MySql => write!(f, "mysql"),
            Vendor::PostgreSql => write!(f, "postgresql"),
            Vendor::Oracle => write!(f, "oracle"),
            Vendor::Sqlite => write!(f, "sqlite"),
            Vendor::Db2 => write!(f, "db2"),
        }
    }
}

impl FromStr for Vendor {
    type Err = DdlError;

    /// CLI・設定ファイルで使用する識別子からベンダーを解決
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "derby" => Ok(Vendor::Derby),
            "mysql" => Ok(Vendor::MySql),
            "postgresql" | "postgres" => Ok(Vendor::PostgreSql),
            "oracle" => Ok(Vendor::Oracle),
            "sqlite" => Ok(Vendor::Sqlite),
            "db2" => Ok(Vendor::Db2),
            _ => Err(DdlError::UnsupportedVendor {
                vendor: s.to_string(),
            }),
        }
    }
}
