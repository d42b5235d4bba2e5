// ベンダーレジストリ
//
// 製品名からベンダーを、ベンダーから方言を引く対応表を提供します。
// プロセス全体で共有される表は一度だけ構築され、以降は読み取り専用です。

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::adapters::dialect::{
    Db2Dialect, DerbyDialect, Dialect, MySqlDialect, OracleDialect, PostgresDialect,
    SqliteDialect,
};
use crate::core::error::DdlError;
use crate::core::vendor::Vendor;

static GLOBAL: OnceLock<VendorRegistry> = OnceLock::new();

/// ベンダーと方言の対応表
#[derive(Debug)]
pub struct VendorRegistry {
    /// 登録順（製品名照合の優先順位）
    order: Vec<Vendor>,
    dialects: HashMap<Vendor, &'static dyn Dialect>,
}

impl VendorRegistry {
    /// 全ベンダーを登録したプロセス共有のレジストリ
    pub fn global() -> &'static VendorRegistry {
        GLOBAL.get_or_init(|| {
            VendorRegistry::with_dialects([
                (Vendor::Derby, &DerbyDialect as &'static dyn Dialect),
                (Vendor::MySql, &MySqlDialect),
                (Vendor::PostgreSql, &PostgresDialect),
                (Vendor::Oracle, &OracleDialect),
                (Vendor::Sqlite, &SqliteDialect),
                (Vendor::Db2, &Db2Dialect),
            ])
        })
    }

    /// 指定した対応でレジストリを構築
    ///
    /// 同じベンダーが複数回現れた場合は後の登録が方言を上書きし、照合順は最初の位置のままです。
    pub fn with_dialects(
        entries: impl IntoIterator<Item = (Vendor, &'static dyn Dialect)>,
    ) -> Self {
        let mut order = Vec::new();
        let mut dialects = HashMap::new();
        for (vendor, dialect) in entries {
            if dialects.insert(vendor, dialect).is_none() {
                order.push(vendor);
            }
        }
        Self { order, dialects }
    }

    /// 登録済みベンダー（登録順）
    pub fn vendors(&self) -> &[Vendor] {
        &self.order
    }

    /// 製品名からベンダーを解決
    ///
    /// 大文字小文字を無視した部分一致で、登録順に最初に一致したベンダーを返します。
    pub fn lookup(&self, product_name: &str) -> Result<Vendor, DdlError> {
        self.order
            .iter()
            .copied()
            .find(|vendor| vendor.matches_product_name(product_name))
            .ok_or_else(|| DdlError::UnsupportedVendor {
                vendor: product_name.to_string(),
            })
    }

    /// ベンダーに対応する方言を取得
    pub fn dialect_for(&self, vendor: Vendor) -> Result<&'static dyn Dialect, DdlError> {
        self.dialects
            .get(&vendor)
            .copied()
            .ok_or_else(|| DdlError::UnsupportedVendor {
                vendor: vendor.canonical_name().to_string(),
            })
    }
}

/// プロセス共有レジストリで製品名からベンダーを解決
pub fn lookup(product_name: &str) -> Result<Vendor, DdlError> {
    VendorRegistry::global().lookup(product_name)
}

/// プロセス共有レジストリでベンダーの方言を取得
pub fn dialect_for(vendor: Vendor) -> Result<&'static dyn Dialect, DdlError> {
    VendorRegistry::global().dialect_for(vendor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_registry_covers_every_vendor() {
        let registry = VendorRegistry::global();
        assert_eq!(registry.vendors(), &Vendor::ALL);
        for vendor in Vendor::ALL {
            assert_eq!(registry.dialect_for(vendor).unwrap().vendor(), vendor);
        }
    }

    #[test]
    fn test_global_is_initialized_once() {
        let first = VendorRegistry::global() as *const VendorRegistry;
        let second = VendorRegistry::global() as *const VendorRegistry;
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_is_case_insensitive_substring() {
        assert_eq!(lookup("PostgreSQL").unwrap(), Vendor::PostgreSql);
        assert_eq!(lookup("postgresql 16.2").unwrap(), Vendor::PostgreSql);
        assert_eq!(lookup("Apache Derby").unwrap(), Vendor::Derby);
        assert_eq!(lookup("Oracle Database 19c").unwrap(), Vendor::Oracle);
        assert_eq!(lookup("DB2/LINUXX8664").unwrap(), Vendor::Db2);
        assert_eq!(lookup("sqlite").unwrap(), Vendor::Sqlite);
    }

    #[test]
    fn test_lookup_first_registered_match_wins() {
        // 両方の名前を含む製品名は登録順で先のベンダーに解決される
        assert_eq!(lookup("MySQL-compatible PostgreSQL proxy").unwrap(), Vendor::MySql);

        let registry = VendorRegistry::with_dialects([
            (Vendor::PostgreSql, &PostgresDialect as &'static dyn Dialect),
            (Vendor::MySql, &MySqlDialect),
        ]);
        assert_eq!(
            registry.lookup("MySQL-compatible PostgreSQL proxy").unwrap(),
            Vendor::PostgreSql
        );
    }

    #[test]
    fn test_unknown_product_is_unsupported() {
        let err = lookup("Informix Dynamic Server").unwrap_err();
        assert!(err.is_unsupported_vendor());
        assert!(err.to_string().contains("Informix"));
    }

    #[test]
    fn test_partial_registry() {
        let registry =
            VendorRegistry::with_dialects([(Vendor::Sqlite, &SqliteDialect as &'static dyn Dialect)]);
        assert!(registry.dialect_for(Vendor::Sqlite).is_ok());

        let err = registry.dialect_for(Vendor::Oracle).unwrap_err();
        assert!(err.is_unsupported_vendor());
        assert!(err.to_string().contains("Oracle"));
        assert!(registry.lookup("Oracle").unwrap_err().is_unsupported_vendor());
    }
}
