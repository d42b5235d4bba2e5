// スキーマ読み込みサービス
//
// YAML形式のスキーマ定義ファイルを読み込み、スキーマ記述子に変換します。
// テーブルの記述順はそのまま保持されます。

use crate::core::error::IoError;
use crate::core::schema::Schema;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// スキーマ読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader;

impl SchemaLoader {
    /// 新しいSchemaLoaderを作成
    pub fn new() -> Self {
        Self
    }

    /// YAMLファイルからスキーマを読み込む
    ///
    /// # Errors
    ///
    /// - ファイルが存在しない場合
    /// - ファイルの読み込みに失敗した場合
    /// - YAMLの解析に失敗した場合
    pub fn load_from_file(&self, file_path: &Path) -> Result<Schema> {
        if !file_path.exists() {
            return Err(IoError::FileNotFound {
                path: file_path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(file_path).map_err(|e| IoError::FileRead {
            path: file_path.display().to_string(),
            cause: e.to_string(),
        })?;

        let schema = self
            .load_from_str(&content)
            .with_context(|| format!("Failed to parse schema file: {:?}", file_path))?;
        debug!(
            path = %file_path.display(),
            schema = %schema.name,
            tables = schema.table_count(),
            "Loaded schema"
        );
        Ok(schema)
    }

    /// YAML文字列からスキーマを読み込む
    pub fn load_from_str(&self, content: &str) -> Result<Schema> {
        serde_saphyr::from_str(content).with_context(|| "Invalid schema YAML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ColumnType, Constraint, DefaultValue, Generation, ReferentialAction};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SHOP_YAML: &str = r#"
name: shop
tables:
  - name: order_item
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
      - { name: order_id, type: { kind: INTEGER, width: 4 }, references: { table: order, column: id, on_delete: CASCADE } }
      - { name: price, type: { kind: DECIMAL, precision: 10, scale: 2 } }
  - name: order
    columns:
      - name: id
        type: { kind: INTEGER, width: 4 }
        primary_key: true
        nullable: false
        default: { generate: AUTO_INCREMENT }
      - name: placed_at
        type: { kind: DATETIME, precision: 3 }
        default: { generate: CURRENT_TIMESTAMP }
      - name: state
        type: { kind: ENUM, values: [new, paid, shipped] }
        default: "'new'"
      - name: shape
        type: { kind: GEOMETRY }
    constraints:
      - type: CHECK
        check_expression: "id > 0"
"#;

    #[test]
    fn test_load_from_str_keeps_declaration_order() {
        let schema = SchemaLoader::new().load_from_str(SHOP_YAML).unwrap();
        assert_eq!(schema.name, "shop");
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["order_item", "order"]);
    }

    #[test]
    fn test_column_attributes() {
        let schema = SchemaLoader::new().load_from_str(SHOP_YAML).unwrap();
        let item = schema.get_table("order_item").unwrap();
        let order_id = item.get_column("order_id").unwrap();
        assert!(order_id.nullable);
        let reference = order_id.references.as_ref().unwrap();
        assert_eq!(reference.table, "order");
        assert_eq!(reference.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(
            item.get_column("price").unwrap().column_type,
            ColumnType::Decimal {
                precision: Some(10),
                scale: Some(2),
                unsigned: false
            }
        );

        let order = schema.get_table("order").unwrap();
        assert!(order.get_column("id").unwrap().is_auto_increment());
        assert_eq!(
            order.get_column("placed_at").unwrap().default,
            Some(DefaultValue::Generated {
                generate: Generation::CurrentTimestamp
            })
        );
        assert_eq!(
            order.get_column("state").unwrap().default,
            Some(DefaultValue::Literal("'new'".to_string()))
        );
        assert_eq!(
            order.get_column("shape").unwrap().column_type.kind_name(),
            "GEOMETRY"
        );
        assert!(matches!(order.constraints[0], Constraint::CHECK { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SHOP_YAML.as_bytes()).unwrap();
        let schema = SchemaLoader::new().load_from_file(file.path()).unwrap();
        assert_eq!(schema.table_count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaLoader::new()
            .load_from_file(&dir.path().join("missing.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = SchemaLoader::new()
            .load_from_str("name: shop\ntables: [ { columns: 1 } ]\n")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid schema YAML"));
    }

    #[test]
    fn test_invalid_fields_of_known_kind_are_load_errors() {
        let column = |column_type: &str| {
            format!(
                "name: s\ntables:\n  - name: t\n    columns:\n      - {{ name: c, type: {} }}\n",
                column_type
            )
        };
        let loader = SchemaLoader::new();

        for column_type in [
            "{ kind: CHAR }",
            "{ kind: INTEGER, width: 300 }",
            "{ kind: DECIMAL, precision: -1 }",
        ] {
            let err = loader.load_from_str(&column(column_type)).unwrap_err();
            let message = format!("{:#}", err);
            assert!(message.contains("column type"), "{}: {}", column_type, message);
        }

        let schema = loader.load_from_str(&column("{ kind: GEOMETRY }")).unwrap();
        assert_eq!(
            schema.tables[0].columns[0].column_type,
            ColumnType::Unrecognized {
                kind: "GEOMETRY".to_string()
            }
        );
    }
}
