// スキーマチェックサム計算サービス
//
// スキーマ定義のSHA-256ハッシュを計算します。
// テーブルの記述順は生成結果（作成順のタイブレーク）に影響するため、正規化で並び替えません。

use crate::core::schema::Schema;
use sha2::{Digest, Sha256};

/// スキーマチェックサムサービス
#[derive(Debug, Clone, Default)]
pub struct SchemaChecksumService;

impl SchemaChecksumService {
    /// 新しいSchemaChecksumServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// スキーマのチェックサムを計算
    ///
    /// # Returns
    ///
    /// SHA-256ハッシュ（64文字の16進数文字列）
    pub fn calculate_checksum(&self, schema: &Schema) -> String {
        let normalized = self.normalize_schema(schema);

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// スキーマを正規化された文字列表現に変換
    ///
    /// serde_jsonによるシリアライズはフィールドの宣言順で出力され、
    /// 省略可能な属性は既定値の場合に出力されないため、YAML上の書き方の差異を吸収します。
    pub fn normalize_schema(&self, schema: &Schema) -> String {
        serde_json::to_string(schema).unwrap_or_default()
    }

    /// 2つのスキーマのチェックサムを比較
    pub fn compare_checksums(&self, schema1: &Schema, schema2: &Schema) -> bool {
        self.calculate_checksum(schema1) == self.calculate_checksum(schema2)
    }
}
