// 命名ポリシー
//
// アプリケーション名と関連パスの単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "ddlforge";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".ddlforge.yaml";

/// 既定のスキーマファイル名
pub const SCHEMA_FILE: &str = "schema.yaml";

/// Derby用の条件付きDDLストアドプロシージャ名の接頭辞
pub const DERBY_PROCEDURE_PREFIX: &str = "DDLFORGE_";
