/// CLI エントリーポイントのテスト
///
/// CLIの構造が正しく定義され、サブコマンドのパースからハンドラーの実行までが
/// 期待通りに動作することを確認します。
use clap::Parser;

#[cfg(test)]
mod cli_tests {
    use super::*;
    use ddlforge::cli::commands::generate::{GenerateCommand, GenerateCommandHandler};
    use ddlforge::cli::commands::order::{OrderCommand, OrderCommandHandler};
    use ddlforge::cli::commands::validate::{ValidateCommand, ValidateCommandHandler};
    use ddlforge::cli::{Cli, Commands, DdlMode, OutputFormat};
    use ddlforge::core::vendor::Vendor;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
version: "1.0"
vendor: db2
schema_file: db/shop.yaml
output:
  header: false
  include_indexes: false
"#;

    const SCHEMA: &str = r#"
name: shop
tables:
  - name: orders
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
      - { name: customer_id, type: { kind: INTEGER, width: 4 }, references: { table: customer, column: id } }
    indexes:
      - { name: idx_orders_customer, columns: [customer_id] }
  - name: customer
    columns:
      - { name: id, type: { kind: INTEGER, width: 4 }, primary_key: true, nullable: false }
"#;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("db")).unwrap();
        fs::write(dir.path().join(".ddlforge.yaml"), CONFIG).unwrap();
        fs::write(dir.path().join("db/shop.yaml"), SCHEMA).unwrap();
        dir
    }

    fn generate(dir: &Path, vendor: Option<Vendor>) -> GenerateCommand {
        GenerateCommand {
            project_path: dir.to_path_buf(),
            config_path: None,
            vendor,
            schema: None,
            mode: DdlMode::Create,
            if_not_exists: false,
            no_indexes: false,
            no_enum_checks: false,
            no_header: false,
            output: None,
            format: OutputFormat::Json,
        }
    }

    /// ヘルプ・バージョンフラグが処理されることを確認
    #[test]
    fn test_cli_can_parse() {
        let result = Cli::try_parse_from(["ddlforge", "--help"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["ddlforge", "--version"]);
        assert!(result.is_err());
    }

    /// 全サブコマンドがパース可能であることを確認
    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["ddlforge", "order", "-s", "other.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::Order { reverse: false, .. }));

        let cli = Cli::try_parse_from(["ddlforge", "validate", "--vendor", "oracle"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Validate {
                vendor: Some(Vendor::Oracle),
                ..
            }
        ));

        let cli = Cli::try_parse_from(["ddlforge", "detect"]).unwrap();
        match cli.command {
            Commands::Detect { env, url } => {
                assert_eq!(env, "development");
                assert!(url.is_none());
            }
            other => panic!("Expected Detect command, got {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "ddlforge",
            "apply",
            "--url",
            "sqlite::memory:",
            "--mode",
            "truncate",
            "--dry-run",
            "--timeout",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Apply {
                url,
                mode,
                dry_run,
                timeout,
                ..
            } => {
                assert_eq!(url.as_deref(), Some("sqlite::memory:"));
                assert_eq!(mode, DdlMode::Truncate);
                assert!(dry_run);
                assert_eq!(timeout, Some(10));
            }
            other => panic!("Expected Apply command, got {:?}", other),
        }
    }

    /// 不正なモードは拒否されることを確認
    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(Cli::try_parse_from(["ddlforge", "generate", "--mode", "alter"]).is_err());
    }

    /// 設定ファイルの値とCLIフラグの優先順位を確認
    #[test]
    fn test_generate_uses_config_and_flags() {
        let dir = project();

        let json = GenerateCommandHandler::new()
            .execute(&generate(dir.path(), None))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vendor"], "db2");
        // 設定でインデックス出力を無効化している
        assert_eq!(value["statements"].as_array().unwrap().len(), 2);

        let json = GenerateCommandHandler::new()
            .execute(&generate(dir.path(), Some(Vendor::MySql)))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vendor"], "mysql");
        assert!(value["statements"][0]
            .as_str()
            .unwrap()
            .starts_with("CREATE TABLE `customer`"));
    }

    /// 設定でヘッダーを無効化した場合のテキスト出力
    #[test]
    fn test_generate_text_without_header() {
        let dir = project();
        let mut command = generate(dir.path(), None);
        command.format = OutputFormat::Text;

        let text = GenerateCommandHandler::new().execute(&command).unwrap();
        assert!(text.starts_with("CREATE TABLE customer ("));
        assert!(text.ends_with(";"));
    }

    /// 明示した設定ファイルが存在しない場合はエラー
    #[test]
    fn test_missing_explicit_config() {
        let dir = project();
        let mut command = generate(dir.path(), None);
        command.config_path = Some(dir.path().join("missing.yaml"));

        let err = GenerateCommandHandler::new().execute(&command).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    /// orderとvalidateが設定のスキーマファイルを使用することを確認
    #[test]
    fn test_order_and_validate() {
        let dir = project();

        let text = OrderCommandHandler::new()
            .execute(&OrderCommand {
                project_path: dir.path().to_path_buf(),
                config_path: None,
                schema: None,
                reverse: false,
                format: OutputFormat::Text,
            })
            .unwrap();
        assert!(text.contains("  1. customer"));
        assert!(text.contains("  2. orders  -> customer"));

        let json = ValidateCommandHandler::new()
            .execute(&ValidateCommand {
                project_path: dir.path().to_path_buf(),
                config_path: None,
                vendor: None,
                schema: None,
                format: OutputFormat::Json,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["is_valid"], true);
        assert_eq!(value["vendor"], "db2");
        assert_eq!(value["statistics"]["tables"], 2);
    }
}
