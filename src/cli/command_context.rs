// コマンド共通コンテキスト
//
// 設定ファイル読み込みやパス解決の重複をCLI層で集約する。
// 設定ファイルは任意で、CLIフラグが設定より優先されます。

use crate::adapters::database::{DatabaseConnectionService, SqlxExecutor};
use crate::core::config::{Config, DatabaseConfig, OutputConfig};
use crate::core::naming::SCHEMA_FILE;
use crate::core::schema::Schema;
use crate::core::vendor::Vendor;
use crate::services::config_loader::ConfigLoader;
use crate::services::schema_loader::SchemaLoader;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Option<Config>,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    pub fn load(project_path: PathBuf) -> Result<Self> {
        Self::load_with_config(project_path, None)
    }

    /// カスタム設定ファイルパスを指定してコンテキストを作成
    ///
    /// 明示的に指定された設定ファイルが存在しない場合はエラーです。
    /// 既定の設定ファイルが存在しない場合は設定なしで続行します。
    pub fn load_with_config(
        project_path: PathBuf,
        custom_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config = match &custom_config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("Config file not found: {:?}", path));
                }
                Some(ConfigLoader::from_file(path).with_context(|| "Failed to read config file")?)
            }
            None => ConfigLoader::load_optional(&project_path.join(Config::DEFAULT_CONFIG_PATH))
                .with_context(|| "Failed to read config file")?,
        };
        let config_path = custom_config_path
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));

        Ok(Self {
            project_path,
            config_path,
            config,
        })
    }

    /// 対象ベンダーを解決（CLIフラグ、設定ファイルの順）
    pub fn vendor(&self, requested: Option<Vendor>) -> Result<Vendor> {
        requested
            .or_else(|| self.config.as_ref().map(|c| c.vendor))
            .ok_or_else(|| {
                anyhow!(
                    "No vendor specified. Pass --vendor or set `vendor` in {}",
                    Config::DEFAULT_CONFIG_PATH
                )
            })
    }

    /// スキーマファイルのパスを解決
    pub fn schema_path(&self, custom_path: Option<&Path>) -> PathBuf {
        match custom_path {
            Some(path) => path.to_path_buf(),
            None => {
                let relative = self
                    .config
                    .as_ref()
                    .map_or_else(|| PathBuf::from(SCHEMA_FILE), |c| c.schema_file.clone());
                self.project_path.join(relative)
            }
        }
    }

    /// スキーマを読み込む
    pub fn load_schema(&self, custom_path: Option<&Path>) -> Result<Schema> {
        let path = self.schema_path(custom_path);
        SchemaLoader::new()
            .load_from_file(&path)
            .with_context(|| "Failed to load schema")
    }

    /// DDL出力オプション（設定ファイルがなければ既定値）
    pub fn output_config(&self) -> OutputConfig {
        self.config
            .as_ref()
            .map(|c| c.output.clone())
            .unwrap_or_default()
    }

    /// 接続設定を解決（--urlが環境設定より優先）
    pub fn database_config(&self, env: &str, url: Option<&str>) -> Result<DatabaseConfig> {
        let from_env = self
            .config
            .as_ref()
            .map(|c| c.get_database_config(env));

        match (url, from_env) {
            (Some(url), Some(Ok(config))) => Ok(DatabaseConfig {
                url: url.to_string(),
                ..config
            }),
            (Some(url), _) => Ok(DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            }),
            (None, Some(result)) => result
                .with_context(|| format!("Config for environment '{}' not found", env)),
            (None, None) => Err(anyhow!(
                "No database URL specified. Pass --url or configure environment '{}' in {}",
                env,
                Config::DEFAULT_CONFIG_PATH
            )),
        }
    }

    /// 接続プールを作成してExecutorを返す
    pub async fn connect(
        &self,
        env: &str,
        url: Option<&str>,
        timeout: Option<u64>,
    ) -> Result<SqlxExecutor> {
        let mut db_config = self.database_config(env, url)?;
        if let Some(t) = timeout {
            db_config.timeout = Some(t);
        }
        let service = DatabaseConnectionService::new();
        let pool = service
            .create_pool(&db_config)
            .await
            .with_context(|| "Failed to connect to database")?;
        if let Err(e) = service.test_connection(&pool).await {
            service.close_pool(pool).await;
            return Err(e).with_context(|| "Failed to connect to database");
        }
        Ok(SqlxExecutor::new(pool))
    }

    /// Executorの接続プールを閉じる
    pub async fn disconnect(&self, executor: SqlxExecutor) {
        DatabaseConnectionService::new()
            .close_pool(executor.into_pool())
            .await;
    }
}
