// データベース接続アダプター
//
// SQLxを使用した接続プールの管理と、生成済みDDLバッチの実行を行います。
// PostgreSQL、MySQL、SQLiteのドライバーに対応し、接続先の製品名からベンダーを判定します。

use crate::core::config::DatabaseConfig;
use crate::core::error::DatabaseError;
use async_trait::async_trait;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::time::Duration;
use tracing::debug;

/// 既定の最大コネクション数
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 既定の接続タイムアウト（秒）
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// DDL文の実行を抽象化するトレイト
///
/// CLIはこのトレイト越しにデータベースへアクセスするため、
/// テストでは記録用の実装に差し替えることができます。
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// 接続先データベースの製品名
    async fn product_name(&self) -> Result<String, DatabaseError>;

    /// 文のリストを単一トランザクションで実行し、実行した文の数を返す
    ///
    /// いずれかの文が失敗した場合はロールバックされ、何も適用されません。
    async fn execute_batch(&self, statements: &[String]) -> Result<usize, DatabaseError>;
}

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService;

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// データベース接続プールを作成
    ///
    /// # Arguments
    ///
    /// * `config` - データベース設定
    ///
    /// # Returns
    ///
    /// 接続プールまたはエラー
    pub async fn create_pool(&self, config: &DatabaseConfig) -> Result<AnyPool, DatabaseError> {
        let pool_options = self.create_pool_options_from_config(config);

        debug!(url = %redact_url(&config.url), "Connecting to database");
        pool_options
            .connect(&config.url)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!(
                    "Failed to create database connection pool: {}",
                    redact_url(&config.url)
                ),
                cause: e.to_string(),
            })
    }

    /// DatabaseConfigからプールオプションを作成
    ///
    /// 未設定の場合はデフォルト値（max_connections=5, timeout=30秒）を使用します。
    pub fn create_pool_options_from_config(&self, config: &DatabaseConfig) -> PoolOptions<Any> {
        let max_conn = config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);

        PoolOptions::new()
            .max_connections(max_conn)
            .acquire_timeout(Duration::from_secs(timeout))
    }

    /// 接続テストを実行
    pub async fn test_connection(&self, pool: &AnyPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "Database connection test failed".to_string(),
                cause: e.to_string(),
            })
    }

    /// 接続プールを閉じる
    pub async fn close_pool(&self, pool: AnyPool) {
        pool.close().await;
    }
}

/// SQLxの接続プールを使用するStatementExecutor実装
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
    pool: AnyPool,
}

impl SqlxExecutor {
    /// 接続プールからExecutorを作成
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// 接続プールの所有権を取り出す
    pub fn into_pool(self) -> AnyPool {
        self.pool
    }
}

#[async_trait]
impl StatementExecutor for SqlxExecutor {
    async fn product_name(&self) -> Result<String, DatabaseError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DatabaseError::Connection {
                message: "Failed to acquire connection".to_string(),
                cause: e.to_string(),
            })?;
        Ok(conn.backend_name().to_string())
    }

    async fn execute_batch(&self, statements: &[String]) -> Result<usize, DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction {
                message: format!("Failed to start transaction: {}", e),
            })?;

        for (index, statement) in statements.iter().enumerate() {
            debug!(index, sql = %statement, "Executing statement");
            // エラー時はtxのドロップでロールバックされる
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::Query {
                    message: format!("Statement {} failed: {}", index + 1, e),
                    sql: Some(statement.clone()),
                })?;
        }

        tx.commit().await.map_err(|e| DatabaseError::Transaction {
            message: format!("Failed to commit transaction: {}", e),
        })?;

        Ok(statements.len())
    }
}

/// 接続URLのパスワード部分を伏せ字にする
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}
