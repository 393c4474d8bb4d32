//! 用户集合存储抽象

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::memory_store::MemoryUserStore;
use super::model::{NewUser, User, UserPatch};
use crate::config::DatabaseConfig;

/// 存储层错误，不感知 RPC 错误分类
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 违反唯一约束
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 = unique_violation
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::DuplicateKey(
                    db_err.constraint().unwrap_or("users_email_key").to_string(),
                );
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// 用户集合。每个方法对应一次原子的存储调用。
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// 按创建时间倒序返回全部用户
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// 返回更新后的记录，记录不存在时返回 `None`
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError>;

    /// 返回被删除的记录
    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

/// 根据配置打开存储：连接串为空时使用内存集合
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    if config.url.trim().is_empty() {
        tracing::info!("未配置数据库连接串，使用内存存储");
        return Ok(Arc::new(MemoryUserStore::new()));
    }
    open_database(config).await
}

#[cfg(feature = "database")]
async fn open_database(config: &DatabaseConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    use super::pg_store::PgUserStore;
    use crate::infrastructure::database::{redact_url, DatabaseManager};

    tracing::info!(url = %redact_url(&config.url), "连接数据库");
    let manager = DatabaseManager::new(config).await?;
    manager.migrate().await?;
    Ok(Arc::new(PgUserStore::new(manager.into_pool())))
}

#[cfg(not(feature = "database"))]
async fn open_database(_config: &DatabaseConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    Err(StoreError::Backend(
        "database support is disabled; rebuild with the `database` feature".to_string(),
    ))
}
