//! 数据库基础设施

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    Error,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// 创建用户集合表（幂等）
    pub async fn migrate(&self) -> Result<(), Error> {
        info!("初始化 users 表...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(320) UNIQUE NOT NULL,
                age INTEGER CHECK (age >= 0 AND age <= 150),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 旧表补齐插入序号
        let has_seq: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
             WHERE table_name = 'users' AND column_name = 'seq')",
        )
        .fetch_one(&self.pool)
        .await?;
        if !has_seq {
            sqlx::query("ALTER TABLE users ADD COLUMN seq BIGSERIAL NOT NULL")
                .execute(&self.pool)
                .await?;
        }

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS users_created_at_seq_idx ON users (created_at DESC, seq DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}

/// 隐藏连接串中的密码
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
