//! PostgreSQL 用户集合

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::model::{NewUser, User, UserPatch};
use super::store::{StoreError, UserStore};

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let record = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, age, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        // 创建时间相同时按插入序号倒序
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC, seq DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        // 单条语句完成部分更新，updated_at 不回退
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                age = COALESCE($4, age),
                updated_at = GREATEST(NOW(), updated_at)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.age)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::infrastructure::database::DatabaseManager;
    use tokio::sync::Mutex;

    // 多个测试并发建表会冲突
    static MIGRATED: Mutex<bool> = Mutex::const_new(false);

    /// 未设置 DATABASE_URL 时返回 None，测试直接跳过
    async fn test_store() -> Option<PgUserStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let config = DatabaseConfig {
            url,
            max_connections: 2,
            ..Default::default()
        };
        let manager = DatabaseManager::new(&config).await.unwrap();

        let mut migrated = MIGRATED.lock().await;
        if !*migrated {
            manager.migrate().await.unwrap();
            *migrated = true;
        }
        drop(migrated);

        Some(PgUserStore::new(manager.into_pool()))
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}-{}@example.com", name, Uuid::new_v4().simple()),
            age: Some(20),
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_insert_and_find_by_id() {
        let Some(store) = test_store().await else { return };
        let user = store.insert(new_user("alice")).await.unwrap();
        assert_eq!(user.created_at, user.updated_at);

        let found = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.name, user.name);
        assert_eq!(found.email, user.email);
        assert_eq!(found.age, Some(20));
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unique_violation_is_duplicate_key() {
        let Some(store) = test_store().await else { return };
        let first = store.insert(new_user("dup")).await.unwrap();

        let mut again = new_user("dup");
        again.email = first.email.clone();
        assert!(matches!(
            store.insert(again).await,
            Err(StoreError::DuplicateKey(_))
        ));

        let other = store.insert(new_user("other")).await.unwrap();
        let patch = UserPatch {
            email: Some(first.email.clone()),
            ..Default::default()
        };
        assert!(matches!(
            store.update(other.id, patch).await,
            Err(StoreError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_partial_update_keeps_other_fields() {
        let Some(store) = test_store().await else { return };
        let user = store.insert(new_user("patch")).await.unwrap();

        let patch = UserPatch {
            name: Some("renamed".into()),
            ..Default::default()
        };
        let updated = store.update(user.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.age, Some(20));
        assert_eq!(updated.created_at, user.created_at);
        assert!(updated.updated_at >= user.updated_at);

        let again = store
            .update(user.id, UserPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert!(again.updated_at >= updated.updated_at);

        assert!(store
            .update(Uuid::new_v4(), UserPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_delete_returns_removed_row() {
        let Some(store) = test_store().await else { return };
        let user = store.insert(new_user("gone")).await.unwrap();

        let removed = store.delete(user.id).await.unwrap().unwrap();
        assert_eq!(removed.id, user.id);
        assert_eq!(removed.email, user.email);
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.delete(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_all_breaks_ties_by_insertion_order() {
        let Some(store) = test_store().await else { return };
        let created_at = Utc::now();
        let mut ids = Vec::new();
        for name in ["tie0", "tie1", "tie2"] {
            let user = new_user(name);
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO users (id, name, email, age, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $5)",
            )
            .bind(id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.age)
            .bind(created_at)
            .execute(&store.pool)
            .await
            .unwrap();
            ids.push(id);
        }

        let ordered: Vec<Uuid> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .filter(|id| ids.contains(id))
            .collect();
        ids.reverse();
        assert_eq!(ordered, ids);

        for id in ids {
            store.delete(id).await.unwrap();
        }
    }
}
