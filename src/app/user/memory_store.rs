//! 内存用户集合

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{NewUser, User, UserPatch};
use super::store::{StoreError, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Collection>,
}

#[derive(Default)]
struct Collection {
    docs: HashMap<Uuid, Entry>,
    next_seq: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

struct Entry {
    // 插入序号，创建时间相同时用于排序
    seq: u64,
    user: User,
}

impl Collection {
    /// 单调不减的当前时间
    fn now(&mut self) -> DateTime<Utc> {
        let now = match self.last_timestamp {
            Some(last) => last.max(Utc::now()),
            None => Utc::now(),
        };
        self.last_timestamp = Some(now);
        now
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.docs
            .values()
            .any(|entry| entry.user.email == email && Some(entry.user.id) != except)
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut collection = self.inner.write().await;
        if collection.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateKey("email".to_string()));
        }

        let now = collection.now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: now,
            updated_at: now,
        };

        let seq = collection.next_seq;
        collection.next_seq += 1;
        collection.docs.insert(
            record.id,
            Entry {
                seq,
                user: record.clone(),
            },
        );
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let collection = self.inner.read().await;
        let mut entries: Vec<&Entry> = collection.docs.values().collect();
        entries.sort_by(|a, b| {
            b.user
                .created_at
                .cmp(&a.user.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|entry| entry.user.clone()).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let collection = self.inner.read().await;
        Ok(collection.docs.get(&id).map(|entry| entry.user.clone()))
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let mut collection = self.inner.write().await;
        if !collection.docs.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            if collection.email_taken(email, Some(id)) {
                return Err(StoreError::DuplicateKey("email".to_string()));
            }
        }

        let now = collection.now();
        let Some(entry) = collection.docs.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(&mut entry.user);
        entry.user.updated_at = now.max(entry.user.updated_at);
        Ok(Some(entry.user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut collection = self.inner.write().await;
        Ok(collection.docs.remove(&id).map(|entry| entry.user))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
