//! 用户业务服务
//!
//! 每个操作：校验输入 → 一次存储调用 → 映射为 NOT_FOUND / CONFLICT / INTERNAL。

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use super::memory_store::MemoryUserStore;
use super::model::{NewUser, UserOutput, UserPatch};
use super::schema::{CreateUserInput, DeleteUserInput, GetUserInput, UpdateUserInput};
use super::store::{StoreError, UserStore};
use crate::core::error::RpcError;

const USER_NOT_FOUND: &str = "User not found";
const EMAIL_TAKEN: &str = "User with this email already exists";

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryUserStore::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn create_user(&self, input: CreateUserInput) -> Result<UserOutput, RpcError> {
        input.validate()?;
        let new_user = NewUser::try_from(input)?;

        match self.store.insert(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "创建用户");
                Ok(user.into())
            }
            Err(err) => Err(map_store_error(err, "Failed to create user")),
        }
    }

    /// 按创建时间倒序
    pub async fn get_users(&self) -> Result<Vec<UserOutput>, RpcError> {
        let users = self
            .store
            .find_all()
            .await
            .map_err(|err| map_store_error(err, "Failed to fetch users"))?;

        Ok(users.into_iter().map(UserOutput::from).collect())
    }

    pub async fn get_user(&self, input: GetUserInput) -> Result<UserOutput, RpcError> {
        input.validate()?;
        let Some(id) = parse_id(&input.id) else {
            return Err(RpcError::NotFound(USER_NOT_FOUND.to_string()));
        };

        self.store
            .find_by_id(id)
            .await
            .map_err(|err| map_store_error(err, "Failed to fetch user"))?
            .map(UserOutput::from)
            .ok_or_else(|| RpcError::NotFound(USER_NOT_FOUND.to_string()))
    }

    pub async fn update_user(&self, input: UpdateUserInput) -> Result<UserOutput, RpcError> {
        input.validate()?;
        let Some(id) = parse_id(&input.id) else {
            return Err(RpcError::NotFound(USER_NOT_FOUND.to_string()));
        };
        let patch = UserPatch::try_from(input)?;

        let user = self
            .store
            .update(id, patch)
            .await
            .map_err(|err| map_store_error(err, "Failed to update user"))?
            .ok_or_else(|| RpcError::NotFound(USER_NOT_FOUND.to_string()))?;

        info!(user_id = %user.id, "更新用户");
        Ok(user.into())
    }

    /// 返回被删除的记录
    pub async fn delete_user(&self, input: DeleteUserInput) -> Result<UserOutput, RpcError> {
        input.validate()?;
        let Some(id) = parse_id(&input.id) else {
            return Err(RpcError::NotFound(USER_NOT_FOUND.to_string()));
        };

        let user = self
            .store
            .delete(id)
            .await
            .map_err(|err| map_store_error(err, "Failed to delete user"))?
            .ok_or_else(|| RpcError::NotFound(USER_NOT_FOUND.to_string()))?;

        info!(user_id = %user.id, "删除用户");
        Ok(user.into())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

// 无法解析的 id 不可能对应任何记录
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}

fn map_store_error(err: StoreError, internal_message: &str) -> RpcError {
    match err {
        StoreError::DuplicateKey(_) => RpcError::Conflict(EMAIL_TAKEN.to_string()),
        StoreError::Backend(cause) => {
            error!(%cause, "{}", internal_message);
            RpcError::Internal(internal_message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::user::model::User;
    use crate::app::user::schema::UserIdInput;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_input(name: &str, email: &str, age: Option<i32>) -> CreateUserInput {
        CreateUserInput {
            name: name.to_string(),
            email: email.to_string(),
            age,
        }
    }

    fn id_input(id: &str) -> UserIdInput {
        UserIdInput { id: id.to_string() }
    }

    /// 记录调用次数且总是失败的存储
    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    impl FailingStore {
        fn fail(&self) -> StoreError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StoreError::Backend("connection reset".to_string())
        }
    }

    #[async_trait]
    impl UserStore for FailingStore {
        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(self.fail())
        }
        async fn find_all(&self) -> Result<Vec<User>, StoreError> {
            Err(self.fail())
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
            Err(self.fail())
        }
        async fn update(&self, _id: Uuid, _patch: UserPatch) -> Result<Option<User>, StoreError> {
            Err(self.fail())
        }
        async fn delete(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
            Err(self.fail())
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(self.fail())
        }
        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = UserService::in_memory();
        let created = service
            .create_user(create_input("Alice", "alice@example.com", Some(30)))
            .await
            .unwrap();

        let fetched = service.get_user(id_input(&created.id)).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.age, Some(30));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let service = UserService::in_memory();
        service
            .create_user(create_input("Alice", "alice@example.com", None))
            .await
            .unwrap();

        let err = service
            .create_user(create_input("Other", "ALICE@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err, RpcError::Conflict(EMAIL_TAKEN.to_string()));
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let service = UserService::in_memory();
        let missing = Uuid::new_v4().to_string();

        let err = service.get_user(id_input(&missing)).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        let err = service.delete_user(id_input(&missing)).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        let update = UpdateUserInput {
            id: missing,
            name: Some("Ghost".into()),
            email: None,
            age: None,
        };
        let err = service.update_user(update).await.unwrap_err();
        assert_eq!(err.message(), USER_NOT_FOUND);

        let err = service.get_user(id_input("not-a-uuid")).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_validation_happens_before_store() {
        let store = Arc::new(FailingStore::default());
        let service = UserService::new(store.clone());

        let err = service
            .create_user(create_input("Alice", "alice@example.com", Some(151)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let err = service
            .create_user(create_input("Alice", "not-an-email", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let err = service.get_user(id_input("")).await.unwrap_err();
        assert_eq!(err, RpcError::BadRequest("User ID is required".into()));

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failures_are_internal() {
        let service = UserService::new(Arc::new(FailingStore::default()));

        let err = service
            .create_user(create_input("Alice", "alice@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err, RpcError::Internal("Failed to create user".into()));

        let err = service.get_users().await.unwrap_err();
        assert_eq!(err, RpcError::Internal("Failed to fetch users".into()));

        let id = Uuid::new_v4().to_string();
        let err = service.delete_user(id_input(&id)).await.unwrap_err();
        assert_eq!(err, RpcError::Internal("Failed to delete user".into()));
    }

    #[tokio::test]
    async fn test_update_rules() {
        let service = UserService::in_memory();
        let alice = service
            .create_user(create_input("Alice", "alice@example.com", None))
            .await
            .unwrap();
        service
            .create_user(create_input("Bob", "bob@example.com", None))
            .await
            .unwrap();

        let updated = service
            .update_user(UpdateUserInput {
                id: alice.id.clone(),
                name: Some("  Alice Smith ".into()),
                email: Some("Alice@Example.com".into()),
                age: Some(42),
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "Alice Smith");
        assert_eq!(updated.email, "alice@example.com");
        assert_eq!(updated.age, Some(42));
        assert_eq!(updated.created_at, alice.created_at);
        assert!(updated.updated_at >= alice.updated_at);

        let err = service
            .update_user(UpdateUserInput {
                id: alice.id.clone(),
                name: None,
                email: Some("bob@example.com".into()),
                age: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");

        let err = service
            .update_user(UpdateUserInput {
                id: alice.id,
                name: None,
                email: None,
                age: Some(-5),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_get_users_newest_first() {
        let service = UserService::in_memory();
        for name in ["first", "second", "third"] {
            service
                .create_user(create_input(name, &format!("{}@example.com", name), None))
                .await
                .unwrap();
        }

        let users = service.get_users().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
        assert!(users.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_user() {
        let service = UserService::in_memory();
        let created = service
            .create_user(create_input("Alice", "alice@example.com", None))
            .await
            .unwrap();

        let removed = service.delete_user(id_input(&created.id)).await.unwrap();
        assert_eq!(removed, created);
        assert!(service.get_users().await.unwrap().is_empty());
    }
}
