//! 用户数据模型

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use super::schema::{CreateUserInput, UpdateUserInput};
use crate::core::error::RpcError;

/// 姓名最大长度（字符数）
pub const NAME_MAX_CHARS: usize = 100;

/// 集合层的邮箱形状约束
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

/// 用户集合中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待插入的用户，字段已规范化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// 部分更新，`None` 表示保持原值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
    }
}

impl TryFrom<CreateUserInput> for NewUser {
    type Error = RpcError;

    fn try_from(input: CreateUserInput) -> Result<Self, Self::Error> {
        Ok(Self {
            name: normalize_name(&input.name)?,
            email: normalize_email(&input.email)?,
            age: input.age,
        })
    }
}

impl TryFrom<UpdateUserInput> for UserPatch {
    type Error = RpcError;

    fn try_from(input: UpdateUserInput) -> Result<Self, Self::Error> {
        Ok(Self {
            name: input.name.as_deref().map(normalize_name).transpose()?,
            email: input.email.as_deref().map(normalize_email).transpose()?,
            age: input.age,
        })
    }
}

/// 去除首尾空白，空值或超长均拒绝
pub fn normalize_name(name: &str) -> Result<String, RpcError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RpcError::BadRequest("Name is required".to_string()));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(RpcError::BadRequest(
            "Name cannot be more than 100 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// 去除首尾空白并转为小写，要求形如 `local@domain.tld`
pub fn normalize_email(email: &str) -> Result<String, RpcError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(RpcError::BadRequest("Email is required".to_string()));
    }
    if !EMAIL_SHAPE.is_match(&email) {
        return Err(RpcError::BadRequest("Please enter a valid email".to_string()));
    }
    Ok(email)
}

/// 对外输出结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOutput {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserOutput {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(normalize_email("alice@example").is_err());
        assert!(normalize_email("alice@.com").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("al ice@example.com").is_err());
        assert!(normalize_email("   ").is_err());
        assert!(normalize_email("a@b.").is_err());
        assert_eq!(normalize_email("a@.b.c").unwrap(), "a@.b.c");
        assert_eq!(normalize_email("a@b.c@").unwrap(), "a@b.c@");
        assert_eq!(normalize_email("@a@b.c").unwrap(), "@a@b.c");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Bob  ").unwrap(), "Bob");
        assert!(normalize_name("   ").is_err());
        assert!(normalize_name(&"x".repeat(101)).is_err());
        assert!(normalize_name(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            name: "Bob".into(),
            email: "bob@example.com".into(),
            age: Some(30),
            created_at: now,
            updated_at: now,
        };
        UserPatch {
            name: Some("Robert".into()),
            ..Default::default()
        }
        .apply(&mut user);

        assert_eq!(user.name, "Robert");
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.age, Some(30));
    }

    #[test]
    fn test_output_shape() {
        let now = Utc::now();
        let output = UserOutput::from(User {
            id: Uuid::nil(),
            name: "Bob".into(),
            email: "bob@example.com".into(),
            age: None,
            created_at: now,
            updated_at: now,
        });
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["_id"], "00000000-0000-0000-0000-000000000000");
        assert!(value.get("age").is_none());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
