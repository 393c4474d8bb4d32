//! 用户过程的输入结构与校验规则

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,
}

/// 除 `id` 外所有字段可选
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub id: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,

    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,
}

/// `user.getById` 与 `user.delete` 共用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserIdInput {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub id: String,
}

pub type GetUserInput = UserIdInput;
pub type DeleteUserInput = UserIdInput;
