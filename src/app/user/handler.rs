//! 用户过程处理器：解析原始输入并调用服务

use super::model::UserOutput;
use super::schema::{CreateUserInput, DeleteUserInput, GetUserInput, UpdateUserInput};
use super::service::UserService;
use crate::core::{error::RpcError, rpc::parse_input};

pub async fn create(service: &UserService, raw: Option<&str>) -> Result<UserOutput, RpcError> {
    let input: CreateUserInput = parse_input(raw)?;
    service.create_user(input).await
}

/// 不需要输入
pub async fn get_all(service: &UserService) -> Result<Vec<UserOutput>, RpcError> {
    service.get_users().await
}

pub async fn get_by_id(service: &UserService, raw: Option<&str>) -> Result<UserOutput, RpcError> {
    let input: GetUserInput = parse_input(raw)?;
    service.get_user(input).await
}

pub async fn update(service: &UserService, raw: Option<&str>) -> Result<UserOutput, RpcError> {
    let input: UpdateUserInput = parse_input(raw)?;
    service.update_user(input).await
}

pub async fn delete(service: &UserService, raw: Option<&str>) -> Result<UserOutput, RpcError> {
    let input: DeleteUserInput = parse_input(raw)?;
    service.delete_user(input).await
}
