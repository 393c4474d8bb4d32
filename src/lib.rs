//! # user-rpc
//!
//! 基于 Axum 的类型化 RPC 用户服务，包括：
//! - 用户 CRUD 过程（`user.create/getAll/getById/update/delete`）
//! - `hello` 健康测试过程
//! - 内存与 PostgreSQL 两种存储后端
//! - 演示页面与开发环境 API 面板

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::app::router::{build_router, AppState};
pub use crate::config::Config;
pub use crate::core::error::RpcError;
