//! 通用过程：hello 与健康检查

pub mod handler;
pub mod model;
