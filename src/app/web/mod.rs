//! 演示页面与 API 面板

pub mod handler;
pub mod panel;
