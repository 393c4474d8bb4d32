//! RPC 过程基础设施：过程元信息与输入解析

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use super::error::RpcError;

/// 过程类型：查询走 GET，变更走 POST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureKind::Query => write!(f, "query"),
            ProcedureKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// 过程元信息，供分发和 API 面板使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcedureMeta {
    pub path: &'static str,
    pub kind: ProcedureKind,
    pub description: &'static str,
}

/// 解析原始 JSON 输入。缺省输入按 `{}` 处理。
pub fn parse_input<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, RpcError> {
    let raw = match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => "{}",
    };

    serde_json::from_str(raw).map_err(|e| RpcError::BadRequest(format!("Invalid input: {}", e)))
}

/// 将过程输出编码为 JSON 值
pub fn encode<T: Serialize>(output: T) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(output).map_err(|e| {
        tracing::error!(error = %e, "输出序列化失败");
        RpcError::Internal("Failed to serialize output".to_string())
    })
}
