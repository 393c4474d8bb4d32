//! 核心响应处理模块

use serde::{Deserialize, Serialize};

/// 成功响应信封：`{"result":{"data":...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub result: RpcResult<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResult<T> {
    pub data: T,
}

impl<T> RpcResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            result: RpcResult { data },
        }
    }
}

/// 错误响应信封：`{"error":{...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorShape,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorShape {
    pub message: String,
    pub code: i32,
    pub data: ErrorData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: String,
    pub http_status: u16,
    pub path: String,
}
