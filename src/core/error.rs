//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::response::{ErrorData, ErrorEnvelope, ErrorShape};

/// RPC 错误类型
///
/// 每个变体携带返回给调用方的固定消息，内部原因只记录日志。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotSupported(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl RpcError {
    /// 错误码名称，与 tRPC 保持一致
    pub fn code(&self) -> &'static str {
        match self {
            RpcError::BadRequest(_) => "BAD_REQUEST",
            RpcError::NotFound(_) => "NOT_FOUND",
            RpcError::MethodNotSupported(_) => "METHOD_NOT_SUPPORTED",
            RpcError::Conflict(_) => "CONFLICT",
            RpcError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::MethodNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            RpcError::Conflict(_) => StatusCode::CONFLICT,
            RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON-RPC 2.0 错误码
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            RpcError::BadRequest(_) => -32600,
            RpcError::NotFound(_) => -32004,
            RpcError::MethodNotSupported(_) => -32005,
            RpcError::Conflict(_) => -32009,
            RpcError::Internal(_) => -32603,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RpcError::BadRequest(msg)
            | RpcError::NotFound(msg)
            | RpcError::MethodNotSupported(msg)
            | RpcError::Conflict(msg)
            | RpcError::Internal(msg) => msg,
        }
    }

    /// 绑定过程路径，生成可直接返回的失败响应
    pub fn at(self, path: impl Into<String>) -> RpcFailure {
        RpcFailure {
            error: self,
            path: path.into(),
        }
    }
}

impl From<validator::ValidationErrors> for RpcError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();

        RpcError::BadRequest(messages.join(", "))
    }
}

/// 带过程路径的 RPC 失败
#[derive(Debug)]
pub struct RpcFailure {
    pub error: RpcError,
    pub path: String,
}

impl IntoResponse for RpcFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let envelope = ErrorEnvelope {
            error: ErrorShape {
                message: self.error.message().to_string(),
                code: self.error.json_rpc_code(),
                data: ErrorData {
                    code: self.error.code().to_string(),
                    http_status: status.as_u16(),
                    path: self.path,
                },
            },
        };

        (status, Json(envelope)).into_response()
    }
}
