//! 通用处理器

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::warn;

use super::model::{DatabaseHealth, HealthOutput, HelloWorldOutput};
use crate::app::router::AppState;

/// `hello` 过程
pub fn hello() -> HelloWorldOutput {
    HelloWorldOutput {
        message: "hello world".to_string(),
    }
}

/// 健康检查，存储不可用时返回 503
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthOutput>) {
    let connected = match state.user_service.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "存储健康检查失败");
            false
        }
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthOutput {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        database: DatabaseHealth {
            backend: state.user_service.backend_name().to_string(),
            connected,
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (status, Json(body))
}
