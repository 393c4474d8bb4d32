//! 页面处理器

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::panel::render_panel;
use crate::app::router::{AppState, PROCEDURES, RPC_BASE_PATH};

const INDEX_HTML: &str = include_str!("../../../public/index.html");

/// 演示页面
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// API 面板，仅开发环境可用
pub async fn panel(State(state): State<AppState>) -> Response {
    if !state.environment.is_development() {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    Html(render_panel(&state.app_name, RPC_BASE_PATH, PROCEDURES)).into_response()
}
