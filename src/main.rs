//! 用户 RPC 服务入口

use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{error, info};

use user_rpc::app::user::{store, UserService};
use user_rpc::config::load_config;
use user_rpc::infrastructure::logger::Logger;
use user_rpc::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = Logger::init(&config.logging)?;

    info!(environment = %config.app.environment, "启动 {}", config.app.name);

    let store = store::open(&config.database).await.map_err(|e| {
        error!(error = %e, "初始化存储失败");
        e
    })?;
    let state = AppState::new(UserService::new(store), config.app.environment)
        .with_app_name(config.app.name.clone());

    let app = build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.http.timeout_seconds)))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let listener = TcpListener::bind(config.socket_addr()?).await?;
    let addr = listener.local_addr()?;

    info!("HTTP 服务器启动成功，监听地址: http://{}", addr);
    info!("   GET   /                     - 演示页面");
    info!("   GET   /health               - 健康检查");
    info!("   GET   /api/trpc/<query>     - 查询过程");
    info!("   POST  /api/trpc/<mutation>  - 变更过程");
    if config.app.environment.is_development() {
        info!("   GET   /api/panel            - API 面板");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务器已关闭");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "监听退出信号失败");
        std::future::pending::<()>().await;
    }
}
