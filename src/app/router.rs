//! 路由与 RPC 分发
//!
//! 过程挂载在 `/api/trpc/{path}`：查询用 GET（输入放在 `?input=`），
//! 变更用 POST（输入为请求体 JSON）。

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use super::{general, user, user::UserService, web};
use crate::config::Environment;
use crate::core::{
    error::{RpcError, RpcFailure},
    middleware::request_logging_middleware,
    response::RpcResponse,
    rpc::{encode, ProcedureKind, ProcedureMeta},
};

/// RPC 挂载路径
pub const RPC_BASE_PATH: &str = "/api/trpc";

/// 全部已注册过程
pub const PROCEDURES: &[ProcedureMeta] = &[
    ProcedureMeta {
        path: "general.hello",
        kind: ProcedureKind::Query,
        description: "A simple test endpoint that returns a \"hello world\" message.",
    },
    ProcedureMeta {
        path: "user.create",
        kind: ProcedureKind::Mutation,
        description: "Create a new user with name, email, and age. Email must be unique.",
    },
    ProcedureMeta {
        path: "user.getAll",
        kind: ProcedureKind::Query,
        description: "Retrieve all users from the database, sorted by creation date (newest first).",
    },
    ProcedureMeta {
        path: "user.getById",
        kind: ProcedureKind::Query,
        description: "Retrieve a specific user by their unique ID.",
    },
    ProcedureMeta {
        path: "user.update",
        kind: ProcedureKind::Mutation,
        description: "Update an existing user's information. All fields are optional except ID.",
    },
    ProcedureMeta {
        path: "user.delete",
        kind: ProcedureKind::Mutation,
        description: "Permanently delete a user from the database by their ID.",
    },
];

/// 按路径查找过程，`hello` 是 `general.hello` 的别名
pub fn lookup(path: &str) -> Option<&'static ProcedureMeta> {
    let path = if path == "hello" { "general.hello" } else { path };
    PROCEDURES.iter().find(|meta| meta.path == path)
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub environment: Environment,
    pub app_name: String,
}

impl AppState {
    pub fn new(user_service: UserService, environment: Environment) -> Self {
        Self {
            user_service,
            environment,
            app_name: crate::config::AppConfig::default().name,
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct RpcQuery {
    input: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web::handler::index))
        .route("/health", get(general::handler::health_check))
        .route("/api/panel", get(web::handler::panel))
        .route("/api/trpc/:path", get(rpc_query).post(rpc_mutation))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn rpc_query(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<RpcQuery>,
) -> Result<Response, RpcFailure> {
    call(&state, &path, ProcedureKind::Query, query.input.as_deref()).await
}

async fn rpc_mutation(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Response, RpcFailure> {
    let raw = std::str::from_utf8(&body)
        .map_err(|_| RpcError::BadRequest("Request body is not valid UTF-8".to_string()).at(&path))?;
    call(&state, &path, ProcedureKind::Mutation, Some(raw)).await
}

async fn call(
    state: &AppState,
    path: &str,
    kind: ProcedureKind,
    raw: Option<&str>,
) -> Result<Response, RpcFailure> {
    let meta = lookup(path).ok_or_else(|| {
        RpcError::NotFound(format!("No procedure found on path \"{}\"", path)).at(path)
    })?;

    if meta.kind != kind {
        let verb = match kind {
            ProcedureKind::Query => "GET",
            ProcedureKind::Mutation => "POST",
        };
        return Err(RpcError::MethodNotSupported(format!(
            "Unsupported {} request to {} procedure at path \"{}\"",
            verb, meta.kind, path
        ))
        .at(path));
    }

    let data = dispatch(state, meta.path, raw).await.map_err(|e| e.at(path))?;
    Ok(Json(RpcResponse::success(data)).into_response())
}

async fn dispatch(
    state: &AppState,
    path: &str,
    raw: Option<&str>,
) -> Result<serde_json::Value, RpcError> {
    let service = &state.user_service;
    match path {
        "general.hello" => encode(general::handler::hello()),
        "user.create" => encode(user::handler::create(service, raw).await?),
        "user.getAll" => encode(user::handler::get_all(service).await?),
        "user.getById" => encode(user::handler::get_by_id(service, raw).await?),
        "user.update" => encode(user::handler::update(service, raw).await?),
        "user.delete" => encode(user::handler::delete(service, raw).await?),
        other => Err(RpcError::NotFound(format!(
            "No procedure found on path \"{}\"",
            other
        ))),
    }
}
