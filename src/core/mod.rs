//! 核心层：错误、响应信封、中间件与 RPC 基础设施

pub mod error;
pub mod middleware;
pub mod response;
pub mod rpc;
