//! 用户 CRUD

pub mod handler;
pub mod memory_store;
pub mod model;
#[cfg(feature = "database")]
pub mod pg_store;
pub mod schema;
pub mod service;
pub mod store;

pub use model::{User, UserOutput};
pub use service::UserService;
pub use store::{StoreError, UserStore};
