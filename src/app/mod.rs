//! 应用层

pub mod general;
pub mod router;
pub mod user;
pub mod web;
