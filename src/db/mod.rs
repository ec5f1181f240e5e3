//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `create.rs`: insert payloads and lookup keys
//! - `schema.rs`: SQL DDL for initializing the database
//! - `actor.rs`: the actor that exclusively owns the connection

pub mod actor;
pub mod create;
pub mod models;
pub mod schema;

pub use actor::{StoreHandle, spawn};
pub use create::{CommentCreate, ThreadCreate, ThreadKey};
pub use models::{DbComment, DbThread};
pub use schema::SQLITE_INIT;
