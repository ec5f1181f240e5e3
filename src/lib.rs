pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod server;
mod utils;

pub use commentengine_schema as schema;
pub use engine::{CommentEngine, CommentOutcome};
pub use error::EngineError;
pub use server::{CommentContext, CommentEngineLayer};
