mod engine;

pub use engine::{ApiErrorBody, ApiErrorObject, EngineError};
