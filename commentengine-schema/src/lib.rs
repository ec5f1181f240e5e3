pub mod comment;
pub mod signal;
pub mod thread;

pub use comment::{CommentParams, CommentSubmission, FieldErrors, SuccessBody};
pub use signal::{NewThread, parse_timestamp};
pub use thread::{CommentView, ThreadView};
