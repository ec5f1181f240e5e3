//! HTTP surface: the tower layer that claims `base`, its route table and handlers.

pub mod context;
pub mod dispatch;
mod extract;
mod handlers;
pub mod layer;
mod respond;
pub mod router;

pub use context::CommentContext;
pub use dispatch::{Endpoint, RouteMatch, match_route};
pub use layer::{CommentEngineLayer, CommentEngineService};
