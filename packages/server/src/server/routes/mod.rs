// HTTP routes
pub mod health;
pub mod job_groups;
pub mod reindex;
pub mod root;
pub mod sync;

pub use health::*;
pub use job_groups::*;
pub use reindex::*;
pub use root::*;
pub use sync::*;

use axum::Json;
use serde_json::{json, Value};

/// Error body shape the frontend expects: `{ "detail": message }`.
pub(crate) fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "detail": message.into() }))
}
