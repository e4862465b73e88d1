// Events domain - recruiting event rows
//
// Read-side only: rows land in event_list through an external loader, this
// domain keeps their embeddings current via the generic reindex engine.

pub mod models;
pub mod store;

pub use models::*;
pub use store::EventStore;
