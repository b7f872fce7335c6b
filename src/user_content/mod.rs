mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{Comment, NewComment};
pub use schema::USER_CONTENT_VERSIONED_SCHEMAS;
pub use store::SqliteUserContentStore;
pub use trait_def::UserContentStore;
