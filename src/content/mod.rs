//! Content module - post records and store access

mod post;
mod store;

pub use post::BlogPost;
pub use store::{ContentStore, JsonStore, StoreError};
