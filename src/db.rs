//! Database connection and typed repositories over the document store.

pub mod collaborator;
pub mod connection;
pub mod department;
pub mod paging;

pub use connection::{CollectionCounts, connect, ensure_schema, get_collection_counts, get_version};
