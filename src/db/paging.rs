//! Cursor pagination over ordered collections.

use crate::error::Result;
use crate::store::{Document, DocumentStore, Query};

/// Chunk size used when reading a whole collection.
pub const FETCH_CHUNK: usize = 200;

/// Read every document of a collection ordered by `order_by`,
/// walking the cursor `FETCH_CHUNK` documents at a time.
pub async fn fetch_all(store: &dyn DocumentStore, collection: &str, order_by: &str) -> Result<Vec<Document>> {
    let mut all = Vec::new();
    let mut cursor: Option<Document> = None;

    loop {
        let mut query = Query::new().order_by(order_by).limit(FETCH_CHUNK);
        if let Some(last) = cursor.take() {
            query = query.start_after(last);
        }

        let chunk = store.list(collection, &query).await?;
        let done = chunk.len() < FETCH_CHUNK;
        cursor = chunk.last().cloned();
        all.extend(chunk);

        if done {
            break;
        }
    }

    Ok(all)
}
