//! Document storage for quiz data.
//!
//! Collections hold schemaless JSON objects. Filters are equality matches on
//! top-level fields. Every stored document carries an internal [`ID_FIELD`]
//! that reads never return.

use async_trait::async_trait;
use serde_json::{Map, Value};

mod error;
mod file;
mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Top-level field equality filter. Empty matches everything.
pub type Filter = Map<String, Value>;

/// Internal document identifier, assigned on insert.
pub const ID_FIELD: &str = "_id";

/// Collection names.
pub mod collections {
    pub const PROBLEM_SETS: &str = "problem_sets";
    pub const STUDENT_ANSWERS: &str = "student_answers";
    pub const CHAT_HISTORY: &str = "chat_history";
    pub const LLM_MAPPINGS: &str = "llm_mappings";
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, returning its assigned id.
    async fn insert_one(&self, collection: &str, document: Document) -> StorageResult<String>;

    /// All matching documents in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Document>>;

    /// The first matching document.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StorageResult<Option<Document>> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    /// Merge `fields` into the first matching document. Returns the matched count (0 or 1).
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> StorageResult<u64>;

    /// Remove the first matching document. Returns the deleted count (0 or 1).
    async fn delete_one(&self, collection: &str, filter: &Filter) -> StorageResult<u64>;

    async fn count(&self, collection: &str, filter: &Filter) -> StorageResult<u64>;
}

/// Build a filter from `(field, value)` pairs.
pub fn filter<I, K, V>(pairs: I) -> Filter
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

pub(crate) fn matches(document: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

/// Copy of `document` without internal fields.
pub(crate) fn public_view(document: &Document) -> Document {
    let mut view = document.clone();
    view.remove(ID_FIELD);
    view
}

/// Shallow `$set`: overwrite top-level fields, never the id.
pub(crate) fn merge(document: &mut Document, fields: Document) {
    for (key, value) in fields {
        if key != ID_FIELD {
            document.insert(key, value);
        }
    }
}

pub(crate) fn with_new_id(mut document: Document) -> (String, Document) {
    let id = ulid::Ulid::new().to_string();
    document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    (id, document)
}
