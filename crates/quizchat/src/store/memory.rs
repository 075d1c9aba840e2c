//! In-memory document store.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{
    Document, DocumentStore, Filter, StorageResult, matches, merge, public_view, with_new_id,
};

/// Volatile store for tests and throwaway deployments.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> StorageResult<String> {
        let (id, stored) = with_new_id(document);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, filter))
                    .map(public_view)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> StorageResult<u64> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter_mut().find(|d| matches(d, filter)) {
            Some(doc) => {
                merge(doc, fields);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matches(d, filter)) {
            Some(i) => {
                docs.remove(i);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).count() as u64)
            .unwrap_or(0))
    }
}
