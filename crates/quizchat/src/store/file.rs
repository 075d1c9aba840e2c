//! File-backed document store.
//!
//! Each collection is one JSON array at `<dir>/<collection>.json`. Every
//! mutation rewrites the whole file through a temp file + rename, so a crash
//! never leaves a half-written collection behind. Mutations are serialized
//! by a store-wide lock.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::{StorageError, StorageResult};
use super::{Document, DocumentStore, Filter, matches, merge, public_view, with_new_id};

pub struct FileDocumentStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::file_io(&dir, e))?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn load(&self, collection: &str) -> StorageResult<Vec<Document>> {
        let path = self.collection_path(collection);
        let contents = match fs::read(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&path, e)),
        };
        serde_json::from_slice(&contents).map_err(|e| StorageError::json(collection, e))
    }

    async fn save(&self, collection: &str, documents: &[Document]) -> StorageResult<()> {
        let data =
            serde_json::to_vec_pretty(documents).map_err(|e| StorageError::json(collection, e))?;
        atomic_write_file(&self.collection_path(collection), &data).await
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> StorageResult<String> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load(collection).await?;
        let (id, stored) = with_new_id(document);
        docs.push(stored);
        self.save(collection, &docs).await?;
        Ok(id)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StorageResult<Vec<Document>> {
        let _guard = self.lock.lock().await;
        let docs = self.load(collection).await?;
        Ok(docs
            .iter()
            .filter(|d| matches(d, filter))
            .map(public_view)
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> StorageResult<u64> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load(collection).await?;
        let Some(doc) = docs.iter_mut().find(|d| matches(d, filter)) else {
            return Ok(0);
        };
        merge(doc, fields);
        self.save(collection, &docs).await?;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load(collection).await?;
        let Some(i) = docs.iter().position(|d| matches(d, filter)) else {
            return Ok(0);
        };
        docs.remove(i);
        self.save(collection, &docs).await?;
        Ok(1)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StorageResult<u64> {
        let _guard = self.lock.lock().await;
        let docs = self.load(collection).await?;
        Ok(docs.iter().filter(|d| matches(d, filter)).count() as u64)
    }
}

/// Write data to a temp file, fsync it, then atomically rename to the final path.
///
/// The temp file name is generated internally using a ULID to avoid collisions
/// from concurrent writers targeting the same final path.
async fn atomic_write_file(final_path: &Path, data: &[u8]) -> StorageResult<()> {
    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let temp_path = final_path.with_file_name(format!("{}.{}.tmp", file_name, ulid::Ulid::new()));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    file.write_all(data)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    fs::rename(&temp_path, final_path)
        .await
        .map_err(|e| StorageError::file_io(final_path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ID_FIELD, filter};
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = FileDocumentStore::open(tmp.path()).await.unwrap();
            store
                .insert_one("llm_mappings", doc(json!({"llm_id": "a", "display_name": "Peter"})))
                .await
                .unwrap();
        }

        let store = FileDocumentStore::open(tmp.path()).await.unwrap();
        let docs = store.find("llm_mappings", &Filter::new()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["display_name"], "Peter");
        assert!(!docs[0].contains_key(ID_FIELD));

        let raw = std::fs::read_to_string(tmp.path().join("llm_mappings.json")).unwrap();
        assert!(raw.contains(ID_FIELD));
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/data");
        let store = FileDocumentStore::open(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.count("anything", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_delete_round() {
        let tmp = TempDir::new().unwrap();
        let store = FileDocumentStore::open(tmp.path()).await.unwrap();
        store
            .insert_one("problem_sets", doc(json!({"question_id": "q1", "difficulty": "easy"})))
            .await
            .unwrap();

        let by_id = filter([("question_id", "q1")]);
        assert_eq!(
            store
                .update_one("problem_sets", &by_id, doc(json!({"difficulty": "hard"})))
                .await
                .unwrap(),
            1
        );
        let found = store.find_one("problem_sets", &by_id).await.unwrap().unwrap();
        assert_eq!(found["difficulty"], "hard");

        assert_eq!(store.delete_one("problem_sets", &by_id).await.unwrap(), 1);
        assert!(store.find_one("problem_sets", &by_id).await.unwrap().is_none());
        assert_eq!(
            store
                .update_one("problem_sets", &by_id, doc(json!({"x": 1})))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let store = FileDocumentStore::open(tmp.path()).await.unwrap();
        for i in 0..3 {
            store.insert_one("c", doc(json!({"i": i}))).await.unwrap();
        }

        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["c.json".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_reported() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("c.json"), "{not json").unwrap();
        let store = FileDocumentStore::open(tmp.path()).await.unwrap();

        let err = store.find("c", &Filter::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
    }
}
