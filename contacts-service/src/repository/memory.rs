//! In-process contact storage.
//!
//! Used for local development (`DATASTORE_BACKEND=memory`) and as the
//! substitute datastore in tests. An outage can be simulated with
//! [`InMemoryContactStore::set_available`].

use super::document::NATIVE_ID_FIELD;
use super::store::{ContactStore, StoreError};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct InMemoryContactStore {
    endpoint: String,
    documents: RwLock<Vec<Document>>,
    available: AtomicBool,
}

impl InMemoryContactStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            documents: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated connectivity. While unavailable every operation fails
    /// with [`StoreError::Connectivity`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connectivity(anyhow::anyhow!(
                "connection to {} refused",
                self.endpoint
            )))
        }
    }
}

impl Default for InMemoryContactStore {
    fn default() -> Self {
        Self::new("memory://contacts")
    }
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    document.get_object_id(NATIVE_ID_FIELD).ok().as_ref() == Some(id)
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn insert(&self, document: Document) -> Result<(), StoreError> {
        self.check_available()?;
        let id = document.get_object_id(NATIVE_ID_FIELD).map_err(|e| {
            StoreError::Other(anyhow::anyhow!("document has no ObjectId _id: {}", e))
        })?;

        let mut documents = self.documents.write();
        if documents.iter().any(|d| has_id(d, &id)) {
            return Err(StoreError::Other(anyhow::anyhow!(
                "duplicate key: _id {}",
                id
            )));
        }
        documents.push(document);
        Ok(())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        Ok(self
            .documents
            .read()
            .iter()
            .find(|d| has_id(d, &id))
            .cloned())
    }

    async fn find_first(&self) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        Ok(self.documents.read().first().cloned())
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        Ok(self.documents.read().clone())
    }

    // Keys are stored verbatim; dotted keys are not expanded into nested
    // paths the way MongoDB's `$set` would.
    async fn update_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        let mut documents = self.documents.write();
        Ok(documents.iter_mut().find(|d| has_id(d, &id)).map(|existing| {
            for (key, value) in fields {
                existing.insert(key, value);
            }
            existing.clone()
        }))
    }

    async fn replace(
        &self,
        id: ObjectId,
        document: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        let mut documents = self.documents.write();
        Ok(documents.iter_mut().find(|d| has_id(d, &id)).map(|existing| {
            let mut replacement = Document::new();
            replacement.insert(NATIVE_ID_FIELD, id);
            for (key, value) in document {
                replacement.insert(key, value);
            }
            *existing = replacement;
            existing.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        self.check_available()?;
        self.documents.write().retain(|d| !has_id(d, &id));
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
