// ./infrastructure/src/persistence/in_memory_repository.rs
use crate::search::filter::check_doc_matches_request;
use application::{ApplicationError, DocumentRepository};
use async_trait::async_trait;
use dashmap::DashMap;
use domain::{Document, DocumentId, SearchRequest};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Document repository backed by a concurrent map. Contents live for the
/// lifetime of the process; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    // Document ID -> Document
    store: Arc<DashMap<DocumentId, Arc<Document>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    fn key_for(document: &Document) -> Result<DocumentId, ApplicationError> {
        document.assigned_id().cloned().ok_or_else(|| {
            warn!(title = %document.title, "Refusing to store a document without an id");
            ApplicationError::InvalidInput("document id must be assigned before storing".to_string())
        })
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    #[instrument(skip(self, document))]
    async fn save(&self, document: &Document) -> Result<(), ApplicationError> {
        let id = Self::key_for(document)?;
        debug!(doc_id = %id, "Saving document to in-memory store");
        self.store.insert(id, Arc::new(document.clone()));
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, ApplicationError> {
        debug!(doc_id = %id, "Getting document from in-memory store");
        // Get returns a Ref, so we clone the Document out of the Arc
        let doc = self.store.get(id).map(|doc_ref| (**doc_ref).clone());
        Ok(doc)
    }

    #[instrument(skip(self, request))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        debug!(total = self.store.len(), "Scanning in-memory store");
        let hits: Vec<Document> = self
            .store
            .iter()
            .filter(|entry| check_doc_matches_request(entry.value(), request))
            .map(|entry| (**entry.value()).clone())
            .collect();
        trace!(count = hits.len(), "Documents after filtering");
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Document>, ApplicationError> {
        let docs = self
            .store
            .iter()
            .map(|entry| (**entry.value()).clone())
            .collect();
        Ok(docs)
    }

    async fn count(&self) -> Result<usize, ApplicationError> {
        Ok(self.store.len())
    }

    /// Optimized batch save for in-memory store.
    /// All ids are checked first so a bad batch leaves the map untouched.
    #[instrument(skip(self, documents))]
    async fn save_batch(&self, documents: &[Document]) -> Result<(), ApplicationError> {
        debug!(count = documents.len(), "Saving batch directly to in-memory store");
        let keyed = documents
            .iter()
            .map(|doc| Self::key_for(doc).map(|id| (id, Arc::new(doc.clone()))))
            .collect::<Result<Vec<_>, _>>()?;
        for (id, doc) in keyed {
            self.store.insert(id, doc);
        }
        Ok(())
    }
}
