use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::{Author, Document, DocumentId, SearchRequest};
use rand::Rng;
use std::io::Write;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// --- Infrastructure Interfaces (Traits) ---

/// Interface for storing, retrieving and scanning documents.
///
/// Implementations key documents by their id and expect it to be assigned;
/// id generation and `created` stamping belong to `DocumentStore`.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts or replaces a document under its id.
    async fn save(&self, document: &Document) -> Result<(), ApplicationError>;
    /// Retrieves a document by its exact id.
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, ApplicationError>;
    /// Returns every stored document passing all constraints of `request`.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError>;
    /// Returns every stored document, in no particular order.
    async fn list(&self) -> Result<Vec<Document>, ApplicationError>;
    /// Number of stored documents.
    async fn count(&self) -> Result<usize, ApplicationError>;
    /// Inserts or replaces multiple documents.
    #[instrument(skip(self, documents))]
    async fn save_batch(&self, documents: &[Document]) -> Result<(), ApplicationError> {
        debug!(count = documents.len(), "Saving batch via default iteration");
        for doc in documents {
            self.save(doc).await?;
        }
        Ok(())
    }
}

/// Source of the timestamps written into `Document::created`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Useful to pin `created` values.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// --- Application Services (Use Cases) ---

/// Upper bound (exclusive, in seconds) of the random age given to generated documents.
const MAX_GENERATED_AGE_SECS: i64 = 1_000_000;

/// The document store: upsert with id generation, exact lookup and filtered search.
pub struct DocumentStore {
    repo: Arc<dyn DocumentRepository>,
    clock: Arc<dyn Clock>,
}

impl DocumentStore {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: Arc<dyn DocumentRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Upserts a document.
    ///
    /// Assigns a fresh id when the document has none (or an empty one) and
    /// always overwrites `created` with the current time, including on update.
    /// The original creation time of an overwritten document is therefore lost.
    #[instrument(skip(self, document), fields(title = %document.title))]
    pub async fn save(&self, mut document: Document) -> Result<Document, ApplicationError> {
        let id = match document.assigned_id() {
            Some(id) => id.clone(),
            None => {
                let id = DocumentId::generate();
                debug!(doc_id = %id, "Generated id for new document");
                id
            }
        };
        document.id = Some(id.clone());
        document.created = Some(self.clock.now());

        self.repo.save(&document).await?;
        info!(doc_id = %id, "Document saved");
        Ok(document)
    }

    /// Returns all stored documents matching `request`, in no particular order.
    #[instrument(skip(self, request))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        debug!(
            unconstrained = request.is_unconstrained(),
            "Searching documents"
        );
        let hits = self.repo.search(request).await?;
        info!(hits = hits.len(), "Search finished");
        Ok(hits)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        let doc = self.repo.get(&DocumentId::new(id)).await?;
        if doc.is_none() {
            debug!(doc_id = %id, "Document not found");
        }
        Ok(doc)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<usize, ApplicationError> {
        self.repo.count().await
    }

    /// Fills the store with `count` synthetic documents.
    ///
    /// Generated documents bypass `save`, so each keeps its random `created`
    /// somewhere within the last `MAX_GENERATED_AGE_SECS` seconds.
    #[instrument(skip(self))]
    pub async fn generate_random(&self, count: usize) -> Result<usize, ApplicationError> {
        if count == 0 {
            warn!("Asked to generate zero documents");
            return Ok(0);
        }

        let now = self.clock.now();
        let documents: Vec<Document> = {
            let mut rng = rand::thread_rng();
            (0..count)
                .map(|i| {
                    let author = Author::new(Uuid::new_v4().to_string(), format!("Author {i}"));
                    let age = Duration::seconds(rng.gen_range(0..MAX_GENERATED_AGE_SECS));
                    Document::new(
                        format!("Title {i}"),
                        format!("This is the content of document {i}"),
                        author,
                    )
                    .with_id(DocumentId::generate())
                    .with_created(now - age)
                })
                .collect()
        };

        self.repo.save_batch(&documents).await?;
        info!(count, "Generated random documents");
        Ok(count)
    }

    /// Writes every stored document to `out` as one JSON object per line.
    #[instrument(skip(self, out))]
    pub async fn dump_all<W: Write>(&self, out: &mut W) -> Result<usize, ApplicationError> {
        let documents = self.repo.list().await?;
        for doc in &documents {
            serde_json::to_writer(&mut *out, doc)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        debug!(count = documents.len(), "Dumped documents");
        Ok(documents.len())
    }
}
