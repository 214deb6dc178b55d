pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::capture::{CapturedPage, NewCapture};
use crate::error::Result;
use crate::summary::SummaryResult;

/// Persistence for captured pages.
#[async_trait]
pub trait CaptureStore: Send + Sync {
    async fn create(&self, capture: NewCapture) -> Result<CapturedPage>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CapturedPage>>;

    /// Newest first by creation time, at most `limit` records.
    async fn find_recent(&self, limit: usize) -> Result<Vec<CapturedPage>>;

    /// Records whose URL contains `pattern`, ignoring case, newest first.
    async fn find_by_url(&self, pattern: &str, limit: usize) -> Result<Vec<CapturedPage>>;

    /// Replaces the summary and its timestamp together. Returns the updated
    /// record, or `None` if it no longer exists.
    async fn update_summary(
        &self,
        id: Uuid,
        summary: SummaryResult,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<CapturedPage>>;

    /// Removes a record, returning it if it existed.
    async fn delete(&self, id: Uuid) -> Result<Option<CapturedPage>>;
}
