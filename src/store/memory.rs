use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::capture::{CapturedPage, NewCapture};
use crate::error::Result;
use crate::summary::SummaryResult;
use super::CaptureStore;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, CapturedPage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CapturedPage>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    /// Inserts or replaces a record as-is.
    pub(crate) async fn put(&self, page: CapturedPage) {
        self.records.write().await.insert(page.id, page);
    }

    pub async fn snapshot(&self) -> Vec<CapturedPage> {
        let records = self.records.read().await;
        newest_first(records.values().cloned().collect())
    }
}

fn newest_first(mut records: Vec<CapturedPage>) -> Vec<CapturedPage> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    records
}

#[async_trait]
impl CaptureStore for MemoryStore {
    async fn create(&self, capture: NewCapture) -> Result<CapturedPage> {
        let page = CapturedPage::new(capture);
        self.records.write().await.insert(page.id, page.clone());
        Ok(page)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CapturedPage>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<CapturedPage>> {
        let mut records = self.snapshot().await;
        records.truncate(limit);
        Ok(records)
    }

    async fn find_by_url(&self, pattern: &str, limit: usize) -> Result<Vec<CapturedPage>> {
        let needle = pattern.to_lowercase();
        let records = self.snapshot().await;
        Ok(records
            .into_iter()
            .filter(|r| r.url.to_lowercase().contains(&needle))
            .take(limit)
            .collect())
    }

    async fn update_summary(
        &self,
        id: Uuid,
        summary: SummaryResult,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<CapturedPage>> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|page| {
            page.summary = Some(summary);
            page.summary_generated_at = Some(generated_at);
            page.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<CapturedPage>> {
        Ok(self.records.write().await.remove(&id))
    }
}
