use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::capture::{CapturedPage, NewCapture};
use crate::error::Result;
use crate::summary::SummaryResult;
use super::{CaptureStore, MemoryStore};

/// In-memory store that rewrites a JSON snapshot after every change.
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens `path`, loading existing records if the file is there.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<CapturedPage> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        info!(path = %path.display(), records = records.len(), "opened capture store");

        Ok(Self {
            inner: MemoryStore::with_records(records),
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Writes the current records. Callers hold `write_lock` so the snapshot
    /// matches the change they are about to commit or roll back.
    async fn persist(&self) -> Result<()> {
        let records = self.inner.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&records)?;

        let tmp = self.path.with_extension("tmp");
        let written = async {
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;
        if let Err(err) = written {
            error!(path = %self.path.display(), error = %err, "failed to write capture snapshot");
            return Err(err.into());
        }
        Ok(())
    }
}

#[async_trait]
impl CaptureStore for FileStore {
    async fn create(&self, capture: NewCapture) -> Result<CapturedPage> {
        let _guard = self.write_lock.lock().await;
        let page = self.inner.create(capture).await?;
        if let Err(err) = self.persist().await {
            self.inner.delete(page.id).await?;
            return Err(err);
        }
        Ok(page)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CapturedPage>> {
        self.inner.find_by_id(id).await
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<CapturedPage>> {
        self.inner.find_recent(limit).await
    }

    async fn find_by_url(&self, pattern: &str, limit: usize) -> Result<Vec<CapturedPage>> {
        self.inner.find_by_url(pattern, limit).await
    }

    async fn update_summary(
        &self,
        id: Uuid,
        summary: SummaryResult,
        generated_at: DateTime<Utc>,
    ) -> Result<Option<CapturedPage>> {
        let _guard = self.write_lock.lock().await;
        let Some(previous) = self.inner.find_by_id(id).await? else {
            return Ok(None);
        };
        let updated = self.inner.update_summary(id, summary, generated_at).await?;
        if let Err(err) = self.persist().await {
            self.inner.put(previous).await;
            return Err(err);
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<CapturedPage>> {
        let _guard = self.write_lock.lock().await;
        let Some(removed) = self.inner.delete(id).await? else {
            return Ok(None);
        };
        if let Err(err) = self.persist().await {
            self.inner.put(removed).await;
            return Err(err);
        }
        Ok(Some(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::summary::SummaryMetadata;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("page-digest-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let path = scratch_path();
        let store = FileStore::open(&path).await.unwrap();
        let kept = store
            .create(NewCapture {
                url: "https://ex.com/kept".to_string(),
                title: None,
                content: "content that should be kept".to_string(),
                captured_at: None,
            })
            .await
            .unwrap();
        let dropped = store
            .create(NewCapture {
                url: "https://ex.com/dropped".to_string(),
                title: None,
                content: "content that will be deleted".to_string(),
                captured_at: None,
            })
            .await
            .unwrap();
        store.delete(dropped.id).await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.find_by_id(kept.id).await.unwrap(), Some(kept));
        assert!(reopened.find_by_id(dropped.id).await.unwrap().is_none());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn failed_write_leaves_records_unchanged() {
        let path = std::env::temp_dir()
            .join(format!("page-digest-missing-{}", Uuid::new_v4()))
            .join("data.json");
        let store = FileStore::open(&path).await.unwrap();

        let err = store
            .create(NewCapture {
                url: "https://ex.com/lost".to_string(),
                title: None,
                content: "content that cannot be written".to_string(),
                captured_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(store.find_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_summary_write_keeps_previous_record() {
        let dir = std::env::temp_dir().join(format!("page-digest-dir-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("data.json");
        let store = FileStore::open(&path).await.unwrap();
        let page = store
            .create(NewCapture {
                url: "https://ex.com/kept".to_string(),
                title: None,
                content: "content that should be kept".to_string(),
                captured_at: None,
            })
            .await
            .unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
        let summary = SummaryResult::fallback(5, SummaryMetadata::new("https://ex.com/kept", "Untitled", 27, "m"));
        assert!(store.update_summary(page.id, summary, Utc::now()).await.is_err());
        assert_eq!(store.find_by_id(page.id).await.unwrap(), Some(page.clone()));

        assert!(store.delete(page.id).await.is_err());
        assert_eq!(store.find_by_id(page.id).await.unwrap(), Some(page));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_a_storage_error() {
        let path = scratch_path();
        tokio::fs::write(&path, b"not json").await.unwrap();
        let err = FileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, AppError::Storage(_)));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
