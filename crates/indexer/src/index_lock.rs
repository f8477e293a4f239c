use crate::{IndexerError, Result};
use fs2::FileExt;
use notes_vector_store::IndexPaths;
use std::time::Instant;

/// Exclusive cross-process lock on an index directory, released on drop
pub(crate) struct IndexWriteLock {
    file: std::fs::File,
}

impl Drop for IndexWriteLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Block (off the async runtime) until no other process is writing the index
pub(crate) async fn acquire_index_write_lock(paths: &IndexPaths) -> Result<IndexWriteLock> {
    tokio::fs::create_dir_all(paths.dir()).await?;
    let path = paths.lock();

    tokio::task::spawn_blocking(move || -> Result<IndexWriteLock> {
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| {
                IndexerError::Other(format!("open index lock {}: {err}", path.display()))
            })?;

        let start = Instant::now();
        file.lock_exclusive().map_err(|err| {
            IndexerError::Other(format!("acquire index lock {}: {err}", path.display()))
        })?;
        let waited = start.elapsed().as_millis();
        if waited > 0 {
            log::debug!("Waited {waited}ms for index lock {}", path.display());
        }

        Ok(IndexWriteLock { file })
    })
    .await
    .map_err(|err| IndexerError::Other(format!("join index lock task: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn lock_is_exclusive_until_dropped() {
        let tmp = TempDir::new().unwrap();
        let paths = IndexPaths::new(tmp.path().join("idx"));

        let held = acquire_index_write_lock(&paths).await.unwrap();
        let probe = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(paths.lock())
            .unwrap();
        assert!(probe.try_lock_exclusive().is_err());

        drop(held);
        assert!(probe.try_lock_exclusive().is_ok());
        probe.unlock().unwrap();
    }
}
