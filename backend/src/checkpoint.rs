//! Resumable batch jobs: a persisted set of processed IDs plus the results
//! gathered so far, rewritten atomically every few records.

use std::{
    collections::BTreeSet,
    fs,
    io,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::AppError,
    retry::{is_transient_io, RetryPolicy},
};

#[derive(Deserialize)]
struct StoredCheckpoint<T> {
    processed_ids: BTreeSet<String>,
    results: Vec<T>,
}

#[derive(Serialize)]
struct CheckpointSnapshot<'a, T> {
    processed_ids: &'a BTreeSet<String>,
    results: &'a [T],
    updated_at: String,
}

pub struct ResumableJob<T> {
    path: PathBuf,
    processed: BTreeSet<String>,
    results: Vec<T>,
    interval: usize,
    pending: usize,
    retry: RetryPolicy,
}

impl<T> ResumableJob<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Load the checkpoint at `path`, or start empty when it does not exist.
    pub fn open(
        path: impl Into<PathBuf>,
        interval: usize,
        retry: RetryPolicy,
    ) -> Result<Self, AppError> {
        let path = path.into();
        let (processed, results) = if path.exists() {
            let raw = fs::read(&path)?;
            let file: StoredCheckpoint<T> = serde_json::from_slice(&raw)?;
            tracing::info!(
                "resuming from checkpoint {}: {} processed, {} results",
                path.display(),
                file.processed_ids.len(),
                file.results.len()
            );
            (file.processed_ids, file.results)
        } else {
            (BTreeSet::new(), Vec::new())
        };

        Ok(Self {
            path,
            processed,
            results,
            interval: interval.max(1),
            pending: 0,
            retry,
        })
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// Mark `id` as done, keep its result if any, and persist every `interval` records.
    pub fn record(&mut self, id: impl Into<String>, result: Option<T>) -> Result<(), AppError> {
        if !self.processed.insert(id.into()) {
            return Ok(());
        }
        self.results.extend(result);
        self.pending += 1;
        if self.pending >= self.interval {
            self.save()?;
        }
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), AppError> {
        let snapshot = CheckpointSnapshot {
            processed_ids: &self.processed,
            results: &self.results,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        let bytes = serde_json::to_vec(&snapshot)?;
        write_atomic(&self.path, &bytes, &self.retry)?;
        self.pending = 0;
        tracing::debug!(
            "checkpoint {} saved ({} processed)",
            self.path.display(),
            self.processed.len()
        );
        Ok(())
    }

    /// The job completed: drop the checkpoint file and hand back the results.
    pub fn finish(self) -> Result<Vec<T>, AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(self.results)
    }
}

/// Pretty-printed JSON written through [`write_atomic`].
pub fn write_json_atomic<V: Serialize + ?Sized>(
    path: &Path,
    value: &V,
    retry: &RetryPolicy,
) -> Result<(), AppError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes, retry)?;
    Ok(())
}

/// Write to a sibling `.tmp` file, then rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8], retry: &RetryPolicy) -> io::Result<()> {
    let mut file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_os_string();
    file_name.push(".tmp");
    let temp_path = path.with_file_name(file_name);

    retry.retry(|| fs::write(&temp_path, bytes), is_transient_io)?;
    retry.retry(|| fs::rename(&temp_path, path), is_transient_io)
}
