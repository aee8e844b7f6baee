use std::path::{Path, PathBuf};

use salesflow_bucket::BucketStore;
use tracing::info;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSummary {
    pub key: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Downloads `key` from `store` into `dest`, replacing whatever was there.
pub async fn extract(store: &dyn BucketStore, key: &str, dest: &Path) -> Result<ExtractSummary> {
    let contents = store.get_object(key).await?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| PipelineError::io(parent, err))?;
    }
    tokio::fs::write(dest, &contents)
        .await
        .map_err(|err| PipelineError::io(dest, err))?;

    info!(
        bucket = store.bucket(),
        key,
        path = %dest.display(),
        bytes = contents.len(),
        "downloaded source object"
    );

    Ok(ExtractSummary {
        key: key.to_string(),
        path: dest.to_path_buf(),
        bytes: contents.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesflow_bucket::{BucketError, MemoryBucketStore};

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/raw.csv");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(&dest, "stale contents that are longer than the new ones").unwrap();

        let store = MemoryBucketStore::with_object("sales", "sales_data.csv", "OrderID\n1\n");
        let summary = extract(&store, "sales_data.csv", &dest).await.unwrap();

        assert_eq!(summary.bytes, 10);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "OrderID\n1\n");
    }

    #[tokio::test]
    async fn missing_object_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("raw.csv");
        let store = MemoryBucketStore::new("sales");

        let err = extract(&store, "sales_data.csv", &dest).await.unwrap_err();
        assert!(matches!(err, PipelineError::Bucket(BucketError::NotFound(_))));
        assert!(!dest.exists());
    }
}
