//! Atomic file replacement for the file-backed stores.

use super::traits::{RepositoryError, RepositoryResult};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Writes `bytes` to a sibling temp file and renames it over `path`.
///
/// Readers observe either the previous content or the new content, never a
/// partial write. The parent directory is created if needed.
///
/// # Errors
///
/// Returns `RepositoryError::Io` if any step fails; the temp file is
/// removed on a failed rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> RepositoryResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            RepositoryError::io(format!(
                "failed to prepare store directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store");
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    {
        let mut file = tokio::fs::File::create(&temp_path).await.map_err(|e| {
            RepositoryError::io(format!("failed to create {}: {}", temp_path.display(), e))
        })?;
        file.write_all(bytes).await.map_err(|e| {
            RepositoryError::io(format!("failed to write {}: {}", temp_path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            RepositoryError::io(format!("failed to sync {}: {}", temp_path.display(), e))
        })?;
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(RepositoryError::io(format!(
            "failed to replace {}: {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

/// Reads a file as UTF-8, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Io` for any other read failure and
/// `RepositoryError::Corrupt` if the content is not UTF-8.
pub async fn read_optional(path: &Path) -> RepositoryResult<Option<String>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| RepositoryError::corrupt(format!("{} is not UTF-8: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RepositoryError::io(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("listings.json");

        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(read_optional(&path).await.unwrap().as_deref(), Some("second"));
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("absent.json"))
            .await
            .unwrap()
            .is_none());
    }
}
