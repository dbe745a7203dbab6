//! # JSON File Store
//!
//! [`ListingStore`] backed by a single JSON document.
//!
//! The document is `{"lastId": n, "listings": [...]}`. A bare JSON array
//! (the format of exported listing dumps) is also accepted on read; the
//! next save upgrades it to the document form.

use super::atomic::{read_optional, write_atomic};
use super::traits::{ListingStore, RepositoryError, RepositoryResult, StoreSnapshot};
use crate::domain::entities::Listing;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// JSON document store.
#[derive(Debug, Clone)]
pub struct JsonFileListingStore {
    path: PathBuf,
}

impl JsonFileListingStore {
    /// Creates a store at `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses store content into a snapshot.
///
/// # Errors
///
/// Returns `RepositoryError::Corrupt` if the content is not a listing
/// document or listing array.
pub(crate) fn parse_document(content: &str) -> RepositoryResult<StoreSnapshot> {
    if content.trim().is_empty() {
        return Ok(StoreSnapshot::default());
    }

    let value: Value = serde_json::from_str(content)
        .map_err(|e| RepositoryError::corrupt(format!("invalid JSON: {}", e)))?;

    match value {
        Value::Array(items) => Ok(StoreSnapshot::new(decode_listings(items)?, 0)),
        Value::Object(mut doc) => {
            let last_id = match doc.remove("lastId") {
                None | Some(Value::Null) => 0,
                Some(v) => v
                    .as_u64()
                    .ok_or_else(|| RepositoryError::corrupt("lastId is not an integer"))?,
            };
            let items = match doc.remove("listings") {
                Some(Value::Array(items)) => items,
                Some(_) => return Err(RepositoryError::corrupt("listings is not an array")),
                None => Vec::new(),
            };
            Ok(StoreSnapshot::new(decode_listings(items)?, last_id))
        }
        _ => Err(RepositoryError::corrupt("expected a listing array or document")),
    }
}

/// Decodes a JSON array of listings.
///
/// # Errors
///
/// Returns `RepositoryError::Corrupt` naming the first element that does
/// not decode.
pub(crate) fn decode_listings(items: Vec<Value>) -> RepositoryResult<Vec<Listing>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Listing::from_json(item)
                .map_err(|e| RepositoryError::corrupt(format!("listing #{}: {}", index, e)))
        })
        .collect()
}

#[async_trait]
impl ListingStore for JsonFileListingStore {
    async fn load_snapshot(&self) -> RepositoryResult<StoreSnapshot> {
        match read_optional(&self.path).await? {
            Some(content) => parse_document(&content),
            None => Ok(StoreSnapshot::default()),
        }
    }

    async fn save_snapshot(&self, snapshot: &StoreSnapshot) -> RepositoryResult<()> {
        let mut bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| RepositoryError::serialization(e.to_string()))?;
        bytes.push(b'\n');
        write_atomic(&self.path, &bytes).await?;
        tracing::debug!(
            path = %self.path.display(),
            count = snapshot.listings.len(),
            "listing store written"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ListingId, ListingType};

    fn listing(id: u64) -> Listing {
        Listing::new(ListingId::new(id), format!("listing {id}"), ListingType::Have)
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileListingStore::new(dir.path().join("listings.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileListingStore::new(dir.path().join("listings.json"));

        store.save(&[listing(1), listing(2)]).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, vec![listing(1), listing(2)]);
        assert_eq!(store.load_snapshot().await.unwrap().last_id, 2);
    }

    #[tokio::test]
    async fn save_keeps_high_water_mark() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileListingStore::new(dir.path().join("listings.json"));

        store.save(&[listing(5)]).await.unwrap();
        store.save(&[]).await.unwrap();

        let snapshot = store.load_snapshot().await.unwrap();
        assert!(snapshot.listings.is_empty());
        assert_eq!(snapshot.next_id(), ListingId::new(6));
    }

    #[tokio::test]
    async fn reads_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, r#"[{"id": 3, "title": "x", "type": "WANT"}]"#).unwrap();

        let snapshot = JsonFileListingStore::new(&path).load_snapshot().await.unwrap();
        assert_eq!(snapshot.listings.len(), 1);
        assert_eq!(snapshot.last_id, 3);
    }

    #[tokio::test]
    async fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileListingStore::new(&path).load().await.unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn wrong_shapes_are_corrupt() {
        assert!(parse_document("42").unwrap_err().is_corrupt());
        assert!(parse_document(r#"{"listings": {}}"#).unwrap_err().is_corrupt());
        assert!(parse_document(r#"[{"title": "no id"}]"#).unwrap_err().is_corrupt());
        assert!(parse_document("   ").unwrap().listings.is_empty());
    }
}
