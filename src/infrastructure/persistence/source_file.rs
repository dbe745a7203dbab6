//! # Source File Store
//!
//! [`ListingStore`] that keeps listings as an array literal embedded in a
//! text file, the format the website's marketplace route shipped with:
//!
//! ```text
//! // Cannabis business listings
//! const CANNABIS_LISTINGS = [
//!   { "id": 1, "title": "...", ... }
//! ];
//! const CANNABIS_LISTINGS_LAST_ID = 1;
//! ```
//!
//! Only the two literals are rewritten on save; the surrounding text is
//! kept byte for byte. The array literal is located with a streaming JSON
//! parse, so `];` inside a string value does not end it early. A file
//! without the array statement is regenerated from [`DEFAULT_TEMPLATE`].

use super::atomic::{read_optional, write_atomic};
use super::json_file::decode_listings;
use super::traits::{ListingStore, RepositoryError, RepositoryResult, StoreSnapshot};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Statement prefix that introduces the listing array.
pub const LISTINGS_MARKER: &str = "const CANNABIS_LISTINGS = ";

/// Statement prefix that introduces the id high-water mark.
pub const LAST_ID_MARKER: &str = "const CANNABIS_LISTINGS_LAST_ID = ";

/// Content written when the file does not exist or has no array statement.
pub const DEFAULT_TEMPLATE: &str = "// Cannabis business listings - managed by cannx-listings\n\
const CANNABIS_LISTINGS = [];\n\
const CANNABIS_LISTINGS_LAST_ID = 0;\n";

/// Store backed by an array literal inside a source file.
#[derive(Debug, Clone)]
pub struct SourceFileListingStore {
    path: PathBuf,
}

/// Byte ranges of the literals inside the file.
#[derive(Debug)]
struct Layout {
    array: (usize, usize),
    last_id: Option<(usize, usize)>,
    snapshot: StoreSnapshot,
}

impl SourceFileListingStore {
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

fn locate(content: &str) -> RepositoryResult<Layout> {
    let marker = content
        .find(LISTINGS_MARKER)
        .ok_or_else(|| RepositoryError::corrupt("listing array statement not found"))?;
    let value_start = marker + LISTINGS_MARKER.len();
    let tail = content.get(value_start..).unwrap_or_default();

    let mut stream = serde_json::Deserializer::from_str(tail).into_iter::<Value>();
    let items = match stream.next() {
        Some(Ok(Value::Array(items))) => items,
        Some(Ok(_)) => return Err(RepositoryError::corrupt("listing literal is not an array")),
        Some(Err(e)) => {
            return Err(RepositoryError::corrupt(format!(
                "invalid listing literal: {}",
                e
            )));
        }
        None => return Err(RepositoryError::corrupt("listing literal is missing")),
    };
    let value_end = value_start + stream.byte_offset();

    let after = content.get(value_end..).unwrap_or_default();
    if !after.trim_start().starts_with(';') {
        return Err(RepositoryError::corrupt(
            "listing literal is not terminated by ';'",
        ));
    }

    // Whitespace the parser skipped before '[' belongs to the prefix.
    let skipped = tail.len() - tail.trim_start().len();
    let array = (value_start + skipped, value_end);

    // The marker is only a statement outside the array literal; inside it,
    // it is listing text.
    let last_id_pos = content
        .get(value_end..)
        .and_then(|rest| rest.find(LAST_ID_MARKER))
        .map(|pos| value_end + pos)
        .or_else(|| content.get(..marker).and_then(|head| head.find(LAST_ID_MARKER)));

    let (last_id, last_id_span) = match last_id_pos {
        Some(pos) => {
            let start = pos + LAST_ID_MARKER.len();
            let digits = content
                .get(start..)
                .unwrap_or_default()
                .chars()
                .take_while(char::is_ascii_digit)
                .count();
            let text = content.get(start..start + digits).unwrap_or_default();
            let value = text
                .parse::<u64>()
                .map_err(|_| RepositoryError::corrupt("last id literal is not an integer"))?;
            (value, Some((start, start + digits)))
        }
        None => (0, None),
    };

    Ok(Layout {
        array,
        last_id: last_id_span,
        snapshot: StoreSnapshot::new(decode_listings(items)?, last_id),
    })
}

fn render(existing: Option<&str>, snapshot: &StoreSnapshot) -> RepositoryResult<String> {
    let array = serde_json::to_string_pretty(&snapshot.listings)
        .map_err(|e| RepositoryError::serialization(e.to_string()))?;
    let last_id = snapshot.last_id.to_string();

    let base = existing.filter(|content| locate(content).is_ok());
    let content = base.unwrap_or(DEFAULT_TEMPLATE);
    let layout = locate(content)?;

    let (array_start, array_end) = layout.array;
    let prefix = content.get(..array_start).unwrap_or_default();
    let suffix = content.get(array_end..).unwrap_or_default();

    let mut out = String::with_capacity(content.len() + array.len());
    match layout.last_id {
        Some((id_start, id_end)) if id_start > array_end => {
            out.push_str(prefix);
            out.push_str(&array);
            out.push_str(content.get(array_end..id_start).unwrap_or_default());
            out.push_str(&last_id);
            out.push_str(content.get(id_end..).unwrap_or_default());
        }
        Some((id_start, id_end)) => {
            out.push_str(content.get(..id_start).unwrap_or_default());
            out.push_str(&last_id);
            out.push_str(content.get(id_end..array_start).unwrap_or_default());
            out.push_str(&array);
            out.push_str(suffix);
        }
        None => {
            let semicolon = suffix.find(';').map_or(0, |pos| pos + 1);
            out.push_str(prefix);
            out.push_str(&array);
            out.push_str(suffix.get(..semicolon).unwrap_or_default());
            out.push('\n');
            out.push_str(LAST_ID_MARKER);
            out.push_str(&last_id);
            out.push(';');
            out.push_str(suffix.get(semicolon..).unwrap_or_default());
        }
    }
    Ok(out)
}

#[async_trait]
impl ListingStore for SourceFileListingStore {
    async fn load_snapshot(&self) -> RepositoryResult<StoreSnapshot> {
        match read_optional(&self.path).await? {
            Some(content) => Ok(locate(&content)?.snapshot),
            None => Ok(StoreSnapshot::default()),
        }
    }

    async fn save_snapshot(&self, snapshot: &StoreSnapshot) -> RepositoryResult<()> {
        let existing = read_optional(&self.path).await.ok().flatten();
        if existing.as_deref().is_some_and(|content| locate(content).is_err()) {
            tracing::warn!(
                path = %self.path.display(),
                "listing literal unreadable, regenerating source file from template"
            );
        }
        let content = render(existing.as_deref(), snapshot)?;
        write_atomic(&self.path, content.as_bytes()).await?;
        tracing::debug!(
            path = %self.path.display(),
            count = snapshot.listings.len(),
            "listing source file rewritten"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("source_file:{}", self.path.display())
    }
}
