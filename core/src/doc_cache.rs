use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::DocId;

/// Cached metadata for one indexed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub id: DocId,
    pub title: String,
    pub path: String,
    pub tags: Vec<String>,
}

/// Lightweight id -> metadata map, populated alongside the inverted index so
/// path filtering and result assembly avoid refetching full documents from
/// the store when only metadata is needed.
#[derive(Debug, Default)]
pub struct DocCache {
    entries: HashMap<DocId, DocMeta>,
}

impl DocCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `meta.id`.
    pub fn put(&mut self, meta: DocMeta) {
        self.entries.insert(meta.id.clone(), meta);
    }

    pub fn get(&self, id: &str) -> Option<&DocMeta> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &str) {
        self.entries.remove(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, title: &str) -> DocMeta {
        DocMeta {
            id: id.to_string(),
            title: title.to_string(),
            path: "/notes".to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn put_overwrites() {
        let mut cache = DocCache::new();
        cache.put(meta("d1", "first"));
        cache.put(meta("d1", "second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("d1").unwrap().title, "second");
    }

    #[test]
    fn remove_then_get_is_absent() {
        let mut cache = DocCache::new();
        cache.put(meta("d1", "first"));
        cache.remove("d1");
        cache.remove("d1");

        assert!(cache.get("d1").is_none());
        assert!(cache.is_empty());
    }
}
