use super::{ListPage, ObjectStore};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Bucket contents held in memory, listed in key order with bounded pages.
#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    page_size: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::with_page_size(1000)
    }
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            buckets: BTreeMap::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn put(&mut self, bucket: &str, key: &str, bytes: Vec<u8>) {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), bytes);
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Entry {
    Key(String),
    Prefix(String),
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Entry::Key(s) | Entry::Prefix(s) => s,
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        token: Option<&str>,
    ) -> Result<ListPage> {
        let Some(objects) = self.buckets.get(bucket) else {
            return Ok(ListPage::default());
        };

        let mut entries: BTreeSet<Entry> = BTreeSet::new();
        for key in objects.keys().filter(|k| k.starts_with(prefix)) {
            let rest = &key[prefix.len()..];
            match rest.find(delimiter).filter(|_| !delimiter.is_empty()) {
                Some(idx) => {
                    let end = prefix.len() + idx + delimiter.len();
                    entries.insert(Entry::Prefix(key[..end].to_string()));
                }
                None => {
                    entries.insert(Entry::Key(key.clone()));
                }
            }
        }

        let mut sorted: Vec<Entry> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        let total = sorted.len();

        let start = match token {
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| Error::Service(format!("invalid continuation token {t:?}")))?,
            None => 0,
        };
        let end = start.saturating_add(self.page_size).min(total);

        let mut page = ListPage::default();
        for entry in sorted.into_iter().skip(start).take(end.saturating_sub(start)) {
            match entry {
                Entry::Key(k) => page.keys.push(k),
                Entry::Prefix(p) => page.common_prefixes.push(p),
            }
        }
        if end < total {
            page.next_token = Some(end.to_string());
        }
        Ok(page)
    }

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_carry_continuation_tokens() {
        let mut s = MemoryObjectStore::with_page_size(2);
        for key in ["a/1", "b/1", "b/2", "c.txt", "d/x/y"] {
            s.put("bkt", key, Vec::new());
        }

        let first = s.list_page("bkt", "", "/", None).unwrap();
        assert_eq!(first.common_prefixes, vec!["a/", "b/"]);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = s.list_page("bkt", "", "/", Some("2")).unwrap();
        assert_eq!(second.keys, vec!["c.txt"]);
        assert_eq!(second.common_prefixes, vec!["d/"]);
        assert_eq!(second.next_token, None);
    }

    #[test]
    fn unknown_bucket_lists_empty_and_reads_fail() {
        let s = MemoryObjectStore::new();
        assert_eq!(s.list_page("none", "", "/", None).unwrap(), ListPage::default());
        assert!(matches!(
            s.read_object("none", "k"),
            Err(Error::ObjectNotFound { .. })
        ));
    }
}
