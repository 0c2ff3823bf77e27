//! Object storage access.
//!
//! Backends only implement single-page listing and whole-object reads;
//! pagination and name matching live in the free functions below.

mod http;
mod memory;

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

use crate::error::Result;
use crate::path_utils::{as_dir_prefix, last_segment};

pub const DELIMITER: &str = "/";

/// One bounded page of a delimiter listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Object keys directly under the prefix.
    pub keys: Vec<String>,
    /// Subdirectory prefixes, each ending in the delimiter.
    pub common_prefixes: Vec<String>,
    /// Present when more pages follow.
    pub next_token: Option<String>,
}

pub trait ObjectStore {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        token: Option<&str>,
    ) -> Result<ListPage>;

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        token: Option<&str>,
    ) -> Result<ListPage> {
        (**self).list_page(bucket, prefix, delimiter, token)
    }

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        (**self).read_object(bucket, key)
    }
}

/// Visit every page under `prefix` until the continuation token runs out.
/// The visitor returns `false` to stop early.
fn for_each_page<S, F>(store: &S, bucket: &str, prefix: &str, mut visit: F) -> Result<()>
where
    S: ObjectStore + ?Sized,
    F: FnMut(&ListPage) -> bool,
{
    let mut token: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = store.list_page(bucket, prefix, DELIMITER, token.as_deref())?;
        pages += 1;
        if !visit(&page) {
            break;
        }
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    tracing::trace!(bucket, prefix, pages, "listing done");
    Ok(())
}

/// Top-level directories of `bucket`, optionally filtered by `keyword`
/// (case-insensitive substring). Order is listing order.
pub fn list_bucket_prefixes<S>(store: &S, bucket: &str, keyword: Option<&str>) -> Result<Vec<String>>
where
    S: ObjectStore + ?Sized,
{
    let keyword = keyword.map(str::to_lowercase);
    let mut out = Vec::new();
    for_each_page(store, bucket, "", |page| {
        out.extend(
            page.common_prefixes
                .iter()
                .filter(|p| match &keyword {
                    Some(k) => p.to_lowercase().contains(k.as_str()),
                    None => true,
                })
                .cloned(),
        );
        true
    })?;
    tracing::debug!(bucket, keyword = ?keyword, found = out.len(), "bucket prefixes listed");
    Ok(out)
}

/// Immediate subdirectories of `prefix`, as full prefixes ending in `/`.
pub fn list_prefixes<S>(store: &S, bucket: &str, prefix: &str) -> Result<Vec<String>>
where
    S: ObjectStore + ?Sized,
{
    let prefix = as_dir_prefix(prefix);
    let mut out = Vec::new();
    for_each_page(store, bucket, &prefix, |page| {
        out.extend(page.common_prefixes.iter().cloned());
        true
    })?;
    Ok(out)
}

/// True if a file or immediate subdirectory named `name` sits under `prefix`.
pub fn exists_in_prefix<S>(store: &S, bucket: &str, prefix: &str, name: &str) -> Result<bool>
where
    S: ObjectStore + ?Sized,
{
    let prefix = as_dir_prefix(prefix);
    let mut found = false;
    for_each_page(store, bucket, &prefix, |page| {
        found = page
            .keys
            .iter()
            .chain(page.common_prefixes.iter())
            .any(|k| last_segment(k) == name);
        !found
    })?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryObjectStore {
        let mut s = MemoryObjectStore::with_page_size(2);
        for key in [
            "exaspim_100_2023/fused.zarr/0/.zarray",
            "exaspim_100_2023/fused.zarr/1/.zarray",
            "exaspim_100_2023/README.md",
            "EXASPIM_100_test/x",
            "exaspim_200_2024/fusion/fused.zarr/0/.zarray",
            "other_100/x",
            "z/x",
        ] {
            s.put("bucket", key, b"{}".to_vec());
        }
        s
    }

    #[test]
    fn bucket_listing_pages_and_filters() {
        let s = store();
        let all = list_bucket_prefixes(&s, "bucket", None).unwrap();
        assert_eq!(all.len(), 5);

        let hits = list_bucket_prefixes(&s, "bucket", Some("exaspim_100")).unwrap();
        assert_eq!(hits, vec!["EXASPIM_100_test/", "exaspim_100_2023/"]);
    }

    #[test]
    fn subdirectory_listing_adds_trailing_slash() {
        let s = store();
        let levels = list_prefixes(&s, "bucket", "exaspim_100_2023/fused.zarr").unwrap();
        assert_eq!(
            levels,
            vec!["exaspim_100_2023/fused.zarr/0/", "exaspim_100_2023/fused.zarr/1/"]
        );
        assert!(list_prefixes(&s, "bucket", "missing").unwrap().is_empty());
    }

    #[test]
    fn exists_matches_files_and_directories() {
        let s = store();
        assert!(exists_in_prefix(&s, "bucket", "exaspim_100_2023/", "fused.zarr").unwrap());
        assert!(exists_in_prefix(&s, "bucket", "exaspim_100_2023", "README.md").unwrap());
        assert!(!exists_in_prefix(&s, "bucket", "exaspim_100_2023/", "fusion").unwrap());
        assert!(exists_in_prefix(&s, "bucket", "exaspim_200_2024/fusion", "fused.zarr").unwrap());
    }
}
