//! Resolve a brain id to the S3 path of its fused image pyramid.

use crate::cache::PrefixCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::path_utils::{join_key, last_segment, S3Uri};
use crate::storage::{self, ObjectStore};
use crate::zarr;
use std::collections::HashSet;
use std::path::Path;

pub struct ImageLocator<S> {
    store: S,
    cfg: Config,
}

impl<S: ObjectStore> ImageLocator<S> {
    pub fn new(store: S, cfg: Config) -> Self {
        Self { store, cfg }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Image path for `brain_id`, consulting and updating the lookup file
    /// at `cache_path` when one is given.
    ///
    /// The returned path ends in `/`. Exactly one candidate must survive
    /// validation; otherwise the error lists every survivor.
    pub fn get_img_prefix(&self, brain_id: &str, cache_path: Option<&Path>) -> Result<String> {
        // Check the lookup file first
        let mut cache = match cache_path {
            Some(path) => {
                let cache = PrefixCache::load(path)?;
                if let Some(hit) = cache.get(brain_id) {
                    tracing::debug!(brain_id, prefix = hit, "image prefix cache hit");
                    return Ok(hit.to_string());
                }
                Some(cache)
            }
            None => None,
        };

        // Cache miss: search the bucket
        let mut candidates = self.find_img_prefixes(brain_id)?;
        if candidates.len() != 1 {
            return Err(Error::AmbiguousImagePrefix {
                brain_id: brain_id.to_string(),
                candidates,
            });
        }

        let prefix = format!("{}/", candidates.remove(0));
        tracing::info!(brain_id, prefix = %prefix, "image prefix resolved");

        // Only unambiguous results are remembered
        if let (Some(cache), Some(path)) = (cache.as_mut(), cache_path) {
            cache.insert(brain_id, prefix.clone());
            cache.save(path)?;
        }
        Ok(prefix)
    }

    /// Every candidate that passes naming, layout and shape checks, as
    /// `s3://{bucket}/{prefix}/{pyramid}` without a trailing slash.
    pub fn find_img_prefixes(&self, brain_id: &str) -> Result<Vec<String>> {
        let bucket = &self.cfg.image_bucket;
        let keyword = self.cfg.image_keyword_for(brain_id);
        let prefixes = storage::list_bucket_prefixes(&self.store, bucket, Some(&keyword))?;

        let mut valid = Vec::new();
        for mut prefix in prefixes {
            // Newer acquisitions nest the pyramid under fusion/
            if storage::exists_in_prefix(&self.store, bucket, &prefix, &self.cfg.fusion_dirname)? {
                prefix = join_key(&prefix, &self.cfg.fusion_dirname);
            }

            if !self.is_valid_img_prefix(&prefix, brain_id)? {
                tracing::debug!(brain_id, prefix = %prefix, "candidate rejected by layout check");
                continue;
            }

            let uri = S3Uri::new(bucket.clone(), join_key(&prefix, &self.cfg.pyramid_dirname));
            if self.is_shape_plausible(&uri) {
                valid.push(uri.to_string());
            } else {
                tracing::debug!(brain_id, uri = %uri, "candidate rejected by shape check");
            }
        }
        Ok(valid)
    }

    /// Naming and layout check for one candidate prefix in the image bucket.
    ///
    /// Rejects prefixes that lack `brain_id` or mention "test" in any case.
    /// When a pyramid directory exists, all resolution levels must be present.
    pub fn is_valid_img_prefix(&self, prefix: &str, brain_id: &str) -> Result<bool> {
        if !prefix.contains(brain_id) || prefix.to_lowercase().contains("test") {
            return Ok(false);
        }

        // Every resolution level must be present
        let bucket = &self.cfg.image_bucket;
        if storage::exists_in_prefix(&self.store, bucket, prefix, &self.cfg.pyramid_dirname)? {
            let img_prefix = join_key(prefix, &self.cfg.pyramid_dirname);
            let levels = storage::list_prefixes(&self.store, bucket, &img_prefix)?;
            let present: HashSet<&str> = levels.iter().map(|s| last_segment(s)).collect();
            if let Some(missing) = self.cfg.level_names().find(|l| !present.contains(l.as_str())) {
                tracing::debug!(prefix, missing_level = %missing, "pyramid incomplete");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True if level 0 of the pyramid at `uri` exceeds the plausible extent
    /// along some axis.
    ///
    /// Any failure to read the metadata counts as implausible. The cause is
    /// only visible in debug logs, so a network error and a genuinely small
    /// image look the same to callers.
    pub fn is_shape_plausible(&self, uri: &S3Uri) -> bool {
        let level0 = uri.join("0");
        match zarr::read_array_shape(&self.store, &level0) {
            Ok(shape) => shape
                .iter()
                .max()
                .is_some_and(|&m| m > self.cfg.min_plausible_extent),
            Err(e) => {
                tracing::debug!(uri = %level0, error = %e, "level 0 unreadable, treating as implausible");
                false
            }
        }
    }
}
