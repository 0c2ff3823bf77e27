use crate::error::{Error, Result};
use std::fmt;

/// Join key segments with a single `/` between them.
///
/// Empty segments are skipped; a trailing `/` on the last segment is kept.
pub fn join_key(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => format!("{base}/"),
        (false, false) => format!("{base}/{name}"),
    }
}

/// Ensure `prefix` denotes a directory ("a/b" -> "a/b/").
pub fn as_dir_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Last non-empty segment: "a/b/results_1/" -> "results_1".
pub fn last_segment(key: &str) -> &str {
    key.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// `s3://bucket/key` split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub key: String,
}

impl S3Uri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| Error::InvalidS3Uri(uri.to_string()))?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidS3Uri(uri.to_string()));
        }
        Ok(Self::new(bucket, key))
    }

    pub fn join(&self, name: &str) -> Self {
        Self::new(self.bucket.clone(), join_key(&self.key, name))
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_behaves_like_path_join() {
        assert_eq!(join_key("exaspim_1/", "fusion"), "exaspim_1/fusion");
        assert_eq!(join_key("exaspim_1", "fused.zarr"), "exaspim_1/fused.zarr");
        assert_eq!(join_key("", "0"), "0");
        assert_eq!(join_key("a", ""), "a/");
    }

    #[test]
    fn segments() {
        assert_eq!(last_segment("a/results_20240615/"), "results_20240615");
        assert_eq!(last_segment("fused.zarr/3/"), "3");
        assert_eq!(last_segment("file.csv"), "file.csv");
        assert_eq!(as_dir_prefix("a/b"), "a/b/");
        assert_eq!(as_dir_prefix("a/b/"), "a/b/");
    }

    #[test]
    fn s3_uri_roundtrip_and_errors() {
        let uri = S3Uri::parse("s3://aind-open-data/exaspim_1/fused.zarr").unwrap();
        assert_eq!(uri.bucket, "aind-open-data");
        assert_eq!(uri.key, "exaspim_1/fused.zarr");
        assert_eq!(uri.join("0").to_string(), "s3://aind-open-data/exaspim_1/fused.zarr/0");

        assert!(S3Uri::parse("https://x/y").is_err());
        assert!(S3Uri::parse("s3:///y").is_err());
    }
}
