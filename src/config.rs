use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://s3.us-west-2.amazonaws.com";
pub const IMAGE_BUCKET: &str = "aind-open-data";
pub const SOMA_BUCKET: &str = "aind-msma-morphology-data";
pub const SOMA_NAMESPACE: &str = "exaspim_soma_detection";

/// Bucket layout and validation thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// S3 REST endpoint, path-style.
    pub endpoint: String,
    pub image_bucket: String,
    /// Top-level directories are matched against `{image_keyword}_{brain_id}`.
    pub image_keyword: String,
    /// Subdirectory used by the newer acquisition layout.
    pub fusion_dirname: String,
    pub pyramid_dirname: String,
    /// Resolution levels "0".."levels-1" must all be present.
    pub levels: u32,
    /// Level 0 must exceed this extent along at least one axis.
    pub min_plausible_extent: u64,
    pub soma_bucket: String,
    pub soma_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            image_bucket: IMAGE_BUCKET.to_string(),
            image_keyword: "exaspim".to_string(),
            fusion_dirname: "fusion".to_string(),
            pyramid_dirname: "fused.zarr".to_string(),
            levels: 8,
            min_plausible_extent: 25_000,
            soma_bucket: SOMA_BUCKET.to_string(),
            soma_namespace: SOMA_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `EXASPIM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        let strings: [(&str, &mut String); 7] = [
            ("EXASPIM_S3_ENDPOINT", &mut cfg.endpoint),
            ("EXASPIM_IMAGE_BUCKET", &mut cfg.image_bucket),
            ("EXASPIM_IMAGE_KEYWORD", &mut cfg.image_keyword),
            ("EXASPIM_FUSION_DIRNAME", &mut cfg.fusion_dirname),
            ("EXASPIM_PYRAMID_DIRNAME", &mut cfg.pyramid_dirname),
            ("EXASPIM_SOMA_BUCKET", &mut cfg.soma_bucket),
            ("EXASPIM_SOMA_NAMESPACE", &mut cfg.soma_namespace),
        ];
        for (key, slot) in strings {
            if let Some(v) = lookup(key) {
                *slot = v;
            }
        }

        if let Some(v) = lookup("EXASPIM_LEVELS") {
            cfg.levels = parse_number("EXASPIM_LEVELS", &v)?;
        }
        if let Some(v) = lookup("EXASPIM_MIN_PLAUSIBLE_EXTENT") {
            cfg.min_plausible_extent = parse_number("EXASPIM_MIN_PLAUSIBLE_EXTENT", &v)?;
        }

        cfg.endpoint = cfg.endpoint.trim_end_matches('/').to_string();
        Ok(cfg)
    }

    /// Keyword used to filter top-level image directories.
    pub fn image_keyword_for(&self, brain_id: &str) -> String {
        format!("{}_{}", self.image_keyword, brain_id)
    }

    /// Names of the resolution-level subdirectories.
    pub fn level_names(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.levels).map(|l| l.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().replace('_', "").parse::<T>().map_err(|_| Error::Config {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("EXASPIM_S3_ENDPOINT", "http://localhost:9000/"),
            ("EXASPIM_MIN_PLAUSIBLE_EXTENT", "30_000"),
        ]
        .into_iter()
        .collect();

        let cfg = Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.endpoint, "http://localhost:9000");
        assert_eq!(cfg.min_plausible_extent, 30_000);
        assert_eq!(cfg.image_bucket, IMAGE_BUCKET);
        assert_eq!(cfg.levels, 8);
    }

    #[test]
    fn malformed_number_is_config_error() {
        let err = Config::from_lookup(|k| (k == "EXASPIM_LEVELS").then(|| "eight".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config { ref key, .. } if key == "EXASPIM_LEVELS"));
    }

    #[test]
    fn level_names_cover_pyramid() {
        let names: Vec<String> = Config::default().level_names().collect();
        assert_eq!(names.first().map(String::as_str), Some("0"));
        assert_eq!(names.last().map(String::as_str), Some("7"));
        assert_eq!(names.len(), 8);
    }
}
