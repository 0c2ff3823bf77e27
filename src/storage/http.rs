use super::{ListPage, ObjectStore};
use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

/// Anonymous S3 REST client (path-style addressing, unsigned requests).
pub struct HttpObjectStore {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketResult {
    #[serde(default)]
    is_truncated: bool,
    #[serde(default)]
    next_continuation_token: Option<String>,
    #[serde(default)]
    contents: Vec<ContentsEntry>,
    #[serde(default)]
    common_prefixes: Vec<CommonPrefix>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentsEntry {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CommonPrefix {
    prefix: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.endpoint.clone())
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn bucket_url(&self, bucket: &str) -> Result<Url> {
        self.object_url(bucket, "")
    }

    /// Path-style URL with each key segment percent-encoded.
    fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        let bad_endpoint = || Error::Config {
            key: "EXASPIM_S3_ENDPOINT".to_string(),
            value: self.endpoint.clone(),
        };
        let mut url = Url::parse(&self.endpoint).map_err(|_| bad_endpoint())?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| bad_endpoint())?;
            segments.pop_if_empty().push(bucket);
            let key = key.trim_start_matches('/');
            if !key.is_empty() {
                segments.extend(key.split('/'));
            }
        }
        Ok(url)
    }
}

impl ObjectStore for HttpObjectStore {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        token: Option<&str>,
    ) -> Result<ListPage> {
        let url = self.bucket_url(bucket)?;
        let mut query: Vec<(&str, &str)> = vec![
            ("list-type", "2"),
            ("prefix", prefix),
            ("delimiter", delimiter),
        ];
        if let Some(t) = token {
            query.push(("continuation-token", t));
        }

        tracing::debug!(bucket, prefix, continued = token.is_some(), "ListObjectsV2");
        let resp = self.client.get(url.clone()).query(&query).send()?;
        if !resp.status().is_success() {
            return Err(Error::Http {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text()?;
        parse_list_response(&body)
    }

    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.object_url(bucket, key)?;
        tracing::debug!(bucket, key, "GetObject");
        let resp = self.client.get(url.clone()).send()?;
        match resp.status().as_u16() {
            404 => Err(Error::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ if resp.status().is_success() => Ok(resp.bytes()?.to_vec()),
            status => Err(Error::Http {
                status,
                url: url.to_string(),
            }),
        }
    }
}

fn parse_list_response(body: &str) -> Result<ListPage> {
    let parsed: ListBucketResult = quick_xml::de::from_str(body)?;
    let next_token = if parsed.is_truncated {
        parsed.next_continuation_token
    } else {
        None
    };
    Ok(ListPage {
        keys: parsed.contents.into_iter().map(|c| c.key).collect(),
        common_prefixes: parsed.common_prefixes.into_iter().map(|p| p.prefix).collect(),
        next_token,
    })
}
