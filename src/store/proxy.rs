use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::codec::{decode_document, decode_value};
use super::github::{error_for_status, WriteResponse};
use super::{DocumentStore, Loaded, Revision, StoreError, StoreLocation};
use crate::model::DataFile;

/// Talks to a small server that holds the GitHub token and forwards
/// reads and writes to the Contents API.
///
/// `GET {base}/api/github/read?owner&repo&path&ref` returns the decoded
/// file; `POST {base}/api/github/save` writes it.
#[derive(Clone)]
pub struct ProxyStore {
    client: reqwest::Client,
    base_url: Url,
    location: StoreLocation,
}

#[derive(Deserialize)]
struct ReadResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    meta: Option<ReadMeta>,
    /// File text as stored
    raw: Option<String>,
    /// Same content, parsed by the proxy
    json: Option<serde_json::Value>,
}

fn default_ok() -> bool {
    true
}

#[derive(Deserialize)]
struct ReadMeta {
    sha: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest<'a> {
    owner: &'a str,
    repo: &'a str,
    branch: &'a str,
    path: &'a str,
    message: &'a str,
    data: &'a DataFile,
    prev_sha: &'a str,
}

impl ProxyStore {
    pub fn new(base_url: &str, location: StoreLocation) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("invalid proxy_url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "proxy_url '{}' cannot be a base URL",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("coasterbook"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            location,
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "github", name]);
        }
        url
    }
}

impl DocumentStore for ProxyStore {
    async fn load(&self) -> Result<Loaded, StoreError> {
        let mut url = self.endpoint("read");
        url.query_pairs_mut()
            .append_pair("owner", &self.location.owner)
            .append_pair("repo", &self.location.repo)
            .append_pair("path", &self.location.path)
            .append_pair("ref", &self.location.branch);
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let read: ReadResponse = response.json().await?;
        if !read.ok {
            return Err(StoreError::transport(None, "proxy reported a failed read"));
        }
        let revision = read
            .meta
            .map(|m| Revision::new(m.sha))
            .ok_or_else(|| StoreError::Format("proxy response carried no sha".to_string()))?;

        let document = match (read.raw, read.json) {
            (Some(raw), _) => decode_document(&raw)?,
            (None, Some(json)) => decode_value(json)?,
            (None, None) => {
                return Err(StoreError::Format(
                    "proxy response carried no content".to_string(),
                ))
            }
        };
        Ok(Loaded { document, revision })
    }

    async fn save(
        &self,
        document: &DataFile,
        previous: &Revision,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let url = self.endpoint("save");
        let body = SaveRequest {
            owner: &self.location.owner,
            repo: &self.location.repo,
            branch: &self.location.branch,
            path: &self.location.path,
            message,
            data: document,
            prev_sha: previous.as_str(),
        };
        log::debug!("POST {} (based on {})", url, previous);

        let response = self.client.post(url).json(&body).send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict {
                expected: previous.as_str().to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let written: WriteResponse = response.json().await?;
        let revision = written.into_revision()?;
        log::info!("saved {} via proxy at {}", self.location, revision);
        Ok(revision)
    }

    fn describe(&self) -> String {
        format!("proxy:{} -> {}", self.base_url, self.location)
    }
}
