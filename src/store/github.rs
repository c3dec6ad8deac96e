use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::codec::{decode_base64, decode_document, encode_base64, encode_document};
use super::{DocumentStore, Loaded, Revision, StoreError, StoreLocation};
use crate::model::DataFile;

const API_VERSION: &str = "2022-11-28";

/// Reads and writes the data file through the GitHub Contents API.
#[derive(Clone)]
pub struct GitHubStore {
    client: reqwest::Client,
    api_url: Url,
    location: StoreLocation,
    token: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    sha: &'a str,
}

#[derive(Deserialize)]
struct ShaRef {
    sha: String,
}

/// Both the proxy and the Contents API answer a write with this shape.
#[derive(Deserialize)]
pub(crate) struct WriteResponse {
    content: Option<ShaRef>,
    commit: Option<ShaRef>,
}

impl WriteResponse {
    /// New revision: the blob sha, or the commit sha if the blob is missing
    pub(crate) fn into_revision(self) -> Result<Revision, StoreError> {
        self.content
            .or(self.commit)
            .map(|r| Revision::new(r.sha))
            .ok_or_else(|| StoreError::Format("write response carried no sha".to_string()))
    }
}

impl GitHubStore {
    pub fn new(
        api_url: &str,
        location: StoreLocation,
        token: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| StoreError::Config(format!("invalid api_url '{}': {}", api_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static("coasterbook"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            location,
            token: token.into(),
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with each segment escaped
    fn contents_url(&self) -> Result<Url, StoreError> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::Config(format!("api_url '{}' cannot be a base URL", self.api_url))
            })?;
            segments
                .pop_if_empty()
                .extend([
                    "repos",
                    self.location.owner.as_str(),
                    self.location.repo.as_str(),
                    "contents",
                ])
                .extend(self.location.path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }
}

/// Turn a non-success response into a transport error carrying the body.
pub(crate) async fn error_for_status(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    StoreError::transport(Some(status), message)
}

impl DocumentStore for GitHubStore {
    async fn load(&self) -> Result<Loaded, StoreError> {
        let mut url = self.contents_url()?;
        url.query_pairs_mut().append_pair("ref", &self.location.branch);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let contents: ContentsResponse = response.json().await?;
        let text = decode_base64(&contents.content)?;
        let document = decode_document(&text)?;
        Ok(Loaded {
            document,
            revision: Revision::new(contents.sha),
        })
    }

    async fn save(
        &self,
        document: &DataFile,
        previous: &Revision,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let url = self.contents_url()?;
        let body = PutRequest {
            message,
            content: encode_base64(&encode_document(document)?),
            branch: &self.location.branch,
            sha: previous.as_str(),
        };
        log::debug!("PUT {} (based on {})", url, previous);

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

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
        log::info!("saved {} at {}", self.location, revision);
        Ok(revision)
    }

    fn describe(&self) -> String {
        format!("github:{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str) -> StoreLocation {
        StoreLocation {
            owner: "me".into(),
            repo: "coasterbook-data".into(),
            branch: "main".into(),
            path: path.into(),
        }
    }

    #[test]
    fn test_contents_url() {
        let store = GitHubStore::new("https://api.github.com", location("data.json"), "t").unwrap();
        assert_eq!(
            store.contents_url().unwrap().as_str(),
            "https://api.github.com/repos/me/coasterbook-data/contents/data.json"
        );
    }

    #[test]
    fn test_contents_url_nested_path_and_escaping() {
        let store = GitHubStore::new(
            "http://127.0.0.1:9000/",
            location("books/my rides.json"),
            "t",
        )
        .unwrap();
        assert_eq!(
            store.contents_url().unwrap().as_str(),
            "http://127.0.0.1:9000/repos/me/coasterbook-data/contents/books/my%20rides.json"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let result = GitHubStore::new("not a url", location("data.json"), "t");
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_write_response_prefers_content_sha() {
        let both: WriteResponse =
            serde_json::from_str(r#"{"content":{"sha":"blob"},"commit":{"sha":"commit"}}"#)
                .unwrap();
        assert_eq!(both.into_revision().unwrap().as_str(), "blob");

        let commit_only: WriteResponse =
            serde_json::from_str(r#"{"content":null,"commit":{"sha":"commit"}}"#).unwrap();
        assert_eq!(commit_only.into_revision().unwrap().as_str(), "commit");

        let neither: WriteResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(neither.into_revision(), Err(StoreError::Format(_))));
    }
}
