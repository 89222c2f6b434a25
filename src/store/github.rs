use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use spdlog::debug;

use crate::config::Github;
use crate::store::{ContentStore, Result, StoreError, StoredFile};

const USER_AGENT: &str = concat!("blogdrop/", env!("CARGO_PKG_VERSION"));

/// Contents API of a single GitHub repository
pub struct GithubStore {
    client: Client,
    api_url: Url,
    owner: String,
    repo: String,
    branch: Option<String>,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

impl GithubStore {
    pub fn new(config: &Github, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| StoreError::Config(format!("Invalid GitHub token: {}", e)))?;
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", header::HeaderValue::from_static("2022-11-28"));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let api_url = Url::parse(&config.api_url)
            .map_err(|e| StoreError::Config(format!("Invalid api_url {}: {}", config.api_url, e)))?;

        Ok(Self {
            client,
            api_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> Result<Url> {
        // Url would collapse these, so the file written would not be the one asked for
        if path.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(StoreError::InvalidPath(path.to_string()));
        }

        let mut url = self.api_url.clone();
        {
            let mut segments = url.path_segments_mut()
                .map_err(|_| StoreError::Config(format!("api_url cannot be a base: {}", self.api_url)))?;
            segments.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    async fn get_contents(&self, path: &str) -> Result<ContentsResponse> {
        let url = self.contents_url(path)?;
        let mut request = self.client.get(url);
        if let Some(ref branch) = self.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(path, response).await);
        }

        Ok(response.json().await?)
    }

    async fn error_from(path: &str, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => StoreError::Conflict {
                path: path.to_string(),
                message,
            },
            _ => StoreError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn decode_content(path: &str, body: ContentsResponse) -> Result<StoredFile> {
    let encoded = match (body.content, body.encoding.as_deref()) {
        (Some(content), Some("base64")) => content,
        (_, encoding) => {
            return Err(StoreError::InvalidResponse(format!(
                "Unsupported content encoding for {}: {}", path, encoding.unwrap_or("none"))));
        }
    };

    // GitHub wraps base64 payloads at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = base64::engine::general_purpose::STANDARD.decode(compact)?;
    let content = String::from_utf8(raw)
        .map_err(|e| StoreError::InvalidResponse(format!("{} is not UTF-8: {}", path, e)))?;

    Ok(StoredFile {
        path: path.to_string(),
        content,
        sha: body.sha,
    })
}

#[async_trait]
impl ContentStore for GithubStore {
    async fn fetch(&self, path: &str) -> Result<StoredFile> {
        let body = self.get_contents(path).await?;
        debug!("Fetched {} at {}", path, body.sha);
        decode_content(path, body)
    }

    /// Files over 1 MB come back without content, which is enough to know they exist
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.get_contents(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn put(&self, path: &str, content: &str, message: &str, sha: Option<&str>) -> Result<()> {
        let url = self.contents_url(path)?;
        let body = PutContentsRequest {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(content),
            sha,
            branch: self.branch.as_deref(),
        };

        let response = self.client.put(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(path, response).await);
        }

        debug!("Committed {}: {}", path, message);
        Ok(())
    }
}
