//! GitHub contents API backend.
//!
//! Uses the blocking `reqwest` client with a bounded timeout. Every request
//! carries the bearer token and targets the configured branch.

use std::fmt;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::ContentApi;
use crate::config::RemoteConfig;
use crate::error::{Error, Result};

/// Media type requested from the API.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// User agent sent with every request (GitHub rejects requests without one).
const USER_AGENT: &str = concat!("cookbook/", env!("CARGO_PKG_VERSION"));

/// Metadata returned when reading a file.
#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
}

/// Body of a create/update request.
#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Body of a delete request.
#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

/// Client for `/repos/{owner}/{repo}/contents/{path}`.
pub struct GitHubContents {
    client: Client,
    api_url: Url,
    repository: String,
    branch: String,
    token: String,
}

impl fmt::Debug for GitHubContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubContents")
            .field("api_url", &self.api_url.as_str())
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GitHubContents {
    /// Build a client from the remote configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or repository is missing, the API URL
    /// cannot carry a path, or the HTTP client cannot be constructed.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::RemoteNotConfigured("remote.token is not set".to_string()))?;
        let repository = config
            .repository
            .clone()
            .filter(|repo| !repo.is_empty())
            .ok_or_else(|| {
                Error::RemoteNotConfigured("remote.repository is not set".to_string())
            })?;

        let api_url = Url::parse(&config.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                Error::RemoteNotConfigured(format!(
                    "remote.api_url '{}' is not a base URL",
                    config.api_url
                ))
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url,
            repository,
            branch: config.branch.clone(),
            token,
        })
    }

    /// Full URL of a file in the repository.
    ///
    /// Every path segment is percent-encoded, so file names containing `#`,
    /// `?` or `%` address the file of that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL cannot carry a path.
    pub fn url(&self, path: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::internal("remote API URL cannot carry a path"))?;
            segments.pop_if_empty().push("repos");
            segments.extend(self.repository.split('/'));
            segments.push("contents");
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }

    /// Branch all requests target.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn check(operation: &'static str, path: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(Error::remote(operation, path, status.as_u16(), body))
    }
}

impl ContentApi for GitHubContents {
    fn name(&self) -> &'static str {
        "github"
    }

    fn revision(&self, path: &str) -> Result<Option<String>> {
        let url = self.url(path)?;
        trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("ref", self.branch.as_str())])
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} does not exist on branch {}", path, self.branch);
            return Ok(None);
        }

        let info: ContentInfo = Self::check("GET", path, response)?.json()?;
        Ok(Some(info.sha))
    }

    fn put(
        &self,
        path: &str,
        content_base64: &str,
        message: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        let url = self.url(path)?;
        trace!("PUT {}", url);
        let body = PutRequest {
            message,
            content: content_base64,
            branch: &self.branch,
            sha: revision,
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        Self::check("PUT", path, response)?;
        Ok(())
    }

    fn delete(&self, path: &str, message: &str, revision: &str) -> Result<()> {
        let url = self.url(path)?;
        trace!("DELETE {}", url);
        let body = DeleteRequest {
            message,
            sha: revision,
            branch: &self.branch,
        };
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        Self::check("DELETE", path, response)?;
        Ok(())
    }
}
