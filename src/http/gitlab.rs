//! Minimal GitLab REST client: project lookup and issue fetch.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::UpstreamError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueAuthor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub author: IssueAuthor,
    pub state: String,
    pub title: String,
    pub web_url: String,
}

#[derive(Deserialize)]
struct Project {
    id: u64,
}

#[async_trait]
pub trait GitlabApi: Send + Sync {
    /// Resolve `namespace/project` to its numeric id.
    async fn project_id(&self, namespace: &str, project: &str) -> Result<u64, UpstreamError>;

    /// Fetch an issue by its project-scoped id.
    async fn issue(&self, project_id: u64, issue_id: u64) -> Result<Issue, UpstreamError>;
}

pub struct GitlabClient {
    client: reqwest::Client,
    base: String,
    api_key: String,
}

impl GitlabClient {
    pub fn new(uri: &str, api_key: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base: format!("{}/api/v4", uri.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    /// API URL for `segments`, each one percent-encoded as a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url =
            Url::parse(&self.base).map_err(|e| UpstreamError::Url(format!("{}: {e}", self.base)))?;
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Url(self.base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        debug!(url = %url, "GitLab GET");
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GitlabApi for GitlabClient {
    async fn project_id(&self, namespace: &str, project: &str) -> Result<u64, UpstreamError> {
        let path = format!("{namespace}/{project}");
        let project: Project = self.get(self.endpoint(&["projects", &path])?).await?;
        Ok(project.id)
    }

    async fn issue(&self, project_id: u64, issue_id: u64) -> Result<Issue, UpstreamError> {
        let project_id = project_id.to_string();
        let issue_id = issue_id.to_string();
        self.get(self.endpoint(&["projects", &project_id, "issues", &issue_id])?)
            .await
    }
}
