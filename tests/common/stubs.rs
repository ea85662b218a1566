//! HTTP collaborators that never leave the process.

use async_trait::async_trait;
use serde_json::{Value, json};
use slircbot::error::UpstreamError;
use slircbot::http::{GitlabApi, Issue, IssueAuthor, JsonFetcher};

pub struct StubJson;

#[async_trait]
impl JsonFetcher for StubJson {
    async fn get_json(&self, _url: &str) -> Result<Value, UpstreamError> {
        Ok(json!({
            "joke": "knock knock",
            "value": { "joke": "Chuck Norris can divide by zero." },
            "data": [{ "text": "carpe diem" }]
        }))
    }
}

pub struct StubGitlab;

#[async_trait]
impl GitlabApi for StubGitlab {
    async fn project_id(&self, _namespace: &str, _project: &str) -> Result<u64, UpstreamError> {
        Ok(7)
    }

    async fn issue(&self, _project_id: u64, issue_id: u64) -> Result<Issue, UpstreamError> {
        if issue_id != 42 {
            return Err(UpstreamError::NotFound);
        }
        Ok(Issue {
            author: IssueAuthor { name: "Ada".into() },
            state: "opened".into(),
            title: "T".into(),
            web_url: "http://x/42".into(),
        })
    }
}
