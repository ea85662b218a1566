//! HTTP/JSON collaborators used by the integration commands.
//!
//! Both are traits so handlers can be exercised against stubs.

mod gitlab;
mod json;

pub use gitlab::{GitlabApi, GitlabClient, Issue, IssueAuthor};
pub use json::{HttpJsonFetcher, JsonFetcher, json_f64, json_str};
