//! `gitlab issue <id>`

use async_trait::async_trait;
use tracing::debug;

use crate::commands::context::{CommandContext, CommandHandler};
use crate::commands::resolver::split_head;
use crate::error::{CommandError, CommandResult, UpstreamError};

pub struct GitlabIssueHandler;

#[async_trait]
impl CommandHandler for GitlabIssueHandler {
    async fn handle(&self, args: &str, ctx: &CommandContext) -> CommandResult {
        // Words after the id are ignored.
        let (id, _) = split_head(args.trim_start());
        let issue_id: u64 = id
            .trim_end()
            .parse()
            .map_err(|_| CommandError::InvalidArgument)?;

        let config = &ctx.bot.config;
        if config.gitlab.api_key.is_empty() {
            return Err(CommandError::MissingKey("gitlab"));
        }
        let Some(project) = config.gitlab_project_for(ctx.principal.channel_name()) else {
            return Err(CommandError::Rejected("Invalid gitlab project".into()));
        };
        debug!(
            namespace = %project.namespace,
            project = %project.project,
            issue_id,
            "Loading GitLab issue"
        );

        let not_found = |e: UpstreamError| match e {
            UpstreamError::NotFound => CommandError::Rejected("This issue does not exist".into()),
            other => CommandError::upstream("gitlab", other),
        };

        let gitlab = &ctx.bot.gitlab;
        let project_id = gitlab
            .project_id(&project.namespace, &project.project)
            .await
            .map_err(not_found)?;
        let issue = gitlab.issue(project_id, issue_id).await.map_err(not_found)?;

        Ok(format!(
            "Issue #{issue_id} (par {}, {}): {} => {}",
            issue.author.name, issue.state, issue.title, issue.web_url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handlers::test_support::{StubGitlab, bot_with, config, in_channel};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_issue_summary() {
        let bot = bot_with(config(), Arc::default(), Arc::default());
        let reply = GitlabIssueHandler
            .handle("42", &in_channel(&bot, "ada"))
            .await
            .unwrap();
        assert_eq!(reply, "Issue #42 (par Ada, opened): T => http://x/42");
    }

    #[tokio::test]
    async fn test_non_numeric_id() {
        let gitlab = Arc::new(StubGitlab::default());
        let bot = bot_with(config(), Arc::default(), gitlab.clone());
        let err = GitlabIssueHandler
            .handle("abc", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.reply(), "Invalid argument.");

        let err = GitlabIssueHandler
            .handle("42abc", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.reply(), "Invalid argument.");
        assert_eq!(gitlab.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_trailing_words_after_id() {
        let bot = bot_with(config(), Arc::default(), Arc::default());
        let reply = GitlabIssueHandler
            .handle("42 please", &in_channel(&bot, "ada"))
            .await
            .unwrap();
        assert_eq!(reply, "Issue #42 (par Ada, opened): T => http://x/42");
    }

    #[tokio::test]
    async fn test_missing_issue_and_upstream_failure() {
        let bot = bot_with(config(), Arc::default(), Arc::default());
        let ctx = in_channel(&bot, "ada");
        let err = GitlabIssueHandler.handle("1", &ctx).await.unwrap_err();
        assert_eq!(err.reply(), "This issue does not exist");

        let err = GitlabIssueHandler.handle("500", &ctx).await.unwrap_err();
        assert_eq!(err.reply(), "Unable to reach gitlab.");
    }

    #[tokio::test]
    async fn test_no_project_configured() {
        let mut cfg = config();
        for channel in &mut cfg.irc.channels {
            channel.gitlab = None;
        }
        let bot = bot_with(cfg, Arc::default(), Arc::default());
        let err = GitlabIssueHandler
            .handle("42", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.reply(), "Invalid gitlab project");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let mut cfg = config();
        cfg.gitlab.api_key.clear();
        let bot = bot_with(cfg, Arc::default(), Arc::default());
        let err = GitlabIssueHandler
            .handle("42", &in_channel(&bot, "ada"))
            .await
            .unwrap_err();
        assert_eq!(err.reply(), "Key gitlab doesn't exist !");
    }
}
