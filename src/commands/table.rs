//! Static command table.
//!
//! The table is built once at startup and never mutated afterwards; the
//! resolver only ever borrows it.

use std::fmt;

use super::context::CommandHandler;
use super::handlers::{
    ChuckNorrisHandler, GitlabIssueHandler, HelpHandler, JokeHandler, ListHandler, MailHandler,
    QuoteHandler, SayHandler, StopHandler, VdmHandler, WeatherHandler,
};
use super::permission::Permission;

pub enum NodeKind {
    Leaf(Box<dyn CommandHandler>),
    Branch(Vec<CommandNode>),
    /// Reserved name with no implementation yet; never matches.
    Placeholder,
}

pub struct CommandNode {
    pub name: &'static str,
    pub help: String,
    pub min_permission: Permission,
    pub kind: NodeKind,
}

impl CommandNode {
    pub fn leaf(
        name: &'static str,
        help: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            name,
            help: help.into(),
            min_permission: Permission::User,
            kind: NodeKind::Leaf(Box::new(handler)),
        }
    }

    pub fn branch(name: &'static str, help: impl Into<String>, children: Vec<CommandNode>) -> Self {
        Self {
            name,
            help: help.into(),
            min_permission: Permission::User,
            kind: NodeKind::Branch(children),
        }
    }

    pub fn placeholder(name: &'static str, help: impl Into<String>) -> Self {
        Self {
            name,
            help: help.into(),
            min_permission: Permission::User,
            kind: NodeKind::Placeholder,
        }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.min_permission = permission;
        self
    }

    /// Child commands of a branch; empty for leaves.
    pub fn children(&self) -> &[CommandNode] {
        match &self.kind {
            NodeKind::Branch(children) => children,
            _ => &[],
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch(_))
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Leaf(_) => "leaf",
            NodeKind::Branch(_) => "branch",
            NodeKind::Placeholder => "placeholder",
        };
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("min_permission", &self.min_permission)
            .field("children", &self.children())
            .finish()
    }
}

/// Root of the command tree plus the sigil used in help texts.
#[derive(Debug)]
pub struct CommandTable {
    sigil: char,
    root: Vec<CommandNode>,
}

impl CommandTable {
    pub fn new(sigil: char, root: Vec<CommandNode>) -> Self {
        Self { sigil, root }
    }

    /// The bot's built-in command set.
    pub fn builtin(sigil: char) -> Self {
        let s = sigil;
        let gitlab = vec![CommandNode::leaf(
            "issue",
            format!("Usage: {s}gitlab issue <issue_id>"),
            GitlabIssueHandler,
        )];

        Self::new(
            sigil,
            vec![
                CommandNode::leaf("weather", format!("Usage: {s}weather <ville>"), WeatherHandler),
                CommandNode::branch("gitlab", format!("Usage: {s}gitlab <issue>"), gitlab),
                CommandNode::leaf(
                    "chuck_norris",
                    format!("Usage: {s}chuck_norris"),
                    ChuckNorrisHandler,
                ),
                CommandNode::leaf("joke", format!("Usage: {s}joke"), JokeHandler),
                CommandNode::leaf("vdm", format!("Usage: {s}vdm"), VdmHandler),
                CommandNode::leaf("quote", format!("Usage: {s}quote"), QuoteHandler),
                CommandNode::leaf("say", format!("Usage: {s}say text"), SayHandler)
                    .with_permission(Permission::Admin),
                CommandNode::leaf("help", format!("Usage: {s}help [command]"), HelpHandler),
                CommandNode::leaf("list", format!("Usage: {s}list"), ListHandler),
                CommandNode::leaf(
                    "mail",
                    format!("Usage: {s}mail <pseudo> <message>"),
                    MailHandler,
                ),
                CommandNode::leaf("stop", "Stop bot", StopHandler)
                    .with_permission(Permission::Admin),
            ],
        )
    }

    pub fn sigil(&self) -> char {
        self.sigil
    }

    pub fn root(&self) -> &[CommandNode] {
        &self.root
    }

    /// Top-level names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.root.iter().map(|node| node.name)
    }
}
