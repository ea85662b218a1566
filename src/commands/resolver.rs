//! Command resolver.
//!
//! Walks the command tree head-first. Each level reads one token (up to the
//! next ASCII space), skips the run of spaces after it and either stops at a
//! leaf or recurses into a branch with the remaining input. Nothing here
//! allocates or mutates the table, so resolution is pure.

use super::table::{CommandNode, NodeKind};

/// What the resolver found for an input line.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'t, 'i> {
    /// A leaf matched; `args` is the unconsumed remainder.
    Found {
        node: &'t CommandNode,
        args: &'i str,
    },
    /// A branch matched but none of its children did. `rest` is the input
    /// just after the branch token, so the unknown subcommand stays visible.
    UnknownSubcommand {
        branch: &'t CommandNode,
        rest: &'i str,
    },
    /// Nothing matched at the root.
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub struct Resolution<'t, 'i> {
    pub outcome: Outcome<'t, 'i>,
    /// Deepest branch traversed on the way to the outcome, when there is one.
    pub parent: Option<&'t CommandNode>,
}

impl Resolution<'_, '_> {
    fn unknown() -> Self {
        Self {
            outcome: Outcome::Unknown,
            parent: None,
        }
    }
}

/// Split off the head token; only ASCII space separates tokens.
pub fn split_head(input: &str) -> (&str, &str) {
    match input.find(' ') {
        Some(pos) => (&input[..pos], input[pos..].trim_start_matches(' ')),
        None => (input, ""),
    }
}

/// Resolve `input` (sigil already stripped) against `table`.
pub fn resolve<'t, 'i>(table: &'t [CommandNode], input: &'i str) -> Resolution<'t, 'i> {
    let (head, rest) = split_head(input);

    for node in table {
        if node.name != head {
            continue;
        }

        match &node.kind {
            NodeKind::Placeholder => continue,
            NodeKind::Leaf(_) => {
                return Resolution {
                    outcome: Outcome::Found { node, args: rest },
                    parent: None,
                };
            }
            NodeKind::Branch(children) => {
                let sub = resolve(children, rest);
                return match sub.outcome {
                    Outcome::Unknown => Resolution {
                        outcome: Outcome::UnknownSubcommand { branch: node, rest },
                        parent: None,
                    },
                    Outcome::Found { .. } | Outcome::UnknownSubcommand { .. } => Resolution {
                        outcome: sub.outcome,
                        parent: Some(sub.parent.unwrap_or(node)),
                    },
                };
            }
        }
    }

    Resolution::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::{CommandContext, CommandHandler};
    use crate::error::CommandResult;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn handle(&self, _args: &str, _ctx: &CommandContext) -> CommandResult {
            Ok(String::new())
        }
    }

    fn table() -> Vec<CommandNode> {
        vec![
            CommandNode::leaf("weather", "Usage: .weather <ville>", Noop),
            CommandNode::branch(
                "gitlab",
                "Usage: .gitlab <issue>",
                vec![
                    CommandNode::leaf("issue", "Usage: .gitlab issue <issue_id>", Noop),
                    CommandNode::branch(
                        "mr",
                        "Usage: .gitlab mr <show>",
                        vec![CommandNode::leaf("show", "show", Noop)],
                    ),
                ],
            ),
            CommandNode::placeholder("vdm", "placeholder"),
            CommandNode::leaf("vdm", "Usage: .vdm", Noop),
            CommandNode::placeholder("soon", "not yet"),
        ]
    }

    fn found<'t, 'i>(res: &Resolution<'t, 'i>) -> (&'static str, &'i str) {
        match res.outcome {
            Outcome::Found { node, args } => (node.name, args),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    fn unknown_sub(res: &Resolution<'_, '_>) -> &'static str {
        match res.outcome {
            Outcome::UnknownSubcommand { branch, .. } => branch.name,
            other => panic!("expected UnknownSubcommand, got {other:?}"),
        }
    }

    #[test]
    fn test_leaf_with_args() {
        let t = table();
        let res = resolve(&t, "weather Paris");
        assert_eq!(found(&res), ("weather", "Paris"));
        assert!(res.parent.is_none());
    }

    #[test]
    fn test_args_keep_inner_spaces() {
        let t = table();
        let res = resolve(&t, "weather   Le  Mans ");
        assert_eq!(found(&res), ("weather", "Le  Mans "));
    }

    #[test]
    fn test_trailing_spaces_give_empty_args() {
        let t = table();
        let res = resolve(&t, "weather    ");
        assert_eq!(found(&res), ("weather", ""));
    }

    #[test]
    fn test_only_ascii_space_separates() {
        let t = table();
        assert!(matches!(resolve(&t, "weather\tParis").outcome, Outcome::Unknown));
    }

    #[test]
    fn test_match_is_exact_and_case_sensitive() {
        let t = table();
        assert!(matches!(resolve(&t, "weathe").outcome, Outcome::Unknown));
        assert!(matches!(resolve(&t, "weathers").outcome, Outcome::Unknown));
        assert!(matches!(resolve(&t, "Weather").outcome, Outcome::Unknown));
    }

    #[test]
    fn test_branch_leaf() {
        let t = table();
        let res = resolve(&t, "gitlab  issue 42");
        assert_eq!(found(&res), ("issue", "42"));
        assert_eq!(res.parent.map(|p| p.name), Some("gitlab"));
    }

    #[test]
    fn test_nested_branch_reports_deepest_parent() {
        let t = table();
        let res = resolve(&t, "gitlab mr show 7");
        assert_eq!(found(&res), ("show", "7"));
        assert_eq!(res.parent.map(|p| p.name), Some("mr"));
    }

    #[test]
    fn test_branch_without_subcommand() {
        let t = table();
        let res = resolve(&t, "gitlab");
        assert_eq!(unknown_sub(&res), "gitlab");
        assert!(res.parent.is_none());
    }

    #[test]
    fn test_unknown_subcommand_keeps_rest_visible() {
        let t = table();
        let res = resolve(&t, "gitlab   nope 1");
        match res.outcome {
            Outcome::UnknownSubcommand { branch, rest } => {
                assert_eq!(branch.name, "gitlab");
                assert_eq!(rest, "nope 1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nested_unknown_subcommand_propagates() {
        let t = table();
        let res = resolve(&t, "gitlab mr nope");
        assert_eq!(unknown_sub(&res), "mr");
        assert_eq!(res.parent.map(|p| p.name), Some("gitlab"));
    }

    #[test]
    fn test_placeholder_rows_are_skipped() {
        let t = table();
        assert_eq!(found(&resolve(&t, "vdm")), ("vdm", ""));
        assert!(matches!(resolve(&t, "soon").outcome, Outcome::Unknown));
    }

    #[test]
    fn test_empty_and_unknown_input() {
        let t = table();
        assert!(matches!(resolve(&t, "").outcome, Outcome::Unknown));
        assert!(matches!(resolve(&t, "unknown x y").outcome, Outcome::Unknown));
        assert!(resolve(&t, "unknown").parent.is_none());
    }

    #[test]
    fn test_residual_is_input_minus_matched_tokens() {
        let t = table();
        let cases = [
            ("weather Paris", 1),
            ("weather  a b  c", 1),
            ("gitlab issue   42 extra", 2),
            ("gitlab   mr  show x", 3),
        ];
        for (input, tokens) in cases {
            let Outcome::Found { args, .. } = resolve(&t, input).outcome else {
                panic!("expected Found for {input:?}");
            };
            let mut rest = input;
            for _ in 0..tokens {
                rest = split_head(rest).1;
            }
            assert_eq!(args, rest, "input {input:?}");
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let t = table();
        for input in ["weather x", "gitlab", "gitlab issue 1", "nope", ""] {
            let a = format!("{:?}", resolve(&t, input).outcome);
            let b = format!("{:?}", resolve(&t, input).outcome);
            assert_eq!(a, b);
        }
    }
}
