//! Command tree, resolver, permission gate and handlers.

pub mod context;
pub mod handlers;
pub mod permission;
pub mod resolver;
pub mod table;

pub use context::{CommandContext, CommandHandler};
pub use permission::{Permission, Principal, Source, check};
pub use resolver::{Outcome, Resolution, resolve, split_head};
pub use table::{CommandNode, CommandTable, NodeKind};
