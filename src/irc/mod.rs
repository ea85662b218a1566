//! IRC wire layer: line codec over the `irc-proto` message model, and the
//! transport stream.

mod codec;
mod stream;

pub use codec::{CodecError, IrcCodec, MAX_LINE_LEN};
pub use irc_proto::{Command, Message, Prefix, Response};
pub use stream::{BotStream, connect};
