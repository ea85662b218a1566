//! IRC session: registry, event routing and the connection supervisor.

mod events;
mod router;
mod state;
mod supervisor;

pub use events::EventHandler;
pub use router::{LogRouter, Router};
pub use state::{IrcChannel, SessionState};
pub use supervisor::Supervisor;
