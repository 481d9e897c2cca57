//! Concurrent session fabric: one actor per session, per-session event
//! fan-out, and the process-wide registry.

pub mod actor;
pub mod bus;
pub mod command;
pub mod event;
pub mod handle;
pub mod registry;

pub use bus::EventBus;
pub use command::{CommandEnvelope, CommandOutput, SessionCommand};
pub use event::{EventEnvelope, SessionEvent};
pub use handle::SessionHandle;
pub use registry::{spawn_reaper, SessionRegistry};
