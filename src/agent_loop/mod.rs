//! Bounded agent loop primitives (collaborators, conversation, events, runner).

pub mod collaborators;
pub mod conversation;
pub mod events;
pub mod format;
pub mod runner;
pub mod types;

pub use collaborators::*;
pub use conversation::*;
pub use events::{LoopEvent, LoopEventPayload, LoopEventSink};
pub use format::*;
pub use runner::*;
pub use types::*;
