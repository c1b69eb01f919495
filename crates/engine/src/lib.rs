//! The MindMate chat pipeline.
//!
//! Three pieces, applied in order per incoming message:
//! - [`PromptComposer`] turns stored history plus the new message into
//!   one prompt string.
//! - The inference backend (a `CompletionClient`) turns the prompt into
//!   raw text.
//! - [`Refiner`] turns raw text into a bounded, de-duplicated reply,
//!   optionally with a contextual tail line.
//!
//! [`ChatEngine`] wires them together and owns the fail-soft policy: an
//! inference failure becomes an apology reply and the exchange is still
//! persisted, so the chat channel stays up while the model is down.

pub mod chat;
pub mod composer;
pub mod refiner;

pub use chat::{ChatEngine, ChatReply};
pub use composer::PromptComposer;
pub use refiner::{Refiner, TailRule};
