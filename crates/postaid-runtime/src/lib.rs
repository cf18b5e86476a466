#![forbid(unsafe_code)]

//! Runtime for Post Aid front ends.
//!
//! - [`program`]: the Elm-style [`Model`]/[`Cmd`] loop and its [`Program`]
//!   driver, with background tasks reporting back over a channel.
//! - [`cancel`]: a [`CancelToken`] for abandoning background work.
//! - [`store`]: the [`RecordStore`] contract with in-memory and JSON file
//!   implementations.

pub mod cancel;
pub mod program;
pub mod store;

pub use cancel::CancelToken;
pub use program::{Cmd, MessageSender, Model, Program, ProgramConfig, TaskMode, TaskSpec};
#[cfg(feature = "file-store")]
pub use store::FileStore;
pub use store::{Listener, MemoryStore, RecordStore, StoreError, StoreResult, SubscriptionId};
