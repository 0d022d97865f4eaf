#![forbid(unsafe_code)]

//! Host-independent click-to-enlarge controller.
//!
//! The controller owns a single full-viewport overlay and shows a deep copy of
//! whichever track image was clicked. It is written against the [`Dom`] trait
//! so the same state machine drives:
//! - the browser, through the `web-sys` host in `enlarge-web`, and
//! - [`MemoryDom`], a deterministic in-memory document used by tests.
//!
//! The host pushes events in ([`EnlargeController::dispatch`]); the controller
//! never blocks and never spawns.

pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod event;
pub mod memory;

pub use config::EnlargeConfig;
pub use controller::{EnlargeController, Transition};
pub use dom::Dom;
pub use error::{ConfigError, DomError, EnlargeError};
pub use event::{DomEvent, ListenerBinding, ListenerTarget, Response, LISTENER_BINDINGS};
pub use memory::{MemoryDom, NodeId};
