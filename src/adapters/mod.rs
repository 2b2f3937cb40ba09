//! Port implementations.
//!
//! `live` talks to the real world, `memory` is deterministic and in-process,
//! `demo` and `remote` are the two task/account backends, and
//! `recording`/`replaying` wrap the HTTP transport with cassettes.

pub mod demo;
pub mod live;
pub mod memory;
pub mod recording;
pub mod remote;
pub mod replaying;
