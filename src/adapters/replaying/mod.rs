//! Replaying adapters that replay recorded interactions.

pub mod transport;

pub use transport::ReplayingTransport;
