//! Recording adapters that capture interactions to cassettes.

pub mod transport;

pub use transport::RecordingTransport;
