//! Live adapters for real external interactions.

pub mod filesystem;
pub mod system;
pub mod transport;

pub use filesystem::LiveFileSystem;
pub use system::{LiveClock, LiveIdGenerator};
pub use transport::LiveTransport;
