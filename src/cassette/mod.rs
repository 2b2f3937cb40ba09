//! Cassette format for recording and replaying HTTP exchanges.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{path_of, Cassette, Exchange};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;
