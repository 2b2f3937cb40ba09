//! ID generator port for opaque identifiers.

/// Generates unique opaque identifiers (demo bearer tokens, cassette names).
///
/// Task ids are not drawn from here: repositories assign those from their own
/// monotonic counter.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
