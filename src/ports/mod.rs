//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the client core and something
//! it does not own (time, identifiers, local storage, the network, the task
//! backend, the account backend). Implementations live in `src/adapters/`.

pub mod accounts;
pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod tasks;
pub mod transport;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Boxed future returned by async port methods, keeping the traits
/// dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub use accounts::AccountService;
pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use tasks::{HealthStatus, TaskRepository};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
