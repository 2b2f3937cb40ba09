//! Application context bundling the ports and the selected backend.
//!
//! This is the one place where demo and remote mode are told apart. Every
//! consumer receives the repository and account service as trait objects.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::adapters::demo::{DemoAccounts, DemoSnapshot, InMemoryTaskRepository};
use crate::adapters::live::{LiveClock, LiveFileSystem, LiveIdGenerator, LiveTransport};
use crate::adapters::memory::{MemoryFileSystem, SequentialIdGenerator};
use crate::adapters::recording::RecordingTransport;
use crate::adapters::remote::{RemoteAccounts, RemoteTaskRepository};
use crate::adapters::replaying::ReplayingTransport;
use crate::cassette::CassetteRecorder;
use crate::config::{Config, Mode};
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::events::ObservedTaskRepository;
use crate::gateway::Gateway;
use crate::ports::{AccountService, Clock, FileSystem, HttpTransport, IdGenerator};
use crate::session::{SessionCell, SessionStore};

enum Backend {
    Demo {
        tasks: Arc<InMemoryTaskRepository>,
        accounts: Arc<DemoAccounts>,
        state_path: Option<PathBuf>,
    },
    Remote { gateway: Arc<Gateway> },
}

/// Ports and backend for one process.
pub struct AppContext {
    /// Source of "now" and "today".
    pub clock: Arc<dyn Clock>,
    /// Local storage for session and demo state.
    pub fs: Arc<dyn FileSystem>,
    /// The shared session slot.
    pub session: Arc<SessionCell>,
    tasks: Arc<ObservedTaskRepository>,
    accounts: Arc<dyn AccountService>,
    backend: Backend,
    /// Optional cassette recorder; written to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl AppContext {
    /// Wires the context described by `config`.
    ///
    /// In demo mode a previously saved dataset is restored from the state
    /// directory. In remote mode the transport is live, recording, or
    /// replaying depending on `TASKDECK_RECORD`/`TASKDECK_REPLAY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a cassette
    /// cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(LiveClock);
        let fs: Arc<dyn FileSystem> = Arc::new(LiveFileSystem);
        let session = Arc::new(SessionCell::persisted(Arc::clone(&fs), config.session_path()));

        match &config.mode {
            Mode::Demo => {
                let mut ctx = Self::demo(clock, fs, session, Arc::new(LiveIdGenerator));
                ctx.attach_demo_state(config.demo_state_path());
                info!("using demo backend");
                Ok(ctx)
            }
            Mode::Remote { base_url } => {
                let mut recorder = None;
                let transport: Arc<dyn HttpTransport> = if let Some(path) = &config.replay {
                    info!(cassette = %path.display(), "replaying HTTP exchanges");
                    Arc::new(ReplayingTransport::from_file(path)?)
                } else {
                    let live: Arc<dyn HttpTransport> =
                        Arc::new(LiveTransport::new(config.timeout)?);
                    match &config.record {
                        Some(path) => {
                            info!(cassette = %path.display(), "recording HTTP exchanges");
                            let rec = Arc::new(Mutex::new(CassetteRecorder::new(
                                path,
                                "taskdeck-session",
                                base_url.as_str(),
                            )));
                            recorder = Some(Arc::clone(&rec));
                            Arc::new(RecordingTransport::new(live, rec))
                        }
                        None => live,
                    }
                };
                let mut ctx = Self::remote_with(base_url, transport, clock, fs, session);
                ctx.recorder = recorder;
                info!(%base_url, "using remote backend");
                Ok(ctx)
            }
        }
    }

    /// A demo context that keeps nothing on disk.
    #[must_use]
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::demo(
            clock,
            Arc::new(MemoryFileSystem::new()),
            Arc::new(SessionCell::in_memory()),
            Arc::new(SequentialIdGenerator::new()),
        )
    }

    /// A remote context over `transport` with an in-memory session.
    pub fn remote(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::remote_with(
            base_url,
            transport,
            clock,
            Arc::new(MemoryFileSystem::new()),
            Arc::new(SessionCell::in_memory()),
        )
    }

    fn demo(
        clock: Arc<dyn Clock>,
        fs: Arc<dyn FileSystem>,
        session: Arc<SessionCell>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let repo = Arc::new(InMemoryTaskRepository::seeded(Arc::clone(&clock)));
        let accounts = Arc::new(DemoAccounts::seeded(ids, Arc::clone(&session)));
        Self {
            clock,
            fs,
            session,
            tasks: Arc::new(ObservedTaskRepository::new(repo.clone())),
            accounts: accounts.clone(),
            backend: Backend::Demo { tasks: repo, accounts, state_path: None },
            recorder: None,
        }
    }

    fn remote_with(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        fs: Arc<dyn FileSystem>,
        session: Arc<SessionCell>,
    ) -> Self {
        let gateway = Arc::new(Gateway::new(transport, Arc::clone(&session), base_url));
        let repo = Arc::new(RemoteTaskRepository::new(Arc::clone(&gateway)));
        Self {
            clock,
            fs,
            session,
            tasks: Arc::new(ObservedTaskRepository::new(repo)),
            accounts: Arc::new(RemoteAccounts::new(Arc::clone(&gateway))),
            backend: Backend::Remote { gateway },
            recorder: None,
        }
    }

    /// Restores the demo dataset from `path` if it exists and saves back to
    /// it from then on. An unreadable file is logged and the seed is kept.
    fn attach_demo_state(&mut self, path: PathBuf) {
        let Backend::Demo { tasks, accounts, state_path } = &mut self.backend else {
            return;
        };
        if self.fs.exists(&path) {
            let parsed = self
                .fs
                .read_to_string(&path)
                .and_then(|raw| serde_json::from_str::<DemoSnapshot>(&raw).map_err(Into::into));
            match parsed {
                Ok(snapshot) => {
                    tasks.restore(snapshot.tasks, snapshot.next_id);
                    accounts.restore(snapshot.users);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "ignoring unreadable demo state")
                }
            }
        }
        *state_path = Some(path);
    }

    /// The task repository, with change notifications.
    #[must_use]
    pub fn tasks(&self) -> &Arc<ObservedTaskRepository> {
        &self.tasks
    }

    /// The account backend.
    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.accounts
    }

    /// A session store over this context's session and accounts.
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(Arc::clone(&self.session), Arc::clone(&self.accounts))
    }

    /// A dashboard over this context's repository.
    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.tasks.clone(), Arc::clone(&self.clock))
    }

    /// `true` when backed by the demo dataset.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        matches!(self.backend, Backend::Demo { .. })
    }

    /// Base URL of the remote backend, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        match &self.backend {
            Backend::Remote { gateway } => Some(gateway.base_url()),
            Backend::Demo { .. } => None,
        }
    }

    /// Returns the demo dataset to its seed. No-op in remote mode.
    pub fn reset_demo(&self) {
        if let Backend::Demo { tasks, .. } = &self.backend {
            tasks.reset();
            info!("demo dataset reset");
        }
    }

    /// Writes the demo dataset to the state directory, when one is attached.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be written.
    pub fn save_demo_state(&self) -> Result<()> {
        let Backend::Demo { tasks, accounts, state_path: Some(path) } = &self.backend else {
            return Ok(());
        };
        let (tasks, next_id) = tasks.snapshot();
        let snapshot = DemoSnapshot { tasks, next_id, users: accounts.snapshot() };
        self.fs.write(path, &serde_json::to_string_pretty(&snapshot)?)
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            let recorder = recorder.lock().unwrap_or_else(PoisonError::into_inner);
            match recorder.save() {
                Ok(path) => {
                    info!(path = %path.display(), exchanges = recorder.len(), "cassette written")
                }
                Err(err) => warn!(error = %err, "failed to write cassette"),
            }
        }
    }
}
