//! Hot-reloadable address to location lookup service.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{LocationDataset, MaxMindDataset, ResolverError};
use crate::models::{GeoPoint, LocationRecord};

/// Default delay between a file change and the reload it triggers.
pub const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Resolver tuning.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// How long to let a multi-step file write settle before reopening
    pub debounce: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_RELOAD_DEBOUNCE,
        }
    }
}

struct ResolverState<D> {
    dataset: Option<D>,
    dataset_path: Option<PathBuf>,
    stop: Option<CancellationToken>,
    ready: bool,
}

impl<D> Default for ResolverState<D> {
    fn default() -> Self {
        Self {
            dataset: None,
            dataset_path: None,
            stop: None,
            ready: false,
        }
    }
}

/// Maps addresses to [`LocationRecord`]s through a location dataset.
///
/// All state lives behind a single reader/writer lock. Lookups share the read
/// lock; a hot reload holds the write lock for the whole reopen and swap, so
/// a lookup sees either the old dataset or the new one, never a gap.
///
/// Lifecycle: [`init`](Self::init) once, [`close`](Self::close) to tear
/// down. Closing makes the resolver initializable again.
pub struct LocationResolver<D: LocationDataset = MaxMindDataset> {
    state: Arc<RwLock<ResolverState<D>>>,
    // Only touched under the state write lock; kept apart because the
    // platform watcher is not guaranteed to be Sync
    watcher: Mutex<Option<RecommendedWatcher>>,
    options: ResolverOptions,
}

impl<D: LocationDataset> Default for LocationResolver<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: LocationDataset> LocationResolver<D> {
    pub fn new() -> Self {
        Self::with_options(ResolverOptions::default())
    }

    pub fn with_options(options: ResolverOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(ResolverState::default())),
            watcher: Mutex::new(None),
            options,
        }
    }

    /// Open the dataset at `path` and optionally watch it for changes.
    ///
    /// A second call while the resolver is ready does nothing. Watching
    /// subscribes to the dataset's directory and needs a tokio runtime to run
    /// the reload task on. On error the resolver stays uninitialized.
    pub fn init(&self, path: impl AsRef<Path>, enable_watch: bool) -> Result<(), ResolverError> {
        let path = path.as_ref();
        let mut state = self.state.write();

        if state.ready {
            debug!(
                path = %path.display(),
                "location resolver already initialized, ignoring init"
            );
            return Ok(());
        }

        let dataset = D::open(path)?;

        if enable_watch {
            let (watcher, stop) = self.spawn_watch(path)?;
            *self.watcher.lock() = Some(watcher);
            state.stop = Some(stop);
        }

        state.dataset = Some(dataset);
        state.dataset_path = Some(path.to_path_buf());
        state.ready = true;

        info!(
            path = %path.display(),
            watch = enable_watch,
            "location dataset loaded"
        );

        Ok(())
    }

    fn spawn_watch(
        &self,
        path: &Path,
    ) -> Result<(RecommendedWatcher, CancellationToken), ResolverError> {
        let runtime = Handle::try_current().map_err(|_| ResolverError::NoRuntime)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| ResolverError::InvalidPath(path.to_path_buf()))?
            .to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(e) => {
                    let _ = error_tx.send(e);
                }
            },
            notify::Config::default(),
        )
        .map_err(|source| ResolverError::Watch {
            path: dir.clone(),
            source,
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| ResolverError::Watch {
                path: dir.clone(),
                source,
            })?;

        let stop = CancellationToken::new();
        let task = ReloadTask {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            file_name,
            debounce: self.options.debounce,
            stop: stop.clone(),
        };
        runtime.spawn(task.run(event_rx, error_rx));

        debug!(dir = %dir.display(), "watching dataset directory");

        Ok((watcher, stop))
    }

    /// Resolve an address.
    ///
    /// `None` when the resolver is not ready, the address does not parse, or
    /// the dataset has no record for it.
    pub fn lookup(&self, address: &str) -> Option<LocationRecord> {
        let state = self.state.read();
        if !state.ready {
            return None;
        }

        let ip: IpAddr = match address.trim().parse() {
            Ok(ip) => ip,
            Err(_) => {
                debug!(address, "unparseable address");
                return None;
            }
        };

        let entry = state.dataset.as_ref()?.lookup(ip)?;

        Some(LocationRecord {
            country_code: entry.country_iso_code,
            is_eu: entry.is_eu_member,
            region: entry.region_name,
            city: entry.city_name,
            point: GeoPoint::new(entry.latitude, entry.longitude),
            source_address: address.to_string(),
        })
    }

    /// Like [`lookup`](Self::lookup) but falls back to an empty record,
    /// which is never valid.
    pub fn must_lookup(&self, address: &str) -> LocationRecord {
        self.lookup(address).unwrap_or_default()
    }

    pub fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    /// Path of the dataset currently in service.
    pub fn dataset_path(&self) -> Option<PathBuf> {
        self.state.read().dataset_path.clone()
    }

    /// Stop watching, release the dataset and return to the uninitialized
    /// state. The reload task exits at its next wait.
    pub fn close(&self) {
        let mut state = self.state.write();

        if let Some(stop) = state.stop.take() {
            stop.cancel();
        }
        self.watcher.lock().take();
        state.dataset = None;

        if state.ready {
            info!(
                path = ?state.dataset_path,
                "location resolver closed"
            );
        }
        state.dataset_path = None;
        state.ready = false;
    }
}

impl<D: LocationDataset> Drop for LocationResolver<D> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Background reload loop bound to one dataset file.
struct ReloadTask<D> {
    state: Arc<RwLock<ResolverState<D>>>,
    path: PathBuf,
    file_name: OsString,
    debounce: Duration,
    stop: CancellationToken,
}

impl<D: LocationDataset> ReloadTask<D> {
    async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<Event>,
        mut errors: mpsc::UnboundedReceiver<notify::Error>,
    ) {
        loop {
            tokio::select! {
                _ = self.stop.cancelled() => {
                    debug!(path = %self.path.display(), "dataset watch stopped");
                    return;
                }
                Some(event) = events.recv() => {
                    if !self.is_dataset_write(&event) {
                        continue;
                    }

                    tokio::select! {
                        _ = self.stop.cancelled() => return,
                        _ = tokio::time::sleep(self.debounce) => {}
                    }

                    // One reload covers the whole burst
                    while events.try_recv().is_ok() {}

                    // Reopening reads the whole file; keep it off the runtime threads
                    let state = Arc::clone(&self.state);
                    let stop = self.stop.clone();
                    let path = self.path.clone();
                    let reload =
                        tokio::task::spawn_blocking(move || Self::reload(&state, &stop, &path));
                    if let Err(e) = reload.await {
                        warn!(path = %self.path.display(), error = %e, "dataset reload task failed");
                    }
                }
                Some(err) = errors.recv() => {
                    warn!(path = %self.path.display(), error = %err, "dataset watch error");
                }
            }
        }
    }

    fn is_dataset_write(&self, event: &Event) -> bool {
        let relevant = match event.kind {
            EventKind::Create(_) => true,
            EventKind::Modify(ModifyKind::Metadata(_)) => false,
            EventKind::Modify(_) => true,
            _ => false,
        };

        relevant
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
    }

    /// Reopens the dataset under the write lock, so lookups wait for the swap
    /// instead of seeing a missing dataset. Blocking.
    fn reload(state: &RwLock<ResolverState<D>>, stop: &CancellationToken, path: &Path) {
        let mut state = state.write();

        if stop.is_cancelled() || !state.ready {
            return;
        }

        match D::open(path) {
            Ok(dataset) => {
                // Previous handle is released while the write lock is still held
                drop(state.dataset.replace(dataset));
                info!(path = %path.display(), "location dataset reloaded");
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to reload location dataset, keeping previous"
                );
            }
        }
    }
}
