// ── Persistent device store ──
//
// Best-effort key/value storage for identifiers learned from the device
// (serial, board id, versions). Writes are fire-and-forget: failures are
// logged, never returned to the controller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Key/value storage scoped to one device.
pub trait DeviceStore: Send + Sync {
    /// Store `value` under `key`, committing immediately.
    fn write(&self, key: &str, value: serde_json::Value);

    fn read(&self, key: &str) -> Option<serde_json::Value>;

    /// Drop everything stored for the device.
    fn clear(&self);

    /// `true` when nothing has ever been stored for the device.
    fn is_new(&self) -> bool;
}

// ── MemoryDeviceStore ───────────────────────────────────────────────

/// Volatile store, for tests and sessions without persistence.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn write(&self, key: &str, value: serde_json::Value) {
        self.entries.insert(key.to_owned(), value);
    }

    fn read(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn is_new(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── FileDeviceStore ─────────────────────────────────────────────────

/// JSON file store, one file per device.
///
/// The whole map is rewritten (temp file + rename) on every write. Inside
/// a tokio runtime the file I/O runs on the blocking pool; a commit older
/// than the one already on disk is skipped. Await [`FileDeviceStore::sync`]
/// before relying on the file content.
#[derive(Debug)]
pub struct FileDeviceStore {
    path: PathBuf,
    entries: DashMap<String, serde_json::Value>,
    pending: Mutex<Pending>,
    /// Generation of the last commit applied to disk.
    committed: Arc<Mutex<u64>>,
}

#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    handles: Vec<JoinHandle<()>>,
}

enum Commit {
    Write(String),
    Remove,
}

impl Commit {
    fn apply(&self, path: &Path) -> std::io::Result<()> {
        match self {
            Self::Write(content) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let tmp = path.with_extension("json.tmp");
                std::fs::write(&tmp, content)?;
                std::fs::rename(&tmp, path)
            }
            Self::Remove => match std::fs::remove_file(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                result => result,
            },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FileDeviceStore {
    /// Open the store at `path`, loading existing content if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let entries = DashMap::new();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let map: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;
                for (key, value) in map {
                    entries.insert(key, value);
                }
                debug!(path = %path.display(), entries = entries.len(), "loaded device store");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CoreError::Store {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
        Ok(Self {
            path,
            entries,
            pending: Mutex::default(),
            committed: Arc::default(),
        })
    }

    /// Store file for `device_uid` under `dir`.
    pub fn for_device(dir: &Path, device_uid: &str) -> Result<Self, CoreError> {
        Self::open(dir.join(format!("{device_uid}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait until every commit issued so far has reached the disk.
    pub async fn sync(&self) {
        let handles = std::mem::take(&mut lock(&self.pending).handles);
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(path = %self.path.display(), error = %e, "device store commit aborted");
            }
        }
    }

    fn snapshot(&self) -> Result<String, serde_json::Error> {
        let map: BTreeMap<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        serde_json::to_string_pretty(&map)
    }

    /// Apply `make()` to the file, off the async workers when a runtime is
    /// available.
    fn commit(&self, make: impl FnOnce() -> Option<Commit>) {
        let mut pending = lock(&self.pending);
        let Some(commit) = make() else {
            return;
        };
        pending.generation += 1;
        let generation = pending.generation;
        let path = self.path.clone();
        let committed = Arc::clone(&self.committed);
        let job = move || {
            let mut last = lock(&committed);
            if *last > generation {
                return;
            }
            *last = generation;
            if let Err(e) = commit.apply(&path) {
                warn!(path = %path.display(), error = %e, "device store commit failed");
            }
        };
        match Handle::try_current() {
            Ok(runtime) => {
                pending.handles.retain(|handle| !handle.is_finished());
                pending.handles.push(runtime.spawn_blocking(job));
            }
            Err(_) => job(),
        }
    }
}

impl DeviceStore for FileDeviceStore {
    fn write(&self, key: &str, value: serde_json::Value) {
        self.entries.insert(key.to_owned(), value);
        self.commit(|| match self.snapshot() {
            Ok(content) => Some(Commit::Write(content)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "device store encoding failed");
                None
            }
        });
    }

    fn read(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn clear(&self) {
        self.entries.clear();
        self.commit(|| Some(Commit::Remove));
    }

    fn is_new(&self) -> bool {
        self.entries.is_empty()
    }
}
