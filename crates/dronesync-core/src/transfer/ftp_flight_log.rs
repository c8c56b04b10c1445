// ── Flight logs over the link's file transfer channel ──
//
// Same contract as the HTTP delegate, for devices that only expose their
// storage through a file transfer backend.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::task::TransferTask;
use super::{TransferDelegate, TransferEvent, TransferId, TransferReporter, TransferStatus};
use crate::error::CoreError;

/// A file stored on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub path: String,
}

/// Device file access used by [`FtpFlightLogDelegate`].
pub trait FileTransferBackend: Clone + Send + Sync + 'static {
    fn list(&self, remote_dir: &str) -> impl Future<Output = Result<Vec<RemoteFile>, CoreError>> + Send;

    fn fetch(
        &self,
        file: &RemoteFile,
        destination: &Path,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn remove(&self, file: &RemoteFile) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Downloads and deletes every file of a remote directory.
pub struct FtpFlightLogDelegate<B: FileTransferBackend> {
    backend: B,
    remote_dir: String,
    device_uid: String,
    reporter: TransferReporter,
    task: TransferTask,
}

impl<B: FileTransferBackend> FtpFlightLogDelegate<B> {
    pub fn new(
        backend: B,
        remote_dir: impl Into<String>,
        device_uid: impl Into<String>,
        reporter: TransferReporter,
    ) -> Self {
        Self {
            backend,
            remote_dir: remote_dir.into(),
            device_uid: device_uid.into(),
            reporter,
            task: TransferTask::default(),
        }
    }
}

impl<B: FileTransferBackend> TransferDelegate for FtpFlightLogDelegate<B> {
    fn configure(&mut self) {
        debug!(remote_dir = %self.remote_dir, "flight log download over file transfer");
    }

    fn reset(&mut self) {
        self.task.reset();
    }

    fn start_transfer(&mut self, target: &Path) -> bool {
        let backend = self.backend.clone();
        let remote_dir = self.remote_dir.clone();
        let device_uid = self.device_uid.clone();
        let reporter = self.reporter.clone();
        let work_dir = target.to_path_buf();
        self.task.spawn(move |cancel, transfer| async move {
            let reporter = reporter.for_transfer(transfer);
            let job = Job {
                backend: &backend,
                remote_dir: &remote_dir,
                device_uid: &device_uid,
                work_dir: &work_dir,
                reporter: &reporter,
            };
            let status = job.run(&cancel).await;
            reporter.report(TransferEvent::Finished(status));
        })
    }

    fn cancel(&mut self) {
        self.task.cancel();
    }

    fn is_current(&self, transfer: TransferId) -> bool {
        self.task.is_current(transfer)
    }
}

struct Job<'a, B> {
    backend: &'a B,
    remote_dir: &'a str,
    device_uid: &'a str,
    work_dir: &'a Path,
    reporter: &'a TransferReporter,
}

impl<B: FileTransferBackend> Job<'_, B> {
    async fn run(&self, cancel: &CancellationToken) -> TransferStatus {
        tokio::select! {
            biased;
            () = cancel.cancelled() => TransferStatus::Interrupted,
            status = self.download_all() => status,
        }
    }

    async fn download_all(&self) -> TransferStatus {
        if let Err(e) = tokio::fs::create_dir_all(self.work_dir).await {
            warn!(dir = %self.work_dir.display(), error = %e, "cannot create flight log directory");
            return TransferStatus::Interrupted;
        }
        let files = match self.backend.list(self.remote_dir).await {
            Ok(files) => files,
            Err(e) => {
                warn!(remote_dir = self.remote_dir, error = %e, "cannot list remote flight logs");
                return TransferStatus::Interrupted;
            }
        };

        let mut completed = 0u32;
        for file in &files {
            let destination = self.work_dir.join(format!("{}_{}", self.device_uid, file.name));
            if let Err(e) = self.backend.fetch(file, &destination).await {
                warn!(path = %file.path, error = %e, "remote flight log download failed");
                continue;
            }
            if let Err(e) = self.backend.remove(file).await {
                warn!(path = %file.path, error = %e, "remote flight log deletion failed");
            }
            completed += 1;
            self.reporter.report(TransferEvent::Progress { completed });
        }
        info!(completed, total = files.len(), "remote flight log download finished");
        TransferStatus::Success
    }
}

// ── LocalDirectoryBackend ───────────────────────────────────────────

/// Backend over a directory mirroring the device storage (mounted media,
/// simulator output).
#[derive(Debug, Clone)]
pub struct LocalDirectoryBackend {
    root: PathBuf,
}

impl LocalDirectoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, remote: &str) -> PathBuf {
        self.root.join(remote.trim_start_matches('/'))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CoreError {
    CoreError::transfer(format!("{}: {source}", path.display()))
}

impl FileTransferBackend for LocalDirectoryBackend {
    async fn list(&self, remote_dir: &str) -> Result<Vec<RemoteFile>, CoreError> {
        let dir = self.resolve(remote_dir);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| io_error(&entry.path(), e))?
                .is_file();
            if !is_file {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = format!("{}/{name}", remote_dir.trim_end_matches('/'));
            files.push(RemoteFile { name, path });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn fetch(&self, file: &RemoteFile, destination: &Path) -> Result<(), CoreError> {
        let source = self.resolve(&file.path);
        tokio::fs::copy(&source, destination)
            .await
            .map(|_| ())
            .map_err(|e| io_error(&source, e))
    }

    async fn remove(&self, file: &RemoteFile) -> Result<(), CoreError> {
        let source = self.resolve(&file.path);
        tokio::fs::remove_file(&source)
            .await
            .map_err(|e| io_error(&source, e))
    }
}
