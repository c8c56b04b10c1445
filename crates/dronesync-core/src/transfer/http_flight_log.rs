// ── Flight logs over the drone REST API ──

use std::path::{Path, PathBuf};

use dronesync_api::DroneClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::task::TransferTask;
use super::{TransferDelegate, TransferEvent, TransferId, TransferReporter, TransferStatus};

/// Downloads flight log records over HTTP, deleting each from the drone
/// once stored locally.
///
/// Records land in `<work_dir>/<device_uid>_<name>`. A failed record is
/// logged and skipped; the transfer goes on with the next one.
pub struct HttpFlightLogDelegate {
    client: DroneClient,
    device_uid: String,
    reporter: TransferReporter,
    task: TransferTask,
}

impl HttpFlightLogDelegate {
    pub fn new(client: DroneClient, device_uid: impl Into<String>, reporter: TransferReporter) -> Self {
        Self {
            client,
            device_uid: device_uid.into(),
            reporter,
            task: TransferTask::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_active()
    }
}

impl TransferDelegate for HttpFlightLogDelegate {
    fn configure(&mut self) {
        debug!(base_url = %self.client.base_url(), "flight log download over http");
    }

    fn reset(&mut self) {
        self.task.reset();
    }

    fn start_transfer(&mut self, target: &Path) -> bool {
        let client = self.client.clone();
        let device_uid = self.device_uid.clone();
        let reporter = self.reporter.clone();
        let work_dir = target.to_path_buf();
        self.task.spawn(move |cancel, transfer| async move {
            let reporter = reporter.for_transfer(transfer);
            let status = run(&client, &device_uid, &work_dir, &reporter, &cancel).await;
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

async fn run(
    client: &DroneClient,
    device_uid: &str,
    work_dir: &Path,
    reporter: &TransferReporter,
    cancel: &CancellationToken,
) -> TransferStatus {
    tokio::select! {
        biased;
        () = cancel.cancelled() => TransferStatus::Interrupted,
        status = download_all(client, device_uid, work_dir, reporter) => status,
    }
}

async fn download_all(
    client: &DroneClient,
    device_uid: &str,
    work_dir: &Path,
    reporter: &TransferReporter,
) -> TransferStatus {
    if let Err(e) = tokio::fs::create_dir_all(work_dir).await {
        warn!(dir = %work_dir.display(), error = %e, "cannot create flight log directory");
        return TransferStatus::Interrupted;
    }
    let records = match client.list_flight_logs().await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "cannot list flight logs");
            return TransferStatus::Interrupted;
        }
    };

    let mut completed = 0u32;
    for record in &records {
        let destination: PathBuf = work_dir.join(format!("{device_uid}_{}", record.name));
        if let Err(e) = client.download_flight_log(record, &destination).await {
            warn!(name = %record.name, error = %e, "flight log download failed");
            continue;
        }
        if let Err(e) = client.delete_flight_log(record).await {
            warn!(name = %record.name, error = %e, "flight log deletion failed");
        }
        completed += 1;
        reporter.report(TransferEvent::Progress { completed });
    }
    info!(completed, total = records.len(), "flight log download finished");
    TransferStatus::Success
}
