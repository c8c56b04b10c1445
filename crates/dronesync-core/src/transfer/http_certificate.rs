// ── Certificate upload over the drone REST API ──

use std::path::Path;

use dronesync_api::DroneClient;
use tracing::{debug, warn};

use super::task::TransferTask;
use super::{TransferDelegate, TransferEvent, TransferId, TransferReporter, TransferStatus};

/// Uploads one certificate file per transfer with `PUT`.
pub struct HttpCertificateDelegate {
    client: DroneClient,
    reporter: TransferReporter,
    task: TransferTask,
}

impl HttpCertificateDelegate {
    pub fn new(client: DroneClient, reporter: TransferReporter) -> Self {
        Self {
            client,
            reporter,
            task: TransferTask::default(),
        }
    }
}

impl TransferDelegate for HttpCertificateDelegate {
    fn configure(&mut self) {}

    fn reset(&mut self) {
        self.task.reset();
    }

    fn start_transfer(&mut self, target: &Path) -> bool {
        if self.task.is_active() {
            // one upload at a time; a second request is not a restart
            return false;
        }
        let client = self.client.clone();
        let reporter = self.reporter.clone();
        let certificate = target.to_path_buf();
        self.task.spawn(move |cancel, transfer| async move {
            let reporter = reporter.for_transfer(transfer);
            let status = tokio::select! {
                biased;
                () = cancel.cancelled() => TransferStatus::Interrupted,
                result = client.upload_certificate(&certificate) => match result {
                    Ok(()) => {
                        debug!(path = %certificate.display(), "certificate uploaded");
                        TransferStatus::Success
                    }
                    Err(e) => {
                        warn!(path = %certificate.display(), error = %e, "certificate upload failed");
                        TransferStatus::Failed
                    }
                },
            };
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
