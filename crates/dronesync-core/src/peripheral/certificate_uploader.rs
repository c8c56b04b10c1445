// ── Certificate uploader ──

use std::path::Path;

use tracing::{debug, trace};

use crate::command::{CertificateIntent, Intent, RejectReason, RequestOutcome};
use crate::controller::{Context, Peripheral};
use crate::model::{CertificateUploader, PeripheralKind, UploadState};
use crate::transfer::{TransferDelegate, TransferEvent, TransferId, TransferStatus};

/// User-initiated certificate uploads through a transfer delegate.
pub struct CertificateUploaderPeripheral<D: TransferDelegate> {
    delegate: D,
}

impl<D: TransferDelegate> CertificateUploaderPeripheral<D> {
    pub fn new(delegate: D) -> Self {
        Self { delegate }
    }

    fn upload(&mut self, cx: &mut Context<'_, CertificateUploader>, path: &Path) -> RequestOutcome {
        if !cx.is_connected() {
            return RejectReason::NotConnected.into();
        }
        if cx.model().state == Some(UploadState::Uploading) {
            return RejectReason::AlreadyInProgress.into();
        }
        if !self.delegate.start_transfer(path) {
            return RejectReason::InvalidState.into();
        }
        debug!(path = %path.display(), "certificate upload started");
        cx.set(|m| &mut m.state, Some(UploadState::Uploading));
        RequestOutcome::Sent
    }
}

impl<D: TransferDelegate> Peripheral for CertificateUploaderPeripheral<D> {
    type Model = CertificateUploader;
    type Event = std::convert::Infallible;
    type Intent = CertificateIntent;

    const KIND: PeripheralKind = PeripheralKind::CertificateUploader;

    fn intent(intent: Intent) -> Option<CertificateIntent> {
        match intent {
            Intent::CertificateUploader(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_intent(
        &mut self,
        cx: &mut Context<'_, CertificateUploader>,
        intent: CertificateIntent,
    ) -> RequestOutcome {
        match intent {
            CertificateIntent::Upload { path } => self.upload(cx, &path),
            CertificateIntent::Cancel => {
                if cx.model().state != Some(UploadState::Uploading) {
                    return RejectReason::InvalidState.into();
                }
                self.delegate.cancel();
                RequestOutcome::Sent
            }
        }
    }

    fn on_connect(&mut self, _cx: &mut Context<'_, CertificateUploader>) {
        self.delegate.configure();
    }

    fn on_disconnect(&mut self, cx: &mut Context<'_, CertificateUploader>) {
        self.delegate.reset();
        cx.reset_model();
    }

    fn on_transfer_event(
        &mut self,
        cx: &mut Context<'_, CertificateUploader>,
        transfer: TransferId,
        event: TransferEvent,
    ) {
        if !self.delegate.is_current(transfer) {
            trace!(?transfer, ?event, "report of a superseded upload ignored");
            return;
        }
        if cx.model().state != Some(UploadState::Uploading) {
            trace!(?event, "no upload running, report ignored");
            return;
        }
        if let TransferEvent::Finished(status) = event {
            let state = match status {
                TransferStatus::Success => UploadState::Success,
                TransferStatus::Interrupted | TransferStatus::Failed => UploadState::Failed,
            };
            cx.set(|m| &mut m.state, Some(state));
        }
    }
}
