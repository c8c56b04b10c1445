// ── Flight log downloader ──
//
// Transport agnostic: downloads run whenever data sync is allowed, through
// whichever delegate the session was built with.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::controller::{Context, Peripheral};
use crate::model::{CompletionStatus, FlightLogDownloader, PeripheralKind};
use crate::transfer::{TransferDelegate, TransferEvent, TransferId, TransferStatus};

pub struct FlightLogDownloaderPeripheral<D: TransferDelegate> {
    delegate: D,
    work_dir: PathBuf,
}

impl<D: TransferDelegate> FlightLogDownloaderPeripheral<D> {
    pub fn new(delegate: D, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            delegate,
            work_dir: work_dir.into(),
        }
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    fn start(&mut self, cx: &mut Context<'_, FlightLogDownloader>) {
        if !self.delegate.start_transfer(&self.work_dir) {
            debug!("flight log transfer not started");
            return;
        }
        cx.update(|m| {
            let fresh = FlightLogDownloader {
                downloading: true,
                downloaded_count: if m.downloading { m.downloaded_count } else { 0 },
                completion: CompletionStatus::None,
            };
            let changed = *m != fresh;
            *m = fresh;
            changed
        });
    }
}

impl<D: TransferDelegate> Peripheral for FlightLogDownloaderPeripheral<D> {
    type Model = FlightLogDownloader;
    type Event = std::convert::Infallible;
    type Intent = std::convert::Infallible;

    const KIND: PeripheralKind = PeripheralKind::FlightLogDownloader;

    fn on_connect(&mut self, cx: &mut Context<'_, FlightLogDownloader>) {
        self.delegate.configure();
        if cx.data_sync_allowed() {
            self.start(cx);
        }
    }

    fn on_data_sync_allowance(&mut self, cx: &mut Context<'_, FlightLogDownloader>, allowed: bool) {
        if !cx.is_connected() {
            return;
        }
        if allowed {
            self.start(cx);
        } else {
            self.delegate.cancel();
        }
    }

    fn on_disconnect(&mut self, cx: &mut Context<'_, FlightLogDownloader>) {
        self.delegate.reset();
        cx.reset_model();
    }

    fn on_transfer_event(
        &mut self,
        cx: &mut Context<'_, FlightLogDownloader>,
        transfer: TransferId,
        event: TransferEvent,
    ) {
        if !self.delegate.is_current(transfer) {
            trace!(?transfer, ?event, "report of a superseded download ignored");
            return;
        }
        if !cx.model().downloading {
            trace!(?event, "no download running, report ignored");
            return;
        }
        match event {
            TransferEvent::Progress { completed } => cx.set(|m| &mut m.downloaded_count, completed),
            TransferEvent::Finished(status) => {
                let completion = match status {
                    TransferStatus::Success => CompletionStatus::Success,
                    TransferStatus::Interrupted | TransferStatus::Failed => CompletionStatus::Interrupted,
                };
                debug!(?completion, count = cx.model().downloaded_count, "flight log download ended");
                cx.update(|m| {
                    m.downloading = false;
                    m.completion = completion;
                    true
                });
            }
        }
    }
}
