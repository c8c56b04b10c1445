// ── Component set ──
//
// Synchronous dispatcher owning every controller of one device. It is
// the single place where lifecycle hooks, routed commands, intents and
// transfer reports meet, so controllers are never invoked concurrently.

use std::sync::Arc;

use dronesync_api::{DroneClient, ProtocolCommand, TransportConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::command::{Intent, RejectReason, RequestOutcome};
use crate::config::{FlightLogTransport, SessionConfig};
use crate::controller::{CommandRouter, ComponentController, Environment, LinkState, Peripheral, PeripheralController};
use crate::error::CoreError;
use crate::model::PeripheralKind;
use crate::peripheral::{
    AntiflickerPeripheral, BatteryGaugeUpdaterPeripheral, BeeperPeripheral,
    CertificateUploaderPeripheral, CopterMotorsPeripheral, FlightLogDownloaderPeripheral,
    LogControlPeripheral, MagnetometerPeripheral, SystemInfoPeripheral,
};
use crate::sink::CommandSink;
use crate::store::{DeviceStore, PeripheralStore, StoredModel};
use crate::transfer::{
    FtpFlightLogDelegate, HttpCertificateDelegate, HttpFlightLogDelegate, LocalDirectoryBackend,
    TransferReport, TransferReporter,
};

/// Connection manager notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "allowed")]
pub enum LinkEvent {
    WillConnect,
    DidConnect,
    DidDisconnect,
    /// The device is being removed; persisted data is dropped.
    Forget,
    /// User consent for data synchronization (flight logs and such).
    DataSyncConsent(bool),
}

pub struct ComponentSet {
    controllers: Vec<Box<dyn ComponentController>>,
    router: CommandRouter,
    link: LinkState,
    consent: bool,
    sink: Arc<dyn CommandSink>,
    device_store: Arc<dyn DeviceStore>,
    peripherals: Arc<PeripheralStore>,
    report_tx: mpsc::UnboundedSender<TransferReport>,
    report_rx: Option<mpsc::UnboundedReceiver<TransferReport>>,
}

impl ComponentSet {
    /// Empty set. Data sync consent defaults to granted.
    pub fn new(sink: Arc<dyn CommandSink>, device_store: Arc<dyn DeviceStore>) -> Self {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        Self {
            controllers: Vec::new(),
            router: CommandRouter::new(),
            link: LinkState::default(),
            consent: true,
            sink,
            device_store,
            peripherals: Arc::new(PeripheralStore::new()),
            report_tx,
            report_rx: Some(report_rx),
        }
    }

    /// Every drone peripheral, with HTTP transfer delegates.
    pub fn drone(
        config: &SessionConfig,
        sink: Arc<dyn CommandSink>,
        device_store: Arc<dyn DeviceStore>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let mut set = Self::new(sink, device_store);
        set.add(BeeperPeripheral);
        set.add(CopterMotorsPeripheral);
        set.add(MagnetometerPeripheral::default());
        set.add(BatteryGaugeUpdaterPeripheral);
        set.add(AntiflickerPeripheral::new(config.offline_settings));
        set.add(LogControlPeripheral);
        set.add(SystemInfoPeripheral::new(
            config.offline_settings,
            config.firmware_blacklist.iter().cloned(),
        ));

        let needs_http = config.certificate_upload
            || config
                .flight_logs
                .as_ref()
                .is_some_and(|logs| logs.transport == FlightLogTransport::Http);
        let client = if needs_http {
            let transport = TransportConfig {
                timeout: config.http_timeout,
                ..TransportConfig::default()
            };
            Some(DroneClient::new(config.drone_url.clone(), &transport)?)
        } else {
            None
        };

        if let (true, Some(client)) = (config.certificate_upload, &client) {
            let reporter = set.reporter(PeripheralKind::CertificateUploader);
            set.add(CertificateUploaderPeripheral::new(HttpCertificateDelegate::new(
                client.clone(),
                reporter,
            )));
        }

        if let Some(logs) = &config.flight_logs {
            let reporter = set.reporter(PeripheralKind::FlightLogDownloader);
            match (&logs.transport, &client) {
                (FlightLogTransport::Http, Some(client)) => {
                    let delegate = HttpFlightLogDelegate::new(client.clone(), &config.device_uid, reporter);
                    set.add(FlightLogDownloaderPeripheral::new(delegate, &logs.work_dir));
                }
                (FlightLogTransport::Ftp { mirror_root, remote_dir }, _) => {
                    let backend = LocalDirectoryBackend::new(mirror_root);
                    let delegate =
                        FtpFlightLogDelegate::new(backend, remote_dir.as_str(), &config.device_uid, reporter);
                    set.add(FlightLogDownloaderPeripheral::new(delegate, &logs.work_dir));
                }
                (FlightLogTransport::Http, None) => {}
            }
        }

        info!(
            device = %config.device_uid,
            controllers = set.controllers.len(),
            "component set assembled"
        );
        Ok(set)
    }

    // ── Assembly ─────────────────────────────────────────────────────

    /// Reporter whose events reach the controller of `kind`.
    pub fn reporter(&self, kind: PeripheralKind) -> TransferReporter {
        TransferReporter::new(kind, self.report_tx.clone())
    }

    /// Add a peripheral publishing into this set's store.
    pub fn add<P: Peripheral>(&mut self, peripheral: P)
    where
        P::Model: StoredModel,
    {
        let controller = PeripheralController::in_store(peripheral, &self.peripherals);
        self.add_controller(Box::new(controller));
    }

    pub fn add_controller(&mut self, mut controller: Box<dyn ComponentController>) {
        if self.controller_index(controller.kind()).is_some() {
            warn!(kind = %controller.kind(), "duplicate controller ignored");
            return;
        }
        let index = self.controllers.len();
        self.router.register(index, controller.features());
        let env = Environment {
            link: self.link,
            sink: &*self.sink,
            store: &*self.device_store,
        };
        controller.attach(&env);
        self.controllers.push(controller);
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn peripherals(&self) -> &Arc<PeripheralStore> {
        &self.peripherals
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn kinds(&self) -> Vec<PeripheralKind> {
        self.controllers.iter().map(|c| c.kind()).collect()
    }

    /// Report receiver, handed once to the session processor.
    pub fn take_report_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<TransferReport>> {
        self.report_rx.take()
    }

    fn controller_index(&self, kind: PeripheralKind) -> Option<usize> {
        self.controllers.iter().position(|c| c.kind() == kind)
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut dyn ComponentController, &Environment<'_>)) {
        let env = Environment {
            link: self.link,
            sink: &*self.sink,
            store: &*self.device_store,
        };
        for controller in &mut self.controllers {
            f(controller.as_mut(), &env);
        }
    }

    fn with_controller<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn ComponentController, &Environment<'_>) -> R,
    ) -> Option<R> {
        let env = Environment {
            link: self.link,
            sink: &*self.sink,
            store: &*self.device_store,
        };
        let controller = self.controllers.get_mut(index)?;
        Some(f(controller.as_mut(), &env))
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn handle_link(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::WillConnect => {
                debug!("device will connect");
                self.for_each(|c, env| c.will_connect(env));
            }
            LinkEvent::DidConnect => {
                if self.link.connected {
                    trace!("already connected");
                    return;
                }
                self.link = LinkState {
                    connected: true,
                    data_sync_allowed: self.consent,
                };
                info!("device connected");
                self.for_each(|c, env| c.did_connect(env));
            }
            LinkEvent::DidDisconnect => self.disconnect(),
            LinkEvent::Forget => {
                self.disconnect();
                info!("forgetting device");
                self.for_each(|c, env| c.will_forget(env));
                self.device_store.clear();
            }
            LinkEvent::DataSyncConsent(consent) => {
                self.consent = consent;
                let allowed = self.link.connected && consent;
                if allowed == self.link.data_sync_allowed {
                    return;
                }
                self.link.data_sync_allowed = allowed;
                debug!(allowed, "data sync allowance changed");
                self.for_each(|c, env| c.data_sync_allowance_changed(env, allowed));
            }
        }
    }

    fn disconnect(&mut self) {
        if !self.link.connected {
            return;
        }
        self.link = LinkState::default();
        info!("device disconnected");
        self.for_each(|c, env| c.did_disconnect(env));
    }

    // ── Commands, intents, reports ───────────────────────────────────

    /// Dispatch an inbound command to every interested controller.
    pub fn route(&mut self, command: &ProtocolCommand) {
        let targets = self.router.targets(command.feature).to_vec();
        if targets.is_empty() {
            trace!(feature = %command.feature, id = command.id, "no controller for feature");
            return;
        }
        for index in targets {
            self.with_controller(index, |c, env| c.did_receive_command(env, command));
        }
    }

    pub fn execute(&mut self, intent: Intent) -> RequestOutcome {
        let kind = intent.target();
        let Some(index) = self.controller_index(kind) else {
            debug!(%kind, "no controller for intent");
            return RejectReason::NoController.into();
        };
        let outcome = self
            .with_controller(index, |c, env| c.handle_intent(env, intent))
            .unwrap_or(RequestOutcome::Rejected(RejectReason::NoController));
        debug!(%kind, %outcome, "intent handled");
        outcome
    }

    pub fn handle_report(&mut self, report: TransferReport) {
        let Some(index) = self.controller_index(report.kind) else {
            trace!(kind = %report.kind, "transfer report without controller");
            return;
        };
        self.with_controller(index, |c, env| c.on_transfer_event(env, report.transfer, report.event));
    }

    /// Apply every transfer report queued so far. For synchronous drivers
    /// that own the report receiver themselves.
    pub fn drain_reports(&mut self) -> usize {
        let Some(mut rx) = self.report_rx.take() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(report) = rx.try_recv() {
            self.handle_report(report);
            handled += 1;
        }
        self.report_rx = Some(rx);
        handled
    }
}
