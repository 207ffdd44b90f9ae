use std::sync::Arc;
use std::time::Duration;

use dexcore_catalog::CatalogSource;
use dexcore_config::Settings;
use dexcore_lookup::{Debouncer, Settled};
use tokio::sync::{mpsc, watch};

use crate::coordinator::{Command, Coordinator, CoordinatorConfig, Event};
use crate::view::ViewState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRequest {
    Input(String),
    Shutdown,
}

/// Front-end side of a running [`LookupService`].
#[derive(Debug)]
pub struct ServiceHandle {
    requests: mpsc::UnboundedSender<ServiceRequest>,
    snapshots: watch::Receiver<ViewState>,
}

impl ServiceHandle {
    /// Forwards a keystroke. Returns `false` once the service has stopped.
    pub fn send_input(&self, input: impl Into<String>) -> bool {
        self.requests
            .send(ServiceRequest::Input(input.into()))
            .is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.requests.send(ServiceRequest::Shutdown);
    }

    pub fn current(&self) -> ViewState {
        self.snapshots.borrow().clone()
    }

    /// Returns the latest snapshot if it changed since the last call.
    pub fn poll_changed(&mut self) -> Option<ViewState> {
        match self.snapshots.has_changed() {
            Ok(true) => Some(self.snapshots.borrow_and_update().clone()),
            Ok(false) | Err(_) => None,
        }
    }
}

/// Drives a [`Coordinator`] on the current task: owns the debouncer, runs
/// fetches against the catalog and publishes view snapshots.
///
/// All coordinator mutation happens inside [`run`](Self::run). Fetches run as
/// spawned tasks and are never cancelled; their results re-enter the loop as
/// events.
pub struct LookupService<C> {
    coordinator: Coordinator,
    catalog: Arc<C>,
    debouncer: Debouncer<String>,
    settled_rx: mpsc::UnboundedReceiver<Settled<String>>,
    requests_rx: mpsc::UnboundedReceiver<ServiceRequest>,
    finished_tx: mpsc::UnboundedSender<Event>,
    finished_rx: mpsc::UnboundedReceiver<Event>,
    snapshot_tx: watch::Sender<ViewState>,
}

impl<C: CatalogSource + 'static> LookupService<C> {
    pub fn new(settings: &Settings, catalog: Arc<C>) -> (Self, ServiceHandle) {
        tracing::debug!(
            stale_responses = settings.stale_responses.label(),
            key_min = settings.key_min,
            key_max = settings.key_max,
            "configuring lookup service"
        );
        let coordinator = Coordinator::new(CoordinatorConfig::from_settings(settings));
        Self::with_coordinator(coordinator, settings.debounce_delay(), catalog)
    }

    pub fn with_coordinator(
        coordinator: Coordinator,
        debounce_delay: Duration,
        catalog: Arc<C>,
    ) -> (Self, ServiceHandle) {
        let (debouncer, settled_rx) = Debouncer::new(debounce_delay);
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.view());

        let service = Self {
            coordinator,
            catalog,
            debouncer,
            settled_rx,
            requests_rx,
            finished_tx,
            finished_rx,
            snapshot_tx,
        };
        let handle = ServiceHandle {
            requests: requests_tx,
            snapshots: snapshot_rx,
        };

        (service, handle)
    }

    /// Runs until [`ServiceRequest::Shutdown`] arrives or every handle is
    /// dropped. Returns the coordinator in its final state.
    pub async fn run(mut self) -> Coordinator {
        tracing::debug!(delay_ms = self.debouncer.delay().as_millis() as u64, "lookup service started");
        self.dispatch(Event::Started);

        loop {
            tokio::select! {
                request = self.requests_rx.recv() => match request {
                    Some(ServiceRequest::Input(input)) => self.dispatch(Event::InputChanged(input)),
                    Some(ServiceRequest::Shutdown) | None => break,
                },
                Some(settled) = self.settled_rx.recv() => {
                    if let Some(value) = self.debouncer.accept(settled) {
                        self.dispatch(Event::InputSettled(value));
                    }
                }
                Some(event) = self.finished_rx.recv() => self.dispatch(event),
            }
        }

        self.debouncer.cancel();
        tracing::debug!("lookup service stopped");
        self.coordinator
    }

    fn dispatch(&mut self, event: Event) {
        for command in self.coordinator.handle(event) {
            self.execute(command);
        }
        self.publish();
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Debounce(input) => {
                self.debouncer.push(input);
            }
            Command::FetchIndex => {
                let catalog = Arc::clone(&self.catalog);
                let finished = self.finished_tx.clone();
                tokio::spawn(async move {
                    let result = catalog.fetch_index().await;
                    let _ = finished.send(Event::IndexFinished(result));
                });
            }
            Command::FetchDetail { ticket, key } => {
                let catalog = Arc::clone(&self.catalog);
                let finished = self.finished_tx.clone();
                tokio::spawn(async move {
                    let result = catalog.fetch_detail(key).await;
                    let _ = finished.send(Event::DetailFinished {
                        ticket,
                        key,
                        result,
                    });
                });
            }
        }
    }

    fn publish(&self) {
        let view = self.coordinator.view();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}
