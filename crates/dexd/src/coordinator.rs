use dexcore_catalog::{CatalogError, DetailRecord, IndexEntry, LookupKey};
use dexcore_config::{Settings, StaleResponses};
use dexcore_lookup::{validate_in, KeyRange};

use crate::observer::{TracingObserver, Transition, TransitionObserver};
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    Index,
    Detail,
}

/// The single active error, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub origin: ErrorOrigin,
    pub message: String,
}

/// Inputs to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started,
    InputChanged(String),
    InputSettled(String),
    IndexFinished(Result<Vec<IndexEntry>, CatalogError>),
    DetailFinished {
        ticket: u64,
        key: LookupKey,
        result: Result<DetailRecord, CatalogError>,
    },
}

/// Work the coordinator asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchIndex,
    Debounce(String),
    FetchDetail { ticket: u64, key: LookupKey },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub key_range: KeyRange,
    pub stale_responses: StaleResponses,
    pub initial_input: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CoordinatorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            key_range: KeyRange::new(settings.key_min, settings.key_max),
            stale_responses: settings.stale_responses,
            initial_input: settings.initial_input.clone(),
        }
    }
}

/// Owns the lookup state and decides what happens next.
///
/// Dependencies run one way: raw input arms the debouncer, a settled value
/// that validates to a *different* key replaces the lookup key, and only a
/// key change starts a detail load. The coordinator performs no I/O; it
/// returns [`Command`]s for its driver and is fed the results back as
/// [`Event`]s.
pub struct Coordinator {
    config: CoordinatorConfig,
    started: bool,
    raw_input: String,
    lookup_key: Option<LookupKey>,
    index: Vec<IndexEntry>,
    index_phase: LoadPhase,
    index_error: Option<String>,
    detail: Option<DetailRecord>,
    detail_phase: LoadPhase,
    detail_in_flight: usize,
    awaiting_ticket: Option<u64>,
    error: Option<ErrorState>,
    next_ticket: u64,
    latest_ticket: Option<u64>,
    observer: Box<dyn TransitionObserver>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("raw_input", &self.raw_input)
            .field("lookup_key", &self.lookup_key)
            .field("index_phase", &self.index_phase)
            .field("index_len", &self.index.len())
            .field("detail_phase", &self.detail_phase)
            .field("detail_id", &self.detail.as_ref().map(|d| d.id))
            .field("error", &self.error)
            .field("index_error", &self.index_error)
            .field("latest_ticket", &self.latest_ticket)
            .finish()
    }
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_observer(config, TracingObserver)
    }

    pub fn with_observer(
        config: CoordinatorConfig,
        observer: impl TransitionObserver + 'static,
    ) -> Self {
        Self {
            config,
            started: false,
            raw_input: String::new(),
            lookup_key: None,
            index: Vec::new(),
            index_phase: LoadPhase::Idle,
            index_error: None,
            detail: None,
            detail_phase: LoadPhase::Idle,
            detail_in_flight: 0,
            awaiting_ticket: None,
            error: None,
            next_ticket: 1,
            latest_ticket: None,
            observer: Box::new(observer),
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        let mut commands = Vec::new();

        match event {
            Event::Started => self.on_started(&mut commands),
            Event::InputChanged(input) => self.on_input_changed(input, &mut commands),
            Event::InputSettled(settled) => self.on_input_settled(settled, &mut commands),
            Event::IndexFinished(result) => self.on_index_finished(result),
            Event::DetailFinished {
                ticket,
                key,
                result,
            } => self.on_detail_finished(ticket, key, result),
        }

        commands
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn lookup_key(&self) -> Option<LookupKey> {
        self.lookup_key
    }

    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    pub fn index_phase(&self) -> LoadPhase {
        self.index_phase
    }

    /// Why the index load failed. Once set it stays set: a failed index is
    /// terminal for the session.
    pub fn index_error(&self) -> Option<&str> {
        self.index_error.as_deref()
    }

    pub fn detail(&self) -> Option<&DetailRecord> {
        self.detail.as_ref()
    }

    pub fn detail_phase(&self) -> LoadPhase {
        self.detail_phase
    }

    /// Under [`StaleResponses::Discard`] only the newest request counts, since
    /// superseded ones can no longer change what is shown.
    pub fn is_detail_loading(&self) -> bool {
        match self.config.stale_responses {
            StaleResponses::Discard => self.awaiting_ticket.is_some(),
            StaleResponses::Apply => self.detail_in_flight > 0,
        }
    }

    pub fn error(&self) -> Option<&ErrorState> {
        self.error.as_ref()
    }

    pub fn key_range(&self) -> KeyRange {
        self.config.key_range
    }

    pub fn view(&self) -> ViewState {
        ViewState::derive(self)
    }

    fn on_started(&mut self, commands: &mut Vec<Command>) {
        if self.started {
            return;
        }
        self.started = true;
        self.raw_input = self.config.initial_input.clone();

        self.index_phase = LoadPhase::Loading;
        self.error = None;
        self.notify(Transition::IndexLoading);
        commands.push(Command::FetchIndex);

        if let Some(key) = validate_in(&self.raw_input, self.config.key_range) {
            self.change_key(key, commands);
        }
    }

    fn on_input_changed(&mut self, input: String, commands: &mut Vec<Command>) {
        if input == self.raw_input {
            return;
        }

        self.raw_input = input.clone();
        self.notify(Transition::InputChanged {
            input: input.clone(),
        });
        commands.push(Command::Debounce(input));
    }

    fn on_input_settled(&mut self, settled: String, commands: &mut Vec<Command>) {
        match validate_in(&settled, self.config.key_range) {
            None => self.notify(Transition::InputRejected { settled }),
            Some(key) if self.lookup_key == Some(key) => {
                self.notify(Transition::KeyUnchanged { key });
            }
            Some(key) => self.change_key(key, commands),
        }
    }

    fn change_key(&mut self, key: LookupKey, commands: &mut Vec<Command>) {
        let previous = self.lookup_key.replace(key);
        self.notify(Transition::KeySettled { previous, key });

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.latest_ticket = Some(ticket);
        self.awaiting_ticket = Some(ticket);
        self.detail_in_flight += 1;
        self.detail_phase = LoadPhase::Loading;
        self.error = None;

        self.notify(Transition::DetailLoading { key, ticket });
        commands.push(Command::FetchDetail { ticket, key });
    }

    fn on_index_finished(&mut self, result: Result<Vec<IndexEntry>, CatalogError>) {
        match result {
            Ok(entries) => {
                self.index = entries;
                self.index_phase = LoadPhase::Loaded;
                self.notify(Transition::IndexLoaded {
                    entries: self.index.len(),
                });
            }
            Err(err) => {
                let message = err.to_string();
                self.index.clear();
                self.index_phase = LoadPhase::Failed;
                self.index_error = Some(message.clone());
                self.error = Some(ErrorState {
                    origin: ErrorOrigin::Index,
                    message: message.clone(),
                });
                self.notify(Transition::IndexFailed { message });
            }
        }
    }

    fn on_detail_finished(
        &mut self,
        ticket: u64,
        key: LookupKey,
        result: Result<DetailRecord, CatalogError>,
    ) {
        self.detail_in_flight = self.detail_in_flight.saturating_sub(1);
        if self.awaiting_ticket == Some(ticket) {
            self.awaiting_ticket = None;
        }

        let latest = self.latest_ticket;
        if latest != Some(ticket) && self.config.stale_responses == StaleResponses::Discard {
            self.notify(Transition::StaleDetailDiscarded {
                key,
                ticket,
                latest,
            });
            return;
        }

        match result {
            Ok(record) => {
                self.detail = Some(record);
                self.detail_phase = LoadPhase::Loaded;
                self.notify(Transition::DetailLoaded { key, ticket });
            }
            Err(err) => {
                let message = err.to_string();
                self.detail = None;
                self.detail_phase = LoadPhase::Failed;
                self.error = Some(ErrorState {
                    origin: ErrorOrigin::Detail,
                    message: message.clone(),
                });
                self.notify(Transition::DetailFailed {
                    key,
                    ticket,
                    message,
                });
            }
        }
    }

    fn notify(&mut self, transition: Transition) {
        self.observer.on_transition(&transition);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::view::{Screen, ViewState};

    fn record(id: LookupKey, name: &str, types: &[&str]) -> DetailRecord {
        DetailRecord {
            id,
            name: name.to_string(),
            image_url: Some(format!("https://img.test/{id}.png")),
            types: types
                .iter()
                .enumerate()
                .map(|(i, t)| dexcore_catalog::TypeSlot {
                    slot: i as u32 + 1,
                    type_name: t.to_string(),
                })
                .collect(),
        }
    }

    fn config(initial: &str, stale: StaleResponses) -> CoordinatorConfig {
        CoordinatorConfig {
            key_range: KeyRange::default(),
            stale_responses: stale,
            initial_input: initial.to_string(),
        }
    }

    fn recording(config: CoordinatorConfig) -> (Coordinator, Arc<Mutex<Vec<Transition>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let coordinator = Coordinator::with_observer(config, move |t: &Transition| {
            sink.lock().unwrap().push(t.clone());
        });
        (coordinator, log)
    }

    fn screen(coordinator: &Coordinator) -> Screen {
        match coordinator.view() {
            ViewState::Ready(screen) => screen,
            ViewState::Fatal { message } => panic!("unexpected fatal view: {message}"),
        }
    }

    fn loaded(initial: &str) -> Coordinator {
        let mut c = Coordinator::new(config(initial, StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::IndexFinished(Ok(vec![
            IndexEntry {
                name: "bulbasaur".to_string(),
            },
            IndexEntry {
                name: "ivysaur".to_string(),
            },
        ])));
        c
    }

    #[test]
    fn startup_loads_index_and_initial_key_once() {
        let mut c = Coordinator::new(config("1", StaleResponses::Discard));

        let commands = c.handle(Event::Started);
        assert_eq!(
            commands,
            vec![
                Command::FetchIndex,
                Command::FetchDetail { ticket: 1, key: 1 }
            ]
        );
        assert_eq!(c.raw_input(), "1");
        assert_eq!(c.lookup_key(), Some(1));
        assert_eq!(c.index_phase(), LoadPhase::Loading);
        assert_eq!(c.detail_phase(), LoadPhase::Loading);

        assert!(c.handle(Event::Started).is_empty());
    }

    #[test]
    fn startup_with_invalid_initial_input_skips_detail() {
        let mut c = Coordinator::new(config("", StaleResponses::Discard));
        assert_eq!(c.handle(Event::Started), vec![Command::FetchIndex]);
        assert_eq!(c.lookup_key(), None);
        assert_eq!(c.detail_phase(), LoadPhase::Idle);
    }

    #[test]
    fn every_input_change_rearms_debounce_without_fetching() {
        let mut c = loaded("");

        assert_eq!(
            c.handle(Event::InputChanged("2".to_string())),
            vec![Command::Debounce("2".to_string())]
        );
        assert_eq!(
            c.handle(Event::InputChanged("25".to_string())),
            vec![Command::Debounce("25".to_string())]
        );
        assert!(c.handle(Event::InputChanged("25".to_string())).is_empty());
        assert_eq!(c.raw_input(), "25");
        assert_eq!(c.lookup_key(), None);
    }

    #[test]
    fn settled_valid_input_changes_key_and_fetches() {
        let mut c = loaded("");
        c.handle(Event::InputChanged("25".to_string()));

        let commands = c.handle(Event::InputSettled("25".to_string()));
        assert_eq!(commands, vec![Command::FetchDetail { ticket: 1, key: 25 }]);
        assert_eq!(c.lookup_key(), Some(25));
        assert!(c.is_detail_loading());

        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 25,
            result: Ok(record(25, "pikachu", &["electric"])),
        });
        let screen = screen(&c);
        let detail = screen.detail.unwrap();
        assert_eq!(detail.title, "Pikachu");
        assert_eq!(detail.number, "#25");
        let labels: Vec<_> = detail.types.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["Electric"]);
        assert!(!screen.detail_loading);
    }

    #[test]
    fn same_key_settling_again_does_not_refetch() {
        let mut c = loaded("1");
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 1,
            result: Ok(record(1, "bulbasaur", &["grass", "poison"])),
        });

        assert!(c.handle(Event::InputSettled("1".to_string())).is_empty());
        assert!(c.handle(Event::InputSettled("1abc".to_string())).is_empty());
        assert_eq!(c.detail_phase(), LoadPhase::Loaded);
    }

    #[test]
    fn rejected_input_leaves_key_and_record_untouched() {
        let (mut c, log) = recording(config("1", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 1,
            result: Ok(record(1, "bulbasaur", &["grass"])),
        });
        let before = c.detail().cloned();

        for settled in ["", "abc", "0", "1026", "12.5", "-4"] {
            assert!(c.handle(Event::InputSettled(settled.to_string())).is_empty());
        }

        assert_eq!(c.lookup_key(), Some(1));
        assert_eq!(c.detail().cloned(), before);
        assert!(c.error().is_none());

        let rejected = log
            .lock()
            .unwrap()
            .iter()
            .filter(|t| matches!(t, Transition::InputRejected { .. }))
            .count();
        assert_eq!(rejected, 6);
    }

    #[test]
    fn boundary_keys_are_accepted() {
        let mut c = loaded("");
        assert_eq!(
            c.handle(Event::InputSettled("1".to_string())),
            vec![Command::FetchDetail { ticket: 1, key: 1 }]
        );
        assert_eq!(
            c.handle(Event::InputSettled("1025".to_string())),
            vec![Command::FetchDetail {
                ticket: 2,
                key: 1025
            }]
        );
    }

    #[test]
    fn index_is_capitalized_in_service_order() {
        let c = loaded("");
        assert_eq!(screen(&c).index, ["Bulbasaur", "Ivysaur"]);
        assert_eq!(c.index_phase(), LoadPhase::Loaded);
    }

    #[test]
    fn detail_failure_clears_record_but_keeps_index() {
        let mut c = loaded("1");
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 1,
            result: Ok(record(1, "bulbasaur", &["grass"])),
        });

        c.handle(Event::InputSettled("7".to_string()));
        c.handle(Event::DetailFinished {
            ticket: 2,
            key: 7,
            result: Err(CatalogError::Transport("connection reset".to_string())),
        });

        assert!(c.detail().is_none());
        assert_eq!(c.detail_phase(), LoadPhase::Failed);
        let error = c.error().unwrap();
        assert_eq!(error.origin, ErrorOrigin::Detail);
        assert!(!error.message.is_empty());

        let screen = screen(&c);
        assert!(screen.detail.is_none());
        assert_eq!(screen.index, ["Bulbasaur", "Ivysaur"]);
        assert!(screen.detail_error.unwrap().contains("connection reset"));
    }

    #[test]
    fn new_attempt_clears_previous_error() {
        let mut c = loaded("");
        c.handle(Event::InputSettled("7".to_string()));
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 7,
            result: Err(CatalogError::NotFound(7)),
        });
        assert!(c.error().is_some());

        c.handle(Event::InputSettled("8".to_string()));
        assert!(c.error().is_none());
        assert_eq!(c.detail_phase(), LoadPhase::Loading);
    }

    #[test]
    fn index_success_does_not_clear_detail_error() {
        let mut c = Coordinator::new(config("3", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 3,
            result: Err(CatalogError::NotFound(3)),
        });
        c.handle(Event::IndexFinished(Ok(Vec::new())));

        assert_eq!(c.error().map(|e| e.origin), Some(ErrorOrigin::Detail));
    }

    #[test]
    fn index_failure_renders_fatal_view() {
        let mut c = Coordinator::new(config("", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::IndexFinished(Err(CatalogError::Decode(
            "missing field `results`".to_string(),
        ))));

        assert_eq!(c.index_phase(), LoadPhase::Failed);
        assert!(c.index().is_empty());
        match c.view() {
            ViewState::Fatal { message } => assert!(message.contains("results")),
            ViewState::Ready(_) => panic!("expected fatal view"),
        }
    }

    #[test]
    fn later_detail_failure_keeps_index_failure_fatal() {
        let mut c = Coordinator::new(config("1", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::IndexFinished(Err(CatalogError::Transport(
            "HTTP 503".to_string(),
        ))));
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 1,
            result: Err(CatalogError::NotFound(1)),
        });

        assert_eq!(c.error().map(|e| e.origin), Some(ErrorOrigin::Detail));
        assert_eq!(c.index_error(), Some("request failed: HTTP 503"));
        match c.view() {
            ViewState::Fatal { message } => assert!(message.contains("HTTP 503")),
            ViewState::Ready(screen) => panic!("expected fatal view, got {screen:?}"),
        }
    }

    #[test]
    fn new_key_after_index_failure_stays_fatal() {
        let mut c = Coordinator::new(config("", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::IndexFinished(Err(CatalogError::Transport(
            "HTTP 503".to_string(),
        ))));

        c.handle(Event::InputSettled("4".to_string()));
        assert!(c.error().is_none());
        assert!(c.view().is_fatal());
    }

    #[test]
    fn loading_ends_when_latest_response_arrives_despite_stale_in_flight() {
        let mut c = Coordinator::new(config("", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::InputSettled("5".to_string()));
        c.handle(Event::InputSettled("6".to_string()));

        c.handle(Event::DetailFinished {
            ticket: 2,
            key: 6,
            result: Ok(record(6, "charizard", &["fire", "flying"])),
        });
        assert!(!c.is_detail_loading());
        assert!(!screen(&c).detail_loading);

        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 5,
            result: Ok(record(5, "charmeleon", &["fire"])),
        });
        assert!(!c.is_detail_loading());
        assert_eq!(c.detail().map(|d| d.id), Some(6));
    }

    #[test]
    fn apply_policy_reports_loading_until_every_fetch_returns() {
        let mut c = Coordinator::new(config("", StaleResponses::Apply));
        c.handle(Event::Started);
        c.handle(Event::InputSettled("5".to_string()));
        c.handle(Event::InputSettled("6".to_string()));

        c.handle(Event::DetailFinished {
            ticket: 2,
            key: 6,
            result: Ok(record(6, "charizard", &["fire"])),
        });
        assert!(c.is_detail_loading());

        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 5,
            result: Ok(record(5, "charmeleon", &["fire"])),
        });
        assert!(!c.is_detail_loading());
    }

    #[test]
    fn discard_policy_drops_superseded_response() {
        let (mut c, log) = recording(config("", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::InputSettled("5".to_string()));
        c.handle(Event::InputSettled("6".to_string()));

        c.handle(Event::DetailFinished {
            ticket: 2,
            key: 6,
            result: Ok(record(6, "charizard", &["fire"])),
        });
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 5,
            result: Ok(record(5, "charmeleon", &["fire"])),
        });

        assert_eq!(c.detail().map(|d| d.id), Some(6));
        assert!(!c.is_detail_loading());
        assert!(log.lock().unwrap().contains(&Transition::StaleDetailDiscarded {
            key: 5,
            ticket: 1,
            latest: Some(2)
        }));
    }

    #[test]
    fn discard_policy_ignores_stale_failure_too() {
        let mut c = Coordinator::new(config("", StaleResponses::Discard));
        c.handle(Event::Started);
        c.handle(Event::InputSettled("5".to_string()));
        c.handle(Event::InputSettled("6".to_string()));
        c.handle(Event::DetailFinished {
            ticket: 2,
            key: 6,
            result: Ok(record(6, "charizard", &["fire"])),
        });
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 5,
            result: Err(CatalogError::Transport("timeout".to_string())),
        });

        assert_eq!(c.detail().map(|d| d.id), Some(6));
        assert!(c.error().is_none());
    }

    #[test]
    fn apply_policy_lets_late_response_win() {
        let mut c = Coordinator::new(config("", StaleResponses::Apply));
        c.handle(Event::Started);
        c.handle(Event::InputSettled("5".to_string()));
        c.handle(Event::InputSettled("6".to_string()));

        c.handle(Event::DetailFinished {
            ticket: 2,
            key: 6,
            result: Ok(record(6, "charizard", &["fire"])),
        });
        c.handle(Event::DetailFinished {
            ticket: 1,
            key: 5,
            result: Ok(record(5, "charmeleon", &["fire"])),
        });

        assert_eq!(c.detail().map(|d| d.id), Some(5));
        assert_eq!(c.lookup_key(), Some(6));
    }
}
