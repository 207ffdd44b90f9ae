use dexcore_catalog::LookupKey;

/// A single state change inside the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    InputChanged { input: String },
    InputRejected { settled: String },
    KeyUnchanged { key: LookupKey },
    KeySettled {
        previous: Option<LookupKey>,
        key: LookupKey,
    },
    IndexLoading,
    IndexLoaded { entries: usize },
    IndexFailed { message: String },
    DetailLoading { key: LookupKey, ticket: u64 },
    DetailLoaded { key: LookupKey, ticket: u64 },
    DetailFailed {
        key: LookupKey,
        ticket: u64,
        message: String,
    },
    StaleDetailDiscarded {
        key: LookupKey,
        ticket: u64,
        latest: Option<u64>,
    },
}

/// Hook invoked by the coordinator on every transition.
pub trait TransitionObserver: Send {
    fn on_transition(&mut self, transition: &Transition);
}

impl<F> TransitionObserver for F
where
    F: FnMut(&Transition) + Send,
{
    fn on_transition(&mut self, transition: &Transition) {
        self(transition)
    }
}

/// Default observer: forwards transitions to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TransitionObserver for TracingObserver {
    fn on_transition(&mut self, transition: &Transition) {
        match transition {
            Transition::InputChanged { input } => {
                tracing::trace!(%input, "input changed");
            }
            Transition::InputRejected { settled } => {
                tracing::debug!(%settled, "settled input rejected");
            }
            Transition::KeyUnchanged { key } => {
                tracing::debug!(key, "settled input matches current key");
            }
            Transition::KeySettled { previous, key } => {
                tracing::debug!(?previous, key, "lookup key changed");
            }
            Transition::IndexLoading => tracing::info!("loading index"),
            Transition::IndexLoaded { entries } => {
                tracing::info!(entries, "index loaded");
            }
            Transition::IndexFailed { message } => {
                tracing::warn!(%message, "index load failed");
            }
            Transition::DetailLoading { key, ticket } => {
                tracing::debug!(key, ticket, "loading detail");
            }
            Transition::DetailLoaded { key, ticket } => {
                tracing::debug!(key, ticket, "detail loaded");
            }
            Transition::DetailFailed {
                key,
                ticket,
                message,
            } => {
                tracing::warn!(key, ticket, %message, "detail load failed");
            }
            Transition::StaleDetailDiscarded {
                key,
                ticket,
                latest,
            } => {
                tracing::debug!(key, ticket, latest = ?latest, "discarding superseded detail response");
            }
        }
    }
}
