//! Lookup coordination: the state machine that ties raw input, the
//! debouncer, the validator and the catalog together, and the async service
//! that drives it.

mod coordinator;
mod observer;
mod service;
mod view;

pub use coordinator::{
    Command, Coordinator, CoordinatorConfig, ErrorOrigin, ErrorState, Event, LoadPhase,
};
pub use observer::{TracingObserver, Transition, TransitionObserver};
pub use service::{LookupService, ServiceHandle, ServiceRequest};
pub use view::{DetailView, Screen, TypeLabel, ViewState};
