//! Asynchronous result handles
//!
//! A [`Request`] is returned synchronously by every terminal operation and
//! completed later by the evaluation task through its [`Responder`].
//!
//! # State machine
//!
//! ```text
//! Pending --(result or failure delivered)--> Done
//! Done    --(cursor advance)--------------> Pending
//! ```
//!
//! Only cursor requests leave `Done`; every other request is terminal once
//! done.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::Notify;
use uuid::Uuid;

use crate::query::{QueryError, QueryResult};

/// Request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Evaluation or fetch in flight
    Pending,
    /// Result or failure delivered
    Done,
}

impl ReadyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadyState::Pending => "PENDING",
            ReadyState::Done => "DONE",
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

type SuccessHook<T> = Box<dyn FnMut(&T) + Send>;
type ErrorHook = Box<dyn FnMut(&QueryError) + Send>;

struct Slot<T> {
    state: ReadyState,
    outcome: Option<QueryResult<T>>,
    on_success: Option<SuccessHook<T>>,
    on_error: Option<ErrorHook>,
}

struct Shared<T> {
    id: Uuid,
    slot: Mutex<Slot<T>>,
    notify: Notify,
}

impl<T> Shared<T> {
    fn slot(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Caller side of an asynchronous result.
///
/// Hooks registered with [`on_success`](Request::on_success) and
/// [`on_error`](Request::on_error) run on the evaluation task once per
/// delivery. Results can also be awaited with
/// [`completion`](Request::completion) or polled with
/// [`take_result`](Request::take_result).
pub struct Request<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Request<T> {
    /// Create a pending request and the responder that completes it
    pub(crate) fn pending() -> (Self, Responder<T>) {
        let shared = Arc::new(Shared {
            id: Uuid::new_v4(),
            slot: Mutex::new(Slot {
                state: ReadyState::Pending,
                outcome: None,
                on_success: None,
                on_error: None,
            }),
            notify: Notify::new(),
        });
        let responder = Responder {
            id: shared.id,
            shared: Arc::downgrade(&shared),
        };
        (Self { shared }, responder)
    }

    /// Unique request id, used in log events
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn ready_state(&self) -> ReadyState {
        self.shared.slot().state
    }

    pub fn is_done(&self) -> bool {
        self.ready_state() == ReadyState::Done
    }

    /// Set the success hook, replacing any previous one
    pub fn on_success(&self, hook: impl FnMut(&T) + Send + 'static) {
        self.shared.slot().on_success = Some(Box::new(hook));
    }

    /// Set the failure hook, replacing any previous one
    pub fn on_error(&self, hook: impl FnMut(&QueryError) + Send + 'static) {
        self.shared.slot().on_error = Some(Box::new(hook));
    }

    /// Take the delivered outcome, if one is waiting
    pub fn take_result(&self) -> Option<QueryResult<T>> {
        self.shared.slot().outcome.take()
    }

    /// Wait for the next delivery and take its outcome
    pub async fn completion(&self) -> QueryResult<T> {
        loop {
            let notified = self.shared.notify.notified();
            let outcome = self.take_result();
            if let Some(outcome) = outcome {
                return outcome;
            }
            notified.await;
        }
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.shared.id)
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

/// Engine side of a [`Request`].
///
/// Holds a weak reference: once the caller drops the request, deliveries
/// are discarded.
pub(crate) struct Responder<T> {
    id: Uuid,
    shared: Weak<Shared<T>>,
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<T> Responder<T> {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    /// Move the request back to `Pending` for another delivery
    pub(crate) fn rearm(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let stale = {
            let mut slot = shared.slot();
            slot.state = ReadyState::Pending;
            slot.outcome.take()
        };
        drop(stale);
    }

    /// Complete the request: run the matching hook, then publish the outcome
    /// and wake waiters.
    pub(crate) fn deliver(&self, outcome: QueryResult<T>) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        let (mut on_success, mut on_error) = {
            let mut slot = shared.slot();
            slot.state = ReadyState::Done;
            (slot.on_success.take(), slot.on_error.take())
        };

        // Hooks run unlocked so they may call back into the request
        match &outcome {
            Ok(value) => {
                if let Some(hook) = on_success.as_mut() {
                    hook(value);
                }
            }
            Err(err) => {
                if let Some(hook) = on_error.as_mut() {
                    hook(err);
                }
            }
        }

        let stale = {
            let mut slot = shared.slot();
            if slot.on_success.is_none() {
                slot.on_success = on_success;
            }
            if slot.on_error.is_none() {
                slot.on_error = on_error;
            }
            slot.outcome.replace(outcome)
        };
        drop(stale);
        shared.notify.notify_waiters();
    }

    /// Deliver `err` unless the request is already done
    pub(crate) fn fail_if_pending(&self, err: QueryError) {
        let pending = self
            .shared
            .upgrade()
            .map(|shared| shared.slot().state == ReadyState::Pending)
            .unwrap_or(false);
        if pending {
            self.deliver(Err(err));
        }
    }
}
