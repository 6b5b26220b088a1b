//! Step-at-a-time cursors over evaluated key lists
//!
//! A cursor owns the already-evaluated keys and consumes them front to back,
//! exactly once each. Each step is delivered on the cursor's request: `Some`
//! carries the cursor positioned on its next key, `None` marks exhaustion.
//!
//! [`Cursor::advance`] consumes the cursor, so an exhausted cursor (which is
//! never delivered) cannot be advanced.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::handle::Responder;
use super::terminal::spawn_guarded;
use crate::config::QueryConfig;
use crate::observability::Event;
use crate::query::QueryError;
use crate::store::{Key, ObjectStore, Record};

/// Pull-based iterator over the keys matched by a query
pub struct Cursor<S: ObjectStore + 'static> {
    store: Arc<S>,
    keys: VecDeque<Key>,
    key_only: bool,
    key: Option<Key>,
    value: Option<Record>,
    responder: Responder<Option<Cursor<S>>>,
    config: Arc<QueryConfig>,
}

impl<S: ObjectStore + 'static> Cursor<S> {
    pub(crate) fn new(
        store: Arc<S>,
        keys: Vec<Key>,
        key_only: bool,
        responder: Responder<Option<Cursor<S>>>,
        config: Arc<QueryConfig>,
    ) -> Self {
        Self {
            store,
            keys: keys.into(),
            key_only,
            key: None,
            value: None,
            responder,
            config,
        }
    }

    /// Key at the current position
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Record at the current position.
    ///
    /// Always `None` for key cursors, and `None` if the record vanished
    /// from the store.
    pub fn value(&self) -> Option<&Record> {
        self.value.as_ref()
    }

    /// Keys not yet visited
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }

    pub fn is_key_only(&self) -> bool {
        self.key_only
    }

    /// Move to the next key.
    ///
    /// The request returns to `Pending` and is completed again with this
    /// cursor repositioned, or with `None` once every key was visited.
    pub fn advance(self) {
        let responder = self.responder.clone();
        responder.rearm();
        spawn_guarded(responder, self.step());
    }

    /// Pop the next key, fetch its record unless key-only, and deliver.
    pub(crate) async fn step(mut self) {
        let responder = self.responder.clone();
        let request_id = responder.id().to_string();

        let Some(key) = self.keys.pop_front() else {
            self.config
                .log(Event::CursorExhausted, &[("request", request_id.as_str())]);
            responder.deliver(Ok(None));
            return;
        };

        if !self.key_only {
            match self.store.get(&key).await {
                Ok(value) => self.value = value,
                Err(e) => {
                    let err = QueryError::from_store(None, e);
                    let message = err.to_string();
                    self.config.log(
                        Event::RequestFailed,
                        &[("request", request_id.as_str()), ("error", message.as_str())],
                    );
                    responder.deliver(Err(err));
                    return;
                }
            }
        }

        let key_desc = key.to_string();
        let remaining = self.keys.len().to_string();
        self.config.log(
            Event::CursorAdvance,
            &[
                ("key", key_desc.as_str()),
                ("remaining", remaining.as_str()),
                ("request", request_id.as_str()),
            ],
        );
        self.key = Some(key);
        responder.deliver(Ok(Some(self)));
    }
}

impl<S: ObjectStore + 'static> fmt::Debug for Cursor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("remaining", &self.keys.len())
            .field("key_only", &self.key_only)
            .finish()
    }
}
