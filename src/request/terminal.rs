//! Terminal operations
//!
//! Each operation returns its [`Request`] synchronously and runs the
//! evaluation on the ambient Tokio runtime.
//!
//! # Flow
//!
//! 1. Log `REQUEST_OPEN`
//! 2. Validate referenced indexes (if configured); failure completes the
//!    request immediately
//! 3. Spawn the evaluation task
//! 4. Deliver keys, records, or the first cursor position

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;

use super::cursor::Cursor;
use super::handle::{Request, Responder};
use crate::config::QueryConfig;
use crate::observability::Event;
use crate::query::{Evaluator, Query, QueryError, QueryResult};
use crate::store::{Key, ObjectStore, Record};

/// Spawn `work` on the current runtime.
///
/// If the runtime is missing the request fails with `KQ_NO_RUNTIME`; if the
/// task panics or is cancelled before delivering, it fails with
/// `KQ_TASK_FAILED`.
pub(crate) fn spawn_guarded<T, F>(responder: Responder<T>, work: F)
where
    T: Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            let task = handle.spawn(work);
            handle.spawn(async move {
                if let Err(e) = task.await {
                    responder.fail_if_pending(QueryError::task_failed(format!(
                        "Evaluation task failed: {}",
                        e
                    )));
                }
            });
        }
        Err(_) => responder.deliver(Err(QueryError::no_runtime())),
    }
}

/// Log the open event and run synchronous validation.
///
/// Returns false if the request was already failed.
fn begin<T>(
    query: &Query,
    store: &dyn ObjectStore,
    operation: &'static str,
    responder: &Responder<T>,
) -> bool {
    let config = query.config();
    let request_id = responder.id().to_string();
    let description = query.to_string();
    config.log(
        Event::RequestOpen,
        &[
            ("operation", operation),
            ("query", description.as_str()),
            ("request", request_id.as_str()),
        ],
    );

    if !config.validate_indexes {
        return true;
    }
    match Evaluator::new(store, config).validate(query.node()) {
        Ok(()) => true,
        Err(err) => {
            fail(config, responder, operation, err);
            false
        }
    }
}

fn fail<T>(config: &QueryConfig, responder: &Responder<T>, operation: &'static str, err: QueryError) {
    let request_id = responder.id().to_string();
    let message = err.to_string();
    config.log(
        Event::RequestFailed,
        &[
            ("error", message.as_str()),
            ("operation", operation),
            ("request", request_id.as_str()),
        ],
    );
    responder.deliver(Err(err));
}

fn finish<T>(
    config: &QueryConfig,
    responder: &Responder<T>,
    operation: &'static str,
    outcome: QueryResult<T>,
    len: fn(&T) -> usize,
) {
    match outcome {
        Ok(value) => {
            let request_id = responder.id().to_string();
            let count = len(&value).to_string();
            config.log(
                Event::RequestComplete,
                &[
                    ("count", count.as_str()),
                    ("operation", operation),
                    ("request", request_id.as_str()),
                ],
            );
            responder.deliver(Ok(value));
        }
        Err(err) => fail(config, responder, operation, err),
    }
}

/// Evaluate and deliver the raw key list
pub(crate) fn get_all_keys<S>(query: &Query, store: &Arc<S>) -> Request<Vec<Key>>
where
    S: ObjectStore + 'static,
{
    const OPERATION: &str = "get_all_keys";
    let (request, responder) = Request::pending();
    if !begin(query, &**store, OPERATION, &responder) {
        return request;
    }

    let node = query.shared_node();
    let config = query.shared_config();
    let store = Arc::clone(store);
    let task_responder = responder.clone();
    spawn_guarded(responder, async move {
        let outcome = Evaluator::new(&*store, &config).keys(&node).await;
        finish(&config, &task_responder, OPERATION, outcome, Vec::len);
    });
    request
}

/// Evaluate, then fetch each record one at a time in evaluation order
pub(crate) fn get_all<S>(query: &Query, store: &Arc<S>) -> Request<Vec<Record>>
where
    S: ObjectStore + 'static,
{
    const OPERATION: &str = "get_all";
    let (request, responder) = Request::pending();
    if !begin(query, &**store, OPERATION, &responder) {
        return request;
    }

    let node = query.shared_node();
    let config = query.shared_config();
    let store = Arc::clone(store);
    let task_responder = responder.clone();
    spawn_guarded(responder, async move {
        let outcome = async {
            let keys = Evaluator::new(&*store, &config).keys(&node).await?;
            let mut records = Vec::with_capacity(keys.len());
            for key in keys {
                let fetched = store
                    .get(&key)
                    .await
                    .map_err(|e| QueryError::from_store(None, e))?;
                match fetched {
                    Some(record) => records.push(record),
                    None => {
                        let key_desc = key.to_string();
                        config.log(Event::RecordMissing, &[("key", key_desc.as_str())]);
                    }
                }
            }
            Ok::<_, QueryError>(records)
        }
        .await;
        finish(&config, &task_responder, OPERATION, outcome, Vec::len);
    });
    request
}

/// Evaluate, then deliver a cursor positioned on the first key
pub(crate) fn open_cursor<S>(
    query: &Query,
    store: &Arc<S>,
    key_only: bool,
) -> Request<Option<Cursor<S>>>
where
    S: ObjectStore + 'static,
{
    let operation = if key_only { "open_key_cursor" } else { "open_cursor" };
    let (request, responder) = Request::pending();
    if !begin(query, &**store, operation, &responder) {
        return request;
    }

    let node = query.shared_node();
    let config = query.shared_config();
    let store = Arc::clone(store);
    let task_responder = responder.clone();
    spawn_guarded(responder, async move {
        let evaluated = Evaluator::new(&*store, &config).keys(&node).await;
        match evaluated {
            Ok(keys) => {
                Cursor::new(store, keys, key_only, task_responder, config)
                    .step()
                    .await;
            }
            Err(err) => fail(&config, &task_responder, operation, err),
        }
    });
    request
}
