//! Request / cursor protocol
//!
//! Every terminal operation returns a [`Request`] immediately and completes
//! it asynchronously:
//!
//! - `get_all_keys`: `Request<Vec<Key>>`
//! - `get_all`: `Request<Vec<Record>>`
//! - `open_cursor` / `open_key_cursor`: `Request<Option<Cursor<S>>>`, completed
//!   once per cursor step
//!
//! # Invariants
//!
//! - A delivered result is only observable once the request is `Done`
//! - Each delivery runs the matching hook exactly once
//! - The first store failure is delivered as an error; nothing is retried
//! - Exhaustion is a normal completion (`None` / empty list)

mod cursor;
mod handle;
pub(crate) mod terminal;

pub use cursor::Cursor;
pub use handle::{ReadyState, Request};
