//! Session state and storage.
//!
//! Sessions are kept in process memory, identified by a random UUID carried
//! in a signed cookie, and expire after a configurable idle period.
//!
//! # Architecture
//!
//! - [`SessionRecord`]: the per-client `hello` / `goodnight` / `count` state
//! - [`Session`]: a stored record plus its identity and activity timestamps
//! - [`SessionStore`]: thread-safe store for all live sessions
//!
//! # Example
//!
//! ```rust
//! use hello_sessions::session::SessionStore;
//!
//! let store = SessionStore::default();
//! let (session, created) = store.resolve(None);
//! assert!(created);
//!
//! let count = session.with_record(|record| {
//!     record.ensure_defaults();
//!     record.increment_count()
//! });
//! assert_eq!(count, 1);
//! ```

mod record;
mod store;

pub use record::{
    DEFAULT_COUNT, DEFAULT_GOODNIGHT, DEFAULT_HELLO, SessionField, SessionRecord, UnknownField,
};
pub use store::{DEFAULT_IDLE_TIMEOUT, Session, SessionStore};
