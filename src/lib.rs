//! Offline-tolerant local replica of a school attendance service.
//!
//! The crate is a library plus one sidecar binary. The library owns a full
//! in-memory snapshot of the tenant's data, persists it wholesale to durable
//! key/value storage after every mutation, and routes writes either to the
//! remote API (when signed in) or to local id assignment (demo mode). The
//! binary wraps the store in a line-delimited JSON request/response loop on
//! stdin/stdout.

pub mod error;
pub mod ipc;
pub mod model;
pub mod remote;
pub mod seed;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use error::StoreError;
pub use store::ReplicaStore;
