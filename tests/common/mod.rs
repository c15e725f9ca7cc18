#![allow(dead_code)]

use rollcalld::remote::{ApiError, EntityKind, RemoteApi};
use rollcalld::storage::MemoryKv;
use rollcalld::ReplicaStore;
use serde_json::{json, Value};
use std::cell::RefCell;

/// Scriptable remote: answers `bootstrap` with a canned bundle and either
/// accepts creates (assigning server ids from 100 up) or rejects every write.
pub struct MockApi {
    pub bootstrap: Value,
    pub fail_writes: bool,
    next_id: RefCell<i64>,
}

impl MockApi {
    pub fn new() -> MockApi {
        MockApi {
            bootstrap: json!({}),
            fail_writes: false,
            next_id: RefCell::new(100),
        }
    }

    pub fn with_bootstrap(bootstrap: Value) -> MockApi {
        MockApi {
            bootstrap,
            ..MockApi::new()
        }
    }

    pub fn rejecting() -> MockApi {
        MockApi {
            fail_writes: true,
            ..MockApi::new()
        }
    }
}

impl RemoteApi for MockApi {
    fn bootstrap(&self) -> Result<Value, ApiError> {
        Ok(self.bootstrap.clone())
    }

    fn list(&self, _kind: EntityKind) -> Result<Value, ApiError> {
        Ok(json!([]))
    }

    fn get(&self, kind: EntityKind, id: i64) -> Result<Value, ApiError> {
        Err(ApiError::Rejected(format!("no {} {id} here", kind.label())))
    }

    fn create(&self, _kind: EntityKind, payload: &Value) -> Result<Value, ApiError> {
        if self.fail_writes {
            return Err(ApiError::Rejected("write rejected".to_string()));
        }
        let mut saved = payload.clone();
        let mut next = self.next_id.borrow_mut();
        saved["id"] = json!(*next);
        *next += 1;
        Ok(saved)
    }

    fn update(&self, _kind: EntityKind, _id: i64, _payload: &Value) -> Result<Value, ApiError> {
        Err(ApiError::Rejected("write rejected".to_string()))
    }

    fn delete(&self, _kind: EntityKind, _id: i64) -> Result<Option<Value>, ApiError> {
        if self.fail_writes {
            return Err(ApiError::Rejected("write rejected".to_string()));
        }
        Ok(None)
    }

    fn restore(&self, _kind: EntityKind, _id: i64) -> Result<Value, ApiError> {
        Err(ApiError::Rejected("write rejected".to_string()))
    }

    fn fetch_media(&self, _media_ref: &str) -> Result<Vec<u8>, ApiError> {
        Err(ApiError::Network("no media in tests".to_string()))
    }

    fn export_csv(&self, _kind: EntityKind, _query: &[(&str, String)]) -> Result<Vec<u8>, ApiError> {
        Ok(b"date,studentId,kind\n".to_vec())
    }
}

/// Demo-mode store over in-process storage, seeded with the demo dataset.
pub fn offline_store() -> ReplicaStore {
    ReplicaStore::open(Box::new(MemoryKv::new()), None).expect("open store")
}

/// Signed-in store talking to the given mock.
pub fn online_store(api: MockApi) -> ReplicaStore {
    let mut store =
        ReplicaStore::open(Box::new(MemoryKv::new()), Some(Box::new(api))).expect("open store");
    store.login_with_token("test-token").expect("login");
    store
}
