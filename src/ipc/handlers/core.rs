use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{require_i64, require_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "remote": state.store.remote_active(),
            "graceMinutes": state.store.grace_minutes(),
        }),
    )
}

fn handle_sync_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.refresh() {
        Ok(()) => ok(&req.id, json!({ "refreshed": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_set_grace_minutes(state: &mut AppState, req: &Request) -> serde_json::Value {
    let minutes = match require_i64(&req.id, &req.params, "minutes") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    state.store.set_grace_minutes(minutes);
    ok(&req.id, json!({ "graceMinutes": state.store.grace_minutes() }))
}

/// Bearer-authenticated media bytes land on disk, not on the wire: the
/// consumer hands over a destination path and gets the byte count back.
fn handle_media_fetch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let media_ref = match require_str(&req.id, &req.params, "ref") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let dest = match require_str(&req.id, &req.params, "dest") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let bytes = match state.store.fetch_media(&media_ref) {
        Ok(b) => b,
        Err(e) => return store_err(&req.id, &e),
    };
    match std::fs::write(&dest, &bytes) {
        Ok(()) => ok(&req.id, json!({ "path": dest, "bytes": bytes.len() })),
        Err(e) => err(&req.id, "storage_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "sync.refresh" => Some(handle_sync_refresh(state, req)),
        "settings.setGraceMinutes" => Some(handle_set_grace_minutes(state, req)),
        "media.fetch" => Some(handle_media_fetch(state, req)),
        _ => None,
    }
}
