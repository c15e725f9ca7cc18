use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use rollcalld::ipc::{handle_request, AppState, Request};
use rollcalld::remote::{HttpApi, RemoteApi};
use rollcalld::storage::{KeyValue, SqliteKv};
use rollcalld::store::ReplicaStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let workspace = std::env::var_os("ROLLCALL_WORKSPACE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let kv: Box<dyn KeyValue> = match SqliteKv::open(&workspace) {
        Ok(kv) => Box::new(kv),
        Err(e) => {
            tracing::error!(error = %e, workspace = %workspace.display(), "cannot open workspace storage");
            std::process::exit(1);
        }
    };

    let api: Option<Box<dyn RemoteApi>> = std::env::var("ROLLCALL_API_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .map(|url| Box::new(HttpApi::new(url)) as Box<dyn RemoteApi>);

    let store = match ReplicaStore::open(kv, api) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "store initialization failed");
            std::process::exit(1);
        }
    };
    let mut state = AppState { store };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; ignore.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
