use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

#[test]
fn line_protocol_round_trip() {
    let dir = std::env::temp_dir().join(format!(
        "rollcall-ipc-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));

    let mut child = Command::new(env!("CARGO_BIN_EXE_rollcalld"))
        .env("ROLLCALL_WORKSPACE", &dir)
        .env_remove("ROLLCALL_API_URL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn sidecar");

    {
        let mut stdin = child.stdin.take().expect("stdin");
        for req in [
            json!({ "id": "1", "method": "health" }),
            json!({ "id": "2", "method": "students.list", "params": {} }),
            json!({ "id": "3", "method": "attendance.record", "params": {
                "studentId": 1, "kind": "IN", "source": "MANUAL"
            }}),
            json!({ "id": "4", "method": "students.get", "params": { "id": 999 } }),
            json!({ "id": "5", "method": "no.such.method" }),
        ] {
            writeln!(stdin, "{req}").expect("write request");
        }
    }

    let out = child.wait_with_output().expect("wait");
    assert!(out.status.success());
    let lines: Vec<Value> = BufReader::new(&out.stdout[..])
        .lines()
        .map(|l| serde_json::from_str(&l.expect("line")).expect("json"))
        .collect();
    assert_eq!(lines.len(), 5);

    assert_eq!(lines[0]["ok"], json!(true));
    assert!(lines[0]["result"]["version"].is_string());
    assert_eq!(lines[0]["result"]["remote"], json!(false));

    assert_eq!(lines[1]["ok"], json!(true));
    assert_eq!(lines[1]["result"].as_array().expect("students").len(), 3);

    assert_eq!(lines[2]["ok"], json!(true));
    assert_eq!(lines[2]["result"]["studentId"], json!(1));
    assert_eq!(lines[2]["result"]["kind"], json!("IN"));
    // Offline capture mints an evidence ref for this student.
    assert!(lines[2]["result"]["evidenceRef"].is_string());

    assert_eq!(lines[3]["ok"], json!(false));
    assert_eq!(lines[3]["error"]["code"], json!("not_found"));

    assert_eq!(lines[4]["ok"], json!(false));
    assert_eq!(lines[4]["error"]["code"], json!("not_implemented"));

    let _ = std::fs::remove_dir_all(&dir);
}
