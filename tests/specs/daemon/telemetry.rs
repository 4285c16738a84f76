// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry write specs: upserts over RPC and their merge behavior.

use crate::specs::support::{enveloped, TestDaemon};
use serde_json::json;

#[tokio::test]
async fn session_fill_in_preserves_identity_columns() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = TestDaemon::start(dir.path()).await;

    let response = daemon
        .call(
            "upsertSession",
            enveloped("session", json!({ "id": "s1", "title": "Draft", "createdAt": 1000 })),
        )
        .await;
    assert_eq!(response.result.unwrap()["ok"], true);

    let response = daemon
        .call(
            "upsertSession",
            enveloped(
                "session",
                json!({ "id": "s1", "title": null, "model": "m1", "updatedAt": 2000 }),
            ),
        )
        .await;
    assert_eq!(response.result.unwrap()["ok"], true);

    let row = {
        let storage = daemon.state.storage.lock();
        storage.get_session("s1").unwrap().session
    };
    assert_eq!(row.title.as_deref(), Some("Draft"));
    assert_eq!(row.model.as_deref(), Some("m1"));
    assert_eq!(row.created_at, Some(1000));
    assert_eq!(row.updated_at, Some(2000));

    daemon.stop().await;
}

#[tokio::test]
async fn full_event_stream_for_one_session() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = TestDaemon::start(dir.path()).await;

    daemon
        .call(
            "upsertSession",
            enveloped(
                "session",
                json!({ "id": "s1", "source": "claude-code", "createdAt": 1 }),
            ),
        )
        .await;
    daemon
        .call(
            "upsertMessage",
            enveloped(
                "message",
                json!({
                    "id": "m1", "sessionId": "s1", "role": "assistant",
                    "textContent": "working on it", "createdAt": 2,
                }),
            ),
        )
        .await;
    daemon
        .call(
            "upsertTool",
            enveloped(
                "tool",
                json!({
                    "id": "t1", "sessionId": "s1", "messageId": "m1",
                    "toolName": "Edit", "filePath": "src/main.rs",
                    "success": true, "durationMs": 42, "createdAt": 3,
                }),
            ),
        )
        .await;
    daemon
        .call(
            "upsertSessionError",
            enveloped(
                "error",
                json!({
                    "id": "e1", "sessionId": "s1",
                    "errorType": "rate_limit", "errorMessage": "429", "createdAt": 4,
                }),
            ),
        )
        .await;
    daemon
        .call(
            "upsertCompactionEvent",
            enveloped(
                "event",
                json!({
                    "id": "c1", "sessionId": "s1",
                    "tokensBefore": 9000, "tokensAfter": 2000,
                    "messagesBefore": 40, "messagesAfter": 8, "createdAt": 5,
                }),
            ),
        )
        .await;

    let storage = daemon.state.storage.lock();
    let detail = storage.get_session("s1").unwrap();
    assert_eq!(detail.messages.len(), 1);
    assert_eq!(detail.messages[0].text_content.as_deref(), Some("working on it"));

    let tools = storage.execute_query("SELECT tool_name, file_path FROM tools").unwrap();
    assert_eq!(tools.rows[0]["tool_name"], "Edit");
    assert_eq!(tools.rows[0]["file_path"], "src/main.rs");

    let errors = storage.execute_query("SELECT error_type FROM session_errors").unwrap();
    assert_eq!(errors.rows[0]["error_type"], "rate_limit");

    let compactions =
        storage.execute_query("SELECT tokens_before, tokens_after FROM compaction_events").unwrap();
    assert_eq!(compactions.rows[0]["tokens_before"], 9000);
    assert_eq!(compactions.rows[0]["tokens_after"], 2000);
    drop(storage);

    daemon.stop().await;
}

#[tokio::test]
async fn concurrent_clients_serialize_on_the_single_connection() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = TestDaemon::start(dir.path()).await;

    daemon
        .call("upsertSession", enveloped("session", json!({ "id": "s1", "createdAt": 0 })))
        .await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let socket = daemon.config.socket_path.clone();
        handles.push(tokio::spawn(async move {
            let stream = tokio::net::UnixStream::connect(&socket).await.expect("connect");
            let (mut reader, mut writer) = tokio::io::split(stream);
            let params = crate::specs::support::enveloped(
                "message",
                json!({ "id": format!("m{}", i), "sessionId": "s1", "createdAt": i }),
            );
            let body = clankers_wire::encode(&clankers_wire::RpcRequest::new(
                1,
                "upsertMessage",
                params,
            ))
            .expect("encode");
            clankers_wire::write_frame(&mut writer, &body).await.expect("write");
            let response = clankers_wire::read_frame(&mut reader).await.expect("read");
            let response: clankers_wire::RpcResponse =
                clankers_wire::decode(&response).expect("decode");
            assert!(response.error.is_none());
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let count = daemon.state.storage.lock().list_messages("s1").unwrap().len();
    assert_eq!(count, 16);

    daemon.stop().await;
}
