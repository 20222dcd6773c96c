mod common;

use axum::http::Method;
use camunda::{Client, Error, FetchTopic, LockedExternalTask};
use common::MockEngine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

fn locked_task(id: &str, variables: Value) -> Value {
    json!([{
        "id": id,
        "workerId": "invoice-worker",
        "topicName": "approve-invoice",
        "processInstanceId": "pi-1",
        "priority": 0,
        "variables": variables
    }])
}

#[derive(Deserialize)]
struct Invoice {
    amount: i64,
    creditor: String,
}

#[derive(Serialize)]
struct Approval {
    approved: bool,
    approver: String,
}

async fn approve(_client: Client, invoice: Invoice) -> Result<Approval, String> {
    if invoice.amount > 1000 {
        return Err(format!("{} exceeds the approval limit", invoice.amount));
    }
    Ok(Approval {
        approved: true,
        approver: format!("bot for {}", invoice.creditor),
    })
}

#[tokio::test]
async fn worker_requires_topic_and_handler() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .external_task_worker()
        .with_topic("approve-invoice")
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameters(_)));

    let err = engine
        .client()
        .external_task_worker()
        .with_handler(|_client: Client, _task: LockedExternalTask| async {})
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameters(_)));
}

#[tokio::test]
async fn worker_dispatches_fetched_tasks_to_handler() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::POST,
            "/engine-rest/external-task/fetchAndLock",
            locked_task("et-1", json!({})),
        )
        .on_empty(Method::POST, "/engine-rest/external-task/et-1/complete");

    let worker = engine
        .client()
        .external_task_worker()
        .with_topic("approve-invoice")
        .with_worker_id("invoice-worker")
        .with_lock_duration(Duration::from_secs(30))
        .with_long_poll_timeout(None)
        .with_poll_interval(Duration::from_millis(10))
        .with_handler(|client: Client, task: LockedExternalTask| async move {
            let _ = client
                .complete_external_task(&task.id, task.worker_id)
                .send()
                .await;
        })
        .run();

    tokio::select! {
        _ = worker => panic!("worker stopped"),
        _ = engine.wait_for(Method::POST, "/engine-rest/external-task/et-1/complete") => {}
    }

    let fetch = engine
        .request(Method::POST, "/engine-rest/external-task/fetchAndLock")
        .unwrap()
        .json();
    assert_eq!(fetch["workerId"], "invoice-worker");
    assert_eq!(fetch["topics"][0]["topicName"], "approve-invoice");
    assert_eq!(fetch["topics"][0]["lockDuration"], 30000);
    assert!(fetch.get("asyncResponseTimeout").is_none());
}

#[tokio::test]
async fn lock_duration_applies_to_fetch_topic_in_any_order() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/external-task/fetchAndLock",
        json!([]),
    );

    let worker = engine
        .client()
        .external_task_worker()
        .with_lock_duration(Duration::from_secs(45))
        .with_fetch_topic(
            FetchTopic::new("approve-invoice", Duration::from_secs(600))
                .with_variables(vec!["amount".to_owned()]),
        )
        .with_long_poll_timeout(None)
        .with_poll_interval(Duration::from_millis(10))
        .with_handler(|_client: Client, _task: LockedExternalTask| async {})
        .run();

    let fetch = tokio::select! {
        _ = worker => panic!("worker stopped"),
        request = engine.wait_for(Method::POST, "/engine-rest/external-task/fetchAndLock") => request,
    };

    assert_eq!(
        fetch.json()["topics"],
        json!([{"topicName": "approve-invoice", "lockDuration": 45000, "variables": ["amount"]}])
    );
}

#[tokio::test]
async fn auto_handler_completes_with_output_variables() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::POST,
            "/engine-rest/external-task/fetchAndLock",
            locked_task(
                "et-2",
                json!({
                    "amount": {"value": 300, "type": "Long", "valueInfo": {}},
                    "creditor": {"value": "Great Pizza", "type": "String", "valueInfo": {}}
                }),
            ),
        )
        .on_empty(Method::POST, "/engine-rest/external-task/et-2/complete");

    let worker = engine
        .client()
        .external_task_worker()
        .with_topic("approve-invoice")
        .with_worker_id("invoice-worker")
        .with_poll_interval(Duration::from_millis(10))
        .with_auto_handler(approve)
        .run();

    let complete = tokio::select! {
        _ = worker => panic!("worker stopped"),
        request = engine.wait_for(Method::POST, "/engine-rest/external-task/et-2/complete") => request,
    };

    let body = complete.json();
    assert_eq!(body["workerId"], "invoice-worker");
    assert_eq!(body["variables"]["approved"]["value"], true);
    assert_eq!(body["variables"]["approver"]["value"], "bot for Great Pizza");
}

#[tokio::test]
async fn auto_handler_reports_failure_on_error() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::POST,
            "/engine-rest/external-task/fetchAndLock",
            locked_task(
                "et-3",
                json!({
                    "amount": {"value": 5000, "type": "Long", "valueInfo": {}},
                    "creditor": {"value": "Steakhouse", "type": "String", "valueInfo": {}}
                }),
            ),
        )
        .on_empty(Method::POST, "/engine-rest/external-task/et-3/failure");

    let worker = engine
        .client()
        .external_task_worker()
        .with_topic("approve-invoice")
        .with_poll_interval(Duration::from_millis(10))
        .with_auto_handler(approve)
        .run();

    let failure = tokio::select! {
        _ = worker => panic!("worker stopped"),
        request = engine.wait_for(Method::POST, "/engine-rest/external-task/et-3/failure") => request,
    };

    let body = failure.json();
    assert_eq!(body["workerId"], "invoice-worker");
    assert_eq!(body["errorMessage"], "5000 exceeds the approval limit");
    assert_eq!(body["retries"], 0);
    assert!(engine
        .request(Method::POST, "/engine-rest/external-task/et-3/complete")
        .is_none());
}

#[tokio::test]
async fn auto_handler_reports_failure_for_mismatched_variables() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::POST,
            "/engine-rest/external-task/fetchAndLock",
            locked_task(
                "et-4",
                json!({"amount": {"value": "lots", "type": "String", "valueInfo": {}}}),
            ),
        )
        .on_empty(Method::POST, "/engine-rest/external-task/et-4/failure");

    let worker = engine
        .client()
        .external_task_worker()
        .with_topic("approve-invoice")
        .with_poll_interval(Duration::from_millis(10))
        .with_auto_handler(approve)
        .run();

    let failure = tokio::select! {
        _ = worker => panic!("worker stopped"),
        request = engine.wait_for(Method::POST, "/engine-rest/external-task/et-4/failure") => request,
    };

    let message = failure.json()["errorMessage"].as_str().unwrap_or_default().to_owned();
    assert!(message.starts_with("variables do not deserialize to expected type"));
}
