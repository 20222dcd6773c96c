mod common;

use axum::http::{Method, StatusCode};
use camunda::{
    Client, ClientConfig, Credentials, DefinitionRef, Error, FetchTopic, ProcessInstanceQuery,
    ProcessInstanceSortKey, SortOrder, TaskQuery, Variable, VariableFilter,
};
use common::MockEngine;
use serde_json::json;
use std::time::Duration;

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_owned(), value.to_owned())
}

#[tokio::test]
async fn version_is_read_from_server_root() {
    let engine = MockEngine::start().await;
    engine.on(Method::GET, "/engine-rest/version", json!({"version": "7.20.0"}));

    let client = Client::from_config(engine.config().with_engine("payroll")).unwrap();
    let version = client.get_version().send().await.unwrap();

    assert_eq!(version.version, "7.20.0");
}

#[tokio::test]
async fn named_engine_prefixes_engine_scoped_paths() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/engine/payroll/process-instance/count",
        json!({"count": 4}),
    );

    let client = Client::from_config(engine.config().with_engine("payroll")).unwrap();
    let count = client
        .count_process_instances(ProcessInstanceQuery::new())
        .send()
        .await
        .unwrap();

    assert_eq!(count, 4);
}

#[tokio::test]
async fn basic_auth_header_is_sent() {
    let engine = MockEngine::start().await;
    engine.on(Method::GET, "/engine-rest/task/count", json!({"count": 0}));

    let client = Client::from_config(
        engine
            .config()
            .with_credentials(Credentials::new("demo", "demo")),
    )
    .unwrap();
    client.count_tasks(TaskQuery::new()).send().await.unwrap();

    let request = engine.request(Method::GET, "/engine-rest/task/count").unwrap();
    // base64 of `demo:demo`
    assert_eq!(request.authorization.as_deref(), Some("Basic ZGVtbzpkZW1v"));
}

#[tokio::test]
async fn deployment_uploads_resources_as_multipart() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/deployment/create",
        json!({
            "id": "dep-1",
            "name": "invoice",
            "deploymentTime": "2024-01-02T03:04:05.000+0000",
            "deployedProcessDefinitions": {
                "invoice:1:pd-1": {
                    "id": "invoice:1:pd-1",
                    "key": "invoice",
                    "version": 1,
                    "suspended": false,
                    "startableInCockpit": true
                }
            }
        }),
    );

    let deployment = engine
        .client()
        .create_deployment("invoice")
        .with_duplicate_filtering(true)
        .with_resource("invoice.bpmn", "<definitions/>")
        .send()
        .await
        .unwrap();

    assert_eq!(deployment.deployment.id, "dep-1");
    assert_eq!(deployment.process_definitions().len(), 1);

    let body = engine
        .request(Method::POST, "/engine-rest/deployment/create")
        .unwrap()
        .text();
    assert!(body.contains("name=\"deployment-name\""));
    assert!(body.contains("name=\"enable-duplicate-filtering\""));
    assert!(body.contains("filename=\"invoice.bpmn\""));
    assert!(body.contains("<definitions/>"));
}

#[tokio::test]
async fn deployment_without_resources_is_rejected_locally() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .create_deployment("empty")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn start_process_instance_by_key() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/process-definition/key/invoice/start",
        json!({
            "id": "pi-1",
            "definitionId": "invoice:1:pd-1",
            "businessKey": "INV-1001",
            "ended": false,
            "suspended": false
        }),
    );

    let started = engine
        .client()
        .start_process_instance(DefinitionRef::key("invoice"))
        .with_business_key("INV-1001")
        .with_variable("amount", Variable::integer(300))
        .send()
        .await
        .unwrap();

    assert_eq!(started.instance.id, "pi-1");
    assert_eq!(started.instance.business_key.as_deref(), Some("INV-1001"));

    let body = engine
        .request(Method::POST, "/engine-rest/process-definition/key/invoice/start")
        .unwrap()
        .json();
    assert_eq!(body["businessKey"], "INV-1001");
    assert_eq!(body["variables"]["amount"], json!({"value": 300, "type": "Integer"}));
}

#[tokio::test]
async fn tenant_definition_paths_are_encoded() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/process-definition/key/invoice/tenant-id/tenant%20one/start",
        json!({"id": "pi-2", "definitionId": "invoice:2:pd-2"}),
    );

    let started = engine
        .client()
        .start_process_instance(DefinitionRef::tenant_key("invoice", "tenant one"))
        .send()
        .await
        .unwrap();

    assert_eq!(started.instance.id, "pi-2");
}

#[tokio::test]
async fn list_binds_filters_paging_and_sorting() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/process-instance",
        json!([
            {"id": "pi-1", "definitionId": "invoice:1:pd-1", "businessKey": "INV-1"},
            {"id": "pi-2", "definitionId": "invoice:1:pd-1", "businessKey": "INV-2"}
        ]),
    );

    let instances = engine
        .client()
        .get_process_instance_list(
            ProcessInstanceQuery::new()
                .with_process_definition_keys(vec!["invoice".to_owned(), "order".to_owned()])
                .with_variable(VariableFilter::eq("amount", 300))
                .active(),
        )
        .with_first_result(10)
        .with_max_results(5)
        .with_sort_by(ProcessInstanceSortKey::InstanceId, SortOrder::Desc)
        .send()
        .await
        .unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[1].business_key.as_deref(), Some("INV-2"));

    let query = engine
        .request(Method::GET, "/engine-rest/process-instance")
        .unwrap()
        .query_pairs();
    assert!(query.contains(&pair("processDefinitionKeyIn", "invoice,order")));
    assert!(query.contains(&pair("variables", "amount_eq_300")));
    assert!(query.contains(&pair("active", "true")));
    assert!(query.contains(&pair("firstResult", "10")));
    assert!(query.contains(&pair("maxResults", "5")));
    assert!(query.contains(&pair("sortBy", "instanceId")));
    assert!(query.contains(&pair("sortOrder", "desc")));
    assert!(!query.iter().any(|(key, _)| key == "suspended"));
}

#[tokio::test]
async fn count_shares_the_list_filter() {
    let engine = MockEngine::start().await;
    engine.on(Method::GET, "/engine-rest/task/count", json!({"count": 3}));

    let count = engine
        .client()
        .count_tasks(TaskQuery::new().with_assignee("demo"))
        .send()
        .await
        .unwrap();

    assert_eq!(count, 3);
    let query = engine
        .request(Method::GET, "/engine-rest/task/count")
        .unwrap()
        .query_pairs();
    assert_eq!(query, vec![pair("assignee", "demo")]);
}

#[tokio::test]
async fn not_found_maps_engine_error_body() {
    let engine = MockEngine::start().await;
    engine.on_error(
        Method::GET,
        "/engine-rest/process-instance/missing",
        StatusCode::NOT_FOUND,
        "Process instance with id missing does not exist",
    );

    let err = engine
        .client()
        .get_process_instance("missing")
        .send()
        .await
        .unwrap_err();

    match &err {
        Error::NotFound(api) => {
            assert_eq!(api.kind.as_deref(), Some("InvalidRequestException"));
            assert_eq!(api.message, "Process instance with id missing does not exist");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.api_error().map(|api| api.status.as_u16()), Some(404));
}

#[tokio::test]
async fn server_errors_map_to_internal_server_error() {
    let engine = MockEngine::start().await;
    engine.on_error(
        Method::POST,
        "/engine-rest/task/t-1/complete",
        StatusCode::INTERNAL_SERVER_ERROR,
        "boom",
    );

    let err = engine
        .client()
        .complete_task("t-1")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InternalServerError(ref api) if api.message == "boom"));
}

#[tokio::test]
async fn complete_task_without_content() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/task/t-1/complete");

    let variables = engine
        .client()
        .complete_task("t-1")
        .with_variable("approved", Variable::boolean(true))
        .send()
        .await
        .unwrap();

    assert!(variables.is_none());
    let body = engine
        .request(Method::POST, "/engine-rest/task/t-1/complete")
        .unwrap()
        .json();
    assert_eq!(body["variables"]["approved"], json!({"value": true, "type": "Boolean"}));
}

#[tokio::test]
async fn fetch_and_lock_then_complete() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::POST,
            "/engine-rest/external-task/fetchAndLock",
            json!([{
                "id": "et-1",
                "workerId": "payments",
                "topicName": "payment-service",
                "processInstanceId": "pi-1",
                "lockExpirationTime": "2024-01-02T03:09:05.000+0000",
                "retries": null,
                "priority": 0,
                "variables": {"amount": {"value": 300, "type": "Integer", "valueInfo": {}}}
            }]),
        )
        .on_empty(Method::POST, "/engine-rest/external-task/et-1/complete");
    let client = engine.client();

    let tasks = client
        .fetch_and_lock("payments")
        .with_max_tasks(10)
        .with_topic(
            FetchTopic::new("payment-service", Duration::from_secs(60))
                .with_variables(vec!["amount".to_owned()]),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].variables["amount"].value_as::<i32>().unwrap(), 300);

    client
        .complete_external_task(&tasks[0].id, "payments")
        .with_variable("paid", Variable::boolean(true))
        .send()
        .await
        .unwrap();

    let fetch = engine
        .request(Method::POST, "/engine-rest/external-task/fetchAndLock")
        .unwrap()
        .json();
    assert_eq!(fetch["workerId"], "payments");
    assert_eq!(fetch["maxTasks"], 10);
    assert_eq!(
        fetch["topics"],
        json!([{"topicName": "payment-service", "lockDuration": 60000, "variables": ["amount"]}])
    );

    let complete = engine
        .request(Method::POST, "/engine-rest/external-task/et-1/complete")
        .unwrap()
        .json();
    assert_eq!(complete["workerId"], "payments");
    assert_eq!(complete["variables"]["paid"]["value"], true);
}

#[tokio::test]
async fn long_poll_outlasts_client_request_timeout() {
    let engine = MockEngine::start().await;
    engine.on_delayed(
        Method::POST,
        "/engine-rest/external-task/fetchAndLock",
        json!([{
            "id": "et-5",
            "workerId": "payments",
            "topicName": "payment-service",
            "priority": 0
        }]),
        Duration::from_millis(1500),
    );
    let client = Client::from_config(
        engine
            .config()
            .with_request_timeout(Duration::from_millis(500)),
    )
    .unwrap();

    let tasks = client
        .fetch_and_lock("payments")
        .with_async_response_timeout(Duration::from_secs(1))
        .with_topic(FetchTopic::new("payment-service", Duration::from_secs(60)))
        .send()
        .await
        .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "et-5");
    let fetch = engine.single(Method::POST, "/engine-rest/external-task/fetchAndLock");
    assert_eq!(fetch.json()["asyncResponseTimeout"], 1000);
}

#[tokio::test]
async fn short_request_timeout_still_applies_without_long_poll() {
    let engine = MockEngine::start().await;
    engine.on_delayed(
        Method::POST,
        "/engine-rest/external-task/fetchAndLock",
        json!([]),
        Duration::from_millis(1500),
    );
    let client = Client::from_config(
        engine
            .config()
            .with_request_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client
        .fetch_and_lock("payments")
        .with_topic(FetchTopic::new("payment-service", Duration::from_secs(60)))
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn correlate_message_returns_results_when_enabled() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/message",
        json!([{
            "resultType": "ProcessDefinition",
            "processInstance": {"id": "pi-9", "definitionId": "order:1:pd-3"}
        }]),
    );

    let results = engine
        .client()
        .correlate_message()
        .with_name("order-received")
        .with_business_key("ORD-7")
        .with_process_variable("total", Variable::double(12.5))
        .with_result_enabled(true)
        .send()
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let body = engine.request(Method::POST, "/engine-rest/message").unwrap().json();
    assert_eq!(body["messageName"], "order-received");
    assert_eq!(body["businessKey"], "ORD-7");
    assert_eq!(body["resultEnabled"], true);
    assert_eq!(body["processVariables"]["total"]["type"], "Double");
}

#[tokio::test]
async fn correlate_message_requires_a_name() {
    let err = Client::from_config(ClientConfig::with_base_url("http://127.0.0.1:1/engine-rest"))
        .unwrap()
        .correlate_message()
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
}
