mod common;

use axum::http::Method;
use camunda::{
    DefinitionRef, Error, IdentityLink, Instruction, Variable, VariableInstanceQuery, VariableScope,
};
use common::MockEngine;
use serde_json::json;

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_owned(), value.to_owned())
}

#[tokio::test]
async fn message_subscription_of_execution() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::GET,
            "/engine-rest/execution/ex-1/messageSubscriptions/payment-received",
            json!({
                "id": "sub-1",
                "eventType": "message",
                "eventName": "payment-received",
                "executionId": "ex-1",
                "processInstanceId": "pi-1",
                "activityId": "WaitForPayment",
                "createdDate": "2024-01-02T03:04:05.000+0000"
            }),
        )
        .on_empty(
            Method::POST,
            "/engine-rest/execution/ex-1/messageSubscriptions/payment-received/trigger",
        );
    let client = engine.client();

    let subscription = client
        .get_message_subscription("ex-1", "payment-received")
        .send()
        .await
        .unwrap();
    client
        .trigger_message_subscription("ex-1", "payment-received")
        .with_variable("amount", Variable::long(120))
        .send()
        .await
        .unwrap();

    assert_eq!(subscription.event_name, "payment-received");
    assert_eq!(subscription.activity_id.as_deref(), Some("WaitForPayment"));
    let body = engine
        .single(
            Method::POST,
            "/engine-rest/execution/ex-1/messageSubscriptions/payment-received/trigger",
        )
        .json();
    assert_eq!(body, json!({"variables": {"amount": {"value": 120, "type": "Long"}}}));
}

#[tokio::test]
async fn signal_execution_without_variables_sends_empty_object() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/execution/ex-2/signal");

    engine.client().trigger_execution("ex-2").send().await.unwrap();

    let body = engine
        .single(Method::POST, "/engine-rest/execution/ex-2/signal")
        .json();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn task_local_variable_is_updated_and_deleted() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::PUT, "/engine-rest/task/task-1/localVariables/approved")
        .on_empty(Method::DELETE, "/engine-rest/task/task-1/localVariables/draft");
    let client = engine.client();

    client
        .update_variable(VariableScope::task_local("task-1"), "approved", Variable::boolean(true))
        .send()
        .await
        .unwrap();
    client
        .delete_variable(VariableScope::task_local("task-1"), "draft")
        .send()
        .await
        .unwrap();

    let body = engine
        .single(Method::PUT, "/engine-rest/task/task-1/localVariables/approved")
        .json();
    assert_eq!(body, json!({"value": true, "type": "Boolean"}));
    engine.single(Method::DELETE, "/engine-rest/task/task-1/localVariables/draft");
}

#[tokio::test]
async fn process_instance_variables_are_modified_in_one_call() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/process-instance/pi-1/variables");

    engine
        .client()
        .modify_variables(VariableScope::process_instance("pi-1"))
        .with_variable("creditor", Variable::string("Great Pizza"))
        .with_deletion("draft")
        .send()
        .await
        .unwrap();

    let body = engine
        .single(Method::POST, "/engine-rest/process-instance/pi-1/variables")
        .json();
    assert_eq!(
        body,
        json!({
            "modifications": {"creditor": {"value": "Great Pizza", "type": "String"}},
            "deletions": ["draft"]
        })
    );
}

#[tokio::test]
async fn empty_variable_modification_is_rejected_locally() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .modify_variables(VariableScope::execution_local("ex-1"))
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn execution_local_variables_are_read_with_deserialization_flag() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/execution/ex-1/localVariables",
        json!({"amount": {"value": 30, "type": "Integer", "valueInfo": {}}}),
    );

    let variables = engine
        .client()
        .get_variables(VariableScope::execution_local("ex-1"))
        .with_deserialize_values(false)
        .send()
        .await
        .unwrap();

    assert_eq!(variables["amount"].value_as::<i32>().unwrap(), 30);
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/execution/ex-1/localVariables")
            .query_pairs(),
        vec![pair("deserializeValues", "false")]
    );
}

#[tokio::test]
async fn variable_instances_are_listed_and_downloaded() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::GET,
            "/engine-rest/variable-instance",
            json!([{
                "id": "var-1",
                "name": "invoice",
                "type": "File",
                "value": null,
                "valueInfo": {"filename": "invoice.pdf"},
                "processInstanceId": "pi-1"
            }]),
        )
        .on_text(Method::GET, "/engine-rest/variable-instance/var-1/data", "%PDF-1.4");
    let client = engine.client();

    let instances = client
        .get_variable_instance_list(
            VariableInstanceQuery::new()
                .with_variable_name("invoice")
                .with_process_instance_ids(vec!["pi-1".to_owned(), "pi-2".to_owned()]),
        )
        .send()
        .await
        .unwrap();
    let data = client
        .get_variable_instance_data(&instances[0].id)
        .send()
        .await
        .unwrap();

    assert_eq!(instances[0].variable.value_type.as_deref(), Some("File"));
    assert_eq!(data, b"%PDF-1.4".to_vec());
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/variable-instance")
            .query_pairs(),
        vec![
            pair("variableName", "invoice"),
            pair("processInstanceIdIn", "pi-1,pi-2"),
        ]
    );
}

#[tokio::test]
async fn modify_process_instance_keeps_instruction_order() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/process-instance/pi-1/modification");

    engine
        .client()
        .modify_process_instance("pi-1")
        .with_instruction(Instruction::cancel_activity("ReviewInvoice"))
        .with_instruction(
            Instruction::start_before_activity("ApproveInvoice")
                .with_variable("approver", Variable::string("mary"), true),
        )
        .with_skip_custom_listeners(true)
        .with_annotation("moved back to approval")
        .send()
        .await
        .unwrap();

    let body = engine
        .single(Method::POST, "/engine-rest/process-instance/pi-1/modification")
        .json();
    assert_eq!(
        body,
        json!({
            "skipCustomListeners": true,
            "instructions": [
                {"type": "cancel", "activityId": "ReviewInvoice"},
                {
                    "type": "startBeforeActivity",
                    "activityId": "ApproveInvoice",
                    "variables": {"approver": {"value": "mary", "type": "String", "local": true}}
                }
            ],
            "annotation": "moved back to approval"
        })
    );
}

#[tokio::test]
async fn modify_process_instance_requires_an_instruction() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .modify_process_instance("pi-1")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn delete_process_instances_async_returns_batch() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/process-instance/delete",
        json!({
            "id": "batch-1",
            "type": "instance-deletion",
            "totalJobs": 2,
            "batchJobsPerSeed": 100,
            "invocationsPerBatchJob": 1
        }),
    );

    let batch = engine
        .client()
        .delete_process_instances_async()
        .with_process_instance_ids(vec!["pi-1".to_owned(), "pi-2".to_owned()])
        .with_delete_reason("cleanup")
        .with_skip_subprocesses(true)
        .send()
        .await
        .unwrap();

    assert_eq!(batch.id, "batch-1");
    assert_eq!(batch.total_jobs, 2);
    let body = engine
        .single(Method::POST, "/engine-rest/process-instance/delete")
        .json();
    assert_eq!(
        body,
        json!({
            "processInstanceIds": ["pi-1", "pi-2"],
            "deleteReason": "cleanup",
            "skipSubprocesses": true
        })
    );
}

#[tokio::test]
async fn delete_definitions_by_tenant_key() {
    let engine = MockEngine::start().await;
    engine.on_empty(
        Method::DELETE,
        "/engine-rest/process-definition/key/invoice/tenant-id/tenant-one/delete",
    );

    engine
        .client()
        .delete_process_definition(DefinitionRef::tenant_key("invoice", "tenant-one"))
        .with_cascade(true)
        .send()
        .await
        .unwrap();

    let request = engine.single(
        Method::DELETE,
        "/engine-rest/process-definition/key/invoice/tenant-id/tenant-one/delete",
    );
    assert_eq!(request.query_pairs(), vec![pair("cascade", "true")]);
}

#[tokio::test]
async fn activity_statistics_are_addressed_by_definition() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/process-definition/key/invoice/statistics",
        json!([{
            "id": "ApproveInvoice",
            "instances": 4,
            "failedJobs": 1,
            "incidents": [{"incidentType": "failedJob", "incidentCount": 1}]
        }]),
    );

    let statistics = engine
        .client()
        .get_activity_instance_statistics(DefinitionRef::key("invoice"))
        .with_failed_jobs(true)
        .with_incidents(true)
        .send()
        .await
        .unwrap();

    assert_eq!(statistics[0].id, "ApproveInvoice");
    assert_eq!(statistics[0].incidents[0].incident_count, 1);
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/process-definition/key/invoice/statistics")
            .query_pairs(),
        vec![pair("failedJobs", "true"), pair("incidents", "true")]
    );
}

#[tokio::test]
async fn process_definition_statistics_cover_all_definitions() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/process-definition/statistics",
        json!([{
            "id": "invoice:1:pd-1",
            "instances": 7,
            "definition": {"id": "invoice:1:pd-1", "key": "invoice", "version": 1}
        }]),
    );

    let statistics = engine
        .client()
        .get_process_definition_statistics()
        .with_incidents_for_type("failedJob")
        .send()
        .await
        .unwrap();

    assert_eq!(statistics[0].instances, 7);
    assert_eq!(statistics[0].definition.key, "invoice");
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/process-definition/statistics")
            .query_pairs(),
        vec![pair("incidentsForType", "failedJob")]
    );
}

#[tokio::test]
async fn statistics_reject_both_incident_flags() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .get_process_definition_statistics()
        .with_incidents(true)
        .with_incidents_for_type("failedJob")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn task_identity_links_are_added_and_deleted() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::POST, "/engine-rest/task/task-1/identity-links")
        .on_empty(Method::POST, "/engine-rest/task/task-1/identity-links/delete")
        .on(
            Method::GET,
            "/engine-rest/task/task-1/identity-links",
            json!([{"userId": null, "groupId": "accounting", "type": "candidate"}]),
        );
    let client = engine.client();

    client
        .add_task_identity_link("task-1", IdentityLink::group("accounting", "candidate"))
        .send()
        .await
        .unwrap();
    client
        .delete_task_identity_link("task-1", IdentityLink::user("jonny", "assignee"))
        .send()
        .await
        .unwrap();
    let links = client.get_task_identity_links("task-1").send().await.unwrap();

    assert_eq!(links, vec![IdentityLink::group("accounting", "candidate")]);
    assert_eq!(
        engine
            .single(Method::POST, "/engine-rest/task/task-1/identity-links")
            .json(),
        json!({"groupId": "accounting", "type": "candidate"})
    );
    assert_eq!(
        engine
            .single(Method::POST, "/engine-rest/task/task-1/identity-links/delete")
            .json(),
        json!({"userId": "jonny", "type": "assignee"})
    );
}

#[tokio::test]
async fn task_comment_is_created_and_read_back() {
    let engine = MockEngine::start().await;
    let comment = json!({
        "id": "c-1",
        "userId": "jonny",
        "taskId": "task-1",
        "time": "2024-01-02T03:04:05.000+0000",
        "message": "checked the amount"
    });
    engine
        .on(Method::POST, "/engine-rest/task/task-1/comment/create", comment.clone())
        .on(Method::GET, "/engine-rest/task/task-1/comment/c-1", comment.clone())
        .on(Method::GET, "/engine-rest/task/task-1/comment", json!([comment]));
    let client = engine.client();

    let created = client
        .create_task_comment("task-1", "checked the amount")
        .send()
        .await
        .unwrap();
    let fetched = client.get_task_comment("task-1", &created.id).send().await.unwrap();
    let all = client.get_task_comments("task-1").send().await.unwrap();

    assert_eq!(created, fetched);
    assert_eq!(all, vec![created]);
    assert_eq!(
        engine
            .single(Method::POST, "/engine-rest/task/task-1/comment/create")
            .json(),
        json!({"message": "checked the amount"})
    );
}

#[tokio::test]
async fn evaluate_condition_starts_matching_instances() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/condition",
        json!([{"id": "pi-7", "definitionId": "loan:1:pd-1", "businessKey": "LOAN-1"}]),
    );

    let instances = engine
        .client()
        .evaluate_condition()
        .with_variable("temperature", Variable::integer(24))
        .with_business_key("LOAN-1")
        .with_tenant_id("tenant-one")
        .send()
        .await
        .unwrap();

    assert_eq!(instances[0].id, "pi-7");
    let body = engine.single(Method::POST, "/engine-rest/condition").json();
    assert_eq!(
        body,
        json!({
            "variables": {"temperature": {"value": 24, "type": "Integer"}},
            "businessKey": "LOAN-1",
            "tenantId": "tenant-one"
        })
    );
}

#[tokio::test]
async fn throw_signal_to_execution() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/signal");

    engine
        .client()
        .throw_signal()
        .with_name("alert")
        .with_execution_id("ex-1")
        .with_variable("level", Variable::string("high"))
        .send()
        .await
        .unwrap();

    let body = engine.single(Method::POST, "/engine-rest/signal").json();
    assert_eq!(body["name"], "alert");
    assert_eq!(body["executionId"], "ex-1");
    assert_eq!(body["variables"]["level"]["value"], "high");
}

#[tokio::test]
async fn throw_signal_rejects_conflicting_tenant_flags() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .throw_signal()
        .with_name("alert")
        .with_tenant_id("tenant-one")
        .without_tenant_id()
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}
