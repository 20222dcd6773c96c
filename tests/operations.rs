mod common;

use axum::http::{Method, StatusCode};
use camunda::{
    BatchQuery, DefinitionRef, Error, IncidentQuery, IncidentType, JobDefinitionQuery,
    MigrationInstruction, MigrationPlan, Variable,
};
use chrono::{TimeZone, Utc};
use common::MockEngine;
use serde_json::json;

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_owned(), value.to_owned())
}

fn batch(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "set-job-retries",
        "totalJobs": 3,
        "jobsCreated": 1,
        "batchJobsPerSeed": 100,
        "invocationsPerBatchJob": 1,
        "suspended": false
    })
}

#[tokio::test]
async fn batch_statistics_and_suspension() {
    let engine = MockEngine::start().await;
    let mut statistics = batch("batch-1");
    statistics["remainingJobs"] = json!(2);
    statistics["completedJobs"] = json!(1);
    statistics["failedJobs"] = json!(0);
    engine
        .on(Method::GET, "/engine-rest/batch/statistics", json!([statistics]))
        .on_empty(Method::PUT, "/engine-rest/batch/batch-1/suspended")
        .on_empty(Method::DELETE, "/engine-rest/batch/batch-1");
    let client = engine.client();

    let statistics = client
        .get_batch_statistics(BatchQuery::new().with_type("set-job-retries"))
        .send()
        .await
        .unwrap();
    client.suspend_batch("batch-1").send().await.unwrap();
    client
        .delete_batch("batch-1")
        .with_cascade(true)
        .send()
        .await
        .unwrap();

    assert_eq!(statistics[0].batch.id, "batch-1");
    assert_eq!(statistics[0].remaining_jobs, 2);
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/batch/statistics")
            .query_pairs(),
        vec![pair("type", "set-job-retries")]
    );
    assert_eq!(
        engine
            .single(Method::PUT, "/engine-rest/batch/batch-1/suspended")
            .json(),
        json!({"suspended": true})
    );
    assert_eq!(
        engine
            .single(Method::DELETE, "/engine-rest/batch/batch-1")
            .query_pairs(),
        vec![pair("cascade", "true")]
    );
}

#[tokio::test]
async fn generate_then_validate_migration_plan() {
    let engine = MockEngine::start().await;
    let plan = json!({
        "sourceProcessDefinitionId": "invoice:1:pd-1",
        "targetProcessDefinitionId": "invoice:2:pd-2",
        "instructions": [{
            "sourceActivityIds": ["ReviewInvoice"],
            "targetActivityIds": ["ReviewInvoice"],
            "updateEventTrigger": false
        }]
    });
    engine
        .on(Method::POST, "/engine-rest/migration/generate", plan.clone())
        .on(
            Method::POST,
            "/engine-rest/migration/validate",
            json!({"instructionReports": [], "variableReports": {}}),
        );
    let client = engine.client();

    let generated = client
        .generate_migration_plan("invoice:1:pd-1", "invoice:2:pd-2")
        .with_update_event_triggers(true)
        .send()
        .await
        .unwrap();
    let report = client
        .validate_migration_plan(generated.clone())
        .send()
        .await
        .unwrap();

    assert!(report.is_valid());
    assert_eq!(generated.instructions, vec![MigrationInstruction::new("ReviewInvoice", "ReviewInvoice")]);
    assert_eq!(
        engine
            .single(Method::POST, "/engine-rest/migration/generate")
            .json(),
        json!({
            "sourceProcessDefinitionId": "invoice:1:pd-1",
            "targetProcessDefinitionId": "invoice:2:pd-2",
            "updateEventTriggers": true
        })
    );
    assert_eq!(
        engine
            .single(Method::POST, "/engine-rest/migration/validate")
            .json(),
        plan
    );
}

#[tokio::test]
async fn execute_migration_async_returns_batch() {
    let engine = MockEngine::start().await;
    engine.on(Method::POST, "/engine-rest/migration/executeAsync", batch("batch-2"));

    let plan = MigrationPlan::new("invoice:1:pd-1", "invoice:2:pd-2")
        .with_instruction(MigrationInstruction::new("ReviewInvoice", "Review"))
        .with_variable("migrated", Variable::boolean(true));
    let batch = engine
        .client()
        .execute_migration(plan)
        .with_process_instance_id("pi-1")
        .with_skip_io_mappings(true)
        .send_async()
        .await
        .unwrap();

    assert_eq!(batch.id, "batch-2");
    let body = engine
        .single(Method::POST, "/engine-rest/migration/executeAsync")
        .json();
    assert_eq!(body["processInstanceIds"], json!(["pi-1"]));
    assert_eq!(body["skipIoMappings"], true);
    assert_eq!(
        body["migrationPlan"]["instructions"][0]["targetActivityIds"],
        json!(["Review"])
    );
    assert_eq!(
        body["migrationPlan"]["variables"]["migrated"],
        json!({"value": true, "type": "Boolean"})
    );
}

#[tokio::test]
async fn execute_migration_requires_instances() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .execute_migration(MigrationPlan::new("invoice:1:pd-1", "invoice:2:pd-2"))
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn recalculate_job_due_date_from_now() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/job/job-1/duedate/recalculate");

    engine
        .client()
        .recalculate_job_due_date("job-1")
        .with_creation_date_based(false)
        .send()
        .await
        .unwrap();

    let request = engine.single(Method::POST, "/engine-rest/job/job-1/duedate/recalculate");
    assert_eq!(request.query_pairs(), vec![pair("creationDateBased", "false")]);
}

#[tokio::test]
async fn set_job_due_date_uses_engine_timestamps() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::PUT, "/engine-rest/job/job-1/duedate");

    engine
        .client()
        .set_job_due_date("job-1")
        .with_due_date(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        .with_cascade(true)
        .send()
        .await
        .unwrap();

    let body = engine.single(Method::PUT, "/engine-rest/job/job-1/duedate").json();
    assert_eq!(
        body,
        json!({"duedate": "2024-03-01T12:00:00.000+0000", "cascade": true})
    );
}

#[tokio::test]
async fn failed_job_is_retried_and_its_stacktrace_read() {
    let engine = MockEngine::start().await;
    engine
        .on_text(
            Method::GET,
            "/engine-rest/job/job-1/stacktrace",
            "java.lang.IllegalStateException: boom",
        )
        .on_empty(Method::PUT, "/engine-rest/job/job-1/retries")
        .on(Method::POST, "/engine-rest/job/retries", batch("batch-3"));
    let client = engine.client();

    let stacktrace = client.get_job_stacktrace("job-1").send().await.unwrap();
    client.set_job_retries("job-1", 3).send().await.unwrap();
    let batch = client
        .set_job_retries_async(1)
        .with_job_ids(vec!["job-2".to_owned(), "job-3".to_owned()])
        .send()
        .await
        .unwrap();

    assert!(stacktrace.starts_with("java.lang.IllegalStateException"));
    assert_eq!(batch.id, "batch-3");
    assert_eq!(
        engine.single(Method::PUT, "/engine-rest/job/job-1/retries").json(),
        json!({"retries": 3})
    );
    assert_eq!(
        engine.single(Method::POST, "/engine-rest/job/retries").json(),
        json!({"retries": 1, "jobIds": ["job-2", "job-3"]})
    );
}

#[tokio::test]
async fn job_definition_priority_includes_jobs() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::PUT, "/engine-rest/job-definition/jd-1/jobPriority");

    engine
        .client()
        .set_job_definition_priority("jd-1")
        .with_priority(10)
        .with_include_jobs(true)
        .send()
        .await
        .unwrap();

    let body = engine
        .single(Method::PUT, "/engine-rest/job-definition/jd-1/jobPriority")
        .json();
    assert_eq!(body, json!({"priority": 10, "includeJobs": true}));
}

#[tokio::test]
async fn clearing_job_definition_priority_sends_null() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::PUT, "/engine-rest/job-definition/jd-1/jobPriority");

    engine
        .client()
        .set_job_definition_priority("jd-1")
        .send()
        .await
        .unwrap();

    let body = engine
        .single(Method::PUT, "/engine-rest/job-definition/jd-1/jobPriority")
        .json();
    assert_eq!(body, json!({"priority": null}));
}

#[tokio::test]
async fn suspend_job_definition_and_list_suspended() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::PUT, "/engine-rest/job-definition/jd-1/suspended")
        .on(
            Method::GET,
            "/engine-rest/job-definition",
            json!([{
                "id": "jd-1",
                "processDefinitionKey": "invoice",
                "activityId": "ArchiveInvoice",
                "jobType": "async-continuation",
                "suspended": true
            }]),
        );
    let client = engine.client();

    client
        .suspend_job_definition("jd-1")
        .with_include_jobs(true)
        .send()
        .await
        .unwrap();
    let definitions = client
        .get_job_definition_list(JobDefinitionQuery::new().suspended())
        .send()
        .await
        .unwrap();

    assert!(definitions[0].suspended);
    assert_eq!(
        engine
            .single(Method::PUT, "/engine-rest/job-definition/jd-1/suspended")
            .json(),
        json!({"suspended": true, "includeJobs": true})
    );
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/job-definition")
            .query_pairs(),
        vec![pair("suspended", "true")]
    );
}

#[tokio::test]
async fn incidents_are_queried_and_annotated() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::GET,
            "/engine-rest/incident",
            json!([{
                "id": "inc-1",
                "processInstanceId": "pi-1",
                "incidentTimestamp": "2024-01-02T03:04:05.000+0000",
                "incidentType": "failedJob",
                "incidentMessage": "boom"
            }]),
        )
        .on_empty(Method::PUT, "/engine-rest/incident/inc-1/annotation")
        .on_empty(Method::DELETE, "/engine-rest/incident/inc-1/annotation");
    let client = engine.client();

    let incidents = client
        .get_incident_list(
            IncidentQuery::new()
                .with_incident_type(IncidentType::FailedJob)
                .with_process_instance_id("pi-1"),
        )
        .send()
        .await
        .unwrap();
    client
        .set_incident_annotation("inc-1", "waiting for the ERP fix")
        .send()
        .await
        .unwrap();
    client.clear_incident_annotation("inc-1").send().await.unwrap();

    assert_eq!(incidents[0].incident_type, IncidentType::FailedJob);
    assert_eq!(
        engine.single(Method::GET, "/engine-rest/incident").query_pairs(),
        vec![pair("incidentType", "failedJob"), pair("processInstanceId", "pi-1")]
    );
    assert_eq!(
        engine
            .single(Method::PUT, "/engine-rest/incident/inc-1/annotation")
            .json(),
        json!({"annotation": "waiting for the ERP fix"})
    );
    engine.single(Method::DELETE, "/engine-rest/incident/inc-1/annotation");
}

#[tokio::test]
async fn resolving_failed_job_incident_surfaces_engine_error() {
    let engine = MockEngine::start().await;
    engine.on_error(
        Method::DELETE,
        "/engine-rest/incident/inc-1",
        StatusCode::BAD_REQUEST,
        "Cannot resolve an incident of type failedJob",
    );

    let err = engine
        .client()
        .resolve_incident("inc-1")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn evaluate_decision_by_key() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/decision-definition/key/invoice-classification/evaluate",
        json!([
            {"invoiceClassification": {"value": "day-to-day expense", "type": "String", "valueInfo": {}}}
        ]),
    );

    let rows = engine
        .client()
        .evaluate_decision(DefinitionRef::key("invoice-classification"))
        .with_variable("amount", Variable::double(600.0))
        .with_variable("invoiceCategory", Variable::string("Misc"))
        .send()
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0]["invoiceClassification"].value_as::<String>().unwrap(),
        "day-to-day expense"
    );
    let body = engine
        .single(
            Method::POST,
            "/engine-rest/decision-definition/key/invoice-classification/evaluate",
        )
        .json();
    assert_eq!(
        body,
        json!({"variables": {
            "amount": {"value": 600.0, "type": "Double"},
            "invoiceCategory": {"value": "Misc", "type": "String"}
        }})
    );
}

#[tokio::test]
async fn decision_xml_by_tenant_key() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/decision-definition/key/dish/tenant-id/tenant-one/xml",
        json!({"id": "dish:1:dd-1", "dmnXml": "<definitions/>"}),
    );

    let xml = engine
        .client()
        .get_decision_definition_xml(DefinitionRef::tenant_key("dish", "tenant-one"))
        .send()
        .await
        .unwrap();

    assert_eq!(xml.dmn_xml, "<definitions/>");
}
