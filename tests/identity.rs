mod common;

use axum::http::Method;
use camunda::{
    AuthorizationType, Error, FilterQuery, Group, ResourceType, Tenant, TenantMember, UserProfile,
};
use common::MockEngine;
use serde_json::json;

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_owned(), value.to_owned())
}

#[tokio::test]
async fn create_authorization_sends_numeric_types() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::POST,
        "/engine-rest/authorization/create",
        json!({
            "id": "auth-1",
            "type": 1,
            "permissions": ["READ", "UPDATE"],
            "userId": "jonny",
            "resourceType": 6,
            "resourceId": "invoice"
        }),
    );

    let created = engine
        .client()
        .create_authorization(AuthorizationType::Grant, ResourceType::ProcessDefinition)
        .with_permission("READ")
        .with_permission("UPDATE")
        .with_user_id("jonny")
        .with_resource_id("invoice")
        .send()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.id, "auth-1");
    assert_eq!(created.resource_type, ResourceType::ProcessDefinition);
    let body = engine
        .single(Method::POST, "/engine-rest/authorization/create")
        .json();
    assert_eq!(
        body,
        json!({
            "type": 1,
            "permissions": ["READ", "UPDATE"],
            "userId": "jonny",
            "resourceType": 6,
            "resourceId": "invoice"
        })
    );
}

#[tokio::test]
async fn update_authorization_puts_without_type() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::PUT, "/engine-rest/authorization/auth-1");

    let updated = engine
        .client()
        .update_authorization("auth-1", ResourceType::Deployment)
        .with_permission("ALL")
        .with_group_id("accounting")
        .send()
        .await
        .unwrap();

    assert!(updated.is_none());
    let body = engine
        .single(Method::PUT, "/engine-rest/authorization/auth-1")
        .json();
    assert_eq!(
        body,
        json!({
            "permissions": ["ALL"],
            "groupId": "accounting",
            "resourceType": 9,
            "resourceId": "*"
        })
    );
}

#[tokio::test]
async fn authorization_requires_exactly_one_owner() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .create_authorization(AuthorizationType::Grant, ResourceType::Task)
        .with_user_id("jonny")
        .with_group_id("accounting")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn check_authorization_binds_query() {
    let engine = MockEngine::start().await;
    engine.on(
        Method::GET,
        "/engine-rest/authorization/check",
        json!({
            "permissionName": "READ",
            "resourceName": "Task",
            "resourceId": "task-1",
            "isAuthorized": true
        }),
    );

    let result = engine
        .client()
        .check_authorization("READ", "Task", ResourceType::Task)
        .with_resource_id("task-1")
        .send()
        .await
        .unwrap();

    assert!(result.is_authorized);
    let request = engine.single(Method::GET, "/engine-rest/authorization/check");
    assert_eq!(
        request.query_pairs(),
        vec![
            pair("permissionName", "READ"),
            pair("resourceName", "Task"),
            pair("resourceType", "7"),
            pair("resourceId", "task-1"),
        ]
    );
}

#[tokio::test]
async fn create_user_nests_profile_and_credentials() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::POST, "/engine-rest/user/create");

    engine
        .client()
        .create_user(
            UserProfile::new("jonny")
                .with_first_name("John")
                .with_last_name("Doe")
                .with_email("john@example.com"),
        )
        .with_password("s3cret")
        .send()
        .await
        .unwrap();

    let body = engine.single(Method::POST, "/engine-rest/user/create").json();
    assert_eq!(body["profile"]["id"], "jonny");
    assert_eq!(body["profile"]["firstName"], "John");
    assert_eq!(body["profile"]["email"], "john@example.com");
    assert_eq!(body["credentials"]["password"], "s3cret");
}

#[tokio::test]
async fn update_credentials_and_unlock_user() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::PUT, "/engine-rest/user/jonny/credentials")
        .on_empty(Method::POST, "/engine-rest/user/jonny/unlock")
        .on(
            Method::GET,
            "/engine-rest/user/jonny/profile",
            json!({"id": "jonny", "firstName": "John", "lastName": "Doe", "email": null}),
        );
    let client = engine.client();

    client
        .update_user_credentials("jonny")
        .with_password("new-secret")
        .with_authenticated_user_password("admin-secret")
        .send()
        .await
        .unwrap();
    client.unlock_user("jonny").send().await.unwrap();
    let profile = client.get_user_profile("jonny").send().await.unwrap();

    assert_eq!(profile.first_name.as_deref(), Some("John"));
    let body = engine
        .single(Method::PUT, "/engine-rest/user/jonny/credentials")
        .json();
    assert_eq!(
        body,
        json!({"password": "new-secret", "authenticatedUserPassword": "admin-secret"})
    );
    assert!(engine
        .single(Method::POST, "/engine-rest/user/jonny/unlock")
        .body
        .is_empty());
}

#[tokio::test]
async fn create_group_then_add_member() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::POST, "/engine-rest/group/create")
        .on_empty(Method::PUT, "/engine-rest/group/accounting/members/jonny");
    let client = engine.client();

    client
        .create_group(
            Group::new("accounting")
                .with_name("Accounting")
                .with_type("WORKFLOW"),
        )
        .send()
        .await
        .unwrap();
    client
        .add_group_member("accounting", "jonny")
        .send()
        .await
        .unwrap();

    let body = engine.single(Method::POST, "/engine-rest/group/create").json();
    assert_eq!(
        body,
        json!({"id": "accounting", "name": "Accounting", "type": "WORKFLOW"})
    );
    engine.single(Method::PUT, "/engine-rest/group/accounting/members/jonny");
}

#[tokio::test]
async fn remove_group_member_and_read_member_options() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::DELETE, "/engine-rest/group/accounting/members/jonny")
        .on(
            Method::OPTIONS,
            "/engine-rest/group/accounting/members",
            json!({"links": [
                {"method": "PUT", "href": "http://localhost/group/accounting/members", "rel": "create"}
            ]}),
        );
    let client = engine.client();

    client
        .remove_group_member("accounting", "jonny")
        .send()
        .await
        .unwrap();
    let options = client
        .group_member_options("accounting")
        .send()
        .await
        .unwrap();

    assert!(options.allows("create"));
    assert!(!options.allows("delete"));
    engine.single(Method::DELETE, "/engine-rest/group/accounting/members/jonny");
}

#[tokio::test]
async fn tenant_members_are_addressed_by_kind() {
    let engine = MockEngine::start().await;
    engine
        .on_empty(Method::PUT, "/engine-rest/tenant/tenant-one/user-members/jonny")
        .on_empty(
            Method::DELETE,
            "/engine-rest/tenant/tenant-one/group-members/accounting",
        );
    let client = engine.client();

    client
        .add_tenant_member("tenant-one", TenantMember::User("jonny".to_owned()))
        .send()
        .await
        .unwrap();
    client
        .remove_tenant_member("tenant-one", TenantMember::Group("accounting".to_owned()))
        .send()
        .await
        .unwrap();

    engine.single(Method::PUT, "/engine-rest/tenant/tenant-one/user-members/jonny");
    engine.single(
        Method::DELETE,
        "/engine-rest/tenant/tenant-one/group-members/accounting",
    );
}

#[tokio::test]
async fn update_tenant_puts_full_tenant() {
    let engine = MockEngine::start().await;
    engine.on_empty(Method::PUT, "/engine-rest/tenant/tenant-one");

    engine
        .client()
        .update_tenant(Tenant::new("tenant-one").with_name("Tenant One"))
        .send()
        .await
        .unwrap();

    let body = engine.single(Method::PUT, "/engine-rest/tenant/tenant-one").json();
    assert_eq!(body, json!({"id": "tenant-one", "name": "Tenant One"}));
}

#[tokio::test]
async fn identity_groups_and_verification() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::GET,
            "/engine-rest/identity/groups",
            json!({
                "groups": [{"id": "accounting", "name": "Accounting"}],
                "groupUsers": [{"id": "mary", "displayName": "Mary Anne"}]
            }),
        )
        .on(
            Method::POST,
            "/engine-rest/identity/verify",
            json!({"authenticatedUser": "jonny", "authenticated": true}),
        );
    let client = engine.client();

    let groups = client.get_identity_groups("jonny").send().await.unwrap();
    let result = client.verify_user("jonny", "s3cret").send().await.unwrap();

    assert_eq!(groups.groups[0].id, "accounting");
    assert_eq!(groups.group_users[0].display_name.as_deref(), Some("Mary Anne"));
    assert!(result.authenticated);
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/identity/groups")
            .query_pairs(),
        vec![pair("userId", "jonny")]
    );
    assert_eq!(
        engine.single(Method::POST, "/engine-rest/identity/verify").json(),
        json!({"username": "jonny", "password": "s3cret"})
    );
}

#[tokio::test]
async fn create_filter_then_execute_it() {
    let engine = MockEngine::start().await;
    engine
        .on(
            Method::POST,
            "/engine-rest/filter/create",
            json!({
                "id": "filter-1",
                "resourceType": "Task",
                "name": "My tasks",
                "owner": "jonny",
                "query": {"assignee": "jonny"},
                "properties": {"priority": 10}
            }),
        )
        .on(
            Method::GET,
            "/engine-rest/filter/filter-1/list",
            json!([{"id": "task-1", "name": "Approve invoice", "priority": 50}]),
        );
    let client = engine.client();

    let filter = client
        .create_filter()
        .with_name("My tasks")
        .with_owner("jonny")
        .with_query_parameter("assignee", "jonny")
        .with_property("priority", 10)
        .send()
        .await
        .unwrap()
        .unwrap();
    let tasks = client
        .execute_filter(&filter.id)
        .with_first_result(0)
        .with_max_results(15)
        .send()
        .await
        .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(
        engine.single(Method::POST, "/engine-rest/filter/create").json(),
        json!({
            "resourceType": "Task",
            "name": "My tasks",
            "owner": "jonny",
            "query": {"assignee": "jonny"},
            "properties": {"priority": 10}
        })
    );
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/filter/filter-1/list")
            .query_pairs(),
        vec![pair("firstResult", "0"), pair("maxResults", "15")]
    );
}

#[tokio::test]
async fn filter_without_name_is_rejected_locally() {
    let engine = MockEngine::start().await;

    let err = engine
        .client()
        .update_filter("filter-1")
        .with_owner("jonny")
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidParameters(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn count_filters_binds_owner() {
    let engine = MockEngine::start().await;
    engine.on(Method::GET, "/engine-rest/filter/count", json!({"count": 2}));

    let count = engine
        .client()
        .count_filters(FilterQuery::new().with_owner("jonny"))
        .send()
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        engine
            .single(Method::GET, "/engine-rest/filter/count")
            .query_pairs(),
        vec![pair("owner", "jonny")]
    );
}
