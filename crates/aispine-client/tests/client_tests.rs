//! Endpoint tests against a mock AI Spine server.

mod common;

use std::time::Duration;

use aispine_client::{
    AgentConfig, ApiKeyAction, Client, ClientConfig, ExecutionStatus, SpineError, WaitOptions,
};
use common::client_for;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn sample_flow() -> Value {
    json!({
        "flow_id": "test-flow-123",
        "name": "Test Flow",
        "description": "A test flow",
        "nodes": [
            {"id": "node1", "type": "input"},
            {"id": "node2", "type": "process"},
            {"id": "node3", "type": "output"}
        ],
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

fn sample_agent() -> Value {
    json!({
        "agent_id": "agent-789",
        "name": "Test Agent",
        "type": "processor",
        "configuration": {"model": "gpt-4", "temperature": 0.7},
        "created_at": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_authorization_header_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .match_header("authorization", "Bearer sk_test_key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"status": "healthy", "version": "1.0.0"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version.as_deref(), Some("1.0.0"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_execute_flow_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/flows/execute")
        .match_body(Matcher::Json(json!({
            "flow_id": "test-flow",
            "input_data": {"input": "data"}
        })))
        .with_status(200)
        .with_body(json!({"execution_id": "exec-123", "status": "pending"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let execution = client
        .execute_flow("test-flow", json!({"input": "data"}), None)
        .await
        .unwrap();
    assert_eq!(execution.execution_id, "exec-123");
    assert_eq!(execution.status, ExecutionStatus::Pending);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_execute_flow_with_metadata() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/flows/execute")
        .match_body(Matcher::PartialJson(json!({"metadata": {"user": "test"}})))
        .with_status(200)
        .with_body(json!({"execution_id": "exec-123", "status": "pending"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let execution = client
        .execute_flow("test-flow", json!({"input": "data"}), Some(json!({"user": "test"})))
        .await
        .unwrap();
    assert_eq!(execution.execution_id, "exec-123");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_execute_flow_rejects_bad_input_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/flows/execute")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client
        .execute_flow("", json!({"input": "data"}), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SpineError::Validation { status_code: None, .. }));

    let err = client
        .execute_flow("test-flow", Value::Null, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SpineError::Validation { .. }));

    let err = client
        .execute_flow("test-flow", json!(["not", "an", "object"]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SpineError::Validation { .. }));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_execution_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/executions/exec-456")
        .with_status(200)
        .with_body(
            json!({
                "execution_id": "exec-456",
                "flow_id": "test-flow-123",
                "status": "pending",
                "input_data": {"test": "data"},
                "created_at": "2024-01-01T00:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let execution = client.get_execution("exec-456").await.unwrap();
    assert_eq!(execution.execution_id, "exec-456");
    assert_eq!(execution.status, ExecutionStatus::Pending);
    assert_eq!(execution.input_data, Some(json!({"test": "data"})));
}

#[tokio::test]
async fn test_wait_for_execution_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/executions/exec-123")
        .with_status(200)
        .with_body(json!({"execution_id": "exec-123", "status": "running"}).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/executions/exec-123")
        .with_status(200)
        .with_body(
            json!({
                "execution_id": "exec-123",
                "status": "completed",
                "output_data": {"result": "success"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let options = WaitOptions::default()
        .with_timeout(Duration::from_secs(5))
        .with_interval(Duration::from_millis(100));
    let execution = client.wait_for_execution("exec-123", options).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.output_data, Some(json!({"result": "success"})));
}

#[tokio::test]
async fn test_wait_for_execution_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/executions/exec-123")
        .with_status(200)
        .with_body(
            json!({
                "execution_id": "exec-123",
                "status": "failed",
                "error_message": "Processing failed"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let options = WaitOptions::default()
        .with_timeout(Duration::from_secs(5))
        .with_interval(Duration::from_millis(100));
    let err = client.wait_for_execution("exec-123", options).await.unwrap_err();
    assert!(matches!(err, SpineError::Execution { .. }));
    assert!(err.to_string().contains("Processing failed"));
}

#[tokio::test]
async fn test_wait_for_execution_offsetless_timestamp() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/executions/e1")
        .with_status(200)
        .with_body(
            json!({
                "execution_id": "e1",
                "status": "completed",
                "output_data": {"r": 1},
                "created_at": "2024-01-01T00:00:00.123456",
                "completed_at": "not a timestamp"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let options = WaitOptions::default()
        .with_timeout(Duration::from_secs(5))
        .with_interval(Duration::from_millis(100));
    let execution = client.wait_for_execution("e1", options).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.output_data, Some(json!({"r": 1})));
    assert!(execution.created_at.is_some());
    assert!(execution.completed_at.is_none());
}

#[tokio::test]
async fn test_wait_for_execution_timeout() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/executions/exec-123")
        .with_status(200)
        .with_body(json!({"execution_id": "exec-123", "status": "running"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let options = WaitOptions::default()
        .with_timeout(Duration::from_millis(300))
        .with_interval(Duration::from_millis(50));
    let err = client.wait_for_execution("exec-123", options).await.unwrap_err();
    match err {
        SpineError::Timeout {
            execution_id,
            timeout,
        } => {
            assert_eq!(execution_id, "exec-123");
            assert_eq!(timeout, Duration::from_millis(300));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_flow_and_wait() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/flows/execute")
        .with_status(200)
        .with_body(json!({"execution_id": "exec-9", "status": "pending"}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/executions/exec-9")
        .with_status(200)
        .with_body(
            json!({"execution_id": "exec-9", "status": "completed", "output_data": {"n": 1}})
                .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let execution = client
        .execute_flow_and_wait(
            "test-flow",
            json!({"n": 0}),
            None,
            WaitOptions::default().with_interval(Duration::from_millis(10)),
        )
        .await
        .unwrap();
    assert_eq!(execution.output_data, Some(json!({"n": 1})));
}

#[tokio::test]
async fn test_list_flows_array_and_object_agree() {
    let mut server = mockito::Server::new_async().await;
    let bare = server
        .mock("GET", "/flows")
        .with_status(200)
        .with_body(json!([sample_flow()]).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let from_array = client.list_flows().await.unwrap();
    bare.assert_async().await;
    bare.remove_async().await;

    server
        .mock("GET", "/flows")
        .with_status(200)
        .with_body(json!({"flows": [sample_flow()]}).to_string())
        .create_async()
        .await;
    let from_object = client.list_flows().await.unwrap();

    assert_eq!(from_array.len(), 1);
    assert_eq!(from_array[0].flow_id, "test-flow-123");
    assert_eq!(from_array, from_object);
}

#[tokio::test]
async fn test_get_flow_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/flows/test-flow-123")
        .with_status(200)
        .with_body(sample_flow().to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let flow = client.get_flow("test-flow-123").await.unwrap();
    assert_eq!(flow.flow_id, "test-flow-123");
    assert_eq!(flow.name, "Test Flow");
    assert_eq!(flow.nodes.len(), 3);
}

#[tokio::test]
async fn test_list_agents() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/agents")
        .with_status(200)
        .with_body(json!({"agents": [sample_agent()]}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let agents = client.list_agents().await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].agent_id, "agent-789");
    assert_eq!(agents[0].agent_type.as_deref(), Some("processor"));
}

#[tokio::test]
async fn test_create_agent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/agents")
        .match_body(Matcher::Json(json!({
            "name": "Test Agent",
            "type": "processor",
            "configuration": {"model": "gpt-4"}
        })))
        .with_status(201)
        .with_body(sample_agent().to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let config =
        AgentConfig::new("Test Agent", "processor").with_configuration(json!({"model": "gpt-4"}));
    let agent = client.create_agent(&config).await.unwrap();
    assert_eq!(agent.agent_id, "agent-789");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_agent_leaves_name_checks_to_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/agents")
        .match_body(Matcher::PartialJson(json!({"name": "", "type": "processor"})))
        .with_status(400)
        .with_body(json!({"detail": "name must not be empty"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .create_agent(&AgentConfig::new("", "processor"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.to_string(), "name must not be empty");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_agent_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/agents/agent-789")
        .with_status(204)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.delete_agent("agent-789").await.unwrap());
}

#[tokio::test]
async fn test_delete_agent_plain_text_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/agents/agent-789")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("Deleted")
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.delete_agent("agent-789").await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_agent_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/agents/agent-999")
        .with_status(404)
        .with_body(json!({"message": "Agent not found"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(!client.delete_agent("agent-999").await.unwrap());
}

#[tokio::test]
async fn test_delete_agent_other_errors_propagate() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/agents/agent-789")
        .with_status(500)
        .with_body(json!({"message": "Internal server error"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.delete_agent("agent-789").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_system_operations() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/metrics")
        .with_status(200)
        .with_body(json!({"executions_total": 100, "flows_total": 10}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/status")
        .with_status(200)
        .with_body(json!({"status": "operational", "uptime": 3600}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let metrics = client.get_metrics().await.unwrap();
    assert_eq!(metrics.get_u64("executions_total"), Some(100));

    let status = client.get_status().await.unwrap();
    assert_eq!(status.status, "operational");
    assert_eq!(status.uptime, Some(3600.0));
}

#[tokio::test]
async fn test_fractional_uptime_and_credits() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/status")
        .with_status(200)
        .with_body(json!({"status": "operational", "uptime": 3600.25}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/users/me")
        .with_status(200)
        .with_body(json!({"id": "user-123", "credits": 12.5}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let status = client.get_status().await.unwrap();
    assert_eq!(status.uptime, Some(3600.25));
    assert_eq!(client.check_credits().await.unwrap(), 12.5);
}

#[tokio::test]
async fn test_get_current_user_and_credits() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/users/me")
        .with_status(200)
        .with_body(
            json!({
                "id": "user-123",
                "email": "test@example.com",
                "credits": 1000,
                "plan": "pro"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let user = client.get_current_user().await.unwrap();
    assert_eq!(user.id, "user-123");
    assert_eq!(user.email.as_deref(), Some("test@example.com"));
    assert_eq!(user.plan.as_deref(), Some("pro"));
    assert_eq!(client.check_credits().await.unwrap(), 1000.0);
}

#[tokio::test]
async fn test_check_credits_zero_when_absent() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/users/me")
        .with_status(200)
        .with_body(json!({"id": "user-123", "email": "test@example.com", "plan": "basic"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.check_credits().await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_check_user_api_key_exists() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/user/keys/my-key")
        .with_status(200)
        .with_body(
            json!({
                "has_api_key": true,
                "api_key": "sk_user_test_key",
                "credits": 1000,
                "rate_limit": 100,
                "created_at": "2024-01-01T00:00:00Z",
                "last_used_at": "2024-01-02T00:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let status = client
        .check_user_api_key("123e4567-e89b-12d3-a456-426614174000")
        .await
        .unwrap();
    assert!(status.has_api_key);
    assert_eq!(status.api_key.as_deref(), Some("sk_user_test_key"));
    assert_eq!(status.credits, 1000.0);
    assert_eq!(status.rate_limit, 100.0);
    assert!(status.last_used_at.is_some());
}

#[tokio::test]
async fn test_generate_and_revoke_user_api_key() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/user/keys/generate")
        .with_status(200)
        .with_body(
            json!({
                "message": "API key regenerated successfully",
                "api_key": "sk_regenerated_key",
                "action": "regenerated"
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("DELETE", "/api/v1/user/keys/revoke")
        .with_status(200)
        .with_body(
            json!({"message": "API key revoked successfully", "status": "revoked"}).to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let user_id = "123e4567-e89b-12d3-a456-426614174000";

    let generated = client.generate_user_api_key(user_id).await.unwrap();
    assert_eq!(generated.api_key, "sk_regenerated_key");
    assert_eq!(generated.action, ApiKeyAction::Regenerated);

    let revoked = client.revoke_user_api_key(user_id).await.unwrap();
    assert_eq!(revoked.status, "revoked");
}

#[tokio::test]
async fn test_api_key_operations_require_user_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    for err in [
        client.check_user_api_key("").await.err(),
        client.generate_user_api_key("").await.err(),
        client.revoke_user_api_key("  ").await.err(),
    ] {
        match err {
            Some(SpineError::Validation { message, .. }) => assert_eq!(message, "User ID is required"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_closed_client_reopens_on_request() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(json!({"status": "healthy"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    client.close();
    assert!(!client.is_open());

    let health = client.health_check().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert!(client.is_open());
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    common::init_tracing();
    let client = Client::new(
        ClientConfig::new(common::TEST_KEY)
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, SpineError::Network(_)));
}
