//! Integration tests for build-client against a mock HTTP backend.
//!
//! Run with:
//!   cargo test -p build-client --test transport_tests

use build_client::{
    AgentChatRequest, BuildClient, ClientConfig, ClientError, ContinueInputs, FileUpload,
    SaveAgentRequest, SessionTransport,
};
use build_core::{AgentConfiguration, BuildState, OAuthProvider, ProviderScope};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn client_for(server: &ServerGuard) -> BuildClient {
    BuildClient::new(ClientConfig::new(server.url())).unwrap()
}

fn session_body(state: &str, message: &str) -> String {
    json!({
        "build_id": "b-42",
        "state": state,
        "original_prompt": "Build an email bot",
        "history": [{"message_to_user": message}],
        "agent_config": null,
        "ui_request": null
    })
    .to_string()
}

// ============================================================================
// Build sessions
// ============================================================================

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_session() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/builds")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"prompt": "Build an email bot"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(session_body("WAITING_FOR_USER_INPUT", "Which inbox?"))
            .create_async()
            .await;

        let session = client_for(&server)
            .create_session("Build an email bot")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.build_id, "b-42");
        assert_eq!(session.state, BuildState::WaitingForUserInput);
        assert_eq!(session.last_message_to_user(), Some("Which inbox?"));
    }

    #[tokio::test]
    async fn test_create_session_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/builds")
            .with_status(503)
            .with_body("backend down")
            .create_async()
            .await;

        let err = client_for(&server)
            .create_session("Build an email bot")
            .await
            .unwrap_err();

        match err {
            ClientError::SessionCreate { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "backend down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_continue_with_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/builds/b-42/continue")
            .match_body(Matcher::Json(json!({"inputs": {"message": "support@example.com"}})))
            .with_status(200)
            .with_body(session_body("CONFIGURATION_PROPOSED", "Here is the plan."))
            .create_async()
            .await;

        let client = client_for(&server);
        let session = SessionTransport::continue_session(
            &client,
            "b-42",
            &ContinueInputs::message("support@example.com"),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(session.state, BuildState::ConfigurationProposed);
    }

    #[tokio::test]
    async fn test_continue_with_connection_string() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/builds/b-42/continue")
            .match_body(Matcher::Json(json!({
                "inputs": {"connection_string": "postgresql://u:p@db:5432/app"}
            })))
            .with_status(200)
            .with_body(session_body("DB_CONNECTION_FAILED", "Could not connect."))
            .create_async()
            .await;

        let session = client_for(&server)
            .continue_session(
                "b-42",
                &ContinueInputs::connection_string("postgresql://u:p@db:5432/app"),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.state, BuildState::DbConnectionFailed);
    }

    #[tokio::test]
    async fn test_continue_failure_carries_detail() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/builds/b-42/continue")
            .with_status(404)
            .with_body(r#"{"detail": "Build session not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .continue_session("b-42", &ContinueInputs::message("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::SessionContinue { status: 404, .. }));
        assert_eq!(err.detail().as_deref(), Some("Build session not found"));
    }

    #[tokio::test]
    async fn test_malformed_session_is_json_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/builds")
            .with_status(200)
            .with_body(r#"{"build_id": "b-1", "state": "DANCING"}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_session("x").await.unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[tokio::test]
    async fn test_upload_file_is_multipart() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/builds/b-42/upload_file")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=.+".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="leads.csv""#.to_string()),
                Matcher::Regex("email,name".to_string()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "build_id": "b-42",
                    "state": "WAITING_FOR_USER_INPUT",
                    "history": [],
                    "uploaded_file_paths": ["/uploads/leads.csv"]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let file = FileUpload::new("leads.csv", b"email,name\na@b.c,A\n".to_vec());
        let session = client_for(&server).upload_file("b-42", file).await.unwrap();

        mock.assert_async().await;
        assert_eq!(session.uploaded_file_paths, vec!["/uploads/leads.csv"]);
    }
}

// ============================================================================
// Agents
// ============================================================================

mod agent_tests {
    use super::*;

    #[tokio::test]
    async fn test_architect() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/agents/architect")
            .match_body(Matcher::Json(json!({"prompt": "Summarize Slack"})))
            .with_status(200)
            .with_body(
                json!({
                    "agent_name": "Slack Digest",
                    "llm_model": "gpt-4o",
                    "system_prompt": "Summarize channels.",
                    "tools_to_activate": ["slack_read"],
                    "prerequisites": {"oauth": ["slack"]}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = client_for(&server).architect("Summarize Slack").await.unwrap();
        assert_eq!(config.agent_name, "Slack Digest");
        assert!(config.needs_oauth("slack"));
    }

    #[tokio::test]
    async fn test_save_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/agents")
            .match_body(Matcher::PartialJson(json!({
                "user_email": "me@example.com",
                "name": "New Agent",
                "configuration": {"llm_model": "gpt-4o"}
            })))
            .with_status(201)
            .with_body(r#"{"id": 9}"#)
            .create_async()
            .await;

        let request = SaveAgentRequest::from_config(&AgentConfiguration::default(), "me@example.com");
        let saved = client_for(&server).save_agent(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(saved.id, "9");
    }

    #[tokio::test]
    async fn test_chat_with_agent() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/agents/9/chat")
            .match_body(Matcher::Json(json!({
                "session_id": "session_9",
                "user_email": "me@example.com",
                "message": "How many orders today?"
            })))
            .with_status(200)
            .with_body(r#"{"response": "There were 12 orders."}"#)
            .create_async()
            .await;

        let request = AgentChatRequest::for_agent("9", "me@example.com", "How many orders today?");
        let reply = client_for(&server)
            .chat_with_agent("9", &request)
            .await
            .unwrap();
        assert_eq!(reply.response, "There were 12 orders.");
    }

    #[tokio::test]
    async fn test_chat_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/agents/9/chat")
            .with_status(500)
            .create_async()
            .await;

        let request = AgentChatRequest::for_agent("9", "me@example.com", "hi");
        let err = client_for(&server)
            .chat_with_agent("9", &request)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
    }
}

// ============================================================================
// OAuth connections
// ============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_auth_url() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/google")
            .with_status(200)
            .with_body(r#"{"auth_url": "https://accounts.google.com/o/oauth2/auth?x=1"}"#)
            .create_async()
            .await;

        let url = client_for(&server)
            .auth_url(OAuthProvider::Google)
            .await
            .unwrap();
        assert!(url.starts_with("https://accounts.google.com"));
    }

    #[tokio::test]
    async fn test_missing_auth_url() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/notion")
            .with_status(200)
            .with_body(r#"{"auth_url": ""}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .auth_url(OAuthProvider::Notion)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingAuthUrl(p) if p == "notion"));
    }

    #[tokio::test]
    async fn test_list_tokens() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/auth/tokens/list")
            .with_status(200)
            .with_body(
                json!({"users": [
                    {"provider": "google", "user_email": "me@example.com",
                     "expires_at": "2026-11-01T00:00:00Z", "updated_at": "2026-10-18T09:00:00Z"},
                    {"provider": "slack", "user_email": null}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let tokens = client_for(&server).list_tokens().await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].provider, "google");
        assert!(tokens[1].user_email.is_none());
    }

    #[tokio::test]
    async fn test_clear_tokens() {
        let mut server = Server::new_async().await;
        let one = server
            .mock("POST", "/api/v1/auth/clear-tokens")
            .match_body(Matcher::Json(json!({"provider": "microsoft"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let all = server
            .mock("POST", "/api/v1/auth/clear-tokens")
            .match_body(Matcher::Json(json!({"provider": "all"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .clear_tokens(ProviderScope::One(OAuthProvider::Microsoft))
            .await
            .unwrap();
        client.clear_tokens(ProviderScope::All).await.unwrap();

        one.assert_async().await;
        all.assert_async().await;
    }
}
