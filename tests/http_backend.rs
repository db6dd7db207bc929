//! Wire-level tests for the OpenAI-compatible backend against a mock server.

use edgequake_pdfchat::{
    inspect, ChatBackend, ChatConfig, DocumentMetadata, LoadedDocument, OpenAiCompatibleBackend,
    PdfChat, PdfChatError, Role, Session,
};
use std::time::Duration;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
    })
}

fn config_for(server: &MockServer) -> ChatConfig {
    ChatConfig::builder()
        .api_base_url(format!("{}/openai/v1", server.uri()))
        .api_key("gsk-test-key")
        .build()
        .expect("valid config")
}

fn ready_session() -> Session {
    let mut session = Session::new();
    session
        .attach_document(LoadedDocument::from_pages(
            DocumentMetadata {
                source: "alpha-beta.pdf".into(),
                page_count: 2,
                ..Default::default()
            },
            vec!["Alpha.".into(), "Beta.".into()],
        ))
        .unwrap();
    session
}

#[tokio::test]
async fn sends_bearer_model_temperature_and_two_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer gsk-test-key"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "temperature": 0.1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Alpha.")))
        .expect(1)
        .mount(&server)
        .await;

    let chat = PdfChat::new(config_for(&server)).unwrap();
    let mut session = ready_session();

    let answer = chat
        .handle_question(&mut session, "What is on page 1?")
        .await
        .expect("answer");

    assert_eq!(answer.content, "Alpha.");
    assert_eq!(answer.input_tokens, Some(42));
    assert_eq!(answer.output_tokens, Some(7));

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].as_str().unwrap().contains("Alpha.Beta."));
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "What is on page 1?");
    assert!(body.get("max_tokens").is_none());

    let t = session.transcript();
    assert_eq!(t.len(), 2);
    assert_eq!(t[1].role(), Role::Assistant);
    assert_eq!(t[1].content(), "Alpha.");
}

#[tokio::test]
async fn unauthorized_is_auth_error_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API Key", "type": "invalid_request_error" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chat = PdfChat::new(config_for(&server)).unwrap();
    let mut session = ready_session();

    let err = chat.handle_question(&mut session, "q").await.unwrap_err();
    match err {
        PdfChatError::AuthError { detail, .. } => assert_eq!(detail, "Invalid API Key"),
        other => panic!("expected AuthError, got {other:?}"),
    }
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let chat = PdfChat::new(config_for(&server)).unwrap();
    let mut session = ready_session();

    let err = chat.handle_question(&mut session, "q").await.unwrap_err();
    match err {
        PdfChatError::LlmApiError { message } => {
            assert!(message.contains("503"), "got: {message}");
            assert!(message.contains("upstream overloaded"), "got: {message}");
        }
        other => panic!("expected LlmApiError, got {other:?}"),
    }

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role(), Role::User);
}

#[tokio::test]
async fn empty_choice_list_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let backend = OpenAiCompatibleBackend::new(&server.uri(), "k").unwrap();
    let request = edgequake_pdfchat::pipeline::answer::build_request(
        "Doc",
        "q",
        &ChatConfig::default(),
    );

    let err = backend.complete(&request).await.unwrap_err();
    assert!(matches!(err, PdfChatError::EmptyResponse { .. }));
}

#[tokio::test]
async fn max_tokens_is_forwarded_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "max_tokens": 128 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("short")))
        .expect(1)
        .mount(&server)
        .await;

    let config = ChatConfig::builder()
        .api_base_url(server.uri())
        .api_key("k")
        .max_tokens(128)
        .build()
        .unwrap();
    let chat = PdfChat::new(config).unwrap();
    let mut session = ready_session();

    let answer = chat.handle_question(&mut session, "q").await.unwrap();
    assert_eq!(answer.content, "short");
}

#[tokio::test]
async fn unreachable_endpoint_leaves_question_unanswered() {
    // Reserve a port, then release it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ChatConfig::builder()
        .api_base_url(format!("http://127.0.0.1:{port}/openai/v1"))
        .api_key("k")
        .build()
        .unwrap();
    let chat = PdfChat::new(config).unwrap();
    let mut session = ready_session();

    let err = chat.handle_question(&mut session, "q").await.unwrap_err();
    assert!(
        matches!(err, PdfChatError::LlmApiError { .. }),
        "expected LlmApiError, got {err:?}"
    );

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role(), Role::User);
    assert_eq!(transcript[0].content(), "q");
}

#[tokio::test]
async fn inspect_download_uses_given_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4\n%%EOF\n".to_vec())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/slow.pdf", server.uri());
    let err = inspect(&url, None, 1).await.unwrap_err();
    match err {
        PdfChatError::DownloadTimeout { secs, .. } => assert_eq!(secs, 1),
        other => panic!("expected DownloadTimeout, got {other:?}"),
    }
}
