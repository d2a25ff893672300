//! End-to-end sends: conversation store + pipeline + HTTP transport against a
//! mock segmentation service.

use segment_chat::core::attachment::Attachment;
use segment_chat::core::conversation::Conversation;
use segment_chat::core::message::{Role, SEND_ERROR_TEXT};
use segment_chat::core::pipeline::{self, SendOutcome};
use segment_chat::transport::{HttpTransport, ReplyFormat};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_reply(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/message"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(&server.uri(), "/message", ReplyFormat::Json, String::new())
}

#[tokio::test]
async fn test_text_exchange() {
    let mock_server = MockServer::start().await;
    mount_reply(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "hi" })),
    )
    .await;

    let mut store = Conversation::new();
    let outcome = pipeline::send(&mut store, &transport(&mock_server), "hello", None).await;

    assert_eq!(outcome, SendOutcome::Replied);
    assert!(!store.is_loading());
    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role(), Role::User);
    assert_eq!(messages[0].text(), Some("hello"));
    assert_eq!(messages[1].role(), Role::Model);
    assert_eq!(messages[1].text(), Some("hi"));
    assert!(!messages[1].is_error());
}

#[tokio::test]
async fn test_image_only_send_returns_new_image() {
    let mock_server = MockServer::start().await;
    mount_reply(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "ok",
            "image": { "bytes": "CQkJ", "mimeType": "image/png" }
        })),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("street.jpg");
    std::fs::write(&file, "JPEGDATA").unwrap();
    let attachment = Attachment::from_path(&file).unwrap();

    let mut store = Conversation::new();
    let outcome =
        pipeline::send(&mut store, &transport(&mock_server), "", Some(attachment)).await;

    assert_eq!(outcome, SendOutcome::Replied);
    let messages = store.messages();
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].role(), Role::User);
    assert_eq!(messages[0].text(), None);
    assert_eq!(messages[0].attachment().unwrap().name(), "street.jpg");

    assert_eq!(messages[1].text(), Some("ok"));
    let returned = messages[1].attachment().unwrap();
    assert_eq!(returned.load_bytes().unwrap(), vec![9, 9, 9]);
    assert!(returned.preview_path().is_some());
    assert!(store.last_model_image().is_some());

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("JPEGDATA"));
}

#[tokio::test]
async fn test_server_error_appends_error_message() {
    let mock_server = MockServer::start().await;
    mount_reply(&mock_server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let mut store = Conversation::new();
    let outcome = pipeline::send(&mut store, &transport(&mock_server), "x", None).await;

    assert_eq!(outcome, SendOutcome::Failed);
    assert!(!store.is_loading());
    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), Some("x"));
    assert_eq!(messages[1].role(), Role::Model);
    assert!(messages[1].is_error());
    assert_eq!(messages[1].text(), Some(SEND_ERROR_TEXT));
    assert!(messages[1].attachment().is_none());
}

#[tokio::test]
async fn test_malformed_reply_is_a_failed_send() {
    let mock_server = MockServer::start().await;
    mount_reply(&mock_server, ResponseTemplate::new(200).set_body_string("<html>")).await;

    let mut store = Conversation::new();
    let outcome = pipeline::send(&mut store, &transport(&mock_server), "x", None).await;

    assert_eq!(outcome, SendOutcome::Failed);
    assert!(store.messages()[1].is_error());
}

#[tokio::test]
async fn test_blank_send_never_reaches_the_server() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut store = Conversation::new();
    let outcome = pipeline::send(&mut store, &transport(&mock_server), "   ", None).await;

    assert_eq!(outcome, SendOutcome::Rejected);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_thread_grows_in_order_across_sends() {
    let mock_server = MockServer::start().await;
    mount_reply(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "ack" })),
    )
    .await;

    let transport = transport(&mock_server);
    let mut store = Conversation::new();
    pipeline::send(&mut store, &transport, "one", None).await;
    pipeline::send(&mut store, &transport, "two", None).await;

    let texts: Vec<_> = store.messages().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec![Some("one"), Some("ack"), Some("two"), Some("ack")]);
}
