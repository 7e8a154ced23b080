use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use relay_engine::{BloggerPublisher, PublishError, PublishRequest, Publisher, WebhookPublisher};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(draft: bool) -> PublishRequest<'static> {
    PublishRequest {
        title: "[fa]Title",
        html: "<p>[fa]Body</p>",
        source_url: Some("https://source.example/a"),
        published: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
        draft,
    }
}

#[tokio::test]
async fn blogger_inserts_a_draft_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blogs/42/posts/"))
        .and(query_param("isDraft", "true"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({
            "kind": "blogger#post",
            "blog": { "id": "42" },
            "title": "[fa]Title",
            "content": "<p>[fa]Body</p>",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "7", "url": "https://blog.example/2023/11/title.html" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let publisher =
        BloggerPublisher::new(server.uri(), "42", "secret", Duration::from_secs(5)).unwrap();
    let receipt = publisher.publish(&request(true)).await.unwrap();

    assert_eq!(
        receipt.url.as_deref(),
        Some("https://blog.example/2023/11/title.html")
    );
}

#[tokio::test]
async fn blogger_rejection_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficient permissions"))
        .mount(&server)
        .await;

    let publisher =
        BloggerPublisher::new(server.uri(), "42", "secret", Duration::from_secs(5)).unwrap();
    let err = publisher.publish(&request(false)).await.unwrap_err();

    match err {
        PublishError::Rejected { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "insufficient permissions");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn webhook_receives_flat_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/catch/1/abc"))
        .and(body_json(json!({
            "title": "[fa]Title",
            "html": "<p>[fa]Body</p>",
            "source_url": "https://source.example/a",
            "published": "2023-11-14T22:13:20+00:00",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = WebhookPublisher::new(
        format!("{}/hooks/catch/1/abc", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let receipt = publisher.publish(&request(false)).await.unwrap();
    assert_eq!(receipt.url, None);
}

#[tokio::test]
async fn webhook_non_success_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let publisher = WebhookPublisher::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = publisher.publish(&request(false)).await.unwrap_err();
    assert!(matches!(err, PublishError::Rejected { status: 500, .. }));
}
