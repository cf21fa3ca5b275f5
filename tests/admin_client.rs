use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use voxdash::client::{AdminApi, AdminClient, ClientError, ErrorClass};
use voxdash::models::PageQuery;

async fn client_for(server: &MockServer) -> AdminClient {
    AdminClient::new(&server.uri(), Some("test-token"), Duration::from_secs(5)).unwrap()
}

fn prompt_json(id: u64, text: &str) -> serde_json::Value {
    json!({
        "prompt": {
            "id": id,
            "text": text,
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T08:30:00Z"
        }
    })
}

fn user_json(id: &str, suspended: bool) -> serde_json::Value {
    json!({
        "id": id,
        "username": "ada",
        "email": "ada@example.com",
        "profilePicture": null,
        "isSuspended": suspended,
        "role": "user",
        "createdAt": "2024-01-15T00:00:00Z",
        "updatedAt": "2024-01-16T00:00:00Z",
        "currentSubscription": {
            "name": "Premium",
            "price": 9.99,
            "totalMinutes": 200,
            "availableMinutes": "150"
        }
    })
}

#[tokio::test]
async fn test_get_prompt_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/prompt"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prompt_json(7, "Be brief.")))
        .expect(1)
        .mount(&server)
        .await;

    let prompt = client_for(&server).await.get_prompt().await.unwrap().unwrap();
    assert_eq!(prompt.id, "7");
    assert_eq!(prompt.text, "Be brief.");
}

#[tokio::test]
async fn test_missing_prompt_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/prompt"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Prompt not found" })),
        )
        .mount(&server)
        .await;

    let prompt = assert_ok!(client_for(&server).await.get_prompt().await);
    assert!(prompt.is_none());
}

#[tokio::test]
async fn test_create_and_update_prompt_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/prompt"))
        .and(body_json(json!({ "prompt": "Hello" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(prompt_json(1, "Hello")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/prompt"))
        .and(body_json(json!({ "prompt": "Hello again" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(prompt_json(1, "Hello again")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.create_prompt("Hello").await.unwrap().text, "Hello");
    assert_eq!(
        client.update_prompt("Hello again").await.unwrap().text,
        "Hello again"
    );
}

#[tokio::test]
async fn test_support_page_query_and_decoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/support"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "supportRequests": [{
                "id": "req-1",
                "message": "My minutes vanished",
                "user": {
                    "id": "u1",
                    "username": null,
                    "email": "grace@example.com",
                    "createdAt": "2024-01-01T00:00:00Z"
                },
                "createdAt": "2024-02-01T00:00:00Z",
                "updatedAt": "2024-02-01T00:00:00Z"
            }],
            "meta": { "total": 6, "limit": 5, "totalPages": 2, "currentPage": 2 }
        })))
        .mount(&server)
        .await;

    let page = client_for(&server)
        .await
        .list_support_requests(PageQuery::new(Some(2), Some(5)).unwrap())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].user.email, "grace@example.com");
    assert_eq!(page.meta.total, 6);
    assert_eq!(page.meta.current_page, 2);
}

#[tokio::test]
async fn test_inconsistent_meta_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user_json("u1", false), user_json("u2", false)],
            "meta": { "total": 2, "limit": 1, "totalPages": 2, "currentPage": 1 }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .list_users(PageQuery::new(Some(1), Some(1)).unwrap())
        .await
        .unwrap_err();
    match err {
        ClientError::Decode { endpoint, .. } => assert_eq!(endpoint, "/admin/users"),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = assert_err!(client_for(&server).await.list_users(PageQuery::default()).await);
    assert!(matches!(err, ClientError::Decode { .. }));
    assert_eq!(err.class(), ErrorClass::NetworkOrServer);
}

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/support"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": { "message": "database unavailable" } })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .list_support_requests(PageQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.class(), ErrorClass::NetworkOrServer);
    assert!(err.to_string().contains("database unavailable"));
}

#[tokio::test]
async fn test_toggle_suspension_puts_to_user_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/users/suspension/u%201"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "user": user_json("u 1", true) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client_for(&server)
        .await
        .toggle_suspension("u 1")
        .await
        .unwrap();
    assert_eq!(user.id, "u 1");
    assert!(user.is_suspended);
}

#[tokio::test]
async fn test_blank_user_id_never_reaches_server() {
    let server = MockServer::start().await;
    let err = assert_err!(client_for(&server).await.toggle_suspension("  ").await);
    assert_eq!(err.class(), ErrorClass::Validation);

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/prompt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prompt_json(3, "Prefixed")))
        .mount(&server)
        .await;

    let client = AdminClient::new(
        &format!("{}/api/v1/", server.uri()),
        None,
        Duration::from_secs(5),
    )
    .unwrap();
    let prompt = client.get_prompt().await.unwrap().unwrap();
    assert_eq!(prompt.text, "Prefixed");
}
