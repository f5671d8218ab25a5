#![cfg(feature = "admin")]
//! AdminClient against a mock backend.

use serde_json::json;
use tripstream::admin::{AdminClient, AdminRole, AdminUpdate, DeleteTarget, NewAdmin, Resource, SearchScope};
use tripstream::error::AdminError;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AdminClient {
    AdminClient::new(reqwest::Client::new(), &server.uri()).unwrap()
}

#[tokio::test]
async fn test_list_users_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"id": 11, "email": "li@example.com", "created_at": "2026-09-01", "last_login": null}
            ],
            "total": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server).list(Resource::Users, 2, 10).await.unwrap();
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.total, 25);

    let p = page.pagination();
    assert_eq!((p.current, p.total_pages), (2, 3));
    assert_eq!(p.prev(), Some(1));
    assert_eq!(p.next(), Some(3));
}

#[tokio::test]
async fn test_search_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/search"))
        .and(query_param("type", "messages"))
        .and(query_param("query", "西安"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{"id": 1, "text": "去西安", "is_user": true}],
            "total": 1
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .search(SearchScope::Messages, " 西安 ", 1, 10)
        .await
        .unwrap();
    assert_eq!(page.resource, Resource::Messages);
    assert_eq!(page.rows[0]["text"], "去西安");
}

#[tokio::test]
async fn test_empty_search_rejected() {
    let server = MockServer::start().await;
    let err = client(&server)
        .search(SearchScope::Users, "  ", 1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Invalid(_)));
}

#[tokio::test]
async fn test_delete_user() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/user/li%40example.com/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .delete(&DeleteTarget::User("li@example.com".into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_message_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/admin/1/delete"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": "cannot delete a superadmin"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .delete(&DeleteTarget::Admin(1))
        .await
        .unwrap_err();
    match err {
        AdminError::Api { status, message } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(message, "cannot delete a superadmin");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_add_and_update_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/admin/add"))
        .and(body_json(json!({
            "username": "ops",
            "password": "s3cret",
            "email": null,
            "role": "admin"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/admin/7/update"))
        .and(body_json(json!({"email": "ops@example.com", "role": "superadmin", "password": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let admin = client(&server);
    admin
        .add_admin(&NewAdmin {
            username: "ops".into(),
            password: "s3cret".into(),
            email: None,
            role: AdminRole::Admin,
        })
        .await
        .unwrap();
    admin
        .update_admin(
            7,
            &AdminUpdate {
                email: Some("ops@example.com".into()),
                role: Some(AdminRole::Superadmin),
                password: None,
            },
        )
        .await
        .unwrap();

    let err = admin
        .add_admin(&NewAdmin {
            username: "x".into(),
            password: String::new(),
            email: None,
            role: AdminRole::Admin,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Invalid(_)));
}

#[tokio::test]
async fn test_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_users": 4,
            "active_users": 2,
            "total_conversations": 9,
            "total_messages": 120,
            "recent_users": [{"email": "a@b.c", "created_at": "2026-10-01"}]
        })))
        .mount(&server)
        .await;

    let stats = client(&server).stats().await.unwrap();
    assert_eq!(stats.total_messages, 120);
    assert_eq!(stats.recent_users.len(), 1);
}

#[tokio::test]
async fn test_user_detail_encodes_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/user/a%2Bb%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"email": "a+b@example.com"},
            "conversations": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client(&server).user_detail("a+b@example.com").await.unwrap();
    assert_eq!(detail["user"]["email"], "a+b@example.com");
}
