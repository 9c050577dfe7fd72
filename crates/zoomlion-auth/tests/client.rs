//! HTTP behaviour of `RemoteClient` against a mock Zoomlion server.

mod common;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zoomlion_auth::{ClientSettings, ProviderConfig, ProviderError, RemoteClient};

use common::{client, mock_config};

#[tokio::test]
async fn test_exchange_code_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("code=abc"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("client_secret=secret-1"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok1",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client()
        .exchange_code("abc", &mock_config(&server))
        .await
        .unwrap();
    assert_eq!(token, "tok1");
}

#[tokio::test]
async fn test_exchange_code_sends_redirect_uri() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Francher.example.com%2Fverify-auth",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok1"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings =
        ClientSettings::default().with_redirect_uri("https://rancher.example.com/verify-auth");
    let client = RemoteClient::new(settings).unwrap();
    assert_eq!(
        client.exchange_code("abc", &mock_config(&server)).await.unwrap(),
        "tok1"
    );
}

#[tokio::test]
async fn test_exchange_code_error_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        })))
        .mount(&server)
        .await;

    let err = client()
        .exchange_code("stale", &mock_config(&server))
        .await
        .unwrap_err();
    match err {
        ProviderError::RemoteAuth { error, description } => {
            assert_eq!(error, "bad_verification_code");
            assert_eq!(description, "The code passed is incorrect or expired.");
        }
        other => panic!("expected RemoteAuth, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_code_missing_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let err = client()
        .exchange_code("abc", &mock_config(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_exchange_code_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client()
        .exchange_code("abc", &mock_config(&server))
        .await
        .unwrap_err();
    match &err {
        ProviderError::RemoteHttp { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected RemoteHttp, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Request failed, got status code: 500. Response: boom"
    );
}

#[tokio::test]
async fn test_get_accepts_created() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "u1", "sub": "alice"})))
        .mount(&server)
        .await;

    let user = client()
        .fetch_user_profile("tok1", &mock_config(&server))
        .await
        .unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.login, "alice");
}

#[tokio::test]
async fn test_fetch_user_profile_sends_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer tok1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "sub": "alice",
            "name": "Alice",
            "avatar_url": "https://img/alice.png",
            "type": "User"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client()
        .fetch_user_profile("tok1", &mock_config(&server))
        .await
        .unwrap();
    assert_eq!(user.name, "Alice");
    assert_eq!(user.avatar_url, "https://img/alice.png");
}

#[tokio::test]
async fn test_fetch_paged_follows_next_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("link", r#"</user/teams?page=2>; rel="next""#),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header(
                    "link",
                    format!(
                        r#"<{}/user/teams?page=3>; rel="next", <{}/user/teams?page=3>; rel="last""#,
                        server.uri(),
                        server.uri()
                    )
                    .as_str(),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/user/teams?per_page=100", server.uri());
    let pages = client().fetch_paged("tok1", &url).await.unwrap();
    assert_eq!(pages.len(), 3);
}

#[tokio::test]
async fn test_fetch_paged_stops_on_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("link", r#"</user/orgs?page=2>; rel="next""#),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("link", r#"</user/orgs?per_page=1>; rel="next""#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/user/orgs?per_page=1", server.uri());
    let pages = client().fetch_paged("tok1", &url).await.unwrap();
    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_fetch_paged_cycle_with_uppercase_host() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "o1", "sub": "acme"}]))
                .insert_header("link", r#"</user/orgs?page=2>; rel="next""#),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "o2", "sub": "globex"}]))
                .insert_header("link", r#"</user/orgs?per_page=1>; rel="next""#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ProviderConfig::new("client-1", "secret-1")
        .with_hostname(format!("LOCALHOST:{}", server.address().port()), false);
    let orgs = client().fetch_organizations("tok1", &config).await.unwrap();
    let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["o1", "o2"]);
}

#[tokio::test]
async fn test_fetch_paged_stops_at_foreign_origin() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header(
                    "link",
                    format!(r#"<{}/user/teams?page=2>; rel="next""#, foreign.uri()).as_str(),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&foreign)
        .await;

    let url = format!("{}/user/teams?per_page=100", server.uri());
    let pages = client().fetch_paged("tok1", &url).await.unwrap();
    assert_eq!(pages.len(), 1);
}

#[tokio::test]
async fn test_fetch_paged_page_failure_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("link", r#"</user/teams?page=2>; rel="next""#),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let url = format!("{}/user/teams?per_page=100", server.uri());
    let err = client().fetch_paged("tok1", &url).await.unwrap_err();
    assert!(matches!(err, ProviderError::RemoteHttp { status: 502, .. }));
}

#[tokio::test]
async fn test_fetch_organizations_concatenates_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "o1", "sub": "acme", "type": "Organization"}]))
                .insert_header("link", r#"</user/orgs?page=2>; rel="next""#),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/orgs"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "o2", "sub": "globex"}])),
        )
        .mount(&server)
        .await;

    let orgs = client()
        .fetch_organizations("tok1", &mock_config(&server))
        .await
        .unwrap();
    let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["o1", "o2"]);
    assert!(orgs.iter().all(|o| o.resource_type == "org"));
}

#[tokio::test]
async fn test_fetch_teams_projects_accounts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "t1",
            "name": "Developers",
            "slug": "devs",
            "organization": {"login": "acme", "avatar_url": "https://img/acme.png"}
        }])))
        .mount(&server)
        .await;

    let teams = client()
        .fetch_teams("tok1", &mock_config(&server))
        .await
        .unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].id, "t1");
    assert_eq!(teams[0].login, "devs");
    assert_eq!(teams[0].name, "Developers");
    assert_eq!(teams[0].avatar_url, "https://img/acme.png");
    assert_eq!(teams[0].resource_type, "team");
}

#[tokio::test]
async fn test_fetch_team_by_id_missing_avatar() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teams/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t1",
            "name": "Developers",
            "slug": "devs",
            "organization": {"login": "acme"}
        })))
        .mount(&server)
        .await;

    let err = client()
        .fetch_team_by_id("t1", "tok1", &mock_config(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_fetch_org_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "o1",
            "sub": "acme",
            "name": "Acme Inc"
        })))
        .mount(&server)
        .await;

    let org = client()
        .fetch_org_by_name("acme", "tok1", &mock_config(&server))
        .await
        .unwrap();
    assert_eq!(org.id, "o1");
    assert_eq!(org.resource_type, "org");
}

#[tokio::test]
async fn test_search_users_query_and_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("q", "acme type:org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "items": [{"id": "o1", "sub": "acme", "type": "Organization"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = client()
        .search_users("acme", "group", "tok1", &mock_config(&server))
        .await
        .unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, "o1");
}

#[tokio::test]
async fn test_search_users_failure_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Validation Failed"))
        .mount(&server)
        .await;

    let accounts = client()
        .search_users("nobody", "", "tok1", &mock_config(&server))
        .await
        .unwrap();
    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_search_users_decode_failure_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client()
        .search_users("alice", "user", "tok1", &mock_config(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_search_users_transport_failure_is_empty() {
    let server = MockServer::start().await;
    let config = mock_config(&server);
    drop(server);

    let accounts = client()
        .search_users("alice", "user", "tok1", &config)
        .await
        .unwrap();
    assert!(accounts.is_empty());
}
