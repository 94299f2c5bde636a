use serde_json::{json, Value};
use sessionward::{
    AuthorizedClient, Authorizer, BearerAuthorizer, EphemeralStore, OriginMatcher,
    RequestInterceptor, Session, SessionData, SessionState, Store, TokenAuthorizer,
};
use sessionward::{ReqwestTransport, TokenAuthenticator, TokenOptions};
use std::sync::Arc;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(value: Value) -> SessionData {
    value.as_object().unwrap().clone()
}

fn request_to(url: &str) -> reqwest::Request {
    reqwest::Client::new().get(url).build().unwrap()
}

fn authorization(request: &reqwest::Request) -> Option<String> {
    request
        .headers()
        .get(reqwest::header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap().to_string())
}

async fn restored_session(data: Value) -> Arc<Session> {
    let store = Arc::new(EphemeralStore::new());
    store.persist(&record(data)).await.unwrap();
    let authenticator = TokenAuthenticator::new(
        TokenOptions::default(),
        Arc::new(ReqwestTransport::new()),
    );
    let session = Arc::new(Session::new(Arc::new(authenticator), store));
    session.restore_from_store().await;
    session
}

#[test]
fn test_token_authorizer_adds_header_when_authenticated() {
    let authorizer = TokenAuthorizer::default();
    let state = SessionState::authenticated(record(json!({
        "token": "abc",
        "email": "alice@example.com"
    })));
    let mut request = request_to("https://app.example.com/api");

    authorizer.authorize(&mut request, &state);

    assert_eq!(
        authorization(&request).as_deref(),
        Some(r#"Token token="abc", email="alice@example.com""#)
    );
}

#[test]
fn test_authorizers_skip_unauthenticated_sessions() {
    let data = record(json!({"token": "abc", "email": "a@b.com", "access_token": "xyz"}));
    let state = SessionState {
        is_authenticated: false,
        data,
    };
    let authorizers: Vec<Box<dyn Authorizer>> = vec![
        Box::new(TokenAuthorizer::default()),
        Box::new(BearerAuthorizer::default()),
    ];

    for authorizer in authorizers {
        let mut request = request_to("https://app.example.com/api");
        authorizer.authorize(&mut request, &state);
        assert_eq!(authorization(&request), None);
    }
}

#[test]
fn test_token_authorizer_skips_blank_values() {
    let authorizer = TokenAuthorizer::default();
    let state = SessionState::authenticated(record(json!({"token": "", "email": "a@b.com"})));
    let mut request = request_to("https://app.example.com/api");

    authorizer.authorize(&mut request, &state);
    assert_eq!(authorization(&request), None);
}

#[test]
fn test_token_authorizer_uses_configured_identification_name() {
    let authorizer = TokenAuthorizer::new("auth_token", "username");
    let state = SessionState::authenticated(record(json!({
        "auth_token": "abc",
        "username": "alice"
    })));
    let mut request = request_to("https://app.example.com/api");

    authorizer.authorize(&mut request, &state);
    assert_eq!(
        authorization(&request).as_deref(),
        Some(r#"Token token="abc", username="alice""#)
    );
}

#[test]
fn test_bearer_authorizer() {
    let authorizer = BearerAuthorizer::default();
    let state = SessionState::authenticated(record(json!({"access_token": "xyz"})));
    let mut request = request_to("https://app.example.com/api");

    authorizer.authorize(&mut request, &state);
    assert_eq!(authorization(&request).as_deref(), Some("Bearer xyz"));
}

#[tokio::test]
async fn test_interceptor_authorizes_trusted_targets_only() {
    let session = restored_session(json!({"token": "abc", "email": "a@b.com"})).await;
    let matcher =
        OriginMatcher::new("https://app.example.com", ["https://api.example.com"]).unwrap();
    let interceptor =
        RequestInterceptor::new(matcher, Arc::new(TokenAuthorizer::default()), session);

    let mut same_origin = request_to("https://app.example.com/items");
    let mut whitelisted = request_to("https://api.example.com/items");
    let mut foreign = request_to("https://tracker.example.net/collect");
    interceptor.intercept(&mut same_origin).await;
    interceptor.intercept(&mut whitelisted).await;
    interceptor.intercept(&mut foreign).await;

    assert!(authorization(&same_origin).is_some());
    assert!(authorization(&whitelisted).is_some());
    assert_eq!(authorization(&foreign), None);
}

#[tokio::test]
async fn test_interceptor_leaves_requests_alone_when_unauthenticated() {
    let session = restored_session(json!({})).await;
    let matcher = OriginMatcher::new("https://app.example.com", Vec::<String>::new()).unwrap();
    let interceptor =
        RequestInterceptor::new(matcher, Arc::new(TokenAuthorizer::default()), session);

    let mut request = request_to("https://app.example.com/items");
    interceptor.intercept(&mut request).await;
    assert_eq!(authorization(&request), None);
}

#[tokio::test]
async fn test_authorized_client_sends_header_to_trusted_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["one"])))
        .expect(1)
        .mount(&server)
        .await;

    let session = restored_session(json!({"token": "abc", "email": "a@b.com"})).await;
    let matcher = OriginMatcher::new("https://app.example.com", [server.uri()]).unwrap();
    let interceptor =
        RequestInterceptor::new(matcher, Arc::new(TokenAuthorizer::default()), session);
    let client = AuthorizedClient::new(reqwest::Client::new(), interceptor);

    let response = client
        .send(client.get(format!("{}/items", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let received = server.received_requests().await.unwrap();
    assert_eq!(
        received[0].headers.get("authorization").unwrap().to_str().unwrap(),
        r#"Token token="abc", email="a@b.com""#
    );
}

#[tokio::test]
async fn test_authorized_client_omits_header_for_untrusted_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = restored_session(json!({"token": "abc", "email": "a@b.com"})).await;
    let matcher = OriginMatcher::new("https://app.example.com", Vec::<String>::new()).unwrap();
    let interceptor =
        RequestInterceptor::new(matcher, Arc::new(TokenAuthorizer::default()), session);
    let client = AuthorizedClient::new(reqwest::Client::new(), interceptor);

    client
        .send(client.get(format!("{}/items", server.uri())))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}
