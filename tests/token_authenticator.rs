use serde_json::{json, Value};
use sessionward::{
    AuthError, Authenticator, Credentials, ReqwestTransport, SessionData, TokenAuthenticator,
    TokenOptions,
};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authenticator_for(server_endpoint: String, reject_with_full_response: bool) -> TokenAuthenticator {
    let options = TokenOptions {
        server_endpoint,
        reject_with_full_response,
        ..TokenOptions::default()
    };
    TokenAuthenticator::new(options, Arc::new(ReqwestTransport::new()))
}

fn offline_authenticator() -> TokenAuthenticator {
    authenticator_for("http://127.0.0.1:1/users/sign_in".to_string(), false)
}

fn record(value: Value) -> SessionData {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn test_restore_accepts_flat_record() {
    let authenticator = offline_authenticator();
    let data = record(json!({"token": "abc", "email": "alice@example.com"}));

    let restored = authenticator.restore(&data).await.unwrap();
    assert_eq!(restored, data);
}

#[tokio::test]
async fn test_restore_accepts_nested_record() {
    let authenticator = offline_authenticator();
    let data = record(json!({"user": {"token": "abc", "email": "alice@example.com"}}));

    let restored = authenticator.restore(&data).await.unwrap();
    assert_eq!(
        restored,
        record(json!({"token": "abc", "email": "alice@example.com"}))
    );
}

#[tokio::test]
async fn test_restore_rejects_blank_fields() {
    let authenticator = offline_authenticator();
    let cases = [
        json!({}),
        json!({"token": "", "email": "a@b.com"}),
        json!({"token": "abc", "email": ""}),
        json!({"token": null, "email": "a@b.com"}),
        json!({"email": "a@b.com"}),
        json!({"user": {"token": "abc"}}),
    ];

    for case in cases {
        let result = authenticator.restore(&record(case.clone())).await;
        assert!(
            matches!(result, Err(AuthError::Validation(_))),
            "expected {} to be rejected",
            case
        );
    }
}

#[tokio::test]
async fn test_restore_uses_configured_attribute_names() {
    let options = TokenOptions {
        resource_name: "account".to_string(),
        token_attribute_name: "auth_token".to_string(),
        identification_attribute_name: "username".to_string(),
        ..TokenOptions::default()
    };
    let authenticator = TokenAuthenticator::new(options, Arc::new(ReqwestTransport::new()));

    let nested = record(json!({"account": {"auth_token": "t", "username": "alice"}}));
    assert!(authenticator.restore(&nested).await.is_ok());

    let default_names = record(json!({"token": "t", "email": "alice@example.com"}));
    assert!(authenticator.restore(&default_names).await.is_err());
}

#[tokio::test]
async fn test_authenticate_posts_nested_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/sign_in"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "user": {"email": "alice@example.com", "password": "pw"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": {"token": "abc", "email": "alice@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let authenticator = authenticator_for(format!("{}/users/sign_in", server.uri()), false);
    let outcome = authenticator
        .authenticate(&Credentials::new("alice@example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(
        outcome.response,
        json!({"user": {"token": "abc", "email": "alice@example.com"}})
    );
    assert_eq!(
        outcome.data,
        record(json!({"token": "abc", "email": "alice@example.com"}))
    );
}

#[tokio::test]
async fn test_authenticate_accepts_flat_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "abc", "email": "alice@example.com", "id": 7})),
        )
        .mount(&server)
        .await;

    let authenticator = authenticator_for(format!("{}/users/sign_in", server.uri()), false);
    let outcome = authenticator
        .authenticate(&Credentials::new("alice@example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(outcome.data["id"], 7);
    assert_eq!(outcome.response["token"], "abc");
}

#[tokio::test]
async fn test_authenticate_rejects_with_decoded_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid credentials"})),
        )
        .mount(&server)
        .await;

    let authenticator = authenticator_for(format!("{}/users/sign_in", server.uri()), false);
    let err = authenticator
        .authenticate(&Credentials::new("alice@example.com", "wrong"))
        .await
        .unwrap_err();

    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, json!({"error": "invalid credentials"}));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_authenticate_rejects_with_text_body_when_not_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let authenticator = authenticator_for(format!("{}/users/sign_in", server.uri()), false);
    let err = authenticator
        .authenticate(&Credentials::new("alice@example.com", "pw"))
        .await
        .unwrap_err();

    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, Value::String("upstream exploded".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_authenticate_rejects_with_full_response_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422)
                .insert_header("x-request-id", "req-1")
                .set_body_json(json!({"errors": {"email": ["is invalid"]}})),
        )
        .mount(&server)
        .await;

    let authenticator = authenticator_for(format!("{}/users/sign_in", server.uri()), true);
    let err = authenticator
        .authenticate(&Credentials::new("alice", "pw"))
        .await
        .unwrap_err();

    match err {
        AuthError::RejectedResponse(response) => {
            assert_eq!(response.status().as_u16(), 422);
            assert_eq!(response.headers()["x-request-id"].to_str().unwrap(), "req-1");
            let body: Value = response.json().unwrap();
            assert_eq!(body["errors"]["email"][0], "is invalid");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_authenticate_reports_missing_fields_on_ok_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": {"email": "alice@example.com"}})),
        )
        .mount(&server)
        .await;

    let authenticator = authenticator_for(format!("{}/users/sign_in", server.uri()), false);
    let err = authenticator
        .authenticate(&Credentials::new("alice@example.com", "pw"))
        .await
        .unwrap_err();

    match err {
        AuthError::Validation(reason) => assert_eq!(reason, "missing required fields"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_authenticate_propagates_transport_failure() {
    let authenticator = offline_authenticator();
    let err = authenticator
        .authenticate(&Credentials::new("alice@example.com", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
}

#[tokio::test]
async fn test_invalidate_always_succeeds() {
    let authenticator = offline_authenticator();
    let data = record(json!({"token": "abc", "email": "alice@example.com"}));
    assert!(authenticator.invalidate(&data).await.is_ok());
    assert!(authenticator.invalidate(&SessionData::new()).await.is_ok());
}
