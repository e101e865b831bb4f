//! Login and registration against a mocked API

mod common;

use libreferral::service::auth::{LOGIN_FAILED, REGISTRATION_FAILED};
use libreferral::types::Credentials;
use libreferral::{Route, Submission};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_persists_token_and_navigates_home() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .and(body_json(json!({"username": "dr_okafor", "password": "correct"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "new-access", "refresh": "r"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let outcome = service
        .auth()
        .login(&Credentials::new("dr_okafor", "correct"))
        .await;

    assert_eq!(outcome, Submission::Navigate(Route::Home));
    assert_eq!(service.session().token().unwrap().as_deref(), Some("new-access"));
}

#[tokio::test]
async fn test_failed_login_leaves_token_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "No active account"})),
        )
        .mount(&server)
        .await;

    let service = common::signed_in_service(&server, "previous_user");
    let before = service.session().token().unwrap();

    let outcome = service
        .auth()
        .login(&Credentials::new("dr_okafor", "wrong"))
        .await;

    assert_eq!(outcome, Submission::Rejected(LOGIN_FAILED));
    assert_eq!(service.session().token().unwrap(), before);
}

#[tokio::test]
async fn test_failed_login_without_prior_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let outcome = service.auth().login(&Credentials::new("a", "b")).await;

    assert_eq!(outcome, Submission::Rejected(LOGIN_FAILED));
    assert!(!service.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn test_login_response_without_access_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refresh": "r"})))
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let outcome = service.auth().login(&Credentials::new("a", "b")).await;

    assert_eq!(outcome, Submission::Rejected(LOGIN_FAILED));
    assert!(!service.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn test_register_navigates_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(body_json(json!({"username": "new_nurse", "password": "pw"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let outcome = service
        .auth()
        .register(&Credentials::new("new_nurse", "pw"))
        .await;

    assert_eq!(outcome, Submission::Navigate(Route::Login));
    assert!(!service.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn test_register_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"username": ["already exists"]})),
        )
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let outcome = service
        .auth()
        .register(&Credentials::new("taken", "pw"))
        .await;

    assert_eq!(outcome, Submission::Rejected(REGISTRATION_FAILED));
}

#[tokio::test]
async fn test_register_sends_no_bearer_when_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(403))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let outcome = service
        .auth()
        .register(&Credentials::new("new_nurse", "pw"))
        .await;

    assert_eq!(outcome, Submission::Navigate(Route::Login));
}

#[tokio::test]
async fn test_register_while_signed_in_sends_no_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::signed_in_service(&server, "admin_on_shift");
    let outcome = service
        .auth()
        .register(&Credentials::new("new_nurse", "pw"))
        .await;

    assert_eq!(outcome, Submission::Navigate(Route::Login));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_login_while_signed_in_sends_no_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "r"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = common::signed_in_service(&server, "previous_user");
    let outcome = service
        .auth()
        .login(&Credentials::new("dr_okafor", "correct"))
        .await;

    assert_eq!(outcome, Submission::Navigate(Route::Home));
    assert_eq!(service.session().token().unwrap().as_deref(), Some("fresh"));

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}
