//! Shared helpers for the mocked-API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header};
use libreferral::session::MemoryTokenStore;
use libreferral::{Config, ReferralService, Session};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// JWT carrying `username`, signed with a key the client never sees
pub fn token_for(username: &str) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "username": username, "user_id": 1 }),
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .unwrap()
}

pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config
}

/// Service against `server` with an empty in-memory session
pub fn service_for(server: &MockServer) -> ReferralService {
    ReferralService::with_session(config_for(server), Session::in_memory()).unwrap()
}

/// Service against `server` with a signed-in session
pub fn signed_in_service(server: &MockServer, username: &str) -> ReferralService {
    let session = Session::new(Arc::new(MemoryTokenStore::with_token(token_for(username))));
    ReferralService::with_session(config_for(server), session).unwrap()
}

pub fn patient(id: i64) -> libreferral::Patient {
    serde_json::from_value(patient_json(id)).unwrap()
}

pub fn patient_json(id: i64) -> Value {
    json!({
        "id": id,
        "first_name": "Amara",
        "last_name": "Nwosu",
        "dob": "1988-03-14",
        "gender": "F",
        "contact_info": "555-0142"
    })
}

pub fn hospital_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "General",
        "address": "12 Hill Rd",
        "contact_info": "555-0100"
    })
}

pub fn referral_json(id: i64, patient: i64, from: i64, to: i64) -> Value {
    json!({
        "id": id,
        "patient": patient,
        "referred_from": from,
        "referred_to": to,
        "referral_reason": "Specialist review",
        "referral_date": "2024-04-18",
        "status": "Pending"
    })
}

/// Mount a GET route answering 200 with `body`
pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
