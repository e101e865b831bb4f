//! Home aggregate fetch and equipment search

mod common;

use libreferral::service::home::{EQUIPMENT_SEARCH_FAILED, FETCH_FAILED};
use libreferral::Loadable;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROUTES: [&str; 6] = [
    "/hospitals",
    "/patients",
    "/medical-history",
    "/diagnostics",
    "/equipment",
    "/referrals",
];

fn body_for(route: &str) -> serde_json::Value {
    match route {
        "/hospitals" => json!([common::hospital_json(3, "Central"), common::hospital_json(7, "Riverside")]),
        "/patients" => json!([common::patient_json(1)]),
        "/medical-history" => json!([{
            "condition": "Hypertension",
            "treatment": "ACE inhibitor",
            "start_date": "2021-02-01"
        }]),
        "/diagnostics" => json!([{
            "diagnostic_type": "ECG",
            "result": "Normal sinus rhythm",
            "date_taken": "2024-01-10"
        }]),
        "/equipment" => json!([{
            "id": 1,
            "hospital": {"id": 3, "name": "Central"},
            "equipment_name": "MRI",
            "available": true
        }]),
        "/referrals" => json!([common::referral_json(1, 1, 3, 7)]),
        _ => json!([]),
    }
}

async fn mount_all_except(server: &MockServer, failing: Option<&str>) {
    for route in ROUTES {
        if Some(route) == failing {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
                .mount(server)
                .await;
        } else {
            common::mount_get(server, route, body_for(route)).await;
        }
    }
}

#[tokio::test]
async fn test_home_loads_all_sections() {
    let server = MockServer::start().await;
    mount_all_except(&server, None).await;

    let service = common::service_for(&server);
    let view = service.home().load().await;

    let data = view.data.ready().expect("home data");
    assert_eq!(data.hospitals.len(), 2);
    assert_eq!(data.patients[0].full_name(), "Amara Nwosu");
    assert_eq!(data.medical_history.len(), 1);
    assert_eq!(data.diagnostics.len(), 1);
    assert_eq!(data.equipment.len(), 1);
    assert_eq!(data.referrals[0].referred_to, 7);
    assert!(view.user.is_none());
}

#[tokio::test]
async fn test_any_single_failure_fails_every_section() {
    for failing in ROUTES {
        let server = MockServer::start().await;
        mount_all_except(&server, Some(failing)).await;

        let service = common::service_for(&server);
        let view = service.home().load().await;

        assert_eq!(
            view.data,
            Loadable::Failed(FETCH_FAILED),
            "failing {} should fail the whole view",
            failing
        );
    }
}

#[tokio::test]
async fn test_undecodable_collection_fails_view() {
    let server = MockServer::start().await;
    for route in ROUTES {
        let body = if route == "/patients" {
            json!({"unexpected": true})
        } else {
            body_for(route)
        };
        common::mount_get(&server, route, body).await;
    }

    let service = common::service_for(&server);
    let view = service.home().load().await;

    assert_eq!(view.data.error(), Some(FETCH_FAILED));
}

#[tokio::test]
async fn test_current_user_looked_up_by_username_claim() {
    let server = MockServer::start().await;
    mount_all_except(&server, None).await;
    Mock::given(method("GET"))
        .and(path("/users/"))
        .and(query_param("username", "dr_okafor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 4, "hospital": 3, "role": "doctor"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = common::signed_in_service(&server, "dr_okafor");
    let view = service.home().load().await;

    let user = view.user.expect("user");
    assert_eq!(user.hospital, Some(3));
    assert_eq!(user.role.as_deref(), Some("doctor"));
    assert!(view.data.ready().is_some());
}

#[tokio::test]
async fn test_user_lookup_failure_does_not_fail_home() {
    let server = MockServer::start().await;
    mount_all_except(&server, None).await;
    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let service = common::signed_in_service(&server, "ghost");
    let view = service.home().load().await;

    assert!(view.user.is_none());
    assert!(view.data.ready().is_some());
}

#[tokio::test]
async fn test_blank_search_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let service = common::service_for(&server);

    assert!(service.home().search_equipment("").await.is_none());
    assert!(service.home().search_equipment("   ").await.is_none());
}

#[tokio::test]
async fn test_search_groups_results_by_hospital() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .and(query_param("equipment_name", "ventilator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "hospital": {"id": 3, "name": "Central"}, "equipment_name": "Ventilator A"},
            {"id": 2, "hospital": 9, "equipment_name": "Ventilator B"},
            {"id": 3, "hospital": {"id": 3, "name": "Central"}, "equipment_name": "Ventilator C"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let result = service
        .home()
        .search_equipment(" ventilator ")
        .await
        .expect("search issued");

    let groups = result.ready().expect("groups");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].hospital, "Central");
    assert_eq!(groups[0].equipment.len(), 2);
    assert_eq!(groups[1].hospital, "Hospital ID: 9");
}

#[tokio::test]
async fn test_search_keeps_equipment_without_hospital() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "hospital": null, "equipment_name": "Portable X-ray"},
            {"id": 2, "hospital": {"id": 3, "name": "Central"}, "equipment_name": "X-ray suite"}
        ])))
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let result = service
        .home()
        .search_equipment("x-ray")
        .await
        .expect("search issued");

    let groups = result.ready().expect("groups");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].hospital, "Hospital ID: unknown");
    assert_eq!(groups[0].equipment[0].equipment_name.as_deref(), Some("Portable X-ray"));
    assert_eq!(groups[1].hospital, "Central");
}

#[tokio::test]
async fn test_search_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/equipment"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let service = common::service_for(&server);
    let result = service.home().search_equipment("mri").await;

    assert_eq!(result, Some(Loadable::Failed(EQUIPMENT_SEARCH_FAILED)));
}
