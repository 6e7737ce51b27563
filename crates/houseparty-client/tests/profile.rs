mod common;

use houseparty_client::services::profile::load_profile;
use houseparty_client::ClientError;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_for, open_store, temp_db, user};

#[tokio::test]
async fn profile_requires_a_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (_dir, db_path) = temp_db();

    let err = load_profile(&api_for(&server.uri()), &open_store(&db_path))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated));
}

#[tokio::test]
async fn profile_groups_owned_tickets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tickets": [
                {"id": 1, "eventTitle": "A", "eventDate": "2026-01-10", "price": 20, "createdAt": "2026-01-01T10:00:00Z"},
                {"id": 2, "eventTitle": "A", "eventDate": "2026-01-10", "price": 20, "createdAt": "2026-01-02T10:00:00Z"},
                {"id": 3, "eventTitle": "B", "price": 30}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let (_dir, db_path) = temp_db();
    let store = open_store(&db_path);
    let ada = user("Ada", "ada@example.com");
    store.write("jwt-1", &ada).unwrap();

    let profile = load_profile(&api_for(&server.uri()), &store).await.unwrap();

    assert_eq!(profile.user, ada);
    let summary: Vec<(&str, usize, f64)> = profile
        .tickets
        .iter()
        .map(|g| (g.event_title.as_str(), g.count, g.total_price))
        .collect();
    assert_eq!(summary, vec![("A", 2, 40.0), ("B", 1, 30.0)]);
    assert_eq!(profile.tickets[0].event_date.as_deref(), Some("2026-01-10"));
    assert_eq!(
        profile.tickets[0].latest_created_at.as_deref(),
        Some("2026-01-02T10:00:00Z")
    );
}

#[tokio::test]
async fn profile_tolerates_loose_ticket_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tickets": [
                {"id": 1, "eventTitle": "A", "price": "20.00"},
                {"eventTitle": "A", "price": 20},
                {"id": "t-3", "eventTitle": "B", "price": null}
            ]
        })))
        .mount(&server)
        .await;
    let (_dir, db_path) = temp_db();
    let store = open_store(&db_path);
    store.write("jwt-1", &user("Ada", "ada@example.com")).unwrap();

    let profile = load_profile(&api_for(&server.uri()), &store).await.unwrap();

    let summary: Vec<(&str, usize, f64)> = profile
        .tickets
        .iter()
        .map(|g| (g.event_title.as_str(), g.count, g.total_price))
        .collect();
    assert_eq!(summary, vec![("A", 2, 40.0), ("B", 1, 0.0)]);
}

#[tokio::test]
async fn ticket_listing_failure_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Token expired"))
        .mount(&server)
        .await;
    let (_dir, db_path) = temp_db();
    let store = open_store(&db_path);
    store.write("jwt-1", &user("Ada", "ada@example.com")).unwrap();

    let err = load_profile(&api_for(&server.uri()), &store).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
