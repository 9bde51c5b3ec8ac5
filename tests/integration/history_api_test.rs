//! Integration tests for the history HTTP API.

mod helpers;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use trailhub_entity::history::NewHistoryEntry;

fn d1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 15, 4, 0).unwrap()
}

/// invoice/create@D1, invoice/update@D1, user/delete@D2
async fn seeded_app() -> helpers::TestApp {
    let app = helpers::TestApp::new().await;
    app.seed(
        NewHistoryEntry::new("invoice", "1", "create")
            .named("INV-0001")
            .by("u1", "Alice Moreau")
            .at(d1()),
    )
    .await;
    app.seed(
        NewHistoryEntry::new("invoice", "1", "update")
            .named("INV-0001")
            .with_changes(r#"{"status":"paid"}"#)
            .by("u2", "Bob Stone")
            .at(d1()),
    )
    .await;
    app.seed(
        NewHistoryEntry::new("user", "9", "delete")
            .named("carol")
            .by("u1", "Alice Moreau")
            .at(d1() + Duration::days(1)),
    )
    .await;
    app
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_record_then_list() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/history",
            Some(json!({
                "entity_type": "invoice",
                "entity_id": "42",
                "entity_name": "INV-0042",
                "action": "create",
                "changes": [{ "field": "total", "from": "0", "to": "120" }],
                "user_id": "u1",
                "user_name": "Alice"
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    let id = response.body["data"]["id"].as_i64().expect("id");
    assert!(id > 0);

    let list = app.request("GET", "/api/history", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"]["total"], 1);
    let entry = &list.body["data"]["groups"][0]["entries"][0];
    assert_eq!(entry["id"], id);
    assert_eq!(entry["title"], "INV-0042");
    assert_eq!(entry["icon"], "plus");
    assert_eq!(entry["has_changes"], true);
}

#[tokio::test]
async fn test_record_missing_fields_is_rejected() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request("POST", "/api/history", Some(json!({ "entity_type": "invoice" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let list = app.request("GET", "/api/history", None).await;
    assert_eq!(list.body["data"]["total"], 0);
}

#[tokio::test]
async fn test_record_blank_fields_are_rejected() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/history",
            Some(json!({ "entity_type": "invoice", "entity_id": "1", "action": "   " })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_record_malformed_body_is_rejected() {
    let app = helpers::TestApp::new().await;
    let response = app
        .raw_request("POST", "/api/history", "{not json".to_string())
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_groups_by_day() {
    let app = seeded_app().await;
    let response = app.request("GET", "/api/history", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["has_active_filters"], false);

    let groups = data["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["date"], "2024-05-03");
    assert_eq!(groups[1]["date"], "2024-05-02");
    assert_eq!(groups[1]["heading"], "Thursday, May 2, 2024");
    assert_eq!(groups[1]["count"], 2);
    assert_eq!(groups[1]["count_label"], "2 changes");
    assert_eq!(groups[1]["entries"][0]["action"], "create");
    assert_eq!(groups[1]["entries"][1]["action"], "update");
    assert_eq!(groups[1]["entries"][1]["time"], "3:04 PM");
}

#[tokio::test]
async fn test_list_filters_by_entity_type() {
    let app = seeded_app().await;

    for path in [
        "/api/history?entity_type=invoice",
        "/api/history?entityType=invoice",
    ] {
        let response = app.request("GET", path, None).await;
        assert_eq!(response.status, StatusCode::OK);
        let data = &response.body["data"];
        assert_eq!(data["total"], 2);
        assert_eq!(data["has_active_filters"], true);
        assert_eq!(data["groups"].as_array().map(Vec::len), Some(1));
        assert_eq!(data["groups"][0]["date"], "2024-05-02");
    }

    let all = app.request("GET", "/api/history?entity_type=all&action=all", None).await;
    assert_eq!(all.body["data"]["total"], 3);
    assert_eq!(all.body["data"]["has_active_filters"], false);
}

#[tokio::test]
async fn test_list_search_matches_actor_name() {
    let app = seeded_app().await;
    let response = app.request("GET", "/api/history?search=stone", None).await;

    assert_eq!(response.body["data"]["total"], 1);
    assert_eq!(
        response.body["data"]["groups"][0]["entries"][0]["user_name"],
        "Bob Stone"
    );
}

#[tokio::test]
async fn test_list_date_bounds() {
    let app = seeded_app().await;

    let d1_only = app
        .request("GET", "/api/history?from=2024-05-02&to=2024-05-02", None)
        .await;
    assert_eq!(d1_only.body["data"]["total"], 2);

    let ignored = app
        .request("GET", "/api/history?from=not-a-date&to=2024-13-45", None)
        .await;
    assert_eq!(ignored.status, StatusCode::OK);
    assert_eq!(ignored.body["data"]["total"], 3);
}

#[tokio::test]
async fn test_list_honours_timezone_override() {
    let app = helpers::TestApp::new().await;
    app.seed(
        NewHistoryEntry::new("invoice", "1", "create")
            .at(Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()),
    )
    .await;

    let utc = app.request("GET", "/api/history", None).await;
    assert_eq!(utc.body["data"]["groups"][0]["date"], "2024-05-01");

    let ist = app.request("GET", "/api/history?tz=%2B05%3A30", None).await;
    assert_eq!(ist.body["data"]["groups"][0]["date"], "2024-05-02");
    assert_eq!(ist.body["data"]["groups"][0]["entries"][0]["time"], "1:30 AM");
}

#[tokio::test]
async fn test_detail_decodes_legacy_mapping() {
    let app = seeded_app().await;
    let response = app.request("GET", "/api/history/2", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["action_label"], "Update");
    assert_eq!(data["timestamp"], "May 2, 2024, 3:04:00 PM");
    assert_eq!(
        data["changes"],
        json!([{ "field": "status", "from": null, "to": "paid", "is_addition": true }])
    );
}

#[tokio::test]
async fn test_detail_not_found() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/history/404", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_filter_options_cover_whole_store() {
    let app = seeded_app().await;
    let response = app.request("GET", "/api/history/filters", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["entity_types"],
        json!([
            { "value": "invoice", "label": "Invoice" },
            { "value": "user", "label": "User" }
        ])
    );
    assert_eq!(
        response.body["data"]["actions"].as_array().map(Vec::len),
        Some(3)
    );
}

#[tokio::test]
async fn test_entity_timeline() {
    let app = seeded_app().await;

    let invoice = app.request("GET", "/api/history/entities/invoice/1", None).await;
    assert_eq!(invoice.status, StatusCode::OK);
    assert_eq!(invoice.body["data"]["total"], 2);

    let missing = app.request("GET", "/api/history/entities/invoice/404", None).await;
    assert_eq!(missing.status, StatusCode::OK);
    assert_eq!(missing.body["data"]["total"], 0);
    assert_eq!(missing.body["data"]["groups"], json!([]));
}

#[tokio::test]
async fn test_storage_failure_returns_empty_with_error() {
    let app = seeded_app().await;
    app.db.close().await;

    let response = app.request("GET", "/api/history?entity_type=invoice", None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["data"]["groups"], json!([]));
    assert_eq!(response.body["data"]["total"], 0);
    assert_eq!(response.body["data"]["has_active_filters"], true);
    assert_eq!(response.body["error"]["error"], "STORAGE_ERROR");

    let health = app.request("GET", "/api/health", None).await;
    assert_eq!(health.body["data"]["database"], "unavailable");
}
