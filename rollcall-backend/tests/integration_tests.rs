use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use rollcall_backend::cache::{Published, SnapshotCache};
use rollcall_backend::create_app;
use rollcall_snapshot::Snapshot;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tower::ServiceExt;
// for `oneshot` method

const SAMPLE_JSON: &str = include_str!("../../rollcall-snapshot/tests/data/sample.json");
const GROUPS_ONLY_JSON: &str = include_str!("../../rollcall-snapshot/tests/data/groups_only.json");

const FURRY_KARAOKE: &str = "wrld_7416746a-9a5f-4d49-8135-2ff55388b09d";
const GROUP_MAMMALS: &str = "grp_aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
const ROLE_KING: &str = "grol_aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
const ROLE_PRINCE: &str = "grol_bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";
const GROUP_AMPHIBIANS: &str = "grp_bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";
const GUILD_FELINES: &str = "111111111111111111";
const ROLE_STRIPES: &str = "333333333333333333";
const GUILD_EVERYONE: &str = "444444444444444444";

/// Helper to publish a document into a fresh cache
fn cache_with(document: &str) -> SnapshotCache {
    let snapshot = Snapshot::from_json(document).expect("Failed to parse test document");
    let updated_at = snapshot.date_time().unwrap_or_else(Utc::now);
    let cache = SnapshotCache::new();
    cache.publish(Published {
        snapshot,
        updated_at,
        refreshed_at: Utc::now(),
    });
    cache
}

/// Helper to create app with default test configuration
fn create_test_app(cache: SnapshotCache) -> axum::Router {
    let config = rollcall_backend::config::Config::default();
    create_app(cache, Arc::new(Notify::new()), config.request_timeout)
}

/// Helper to create app over the worked sample document
fn sample_app() -> axum::Router {
    create_test_app(cache_with(SAMPLE_JSON))
}

/// Helper to send a request and get response
async fn send_request(app: axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap();

    // Send request
    let response = app.oneshot(request).await.unwrap();

    // Extract status
    let status = response.status();

    // Extract body
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    // Try to parse as JSON, or return empty object
    let json = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

// =============================================================================
// HEALTH AND STATUS TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    // GIVEN: An application with no snapshot yet
    let app = create_test_app(SnapshotCache::new());

    // WHEN: Making a GET request to /health
    let (status, _body) = send_request(app, "GET", "/health").await;

    // THEN: Should return 200 OK even before the first refresh
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint_with_post_method() {
    // GIVEN: A running application
    let app = sample_app();

    // WHEN: Making a POST request to /health (wrong method)
    let (status, _body) = send_request(app, "POST", "/health").await;

    // THEN: Should return 405 Method Not Allowed
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_status_before_first_refresh() {
    // GIVEN: An empty cache
    let app = create_test_app(SnapshotCache::new());

    // WHEN: Checking status
    let (status, body) = send_request(app, "GET", "/status").await;

    // THEN: Should report not ready with no timestamps
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ready": false }));
}

#[tokio::test]
async fn test_status_after_publish() {
    // GIVEN: The sample document is published
    let app = sample_app();

    // WHEN: Checking status
    let (status, body) = send_request(app, "GET", "/status").await;

    // THEN: Should report ready with the document's file time
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["fileTimeUtc"], 130_343_040_000_000_000i64);
    assert_eq!(body["updatedAt"], "2014-01-16T00:00:00Z");
    assert!(body["refreshedAt"].is_string());
}

// =============================================================================
// REFRESH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_refresh_request_is_accepted_and_signalled() {
    // GIVEN: An application wired to a refresh signal
    let refresh_requests = Arc::new(Notify::new());
    let config = rollcall_backend::config::Config::default();
    let app = create_app(
        SnapshotCache::new(),
        Arc::clone(&refresh_requests),
        config.request_timeout,
    );

    // WHEN: Requesting a manual refresh
    let (status, _body) = send_request(app, "POST", "/refresh").await;

    // THEN: Should return 202 Accepted
    assert_eq!(status, StatusCode::ACCEPTED);

    // AND: The refresher should be woken
    tokio::time::timeout(Duration::from_secs(1), refresh_requests.notified())
        .await
        .expect("refresh signal should be pending");
}

#[tokio::test]
async fn test_refresh_with_get_method() {
    // GIVEN: A running application
    let app = sample_app();

    // WHEN: Making a GET request to /refresh
    let (status, _body) = send_request(app, "GET", "/refresh").await;

    // THEN: Should return 405 Method Not Allowed
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// NOT READY TESTS
// =============================================================================

#[tokio::test]
async fn test_queries_before_first_refresh_are_unavailable() {
    // GIVEN: An empty cache
    let uris = [
        format!("/worlds/{FURRY_KARAOKE}"),
        format!("/groups/{GROUP_MAMMALS}"),
        format!("/groups/{GROUP_MAMMALS}/roles/{ROLE_KING}"),
        format!("/servers/{GUILD_FELINES}"),
        format!("/servers/{GUILD_FELINES}/roles/{ROLE_STRIPES}"),
        "/users/Lion".to_string(),
        format!("/users/Lion/groups/{GROUP_MAMMALS}"),
        format!("/users/Lion/groups/{GROUP_MAMMALS}/roles/{ROLE_KING}"),
        format!("/users/Lion/servers/{GUILD_FELINES}"),
        format!("/users/Lion/servers/{GUILD_FELINES}/roles/{ROLE_STRIPES}"),
    ];

    for uri in uris {
        // WHEN: Querying any snapshot route
        let app = create_test_app(SnapshotCache::new());
        let (status, _body) = send_request(app, "GET", &uri).await;

        // THEN: Should return 503 Service Unavailable
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "uri: {uri}");
    }
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_readiness() {
    // GIVEN: An empty cache
    let app = create_test_app(SnapshotCache::new());

    // WHEN: Querying with an invalid id
    let (status, _body) = send_request(app, "GET", "/groups/grp.bad").await;

    // THEN: Validation runs first
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// WORLD TESTS
// =============================================================================

#[tokio::test]
async fn test_world_fields() {
    // GIVEN: The sample document
    let app = sample_app();

    // WHEN: Fetching the Furry Karaoke world
    let (status, body) = send_request(app, "GET", &format!("/worlds/{FURRY_KARAOKE}")).await;

    // THEN: All fields come back
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "name": "Furry Karaoke",
            "visits": 1415496,
            "favorites": 35314,
            "occupants": 109
        })
    );
}

#[tokio::test]
async fn test_unknown_world_is_not_found() {
    // GIVEN: The sample document
    let app = sample_app();

    // WHEN: Fetching a world that is not in it
    let (status, _body) = send_request(app, "GET", "/worlds/wrld_missing").await;

    // THEN: Should return 404
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_world_on_groups_only_document_is_not_found() {
    // GIVEN: A document with only a groups mapping
    let app = create_test_app(cache_with(GROUPS_ONLY_JSON));

    // WHEN: Fetching a world
    let (status, _body) = send_request(app, "GET", &format!("/worlds/{FURRY_KARAOKE}")).await;

    // THEN: Should return 404
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// GROUP TESTS
// =============================================================================

#[tokio::test]
async fn test_group_summary() {
    // GIVEN: The sample document
    let app = sample_app();

    // WHEN: Fetching the Mammals group
    let (status, body) = send_request(app, "GET", &format!("/groups/{GROUP_MAMMALS}")).await;

    // THEN: Members resolve in list order
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "name": "Mammals",
            "memberCount": 5,
            "members": ["Lion", "Tiger", "Cat", "Wolf", "Cow"]
        })
    );
}

#[tokio::test]
async fn test_group_roles() {
    // GIVEN: The sample document
    let king_uri = format!("/groups/{GROUP_MAMMALS}/roles/{ROLE_KING}");
    let prince_uri = format!("/groups/{GROUP_MAMMALS}/roles/{ROLE_PRINCE}");

    // WHEN: Fetching the King and Prince roles
    let (king_status, king) = send_request(sample_app(), "GET", &king_uri).await;
    let (prince_status, prince) = send_request(sample_app(), "GET", &prince_uri).await;

    // THEN: Flags and members come back, absent flags read as false
    assert_eq!(king_status, StatusCode::OK);
    assert_eq!(
        king,
        json!({ "name": "King", "isAdmin": true, "isModerator": true, "members": ["Lion"] })
    );
    assert_eq!(prince_status, StatusCode::OK);
    assert_eq!(
        prince,
        json!({ "name": "Prince", "isAdmin": false, "isModerator": true, "members": ["Wolf"] })
    );
}

#[tokio::test]
async fn test_unknown_group_and_role_are_not_found() {
    // GIVEN: The sample document
    // WHEN: Fetching an unknown group, and an unknown role of a known group
    let (group_status, group_body) = send_request(sample_app(), "GET", "/groups/grp_missing").await;
    let (role_status, role_body) = send_request(
        sample_app(),
        "GET",
        &format!("/groups/{GROUP_MAMMALS}/roles/grol_missing"),
    )
    .await;

    // THEN: Both are 404 naming what was missing
    assert_eq!(group_status, StatusCode::NOT_FOUND);
    assert_eq!(group_body["error"], "No data for this group");
    assert_eq!(role_status, StatusCode::NOT_FOUND);
    assert_eq!(role_body["error"], "No data for this role");
}

#[tokio::test]
async fn test_group_with_unresolvable_member_is_not_found() {
    // GIVEN: A group whose member list points past the name table
    let document = json!({
        "vrcUserDisplayNames": ["Lion", "Tiger"],
        "vrcGroupsById": {
            "grp_broken": { "name": "Broken", "vrcUsers": [0, 1, 7], "roles": {} }
        }
    })
    .to_string();
    let app = create_test_app(cache_with(&document));

    // WHEN: Fetching the group
    let (status, body) = send_request(app, "GET", "/groups/grp_broken").await;

    // THEN: No partial list is returned
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("members").is_none());
}

// =============================================================================
// SERVER TESTS
// =============================================================================

#[tokio::test]
async fn test_server_summary() {
    // GIVEN: The sample document
    // WHEN: Fetching both servers
    let (felines_status, felines) =
        send_request(sample_app(), "GET", &format!("/servers/{GUILD_FELINES}")).await;
    let (everyone_status, everyone) =
        send_request(sample_app(), "GET", &format!("/servers/{GUILD_EVERYONE}")).await;

    // THEN: Linked count is the vrcUsers length, independent of memberCount
    assert_eq!(felines_status, StatusCode::OK);
    assert_eq!(
        felines,
        json!({
            "name": "Felines",
            "memberCount": 500,
            "linkedMemberCount": 3,
            "members": ["Lion", "Tiger", "Cat"]
        })
    );
    assert_eq!(everyone_status, StatusCode::OK);
    assert_eq!(everyone["memberCount"], 1000);
    assert_eq!(everyone["linkedMemberCount"], 7);
    assert_eq!(
        everyone["members"],
        json!(["Lion", "Tiger", "Cat", "Wolf", "Cow", "Frog", "Salamander"])
    );
}

#[tokio::test]
async fn test_server_role() {
    // GIVEN: The sample document
    let app = sample_app();

    // WHEN: Fetching the Stripes role
    let (status, body) = send_request(
        app,
        "GET",
        &format!("/servers/{GUILD_FELINES}/roles/{ROLE_STRIPES}"),
    )
    .await;

    // THEN: Only the moderator flag is set
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "name": "Stripes", "isAdmin": false, "isModerator": true, "members": ["Tiger"] })
    );
}

#[tokio::test]
async fn test_servers_missing_from_groups_only_document() {
    // GIVEN: A document with only a groups mapping
    let app = create_test_app(cache_with(GROUPS_ONLY_JSON));

    // WHEN: Fetching a server
    let (status, body) = send_request(app, "GET", &format!("/servers/{GUILD_FELINES}")).await;

    // THEN: Should return 404
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No data for this server");
}

// =============================================================================
// USER TESTS
// =============================================================================

#[tokio::test]
async fn test_user_anywhere_flags() {
    // GIVEN: The sample document
    let cases = [
        ("Lion", true, true),
        ("Tiger", false, true),
        ("Cat", false, false),
        ("Wolf", false, true),
        ("Cow", false, false),
        ("Frog", true, true),
        ("Salamander", false, false),
        ("Nobody", false, false),
    ];

    for (name, admin, moderator) in cases {
        // WHEN: Asking about the user
        let (status, body) = send_request(sample_app(), "GET", &format!("/users/{name}")).await;

        // THEN: Flags match the roles they hold
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "adminAnywhere": admin, "moderatorAnywhere": moderator }),
            "user: {name}"
        );
    }
}

#[tokio::test]
async fn test_anywhere_flags_need_both_collections() {
    // GIVEN: A document with only a groups mapping
    let app = create_test_app(cache_with(GROUPS_ONLY_JSON));

    // WHEN: Asking about a user
    let (status, body) = send_request(app, "GET", "/users/Lion").await;

    // THEN: Neither flag can be established
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "adminAnywhere": false, "moderatorAnywhere": false })
    );
}

#[tokio::test]
async fn test_user_group_membership() {
    // GIVEN: The sample document
    let cases = [
        ("Lion", GROUP_MAMMALS, true, true, true),
        ("Wolf", GROUP_MAMMALS, true, false, true),
        ("Cow", GROUP_MAMMALS, true, false, false),
        ("Frog", GROUP_MAMMALS, false, false, false),
        ("Frog", GROUP_AMPHIBIANS, true, true, true),
        ("Salamander", GROUP_AMPHIBIANS, true, false, false),
    ];

    for (name, group_id, member, admin, moderator) in cases {
        // WHEN: Asking about the user in the group
        let (status, body) = send_request(
            sample_app(),
            "GET",
            &format!("/users/{name}/groups/{group_id}"),
        )
        .await;

        // THEN: Membership and permissions match the document
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "member": member, "admin": admin, "moderator": moderator }),
            "user: {name}, group: {group_id}"
        );
    }
}

#[tokio::test]
async fn test_user_group_role() {
    // GIVEN: The sample document
    let uri = |name: &str, role_id: &str| format!("/users/{name}/groups/{GROUP_MAMMALS}/roles/{role_id}");

    // WHEN: Asking whether users hold the King role
    let (_, lion) = send_request(sample_app(), "GET", &uri("Lion", ROLE_KING)).await;
    let (_, tiger) = send_request(sample_app(), "GET", &uri("Tiger", ROLE_KING)).await;
    let (_, wolf) = send_request(sample_app(), "GET", &uri("Wolf", ROLE_PRINCE)).await;

    // THEN: Only listed members hold it
    assert_eq!(lion, json!({ "hasRole": true }));
    assert_eq!(tiger, json!({ "hasRole": false }));
    assert_eq!(wolf, json!({ "hasRole": true }));
}

#[tokio::test]
async fn test_user_server_membership_and_role() {
    // GIVEN: The sample document
    // WHEN: Asking about Tiger in Felines and Frog in Felines
    let (tiger_status, tiger) = send_request(
        sample_app(),
        "GET",
        &format!("/users/Tiger/servers/{GUILD_FELINES}"),
    )
    .await;
    let (_, frog) = send_request(
        sample_app(),
        "GET",
        &format!("/users/Frog/servers/{GUILD_FELINES}"),
    )
    .await;
    let (_, stripes) = send_request(
        sample_app(),
        "GET",
        &format!("/users/Tiger/servers/{GUILD_FELINES}/roles/{ROLE_STRIPES}"),
    )
    .await;

    // THEN: Tiger is a moderator through Stripes; Frog is not a member
    assert_eq!(tiger_status, StatusCode::OK);
    assert_eq!(
        tiger,
        json!({ "member": true, "admin": false, "moderator": true })
    );
    assert_eq!(
        frog,
        json!({ "member": false, "admin": false, "moderator": false })
    );
    assert_eq!(stripes, json!({ "hasRole": true }));
}

#[tokio::test]
async fn test_user_name_with_space_is_decoded() {
    // GIVEN: A document with a display name containing a space
    let document = json!({
        "vrcUserDisplayNames": ["Big Cat"],
        "vrcGroupsById": { "grp_cats": { "vrcUsers": [0], "roles": {} } },
        "discordServersById": {}
    })
    .to_string();
    let app = create_test_app(cache_with(&document));

    // WHEN: Asking about the percent-encoded name
    let (status, body) = send_request(app, "GET", "/users/Big%20Cat/groups/grp_cats").await;

    // THEN: The decoded name is looked up
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member"], true);
}

// =============================================================================
// VALIDATION TESTS
// =============================================================================

#[tokio::test]
async fn test_invalid_path_parameters_are_rejected() {
    // GIVEN: The sample document
    let long_id = "1".repeat(129);
    let long_name = "a".repeat(65);
    let uris = [
        "/groups/grp.bad".to_string(),
        format!("/groups/{GROUP_MAMMALS}/roles/bad%20role"),
        format!("/servers/{long_id}"),
        format!("/worlds/{}", "wrld%2Fslash"),
        "/users/Lion%0A".to_string(),
        format!("/users/{long_name}"),
        format!("/users/Lion/servers/{GUILD_FELINES}/roles/bad.role"),
    ];

    for uri in uris {
        // WHEN: Querying with an invalid parameter
        let (status, body) = send_request(sample_app(), "GET", &uri).await;

        // THEN: Should return 400 with an error message
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert!(body["error"].is_string(), "uri: {uri}");
    }
}

// =============================================================================
// SNAPSHOT REPLACEMENT TESTS
// =============================================================================

#[tokio::test]
async fn test_router_serves_latest_published_snapshot() {
    // GIVEN: A router over a cache holding the sample document
    let cache = cache_with(SAMPLE_JSON);
    let app = create_test_app(cache.clone());
    let (_, before) = send_request(app.clone(), "GET", "/users/Lion").await;

    // WHEN: A document without Lion is published
    cache.publish(Published {
        snapshot: Snapshot::from_json(GROUPS_ONLY_JSON).unwrap(),
        updated_at: Utc::now(),
        refreshed_at: Utc::now(),
    });
    let (_, after) = send_request(app, "GET", "/users/Lion").await;

    // THEN: The next request sees the new snapshot
    assert_eq!(before["adminAnywhere"], true);
    assert_eq!(after["adminAnywhere"], false);
}
