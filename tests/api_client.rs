// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use moroccoin_admin::api::{
	AUTH_TOKEN, ApiClient, ApiError, CredentialStore, ListParams, MemoryCredentialStore, USER_DATA,
};
use moroccoin_admin::listing::{ListQuery, SortDirection, SortState};
use moroccoin_admin::model::RefundStatus;
use moroccoin_admin::mutation::RefundDecision;
use moroccoin_admin::source::{ApiSource, RecordSource};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, credentials: MemoryCredentialStore) -> ApiClient {
	ApiClient::new(&server.uri(), Duration::from_secs(5), Arc::new(credentials)).expect("client should build")
}

fn user_json(user_id: &str, first_name: &str) -> Value {
	json!({
		"user_id": user_id,
		"email": format!("{}@example.com", first_name.to_lowercase()),
		"first_name": first_name,
		"last_name": "Test",
		"verification_status": "verified",
		"created_at": "2024-01-15T10:30:00Z",
		"updated_at": "2024-01-15T10:30:00Z",
		"is_active": true
	})
}

fn refund_json(refund_id: &str, status: &str) -> Value {
	json!({
		"refund_id": refund_id,
		"transaction_id": "TXN-001",
		"user_name": "Ahmed Benali",
		"user_email": "ahmed@example.com",
		"original_amount": 5000.0,
		"refund_amount": 2500.0,
		"currency": "MAD",
		"reason": "Duplicate charge",
		"status": status,
		"priority": "high",
		"created_at": "2024-01-15T10:30:00Z",
		"updated_at": "2024-01-15T10:30:00Z",
		"admin_notes": "",
		"refund_method": "Bank Transfer",
		"estimated_completion": "2024-01-18T10:30:00Z",
		"contact_attempts": 0
	})
}

#[tokio::test]
async fn requests_carry_the_stored_token() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/dashboard/charts/"))
		.and(header("authorization", "Bearer secret-token"))
		.and(query_param("days", "30"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"daily_data": [{ "date": "2024-01-15", "transactions": 4, "volume": 1200.5 }],
			"status_distribution": [{ "status": "completed", "count": 4 }]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let client = client_for(&server, MemoryCredentialStore::with_token("secret-token"));
	let chart = client.chart_data(30).await.expect("chart data should load");

	assert_eq!(chart.daily_data.len(), 1);
	assert_eq!(chart.status_distribution[0].status, "completed");
}

#[tokio::test]
async fn unauthorized_response_clears_credentials() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/users/"))
		.respond_with(ResponseTemplate::new(401))
		.mount(&server)
		.await;

	let credentials = MemoryCredentialStore::with_token("expired");
	credentials.set(USER_DATA, "{}").await.expect("memory store accepts values");
	let client = client_for(&server, credentials.clone());

	let error = client.users(&ListParams::new()).await.expect_err("401 should fail");
	assert!(error.is_unauthorized());
	assert_eq!(credentials.get(AUTH_TOKEN).await.expect("readable"), None);
	assert_eq!(credentials.get(USER_DATA).await.expect("readable"), None);
}

#[tokio::test]
async fn other_failures_keep_credentials() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/refunds/"))
		.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
		.mount(&server)
		.await;

	let credentials = MemoryCredentialStore::with_token("still-good");
	let client = client_for(&server, credentials.clone());

	match client.refunds(&ListParams::new()).await {
		Err(ApiError::Status { status, body, .. }) => {
			assert_eq!(status, 500);
			assert_eq!(body, "boom");
		}
		other => panic!("expected a status error, got {:?}", other.map(|page| page.count)),
	}
	assert_eq!(
		credentials.get(AUTH_TOKEN).await.expect("readable").as_deref(),
		Some("still-good")
	);
}

#[tokio::test]
async fn login_stores_token_and_profile() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth/login/"))
		.and(body_json(json!({ "username": "admin", "password": "hunter2" })))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"token": "fresh-token",
			"user": { "id": 7, "username": "admin", "first_name": "Salma", "last_name": "Idrissi" }
		})))
		.mount(&server)
		.await;

	let credentials = MemoryCredentialStore::new();
	let client = client_for(&server, credentials.clone());
	client.login("admin", "hunter2").await.expect("login should succeed");

	assert!(client.is_signed_in().await.expect("readable"));
	assert_eq!(
		credentials.get(AUTH_TOKEN).await.expect("readable").as_deref(),
		Some("fresh-token")
	);
	let profile = client.stored_profile().await.expect("readable").expect("profile stored");
	assert_eq!(profile.display_name(), "Salma Idrissi");
}

#[tokio::test]
async fn logout_clears_credentials_even_when_the_call_fails() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/auth/logout/"))
		.respond_with(ResponseTemplate::new(503))
		.mount(&server)
		.await;

	let credentials = MemoryCredentialStore::with_token("token");
	credentials.set(USER_DATA, "{}").await.expect("memory store accepts values");
	let client = client_for(&server, credentials.clone());

	assert!(client.logout().await.is_err());
	assert!(!client.is_signed_in().await.expect("readable"));
	assert_eq!(credentials.get(USER_DATA).await.expect("readable"), None);
}

#[tokio::test]
async fn collect_pages_follows_next_links() {
	let server = MockServer::start().await;
	let second_page = format!("{}/users/?page=2", server.uri());
	Mock::given(method("GET"))
		.and(path("/users/"))
		.and(query_param("page", "2"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"count": 3,
			"next": null,
			"previous": format!("{}/users/", server.uri()),
			"results": [user_json("user_3", "Omar")]
		})))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/users/"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"count": 3,
			"next": second_page,
			"previous": null,
			"results": [user_json("user_1", "Ahmed"), user_json("user_2", "Fatima")]
		})))
		.mount(&server)
		.await;

	let source = ApiSource::new(client_for(&server, MemoryCredentialStore::with_token("token")));
	let users = source.users().await.expect("every page should load");

	let ids: Vec<&str> = users.iter().map(|user| user.user_id.as_str()).collect();
	assert_eq!(ids, ["user_1", "user_2", "user_3"]);
}

#[tokio::test]
async fn missing_user_is_not_an_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/users/user_404/"))
		.respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
		.mount(&server)
		.await;

	let source = ApiSource::new(client_for(&server, MemoryCredentialStore::with_token("token")));
	assert_eq!(source.user("user_404").await.expect("404 is not a failure"), None);
}

#[tokio::test]
async fn list_queries_become_query_parameters() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/refunds/"))
		.and(query_param("page", "2"))
		.and(query_param("search", "ahmed"))
		.and(query_param("ordering", "priority"))
		.and(query_param("status", "pending"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"count": 11,
			"next": null,
			"previous": null,
			"results": [refund_json("REF-011", "pending")]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let mut query = ListQuery {
		sort: SortState::new("priority", SortDirection::Asc),
		..ListQuery::default()
	};
	query.set_search(" ahmed ");
	query.set_filter("status", "pending");
	query.page = 2;

	let client = client_for(&server, MemoryCredentialStore::with_token("token"));
	let page = client
		.refunds(&ListParams::from_query(&query))
		.await
		.expect("filtered page should load");
	assert_eq!(page.count, 11);
	assert_eq!(page.results[0].status, RefundStatus::Pending);
}

#[tokio::test]
async fn refund_decisions_post_the_action() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/refunds/REF-001/process/"))
		.and(body_json(json!({ "action": "approve" })))
		.respond_with(ResponseTemplate::new(200).set_body_json(refund_json("REF-001", "approved")))
		.expect(1)
		.mount(&server)
		.await;

	let client = client_for(&server, MemoryCredentialStore::with_token("token"));
	let refund = client
		.process_refund("REF-001", RefundDecision::Approve)
		.await
		.expect("decision should be accepted");
	assert_eq!(refund.status, RefundStatus::Approved);
}

#[tokio::test]
async fn health_check_reports_status() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/health/"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"status": "healthy",
			"timestamp": "2024-01-15T10:30:00Z"
		})))
		.mount(&server)
		.await;

	let client = client_for(&server, MemoryCredentialStore::new());
	assert_eq!(client.health().await.expect("health should load").status, "healthy");
}
