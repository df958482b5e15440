#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use ambio_client::{
	alerts::{AlertFilter, AlertStatus, StatisticsFilter, ViolationType},
	error::Error,
};
use common::{build_client, seed_tokens};

#[tokio::test]
async fn alert_listing_forwards_every_filter_dimension() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server.base_url());

	seed_tokens(&store, "access-1", "refresh-1").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/alerts")
				.header("authorization", "Bearer access-1")
				.query_param("companyId", "c-1")
				.query_param("status", "active")
				.query_param("violationType", "humidity_max")
				.query_param("limit", "20")
				.query_param("offset", "0");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [{
					"id": "a-1",
					"sensor": { "id": "s-1", "serial": "AMB-001", "name": "Cold room" },
					"violationType": "humidity_max",
					"actualValue": 91.0,
					"thresholdValue": 85.0,
					"thresholdSource": "system_default",
					"status": "active",
					"triggeredAt": "2025-06-01T10:00:00Z",
					"notificationCount": 1,
				}],
				"total": 57,
			}));
		})
		.await;

	let filter = AlertFilter::new()
		.with_company("c-1")
		.with_status(AlertStatus::Active)
		.with_violation_type(ViolationType::HumidityMax)
		.with_page(20, 0);
	let page = client.list_alerts(&filter).await.expect("Filtered listing should succeed.");

	mock.assert_async().await;

	assert_eq!(page.total, 57);
	assert_eq!(page.data.len(), 1);
	assert_eq!(page.data[0].status, AlertStatus::Active);
	assert_eq!(page.data[0].sensor.serial, "AMB-001");
}

#[tokio::test]
async fn notification_history_is_ordered_by_attempt() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server.base_url());

	seed_tokens(&store, "access-1", "refresh-1").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/alerts/a-1/notifications");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [
					{
						"channel": "email",
						"recipient": "ops@acme.example",
						"attemptNumber": 3,
						"status": "failed",
						"createdAt": "2025-06-01T10:30:00Z",
					},
					{
						"channel": "email",
						"recipient": "ops@acme.example",
						"attemptNumber": 1,
						"status": "sent",
						"sentAt": "2025-06-01T10:00:05Z",
						"createdAt": "2025-06-01T10:00:00Z",
					},
					{
						"channel": "email",
						"recipient": "ops@acme.example",
						"attemptNumber": 2,
						"status": "sent",
						"sentAt": "2025-06-01T10:15:05Z",
						"createdAt": "2025-06-01T10:15:00Z",
					},
				],
			}));
		})
		.await;

	let history = client
		.alert_notifications("a-1")
		.await
		.expect("Notification history should load.");
	let attempts: Vec<_> = history.iter().map(|n| n.attempt_number).collect();

	assert_eq!(attempts, [1, 2, 3]);
	assert!(history[0].sent_at.is_some());
	assert!(history[2].sent_at.is_none());
}

#[tokio::test]
async fn statistics_are_aggregated_from_server_rows() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server.base_url());

	seed_tokens(&store, "access-1", "refresh-1").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/alerts/statistics")
				.query_param("companyId", "c-1");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [
					{ "status": "active", "count": "3" },
					{ "status": "resolved", "count": 2 },
					{ "status": "exhausted", "count": "1" },
					{ "status": "maintenance", "count": "4" },
				],
			}));
		})
		.await;

	let stats = client
		.alert_statistics(&StatisticsFilter::new().with_company("c-1"))
		.await
		.expect("Statistics aggregation should succeed.");

	mock.assert_async().await;

	assert_eq!(stats.active, 3);
	assert_eq!(stats.resolved, 2);
	assert_eq!(stats.exhausted, 1);
	// Unrecognized statuses contribute to the total only.
	assert_eq!(stats.total, 10);
}

#[tokio::test]
async fn missing_alerts_surface_as_not_found() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server.base_url());

	seed_tokens(&store, "access-1", "refresh-1").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/alerts/a-missing");
			then.status(404)
				.header("content-type", "application/json")
				.json_body(json!({ "message": "Alert not found" }));
		})
		.await;

	let error = client
		.alert("a-missing")
		.await
		.expect_err("A missing alert should fail the call.");

	match error {
		Error::Api(api) => assert!(api.is_not_found()),
		other => panic!("Expected Error::Api for a missing alert, got {other:?}"),
	}
}

#[tokio::test]
async fn single_alert_payloads_decode_with_resolution() {
	let server = MockServer::start_async().await;
	let (client, store) = build_client(&server.base_url());

	seed_tokens(&store, "access-1", "refresh-1").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/alerts/a-2");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"id": "a-2",
				"sensor": {
					"id": "s-2",
					"serial": "AMB-002",
					"name": "Greenhouse east",
					"location": "Hall B",
				},
				"violationType": "temperature_min",
				"actualValue": 1.5,
				"thresholdValue": 4.0,
				"thresholdSource": "sensor_config",
				"status": "resolved",
				"triggeredAt": "2025-06-01T10:00:00Z",
				"resolvedAt": "2025-06-01T11:00:00Z",
				"notificationCount": 2,
			}));
		})
		.await;

	let alert = client.alert("a-2").await.expect("The alert should load.");

	assert_eq!(alert.status, AlertStatus::Resolved);
	assert_eq!(alert.violation_type, ViolationType::TemperatureMin);

	let resolved_at = alert.resolved_at.expect("A resolved alert carries its resolution instant.");

	assert!(resolved_at >= alert.triggered_at);
}
