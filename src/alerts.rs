//! Typed, filterable read access to threshold-violation alerts.
//!
//! Alerts are created server-side when a sensor reading breaches a configured or default
//! threshold, and move `active -> resolved` (the value returned within bounds) or
//! `active -> exhausted` (the notification budget ran out first). The client only ever
//! reads these transitions; nothing here mutates alert state.

pub mod poll;

pub use poll::PollWatch;

// crates.io
use time::format_description::well_known::Rfc3339;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	client::Client,
	http::ApiTransport,
	resources::{Envelope, Page},
};

/// Lifecycle status of an alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
	/// The violating condition is ongoing.
	Active,
	/// The value returned within bounds.
	Resolved,
	/// The notification budget was consumed without resolution.
	Exhausted,
}
impl AlertStatus {
	/// Returns the wire-format label.
	pub const fn as_str(self) -> &'static str {
		match self {
			AlertStatus::Active => "active",
			AlertStatus::Resolved => "resolved",
			AlertStatus::Exhausted => "exhausted",
		}
	}
}
impl Display for AlertStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Which threshold a sensor reading breached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
	/// Temperature fell below the configured minimum.
	TemperatureMin,
	/// Temperature rose above the configured maximum.
	TemperatureMax,
	/// Humidity fell below the configured minimum.
	HumidityMin,
	/// Humidity rose above the configured maximum.
	HumidityMax,
}
impl ViolationType {
	/// Returns the wire-format label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ViolationType::TemperatureMin => "temperature_min",
			ViolationType::TemperatureMax => "temperature_max",
			ViolationType::HumidityMin => "humidity_min",
			ViolationType::HumidityMax => "humidity_max",
		}
	}
}
impl Display for ViolationType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Whether the breached limit came from the sensor's own configuration or a system-wide
/// default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
	/// Sensor-specific threshold configuration.
	SensorConfig,
	/// Platform-wide default threshold.
	SystemDefault,
}

/// Delivery status of one notification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
	/// Queued but not yet dispatched.
	Pending,
	/// Delivered to the channel.
	Sent,
	/// Dispatch failed.
	Failed,
}

/// Sensor identity embedded in an alert record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRef {
	/// Opaque sensor identifier.
	pub id: String,
	/// Hardware serial number.
	pub serial: String,
	/// Operator-assigned display name.
	pub name: String,
	/// Free-form placement description.
	#[serde(default)]
	pub location: Option<String>,
}

/// One threshold-violation alert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
	/// Opaque alert identifier.
	pub id: String,
	/// Sensor the violating reading came from.
	pub sensor: SensorRef,
	/// Breached threshold kind.
	pub violation_type: ViolationType,
	/// Reading value that triggered the alert.
	pub actual_value: f64,
	/// Threshold value in force at trigger time.
	pub threshold_value: f64,
	/// Where the threshold came from.
	pub threshold_source: ThresholdSource,
	/// Current lifecycle status.
	pub status: AlertStatus,
	/// Instant the violation was recorded.
	#[serde(with = "time::serde::rfc3339")]
	pub triggered_at: OffsetDateTime,
	/// Instant the value returned within bounds; set iff the alert resolved.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub resolved_at: Option<OffsetDateTime>,
	/// Notifications dispatched so far (0..=3, monotonically non-decreasing).
	#[serde(default)]
	pub notification_count: u8,
}

/// One entry of an alert's append-only notification history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotification {
	/// Parent alert identifier.
	#[serde(default)]
	pub alert_id: Option<String>,
	/// Delivery channel (email, webhook, ...).
	pub channel: String,
	/// Channel-specific recipient address.
	pub recipient: String,
	/// Position in the alert's retry budget (1..=3).
	pub attempt_number: u8,
	/// Delivery outcome.
	pub status: NotificationStatus,
	/// Delivery instant; set once the dispatcher handed the message off.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub sent_at: Option<OffsetDateTime>,
	/// Instant the attempt was recorded.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// Optional, ANDed filters for alert listings.
#[derive(Clone, Debug, Default)]
pub struct AlertFilter {
	/// Restrict to one tenant company.
	pub company_id: Option<String>,
	/// Restrict to one sensor.
	pub sensor_id: Option<String>,
	/// Restrict to one lifecycle status.
	pub status: Option<AlertStatus>,
	/// Restrict to one violation kind.
	pub violation_type: Option<ViolationType>,
	/// Lower bound (inclusive) on the trigger instant.
	pub start_date: Option<OffsetDateTime>,
	/// Upper bound (inclusive) on the trigger instant.
	pub end_date: Option<OffsetDateTime>,
	/// Page size.
	pub limit: Option<u32>,
	/// Page offset.
	pub offset: Option<u32>,
}
impl AlertFilter {
	/// Creates an empty filter matching every alert the caller may see.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts results to one tenant company.
	pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
		self.company_id = Some(company_id.into());

		self
	}

	/// Restricts results to one sensor.
	pub fn with_sensor(mut self, sensor_id: impl Into<String>) -> Self {
		self.sensor_id = Some(sensor_id.into());

		self
	}

	/// Restricts results to one lifecycle status.
	pub fn with_status(mut self, status: AlertStatus) -> Self {
		self.status = Some(status);

		self
	}

	/// Restricts results to one violation kind.
	pub fn with_violation_type(mut self, violation_type: ViolationType) -> Self {
		self.violation_type = Some(violation_type);

		self
	}

	/// Restricts results to alerts triggered within the inclusive range.
	pub fn with_range(mut self, start: OffsetDateTime, end: OffsetDateTime) -> Self {
		self.start_date = Some(start);
		self.end_date = Some(end);

		self
	}

	/// Applies pagination.
	pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
		self.limit = Some(limit);
		self.offset = Some(offset);

		self
	}

	pub(crate) fn to_query(&self) -> String {
		let mut query = form_urlencoded::Serializer::new(String::new());

		if let Some(company_id) = &self.company_id {
			query.append_pair("companyId", company_id);
		}
		if let Some(sensor_id) = &self.sensor_id {
			query.append_pair("sensorId", sensor_id);
		}
		if let Some(status) = self.status {
			query.append_pair("status", status.as_str());
		}
		if let Some(violation_type) = self.violation_type {
			query.append_pair("violationType", violation_type.as_str());
		}
		if let Some(start) = self.start_date {
			query.append_pair("startDate", &format_instant(start));
		}
		if let Some(end) = self.end_date {
			query.append_pair("endDate", &format_instant(end));
		}
		if let Some(limit) = self.limit {
			query.append_pair("limit", &limit.to_string());
		}
		if let Some(offset) = self.offset {
			query.append_pair("offset", &offset.to_string());
		}

		query.finish()
	}
}

/// Company/sensor/date scoping for the statistics endpoint.
///
/// Status, violation type, and pagination do not apply here; converting from an
/// [`AlertFilter`] drops them.
#[derive(Clone, Debug, Default)]
pub struct StatisticsFilter {
	/// Restrict to one tenant company.
	pub company_id: Option<String>,
	/// Restrict to one sensor.
	pub sensor_id: Option<String>,
	/// Lower bound (inclusive) on the trigger instant.
	pub start_date: Option<OffsetDateTime>,
	/// Upper bound (inclusive) on the trigger instant.
	pub end_date: Option<OffsetDateTime>,
}
impl StatisticsFilter {
	/// Creates an empty filter covering every alert the caller may see.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts results to one tenant company.
	pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
		self.company_id = Some(company_id.into());

		self
	}

	/// Restricts results to one sensor.
	pub fn with_sensor(mut self, sensor_id: impl Into<String>) -> Self {
		self.sensor_id = Some(sensor_id.into());

		self
	}

	/// Restricts results to alerts triggered within the inclusive range.
	pub fn with_range(mut self, start: OffsetDateTime, end: OffsetDateTime) -> Self {
		self.start_date = Some(start);
		self.end_date = Some(end);

		self
	}

	pub(crate) fn to_query(&self) -> String {
		let mut query = form_urlencoded::Serializer::new(String::new());

		if let Some(company_id) = &self.company_id {
			query.append_pair("companyId", company_id);
		}
		if let Some(sensor_id) = &self.sensor_id {
			query.append_pair("sensorId", sensor_id);
		}
		if let Some(start) = self.start_date {
			query.append_pair("startDate", &format_instant(start));
		}
		if let Some(end) = self.end_date {
			query.append_pair("endDate", &format_instant(end));
		}

		query.finish()
	}
}
impl From<&AlertFilter> for StatisticsFilter {
	fn from(filter: &AlertFilter) -> Self {
		Self {
			company_id: filter.company_id.clone(),
			sensor_id: filter.sensor_id.clone(),
			start_date: filter.start_date,
			end_date: filter.end_date,
		}
	}
}

/// Raw statistics row as returned by the server.
///
/// `count` stays untyped because the backend's aggregation emits numbers or numeric
/// strings depending on the dimension.
#[derive(Clone, Debug, Deserialize)]
pub struct StatisticsRow {
	/// Status label; not guaranteed to be one of the known statuses.
	#[serde(default)]
	pub status: String,
	/// Row count in whatever representation the server chose.
	#[serde(default)]
	pub count: Value,
}

/// Per-status alert totals aggregated client-side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlertStatistics {
	/// Alerts currently active.
	pub active: u64,
	/// Alerts that resolved.
	pub resolved: u64,
	/// Alerts that exhausted their notification budget.
	pub exhausted: u64,
	/// Sum over every returned row, recognized status or not.
	pub total: u64,
}
impl AlertStatistics {
	/// Aggregates server rows into per-status totals.
	///
	/// Rows with an unrecognized status contribute to `total` only; rows with a
	/// missing or non-numeric count contribute zero.
	pub fn from_rows(rows: &[StatisticsRow]) -> Self {
		let mut stats = Self::default();

		for row in rows {
			let count = row_count(&row.count);

			stats.total += count;

			match row.status.as_str() {
				"active" => stats.active += count,
				"resolved" => stats.resolved += count,
				"exhausted" => stats.exhausted += count,
				_ => {},
			}
		}

		stats
	}
}

fn row_count(value: &Value) -> u64 {
	match value {
		Value::Number(number) => number
			.as_u64()
			.or_else(|| number.as_f64().filter(|f| *f >= 0.).map(|f| f as u64))
			.unwrap_or(0),
		Value::String(raw) => {
			let raw = raw.trim();

			raw.parse::<u64>()
				.ok()
				.or_else(|| raw.parse::<f64>().ok().filter(|f| *f >= 0.).map(|f| f as u64))
				.unwrap_or(0)
		},
		_ => 0,
	}
}

fn format_instant(instant: OffsetDateTime) -> String {
	instant.format(&Rfc3339).unwrap_or_else(|_| instant.unix_timestamp().to_string())
}

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists alerts matching the filter, newest first, with the total for pagination.
	pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Page<Alert>> {
		self.get(&with_query("/api/alerts", filter.to_query())).await
	}

	/// Fetches a single alert by id.
	pub async fn alert(&self, id: &str) -> Result<Alert> {
		self.get(&format!("/api/alerts/{id}")).await
	}

	/// Fetches an alert's notification history, ascending by attempt number.
	pub async fn alert_notifications(&self, id: &str) -> Result<Vec<AlertNotification>> {
		let envelope: Envelope<Vec<AlertNotification>> =
			self.get(&format!("/api/alerts/{id}/notifications")).await?;
		let mut notifications = envelope.data;

		notifications.sort_by_key(|notification| notification.attempt_number);

		Ok(notifications)
	}

	/// Fetches grouped alert counts and aggregates them into per-status totals.
	pub async fn alert_statistics(&self, filter: &StatisticsFilter) -> Result<AlertStatistics> {
		let envelope: Envelope<Vec<StatisticsRow>> =
			self.get(&with_query("/api/alerts/statistics", filter.to_query())).await?;

		Ok(AlertStatistics::from_rows(&envelope.data))
	}
}

fn with_query(path: &str, query: String) -> String {
	if query.is_empty() { path.to_owned() } else { format!("{path}?{query}") }
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn row(status: &str, count: Value) -> StatisticsRow {
		StatisticsRow { status: status.into(), count }
	}

	#[test]
	fn statistics_bucket_known_statuses_and_total_everything() {
		let rows = [
			row("active", json!("3")),
			row("resolved", json!("2")),
			row("exhausted", json!("1")),
			row("bogus", json!("9")),
		];
		let stats = AlertStatistics::from_rows(&rows);

		assert_eq!(
			stats,
			AlertStatistics { active: 3, resolved: 2, exhausted: 1, total: 15 },
		);
	}

	#[test]
	fn statistics_treat_non_numeric_counts_as_zero() {
		let rows = [
			row("active", json!("abc")),
			row("resolved", json!(null)),
			row("exhausted", Value::Bool(true)),
			row("active", json!(4)),
		];
		let stats = AlertStatistics::from_rows(&rows);

		assert_eq!(stats, AlertStatistics { active: 4, resolved: 0, exhausted: 0, total: 4 });
	}

	#[test]
	fn statistics_accept_numeric_and_float_counts() {
		let rows = [row("active", json!(2)), row("resolved", json!(1.0))];
		let stats = AlertStatistics::from_rows(&rows);

		assert_eq!(stats.active, 2);
		assert_eq!(stats.resolved, 1);
		assert_eq!(stats.total, 3);
	}

	#[test]
	fn filter_serializes_every_set_dimension() {
		let filter = AlertFilter::new()
			.with_company("c-1")
			.with_sensor("s-2")
			.with_status(AlertStatus::Active)
			.with_violation_type(ViolationType::TemperatureMax)
			.with_range(
				macros::datetime!(2025-01-01 00:00 UTC),
				macros::datetime!(2025-01-31 00:00 UTC),
			)
			.with_page(20, 40);
		let query = filter.to_query();

		assert!(query.contains("companyId=c-1"));
		assert!(query.contains("sensorId=s-2"));
		assert!(query.contains("status=active"));
		assert!(query.contains("violationType=temperature_max"));
		assert!(query.contains("startDate=2025-01-01T00%3A00%3A00Z"));
		assert!(query.contains("endDate=2025-01-31T00%3A00%3A00Z"));
		assert!(query.contains("limit=20"));
		assert!(query.contains("offset=40"));
	}

	#[test]
	fn empty_filter_produces_no_query_string() {
		assert_eq!(AlertFilter::new().to_query(), "");
		assert_eq!(with_query("/api/alerts", String::new()), "/api/alerts");
	}

	#[test]
	fn statistics_scope_drops_status_and_pagination() {
		let filter = AlertFilter::new()
			.with_company("c-1")
			.with_status(AlertStatus::Resolved)
			.with_page(10, 0);
		let scope = StatisticsFilter::from(&filter);
		let query = scope.to_query();

		assert!(query.contains("companyId=c-1"));
		assert!(!query.contains("status"));
		assert!(!query.contains("limit"));
	}

	#[test]
	fn alert_payload_round_trips_wire_names() {
		let payload = json!({
			"id": "a-1",
			"sensor": { "id": "s-1", "serial": "AMB-001", "name": "Cold room" },
			"violationType": "temperature_max",
			"actualValue": 9.5,
			"thresholdValue": 8.0,
			"thresholdSource": "sensor_config",
			"status": "active",
			"triggeredAt": "2025-06-01T10:00:00Z",
			"notificationCount": 2,
		});
		let alert: Alert =
			serde_json::from_value(payload).expect("Alert payload should deserialize.");

		assert_eq!(alert.violation_type, ViolationType::TemperatureMax);
		assert_eq!(alert.threshold_source, ThresholdSource::SensorConfig);
		assert_eq!(alert.notification_count, 2);
		assert!(alert.resolved_at.is_none());
	}
}
