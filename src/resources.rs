//! Thin typed surface over the conventional REST resources (sensors, readings,
//! companies, users).
//!
//! Everything here is pure shaping of `{data, total?}` envelopes; the interesting
//! lifecycle logic lives in [`client`](crate::client) and [`alerts`](crate::alerts).

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, client::Client, http::ApiTransport, session::UserProfile};

/// Paged listing envelope returned by collection endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
	/// One page of records.
	pub data: Vec<T>,
	/// Total matching records, for pagination.
	#[serde(default)]
	pub total: u64,
}

/// Single-value envelope returned by non-paged endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
	/// Wrapped payload.
	pub data: T,
}

/// Per-sensor alert threshold configuration; absent bounds fall back to system defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
	/// Minimum acceptable temperature.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature_min: Option<f64>,
	/// Maximum acceptable temperature.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature_max: Option<f64>,
	/// Minimum acceptable humidity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub humidity_min: Option<f64>,
	/// Maximum acceptable humidity.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub humidity_max: Option<f64>,
}

/// Latest telemetry snapshot attached to a sensor record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSnapshot {
	/// Temperature in degrees Celsius.
	pub temperature: f64,
	/// Relative humidity in percent.
	pub humidity: f64,
	/// Instant the reading was taken.
	#[serde(with = "time::serde::rfc3339")]
	pub recorded_at: OffsetDateTime,
}

/// One registered sensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
	/// Opaque sensor identifier.
	pub id: String,
	/// Hardware serial number.
	pub serial: String,
	/// Operator-assigned display name.
	pub name: String,
	/// Free-form placement description.
	#[serde(default)]
	pub location: Option<String>,
	/// Owning company; `None` while the sensor is unassigned.
	#[serde(default)]
	pub company_id: Option<String>,
	/// Last known telemetry, when the sensor has reported.
	#[serde(default)]
	pub last_reading: Option<ReadingSnapshot>,
	/// Sensor-specific thresholds, when configured.
	#[serde(default)]
	pub thresholds: Option<ThresholdConfig>,
}

/// One tenant company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
	/// Opaque company identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Billing/contact address.
	#[serde(default)]
	pub contact_email: Option<String>,
}

/// Listing scope shared by the sensor and user collections.
#[derive(Clone, Debug, Default)]
pub struct ListScope {
	/// Restrict to one tenant company.
	pub company_id: Option<String>,
	/// Page size.
	pub limit: Option<u32>,
	/// Page offset.
	pub offset: Option<u32>,
}
impl ListScope {
	/// Creates an unrestricted scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts results to one tenant company.
	pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
		self.company_id = Some(company_id.into());

		self
	}

	/// Applies pagination.
	pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
		self.limit = Some(limit);
		self.offset = Some(offset);

		self
	}

	fn to_query(&self) -> String {
		let mut query = form_urlencoded::Serializer::new(String::new());

		if let Some(company_id) = &self.company_id {
			query.append_pair("companyId", company_id);
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

impl<T> Client<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists sensors visible to the caller.
	pub async fn list_sensors(&self, scope: &ListScope) -> Result<Page<Sensor>> {
		self.get(&scoped("/api/sensors", scope)).await
	}

	/// Fetches one sensor by id.
	pub async fn sensor(&self, id: &str) -> Result<Sensor> {
		self.get(&format!("/api/sensors/{id}")).await
	}

	/// Lists a sensor's historical readings, newest first.
	pub async fn sensor_readings(
		&self,
		id: &str,
		limit: Option<u32>,
	) -> Result<Page<ReadingSnapshot>> {
		let path = match limit {
			Some(limit) => format!("/api/sensors/{id}/readings?limit={limit}"),
			None => format!("/api/sensors/{id}/readings"),
		};

		self.get(&path).await
	}

	/// Assigns a sensor to a company, or back to the unassigned pool with `None`.
	pub async fn assign_sensor(&self, id: &str, company_id: Option<&str>) -> Result<Sensor> {
		self.patch(&format!("/api/sensors/{id}"), json!({ "companyId": company_id })).await
	}

	/// Replaces a sensor's alert threshold configuration.
	pub async fn set_sensor_thresholds(
		&self,
		id: &str,
		thresholds: &ThresholdConfig,
	) -> Result<Sensor> {
		let body = json!({
			"temperatureMin": thresholds.temperature_min,
			"temperatureMax": thresholds.temperature_max,
			"humidityMin": thresholds.humidity_min,
			"humidityMax": thresholds.humidity_max,
		});

		self.put(&format!("/api/sensors/{id}/thresholds"), body).await
	}

	/// Lists tenant companies.
	pub async fn list_companies(&self, scope: &ListScope) -> Result<Page<Company>> {
		self.get(&scoped("/api/companies", scope)).await
	}

	/// Fetches one company by id.
	pub async fn company(&self, id: &str) -> Result<Company> {
		self.get(&format!("/api/companies/{id}")).await
	}

	/// Creates a company.
	pub async fn create_company(&self, name: &str, contact_email: Option<&str>) -> Result<Company> {
		self.post("/api/companies", json!({ "name": name, "contactEmail": contact_email })).await
	}

	/// Applies a partial company update.
	pub async fn update_company(&self, id: &str, fields: Value) -> Result<Company> {
		self.put(&format!("/api/companies/{id}"), fields).await
	}

	/// Deletes a company.
	pub async fn delete_company(&self, id: &str) -> Result<()> {
		let _: Value = self.delete(&format!("/api/companies/{id}")).await?;

		Ok(())
	}

	/// Lists user accounts, optionally scoped to one company.
	pub async fn list_users(&self, scope: &ListScope) -> Result<Page<UserProfile>> {
		self.get(&scoped("/api/users", scope)).await
	}

	/// Creates a user account.
	pub async fn create_user(&self, fields: Value) -> Result<UserProfile> {
		self.post("/api/users", fields).await
	}

	/// Applies a partial user update.
	pub async fn update_user(&self, id: &str, fields: Value) -> Result<UserProfile> {
		self.put(&format!("/api/users/{id}"), fields).await
	}

	/// Deletes a user account.
	pub async fn delete_user(&self, id: &str) -> Result<()> {
		let _: Value = self.delete(&format!("/api/users/{id}")).await?;

		Ok(())
	}
}

fn scoped(path: &str, scope: &ListScope) -> String {
	let query = scope.to_query();

	if query.is_empty() { path.to_owned() } else { format!("{path}?{query}") }
}
