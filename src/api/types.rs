// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::listing::{ListQuery, SortDirection};
use crate::model::{AdminProfile, NotificationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a list endpoint's results
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Paginated<T> {
	pub count: usize,
	/// Absolute URL of the following page
	pub next: Option<String>,
	pub previous: Option<String>,
	pub results: Vec<T>,
}

/// Query string parameters for list endpoints
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ListParams(Vec<(String, String)>);

impl ListParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, name: &str, value: &str) -> Self {
		self.0.push((name.to_string(), value.to_string()));
		self
	}

	/// Parameters asking the API for the same view of a list as a local query
	pub fn from_query(query: &ListQuery) -> Self {
		let mut params = Self::new();
		if query.page > 1 {
			params = params.with("page", &query.page.to_string());
		}
		if !query.search.trim().is_empty() {
			params = params.with("search", query.search.trim());
		}
		let ordering = match query.sort.direction {
			SortDirection::Asc => query.sort.field.clone(),
			SortDirection::Desc => format!("-{}", query.sort.field),
		};
		params = params.with("ordering", &ordering);
		for (filter, value) in query.filters.active() {
			params = params.with(filter, value);
		}
		params
	}

	pub fn pairs(&self) -> &[(String, String)] {
		&self.0
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LoginRequest {
	pub username: String,
	pub password: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LoginResponse {
	pub token: String,
	pub user: AdminProfile,
}

/// A message in the platform's user chat
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChatMessage {
	pub message_id: String,
	pub user_id: String,
	#[serde(default)]
	pub admin_id: Option<String>,
	pub message: String,
	pub sender_type: String,
	#[serde(default)]
	pub is_read: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NewChatMessage {
	pub user_id: String,
	pub message: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NotificationRequest {
	pub user_id: String,
	pub title: String,
	pub message: String,
	pub notification_type: NotificationType,
}

/// A notification as recorded by the platform after sending
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NotificationRecord {
	pub notification_id: String,
	pub user_id: String,
	pub title: String,
	pub message: String,
	pub notification_type: String,
	pub status: String,
	#[serde(default)]
	pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UserStats {
	pub total: u64,
	pub active: u64,
	pub verified: u64,
	pub recent: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TransactionStats {
	pub total: u64,
	pub completed: u64,
	pub pending: u64,
	pub failed: u64,
	pub recent: u64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FinancialStats {
	pub total_volume: f64,
	pub total_fees: f64,
	pub currency: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RefundStats {
	pub pending: u64,
	pub total: u64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CountryCount {
	pub country: String,
	pub count: u64,
}

/// Totals shown on the dashboard overview
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DashboardStats {
	pub users: UserStats,
	pub transactions: TransactionStats,
	pub financial: FinancialStats,
	pub refunds: RefundStats,
	#[serde(default)]
	pub top_countries: Vec<CountryCount>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DailyVolume {
	/// `YYYY-MM-DD`
	pub date: String,
	pub transactions: u64,
	pub volume: f64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StatusCount {
	pub status: String,
	pub count: u64,
}

/// The periods, in days, charts can cover
pub const CHART_PERIODS: [u32; 3] = [7, 30, 90];

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ChartData {
	pub daily_data: Vec<DailyVolume>,
	pub status_distribution: Vec<StatusCount>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HealthStatus {
	pub status: String,
	pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn params_mirror_local_query() {
		let mut query = ListQuery::default();
		query.set_search(" ahm ");
		query.set_filter("status", "pending");
		query.page = 2;
		let params = ListParams::from_query(&query);
		assert_eq!(
			params.pairs(),
			&[
				(String::from("page"), String::from("2")),
				(String::from("search"), String::from("ahm")),
				(String::from("ordering"), String::from("-created_at")),
				(String::from("status"), String::from("pending")),
			]
		);
	}

	#[test]
	fn stats_decode_from_api_shape() {
		let json = r#"{
			"users": {"total": 5, "active": 4, "verified": 4, "recent": 1},
			"transactions": {"total": 5, "completed": 2, "pending": 1, "failed": 1, "recent": 3},
			"financial": {"total_volume": 5700.0, "total_fees": 57.0, "currency": "MAD"},
			"refunds": {"pending": 1, "total": 5},
			"top_countries": [{"country": "Morocco", "count": 4}]
		}"#;
		let stats: DashboardStats = serde_json::from_str(json).unwrap();
		assert_eq!(stats.users.active, 4);
		assert_eq!(stats.top_countries[0].country, "Morocco");
	}
}
