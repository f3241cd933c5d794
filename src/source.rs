// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where the dashboard's records come from: the platform API or the bundled sample data

use crate::api::{
	ApiClient, ApiError, CHART_PERIODS, ChartData, CountryCount, DailyVolume, DashboardStats, FinancialStats,
	ListParams, NotificationRecord, NotificationRequest, RefundStats, StatusCount, TransactionStats, UserStats,
};
use crate::fixtures;
use crate::listing::status_counts;
use crate::model::{
	Activity, Agent, Refund, RefundStatus, SupportTicket, TicketMessage, Transaction, TransactionStatus, User,
	VerificationStatus,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait RecordSource: Send + Sync {
	/// Short name for logs
	fn name(&self) -> &'static str;

	async fn users(&self) -> Result<Vec<User>, ApiError>;

	async fn user(&self, user_id: &str) -> Result<Option<User>, ApiError>;

	async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, ApiError>;

	async fn user_activities(&self, user_id: &str) -> Result<Vec<Activity>, ApiError>;

	async fn transactions(&self) -> Result<Vec<Transaction>, ApiError>;

	async fn refunds(&self) -> Result<Vec<Refund>, ApiError>;

	async fn tickets(&self) -> Result<Vec<SupportTicket>, ApiError>;

	async fn ticket_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>, ApiError>;

	async fn agents(&self) -> Result<Vec<Agent>, ApiError>;

	async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

	async fn chart_data(&self, days: u32) -> Result<ChartData, ApiError>;

	async fn send_notification(&self, notification: &NotificationRequest) -> Result<NotificationRecord, ApiError>;
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for Arc<T> {
	fn name(&self) -> &'static str {
		(**self).name()
	}

	async fn users(&self) -> Result<Vec<User>, ApiError> {
		(**self).users().await
	}

	async fn user(&self, user_id: &str) -> Result<Option<User>, ApiError> {
		(**self).user(user_id).await
	}

	async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, ApiError> {
		(**self).user_transactions(user_id).await
	}

	async fn user_activities(&self, user_id: &str) -> Result<Vec<Activity>, ApiError> {
		(**self).user_activities(user_id).await
	}

	async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
		(**self).transactions().await
	}

	async fn refunds(&self) -> Result<Vec<Refund>, ApiError> {
		(**self).refunds().await
	}

	async fn tickets(&self) -> Result<Vec<SupportTicket>, ApiError> {
		(**self).tickets().await
	}

	async fn ticket_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>, ApiError> {
		(**self).ticket_messages(ticket_id).await
	}

	async fn agents(&self) -> Result<Vec<Agent>, ApiError> {
		(**self).agents().await
	}

	async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
		(**self).dashboard_stats().await
	}

	async fn chart_data(&self, days: u32) -> Result<ChartData, ApiError> {
		(**self).chart_data(days).await
	}

	async fn send_notification(&self, notification: &NotificationRequest) -> Result<NotificationRecord, ApiError> {
		(**self).send_notification(notification).await
	}
}

/// Serves the bundled sample records
#[derive(Clone, Debug, Default)]
pub struct FixtureSource;

impl FixtureSource {
	fn count_where<R, F: Fn(&R) -> bool>(records: &[R], predicate: F) -> u64 {
		records.iter().filter(|record| predicate(record)).count() as u64
	}
}

#[async_trait]
impl RecordSource for FixtureSource {
	fn name(&self) -> &'static str {
		"fixtures"
	}

	async fn users(&self) -> Result<Vec<User>, ApiError> {
		Ok(fixtures::users())
	}

	async fn user(&self, user_id: &str) -> Result<Option<User>, ApiError> {
		Ok(fixtures::users().into_iter().find(|user| user.user_id == user_id))
	}

	async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, ApiError> {
		let Some(user) = self.user(user_id).await? else {
			return Ok(Vec::new());
		};
		let name = user.full_name();
		Ok(fixtures::transactions()
			.into_iter()
			.filter(|transaction| transaction.sender_name == name || transaction.receiver_name == name)
			.collect())
	}

	async fn user_activities(&self, user_id: &str) -> Result<Vec<Activity>, ApiError> {
		Ok(fixtures::activities(user_id))
	}

	async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
		Ok(fixtures::transactions())
	}

	async fn refunds(&self) -> Result<Vec<Refund>, ApiError> {
		Ok(fixtures::refunds())
	}

	async fn tickets(&self) -> Result<Vec<SupportTicket>, ApiError> {
		Ok(fixtures::tickets())
	}

	async fn ticket_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>, ApiError> {
		Ok(fixtures::ticket_messages(ticket_id))
	}

	async fn agents(&self) -> Result<Vec<Agent>, ApiError> {
		Ok(fixtures::agents())
	}

	async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
		let users = fixtures::users();
		let transactions = fixtures::transactions();
		let refunds = fixtures::refunds();
		let week_ago = Utc::now() - Duration::days(7);
		let completed = |transaction: &Transaction| transaction.status == TransactionStatus::Completed;

		let mut countries: BTreeMap<&str, u64> = BTreeMap::new();
		for user in users.iter() {
			*countries.entry(user.country.as_str()).or_default() += 1;
		}
		let mut top_countries: Vec<_> = countries
			.into_iter()
			.map(|(country, count)| CountryCount {
				country: country.to_string(),
				count,
			})
			.collect();
		top_countries.sort_by(|left, right| right.count.cmp(&left.count));
		top_countries.truncate(5);

		Ok(DashboardStats {
			users: UserStats {
				total: users.len() as u64,
				active: Self::count_where(&users, |user| user.is_active),
				verified: Self::count_where(&users, |user| user.verification_status == VerificationStatus::Verified),
				recent: Self::count_where(&users, |user| user.created_at >= week_ago),
			},
			transactions: TransactionStats {
				total: transactions.len() as u64,
				completed: Self::count_where(&transactions, completed),
				pending: Self::count_where(&transactions, |transaction| {
					transaction.status == TransactionStatus::Pending
				}),
				failed: Self::count_where(&transactions, |transaction| {
					transaction.status == TransactionStatus::Failed
				}),
				recent: Self::count_where(&transactions, |transaction| transaction.created_at >= week_ago),
			},
			financial: FinancialStats {
				total_volume: transactions.iter().filter(|t| completed(*t)).map(|t| t.amount).sum(),
				total_fees: transactions.iter().filter(|t| completed(*t)).map(|t| t.fee_amount).sum(),
				currency: String::from("MAD"),
			},
			refunds: RefundStats {
				pending: Self::count_where(&refunds, |refund| refund.status == RefundStatus::Pending),
				total: refunds.len() as u64,
			},
			top_countries,
		})
	}

	async fn chart_data(&self, days: u32) -> Result<ChartData, ApiError> {
		if !CHART_PERIODS.contains(&days) {
			return Err(ApiError::UnsupportedPeriod(days));
		}
		let transactions = fixtures::transactions();
		let end = transactions
			.iter()
			.map(|transaction| transaction.created_at.date_naive())
			.max()
			.unwrap_or_else(|| Utc::now().date_naive());
		let start = end
			.checked_sub_signed(Duration::days(i64::from(days)))
			.ok_or(ApiError::UnsupportedPeriod(days))?;

		let daily_data = start
			.iter_days()
			.take_while(|day| *day <= end)
			.map(|day| {
				let on_day: Vec<&Transaction> = transactions
					.iter()
					.filter(|transaction| transaction.created_at.date_naive() == day)
					.collect();
				DailyVolume {
					date: day.format("%Y-%m-%d").to_string(),
					transactions: on_day.len() as u64,
					volume: on_day
						.iter()
						.filter(|transaction| transaction.status == TransactionStatus::Completed)
						.map(|transaction| transaction.amount)
						.sum(),
				}
			})
			.collect();

		let mut status_distribution: Vec<StatusCount> = status_counts(&transactions)
			.into_iter()
			.map(|(status, count)| StatusCount {
				status,
				count: count as u64,
			})
			.collect();
		status_distribution.sort_by(|left, right| right.count.cmp(&left.count));

		Ok(ChartData {
			daily_data,
			status_distribution,
		})
	}

	async fn send_notification(&self, notification: &NotificationRequest) -> Result<NotificationRecord, ApiError> {
		tracing::info!(
			user_id = %notification.user_id,
			notification_type = %notification.notification_type,
			"Recorded notification without sending it"
		);
		Ok(NotificationRecord {
			notification_id: format!("ntf_{}", Utc::now().timestamp_millis()),
			user_id: notification.user_id.clone(),
			title: notification.title.clone(),
			message: notification.message.clone(),
			notification_type: notification.notification_type.to_string(),
			status: String::from("sent"),
			sent_at: Some(Utc::now()),
		})
	}
}

/// Serves records from the platform API.
///
/// The API has no support ticket endpoints, so tickets, their conversations, and the agent roster come from the
/// sample data.
#[derive(Clone)]
pub struct ApiSource {
	client: ApiClient,
	fallback: FixtureSource,
}

impl ApiSource {
	pub fn new(client: ApiClient) -> Self {
		Self {
			client,
			fallback: FixtureSource,
		}
	}

	pub fn client(&self) -> &ApiClient {
		&self.client
	}
}

#[async_trait]
impl RecordSource for ApiSource {
	fn name(&self) -> &'static str {
		"api"
	}

	async fn users(&self) -> Result<Vec<User>, ApiError> {
		let first_page = self.client.users(&ListParams::new()).await?;
		self.client.collect_pages(first_page).await
	}

	async fn user(&self, user_id: &str) -> Result<Option<User>, ApiError> {
		match self.client.user(user_id).await {
			Ok(user) => Ok(Some(user)),
			Err(ApiError::Status { status: 404, .. }) => Ok(None),
			Err(error) => Err(error),
		}
	}

	async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, ApiError> {
		let first_page = self.client.user_transactions(user_id, &ListParams::new()).await?;
		self.client.collect_pages(first_page).await
	}

	async fn user_activities(&self, user_id: &str) -> Result<Vec<Activity>, ApiError> {
		let params = ListParams::new().with("user_id", user_id);
		let first_page = self.client.activities(&params).await?;
		self.client.collect_pages(first_page).await
	}

	async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
		let first_page = self.client.transactions(&ListParams::new()).await?;
		self.client.collect_pages(first_page).await
	}

	async fn refunds(&self) -> Result<Vec<Refund>, ApiError> {
		let first_page = self.client.refunds(&ListParams::new()).await?;
		self.client.collect_pages(first_page).await
	}

	async fn tickets(&self) -> Result<Vec<SupportTicket>, ApiError> {
		self.fallback.tickets().await
	}

	async fn ticket_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>, ApiError> {
		self.fallback.ticket_messages(ticket_id).await
	}

	async fn agents(&self) -> Result<Vec<Agent>, ApiError> {
		self.fallback.agents().await
	}

	async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
		self.client.dashboard_stats().await
	}

	async fn chart_data(&self, days: u32) -> Result<ChartData, ApiError> {
		if !CHART_PERIODS.contains(&days) {
			return Err(ApiError::UnsupportedPeriod(days));
		}
		self.client.chart_data(days).await
	}

	async fn send_notification(&self, notification: &NotificationRequest) -> Result<NotificationRecord, ApiError> {
		self.client.send_notification(notification).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn fixture_user_transactions_match_by_name() {
		let source = FixtureSource;
		let transactions = source.user_transactions("user_001").await.unwrap();
		assert_eq!(transactions.len(), 1);
		assert_eq!(transactions[0].transaction_id, "TXN-001237");
		assert!(source.user_transactions("user_999").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn fixture_stats_count_sample_data() {
		let stats = FixtureSource.dashboard_stats().await.unwrap();
		assert_eq!(stats.users.total, 5);
		assert_eq!(stats.transactions.completed, 2);
		assert_eq!(stats.financial.total_volume, 5700.0);
		assert_eq!(stats.refunds.pending, 1);
		assert_eq!(stats.top_countries[0].country, "Morocco");
	}

	#[tokio::test]
	async fn fixture_chart_covers_requested_days() {
		let chart = FixtureSource.chart_data(7).await.unwrap();
		assert_eq!(chart.daily_data.len(), 8);
		let busiest = chart
			.daily_data
			.iter()
			.find(|day| day.date == "2024-01-15")
			.unwrap();
		assert_eq!(busiest.transactions, 2);
		assert_eq!(busiest.volume, 2500.0);
	}

	#[tokio::test]
	async fn chart_rejects_unsupported_periods() {
		for days in [0, 365, u32::MAX] {
			assert!(matches!(
				FixtureSource.chart_data(days).await,
				Err(ApiError::UnsupportedPeriod(rejected)) if rejected == days
			));
		}
	}
}
