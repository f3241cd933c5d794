// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::listing::{FieldValue, Record, SortKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Declares a fieldless enum with the text representation used by the API for each variant.
macro_rules! text_enum {
	($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
		pub enum $name {
			$(
				#[serde(rename = $text)]
				$variant,
			)+
		}

		impl $name {
			pub const ALL: &'static [$name] = &[$($name::$variant),+];

			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $text,)+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = UnknownVariant;

			fn from_str(text: &str) -> Result<Self, Self::Err> {
				match text {
					$($text => Ok($name::$variant),)+
					_ => Err(UnknownVariant(text.to_string())),
				}
			}
		}
	};
}

/// Returned when text doesn't name any variant of one of the model enums
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct UnknownVariant(pub String);

text_enum!(VerificationStatus {
	Pending => "pending",
	Verified => "verified",
	Rejected => "rejected",
});

text_enum!(TransactionStatus {
	Completed => "completed",
	Pending => "pending",
	Failed => "failed",
	Cancelled => "cancelled",
	Processing => "processing",
});

text_enum!(TransactionType {
	Send => "send",
	Receive => "receive",
	Refund => "refund",
	Fee => "fee",
});

text_enum!(RefundStatus {
	Pending => "pending",
	Approved => "approved",
	Rejected => "rejected",
	Processing => "processing",
	Completed => "completed",
});

text_enum!(
	/// Priority of refunds and support tickets. Variants are declared from least to most severe.
	Priority {
		Low => "low",
		Medium => "medium",
		High => "high",
		Urgent => "urgent",
	}
);

text_enum!(TicketCategory {
	Technical => "technical",
	Billing => "billing",
	Account => "account",
	Transaction => "transaction",
	Refund => "refund",
	General => "general",
});

text_enum!(TicketStatus {
	Open => "open",
	InProgress => "in_progress",
	PendingUser => "pending_user",
	Resolved => "resolved",
	Closed => "closed",
});

text_enum!(SenderType {
	User => "user",
	Agent => "agent",
	System => "system",
});

text_enum!(MessageType {
	Text => "text",
	Note => "note",
	StatusChange => "status_change",
	Assignment => "assignment",
});

text_enum!(NotificationType {
	Email => "email",
	Sms => "sms",
	Push => "push",
});

impl Priority {
	/// Severity rank used for sorting
	pub fn rank(&self) -> u8 {
		*self as u8
	}
}

impl TicketStatus {
	/// Whether the ticket has been dealt with
	pub fn is_finished(&self) -> bool {
		matches!(self, Self::Resolved | Self::Closed)
	}
}

/// A customer account on the platform
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
	pub user_id: String,
	pub email: String,
	#[serde(default)]
	pub phone: String,
	pub first_name: String,
	pub last_name: String,
	#[serde(default)]
	pub country: String,
	pub verification_status: VerificationStatus,
	#[serde(default)]
	pub balance: f64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub last_login: Option<DateTime<Utc>>,
	pub is_active: bool,
	#[serde(default)]
	pub total_transactions: u32,
	#[serde(default)]
	pub total_sent: f64,
}

impl User {
	pub fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}

	/// Whether the account is active, as shown in the status column
	pub fn activity_status(&self) -> &'static str {
		if self.is_active { "active" } else { "inactive" }
	}
}

impl Record for User {
	fn record_id(&self) -> &str {
		&self.user_id
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![
			self.first_name.as_str(),
			self.last_name.as_str(),
			self.email.as_str(),
			self.phone.as_str(),
			self.user_id.as_str(),
		]
	}

	fn filter_field(&self, filter: &str) -> Option<FieldValue<'_>> {
		match filter {
			"status" => Some(FieldValue::Text(self.activity_status())),
			"country" => Some(FieldValue::TextContains(&self.country)),
			"verification_status" => Some(FieldValue::Text(self.verification_status.as_str())),
			"date_from" | "date_to" => Some(FieldValue::Timestamp(self.created_at)),
			_ => None,
		}
	}

	fn sort_field(&self, field: &str) -> Option<SortKey<'_>> {
		match field {
			"created_at" => Some(SortKey::Timestamp(self.created_at)),
			"name" => Some(SortKey::Text(Cow::Owned(self.full_name()))),
			"email" => Some(SortKey::Text(Cow::Borrowed(&self.email))),
			"country" => Some(SortKey::Text(Cow::Borrowed(&self.country))),
			"balance" => Some(SortKey::Number(self.balance)),
			"total_sent" => Some(SortKey::Number(self.total_sent)),
			"last_login" => Some(self.last_login.map(SortKey::Timestamp).unwrap_or(SortKey::Missing)),
			_ => None,
		}
	}

	fn status(&self) -> &str {
		self.activity_status()
	}

	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

/// A money transfer between two parties
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Transaction {
	pub transaction_id: String,
	pub sender_name: String,
	pub receiver_name: String,
	#[serde(default)]
	pub sender_email: String,
	#[serde(default)]
	pub receiver_email: String,
	pub amount: f64,
	pub currency: String,
	pub status: TransactionStatus,
	pub transaction_type: TransactionType,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub fee_amount: f64,
	#[serde(default)]
	pub exchange_rate: f64,
	#[serde(default)]
	pub reference_number: String,
	#[serde(default)]
	pub payment_method: String,
	#[serde(default)]
	pub country_from: String,
	#[serde(default)]
	pub country_to: String,
}

impl Record for Transaction {
	fn record_id(&self) -> &str {
		&self.transaction_id
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![
			self.transaction_id.as_str(),
			self.sender_name.as_str(),
			self.receiver_name.as_str(),
			self.reference_number.as_str(),
		]
	}

	fn filter_field(&self, filter: &str) -> Option<FieldValue<'_>> {
		match filter {
			"status" => Some(FieldValue::Text(self.status.as_str())),
			"transaction_type" => Some(FieldValue::Text(self.transaction_type.as_str())),
			"amount_min" | "amount_max" => Some(FieldValue::Number(self.amount)),
			"date_from" | "date_to" => Some(FieldValue::Timestamp(self.created_at)),
			"country" => Some(FieldValue::AnyText(vec![self.country_from.as_str(), self.country_to.as_str()])),
			_ => None,
		}
	}

	fn sort_field(&self, field: &str) -> Option<SortKey<'_>> {
		match field {
			"created_at" => Some(SortKey::Timestamp(self.created_at)),
			"amount" => Some(SortKey::Number(self.amount)),
			"status" => Some(SortKey::Text(Cow::Borrowed(self.status.as_str()))),
			"sender_name" => Some(SortKey::Text(Cow::Borrowed(&self.sender_name))),
			"receiver_name" => Some(SortKey::Text(Cow::Borrowed(&self.receiver_name))),
			_ => None,
		}
	}

	fn status(&self) -> &str {
		self.status.as_str()
	}

	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

/// A request to give money back to a user for a transaction
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Refund {
	pub refund_id: String,
	pub transaction_id: String,
	pub user_name: String,
	pub user_email: String,
	pub original_amount: f64,
	pub refund_amount: f64,
	pub currency: String,
	pub reason: String,
	pub status: RefundStatus,
	pub priority: Priority,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub processed_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub processed_by: Option<String>,
	#[serde(default)]
	pub admin_notes: String,
	#[serde(default)]
	pub supporting_documents: Vec<String>,
	#[serde(default)]
	pub refund_method: String,
	/// When the refund is expected to reach the user. Not always a timestamp ("N/A" for rejected refunds).
	#[serde(default)]
	pub estimated_completion: String,
	#[serde(default)]
	pub contact_attempts: u32,
}

impl Refund {
	/// Whether the refund is still waiting for an approve or reject decision
	pub fn can_process(&self) -> bool {
		self.status == RefundStatus::Pending
	}
}

impl Record for Refund {
	fn record_id(&self) -> &str {
		&self.refund_id
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![self.refund_id.as_str(), self.transaction_id.as_str(), self.user_name.as_str(), self.user_email.as_str()]
	}

	fn filter_field(&self, filter: &str) -> Option<FieldValue<'_>> {
		match filter {
			"status" => Some(FieldValue::Text(self.status.as_str())),
			"priority" => Some(FieldValue::Text(self.priority.as_str())),
			"amount_min" | "amount_max" => Some(FieldValue::Number(self.refund_amount)),
			"date_from" | "date_to" => Some(FieldValue::Timestamp(self.created_at)),
			"refund_method" => Some(FieldValue::Text(&self.refund_method)),
			_ => None,
		}
	}

	fn sort_field(&self, field: &str) -> Option<SortKey<'_>> {
		match field {
			"created_at" => Some(SortKey::Timestamp(self.created_at)),
			"refund_amount" | "amount" => Some(SortKey::Number(self.refund_amount)),
			"status" => Some(SortKey::Text(Cow::Borrowed(self.status.as_str()))),
			"priority" => Some(SortKey::Rank(self.priority.rank())),
			"user_name" => Some(SortKey::Text(Cow::Borrowed(&self.user_name))),
			"refund_method" => Some(SortKey::Text(Cow::Borrowed(&self.refund_method))),
			_ => None,
		}
	}

	fn status(&self) -> &str {
		self.status.as_str()
	}

	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

/// A customer support conversation
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SupportTicket {
	pub ticket_id: String,
	pub user_id: String,
	pub user_name: String,
	pub user_email: String,
	#[serde(default)]
	pub user_phone: String,
	pub subject: String,
	pub description: String,
	pub category: TicketCategory,
	pub priority: Priority,
	pub status: TicketStatus,
	/// The ID of the agent handling the ticket
	#[serde(default)]
	pub assigned_to: Option<String>,
	#[serde(default)]
	pub assigned_agent_name: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub resolved_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub first_response_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub satisfaction_rating: Option<u8>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub attachments: Vec<String>,
	#[serde(default)]
	pub related_transaction_id: Option<String>,
	#[serde(default)]
	pub escalated: bool,
	#[serde(default)]
	pub escalation_reason: Option<String>,
	pub sla_due_date: DateTime<Utc>,
	#[serde(default)]
	pub response_time_minutes: Option<u32>,
	#[serde(default)]
	pub resolution_time_hours: Option<f64>,
}

impl Record for SupportTicket {
	fn record_id(&self) -> &str {
		&self.ticket_id
	}

	fn search_fields(&self) -> Vec<&str> {
		vec![
			self.ticket_id.as_str(),
			self.user_name.as_str(),
			self.user_email.as_str(),
			self.subject.as_str(),
			self.description.as_str(),
		]
	}

	fn filter_field(&self, filter: &str) -> Option<FieldValue<'_>> {
		match filter {
			"status" => Some(FieldValue::Text(self.status.as_str())),
			"priority" => Some(FieldValue::Text(self.priority.as_str())),
			"category" => Some(FieldValue::Text(self.category.as_str())),
			"assigned_to" => Some(FieldValue::Text(self.assigned_to.as_deref().unwrap_or_default())),
			"escalated" => Some(FieldValue::Flag(self.escalated)),
			"date_from" | "date_to" => Some(FieldValue::Timestamp(self.created_at)),
			_ => None,
		}
	}

	fn sort_field(&self, field: &str) -> Option<SortKey<'_>> {
		match field {
			"created_at" => Some(SortKey::Timestamp(self.created_at)),
			"updated_at" => Some(SortKey::Timestamp(self.updated_at)),
			"sla_due_date" => Some(SortKey::Timestamp(self.sla_due_date)),
			"priority" => Some(SortKey::Rank(self.priority.rank())),
			"status" => Some(SortKey::Text(Cow::Borrowed(self.status.as_str()))),
			"user_name" => Some(SortKey::Text(Cow::Borrowed(&self.user_name))),
			"subject" => Some(SortKey::Text(Cow::Borrowed(&self.subject))),
			_ => None,
		}
	}

	fn status(&self) -> &str {
		self.status.as_str()
	}

	fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}
}

/// A message in a support ticket's conversation
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TicketMessage {
	pub message_id: String,
	pub ticket_id: String,
	pub sender_type: SenderType,
	pub sender_name: String,
	#[serde(default)]
	pub sender_email: String,
	pub message: String,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub attachments: Vec<String>,
	/// Internal notes are only shown to agents
	pub is_internal: bool,
	pub message_type: MessageType,
}

/// Puts a ticket's messages in conversation order
pub fn order_messages(messages: &mut [TicketMessage]) {
	messages.sort_by_key(|message| message.created_at);
}

/// Gets the messages the customer can see
pub fn customer_visible(messages: &[TicketMessage]) -> impl Iterator<Item = &TicketMessage> {
	messages.iter().filter(|message| !message.is_internal)
}

/// A support agent tickets can be assigned to
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Agent {
	pub id: String,
	pub name: String,
	pub email: String,
}

/// Something a user did on their account, shown on the user's page
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Activity {
	pub activity_id: String,
	pub activity_type: String,
	pub description: String,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub ip_address: Option<String>,
}

/// The administrator signed into the dashboard
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AdminProfile {
	pub id: u64,
	pub username: String,
	#[serde(default)]
	pub email: String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
	#[serde(default)]
	pub role: String,
}

impl AdminProfile {
	/// The name used when the admin signs off on an action
	pub fn display_name(&self) -> String {
		let full_name = format!("{} {}", self.first_name, self.last_name);
		let full_name = full_name.trim();
		if full_name.is_empty() {
			self.username.clone()
		} else {
			full_name.to_string()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn enums_use_api_text() {
		assert_eq!(TicketStatus::InProgress.as_str(), "in_progress");
		assert_eq!("pending_user".parse::<TicketStatus>(), Ok(TicketStatus::PendingUser));
		assert!("sideways".parse::<TicketStatus>().is_err());
		let json = serde_json::to_string(&MessageType::StatusChange).unwrap();
		assert_eq!(json, "\"status_change\"");
	}

	#[test]
	fn priority_ranks_by_severity() {
		assert!(Priority::Urgent > Priority::High);
		assert!(Priority::Low.rank() < Priority::Medium.rank());
	}

	#[test]
	fn profile_display_name_falls_back_to_username() {
		let mut profile = AdminProfile {
			id: 1,
			username: String::from("admin"),
			email: String::new(),
			first_name: String::new(),
			last_name: String::new(),
			role: String::from("admin"),
		};
		assert_eq!(profile.display_name(), "admin");
		profile.first_name = String::from("Salma");
		assert_eq!(profile.display_name(), "Salma");
	}
}
