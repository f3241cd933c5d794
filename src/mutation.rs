// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record collections and the changes admins make to them.
//!
//! A [`Collection`] owns one page's records along with the mutations in flight against them and which overlay is
//! open. Changes are applied as a whole replacement record, produced by one of the transition functions below, and
//! show up in the open detail view as soon as they land.

use crate::listing::Record;
use crate::model::{
	Agent, MessageType, Refund, RefundStatus, SenderType, SupportTicket, TicketMessage, TicketStatus,
};
use crate::validation::{FieldErrors, ManualRefundForm, NewTicketForm, parse_amount};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "ssr", derive(miette::Diagnostic))]
pub enum MutationError {
	#[error("no record with ID {0}")]
	NotFound(String),
	#[error("a change to {0} is already in progress")]
	AlreadyInFlight(String),
	#[error("a record with ID {0} already exists")]
	DuplicateId(String),
	#[error("{record} can't be changed while it is {status}")]
	InvalidTransition { record: String, status: String },
	#[error("no agent with ID {0}")]
	UnknownAgent(String),
	#[error("replies can't be empty")]
	EmptyReply,
}

/// What an admin decided for a pending refund
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RefundDecision {
	Approve,
	Reject,
}

impl RefundDecision {
	pub fn resulting_status(&self) -> RefundStatus {
		match self {
			Self::Approve => RefundStatus::Approved,
			Self::Reject => RefundStatus::Rejected,
		}
	}
}

impl fmt::Display for RefundDecision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Approve => f.write_str("approve"),
			Self::Reject => f.write_str("reject"),
		}
	}
}

/// The overlay open on a page. Only one can be open at a time.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum UiState {
	#[default]
	Closed,
	ViewingDetails(String),
	Processing(String, RefundDecision),
	Assigning(String),
}

impl UiState {
	/// The record the overlay is about
	pub fn target(&self) -> Option<&str> {
		match self {
			Self::Closed => None,
			Self::ViewingDetails(id) | Self::Processing(id, _) | Self::Assigning(id) => Some(id),
		}
	}

	/// Whether this is one of the dialogs that closes once its change lands
	fn is_action_dialog(&self) -> bool {
		matches!(self, Self::Processing(..) | Self::Assigning(_))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Collection<R> {
	records: Vec<R>,
	in_flight: BTreeSet<String>,
	ui: UiState,
	detail: Option<R>,
}

impl<R> Default for Collection<R> {
	fn default() -> Self {
		Self {
			records: Vec::new(),
			in_flight: BTreeSet::new(),
			ui: UiState::Closed,
			detail: None,
		}
	}
}

impl<R: Record + Clone> Collection<R> {
	pub fn new(records: Vec<R>) -> Self {
		Self {
			records,
			..Self::default()
		}
	}

	pub fn records(&self) -> &[R] {
		&self.records
	}

	pub fn get(&self, id: &str) -> Option<&R> {
		self.records.iter().find(|record| record.record_id() == id)
	}

	/// Swaps in a freshly loaded set of records. An open overlay stays open if its record is still present.
	pub fn replace_all(&mut self, records: Vec<R>) {
		self.records = records;
		self.in_flight.retain(|id| self.records.iter().any(|record| record.record_id() == id));
		match self.ui.target().and_then(|id| self.get(id)).cloned() {
			Some(record) => self.detail = Some(record),
			None => self.close(),
		}
	}

	pub fn ui(&self) -> &UiState {
		&self.ui
	}

	/// The snapshot of the record shown in the open overlay
	pub fn detail(&self) -> Option<&R> {
		self.detail.as_ref()
	}

	/// Opens an overlay for a record that is in the collection
	pub fn open(&mut self, ui: UiState) -> Result<(), MutationError> {
		let Some(id) = ui.target() else {
			self.close();
			return Ok(());
		};
		let record = self.get(id).cloned().ok_or_else(|| MutationError::NotFound(id.to_string()))?;
		self.detail = Some(record);
		self.ui = ui;
		Ok(())
	}

	pub fn open_details(&mut self, id: &str) -> Result<(), MutationError> {
		self.open(UiState::ViewingDetails(id.to_string()))
	}

	pub fn close(&mut self) {
		self.ui = UiState::Closed;
		self.detail = None;
	}

	pub fn is_in_flight(&self, id: &str) -> bool {
		self.in_flight.contains(id)
	}

	pub fn is_busy(&self) -> bool {
		!self.in_flight.is_empty()
	}

	/// Marks a record as having a change in progress and returns the record the change starts from
	pub fn begin(&mut self, id: &str) -> Result<R, MutationError> {
		let record = self.get(id).cloned().ok_or_else(|| MutationError::NotFound(id.to_string()))?;
		if !self.in_flight.insert(id.to_string()) {
			return Err(MutationError::AlreadyInFlight(id.to_string()));
		}
		Ok(record)
	}

	/// Lands a change started with [`Collection::begin`], replacing the record with the same ID
	pub fn complete(&mut self, updated: R) -> Result<(), MutationError> {
		let id = updated.record_id().to_string();
		self.in_flight.remove(&id);
		let Some(slot) = self.records.iter_mut().find(|record| record.record_id() == id) else {
			return Err(MutationError::NotFound(id));
		};
		*slot = updated.clone();

		if self.ui.target() == Some(id.as_str()) {
			if self.ui.is_action_dialog() {
				self.ui = UiState::ViewingDetails(id);
			}
			self.detail = Some(updated);
		}
		Ok(())
	}

	/// Drops a change started with [`Collection::begin`] without touching the record
	pub fn abort(&mut self, id: &str) {
		self.in_flight.remove(id);
	}

	/// Runs a whole change at once
	pub fn apply<F>(&mut self, id: &str, transition: F) -> Result<&R, MutationError>
	where
		F: FnOnce(&R) -> Result<R, MutationError>,
	{
		let current = self.begin(id)?;
		let updated = match transition(&current) {
			Ok(updated) => updated,
			Err(error) => {
				self.abort(id);
				return Err(error);
			}
		};
		self.complete(updated)?;
		self.get(id).ok_or_else(|| MutationError::NotFound(id.to_string()))
	}

	/// Adds a newly created record to the top of the list
	pub fn insert_front(&mut self, record: R) -> Result<(), MutationError> {
		if self.get(record.record_id()).is_some() {
			return Err(MutationError::DuplicateId(record.record_id().to_string()));
		}
		self.records.insert(0, record);
		Ok(())
	}
}

/// Short identifier suffix built from the current time, as used for records created from the dashboard
fn time_suffix(now: DateTime<Utc>) -> String {
	format!("{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}

/// Approves or rejects a refund that is still pending
pub fn decide_refund(
	refund: &Refund,
	decision: RefundDecision,
	admin_notes: &str,
	admin_name: &str,
	now: DateTime<Utc>,
) -> Result<Refund, MutationError> {
	if !refund.can_process() {
		return Err(MutationError::InvalidTransition {
			record: refund.refund_id.clone(),
			status: refund.status.to_string(),
		});
	}

	Ok(Refund {
		status: decision.resulting_status(),
		admin_notes: admin_notes.to_string(),
		processed_at: Some(now),
		processed_by: Some(admin_name.to_string()),
		updated_at: now,
		..refund.clone()
	})
}

/// Builds the refund for a manual refund form. The form must pass validation first.
pub fn create_manual_refund(
	form: &ManualRefundForm,
	admin_name: &str,
	now: DateTime<Utc>,
) -> Result<Refund, FieldErrors> {
	form.validate()?;

	let estimated_completion = if form.estimated_completion.trim().is_empty() {
		(now + Duration::days(3)).to_rfc3339()
	} else {
		form.estimated_completion.trim().to_string()
	};

	Ok(Refund {
		refund_id: format!("REF-{}", time_suffix(now)),
		transaction_id: form.transaction_id.trim().to_string(),
		user_name: form.user_name.trim().to_string(),
		user_email: form.user_email.trim().to_string(),
		original_amount: parse_amount(&form.original_amount).unwrap_or_default(),
		refund_amount: parse_amount(&form.refund_amount).unwrap_or_default(),
		currency: form.currency.clone(),
		reason: form.reason.trim().to_string(),
		status: RefundStatus::Approved,
		priority: form.priority,
		created_at: now,
		updated_at: now,
		processed_at: Some(now),
		processed_by: Some(admin_name.to_string()),
		admin_notes: format!("Manual refund created. {}", form.admin_notes),
		supporting_documents: Vec::new(),
		refund_method: form.refund_method.clone(),
		estimated_completion,
		contact_attempts: 0,
	})
}

/// Hands a ticket to an agent from the roster, which puts it in progress
pub fn assign_ticket(
	ticket: &SupportTicket,
	agents: &[Agent],
	agent_id: &str,
	now: DateTime<Utc>,
) -> Result<SupportTicket, MutationError> {
	let agent = agents
		.iter()
		.find(|agent| agent.id == agent_id)
		.ok_or_else(|| MutationError::UnknownAgent(agent_id.to_string()))?;

	Ok(SupportTicket {
		assigned_to: Some(agent.id.clone()),
		assigned_agent_name: Some(agent.name.clone()),
		status: TicketStatus::InProgress,
		updated_at: now,
		..ticket.clone()
	})
}

pub fn change_ticket_status(ticket: &SupportTicket, status: TicketStatus, now: DateTime<Utc>) -> SupportTicket {
	let resolution_time_hours = if status.is_finished() {
		let elapsed = now - ticket.created_at;
		Some((elapsed.num_minutes() as f64 / 6.0).round() / 10.0)
	} else {
		None
	};

	SupportTicket {
		status,
		updated_at: now,
		resolved_at: status.is_finished().then_some(now),
		resolution_time_hours,
		..ticket.clone()
	}
}

pub fn escalate_ticket(ticket: &SupportTicket, reason: &str, now: DateTime<Utc>) -> SupportTicket {
	let reason = reason.trim();
	let reason = if reason.is_empty() { "Escalated by admin" } else { reason };
	SupportTicket {
		escalated: true,
		escalation_reason: Some(reason.to_string()),
		updated_at: now,
		..ticket.clone()
	}
}

/// A reply typed into a ticket's conversation
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReplyDraft {
	pub body: String,
	/// Internal notes are only visible to agents
	pub internal: bool,
}

/// Who a reply is sent as
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AgentIdentity {
	pub name: String,
	pub email: String,
}

/// Adds an agent reply to a ticket's conversation.
///
/// Returns the updated ticket alongside the new message. The first reply the customer can see stamps the ticket's
/// first response time.
pub fn reply_to_ticket(
	ticket: &SupportTicket,
	draft: &ReplyDraft,
	sender: &AgentIdentity,
	now: DateTime<Utc>,
) -> Result<(SupportTicket, TicketMessage), MutationError> {
	if draft.body.trim().is_empty() {
		return Err(MutationError::EmptyReply);
	}

	let message = TicketMessage {
		message_id: format!("msg_{}", now.timestamp_millis()),
		ticket_id: ticket.ticket_id.clone(),
		sender_type: SenderType::Agent,
		sender_name: sender.name.clone(),
		sender_email: sender.email.clone(),
		message: draft.body.clone(),
		created_at: now,
		attachments: Vec::new(),
		is_internal: draft.internal,
		message_type: if draft.internal { MessageType::Note } else { MessageType::Text },
	};

	let mut ticket = ticket.clone();
	if ticket.first_response_at.is_none() && !draft.internal {
		ticket.first_response_at = Some(now);
		ticket.response_time_minutes = u32::try_from((now - ticket.created_at).num_minutes()).ok();
		ticket.updated_at = now;
	}

	Ok((ticket, message))
}

/// Builds the ticket for a new ticket form. The form must pass validation first.
pub fn create_ticket(form: &NewTicketForm, now: DateTime<Utc>) -> Result<SupportTicket, FieldErrors> {
	form.validate()?;

	let related_transaction_id = form.related_transaction_id.trim();
	Ok(SupportTicket {
		ticket_id: format!("TKT-{}", time_suffix(now)),
		user_id: format!("user_{}", now.timestamp_millis()),
		user_name: form.user_name.trim().to_string(),
		user_email: form.user_email.trim().to_string(),
		user_phone: form.user_phone.trim().to_string(),
		subject: form.subject.trim().to_string(),
		description: form.description.trim().to_string(),
		category: form.category,
		priority: form.priority,
		status: TicketStatus::Open,
		assigned_to: None,
		assigned_agent_name: None,
		created_at: now,
		updated_at: now,
		resolved_at: None,
		first_response_at: None,
		satisfaction_rating: None,
		tags: form.tag_list(),
		attachments: Vec::new(),
		related_transaction_id: (!related_transaction_id.is_empty()).then(|| related_transaction_id.to_string()),
		escalated: false,
		escalation_reason: None,
		sla_due_date: now + Duration::hours(24),
		response_time_minutes: None,
		resolution_time_hours: None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures;
	use crate::model::Priority;

	fn now() -> DateTime<Utc> {
		DateTime::parse_from_rfc3339("2024-01-16T08:00:00Z").unwrap().with_timezone(&Utc)
	}

	#[test]
	fn approving_pending_refund_stamps_processing() {
		let mut refunds = Collection::new(fixtures::refunds());
		let refund = refunds
			.apply("REF-001234", |refund| {
				decide_refund(refund, RefundDecision::Approve, "Bank confirmed", "Current Admin", now())
			})
			.unwrap();
		assert_eq!(refund.status, RefundStatus::Approved);
		assert_eq!(refund.processed_at, Some(now()));
		assert_eq!(refund.processed_by.as_deref(), Some("Current Admin"));
		assert_eq!(refund.admin_notes, "Bank confirmed");
		assert!(!refund.can_process());
		assert!(!refunds.is_in_flight("REF-001234"));
	}

	#[test]
	fn processed_refund_cannot_be_decided_again() {
		let mut refunds = Collection::new(fixtures::refunds());
		let result = refunds.apply("REF-001235", |refund| {
			decide_refund(refund, RefundDecision::Reject, "", "Current Admin", now())
		});
		assert!(matches!(result, Err(MutationError::InvalidTransition { .. })));
		assert!(!refunds.is_busy());
		assert_eq!(refunds.get("REF-001235").unwrap().status, RefundStatus::Approved);
	}

	#[test]
	fn one_change_per_record_at_a_time() {
		let mut refunds = Collection::new(fixtures::refunds());
		refunds.begin("REF-001234").unwrap();
		assert_eq!(
			refunds.begin("REF-001234"),
			Err(MutationError::AlreadyInFlight(String::from("REF-001234")))
		);
		assert!(refunds.begin("REF-001236").is_ok());
		refunds.abort("REF-001234");
		assert!(refunds.is_in_flight("REF-001236"));
		assert!(!refunds.is_in_flight("REF-001234"));
	}

	#[test]
	fn missing_record_is_reported() {
		let mut refunds = Collection::new(fixtures::refunds());
		assert_eq!(
			refunds.begin("REF-999999"),
			Err(MutationError::NotFound(String::from("REF-999999")))
		);
		assert!(refunds.open_details("REF-999999").is_err());
		assert_eq!(refunds.ui(), &UiState::Closed);
	}

	#[test]
	fn landed_change_refreshes_open_detail() {
		let mut refunds = Collection::new(fixtures::refunds());
		refunds
			.open(UiState::Processing(String::from("REF-001234"), RefundDecision::Reject))
			.unwrap();
		let current = refunds.begin("REF-001234").unwrap();
		let updated = decide_refund(&current, RefundDecision::Reject, "Not eligible", "Current Admin", now()).unwrap();
		refunds.complete(updated).unwrap();

		assert_eq!(refunds.ui(), &UiState::ViewingDetails(String::from("REF-001234")));
		assert_eq!(refunds.detail().unwrap().status, RefundStatus::Rejected);
	}

	#[test]
	fn change_to_other_record_leaves_detail_alone() {
		let mut refunds = Collection::new(fixtures::refunds());
		refunds.open_details("REF-001238").unwrap();
		refunds
			.apply("REF-001234", |refund| {
				decide_refund(refund, RefundDecision::Approve, "", "Current Admin", now())
			})
			.unwrap();
		assert_eq!(refunds.detail().unwrap().refund_id, "REF-001238");
		assert_eq!(refunds.ui(), &UiState::ViewingDetails(String::from("REF-001238")));
	}

	#[test]
	fn reload_keeps_overlay_only_for_present_records() {
		let mut refunds = Collection::new(fixtures::refunds());
		refunds.open_details("REF-001234").unwrap();
		refunds.replace_all(fixtures::refunds().into_iter().skip(1).collect());
		assert_eq!(refunds.ui(), &UiState::Closed);
		assert!(refunds.detail().is_none());
	}

	#[test]
	fn manual_refund_is_prepended_as_approved() {
		let mut refunds = Collection::new(fixtures::refunds());
		let form = ManualRefundForm {
			transaction_id: String::from("TXN-001236"),
			user_email: String::from("mohammed@email.com"),
			user_name: String::from("Mohammed Benjelloun"),
			original_amount: String::from("5000"),
			refund_amount: String::from("4950"),
			reason: String::from("Goodwill gesture"),
			admin_notes: String::from("Approved by phone."),
			..ManualRefundForm::default()
		};
		let refund = create_manual_refund(&form, "Current Admin", now()).unwrap();
		assert_eq!(refund.status, RefundStatus::Approved);
		assert_eq!(refund.admin_notes, "Manual refund created. Approved by phone.");
		assert_eq!(refund.refund_id.len(), "REF-".len() + 6);
		assert_eq!(refund.estimated_completion, (now() + Duration::days(3)).to_rfc3339());
		refunds.insert_front(refund.clone()).unwrap();
		assert_eq!(refunds.records()[0], refund);
		assert_eq!(refunds.records().len(), 6);
		assert!(matches!(refunds.insert_front(refund), Err(MutationError::DuplicateId(_))));
	}

	#[test]
	fn invalid_manual_refund_adds_nothing() {
		let refunds = Collection::new(fixtures::refunds());
		let form = ManualRefundForm {
			transaction_id: String::from("TXN-001236"),
			user_email: String::from("mohammed@email.com"),
			user_name: String::from("Mohammed Benjelloun"),
			original_amount: String::from("5000"),
			refund_amount: String::from("6000"),
			reason: String::from("Goodwill gesture"),
			..ManualRefundForm::default()
		};
		let errors = create_manual_refund(&form, "Current Admin", now()).unwrap_err();
		assert!(errors.get("refund_amount").is_some());
		assert_eq!(refunds.records().len(), 5);
	}

	#[test]
	fn assigning_puts_ticket_in_progress() {
		let tickets = fixtures::tickets();
		let ticket = assign_ticket(&tickets[0], &fixtures::agents(), "agent_3", now()).unwrap();
		assert_eq!(ticket.assigned_to.as_deref(), Some("agent_3"));
		assert_eq!(ticket.assigned_agent_name.as_deref(), Some("Maria Garcia"));
		assert_eq!(ticket.status, TicketStatus::InProgress);
		assert_eq!(
			assign_ticket(&tickets[0], &fixtures::agents(), "agent_9", now()),
			Err(MutationError::UnknownAgent(String::from("agent_9")))
		);
	}

	#[test]
	fn finishing_ticket_stamps_resolution() {
		let tickets = fixtures::tickets();
		let resolved = change_ticket_status(&tickets[1], TicketStatus::Resolved, now());
		assert_eq!(resolved.resolved_at, Some(now()));
		assert!(resolved.resolution_time_hours.is_some());
		let reopened = change_ticket_status(&resolved, TicketStatus::Open, now());
		assert_eq!(reopened.resolved_at, None);
		assert_eq!(reopened.status, TicketStatus::Open);
	}

	#[test]
	fn escalation_records_reason() {
		let ticket = escalate_ticket(&fixtures::tickets()[0], "  ", now());
		assert!(ticket.escalated);
		assert_eq!(ticket.escalation_reason.as_deref(), Some("Escalated by admin"));
	}

	#[test]
	fn first_visible_reply_stamps_response_time() {
		let ticket = &fixtures::tickets()[0];
		let sender = AgentIdentity {
			name: String::from("Current Agent"),
			email: String::from("agent@moroccoin.com"),
		};

		let note = ReplyDraft {
			body: String::from("Checking logs"),
			internal: true,
		};
		let (after_note, message) = reply_to_ticket(ticket, &note, &sender, now()).unwrap();
		assert_eq!(message.message_type, MessageType::Note);
		assert!(after_note.first_response_at.is_none());

		let reply = ReplyDraft {
			body: String::from("We are looking into it."),
			internal: false,
		};
		let (after_reply, message) = reply_to_ticket(&after_note, &reply, &sender, now()).unwrap();
		assert_eq!(message.message_type, MessageType::Text);
		assert_eq!(message.sender_type, SenderType::Agent);
		assert_eq!(after_reply.first_response_at, Some(now()));

		let blank = ReplyDraft {
			body: String::from("   "),
			internal: false,
		};
		assert_eq!(
			reply_to_ticket(ticket, &blank, &sender, now()),
			Err(MutationError::EmptyReply)
		);
	}

	#[test]
	fn new_ticket_is_open_with_a_day_of_sla() {
		let form = NewTicketForm {
			user_email: String::from("omar.idrissi@gmail.com"),
			user_name: String::from("Omar Idrissi"),
			subject: String::from("Card declined"),
			description: String::from("My card was declined twice."),
			priority: Priority::High,
			tags: String::from("card, payment"),
			..NewTicketForm::default()
		};
		let ticket = create_ticket(&form, now()).unwrap();
		assert_eq!(ticket.status, TicketStatus::Open);
		assert!(ticket.ticket_id.starts_with("TKT-"));
		assert_eq!(ticket.sla_due_date, now() + Duration::hours(24));
		assert_eq!(ticket.tags, vec!["card", "payment"]);
		assert_eq!(ticket.related_transaction_id, None);
	}
}
