// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample records for running the dashboard without the platform API

use crate::model::{
	Activity, Agent, MessageType, Priority, Refund, RefundStatus, SenderType, SupportTicket, TicketCategory,
	TicketMessage, TicketStatus, Transaction, TransactionStatus, TransactionType, User, VerificationStatus,
};
use chrono::{DateTime, Duration, Utc};

fn at(timestamp: &str) -> DateTime<Utc> {
	DateTime::parse_from_rfc3339(timestamp)
		.map(|time| time.with_timezone(&Utc))
		.unwrap_or_default()
}

fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

pub fn agents() -> Vec<Agent> {
	[
		("agent_1", "Sarah Johnson", "sarah@moroccoin.com"),
		("agent_2", "Ahmed Benali", "ahmed@moroccoin.com"),
		("agent_3", "Maria Garcia", "maria@moroccoin.com"),
		("agent_4", "David Smith", "david@moroccoin.com"),
	]
	.into_iter()
	.map(|(id, name, email)| Agent {
		id: id.to_string(),
		name: name.to_string(),
		email: email.to_string(),
	})
	.collect()
}

pub fn users() -> Vec<User> {
	let user = |id: &str,
	            email: &str,
	            phone: &str,
	            name: (&str, &str),
	            country: &str,
	            verification_status: VerificationStatus,
	            balance: f64,
	            created_at: &str| User {
		user_id: id.to_string(),
		email: email.to_string(),
		phone: phone.to_string(),
		first_name: name.0.to_string(),
		last_name: name.1.to_string(),
		country: country.to_string(),
		verification_status,
		balance,
		created_at: at(created_at),
		updated_at: at(created_at),
		last_login: Some(at(created_at) + Duration::days(30)),
		is_active: true,
		total_transactions: 0,
		total_sent: 0.0,
	};

	let mut users = vec![
		user(
			"user_001",
			"youssef.alami@gmail.com",
			"+212612345678",
			("Youssef", "Alami"),
			"Morocco",
			VerificationStatus::Verified,
			5000.0,
			"2023-11-02T09:00:00Z",
		),
		user(
			"user_002",
			"fatima.benali@gmail.com",
			"+212687654321",
			("Fatima", "Benali"),
			"Morocco",
			VerificationStatus::Verified,
			2500.0,
			"2023-11-15T14:30:00Z",
		),
		user(
			"user_003",
			"mohamed.hassan@gmail.com",
			"+212698765432",
			("Mohamed", "Hassan"),
			"Morocco",
			VerificationStatus::Pending,
			1000.0,
			"2023-12-01T08:45:00Z",
		),
		user(
			"user_004",
			"aisha.khalil@gmail.com",
			"+212611223344",
			("Aisha", "Khalil"),
			"Morocco",
			VerificationStatus::Verified,
			3500.0,
			"2023-12-20T17:10:00Z",
		),
		user(
			"user_005",
			"omar.idrissi@gmail.com",
			"+212655443322",
			("Omar", "Idrissi"),
			"France",
			VerificationStatus::Verified,
			7500.0,
			"2024-01-05T11:20:00Z",
		),
	];
	users[2].is_active = false;
	users[2].last_login = None;
	users[0].total_transactions = 12;
	users[0].total_sent = 18250.0;
	users[4].total_transactions = 4;
	users[4].total_sent = 6400.0;
	users
}

pub fn transactions() -> Vec<Transaction> {
	let transaction = |id: &str,
	                   sender: (&str, &str),
	                   receiver: (&str, &str),
	                   amount: f64,
	                   status: TransactionStatus,
	                   created_at: &str,
	                   description: &str,
	                   fee_amount: f64,
	                   exchange_rate: f64,
	                   reference_number: &str,
	                   payment_method: &str,
	                   country_to: &str| Transaction {
		transaction_id: id.to_string(),
		sender_name: sender.0.to_string(),
		receiver_name: receiver.0.to_string(),
		sender_email: sender.1.to_string(),
		receiver_email: receiver.1.to_string(),
		amount,
		currency: String::from("MAD"),
		status,
		transaction_type: TransactionType::Send,
		created_at: at(created_at),
		updated_at: at(created_at) + Duration::minutes(5),
		description: description.to_string(),
		fee_amount,
		exchange_rate,
		reference_number: reference_number.to_string(),
		payment_method: payment_method.to_string(),
		country_from: String::from("Morocco"),
		country_to: country_to.to_string(),
	};

	vec![
		transaction(
			"TXN-001234",
			("Ahmed El Mansouri", "ahmed@email.com"),
			("Marie Dubois", "marie@email.com"),
			2500.0,
			TransactionStatus::Completed,
			"2024-01-15T10:30:00Z",
			"Monthly allowance",
			25.0,
			10.85,
			"REF-789456",
			"Bank Transfer",
			"France",
		),
		transaction(
			"TXN-001235",
			("Fatima Zahra", "fatima@email.com"),
			("Carlos Rodriguez", "carlos@email.com"),
			1200.5,
			TransactionStatus::Pending,
			"2024-01-15T09:15:00Z",
			"Tuition payment",
			15.0,
			10.75,
			"REF-789457",
			"Credit Card",
			"Spain",
		),
		transaction(
			"TXN-001236",
			("Mohammed Benjelloun", "mohammed@email.com"),
			("Lisa Johnson", "lisa@email.com"),
			5000.0,
			TransactionStatus::Failed,
			"2024-01-14T16:45:00Z",
			"Business payment",
			50.0,
			10.9,
			"REF-789458",
			"Bank Transfer",
			"USA",
		),
		transaction(
			"TXN-001237",
			("Youssef Alami", "youssef@email.com"),
			("Anna Schmidt", "anna@email.com"),
			800.75,
			TransactionStatus::Processing,
			"2024-01-14T14:20:00Z",
			"Gift transfer",
			10.0,
			10.8,
			"REF-789459",
			"Digital Wallet",
			"Germany",
		),
		transaction(
			"TXN-001238",
			("Aicha Benali", "aicha@email.com"),
			("Roberto Silva", "roberto@email.com"),
			3200.0,
			TransactionStatus::Completed,
			"2024-01-13T11:10:00Z",
			"Family support",
			32.0,
			10.95,
			"REF-789460",
			"Bank Transfer",
			"Brazil",
		),
	]
}

/// Builds the transaction at position `index` of an arbitrarily long generated history. Newer transactions have
/// lower indices.
pub fn generated_transaction(index: usize) -> Transaction {
	const STATUSES: [TransactionStatus; 5] = [
		TransactionStatus::Completed,
		TransactionStatus::Pending,
		TransactionStatus::Failed,
		TransactionStatus::Processing,
		TransactionStatus::Cancelled,
	];
	let created_at = at("2024-02-01T12:00:00Z") - Duration::hours(index as i64 * 7);
	Transaction {
		transaction_id: format!("TXN-{:06}", 500_000 + index),
		sender_name: String::from("Youssef Alami"),
		receiver_name: String::from("Omar Idrissi"),
		sender_email: String::from("youssef.alami@gmail.com"),
		receiver_email: String::from("omar.idrissi@gmail.com"),
		amount: 100.0 + (index as f64) * 37.5,
		currency: String::from("MAD"),
		status: STATUSES[index % STATUSES.len()],
		transaction_type: TransactionType::Send,
		created_at,
		updated_at: created_at,
		description: String::from("Generated transfer"),
		fee_amount: 5.0,
		exchange_rate: 10.8,
		reference_number: format!("REF-{:06}", 900_000 + index),
		payment_method: String::from("Bank Transfer"),
		country_from: String::from("Morocco"),
		country_to: String::from("France"),
	}
}

pub fn refunds() -> Vec<Refund> {
	vec![
		Refund {
			refund_id: String::from("REF-001234"),
			transaction_id: String::from("TXN-001234"),
			user_name: String::from("Ahmed El Mansouri"),
			user_email: String::from("ahmed@email.com"),
			original_amount: 2500.0,
			refund_amount: 2500.0,
			currency: String::from("MAD"),
			reason: String::from("Transaction failed to complete due to recipient bank issues"),
			status: RefundStatus::Pending,
			priority: Priority::High,
			created_at: at("2024-01-15T10:30:00Z"),
			updated_at: at("2024-01-15T10:30:00Z"),
			processed_at: None,
			processed_by: None,
			admin_notes: String::new(),
			supporting_documents: strings(&["receipt.pdf", "bank_statement.pdf"]),
			refund_method: String::from("Bank Transfer"),
			estimated_completion: String::from("2024-01-18T10:30:00Z"),
			contact_attempts: 1,
		},
		Refund {
			refund_id: String::from("REF-001235"),
			transaction_id: String::from("TXN-001235"),
			user_name: String::from("Fatima Zahra"),
			user_email: String::from("fatima@email.com"),
			original_amount: 1200.5,
			refund_amount: 1185.5,
			currency: String::from("MAD"),
			reason: String::from("Duplicate transaction charged twice"),
			status: RefundStatus::Approved,
			priority: Priority::Medium,
			created_at: at("2024-01-14T09:15:00Z"),
			updated_at: at("2024-01-15T11:20:00Z"),
			processed_at: Some(at("2024-01-15T11:20:00Z")),
			processed_by: Some(String::from("Admin User")),
			admin_notes: String::from("Verified duplicate charge. Processing refund minus transaction fee."),
			supporting_documents: strings(&["duplicate_charge_proof.png"]),
			refund_method: String::from("Original Payment Method"),
			estimated_completion: String::from("2024-01-17T09:15:00Z"),
			contact_attempts: 2,
		},
		Refund {
			refund_id: String::from("REF-001236"),
			transaction_id: String::from("TXN-001236"),
			user_name: String::from("Mohammed Benjelloun"),
			user_email: String::from("mohammed@email.com"),
			original_amount: 5000.0,
			refund_amount: 4950.0,
			currency: String::from("MAD"),
			reason: String::from("Service not delivered as promised"),
			status: RefundStatus::Processing,
			priority: Priority::Urgent,
			created_at: at("2024-01-13T16:45:00Z"),
			updated_at: at("2024-01-15T14:30:00Z"),
			processed_at: Some(at("2024-01-15T14:30:00Z")),
			processed_by: Some(String::from("Admin User")),
			admin_notes: String::from(
				"Large amount refund. Requires additional verification. Contacted compliance team.",
			),
			supporting_documents: strings(&["service_agreement.pdf", "complaint_details.pdf"]),
			refund_method: String::from("Bank Transfer"),
			estimated_completion: String::from("2024-01-20T16:45:00Z"),
			contact_attempts: 3,
		},
		Refund {
			refund_id: String::from("REF-001237"),
			transaction_id: String::from("TXN-001237"),
			user_name: String::from("Youssef Alami"),
			user_email: String::from("youssef@email.com"),
			original_amount: 800.75,
			refund_amount: 800.75,
			currency: String::from("MAD"),
			reason: String::from("Unauthorized transaction"),
			status: RefundStatus::Rejected,
			priority: Priority::High,
			created_at: at("2024-01-12T14:20:00Z"),
			updated_at: at("2024-01-14T16:45:00Z"),
			processed_at: Some(at("2024-01-14T16:45:00Z")),
			processed_by: Some(String::from("Admin User")),
			admin_notes: String::from(
				"Investigation showed transaction was authorized by account holder. Provided evidence to customer.",
			),
			supporting_documents: strings(&["authorization_log.txt"]),
			refund_method: String::from("N/A"),
			estimated_completion: String::from("N/A"),
			contact_attempts: 4,
		},
		Refund {
			refund_id: String::from("REF-001238"),
			transaction_id: String::from("TXN-001238"),
			user_name: String::from("Aicha Benali"),
			user_email: String::from("aicha@email.com"),
			original_amount: 3200.0,
			refund_amount: 3200.0,
			currency: String::from("MAD"),
			reason: String::from("Cancelled order before processing"),
			status: RefundStatus::Completed,
			priority: Priority::Low,
			created_at: at("2024-01-10T11:10:00Z"),
			updated_at: at("2024-01-12T09:30:00Z"),
			processed_at: Some(at("2024-01-11T15:20:00Z")),
			processed_by: Some(String::from("Admin User")),
			admin_notes: String::from("Standard cancellation refund. Processed successfully."),
			supporting_documents: strings(&["cancellation_request.pdf"]),
			refund_method: String::from("Original Payment Method"),
			estimated_completion: String::from("2024-01-14T11:10:00Z"),
			contact_attempts: 1,
		},
	]
}

pub fn tickets() -> Vec<SupportTicket> {
	let ticket = |id: &str, user: (&str, &str, &str, &str), subject: &str, description: &str| SupportTicket {
		ticket_id: id.to_string(),
		user_id: user.0.to_string(),
		user_name: user.1.to_string(),
		user_email: user.2.to_string(),
		user_phone: user.3.to_string(),
		subject: subject.to_string(),
		description: description.to_string(),
		category: TicketCategory::General,
		priority: Priority::Medium,
		status: TicketStatus::Open,
		assigned_to: None,
		assigned_agent_name: None,
		created_at: DateTime::default(),
		updated_at: DateTime::default(),
		resolved_at: None,
		first_response_at: None,
		satisfaction_rating: None,
		tags: Vec::new(),
		attachments: Vec::new(),
		related_transaction_id: None,
		escalated: false,
		escalation_reason: None,
		sla_due_date: DateTime::default(),
		response_time_minutes: None,
		resolution_time_hours: None,
	};

	let transfer_failing = SupportTicket {
		category: TicketCategory::Transaction,
		priority: Priority::High,
		created_at: at("2024-01-15T10:30:00Z"),
		updated_at: at("2024-01-15T10:30:00Z"),
		tags: strings(&["transaction_failure", "verification", "france"]),
		attachments: strings(&["error_screenshot.png"]),
		related_transaction_id: Some(String::from("TXN-001234")),
		sla_due_date: at("2024-01-16T10:30:00Z"),
		..ticket(
			"TKT-001234",
			("user_123", "Ahmed El Mansouri", "ahmed@email.com", "+212 6 12 34 56 78"),
			"Unable to complete money transfer",
			"I am trying to send money to France but the transaction keeps failing at the verification step. I have \
			 tried multiple times with different payment methods.",
		)
	};

	let duplicate_charge = SupportTicket {
		category: TicketCategory::Refund,
		status: TicketStatus::InProgress,
		assigned_to: Some(String::from("agent_1")),
		assigned_agent_name: Some(String::from("Sarah Johnson")),
		created_at: at("2024-01-14T09:15:00Z"),
		updated_at: at("2024-01-15T11:20:00Z"),
		first_response_at: Some(at("2024-01-14T10:30:00Z")),
		tags: strings(&["refund", "duplicate_charge"]),
		attachments: strings(&["bank_statement.pdf"]),
		related_transaction_id: Some(String::from("TXN-001235")),
		sla_due_date: at("2024-01-17T09:15:00Z"),
		response_time_minutes: Some(75),
		..ticket(
			"TKT-001235",
			("user_456", "Fatima Zahra", "fatima@email.com", "+212 6 98 76 54 32"),
			"Request for transaction refund",
			"I was charged twice for the same transaction. Please help me get a refund for the duplicate charge.",
		)
	};

	let verification_pending = SupportTicket {
		category: TicketCategory::Account,
		priority: Priority::Urgent,
		assigned_to: Some(String::from("agent_2")),
		assigned_agent_name: Some(String::from("Ahmed Benali")),
		created_at: at("2024-01-08T16:45:00Z"),
		updated_at: at("2024-01-15T14:30:00Z"),
		first_response_at: Some(at("2024-01-09T08:00:00Z")),
		tags: strings(&["verification", "documents", "escalated"]),
		attachments: strings(&["id_card.jpg", "proof_address.pdf"]),
		escalated: true,
		escalation_reason: Some(String::from("Customer waited too long for verification")),
		sla_due_date: at("2024-01-12T16:45:00Z"),
		response_time_minutes: Some(975),
		..ticket(
			"TKT-001236",
			("user_789", "Mohammed Benjelloun", "mohammed@email.com", "+212 6 11 22 33 44"),
			"Account verification issues",
			"My account verification has been pending for over a week. I uploaded all required documents but still \
			 no response.",
		)
	};

	let app_crash = SupportTicket {
		category: TicketCategory::Technical,
		priority: Priority::High,
		status: TicketStatus::Resolved,
		assigned_to: Some(String::from("agent_3")),
		assigned_agent_name: Some(String::from("Maria Garcia")),
		created_at: at("2024-01-12T14:20:00Z"),
		updated_at: at("2024-01-14T16:45:00Z"),
		resolved_at: Some(at("2024-01-14T16:45:00Z")),
		first_response_at: Some(at("2024-01-12T15:30:00Z")),
		satisfaction_rating: Some(5),
		tags: strings(&["mobile_app", "crash", "technical"]),
		attachments: strings(&["crash_log.txt"]),
		sla_due_date: at("2024-01-15T14:20:00Z"),
		response_time_minutes: Some(70),
		resolution_time_hours: Some(50.4),
		..ticket(
			"TKT-001237",
			("user_321", "Aicha Benali", "aicha@email.com", "+212 6 55 44 33 22"),
			"App crashes when sending money",
			"The mobile app keeps crashing whenever I try to initiate a money transfer. This happens on both iOS and \
			 Android devices.",
		)
	};

	let exchange_rates = SupportTicket {
		priority: Priority::Low,
		status: TicketStatus::Closed,
		assigned_to: Some(String::from("agent_4")),
		assigned_agent_name: Some(String::from("David Smith")),
		created_at: at("2024-01-10T11:10:00Z"),
		updated_at: at("2024-01-12T09:30:00Z"),
		resolved_at: Some(at("2024-01-11T15:20:00Z")),
		first_response_at: Some(at("2024-01-10T13:45:00Z")),
		satisfaction_rating: Some(4),
		tags: strings(&["exchange_rates", "inquiry"]),
		sla_due_date: at("2024-01-15T11:10:00Z"),
		response_time_minutes: Some(155),
		resolution_time_hours: Some(28.2),
		..ticket(
			"TKT-001238",
			("user_654", "Youssef Alami", "youssef@email.com", "+212 6 77 88 99 00"),
			"Question about exchange rates",
			"I would like to understand how your exchange rates are calculated and how often they are updated.",
		)
	};

	vec![
		transfer_failing,
		duplicate_charge,
		verification_pending,
		app_crash,
		exchange_rates,
	]
}

/// The conversation for a ticket. Every sample ticket shares the same conversation.
pub fn ticket_messages(ticket_id: &str) -> Vec<TicketMessage> {
	let message = |id: &str,
	               sender_type: SenderType,
	               sender: (&str, &str),
	               body: &str,
	               created_at: &str,
	               is_internal: bool,
	               message_type: MessageType| TicketMessage {
		message_id: id.to_string(),
		ticket_id: ticket_id.to_string(),
		sender_type,
		sender_name: sender.0.to_string(),
		sender_email: sender.1.to_string(),
		message: body.to_string(),
		created_at: at(created_at),
		attachments: Vec::new(),
		is_internal,
		message_type,
	};

	let mut opening = message(
		"msg_001",
		SenderType::User,
		("Ahmed El Mansouri", "ahmed@email.com"),
		"I am trying to send money to France but the transaction keeps failing at the verification step. I have \
		 tried multiple times with different payment methods.",
		"2024-01-15T10:30:00Z",
		false,
		MessageType::Text,
	);
	opening.attachments = strings(&["error_screenshot.png"]);

	vec![
		opening,
		message(
			"msg_002",
			SenderType::System,
			("System", "system@moroccoin.com"),
			"Ticket created and assigned to queue",
			"2024-01-15T10:31:00Z",
			false,
			MessageType::StatusChange,
		),
		message(
			"msg_003",
			SenderType::Agent,
			("Sarah Johnson", "sarah@moroccoin.com"),
			"Hello Ahmed, thank you for contacting us. I can see the transaction you're referring to. Let me \
			 investigate this issue for you.",
			"2024-01-15T11:45:00Z",
			false,
			MessageType::Text,
		),
		message(
			"msg_004",
			SenderType::Agent,
			("Sarah Johnson", "sarah@moroccoin.com"),
			"Internal note: Checked transaction logs. Verification service was down between 10:00-10:45. Customer \
			 was affected.",
			"2024-01-15T12:00:00Z",
			true,
			MessageType::Note,
		),
	]
}

/// Recent account activity for a user
pub fn activities(user_id: &str) -> Vec<Activity> {
	[
		("login", "Logged in from mobile app", "2024-01-15T08:12:00Z", "196.200.131.14"),
		("transaction", "Sent 2,500.00 MAD to Marie Dubois", "2024-01-15T10:30:00Z", "196.200.131.14"),
		("profile_update", "Updated phone number", "2024-01-10T19:40:00Z", "41.248.12.9"),
	]
	.into_iter()
	.enumerate()
	.map(|(index, (activity_type, description, created_at, ip_address))| Activity {
		activity_id: format!("{}_act_{}", user_id, index + 1),
		activity_type: activity_type.to_string(),
		description: description.to_string(),
		created_at: at(created_at),
		ip_address: Some(ip_address.to_string()),
	})
	.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::listing::Record;
	use std::collections::HashSet;

	fn unique_ids<R: Record>(records: &[R]) -> bool {
		let ids: HashSet<&str> = records.iter().map(|record| record.record_id()).collect();
		ids.len() == records.len()
	}

	#[test]
	fn sample_ids_are_unique() {
		assert!(unique_ids(&users()));
		assert!(unique_ids(&transactions()));
		assert!(unique_ids(&refunds()));
		assert!(unique_ids(&tickets()));
		let generated: Vec<Transaction> = (0..40).map(generated_transaction).collect();
		assert!(unique_ids(&generated));
	}

	#[test]
	fn timestamps_parse() {
		assert!(refunds().iter().all(|refund| refund.created_at.timestamp() > 0));
		assert!(tickets().iter().all(|ticket| ticket.sla_due_date.timestamp() > 0));
	}

	#[test]
	fn conversation_has_internal_note() {
		let messages = ticket_messages("TKT-001234");
		assert_eq!(messages.iter().filter(|message| message.is_internal).count(), 1);
		assert!(messages.iter().all(|message| message.ticket_id == "TKT-001234"));
	}
}
