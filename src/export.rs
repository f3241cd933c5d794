// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSV downloads of the record lists

use crate::format::date_label;
use crate::model::{Refund, SupportTicket, Transaction};

pub trait CsvRow {
	/// Name offered for the downloaded file
	const FILE_NAME: &'static str;
	const HEADER: &'static [&'static str];

	fn csv_fields(&self) -> Vec<String>;
}

impl CsvRow for Transaction {
	const FILE_NAME: &'static str = "transactions.csv";
	const HEADER: &'static [&'static str] = &["Transaction ID", "Sender", "Receiver", "Amount", "Status", "Date"];

	fn csv_fields(&self) -> Vec<String> {
		vec![
			self.transaction_id.clone(),
			self.sender_name.clone(),
			self.receiver_name.clone(),
			self.amount.to_string(),
			self.status.to_string(),
			date_label(&self.created_at),
		]
	}
}

impl CsvRow for Refund {
	const FILE_NAME: &'static str = "refunds.csv";
	const HEADER: &'static [&'static str] = &[
		"Refund ID",
		"Transaction ID",
		"User",
		"Amount",
		"Status",
		"Priority",
		"Date",
	];

	fn csv_fields(&self) -> Vec<String> {
		vec![
			self.refund_id.clone(),
			self.transaction_id.clone(),
			self.user_name.clone(),
			self.refund_amount.to_string(),
			self.status.to_string(),
			self.priority.to_string(),
			date_label(&self.created_at),
		]
	}
}

impl CsvRow for SupportTicket {
	const FILE_NAME: &'static str = "support_tickets.csv";
	const HEADER: &'static [&'static str] = &[
		"Ticket ID",
		"Customer",
		"Subject",
		"Category",
		"Priority",
		"Status",
		"Assigned To",
		"Created Date",
	];

	fn csv_fields(&self) -> Vec<String> {
		vec![
			self.ticket_id.clone(),
			self.user_name.clone(),
			self.subject.clone(),
			self.category.to_string(),
			self.priority.to_string(),
			self.status.to_string(),
			self.assigned_agent_name
				.clone()
				.unwrap_or_else(|| String::from("Unassigned")),
			date_label(&self.created_at),
		]
	}
}

fn escape_field(field: &str) -> String {
	if field.contains([',', '"', '\n', '\r']) {
		format!("\"{}\"", field.replace('"', "\"\""))
	} else {
		field.to_string()
	}
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
	fields
		.iter()
		.map(|field| escape_field(field.as_ref()))
		.collect::<Vec<_>>()
		.join(",")
}

/// Writes the full set of records as CSV, one line per record under a header line
pub fn to_csv<R: CsvRow>(records: &[R]) -> String {
	let mut lines = Vec::with_capacity(records.len() + 1);
	lines.push(csv_line(R::HEADER));
	lines.extend(records.iter().map(|record| csv_line(record.csv_fields().as_slice())));
	lines.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures;

	#[test]
	fn refunds_export_with_header() {
		let csv = to_csv(&fixtures::refunds());
		let mut lines = csv.lines();
		assert_eq!(
			lines.next(),
			Some("Refund ID,Transaction ID,User,Amount,Status,Priority,Date")
		);
		assert_eq!(
			lines.next(),
			Some("REF-001234,TXN-001234,Ahmed El Mansouri,2500,pending,high,\"Jan 15, 2024\"")
		);
		assert_eq!(lines.count(), 4);
	}

	#[test]
	fn unassigned_tickets_are_labelled() {
		let csv = to_csv(&fixtures::tickets());
		let first_ticket = csv.lines().nth(1).unwrap();
		assert!(first_ticket.contains(",Unassigned,"));
	}

	#[test]
	fn quotes_are_escaped() {
		assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
		assert_eq!(escape_field("plain"), "plain");
	}
}
