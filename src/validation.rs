// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Checks for the forms an admin fills in before a record is created or a message is sent

use crate::model::{NotificationType, Priority, TicketCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Loose address check used by the creation forms
static FORM_EMAIL_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Failed to compile form email regex"));
static STRICT_EMAIL_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex"));
static PHONE_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("Failed to compile phone regex"));

/// Validation messages keyed by the name of the form field they belong to
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records an error for a field. The first error recorded for a field is the one kept.
	pub fn insert(&mut self, field: &str, message: &str) {
		self.0
			.entry(field.to_string())
			.or_insert_with(|| message.to_string());
	}

	pub fn get(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}

	/// Drops the error for a field, as happens once the admin edits it
	pub fn remove(&mut self, field: &str) {
		self.0.remove(field);
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
	}

	fn into_result(self) -> Result<(), FieldErrors> {
		if self.is_empty() { Ok(()) } else { Err(self) }
	}
}

impl fmt::Display for FieldErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for (field, message) in self.iter() {
			if !first {
				f.write_str("; ")?;
			}
			write!(f, "{}: {}", field, message)?;
			first = false;
		}
		Ok(())
	}
}

/// Form fields read and written by name, as the inputs bound to them do
pub trait TextFields {
	/// The field's current text. Unknown fields read as empty.
	fn text(&self, field: &str) -> String;

	/// Replaces a field's text. Unknown fields and values a choice field doesn't accept are ignored.
	fn set_text(&mut self, field: &str, value: &str);
}

fn set_choice<T: std::str::FromStr>(slot: &mut T, value: &str) {
	if let Ok(choice) = value.parse() {
		*slot = choice;
	}
}

fn is_blank(text: &str) -> bool {
	text.trim().is_empty()
}

/// Parses an amount typed into a form. Anything that isn't a finite number is rejected.
pub fn parse_amount(text: &str) -> Option<f64> {
	text.trim().parse::<f64>().ok().filter(|amount| amount.is_finite())
}

/// Full email address check for contact details
pub fn validate_email(email: &str) -> bool {
	STRICT_EMAIL_PATTERN.is_match(email)
}

/// Phone numbers may contain spaces, dashes, and brackets, but need at least ten digits
pub fn validate_phone(phone: &str) -> bool {
	let digits = phone.chars().filter(char::is_ascii_digit).count();
	PHONE_PATTERN.is_match(phone) && digits >= 10
}

fn check_required_email(errors: &mut FieldErrors, email: &str, required_message: &str) {
	if is_blank(email) {
		errors.insert("user_email", required_message);
	} else if !FORM_EMAIL_PATTERN.is_match(email) {
		errors.insert("user_email", "Please enter a valid email address");
	}
}

/// A refund an admin creates by hand for a transaction
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ManualRefundForm {
	pub transaction_id: String,
	pub user_email: String,
	pub user_name: String,
	pub original_amount: String,
	pub refund_amount: String,
	pub currency: String,
	pub reason: String,
	pub priority: Priority,
	pub refund_method: String,
	pub admin_notes: String,
	/// Left empty to use the default completion estimate
	pub estimated_completion: String,
}

impl Default for ManualRefundForm {
	fn default() -> Self {
		Self {
			transaction_id: String::new(),
			user_email: String::new(),
			user_name: String::new(),
			original_amount: String::new(),
			refund_amount: String::new(),
			currency: String::from("MAD"),
			reason: String::new(),
			priority: Priority::Medium,
			refund_method: String::from("Bank Transfer"),
			admin_notes: String::new(),
			estimated_completion: String::new(),
		}
	}
}

impl ManualRefundForm {
	pub fn validate(&self) -> Result<(), FieldErrors> {
		let mut errors = FieldErrors::new();

		if is_blank(&self.transaction_id) {
			errors.insert("transaction_id", "Transaction ID is required");
		}
		check_required_email(&mut errors, &self.user_email, "User email is required");
		if is_blank(&self.user_name) {
			errors.insert("user_name", "User name is required");
		}

		let original_amount = parse_amount(&self.original_amount);
		if is_blank(&self.original_amount) {
			errors.insert("original_amount", "Original amount is required");
		} else if !original_amount.is_some_and(|amount| amount > 0.0) {
			errors.insert("original_amount", "Please enter a valid amount");
		}

		let refund_amount = parse_amount(&self.refund_amount);
		if is_blank(&self.refund_amount) {
			errors.insert("refund_amount", "Refund amount is required");
		} else {
			match refund_amount {
				Some(amount) if amount > 0.0 => {
					if original_amount.is_some_and(|original| amount > original) {
						errors.insert("refund_amount", "Refund amount cannot exceed original amount");
					}
				}
				_ => errors.insert("refund_amount", "Please enter a valid refund amount"),
			}
		}

		if is_blank(&self.reason) {
			errors.insert("reason", "Refund reason is required");
		}

		errors.into_result()
	}
}

impl TextFields for ManualRefundForm {
	fn text(&self, field: &str) -> String {
		match field {
			"transaction_id" => self.transaction_id.clone(),
			"user_email" => self.user_email.clone(),
			"user_name" => self.user_name.clone(),
			"original_amount" => self.original_amount.clone(),
			"refund_amount" => self.refund_amount.clone(),
			"currency" => self.currency.clone(),
			"reason" => self.reason.clone(),
			"priority" => self.priority.to_string(),
			"refund_method" => self.refund_method.clone(),
			"admin_notes" => self.admin_notes.clone(),
			"estimated_completion" => self.estimated_completion.clone(),
			_ => String::new(),
		}
	}

	fn set_text(&mut self, field: &str, value: &str) {
		let slot = match field {
			"transaction_id" => &mut self.transaction_id,
			"user_email" => &mut self.user_email,
			"user_name" => &mut self.user_name,
			"original_amount" => &mut self.original_amount,
			"refund_amount" => &mut self.refund_amount,
			"currency" => &mut self.currency,
			"reason" => &mut self.reason,
			"refund_method" => &mut self.refund_method,
			"admin_notes" => &mut self.admin_notes,
			"estimated_completion" => &mut self.estimated_completion,
			"priority" => return set_choice(&mut self.priority, value),
			_ => return,
		};
		*slot = value.to_string();
	}
}

/// A support ticket opened by an admin on behalf of a customer
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NewTicketForm {
	pub user_email: String,
	pub user_name: String,
	pub user_phone: String,
	pub subject: String,
	pub description: String,
	pub category: TicketCategory,
	pub priority: Priority,
	pub related_transaction_id: String,
	/// Comma-separated
	pub tags: String,
}

impl Default for NewTicketForm {
	fn default() -> Self {
		Self {
			user_email: String::new(),
			user_name: String::new(),
			user_phone: String::new(),
			subject: String::new(),
			description: String::new(),
			category: TicketCategory::General,
			priority: Priority::Medium,
			related_transaction_id: String::new(),
			tags: String::new(),
		}
	}
}

impl NewTicketForm {
	pub fn validate(&self) -> Result<(), FieldErrors> {
		let mut errors = FieldErrors::new();

		check_required_email(&mut errors, &self.user_email, "Customer email is required");
		if is_blank(&self.user_name) {
			errors.insert("user_name", "Customer name is required");
		}
		if is_blank(&self.subject) {
			errors.insert("subject", "Subject is required");
		}
		if is_blank(&self.description) {
			errors.insert("description", "Description is required");
		}

		errors.into_result()
	}

	/// The tags typed into the form, without blanks
	pub fn tag_list(&self) -> Vec<String> {
		self.tags
			.split(',')
			.map(str::trim)
			.filter(|tag| !tag.is_empty())
			.map(String::from)
			.collect()
	}
}

impl TextFields for NewTicketForm {
	fn text(&self, field: &str) -> String {
		match field {
			"user_email" => self.user_email.clone(),
			"user_name" => self.user_name.clone(),
			"user_phone" => self.user_phone.clone(),
			"subject" => self.subject.clone(),
			"description" => self.description.clone(),
			"category" => self.category.to_string(),
			"priority" => self.priority.to_string(),
			"related_transaction_id" => self.related_transaction_id.clone(),
			"tags" => self.tags.clone(),
			_ => String::new(),
		}
	}

	fn set_text(&mut self, field: &str, value: &str) {
		let slot = match field {
			"user_email" => &mut self.user_email,
			"user_name" => &mut self.user_name,
			"user_phone" => &mut self.user_phone,
			"subject" => &mut self.subject,
			"description" => &mut self.description,
			"related_transaction_id" => &mut self.related_transaction_id,
			"tags" => &mut self.tags,
			"category" => return set_choice(&mut self.category, value),
			"priority" => return set_choice(&mut self.priority, value),
			_ => return,
		};
		*slot = value.to_string();
	}
}

/// A message sent to a user from their detail page
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NotificationForm {
	pub title: String,
	pub message: String,
	pub notification_type: NotificationType,
}

impl Default for NotificationForm {
	fn default() -> Self {
		Self {
			title: String::new(),
			message: String::new(),
			notification_type: NotificationType::Email,
		}
	}
}

impl NotificationForm {
	pub fn validate(&self) -> Result<(), FieldErrors> {
		let mut errors = FieldErrors::new();
		if is_blank(&self.title) {
			errors.insert("title", "Title is required");
		}
		if is_blank(&self.message) {
			errors.insert("message", "Message is required");
		}
		errors.into_result()
	}
}

impl TextFields for NotificationForm {
	fn text(&self, field: &str) -> String {
		match field {
			"title" => self.title.clone(),
			"message" => self.message.clone(),
			"notification_type" => self.notification_type.to_string(),
			_ => String::new(),
		}
	}

	fn set_text(&mut self, field: &str, value: &str) {
		match field {
			"title" => self.title = value.to_string(),
			"message" => self.message = value.to_string(),
			"notification_type" => set_choice(&mut self.notification_type, value),
			_ => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filled_refund_form() -> ManualRefundForm {
		ManualRefundForm {
			transaction_id: String::from("TXN-001234"),
			user_email: String::from("ahmed@email.com"),
			user_name: String::from("Ahmed El Mansouri"),
			original_amount: String::from("5000"),
			refund_amount: String::from("2500"),
			reason: String::from("Recipient bank rejected the transfer"),
			..ManualRefundForm::default()
		}
	}

	#[test]
	fn address_and_phone_patterns_compile() {
		assert!(FORM_EMAIL_PATTERN.is_match("name: ahmed@email.com"));
		assert!(!FORM_EMAIL_PATTERN.is_match("ahmed@localhost"));
		assert!(STRICT_EMAIL_PATTERN.is_match("ahmed@email.com"));
		assert!(!STRICT_EMAIL_PATTERN.is_match("ahmed @email.com"));
		assert!(PHONE_PATTERN.is_match("+212 (6) 12-34-56-78"));
		assert!(!PHONE_PATTERN.is_match("0612x45678"));
	}

	#[test]
	fn complete_refund_form_passes() {
		assert_eq!(filled_refund_form().validate(), Ok(()));
	}

	#[test]
	fn refund_above_original_is_rejected() {
		let form = ManualRefundForm {
			refund_amount: String::from("6000"),
			..filled_refund_form()
		};
		let errors = form.validate().unwrap_err();
		assert_eq!(errors.len(), 1);
		assert_eq!(
			errors.get("refund_amount"),
			Some("Refund amount cannot exceed original amount")
		);
	}

	#[test]
	fn empty_refund_form_reports_every_field() {
		let errors = ManualRefundForm::default().validate().unwrap_err();
		assert_eq!(errors.get("transaction_id"), Some("Transaction ID is required"));
		assert_eq!(errors.get("user_email"), Some("User email is required"));
		assert_eq!(errors.get("user_name"), Some("User name is required"));
		assert_eq!(errors.get("original_amount"), Some("Original amount is required"));
		assert_eq!(errors.get("refund_amount"), Some("Refund amount is required"));
		assert_eq!(errors.get("reason"), Some("Refund reason is required"));
	}

	#[test]
	fn non_positive_amounts_are_invalid() {
		let form = ManualRefundForm {
			original_amount: String::from("abc"),
			refund_amount: String::from("-3"),
			..filled_refund_form()
		};
		let errors = form.validate().unwrap_err();
		assert_eq!(errors.get("original_amount"), Some("Please enter a valid amount"));
		assert_eq!(errors.get("refund_amount"), Some("Please enter a valid refund amount"));
	}

	#[test]
	fn malformed_email_is_rejected() {
		let form = ManualRefundForm {
			user_email: String::from("ahmed.email.com"),
			..filled_refund_form()
		};
		assert_eq!(
			form.validate().unwrap_err().get("user_email"),
			Some("Please enter a valid email address")
		);
	}

	#[test]
	fn ticket_form_uses_customer_wording() {
		let errors = NewTicketForm::default().validate().unwrap_err();
		assert_eq!(errors.get("user_email"), Some("Customer email is required"));
		assert_eq!(errors.get("user_name"), Some("Customer name is required"));
		assert_eq!(errors.get("subject"), Some("Subject is required"));
		assert_eq!(errors.get("description"), Some("Description is required"));
		assert_eq!(errors.len(), 4);
	}

	#[test]
	fn ticket_tags_split_on_commas() {
		let form = NewTicketForm {
			tags: String::from(" refund, urgent ,,vip"),
			..NewTicketForm::default()
		};
		assert_eq!(form.tag_list(), vec!["refund", "urgent", "vip"]);
	}

	#[test]
	fn notification_needs_title_and_message() {
		let errors = NotificationForm::default().validate().unwrap_err();
		assert_eq!(errors.len(), 2);
		let form = NotificationForm {
			title: String::from("Verification"),
			message: String::from("Your documents were approved."),
			notification_type: NotificationType::Sms,
		};
		assert!(form.validate().is_ok());
	}

	#[test]
	fn contact_validators() {
		assert!(validate_email("youssef.alami@gmail.com"));
		assert!(!validate_email("youssef alami@gmail.com"));
		assert!(!validate_email("youssef@gmail"));
		assert!(validate_phone("+212 612-345-678"));
		assert!(!validate_phone("+212 612"));
		assert!(!validate_phone("0612345678x"));
	}

	#[test]
	fn fields_are_addressed_by_name() {
		let mut form = NewTicketForm::default();
		form.set_text("subject", "Card declined");
		form.set_text("priority", "urgent");
		form.set_text("category", "not-a-category");
		form.set_text("unknown", "ignored");
		assert_eq!(form.subject, "Card declined");
		assert_eq!(form.priority, Priority::Urgent);
		assert_eq!(form.category, TicketCategory::General);
		assert_eq!(form.text("priority"), "urgent");
		assert_eq!(form.text("unknown"), "");
	}

	#[test]
	fn editing_a_field_clears_its_error() {
		let mut errors = ManualRefundForm::default().validate().unwrap_err();
		errors.remove("reason");
		assert_eq!(errors.get("reason"), None);
		assert_eq!(errors.len(), 5);
	}
}
