// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display helpers for amounts, dates, and statuses. None of these fail; bad input renders a fallback.

use crate::model::TicketStatus;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMAT: &str = "%b %d, %Y";
const DATE_TIME_FORMAT: &str = "%b %d, %Y %H:%M";

/// Reads a timestamp in any of the ISO 8601 shapes the API produces
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
	let text = text.trim();
	if let Ok(time) = DateTime::parse_from_rfc3339(text) {
		return Some(time.with_timezone(&Utc));
	}
	if let Ok(time) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
		return Some(time.and_utc());
	}
	NaiveDate::parse_from_str(text, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|time| time.and_utc())
}

fn group_thousands(digits: &str) -> String {
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (index, digit) in digits.chars().enumerate() {
		if index > 0 && (digits.len() - index) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}
	grouped
}

/// Formats an amount with two decimals and thousands separators, followed by the currency code
pub fn format_currency(amount: f64, currency: &str) -> String {
	if !amount.is_finite() {
		return String::from("0.00 MAD");
	}
	let fixed = format!("{:.2}", amount.abs());
	let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
	let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
	format!("{}{}.{} {}", sign, group_thousands(whole), cents, currency)
}

/// Like [`format_currency`], for amounts that arrive as text
pub fn format_currency_text(amount: &str, currency: &str) -> String {
	match amount.trim().parse::<f64>() {
		Ok(amount) => format_currency(amount, currency),
		Err(_) => String::from("0.00 MAD"),
	}
}

/// Formats a large count in short form, like "1.2K" or "3M"
pub fn format_compact_number(value: f64) -> String {
	const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

	if !value.is_finite() {
		return String::from("0");
	}
	let sign = if value < 0.0 { "-" } else { "" };
	let magnitude = value.abs();

	let Some(unit_index) = UNITS.iter().position(|(size, _)| magnitude >= *size) else {
		return format!("{}{}", sign, magnitude.round());
	};
	let (size, suffix) = UNITS[unit_index];
	let scaled = magnitude / size;
	let rounded = if scaled < 10.0 {
		(scaled * 10.0).round() / 10.0
	} else {
		scaled.round()
	};

	if rounded >= 1000.0 && unit_index > 0 {
		let (_, larger_suffix) = UNITS[unit_index - 1];
		return format!("{}1{}", sign, larger_suffix);
	}
	format!("{}{}{}", sign, rounded, suffix)
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
	format!("{:.*}%", decimals, value)
}

/// Change between two periods, in percent. Growth from nothing counts as 100%.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
	if previous == 0.0 {
		if current > 0.0 { 100.0 } else { 0.0 }
	} else {
		(current - previous) / previous * 100.0
	}
}

pub fn date_label(time: &DateTime<Utc>) -> String {
	time.format(DATE_FORMAT).to_string()
}

pub fn date_time_label(time: &DateTime<Utc>) -> String {
	time.format(DATE_TIME_FORMAT).to_string()
}

/// Formats an ISO 8601 date like "Jan 15, 2024"
pub fn format_date(text: &str) -> String {
	parse_timestamp(text).map(|time| date_label(&time)).unwrap_or_default()
}

/// Formats an ISO 8601 timestamp like "Jan 15, 2024 10:30"
pub fn format_datetime(text: &str) -> String {
	parse_timestamp(text).map(|time| date_time_label(&time)).unwrap_or_default()
}

/// Describes how long ago something happened. After a week, the short date is shown instead.
pub fn format_relative_time(time: &DateTime<Utc>, now: DateTime<Utc>) -> String {
	let elapsed = now - *time;
	let minutes = elapsed.num_minutes();
	let hours = elapsed.num_hours();
	let days = elapsed.num_days();

	if minutes < 1 {
		String::from("Just now")
	} else if minutes < 60 {
		format!("{}m ago", minutes)
	} else if hours < 24 {
		format!("{}h ago", hours)
	} else if days < 7 {
		format!("{}d ago", days)
	} else {
		time.format("%b %d").to_string()
	}
}

/// The style of badge used to show a status
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BadgeVariant {
	Success,
	Warning,
	Destructive,
	Secondary,
	Outline,
}

impl BadgeVariant {
	pub fn class_name(&self) -> &'static str {
		match self {
			Self::Success => "badge_success",
			Self::Warning => "badge_warning",
			Self::Destructive => "badge_destructive",
			Self::Secondary => "badge_secondary",
			Self::Outline => "badge_outline",
		}
	}
}

pub fn status_variant(status: &str) -> BadgeVariant {
	match status.to_lowercase().as_str() {
		"completed" | "verified" | "approved" | "sent" | "active" => BadgeVariant::Success,
		"pending" | "medium" => BadgeVariant::Warning,
		"failed" | "rejected" | "cancelled" | "high" => BadgeVariant::Destructive,
		"inactive" => BadgeVariant::Secondary,
		_ => BadgeVariant::Outline,
	}
}

const GREEN: &str = "bg-green-100 text-green-800 border-green-200";
const ORANGE: &str = "bg-orange-100 text-orange-800 border-orange-200";
const RED: &str = "bg-red-100 text-red-800 border-red-200";
const PURPLE: &str = "bg-purple-100 text-purple-800 border-purple-200";
const GRAY: &str = "bg-gray-100 text-gray-800 border-gray-200";
const BLUE: &str = "bg-blue-100 text-blue-800 border-blue-200";

/// Colour classes for a status pill
pub fn status_color(status: &str) -> &'static str {
	match status.to_lowercase().as_str() {
		"completed" | "verified" | "approved" | "sent" | "active" => GREEN,
		"pending" | "medium" => ORANGE,
		"failed" | "rejected" | "high" => RED,
		"refunded" => PURPLE,
		"low" => BLUE,
		_ => GRAY,
	}
}

/// Turns an API status like "in_progress" into "In Progress"
pub fn status_label(status: &str) -> String {
	status
		.split('_')
		.filter(|word| !word.is_empty())
		.map(capitalize_first)
		.collect::<Vec<_>>()
		.join(" ")
}

pub fn capitalize_first(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

pub fn initials(first_name: &str, last_name: &str) -> String {
	first_name
		.chars()
		.take(1)
		.chain(last_name.chars().take(1))
		.flat_map(char::to_uppercase)
		.collect()
}

/// Up to two initials from a full name, for avatars
pub fn name_initials(name: &str) -> String {
	name.split_whitespace()
		.filter_map(|word| word.chars().next())
		.flat_map(char::to_uppercase)
		.take(2)
		.collect()
}

/// Cuts text to at most `max_length` characters, marking the cut with an ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
	if text.chars().count() <= max_length {
		return text.to_string();
	}
	let mut truncated: String = text.chars().take(max_length).collect();
	truncated.push_str("...");
	truncated
}

fn clamped_slice(text: &str, start: usize, end: usize) -> &str {
	let end = end.min(text.len());
	let start = start.min(end);
	&text[start..end]
}

/// Groups a phone number's digits for display. Moroccan numbers get their country code grouping.
pub fn format_phone_number(phone: &str) -> String {
	let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

	if let Some(number) = digits.strip_prefix("212") {
		return format!(
			"+212 {} {} {} {} {}",
			clamped_slice(number, 0, 1),
			clamped_slice(number, 1, 3),
			clamped_slice(number, 3, 5),
			clamped_slice(number, 5, 7),
			clamped_slice(number, 7, number.len()),
		);
	}

	if digits.len() == 10 {
		return format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..]);
	}

	phone.to_string()
}

pub fn format_file_size(bytes: u64) -> String {
	const SIZES: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

	if bytes == 0 {
		return String::from("0 Bytes");
	}
	let mut scaled = bytes as f64;
	let mut exponent = 0;
	while scaled >= 1024.0 && exponent < SIZES.len() - 1 {
		scaled /= 1024.0;
		exponent += 1;
	}
	let scaled = (scaled * 100.0).round() / 100.0;
	format!("{} {}", scaled, SIZES[exponent])
}

/// How a ticket stands against its response deadline
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlaStatus {
	Overdue,
	DueSoon,
	Met,
	HoursLeft(i64),
}

impl SlaStatus {
	pub fn new(sla_due_date: &DateTime<Utc>, status: TicketStatus, now: DateTime<Utc>) -> Self {
		let finished = status.is_finished();
		let seconds_left = (*sla_due_date - now).num_seconds();
		let hours_left = seconds_left.div_euclid(3600) + i64::from(seconds_left.rem_euclid(3600) > 0);

		if now > *sla_due_date && !finished {
			Self::Overdue
		} else if hours_left <= 2 && !finished {
			Self::DueSoon
		} else if finished {
			Self::Met
		} else {
			Self::HoursLeft(hours_left)
		}
	}

	pub fn label(&self) -> String {
		match self {
			Self::Overdue => String::from("Overdue"),
			Self::DueSoon => String::from("Due Soon"),
			Self::Met => String::from("Met SLA"),
			Self::HoursLeft(hours) => format!("{}h left", hours),
		}
	}

	pub fn variant(&self) -> BadgeVariant {
		match self {
			Self::Overdue => BadgeVariant::Destructive,
			Self::DueSoon => BadgeVariant::Warning,
			Self::Met => BadgeVariant::Success,
			Self::HoursLeft(_) => BadgeVariant::Outline,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	fn at(text: &str) -> DateTime<Utc> {
		parse_timestamp(text).unwrap()
	}

	#[test]
	fn currency_has_separators_and_code() {
		assert_eq!(format_currency(2500.0, "MAD"), "2,500.00 MAD");
		assert_eq!(format_currency(1234567.891, "EUR"), "1,234,567.89 EUR");
		assert_eq!(format_currency(800.75, "MAD"), "800.75 MAD");
		assert_eq!(format_currency(-45.5, "MAD"), "-45.50 MAD");
		assert_eq!(format_currency(f64::NAN, "EUR"), "0.00 MAD");
		assert_eq!(format_currency_text("1200.5", "MAD"), "1,200.50 MAD");
		assert_eq!(format_currency_text("twelve", "MAD"), "0.00 MAD");
	}

	#[test]
	fn dates_render_short_month() {
		assert_eq!(format_date("2024-01-15T10:30:00Z"), "Jan 15, 2024");
		assert_eq!(format_datetime("2024-01-15T10:30:00Z"), "Jan 15, 2024 10:30");
		assert_eq!(format_date("2024-03-05"), "Mar 05, 2024");
		assert_eq!(format_date("not a date"), "");
		assert_eq!(format_datetime(""), "");
	}

	#[test]
	fn relative_time_steps() {
		let now = at("2024-01-15T12:00:00Z");
		assert_eq!(format_relative_time(&(now - Duration::seconds(20)), now), "Just now");
		assert_eq!(format_relative_time(&(now - Duration::minutes(5)), now), "5m ago");
		assert_eq!(format_relative_time(&(now - Duration::hours(3)), now), "3h ago");
		assert_eq!(format_relative_time(&(now - Duration::days(2)), now), "2d ago");
		assert_eq!(format_relative_time(&at("2024-01-02T09:00:00Z"), now), "Jan 02");
	}

	#[test]
	fn unknown_statuses_fall_back() {
		assert_eq!(status_variant("Approved"), BadgeVariant::Success);
		assert_eq!(status_variant("cancelled"), BadgeVariant::Destructive);
		assert_eq!(status_variant("low"), BadgeVariant::Outline);
		assert_eq!(status_variant("teleported"), BadgeVariant::Outline);
		assert_eq!(status_color("refunded"), PURPLE);
		assert_eq!(status_color("teleported"), GRAY);
		assert_eq!(status_label("pending_user"), "Pending User");
	}

	#[test]
	fn compact_numbers() {
		assert_eq!(format_compact_number(999.0), "999");
		assert_eq!(format_compact_number(1234.0), "1.2K");
		assert_eq!(format_compact_number(12345.0), "12K");
		assert_eq!(format_compact_number(1_000_000.0), "1M");
		assert_eq!(format_compact_number(999_999.0), "1M");
	}

	#[test]
	fn percentages() {
		assert_eq!(format_percentage(12.345, 1), "12.3%");
		assert_eq!(percentage_change(150.0, 100.0), 50.0);
		assert_eq!(percentage_change(5.0, 0.0), 100.0);
		assert_eq!(percentage_change(0.0, 0.0), 0.0);
	}

	#[test]
	fn text_helpers() {
		assert_eq!(initials("youssef", "alami"), "YA");
		assert_eq!(name_initials("Sarah Jane Johnson"), "SJ");
		assert_eq!(truncate_text("Unable to complete money transfer", 9), "Unable to...");
		assert_eq!(truncate_text("Short", 9), "Short");
	}

	#[test]
	fn phone_numbers() {
		assert_eq!(format_phone_number("+212612345678"), "+212 6 12 34 56 78");
		assert_eq!(format_phone_number("555-123-4567"), "(555) 123-4567");
		assert_eq!(format_phone_number("12345"), "12345");
	}

	#[test]
	fn file_sizes() {
		assert_eq!(format_file_size(0), "0 Bytes");
		assert_eq!(format_file_size(512), "512 Bytes");
		assert_eq!(format_file_size(1536), "1.5 KB");
		assert_eq!(format_file_size(1_048_576), "1 MB");
	}

	#[test]
	fn sla_badges() {
		let now = at("2024-01-15T12:00:00Z");
		let due = |hours| now + Duration::hours(hours);
		assert_eq!(SlaStatus::new(&due(-1), TicketStatus::Open, now), SlaStatus::Overdue);
		assert_eq!(SlaStatus::new(&due(2), TicketStatus::InProgress, now), SlaStatus::DueSoon);
		assert_eq!(SlaStatus::new(&due(-5), TicketStatus::Closed, now), SlaStatus::Met);
		assert_eq!(SlaStatus::new(&due(30), TicketStatus::Open, now).label(), "30h left");
	}
}
