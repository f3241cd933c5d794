// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Search, filtering, sorting, and pagination over in-memory record collections.
//!
//! Every table in the dashboard (users, transactions, refunds, support tickets) runs through [list_page]. The record
//! types describe which of their fields are searchable, filterable, and sortable through the [Record] trait; the
//! engine itself doesn't know anything about the shape of the records it handles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The number of records shown on each page of a table
pub const PAGE_SIZE: usize = 10;

/// A row that can be shown in one of the dashboard's tables.
pub trait Record {
	/// The identifier of the record. Unique within a collection.
	fn record_id(&self) -> &str;

	/// The fields checked by a search. A record matches a search if any of these fields contains the search term.
	fn search_fields(&self) -> Vec<&str>;

	/// Gets the value used to check the filter with the given name.
	///
	/// Returns `None` when the record type doesn't support that filter, in which case the filter doesn't exclude
	/// the record.
	fn filter_field(&self, filter: &str) -> Option<FieldValue<'_>>;

	/// Gets the value used to order records when sorting by the given field.
	fn sort_field(&self, field: &str) -> Option<SortKey<'_>>;

	/// The record's status as shown in its status badge
	fn status(&self) -> &str;

	fn created_at(&self) -> DateTime<Utc>;
}

/// The value of a record field as seen by a filter
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
	/// Matches a filter value exactly
	Text(&'a str),
	/// Matches a filter value appearing anywhere in the text, ignoring case
	TextContains(&'a str),
	/// Matches a filter value equal to any of the contained values
	AnyText(Vec<&'a str>),
	/// A number. Filters ending in `_min` or `_max` are bounds; others must match exactly.
	Number(f64),
	/// Matches the filter values `true` and `false`
	Flag(bool),
	/// A timestamp. Filters ending in `_from` or `_to` are inclusive day bounds (`YYYY-MM-DD`).
	Timestamp(DateTime<Utc>),
}

/// The value of a record field as seen by a sort
#[derive(Clone, Debug, PartialEq)]
pub enum SortKey<'a> {
	/// Compared ignoring case
	Text(Cow<'a, str>),
	Number(f64),
	/// An ordered level, like a priority
	Rank(u8),
	Timestamp(DateTime<Utc>),
	/// Orders before every other value
	Missing,
}

impl SortKey<'_> {
	fn compare(&self, other: &SortKey<'_>) -> Ordering {
		match (self, other) {
			(SortKey::Text(left), SortKey::Text(right)) => left.to_lowercase().cmp(&right.to_lowercase()),
			(SortKey::Number(left), SortKey::Number(right)) => left.total_cmp(right),
			(SortKey::Rank(left), SortKey::Rank(right)) => left.cmp(right),
			(SortKey::Timestamp(left), SortKey::Timestamp(right)) => left.cmp(right),
			(SortKey::Missing, SortKey::Missing) => Ordering::Equal,
			(SortKey::Missing, _) => Ordering::Less,
			(_, SortKey::Missing) => Ordering::Greater,
			_ => Ordering::Equal,
		}
	}
}

/// The filters set for a table. Entries with an empty value don't constrain anything.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterState(BTreeMap<String, String>);

impl FilterState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a filter value. An empty value removes the filter.
	pub fn set(&mut self, filter: &str, value: &str) {
		let value = value.trim();
		if value.is_empty() {
			self.0.remove(filter);
		} else {
			self.0.insert(filter.to_string(), value.to_string());
		}
	}

	pub fn get(&self, filter: &str) -> &str {
		self.0.get(filter).map(String::as_str).unwrap_or_default()
	}

	pub fn clear(&mut self) {
		self.0.clear();
	}

	pub fn is_empty(&self) -> bool {
		self.active().next().is_none()
	}

	/// Iterates over the filters that have a value
	pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0
			.iter()
			.filter(|(_, value)| !value.trim().is_empty())
			.map(|(filter, value)| (filter.as_str(), value.trim()))
	}

	/// Checks whether a record passes every active filter
	pub fn admits<R: Record>(&self, record: &R) -> bool {
		self.active()
			.all(|(filter, value)| match record.filter_field(filter) {
				Some(field) => field_matches(filter, &field, value),
				None => true,
			})
	}
}

fn field_matches(filter: &str, field: &FieldValue<'_>, value: &str) -> bool {
	match field {
		FieldValue::Text(text) => *text == value,
		FieldValue::TextContains(text) => text.to_lowercase().contains(&value.to_lowercase()),
		FieldValue::AnyText(texts) => texts.iter().any(|text| *text == value),
		FieldValue::Number(number) => {
			let Ok(bound) = value.parse::<f64>() else {
				return true;
			};
			if filter.ends_with("_min") {
				*number >= bound
			} else if filter.ends_with("_max") {
				*number <= bound
			} else {
				*number == bound
			}
		}
		FieldValue::Flag(flag) => match value {
			"true" => *flag,
			"false" => !*flag,
			_ => true,
		},
		FieldValue::Timestamp(timestamp) => {
			let Ok(bound) = NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
				return true;
			};
			let day = timestamp.date_naive();
			if filter.ends_with("_from") {
				day >= bound
			} else if filter.ends_with("_to") {
				day <= bound
			} else {
				day == bound
			}
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}

impl SortDirection {
	pub fn flipped(self) -> Self {
		match self {
			Self::Asc => Self::Desc,
			Self::Desc => Self::Asc,
		}
	}
}

/// The single active sort of a table
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortState {
	pub field: String,
	pub direction: SortDirection,
}

impl Default for SortState {
	fn default() -> Self {
		Self {
			field: String::from("created_at"),
			direction: SortDirection::Desc,
		}
	}
}

impl SortState {
	pub fn new(field: &str, direction: SortDirection) -> Self {
		Self {
			field: field.to_string(),
			direction,
		}
	}

	/// Handles a click on a column header. Clicking the sorted column flips the direction; clicking another column
	/// sorts by that column, descending.
	pub fn toggle(&mut self, field: &str) {
		if self.field == field {
			self.direction = self.direction.flipped();
		} else {
			self.field = field.to_string();
			self.direction = SortDirection::Desc;
		}
	}

	/// Sorts the records in place. The sort is stable in both directions.
	pub fn apply<R: Record>(&self, records: &mut [&R]) {
		records.sort_by(|left, right| {
			let left = left.sort_field(&self.field).unwrap_or(SortKey::Missing);
			let right = right.sort_field(&self.field).unwrap_or(SortKey::Missing);
			match self.direction {
				SortDirection::Asc => left.compare(&right),
				SortDirection::Desc => right.compare(&left),
			}
		});
	}
}

/// Everything the user has set to control which records a table shows
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListQuery {
	pub search: String,
	pub filters: FilterState,
	pub sort: SortState,
	/// 1-based page number
	pub page: usize,
}

impl Default for ListQuery {
	fn default() -> Self {
		Self {
			search: String::new(),
			filters: FilterState::new(),
			sort: SortState::default(),
			page: 1,
		}
	}
}

impl ListQuery {
	/// Changes the search term, going back to the first page
	pub fn set_search(&mut self, search: &str) {
		self.search = search.to_string();
		self.page = 1;
	}

	/// Changes a filter, going back to the first page
	pub fn set_filter(&mut self, filter: &str, value: &str) {
		self.filters.set(filter, value);
		self.page = 1;
	}

	/// Removes the search and all filters, going back to the first page
	pub fn clear(&mut self) {
		self.search.clear();
		self.filters.clear();
		self.page = 1;
	}

	pub fn toggle_sort(&mut self, field: &str) {
		self.sort.toggle(field);
	}

	pub fn current_page(&self) -> usize {
		self.page.max(1)
	}
}

/// Pagination details for a page of records
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageInfo {
	/// The number of records matching the search and filters
	pub count: usize,
	pub page: usize,
	/// The next page number, if there are more matching records
	pub next: Option<usize>,
	/// The previous page number, if this isn't the first page
	pub previous: Option<usize>,
}

impl PageInfo {
	pub fn new(count: usize, page: usize) -> Self {
		let page = page.max(1);
		let next = (count > page * PAGE_SIZE).then_some(page + 1);
		let previous = (page > 1).then(|| page - 1);
		Self {
			count,
			page,
			next,
			previous,
		}
	}

	pub fn total_pages(&self) -> usize {
		self.count.div_ceil(PAGE_SIZE).max(1)
	}

	/// The 1-based position of the first and last record shown on the page, for "Showing 11 to 20 of 34" text
	pub fn shown_range(&self) -> (usize, usize) {
		if self.count == 0 {
			return (0, 0);
		}
		let first = (self.page - 1) * PAGE_SIZE + 1;
		let last = (self.page * PAGE_SIZE).min(self.count);
		(first.min(self.count), last)
	}
}

/// One page of a table
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ListPage<R> {
	pub records: Vec<R>,
	pub info: PageInfo,
}

/// Checks whether a record contains the search term in any of its searchable fields.
///
/// The term must already be lowercase. An empty term matches everything.
pub fn matches_search<R: Record>(record: &R, lowercase_term: &str) -> bool {
	if lowercase_term.is_empty() {
		return true;
	}
	record
		.search_fields()
		.into_iter()
		.any(|field| field.to_lowercase().contains(lowercase_term))
}

/// Gets every record matching the query's filters and search, in sorted order
pub fn matching_records<'a, R: Record>(records: &'a [R], query: &ListQuery) -> Vec<&'a R> {
	let term = query.search.trim().to_lowercase();
	let mut matching: Vec<&R> = records
		.iter()
		.filter(|record| query.filters.admits(*record))
		.filter(|record| matches_search(*record, &term))
		.collect();
	query.sort.apply(&mut matching);
	matching
}

/// Applies the filters, then the search, then the sort, and cuts out the requested page.
///
/// Pagination details always come from the fully filtered and searched set.
pub fn list_page<R: Record + Clone>(records: &[R], query: &ListQuery) -> ListPage<R> {
	let matching = matching_records(records, query);
	let info = PageInfo::new(matching.len(), query.current_page());
	let records = matching
		.into_iter()
		.skip((info.page - 1) * PAGE_SIZE)
		.take(PAGE_SIZE)
		.cloned()
		.collect();
	ListPage { records, info }
}

/// Counts the records in each status, for the summary cards above a table
pub fn status_counts<R: Record>(records: &[R]) -> BTreeMap<String, usize> {
	let mut counts = BTreeMap::new();
	for record in records {
		*counts.entry(record.status().to_string()).or_insert(0) += 1;
	}
	counts
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures;
	use crate::model::{Refund, Transaction};

	fn ids<R: Record>(records: &[R]) -> Vec<&str> {
		records.iter().map(|record| record.record_id()).collect()
	}

	#[test]
	fn empty_search_admits_everything() {
		let refunds = fixtures::refunds();
		let page = list_page(&refunds, &ListQuery::default());
		assert_eq!(page.info.count, refunds.len());
	}

	#[test]
	fn search_matches_email_prefix() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_search("ahm");
		let page = list_page(&refunds, &query);
		assert_eq!(ids(&page.records), vec!["REF-001234"]);
	}

	#[test]
	fn search_ignores_case() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_search("FATIMA");
		let page = list_page(&refunds, &query);
		assert_eq!(ids(&page.records), vec!["REF-001235"]);
	}

	#[test]
	fn status_filter_counts_only_matches() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_filter("status", "pending");
		let page = list_page(&refunds, &query);
		assert_eq!(page.records.len(), 1);
		assert_eq!(page.info.count, 1);
		assert_eq!(page.records[0].status.as_str(), "pending");
	}

	#[test]
	fn empty_filter_values_are_ignored() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_filter("status", "");
		query.set_filter("priority", "   ");
		assert!(query.filters.is_empty());
		assert_eq!(list_page(&refunds, &query).info.count, refunds.len());
	}

	#[test]
	fn amount_bounds_compose() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_filter("amount_min", "1000");
		query.set_filter("amount_max", "3000");
		let page = list_page(&refunds, &query);
		let mut found = ids(&page.records);
		found.sort();
		assert_eq!(found, vec!["REF-001234", "REF-001235"]);
	}

	#[test]
	fn unparseable_bound_is_ignored() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_filter("amount_min", "lots");
		assert_eq!(list_page(&refunds, &query).info.count, refunds.len());
	}

	#[test]
	fn unknown_filter_is_ignored() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_filter("transaction_type", "send");
		assert_eq!(list_page(&refunds, &query).info.count, refunds.len());
	}

	#[test]
	fn date_filters_are_inclusive() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.set_filter("date_from", "2024-01-13");
		query.set_filter("date_to", "2024-01-14");
		let page = list_page(&refunds, &query);
		let mut found = ids(&page.records);
		found.sort();
		assert_eq!(found, vec!["REF-001235", "REF-001236"]);
	}

	#[test]
	fn results_are_subset_of_input() {
		let transactions = fixtures::transactions();
		let mut query = ListQuery::default();
		query.set_search("a");
		query.set_filter("status", "completed");
		let page = list_page(&transactions, &query);
		for record in page.records.iter() {
			assert!(transactions.contains(record));
		}
	}

	#[test]
	fn sort_defaults_to_newest_first() {
		let refunds = fixtures::refunds();
		let page = list_page(&refunds, &ListQuery::default());
		let created: Vec<_> = page.records.iter().map(|refund| refund.created_at).collect();
		assert!(created.windows(2).all(|pair| pair[0] >= pair[1]));
	}

	#[test]
	fn toggling_twice_restores_order() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.toggle_sort("refund_amount");
		let first = list_page(&refunds, &query);
		query.toggle_sort("refund_amount");
		assert_eq!(query.sort.direction, SortDirection::Asc);
		query.toggle_sort("refund_amount");
		let again = list_page(&refunds, &query);
		assert_eq!(first, again);
	}

	#[test]
	fn new_sort_field_starts_descending() {
		let mut sort = SortState::new("created_at", SortDirection::Asc);
		sort.toggle("priority");
		assert_eq!(sort, SortState::new("priority", SortDirection::Desc));
	}

	#[test]
	fn priority_sorts_by_severity() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.toggle_sort("priority");
		let page = list_page(&refunds, &query);
		assert_eq!(page.records[0].priority.as_str(), "urgent");
		assert_eq!(page.records[4].priority.as_str(), "low");
	}

	#[test]
	fn sort_is_stable_for_ties() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.sort = SortState::new("refund_method", SortDirection::Asc);
		let page = list_page(&refunds, &query);
		assert_eq!(
			ids(&page.records),
			vec!["REF-001234", "REF-001236", "REF-001237", "REF-001235", "REF-001238"]
		);
	}

	#[test]
	fn unknown_sort_field_keeps_order() {
		let refunds = fixtures::refunds();
		let mut query = ListQuery::default();
		query.toggle_sort("no_such_column");
		let page = list_page(&refunds, &query);
		assert_eq!(ids(&page.records), ids(&refunds));
	}

	#[test]
	fn pagination_follows_filtered_count() {
		let transactions: Vec<Transaction> = (0..23).map(fixtures::generated_transaction).collect();
		let mut query = ListQuery::default();

		let first = list_page(&transactions, &query);
		assert_eq!(first.records.len(), PAGE_SIZE);
		assert_eq!(first.info.previous, None);
		assert_eq!(first.info.next, Some(2));

		query.page = 3;
		let last = list_page(&transactions, &query);
		assert_eq!(last.records.len(), 3);
		assert_eq!(last.info.previous, Some(2));
		assert_eq!(last.info.next, None);
		assert_eq!(last.info.shown_range(), (21, 23));

		query.set_filter("status", "failed");
		let filtered = list_page(&transactions, &query);
		assert_eq!(filtered.info.page, 1);
		assert!(filtered.info.count < 23);
		assert_eq!(filtered.info.next, None);
	}

	#[test]
	fn page_info_edges() {
		for count in [0, 1, 10, 11, 20, 21] {
			for page in 1..4 {
				let info = PageInfo::new(count, page);
				assert_eq!(info.previous.is_none(), page == 1);
				assert_eq!(info.next.is_none(), count <= page * PAGE_SIZE);
			}
		}
		assert_eq!(PageInfo::new(0, 1).total_pages(), 1);
		assert_eq!(PageInfo::new(0, 1).shown_range(), (0, 0));
	}

	#[test]
	fn counts_statuses() {
		let refunds: Vec<Refund> = fixtures::refunds();
		let counts = status_counts(&refunds);
		assert_eq!(counts.get("pending"), Some(&1));
		assert_eq!(counts.values().sum::<usize>(), refunds.len());
	}
}
