// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server-held collections the dashboard pages read from and change.
//!
//! A [`Desk`] loads its records from the configured source the first time they're asked for and keeps them until
//! they're reloaded. Changes are applied locally after a simulated delay without confirmation from the platform.

use crate::api::ApiError;
use crate::debounce::RequestGeneration;
use crate::listing::Record;
use crate::model::{Agent, Refund, SupportTicket, TicketMessage, Transaction, User, order_messages};
use crate::mutation::{Collection, MutationError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, RwLockWriteGuard};

pub struct Desk<R> {
	name: &'static str,
	collection: RwLock<Collection<R>>,
	/// Changes dropped while the collection was locked, cleared on the next write
	cancelled: Mutex<Vec<String>>,
	loaded: AtomicBool,
	generation: RequestGeneration,
	latency: Duration,
}

/// Clears a record's in-progress mark if a change is dropped partway through
struct InFlightGuard<'a, R> {
	desk: &'a Desk<R>,
	id: &'a str,
	armed: bool,
}

impl<R> Drop for InFlightGuard<'_, R> {
	fn drop(&mut self) {
		if !self.armed {
			return;
		}
		tracing::debug!(desk = self.desk.name, id = self.id, "Change dropped before it landed");
		self.desk.cancelled().push(self.id.to_string());
	}
}

impl<R> Desk<R> {
	fn cancelled(&self) -> MutexGuard<'_, Vec<String>> {
		self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl<R: Record + Clone + Send + Sync> Desk<R> {
	pub fn new(name: &'static str, latency: Duration) -> Self {
		Self {
			name,
			collection: RwLock::new(Collection::default()),
			cancelled: Mutex::new(Vec::new()),
			loaded: AtomicBool::new(false),
			generation: RequestGeneration::new(),
			latency,
		}
	}

	/// Locks the collection for a change, first clearing the marks of dropped changes
	async fn write(&self) -> RwLockWriteGuard<'_, Collection<R>> {
		let mut collection = self.collection.write().await;
		for id in self.cancelled().drain(..) {
			collection.abort(&id);
		}
		collection
	}

	pub fn is_loaded(&self) -> bool {
		self.loaded.load(Ordering::Acquire)
	}

	pub async fn snapshot(&self) -> Vec<R> {
		self.collection.read().await.records().to_vec()
	}

	pub async fn get(&self, id: &str) -> Option<R> {
		self.collection.read().await.get(id).cloned()
	}

	pub async fn is_in_flight(&self, id: &str) -> bool {
		let collection = self.collection.read().await;
		collection.is_in_flight(id) && !self.cancelled().iter().any(|cancelled| cancelled == id)
	}

	/// Fetches the records and replaces the held ones, unless another reload started while this one was waiting.
	///
	/// Returns the records held afterwards.
	pub async fn reload<F, Fut>(&self, fetch: F) -> Result<Vec<R>, ApiError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Vec<R>, ApiError>>,
	{
		let generation = self.generation.begin();
		let records = fetch().await?;

		let mut collection = self.write().await;
		if self.generation.is_current(generation) {
			tracing::debug!(desk = self.name, count = records.len(), "Loaded records");
			collection.replace_all(records);
			self.loaded.store(true, Ordering::Release);
		} else {
			tracing::debug!(desk = self.name, "Dropped superseded load");
		}
		Ok(collection.records().to_vec())
	}

	/// The held records, fetching them first if they haven't been loaded yet
	pub async fn records_or_load<F, Fut>(&self, fetch: F) -> Result<Vec<R>, ApiError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Vec<R>, ApiError>>,
	{
		if self.is_loaded() {
			return Ok(self.snapshot().await);
		}
		self.reload(fetch).await
	}

	/// Changes one record.
	///
	/// The record is marked as in progress for the length of the simulated delay, then replaced with the result of
	/// the transition applied to the record as it is held at that point. A second change to the same record while the
	/// first is in progress is refused.
	pub async fn mutate<F>(&self, id: &str, transition: F) -> Result<R, MutationError>
	where
		F: FnOnce(&R) -> Result<R, MutationError>,
	{
		self.write().await.begin(id)?;
		let mut guard = InFlightGuard {
			desk: self,
			id,
			armed: true,
		};

		tokio::time::sleep(self.latency).await;

		let mut collection = self.write().await;
		guard.armed = false;
		let Some(current) = collection.get(id).cloned() else {
			collection.abort(id);
			return Err(MutationError::NotFound(id.to_string()));
		};
		match transition(&current) {
			Ok(updated) => {
				collection.complete(updated.clone())?;
				tracing::info!(desk = self.name, id, "Applied change");
				Ok(updated)
			}
			Err(error) => {
				collection.abort(id);
				tracing::warn!(desk = self.name, id, %error, "Change refused");
				Err(error)
			}
		}
	}

	/// Adds a newly created record to the top of the list after the simulated delay
	pub async fn create(&self, record: R) -> Result<R, MutationError> {
		tokio::time::sleep(self.latency).await;
		self.write().await.insert_front(record.clone())?;
		tracing::info!(desk = self.name, id = record.record_id(), "Created record");
		Ok(record)
	}
}

/// The conversations of the tickets that have been opened, loaded one ticket at a time
#[derive(Default)]
pub struct Threads {
	threads: RwLock<HashMap<String, Vec<TicketMessage>>>,
}

impl Threads {
	pub async fn messages_or_load<F, Fut>(&self, ticket_id: &str, fetch: F) -> Result<Vec<TicketMessage>, ApiError>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Vec<TicketMessage>, ApiError>>,
	{
		if let Some(messages) = self.threads.read().await.get(ticket_id) {
			return Ok(messages.clone());
		}

		let mut messages = fetch().await?;
		order_messages(&mut messages);
		let mut threads = self.threads.write().await;
		Ok(threads.entry(ticket_id.to_string()).or_insert(messages).clone())
	}

	/// Adds a message to the end of its ticket's conversation
	pub async fn append(&self, message: TicketMessage) {
		self.threads
			.write()
			.await
			.entry(message.ticket_id.clone())
			.or_default()
			.push(message);
	}
}

/// Every collection the dashboard works with
pub struct Desks {
	pub users: Desk<User>,
	pub transactions: Desk<Transaction>,
	pub refunds: Desk<Refund>,
	pub tickets: Desk<SupportTicket>,
	pub threads: Threads,
	pub agents: RwLock<Vec<Agent>>,
}

impl Desks {
	pub fn new(latency: Duration) -> Self {
		Self {
			users: Desk::new("users", latency),
			transactions: Desk::new("transactions", latency),
			refunds: Desk::new("refunds", latency),
			tickets: Desk::new("tickets", latency),
			threads: Threads::default(),
			agents: RwLock::new(Vec::new()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures;
	use crate::model::RefundStatus;
	use crate::mutation::{RefundDecision, decide_refund};
	use chrono::Utc;
	use std::sync::Arc;

	const LATENCY: Duration = Duration::from_millis(1000);

	async fn loaded_refunds() -> Arc<Desk<Refund>> {
		let desk = Arc::new(Desk::new("refunds", LATENCY));
		desk.reload(|| async { Ok(fixtures::refunds()) }).await.unwrap();
		desk
	}

	#[tokio::test(start_paused = true)]
	async fn change_lands_after_latency() {
		let desk = loaded_refunds().await;
		let started = tokio::time::Instant::now();

		let change = tokio::spawn({
			let desk = Arc::clone(&desk);
			async move {
				desk.mutate("REF-001234", |refund| {
					decide_refund(refund, RefundDecision::Approve, "", "Current Admin", Utc::now())
				})
				.await
			}
		});
		tokio::task::yield_now().await;
		assert!(desk.is_in_flight("REF-001234").await);

		let refund = change.await.unwrap().unwrap();
		assert!(started.elapsed() >= LATENCY);
		assert_eq!(refund.status, RefundStatus::Approved);
		assert!(!desk.is_in_flight("REF-001234").await);
		assert_eq!(desk.get("REF-001234").await.unwrap().status, RefundStatus::Approved);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_change_to_same_record_is_refused() {
		let desk = loaded_refunds().await;
		let first = tokio::spawn({
			let desk = Arc::clone(&desk);
			async move { desk.mutate("REF-001234", |refund| Ok(refund.clone())).await }
		});
		tokio::task::yield_now().await;

		let second = desk.mutate("REF-001234", |refund| Ok(refund.clone())).await;
		assert_eq!(second, Err(MutationError::AlreadyInFlight(String::from("REF-001234"))));
		assert!(first.await.unwrap().is_ok());
	}

	#[tokio::test(start_paused = true)]
	async fn refused_change_clears_in_progress_mark() {
		let desk = loaded_refunds().await;
		let result = desk
			.mutate("REF-001235", |refund| {
				decide_refund(refund, RefundDecision::Reject, "", "Current Admin", Utc::now())
			})
			.await;
		assert!(matches!(result, Err(MutationError::InvalidTransition { .. })));
		assert!(!desk.is_in_flight("REF-001235").await);
	}

	#[tokio::test(start_paused = true)]
	async fn cancelled_change_clears_in_progress_mark() {
		let desk = loaded_refunds().await;
		let change = tokio::spawn({
			let desk = Arc::clone(&desk);
			async move { desk.mutate("REF-001234", |refund| Ok(refund.clone())).await }
		});
		tokio::task::yield_now().await;
		assert!(desk.is_in_flight("REF-001234").await);

		change.abort();
		let _ = change.await;
		assert!(!desk.is_in_flight("REF-001234").await);
	}

	#[tokio::test(start_paused = true)]
	async fn change_cancelled_during_a_read_can_be_retried() {
		let desk = loaded_refunds().await;
		let change = tokio::spawn({
			let desk = Arc::clone(&desk);
			async move { desk.mutate("REF-001234", |refund| Ok(refund.clone())).await }
		});
		tokio::task::yield_now().await;

		let reading = desk.collection.read().await;
		change.abort();
		let _ = change.await;
		drop(reading);
		assert!(!desk.is_in_flight("REF-001234").await);

		let retry = desk
			.mutate("REF-001234", |refund| {
				decide_refund(refund, RefundDecision::Approve, "", "Current Admin", Utc::now())
			})
			.await
			.unwrap();
		assert_eq!(retry.status, RefundStatus::Approved);
		assert!(!desk.is_in_flight("REF-001234").await);
	}

	#[tokio::test(start_paused = true)]
	async fn change_applies_to_records_reloaded_during_the_delay() {
		let desk = loaded_refunds().await;
		let change = tokio::spawn({
			let desk = Arc::clone(&desk);
			async move {
				desk.mutate("REF-001234", |refund| {
					decide_refund(refund, RefundDecision::Approve, "", "Current Admin", Utc::now())
				})
				.await
			}
		});
		tokio::task::yield_now().await;

		desk.reload(|| async {
			let mut refunds = fixtures::refunds();
			refunds[0].contact_attempts = 3;
			Ok(refunds)
		})
		.await
		.unwrap();

		let refund = change.await.unwrap().unwrap();
		assert_eq!(refund.status, RefundStatus::Approved);
		assert_eq!(refund.contact_attempts, 3);
		assert_eq!(desk.get("REF-001234").await.unwrap().contact_attempts, 3);
	}

	#[tokio::test(start_paused = true)]
	async fn superseded_load_is_dropped() {
		let desk = Arc::new(Desk::<Refund>::new("refunds", LATENCY));
		let slow = tokio::spawn({
			let desk = Arc::clone(&desk);
			async move {
				desk.reload(|| async {
					tokio::time::sleep(Duration::from_secs(5)).await;
					Ok(fixtures::refunds())
				})
				.await
			}
		});
		tokio::task::yield_now().await;

		let fresh = desk
			.reload(|| async { Ok(fixtures::refunds().into_iter().take(2).collect()) })
			.await
			.unwrap();
		assert_eq!(fresh.len(), 2);

		let after_slow = slow.await.unwrap().unwrap();
		assert_eq!(after_slow.len(), 2);
		assert_eq!(desk.snapshot().await.len(), 2);
	}

	#[tokio::test]
	async fn records_load_only_once() {
		let desk = Desk::<Refund>::new("refunds", Duration::ZERO);
		assert!(!desk.is_loaded());
		desk.records_or_load(|| async { Ok(fixtures::refunds()) }).await.unwrap();
		let again = desk.records_or_load(|| async { Ok(Vec::new()) }).await.unwrap();
		assert_eq!(again.len(), 5);
	}

	#[tokio::test]
	async fn created_record_goes_first() {
		let desk = Desk::<Refund>::new("refunds", Duration::ZERO);
		desk.reload(|| async { Ok(fixtures::refunds()) }).await.unwrap();
		let mut refund = fixtures::refunds()[0].clone();
		assert!(matches!(desk.create(refund.clone()).await, Err(MutationError::DuplicateId(_))));

		refund.refund_id = String::from("REF-777777");
		desk.create(refund).await.unwrap();
		assert_eq!(desk.snapshot().await[0].refund_id, "REF-777777");
	}

	#[tokio::test]
	async fn threads_keep_appended_replies() {
		let threads = Threads::default();
		let messages = threads
			.messages_or_load("TKT-001234", || async { Ok(fixtures::ticket_messages("TKT-001234")) })
			.await
			.unwrap();
		let mut reply = messages[0].clone();
		reply.message_id = String::from("msg_new");
		threads.append(reply).await;

		let reloaded = threads
			.messages_or_load("TKT-001234", || async { Ok(Vec::new()) })
			.await
			.unwrap();
		assert_eq!(reloaded.len(), messages.len() + 1);
		assert_eq!(reloaded.last().unwrap().message_id, "msg_new");
	}
}
