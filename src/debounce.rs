// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracking for work that can be superseded before it finishes.
//!
//! None of these types own a timer. The caller schedules the wakeup (a browser timeout or a tokio sleep) and asks
//! on wakeup whether the work is still wanted. This keeps them usable in both the server and browser builds.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one request among a sequence of requests for the same data
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Generation(u64);

/// Counter deciding which response is the latest one asked for. Responses to older requests get dropped.
#[derive(Clone, Debug, Default)]
pub struct RequestGeneration(Arc<AtomicU64>);

impl RequestGeneration {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new request, superseding every request started before it
	pub fn begin(&self) -> Generation {
		Generation(self.0.fetch_add(1, Ordering::AcqRel) + 1)
	}

	pub fn current(&self) -> Generation {
		Generation(self.0.load(Ordering::Acquire))
	}

	pub fn is_current(&self, generation: Generation) -> bool {
		self.current() == generation
	}

	/// Supersedes whatever is outstanding without starting anything new
	pub fn cancel(&self) {
		self.0.fetch_add(1, Ordering::AcqRel);
	}
}

/// Trailing-edge debounce. Only the value from the last call in a burst is delivered.
#[derive(Clone, Debug, Default)]
pub struct Debouncer<T> {
	generations: RequestGeneration,
	pending: Option<(Generation, T)>,
}

impl<T> Debouncer<T> {
	pub fn new() -> Self {
		Self {
			generations: RequestGeneration::new(),
			pending: None,
		}
	}

	/// Replaces any waiting value. The caller should wake the debouncer with the returned generation once the quiet
	/// window has passed.
	pub fn schedule(&mut self, value: T) -> Generation {
		let generation = self.generations.begin();
		self.pending = Some((generation, value));
		generation
	}

	/// Hands over the waiting value if nothing newer was scheduled since `generation`
	pub fn fire(&mut self, generation: Generation) -> Option<T> {
		match self.pending.take() {
			Some((pending_generation, value)) if pending_generation == generation => Some(value),
			other => {
				self.pending = other;
				None
			}
		}
	}

	pub fn cancel(&mut self) {
		self.generations.cancel();
		self.pending = None;
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}
}

/// Leading-edge throttle. The first call runs and the rest are dropped until the window passes.
#[derive(Clone, Debug)]
pub struct Throttle {
	window: Duration,
	open_at: Option<DateTime<Utc>>,
}

impl Throttle {
	pub fn new(window: Duration) -> Self {
		Self { window, open_at: None }
	}

	/// Whether a call made at `now` should run
	pub fn admit(&mut self, now: DateTime<Utc>) -> bool {
		match self.open_at {
			Some(open_at) if now < open_at => false,
			_ => {
				self.open_at = Some(now + self.window);
				true
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newer_request_supersedes_older() {
		let generations = RequestGeneration::new();
		let first = generations.begin();
		let second = generations.begin();
		assert!(!generations.is_current(first));
		assert!(generations.is_current(second));
		generations.cancel();
		assert!(!generations.is_current(second));
	}

	#[test]
	fn clones_share_the_counter() {
		let generations = RequestGeneration::new();
		let handle = generations.clone();
		let started = generations.begin();
		assert!(handle.is_current(started));
		handle.begin();
		assert!(!generations.is_current(started));
	}

	#[test]
	fn only_last_value_in_burst_fires() {
		let mut debouncer = Debouncer::new();
		let first = debouncer.schedule("a");
		let second = debouncer.schedule("ah");
		let third = debouncer.schedule("ahm");
		assert_eq!(debouncer.fire(first), None);
		assert_eq!(debouncer.fire(second), None);
		assert!(debouncer.is_pending());
		assert_eq!(debouncer.fire(third), Some("ahm"));
		assert!(!debouncer.is_pending());
		assert_eq!(debouncer.fire(third), None);
	}

	#[test]
	fn cancelled_value_never_fires() {
		let mut debouncer = Debouncer::new();
		let scheduled = debouncer.schedule(5);
		debouncer.cancel();
		assert_eq!(debouncer.fire(scheduled), None);
	}

	#[test]
	fn throttle_admits_leading_call() {
		let start = DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z")
			.unwrap()
			.with_timezone(&Utc);
		let mut throttle = Throttle::new(Duration::milliseconds(500));
		assert!(throttle.admit(start));
		assert!(!throttle.admit(start + Duration::milliseconds(200)));
		assert!(throttle.admit(start + Duration::milliseconds(500)));
		assert!(!throttle.admit(start + Duration::milliseconds(900)));
	}
}
