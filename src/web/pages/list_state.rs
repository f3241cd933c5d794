// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::errors::error::ErrorBanner;
use crate::debounce::Throttle;
use crate::listing::{ListPage, ListQuery, Record, list_page, status_counts};
use crate::mutation::Collection;
use chrono::Utc;
use leptos::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::future::Future;

/// Reload requests closer together than this are dropped
const RELOAD_WINDOW_MS: i64 = 1000;

/// A page's collection of records along with the table controls over it
pub struct ListState<R: Send + Sync + 'static> {
	pub collection: RwSignal<Collection<R>>,
	pub query: RwSignal<ListQuery>,
	/// The table page the query currently selects
	pub page: Memo<ListPage<R>>,
	/// Record counts by status over the whole collection
	pub status_counts: Memo<BTreeMap<String, usize>>,
	resource: Resource<Result<Vec<R>, ServerFnError>>,
	reload_count: RwSignal<u32>,
	reload_throttle: StoredValue<Throttle>,
}

impl<R: Send + Sync + 'static> Clone for ListState<R> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<R: Send + Sync + 'static> Copy for ListState<R> {}

impl<R> ListState<R>
where
	R: Record + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
	/// Loads records with `load`, which is told whether to drop the server's copy and fetch again
	pub fn new<F, Fut>(load: F) -> Self
	where
		F: Fn(bool) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Vec<R>, ServerFnError>> + Send + 'static,
	{
		let reload_count = RwSignal::new(0_u32);
		let resource = Resource::new(move || reload_count.get(), move |count| load(count > 0));
		let collection = RwSignal::new(Collection::default());
		let query = RwSignal::new(ListQuery::default());

		Effect::new_isomorphic(move |_| {
			if let Some(Ok(records)) = resource.get() {
				collection.update(|collection| collection.replace_all(records));
			}
		});

		let page = Memo::new(move |_| {
			query.with(|query| collection.with(|collection| list_page(collection.records(), query)))
		});
		let status_counts = Memo::new(move |_| collection.with(|collection| status_counts(collection.records())));

		Self {
			collection,
			query,
			page,
			status_counts,
			resource,
			reload_count,
			reload_throttle: StoredValue::new(Throttle::new(chrono::Duration::milliseconds(RELOAD_WINDOW_MS))),
		}
	}

	/// Fetches the records again, dropping changes made since they were loaded
	pub fn reload(&self) {
		let admitted = self
			.reload_throttle
			.try_update_value(|throttle| throttle.admit(Utc::now()))
			.unwrap_or_default();
		if admitted {
			self.reload_count.update(|count| *count += 1);
		}
	}

	/// `None` while loading
	pub fn load_state(&self) -> Option<Result<(), ServerFnError>> {
		self.resource
			.read()
			.as_ref()
			.map(|result| result.as_ref().map(|_| ()).map_err(Clone::clone))
	}

	pub fn status_count(&self, status: &str) -> usize {
		self.status_counts.with(|counts| counts.get(status).copied().unwrap_or_default())
	}

	pub fn total(&self) -> usize {
		self.collection.with(|collection| collection.records().len())
	}

	pub fn is_in_flight(&self, id: &str) -> bool {
		self.collection.with(|collection| collection.is_in_flight(id))
	}
}

/// Shows its children once a list has loaded, or the error banner if it couldn't be
#[component]
pub fn Loaded<R>(list: ListState<R>, children: ChildrenFn) -> impl IntoView
where
	R: Record + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
	view! {
		<Transition fallback=|| view! { <div class="loading">"Loading..."</div> }>
			{move || match list.load_state() {
				None => view! { <div class="loading">"Loading..."</div> }.into_any(),
				Some(Err(error)) => {
					view! { <ErrorBanner error on_retry=Callback::new(move |_| list.reload()) /> }.into_any()
				}
				Some(Ok(())) => children().into_any(),
			}}
		</Transition>
	}
}
