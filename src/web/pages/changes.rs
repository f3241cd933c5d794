// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Running a change to one record from the page it's shown on

use super::utils::error_message;
use crate::format::capitalize_first;
use crate::listing::Record;
use crate::mutation::{Collection, UiState};
use crate::validation::FieldErrors;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

/// Marks a record as changing, then sends the change.
///
/// The record's controls stay disabled until the server answers. An accepted change replaces the record (and the
/// open detail view of it); a failed one leaves the record as it was and shows why.
pub fn start_change<R, Fut>(
	collection: RwSignal<Collection<R>>,
	id: String,
	set_error: WriteSignal<Option<String>>,
	change: impl FnOnce() -> Fut,
) where
	R: Record + Clone + Send + Sync + 'static,
	Fut: Future<Output = Result<R, ServerFnError>> + 'static,
{
	match collection.try_update(|collection| collection.begin(&id)) {
		Some(Ok(_)) => {}
		Some(Err(error)) => {
			set_error.set(Some(capitalize_first(&error.to_string())));
			return;
		}
		None => return,
	}
	set_error.set(None);

	let change = change();
	spawn_local(async move {
		match change.await {
			Ok(updated) => collection.update(|collection| {
				if let Err(error) = collection.complete(updated) {
					tracing::warn!(source = ?error, "Changed record is no longer listed");
				}
			}),
			Err(error) => {
				collection.update(|collection| collection.abort(&id));
				set_error.set(Some(error_message(&error)));
			}
		}
	});
}

/// Opens an overlay, or says why another one has to be closed first
pub fn open_overlay<R>(collection: RwSignal<Collection<R>>, ui: UiState, set_error: WriteSignal<Option<String>>)
where
	R: Record + Clone + Send + Sync + 'static,
{
	if let Some(Err(error)) = collection.try_update(|collection| collection.open(ui)) {
		set_error.set(Some(capitalize_first(&error.to_string())));
	}
}

/// Sends a create form once it passes validation, adding the new record to the top of the list.
///
/// Validation problems found on either side are shown against their fields. `on_created` runs once the record has
/// been added.
pub fn start_create<R, Fut>(
	collection: RwSignal<Collection<R>>,
	validation: Result<(), FieldErrors>,
	errors: RwSignal<FieldErrors>,
	saving: RwSignal<bool>,
	set_error: WriteSignal<Option<String>>,
	send: impl FnOnce() -> Fut,
	on_created: impl FnOnce() + 'static,
) where
	R: Record + Clone + Send + Sync + 'static,
	Fut: Future<Output = Result<Result<R, FieldErrors>, ServerFnError>> + 'static,
{
	if saving.get_untracked() {
		return;
	}
	if let Err(found) = validation {
		errors.set(found);
		return;
	}

	saving.set(true);
	set_error.set(None);
	let send = send();
	spawn_local(async move {
		match send.await {
			Ok(Ok(record)) => {
				collection.update(|collection| {
					if let Err(error) = collection.insert_front(record) {
						tracing::warn!(source = ?error, "Created record was already listed");
					}
				});
				on_created();
			}
			Ok(Err(found)) => errors.set(found),
			Err(error) => set_error.set(Some(error_message(&error))),
		}
		saving.set(false);
	});
}
