// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table controls shared by the list pages

use super::utils::search_debounce;
use crate::debounce::Debouncer;
use crate::format::{SlaStatus, status_color, status_label, status_variant};
use crate::listing::{ListQuery, PageInfo, SortDirection};
use crate::validation::{FieldErrors, TextFields};
use leptos::prelude::*;

/// Search input that updates the query once typing pauses
#[component]
pub fn SearchBox(query: RwSignal<ListQuery>, placeholder: &'static str) -> impl IntoView {
	let debouncer = StoredValue::new(Debouncer::<String>::new());
	let delay = search_debounce();

	let schedule_search = move |term: String| {
		let Some(generation) = debouncer.try_update_value(|debouncer| debouncer.schedule(term)) else {
			return;
		};
		set_timeout(
			move || {
				if let Some(Some(term)) = debouncer.try_update_value(|debouncer| debouncer.fire(generation)) {
					query.update(|query| query.set_search(&term));
				}
			},
			delay,
		);
	};

	view! {
		<input
			type="search"
			class="list_search"
			placeholder=placeholder
			prop:value=move || query.with(|query| query.search.clone())
			on:input=move |event| schedule_search(event_target_value(&event))
		/>
	}
}

/// Drop-down setting one filter. The first option clears the filter.
#[component]
pub fn FilterSelect(
	query: RwSignal<ListQuery>,
	filter: &'static str,
	all_label: &'static str,
	options: Vec<(String, String)>,
) -> impl IntoView {
	view! {
		<select
			class="list_filter"
			prop:value=move || query.with(|query| query.filters.get(filter).to_string())
			on:change=move |event| query.update(|query| query.set_filter(filter, &event_target_value(&event)))
		>
			<option value="">{all_label}</option>
			{
				options.into_iter().map(|(value, label)| view! {
					<option value=value>{label}</option>
				}).collect::<Vec<_>>()
			}
		</select>
	}
}

/// Text or date input setting one filter as it's typed
#[component]
pub fn FilterInput(
	query: RwSignal<ListQuery>,
	filter: &'static str,
	input_type: &'static str,
	placeholder: &'static str,
) -> impl IntoView {
	view! {
		<input
			type=input_type
			class="list_filter"
			placeholder=placeholder
			prop:value=move || query.with(|query| query.filters.get(filter).to_string())
			on:change=move |event| query.update(|query| query.set_filter(filter, &event_target_value(&event)))
		/>
	}
}

#[component]
pub fn ClearFiltersButton(query: RwSignal<ListQuery>) -> impl IntoView {
	view! {
		<button
			type="button"
			class="list_clear"
			disabled=move || query.with(|query| query.filters.is_empty() && query.search.is_empty())
			on:click=move |_| query.update(|query| query.clear())
		>
			"Clear Filters"
		</button>
	}
}

/// Column header that sorts the table by its field when clicked
#[component]
pub fn SortHeader(query: RwSignal<ListQuery>, field: &'static str, label: &'static str) -> impl IntoView {
	let arrow = move || {
		query.with(|query| match (query.sort.field == field, query.sort.direction) {
			(false, _) => "",
			(true, SortDirection::Asc) => " ▲",
			(true, SortDirection::Desc) => " ▼",
		})
	};

	view! {
		<th class="sortable" on:click=move |_| query.update(|query| query.toggle_sort(field))>
			{label}
			{arrow}
		</th>
	}
}

#[component]
pub fn Pager(query: RwSignal<ListQuery>, #[prop(into)] info: Signal<PageInfo>) -> impl IntoView {
	let summary = move || {
		let info = info.get();
		let (first, last) = info.shown_range();
		format!("Showing {} to {} of {} results", first, last, info.count)
	};

	view! {
		<div class="pager">
			<span class="pager_summary">{summary}</span>
			<button
				type="button"
				disabled=move || info.with(|info| info.previous.is_none())
				on:click=move |_| {
					if let Some(previous) = info.with_untracked(|info| info.previous) {
						query.update(|query| query.page = previous);
					}
				}
			>
				"Previous"
			</button>
			<span class="pager_position">
				{move || info.with(|info| format!("Page {} of {}", info.page, info.total_pages()))}
			</span>
			<button
				type="button"
				disabled=move || info.with(|info| info.next.is_none())
				on:click=move |_| {
					if let Some(next) = info.with_untracked(|info| info.next) {
						query.update(|query| query.page = next);
					}
				}
			>
				"Next"
			</button>
		</div>
	}
}

#[component]
pub fn StatusBadge(#[prop(into)] status: String) -> impl IntoView {
	let class = format!("badge {}", status_variant(&status).class_name());
	view! { <span class=class>{status_label(&status)}</span> }
}

/// Coloured pill for a priority
#[component]
pub fn PriorityPill(#[prop(into)] priority: String) -> impl IntoView {
	let class = format!("pill {}", status_color(&priority));
	view! { <span class=class>{status_label(&priority)}</span> }
}

#[component]
pub fn SlaBadge(sla: SlaStatus) -> impl IntoView {
	let class = format!("badge {}", sla.variant().class_name());
	view! { <span class=class>{sla.label()}</span> }
}

#[component]
pub fn StatCard(label: &'static str, #[prop(into)] value: Signal<String>) -> impl IntoView {
	view! {
		<div class="stat_card">
			<div class="stat_card_label">{label}</div>
			<div class="stat_card_value">{move || value.get()}</div>
		</div>
	}
}

/// Dialog over the page. Clicking the backdrop or the close button closes it.
#[component]
pub fn Modal(#[prop(into)] title: String, on_close: Callback<()>, children: Children) -> impl IntoView {
	view! {
		<div class="modal_backdrop" on:click=move |_| on_close.run(())>
			<div class="modal" role="dialog" on:click=|event| event.stop_propagation()>
				<div class="modal_header">
					<h2>{title}</h2>
					<button type="button" class="modal_close" on:click=move |_| on_close.run(())>"×"</button>
				</div>
				<div class="modal_body">{children()}</div>
			</div>
		</div>
	}
}

/// A label and value line in a detail view
#[component]
pub fn DetailRow(label: &'static str, #[prop(into)] value: String) -> impl IntoView {
	view! {
		<div class="detail_row">
			<dt>{label}</dt>
			<dd>{value}</dd>
		</div>
	}
}

/// The validation message for one form field, if it has one
#[component]
pub fn FieldError(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
	move || {
		errors.with(|errors| {
			errors
				.get(field)
				.map(|message| view! { <p class="field_error">{message.to_string()}</p> })
		})
	}
}

/// One labelled input of a create form, bound to its field by name.
///
/// Typing into a field clears its validation message. With `options` the input is a drop-down; an `input_type` of
/// `"textarea"` gives a multi-line box.
#[component]
pub fn FormField<T>(
	form: RwSignal<T>,
	errors: RwSignal<FieldErrors>,
	field: &'static str,
	label: &'static str,
	#[prop(default = "text")] input_type: &'static str,
	#[prop(optional)] options: Vec<(String, String)>,
	#[prop(optional)] required: bool,
) -> impl IntoView
where
	T: TextFields + Send + Sync + 'static,
{
	let value = move || form.with(|form| form.text(field));
	let edit = move |text: String| {
		form.update(|form| form.set_text(field, &text));
		errors.update(|errors| errors.remove(field));
	};

	let input = if !options.is_empty() {
		view! {
			<select prop:value=value on:change=move |event| edit(event_target_value(&event))>
				{
					options.into_iter().map(|(value, label)| view! {
						<option value=value>{label}</option>
					}).collect::<Vec<_>>()
				}
			</select>
		}
		.into_any()
	} else if input_type == "textarea" {
		view! { <textarea rows="4" prop:value=value on:input=move |event| edit(event_target_value(&event)) /> }
			.into_any()
	} else {
		view! {
			<input
				type=input_type
				step=(input_type == "number").then_some("0.01")
				prop:value=value
				on:input=move |event| edit(event_target_value(&event))
			/>
		}
		.into_any()
	};

	view! {
		<label class="form_field" class:has_error=move || errors.with(|errors| errors.get(field).is_some())>
			<span>{label}{required.then_some(" *")}</span>
			{input}
			<FieldError errors field />
		</label>
	}
}

/// Options for a select listing every variant of a text enum
pub fn enum_options<T: ToString>(variants: &[T]) -> Vec<(String, String)> {
	variants
		.iter()
		.map(|variant| {
			let value = variant.to_string();
			let label = status_label(&value);
			(value, label)
		})
		.collect()
}
