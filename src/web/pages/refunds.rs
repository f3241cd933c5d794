// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::changes::{open_overlay, start_change, start_create};
use super::controls::{
	ClearFiltersButton, DetailRow, FilterInput, FilterSelect, FormField, Modal, Pager, PriorityPill, SearchBox,
	SortHeader, StatCard, StatusBadge, enum_options,
};
use super::errors::error::ActionError;
use super::list_state::{ListState, Loaded};
use crate::format::{date_label, date_time_label, format_currency, format_date, truncate_text};
use crate::model::{Priority, Refund, RefundStatus};
use crate::mutation::{Collection, RefundDecision, UiState};
use crate::validation::{FieldErrors, ManualRefundForm};
use leptos::prelude::*;

const REFUND_METHODS: &[&str] = &["Bank Transfer", "Original Payment Method", "Wallet Credit"];

fn refund_method_options() -> Vec<(String, String)> {
	REFUND_METHODS
		.iter()
		.map(|method| (method.to_string(), method.to_string()))
		.collect()
}

#[component]
pub fn RefundsPage() -> impl IntoView {
	let list = ListState::new(get_refunds);
	let query = list.query;
	let collection = list.collection;
	let (action_error, set_action_error) = signal(None::<String>);
	let creating = RwSignal::new(false);

	let total_refunded = move || {
		let total: f64 = collection.with(|collection| {
			collection
				.records()
				.iter()
				.filter(|refund| matches!(refund.status, RefundStatus::Approved | RefundStatus::Completed))
				.map(|refund| refund.refund_amount)
				.sum()
		});
		format_currency(total, "MAD")
	};

	let open = move |ui: UiState| {
		creating.set(false);
		open_overlay(collection, ui, set_action_error);
	};
	let close = Callback::new(move |_| collection.update(|collection| collection.close()));
	let overlay = Memo::new(move |_| {
		collection.with(|collection| (collection.ui().clone(), collection.detail().cloned()))
	});

	view! {
		<div class="page_title">
			<h1>"Refunds"</h1>
			<div class="page_actions">
				<a href="/export/refunds.csv" rel="external" class="button">"Export CSV"</a>
				<button
					type="button"
					class="button_primary"
					on:click=move |_| {
						collection.update(|collection| collection.close());
						creating.set(true);
					}
				>
					"Manual Refund"
				</button>
			</div>
		</div>
		<div class="stat_cards">
			<StatCard label="Total Requests" value=Signal::derive(move || list.total().to_string()) />
			<StatCard label="Pending" value=Signal::derive(move || list.status_count("pending").to_string()) />
			<StatCard label="Approved" value=Signal::derive(move || list.status_count("approved").to_string()) />
			<StatCard label="Rejected" value=Signal::derive(move || list.status_count("rejected").to_string()) />
			<StatCard label="Total Refunded" value=Signal::derive(total_refunded) />
		</div>
		<ActionError message=action_error />
		<div class="list_controls">
			<SearchBox query placeholder="Search by refund ID, transaction ID, name or email" />
			<FilterSelect query filter="status" all_label="All Statuses" options=enum_options(RefundStatus::ALL) />
			<FilterSelect query filter="priority" all_label="All Priorities" options=enum_options(Priority::ALL) />
			<FilterSelect query filter="refund_method" all_label="All Methods" options=refund_method_options() />
			<FilterInput query filter="amount_min" input_type="number" placeholder="Min amount" />
			<FilterInput query filter="amount_max" input_type="number" placeholder="Max amount" />
			<FilterInput query filter="date_from" input_type="date" placeholder="From" />
			<FilterInput query filter="date_to" input_type="date" placeholder="To" />
			<ClearFiltersButton query />
		</div>
		<Loaded list>
			<table class="record_table">
				<thead>
					<tr>
						<th>"Refund"</th>
						<SortHeader query field="user_name" label="Customer" />
						<SortHeader query field="refund_amount" label="Amount" />
						<th>"Reason"</th>
						<SortHeader query field="priority" label="Priority" />
						<SortHeader query field="status" label="Status" />
						<SortHeader query field="created_at" label="Requested" />
						<th>"Actions"</th>
					</tr>
				</thead>
				<tbody>
					{move || {
						let refunds = list.page.with(|page| page.records.clone());
						if refunds.is_empty() {
							return vec![view! {
								<tr><td colspan="8" class="record_table_empty">"No refunds match these filters"</td></tr>
							}.into_any()];
						}
						refunds.into_iter().map(|refund| {
							let id = refund.refund_id.clone();
							let busy = {
								let id = id.clone();
								move || list.is_in_flight(&id)
							};
							view! {
								<tr>
									<td class="record_id">
										{refund.refund_id.clone()}
										<span class="record_subtext">{refund.transaction_id.clone()}</span>
									</td>
									<td>
										{refund.user_name.clone()}
										<span class="record_subtext">{refund.user_email.clone()}</span>
									</td>
									<td>
										{format_currency(refund.refund_amount, &refund.currency)}
										<span class="record_subtext">
											"of " {format_currency(refund.original_amount, &refund.currency)}
										</span>
									</td>
									<td title=refund.reason.clone()>{truncate_text(&refund.reason, 40)}</td>
									<td><PriorityPill priority=refund.priority.to_string() /></td>
									<td><StatusBadge status=refund.status.to_string() /></td>
									<td>{date_label(&refund.created_at)}</td>
									<td class="row_actions">
										<RowActions refund open busy=Signal::derive(busy) />
									</td>
								</tr>
							}.into_any()
						}).collect::<Vec<_>>()
					}}
				</tbody>
			</table>
			<Pager query info=Signal::derive(move || list.page.with(|page| page.info.clone())) />
		</Loaded>
		{move || {
			let (ui, refund) = overlay.get();
			let refund = refund?;
			let busy = {
				let id = refund.refund_id.clone();
				Signal::derive(move || list.is_in_flight(&id))
			};
			let dialog = match ui {
				UiState::Processing(_, decision) => view! {
					<ProcessDialog refund decision busy on_close=close set_error=set_action_error collection />
				}
				.into_any(),
				_ => view! { <RefundDetails refund busy open on_close=close /> }.into_any(),
			};
			Some(dialog)
		}}
		{move || {
			creating.get().then(|| view! { <ManualRefundDialog creating collection set_error=set_action_error /> })
		}}
	}
}

/// The buttons at the end of a refund's row
#[component]
fn RowActions(
	refund: Refund,
	open: impl Fn(UiState) + Copy + Send + Sync + 'static,
	busy: Signal<bool>,
) -> impl IntoView {
	let id = refund.refund_id.clone();
	let view_id = id.clone();
	let approve_id = id.clone();
	let can_process = refund.can_process();

	view! {
		<button type="button" on:click=move |_| open(UiState::ViewingDetails(view_id.clone()))>"View"</button>
		{can_process.then(|| view! {
			<button
				type="button"
				class="button_approve"
				disabled=move || busy.get()
				on:click=move |_| open(UiState::Processing(approve_id.clone(), RefundDecision::Approve))
			>
				"Approve"
			</button>
			<button
				type="button"
				class="button_reject"
				disabled=move || busy.get()
				on:click=move |_| open(UiState::Processing(id.clone(), RefundDecision::Reject))
			>
				"Reject"
			</button>
		})}
	}
}

#[component]
fn RefundDetails(
	refund: Refund,
	busy: Signal<bool>,
	open: impl Fn(UiState) + Copy + Send + Sync + 'static,
	on_close: Callback<()>,
) -> impl IntoView {
	let title = format!("Refund {}", refund.refund_id);
	let processed = refund.processed_at.map(|time| {
		let by = refund.processed_by.clone().unwrap_or_default();
		format!("{} by {}", date_time_label(&time), by)
	});
	let documents = refund.supporting_documents.join(", ");

	view! {
		<Modal title on_close>
			<div class="detail_status">
				<StatusBadge status=refund.status.to_string() />
				<PriorityPill priority=refund.priority.to_string() />
			</div>
			<dl class="detail_list">
				<DetailRow label="Transaction" value=refund.transaction_id.clone() />
				<DetailRow label="Customer" value=format!("{} ({})", refund.user_name, refund.user_email) />
				<DetailRow label="Original Amount" value=format_currency(refund.original_amount, &refund.currency) />
				<DetailRow label="Refund Amount" value=format_currency(refund.refund_amount, &refund.currency) />
				<DetailRow label="Reason" value=refund.reason.clone() />
				<DetailRow label="Method" value=refund.refund_method.clone() />
				<DetailRow label="Requested" value=date_time_label(&refund.created_at) />
				<DetailRow label="Estimated Completion" value=format_date(&refund.estimated_completion) />
				<DetailRow label="Contact Attempts" value=refund.contact_attempts.to_string() />
				{(!documents.is_empty()).then(|| view! { <DetailRow label="Documents" value=documents /> })}
				{processed.map(|processed| view! { <DetailRow label="Processed" value=processed /> })}
				{(!refund.admin_notes.is_empty())
					.then(|| view! { <DetailRow label="Admin Notes" value=refund.admin_notes.clone() /> })}
			</dl>
			{refund.can_process().then(|| {
				let approve_id = refund.refund_id.clone();
				let reject_id = refund.refund_id.clone();
				view! {
					<div class="modal_actions">
						<button
							type="button"
							class="button_approve"
							disabled=move || busy.get()
							on:click=move |_| open(UiState::Processing(approve_id.clone(), RefundDecision::Approve))
						>
							"Approve"
						</button>
						<button
							type="button"
							class="button_reject"
							disabled=move || busy.get()
							on:click=move |_| open(UiState::Processing(reject_id.clone(), RefundDecision::Reject))
						>
							"Reject"
						</button>
					</div>
				}
			})}
		</Modal>
	}
}

/// Confirms an approval or rejection, with notes for the record
#[component]
fn ProcessDialog(
	refund: Refund,
	decision: RefundDecision,
	busy: Signal<bool>,
	on_close: Callback<()>,
	set_error: WriteSignal<Option<String>>,
	collection: RwSignal<Collection<Refund>>,
) -> impl IntoView {
	let (notes, set_notes) = signal(String::new());
	let (title, confirm_label, busy_label) = match decision {
		RefundDecision::Approve => ("Approve Refund", "Approve", "Approving..."),
		RefundDecision::Reject => ("Reject Refund", "Reject", "Rejecting..."),
	};
	let summary = format!(
		"{} for {} ({})",
		format_currency(refund.refund_amount, &refund.currency),
		refund.user_name,
		refund.refund_id
	);
	let id = refund.refund_id.clone();

	let confirm = move |_| {
		let id = id.clone();
		let notes = notes.get_untracked();
		start_change(collection, id.clone(), set_error, move || process_refund(id, decision, notes));
	};

	view! {
		<Modal title=title on_close>
			<p>{summary}</p>
			<label class="form_field">
				<span>"Admin Notes"</span>
				<textarea rows="3" bind:value=(notes, set_notes) />
			</label>
			<div class="modal_actions">
				<button type="button" on:click=move |_| on_close.run(()) disabled=move || busy.get()>"Cancel"</button>
				<button type="button" class="button_primary" disabled=move || busy.get() on:click=confirm>
					{move || if busy.get() { busy_label } else { confirm_label }}
				</button>
			</div>
		</Modal>
	}
}

#[component]
fn ManualRefundDialog(
	creating: RwSignal<bool>,
	collection: RwSignal<Collection<Refund>>,
	set_error: WriteSignal<Option<String>>,
) -> impl IntoView {
	let form = RwSignal::new(ManualRefundForm::default());
	let errors = RwSignal::new(FieldErrors::new());
	let saving = RwSignal::new(false);

	let submit = move |event: leptos::ev::SubmitEvent| {
		event.prevent_default();
		let submitted = form.get_untracked();
		start_create(
			collection,
			submitted.validate(),
			errors,
			saving,
			set_error,
			move || create_refund(submitted),
			move || creating.set(false),
		);
	};

	view! {
		<Modal title="Create Manual Refund" on_close=Callback::new(move |_| creating.set(false))>
			<form class="record_form" on:submit=submit>
				<FormField form errors field="transaction_id" label="Transaction ID" required=true />
				<FormField form errors field="user_name" label="Customer Name" required=true />
				<FormField form errors field="user_email" label="Customer Email" input_type="email" required=true />
				<FormField form errors field="original_amount" label="Original Amount" input_type="number" required=true />
				<FormField form errors field="refund_amount" label="Refund Amount" input_type="number" required=true />
				<FormField form errors field="currency" label="Currency" />
				<FormField form errors field="priority" label="Priority" options=enum_options(Priority::ALL) />
				<FormField form errors field="refund_method" label="Refund Method" options=refund_method_options() />
				<FormField form errors field="estimated_completion" label="Estimated Completion" input_type="date" />
				<FormField form errors field="reason" label="Reason" input_type="textarea" required=true />
				<FormField form errors field="admin_notes" label="Admin Notes" input_type="textarea" />
				<div class="modal_actions">
					<button type="button" on:click=move |_| creating.set(false)>"Cancel"</button>
					<button type="submit" class="button_primary" disabled=move || saving.get()>
						{move || if saving.get() { "Creating..." } else { "Create Refund" }}
					</button>
				</div>
			</form>
		</Modal>
	}
}

#[server]
async fn get_refunds(reload: bool) -> Result<Vec<Refund>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.refunds(reload).await.map_err(load_error)
}

#[server]
async fn process_refund(refund_id: String, decision: RefundDecision, notes: String) -> Result<Refund, ServerFnError> {
	use super::server_utils::{acting_admin, mutation_error, signed_in};
	use crate::mutation::decide_refund;
	use chrono::Utc;

	let (state, requester) = signed_in().await?;
	let admin_name = acting_admin(&state, &requester).await;
	let refund = requester
		.desks
		.refunds
		.mutate(&refund_id, |refund| decide_refund(refund, decision, &notes, &admin_name, Utc::now()))
		.await
		.map_err(mutation_error)?;
	tracing::info!(refund = %refund.refund_id, %decision, admin = %admin_name, "Refund processed");
	Ok(refund)
}

#[server]
async fn create_refund(form: ManualRefundForm) -> Result<Result<Refund, FieldErrors>, ServerFnError> {
	use super::server_utils::{acting_admin, mutation_error, signed_in};
	use crate::mutation::create_manual_refund;
	use chrono::Utc;

	let (state, requester) = signed_in().await?;
	let admin_name = acting_admin(&state, &requester).await;
	let refund = match create_manual_refund(&form, &admin_name, Utc::now()) {
		Ok(refund) => refund,
		Err(errors) => return Ok(Err(errors)),
	};
	let refund = requester.desks.refunds.create(refund).await.map_err(mutation_error)?;
	Ok(Ok(refund))
}

#[cfg(all(test, feature = "ssr"))]
mod tests {
	use super::super::server_utils::testing::{api_state, enter_request, new_session};
	use super::super::utils::is_signed_out;
	use super::*;
	use crate::api::AUTH_TOKEN;
	use crate::source::{FixtureSource, RecordSource};

	#[tokio::test]
	async fn refunds_are_only_processed_for_signed_in_admins() {
		let state = api_state();
		let refunds = FixtureSource.refunds().await.unwrap();
		state.desks.refunds.reload(|| async { Ok(refunds.clone()) }).await.unwrap();
		let pending = refunds
			.iter()
			.find(|refund| refund.status == RefundStatus::Pending)
			.unwrap()
			.refund_id
			.clone();

		let _signed_out = enter_request(&state, new_session());
		let error = process_refund(pending.clone(), RefundDecision::Approve, String::new())
			.await
			.unwrap_err();
		assert!(is_signed_out(&error));
		assert!(is_signed_out(&get_refunds(false).await.unwrap_err()));
		let held = state.desks.refunds.get(&pending).await.unwrap();
		assert_eq!(held.status, RefundStatus::Pending);

		let session = new_session();
		session.insert(AUTH_TOKEN, "token").await.unwrap();
		let _signed_in = enter_request(&state, session);
		let refund = process_refund(pending.clone(), RefundDecision::Approve, String::new())
			.await
			.unwrap();
		assert_eq!(refund.status, RefundStatus::Approved);
	}
}
