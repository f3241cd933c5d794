// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::controls::{
	ClearFiltersButton, DetailRow, FilterInput, FilterSelect, Modal, Pager, SearchBox, SortHeader, StatCard,
	StatusBadge, enum_options,
};
use super::list_state::{ListState, Loaded};
use crate::format::{date_time_label, format_compact_number, format_currency, status_label};
use crate::model::{Transaction, TransactionStatus, TransactionType};
use leptos::prelude::*;

#[component]
pub fn TransactionsPage() -> impl IntoView {
	let list = ListState::new(get_transactions);
	let query = list.query;
	let collection = list.collection;

	let completed_volume = move || {
		let volume: f64 = collection.with(|collection| {
			collection
				.records()
				.iter()
				.filter(|transaction| transaction.status == TransactionStatus::Completed)
				.map(|transaction| transaction.amount)
				.sum()
		});
		format!("{} MAD", format_compact_number(volume))
	};
	let close_details = Callback::new(move |_| collection.update(|collection| collection.close()));

	view! {
		<div class="page_title">
			<h1>"Transactions"</h1>
			<a href="/export/transactions.csv" rel="external" class="button">"Export CSV"</a>
		</div>
		<div class="stat_cards">
			<StatCard label="Total" value=Signal::derive(move || list.total().to_string()) />
			<StatCard label="Completed" value=Signal::derive(move || list.status_count("completed").to_string()) />
			<StatCard label="Pending" value=Signal::derive(move || list.status_count("pending").to_string()) />
			<StatCard label="Failed" value=Signal::derive(move || list.status_count("failed").to_string()) />
			<StatCard label="Completed Volume" value=Signal::derive(completed_volume) />
		</div>
		<div class="list_controls">
			<SearchBox query placeholder="Search by ID, sender, receiver or reference" />
			<FilterSelect query filter="status" all_label="All Statuses" options=enum_options(TransactionStatus::ALL) />
			<FilterSelect
				query
				filter="transaction_type"
				all_label="All Types"
				options=enum_options(TransactionType::ALL)
			/>
			<FilterInput query filter="amount_min" input_type="number" placeholder="Min amount" />
			<FilterInput query filter="amount_max" input_type="number" placeholder="Max amount" />
			<FilterInput query filter="date_from" input_type="date" placeholder="From" />
			<FilterInput query filter="date_to" input_type="date" placeholder="To" />
			<FilterInput query filter="country" input_type="text" placeholder="Country" />
			<ClearFiltersButton query />
		</div>
		<Loaded list>
			<table class="record_table">
				<thead>
					<tr>
						<th>"Transaction"</th>
						<SortHeader query field="sender_name" label="Sender" />
						<SortHeader query field="receiver_name" label="Receiver" />
						<SortHeader query field="amount" label="Amount" />
						<th>"Type"</th>
						<SortHeader query field="status" label="Status" />
						<SortHeader query field="created_at" label="Date" />
						<th></th>
					</tr>
				</thead>
				<tbody>
					{move || {
						let transactions = list.page.with(|page| page.records.clone());
						if transactions.is_empty() {
							return vec![view! {
								<tr><td colspan="8" class="record_table_empty">"No transactions match these filters"</td></tr>
							}.into_any()];
						}
						transactions.into_iter().map(|transaction| {
							let id = transaction.transaction_id.clone();
							view! {
								<tr>
									<td class="record_id">
										{transaction.transaction_id.clone()}
										<span class="record_subtext">{transaction.reference_number.clone()}</span>
									</td>
									<td>{transaction.sender_name.clone()}</td>
									<td>{transaction.receiver_name.clone()}</td>
									<td>{format_currency(transaction.amount, &transaction.currency)}</td>
									<td>{status_label(transaction.transaction_type.as_str())}</td>
									<td><StatusBadge status=transaction.status.to_string() /></td>
									<td>{date_time_label(&transaction.created_at)}</td>
									<td>
										<button
											type="button"
											on:click=move |_| {
												if let Some(Err(error)) =
													collection.try_update(|collection| collection.open_details(&id))
												{
													tracing::warn!(source = ?error, "Couldn't open transaction details");
												}
											}
										>
											"View"
										</button>
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
			collection
				.with(|collection| collection.detail().cloned())
				.map(|transaction| view! { <TransactionDetails transaction on_close=close_details /> })
		}}
	}
}

#[component]
fn TransactionDetails(transaction: Transaction, on_close: Callback<()>) -> impl IntoView {
	let title = format!("Transaction {}", transaction.transaction_id);
	let route = format!("{} → {}", transaction.country_from, transaction.country_to);

	view! {
		<Modal title on_close>
			<div class="detail_status">
				<StatusBadge status=transaction.status.to_string() />
			</div>
			<dl class="detail_list">
				<DetailRow label="Reference" value=transaction.reference_number.clone() />
				<DetailRow label="Type" value=status_label(transaction.transaction_type.as_str()) />
				<DetailRow label="Amount" value=format_currency(transaction.amount, &transaction.currency) />
				<DetailRow label="Fee" value=format_currency(transaction.fee_amount, &transaction.currency) />
				<DetailRow label="Exchange Rate" value=format!("{:.4}", transaction.exchange_rate) />
				<DetailRow label="Sender" value=format!("{} ({})", transaction.sender_name, transaction.sender_email) />
				<DetailRow
					label="Receiver"
					value=format!("{} ({})", transaction.receiver_name, transaction.receiver_email)
				/>
				<DetailRow label="Route" value=route />
				<DetailRow label="Payment Method" value=status_label(&transaction.payment_method) />
				<DetailRow label="Description" value=transaction.description.clone() />
				<DetailRow label="Created" value=date_time_label(&transaction.created_at) />
				<DetailRow label="Updated" value=date_time_label(&transaction.updated_at) />
			</dl>
		</Modal>
	}
}

#[server]
async fn get_transactions(reload: bool) -> Result<Vec<Transaction>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.transactions(reload).await.map_err(load_error)
}
