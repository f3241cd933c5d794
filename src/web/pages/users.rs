// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::controls::{
	ClearFiltersButton, FilterInput, FilterSelect, Pager, SearchBox, SortHeader, StatCard, StatusBadge, enum_options,
};
use super::list_state::{ListState, Loaded};
use crate::format::{date_label, format_currency, format_phone_number, format_relative_time, initials};
use crate::model::{User, VerificationStatus};
use chrono::Utc;
use leptos::prelude::*;

#[component]
pub fn UsersPage() -> impl IntoView {
	let list = ListState::new(get_users);
	let query = list.query;
	let verified_count = move || {
		list.collection.with(|collection| {
			collection
				.records()
				.iter()
				.filter(|user| user.verification_status == VerificationStatus::Verified)
				.count()
		})
	};

	let activity_options = vec![
		(String::from("active"), String::from("Active")),
		(String::from("inactive"), String::from("Inactive")),
	];

	view! {
		<h1>"Users"</h1>
		<div class="stat_cards">
			<StatCard label="Total Users" value=Signal::derive(move || list.total().to_string()) />
			<StatCard label="Active" value=Signal::derive(move || list.status_count("active").to_string()) />
			<StatCard label="Verified" value=Signal::derive(move || verified_count().to_string()) />
			<StatCard label="Inactive" value=Signal::derive(move || list.status_count("inactive").to_string()) />
		</div>
		<div class="list_controls">
			<SearchBox query placeholder="Search by name, email, phone or ID" />
			<FilterSelect query filter="status" all_label="All Statuses" options=activity_options />
			<FilterSelect
				query
				filter="verification_status"
				all_label="All Verification"
				options=enum_options(VerificationStatus::ALL)
			/>
			<FilterInput query filter="country" input_type="text" placeholder="Country" />
			<ClearFiltersButton query />
		</div>
		<Loaded list>
			<table class="record_table">
				<thead>
					<tr>
						<SortHeader query field="name" label="User" />
						<th>"Phone"</th>
						<SortHeader query field="country" label="Country" />
						<th>"Verification"</th>
						<SortHeader query field="balance" label="Balance" />
						<SortHeader query field="total_sent" label="Total Sent" />
						<SortHeader query field="last_login" label="Last Login" />
						<SortHeader query field="created_at" label="Joined" />
					</tr>
				</thead>
				<tbody>
					{move || {
						let now = Utc::now();
						let users = list.page.with(|page| page.records.clone());
						if users.is_empty() {
							return vec![view! {
								<tr><td colspan="8" class="record_table_empty">"No users match these filters"</td></tr>
							}.into_any()];
						}
						users.into_iter().map(|user| user_row(user, now).into_any()).collect::<Vec<_>>()
					}}
				</tbody>
			</table>
			<Pager query info=Signal::derive(move || list.page.with(|page| page.info.clone())) />
		</Loaded>
	}
}

fn user_row(user: User, now: chrono::DateTime<Utc>) -> impl IntoView {
	let detail_url = format!("/users/{}", user.user_id);
	let last_login = user
		.last_login
		.map(|time| format_relative_time(&time, now))
		.unwrap_or_else(|| String::from("Never"));

	view! {
		<tr class:inactive=!user.is_active>
			<td>
				<a href=detail_url class="user_cell">
					<span class="avatar">{initials(&user.first_name, &user.last_name)}</span>
					<span class="user_cell_name">{user.full_name()}</span>
					<span class="user_cell_email">{user.email.clone()}</span>
				</a>
			</td>
			<td>{format_phone_number(&user.phone)}</td>
			<td>{user.country.clone()}</td>
			<td><StatusBadge status=user.verification_status.to_string() /></td>
			<td>{format_currency(user.balance, "MAD")}</td>
			<td>{format_currency(user.total_sent, "MAD")}</td>
			<td>{last_login}</td>
			<td>{date_label(&user.created_at)}</td>
		</tr>
	}
}

#[server]
async fn get_users(reload: bool) -> Result<Vec<User>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.users(reload).await.map_err(load_error)
}
