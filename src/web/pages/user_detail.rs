// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::controls::{DetailRow, FormField, StatusBadge, enum_options};
use super::errors::error::{ActionError, ErrorBanner};
use super::utils::error_message;
use crate::api::NotificationRecord;
use crate::format::{
	date_label, date_time_label, format_currency, format_phone_number, format_relative_time, initials, status_label,
};
use crate::model::{Activity, NotificationType, Transaction, User};
use crate::validation::{FieldErrors, NotificationForm};
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;
use serde::{Deserialize, Serialize};

/// How many of a user's transactions are listed on their page
const RECENT_TRANSACTIONS: usize = 10;

#[derive(Debug, Params, PartialEq)]
struct UserParam {
	id: Option<String>,
}

/// Everything shown on a user's page
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserDetails {
	pub user: User,
	/// Newest first
	pub transactions: Vec<Transaction>,
	pub activities: Vec<Activity>,
}

#[component]
pub fn UserDetailPage() -> impl IntoView {
	let params = use_params::<UserParam>();
	let user_id = move || {
		params
			.read()
			.as_ref()
			.ok()
			.and_then(|params| params.id.clone())
			.unwrap_or_default()
	};
	let details = Resource::new(user_id, get_user_details);

	view! {
		<a href="/users" class="back_link">"← Back to Users"</a>
		<Transition fallback=|| view! { <div class="loading">"Loading user..."</div> }>
			{move || details.get().map(|result| match result {
				Ok(Some(details)) => view! { <UserProfile details /> }.into_any(),
				Ok(None) => view! {
					<div class="not_found">
						<h1>"User not found"</h1>
						<p>"No user has this ID. They may have been removed."</p>
					</div>
				}.into_any(),
				Err(error) => view! { <ErrorBanner error on_retry=Callback::new(move |_| details.refetch()) /> }.into_any(),
			})}
		</Transition>
	}
}

#[component]
fn UserProfile(details: UserDetails) -> impl IntoView {
	let now = Utc::now();
	let UserDetails {
		user,
		transactions,
		activities,
	} = details;
	let last_login = user
		.last_login
		.map(|time| format_relative_time(&time, now))
		.unwrap_or_else(|| String::from("Never"));

	view! {
		<div class="user_header">
			<span class="avatar avatar_large">{initials(&user.first_name, &user.last_name)}</span>
			<div>
				<h1>{user.full_name()}</h1>
				<span class="record_subtext">{user.user_id.clone()}</span>
			</div>
			<StatusBadge status=user.verification_status.to_string() />
			<StatusBadge status=user.activity_status() />
		</div>
		<div class="user_layout">
			<section class="user_profile">
				<h2>"Profile"</h2>
				<dl class="detail_list">
					<DetailRow label="Email" value=user.email.clone() />
					<DetailRow label="Phone" value=format_phone_number(&user.phone) />
					<DetailRow label="Country" value=user.country.clone() />
					<DetailRow label="Balance" value=format_currency(user.balance, "MAD") />
					<DetailRow label="Total Sent" value=format_currency(user.total_sent, "MAD") />
					<DetailRow label="Transactions" value=user.total_transactions.to_string() />
					<DetailRow label="Joined" value=date_label(&user.created_at) />
					<DetailRow label="Last Login" value=last_login />
				</dl>
			</section>
			<section class="user_notify">
				<h2>"Send Notification"</h2>
				<NotificationPanel user_id=user.user_id.clone() />
			</section>
		</div>
		<section class="user_transactions">
			<h2>"Recent Transactions"</h2>
			{if transactions.is_empty() {
				view! { <p class="record_table_empty">"This user hasn't made any transactions"</p> }.into_any()
			} else {
				view! {
					<table class="record_table">
						<thead>
							<tr>
								<th>"Transaction"</th>
								<th>"Counterparty"</th>
								<th>"Amount"</th>
								<th>"Status"</th>
								<th>"Date"</th>
							</tr>
						</thead>
						<tbody>
							{transactions.into_iter().take(RECENT_TRANSACTIONS).map(|transaction| {
								let counterparty = if transaction.sender_name == user.full_name() {
									format!("To {}", transaction.receiver_name)
								} else {
									format!("From {}", transaction.sender_name)
								};
								view! {
									<tr>
										<td class="record_id">{transaction.transaction_id.clone()}</td>
										<td>{counterparty}</td>
										<td>{format_currency(transaction.amount, &transaction.currency)}</td>
										<td><StatusBadge status=transaction.status.to_string() /></td>
										<td>{date_time_label(&transaction.created_at)}</td>
									</tr>
								}
							}).collect::<Vec<_>>()}
						</tbody>
					</table>
				}.into_any()
			}}
		</section>
		<section class="user_activity">
			<h2>"Activity"</h2>
			{if activities.is_empty() {
				view! { <p class="record_table_empty">"No recorded activity"</p> }.into_any()
			} else {
				view! {
					<ol class="activity_list">
						{activities.into_iter().map(|activity| activity_item(activity, now)).collect::<Vec<_>>()}
					</ol>
				}.into_any()
			}}
		</section>
	}
}

fn activity_item(activity: Activity, now: DateTime<Utc>) -> impl IntoView {
	view! {
		<li>
			<span class="activity_type">{status_label(&activity.activity_type)}</span>
			<span class="activity_description">{activity.description.clone()}</span>
			<span class="activity_time" title=date_time_label(&activity.created_at)>
				{format_relative_time(&activity.created_at, now)}
			</span>
			{activity.ip_address.clone().map(|address| view! { <span class="record_subtext">{address}</span> })}
		</li>
	}
}

/// Form for messaging a user, with the notifications sent from this page listed under it
#[component]
fn NotificationPanel(user_id: String) -> impl IntoView {
	let form = RwSignal::new(NotificationForm::default());
	let errors = RwSignal::new(FieldErrors::new());
	let sending = RwSignal::new(false);
	let (send_error, set_send_error) = signal(None::<String>);
	let sent = RwSignal::new(Vec::<NotificationRecord>::new());

	let submit = move |event: leptos::ev::SubmitEvent| {
		event.prevent_default();
		if sending.get_untracked() {
			return;
		}
		let submitted = form.get_untracked();
		if let Err(found) = submitted.validate() {
			errors.set(found);
			return;
		}

		sending.set(true);
		set_send_error.set(None);
		let user_id = user_id.clone();
		spawn_local(async move {
			match send_user_notification(user_id, submitted).await {
				Ok(Ok(record)) => {
					sent.update(|sent| sent.insert(0, record));
					form.set(NotificationForm::default());
				}
				Ok(Err(found)) => errors.set(found),
				Err(error) => set_send_error.set(Some(error_message(&error))),
			}
			sending.set(false);
		});
	};

	view! {
		<form class="record_form" on:submit=submit>
			<FormField form errors field="notification_type" label="Type" options=enum_options(NotificationType::ALL) />
			<FormField form errors field="title" label="Title" required=true />
			<FormField form errors field="message" label="Message" input_type="textarea" required=true />
			<ActionError message=send_error />
			<button type="submit" class="button_primary" disabled=move || sending.get()>
				{move || if sending.get() { "Sending..." } else { "Send Notification" }}
			</button>
		</form>
		<ul class="sent_notifications">
			{move || sent.get().into_iter().map(|record| view! {
				<li>
					<StatusBadge status=record.status.clone() />
					<span class="sent_notification_title">{record.title.clone()}</span>
					<span class="record_subtext">
						{status_label(&record.notification_type)}
						{record.sent_at.map(|time| format!(" · {}", date_time_label(&time)))}
					</span>
				</li>
			}).collect::<Vec<_>>()}
		</ul>
	}
}

#[server]
async fn get_user_details(user_id: String) -> Result<Option<UserDetails>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	let user = match requester.desks.users.get(&user_id).await {
		Some(user) => user,
		None => match requester.source.user(&user_id).await.map_err(load_error)? {
			Some(user) => user,
			None => return Ok(None),
		},
	};

	let mut transactions = requester.source.user_transactions(&user_id).await.map_err(load_error)?;
	transactions.sort_by(|left, right| right.created_at.cmp(&left.created_at));
	let mut activities = requester.source.user_activities(&user_id).await.map_err(load_error)?;
	activities.sort_by(|left, right| right.created_at.cmp(&left.created_at));

	Ok(Some(UserDetails {
		user,
		transactions,
		activities,
	}))
}

#[server]
async fn send_user_notification(
	user_id: String,
	form: NotificationForm,
) -> Result<Result<NotificationRecord, FieldErrors>, ServerFnError> {
	use super::server_utils::{save_error, signed_in};
	use crate::api::NotificationRequest;

	let (_, requester) = signed_in().await?;
	if let Err(errors) = form.validate() {
		return Ok(Err(errors));
	}
	let request = NotificationRequest {
		user_id,
		title: form.title.trim().to_string(),
		message: form.message.trim().to_string(),
		notification_type: form.notification_type,
	};
	let record = requester.source.send_notification(&request).await.map_err(save_error)?;
	tracing::info!(user_id = %record.user_id, notification = %record.notification_id, "Notification sent");
	Ok(Ok(record))
}
