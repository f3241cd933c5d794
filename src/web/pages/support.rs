// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::changes::{open_overlay, start_change, start_create};
use super::controls::{
	ClearFiltersButton, DetailRow, FilterInput, FilterSelect, FormField, Modal, Pager, PriorityPill, SearchBox,
	SlaBadge, SortHeader, StatCard, StatusBadge, enum_options,
};
use super::errors::error::ActionError;
use super::list_state::{ListState, Loaded};
use super::utils::error_message;
use crate::format::{SlaStatus, date_time_label, format_relative_time, name_initials, status_label, truncate_text};
use crate::model::{Agent, Priority, SupportTicket, TicketCategory, TicketMessage, TicketStatus};
use crate::mutation::{Collection, ReplyDraft, UiState};
use crate::validation::{FieldErrors, NewTicketForm};
use chrono::Utc;
use leptos::prelude::*;
use reactive_stores::Store;

#[component]
pub fn SupportPage() -> impl IntoView {
	let list = ListState::new(get_tickets);
	let query = list.query;
	let collection = list.collection;
	let (action_error, set_action_error) = signal(None::<String>);
	let creating = RwSignal::new(false);
	let agents = Resource::new(|| (), |_| get_agents());

	let count_where = move |check: fn(&SupportTicket) -> bool| {
		collection.with(|collection| collection.records().iter().filter(|ticket| check(ticket)).count())
	};
	let overdue = move || {
		let now = Utc::now();
		collection.with(|collection| {
			collection
				.records()
				.iter()
				.filter(|ticket| SlaStatus::new(&ticket.sla_due_date, ticket.status, now) == SlaStatus::Overdue)
				.count()
		})
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
			<h1>"Support"</h1>
			<div class="page_actions">
				<a href="/export/support_tickets.csv" rel="external" class="button">"Export CSV"</a>
				<button
					type="button"
					class="button_primary"
					on:click=move |_| {
						collection.update(|collection| collection.close());
						creating.set(true);
					}
				>
					"New Ticket"
				</button>
			</div>
		</div>
		<div class="stat_cards">
			<StatCard label="Total Tickets" value=Signal::derive(move || list.total().to_string()) />
			<StatCard label="Open" value=Signal::derive(move || list.status_count("open").to_string()) />
			<StatCard label="In Progress" value=Signal::derive(move || list.status_count("in_progress").to_string()) />
			<StatCard
				label="Escalated"
				value=Signal::derive(move || count_where(|ticket| ticket.escalated).to_string())
			/>
			<StatCard label="Overdue" value=Signal::derive(move || overdue().to_string()) />
		</div>
		<ActionError message=action_error />
		<div class="list_controls">
			<SearchBox query placeholder="Search by ticket ID, customer, subject or description" />
			<FilterSelect query filter="status" all_label="All Statuses" options=enum_options(TicketStatus::ALL) />
			<FilterSelect query filter="priority" all_label="All Priorities" options=enum_options(Priority::ALL) />
			<FilterSelect query filter="category" all_label="All Categories" options=enum_options(TicketCategory::ALL) />
			<Transition>
				{move || {
					let options = agents
						.read()
						.as_ref()
						.and_then(|agents| agents.as_ref().ok())
						.map(|agents| agent_options(agents.as_slice()))
						.unwrap_or_default();
					view! { <FilterSelect query filter="assigned_to" all_label="All Agents" options /> }
				}}
			</Transition>
			<FilterSelect
				query
				filter="escalated"
				all_label="Any Escalation"
				options=vec![
					(String::from("true"), String::from("Escalated")),
					(String::from("false"), String::from("Not Escalated")),
				]
			/>
			<FilterInput query filter="date_from" input_type="date" placeholder="From" />
			<FilterInput query filter="date_to" input_type="date" placeholder="To" />
			<ClearFiltersButton query />
		</div>
		<Loaded list>
			<table class="record_table">
				<thead>
					<tr>
						<SortHeader query field="subject" label="Ticket" />
						<SortHeader query field="user_name" label="Customer" />
						<th>"Category"</th>
						<SortHeader query field="priority" label="Priority" />
						<SortHeader query field="status" label="Status" />
						<SortHeader query field="sla_due_date" label="SLA" />
						<th>"Agent"</th>
						<SortHeader query field="created_at" label="Created" />
						<th>"Actions"</th>
					</tr>
				</thead>
				<tbody>
					{move || {
						let now = Utc::now();
						let tickets = list.page.with(|page| page.records.clone());
						if tickets.is_empty() {
							return vec![view! {
								<tr><td colspan="9" class="record_table_empty">"No tickets match these filters"</td></tr>
							}.into_any()];
						}
						tickets.into_iter().map(|ticket| {
							let view_id = ticket.ticket_id.clone();
							let assign_id = ticket.ticket_id.clone();
							let busy = {
								let id = ticket.ticket_id.clone();
								move || list.is_in_flight(&id)
							};
							let sla = SlaStatus::new(&ticket.sla_due_date, ticket.status, now);
							view! {
								<tr class:escalated=ticket.escalated>
									<td>
										<span class="record_id">{ticket.ticket_id.clone()}</span>
										<span class="record_subtext">{truncate_text(&ticket.subject, 50)}</span>
									</td>
									<td>
										{ticket.user_name.clone()}
										<span class="record_subtext">{ticket.user_email.clone()}</span>
									</td>
									<td>{status_label(ticket.category.as_str())}</td>
									<td><PriorityPill priority=ticket.priority.to_string() /></td>
									<td><StatusBadge status=ticket.status.to_string() /></td>
									<td><SlaBadge sla /></td>
									<td>{ticket.assigned_agent_name.clone().unwrap_or_else(|| String::from("Unassigned"))}</td>
									<td>{format_relative_time(&ticket.created_at, now)}</td>
									<td class="row_actions">
										<button type="button" on:click=move |_| open(UiState::ViewingDetails(view_id.clone()))>
											"View"
										</button>
										<button
											type="button"
											disabled=move || busy()
											on:click=move |_| open(UiState::Assigning(assign_id.clone()))
										>
											"Assign"
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
			let (ui, ticket) = overlay.get();
			let ticket = ticket?;
			let busy = {
				let id = ticket.ticket_id.clone();
				Signal::derive(move || list.is_in_flight(&id))
			};
			let dialog = match ui {
				UiState::Assigning(_) => view! {
					<AssignDialog ticket agents busy collection set_error=set_action_error on_close=close />
				}
				.into_any(),
				_ => view! {
					<TicketDetails ticket busy open collection set_error=set_action_error on_close=close />
				}
				.into_any(),
			};
			Some(dialog)
		}}
		{move || creating.get().then(|| view! { <NewTicketDialog creating collection set_error=set_action_error /> })}
	}
}

fn agent_options(agents: &[Agent]) -> Vec<(String, String)> {
	agents.iter().map(|agent| (agent.id.clone(), agent.name.clone())).collect()
}

#[component]
fn TicketDetails(
	ticket: SupportTicket,
	busy: Signal<bool>,
	open: impl Fn(UiState) + Copy + Send + Sync + 'static,
	collection: RwSignal<Collection<SupportTicket>>,
	set_error: WriteSignal<Option<String>>,
	on_close: Callback<()>,
) -> impl IntoView {
	let now = Utc::now();
	let title = format!("{}: {}", ticket.ticket_id, ticket.subject);
	let id = ticket.ticket_id.clone();
	let (escalation_reason, set_escalation_reason) = signal(String::new());

	let change_status = {
		let id = id.clone();
		move |event| {
			let Ok(status) = event_target_value(&event).parse::<TicketStatus>() else {
				return;
			};
			let id = id.clone();
			start_change(collection, id.clone(), set_error, move || set_ticket_status(id, status));
		}
	};
	let escalate = {
		let id = id.clone();
		move |_| {
			let id = id.clone();
			let reason = escalation_reason.get_untracked();
			start_change(collection, id.clone(), set_error, move || raise_escalation(id, reason));
		}
	};
	let assign_id = id.clone();

	view! {
		<Modal title on_close>
			<div class="detail_status">
				<StatusBadge status=ticket.status.to_string() />
				<PriorityPill priority=ticket.priority.to_string() />
				<SlaBadge sla=SlaStatus::new(&ticket.sla_due_date, ticket.status, now) />
				{ticket.escalated.then(|| view! { <span class="badge badge_destructive">"Escalated"</span> })}
			</div>
			<div class="ticket_layout">
				<div class="ticket_main">
					<p class="ticket_description">{ticket.description.clone()}</p>
					<TicketThread ticket_id=id.clone() busy collection set_error />
				</div>
				<aside class="ticket_side">
					<dl class="detail_list">
						<DetailRow label="Customer" value=ticket.user_name.clone() />
						<DetailRow label="Email" value=ticket.user_email.clone() />
						{(!ticket.user_phone.is_empty())
							.then(|| view! { <DetailRow label="Phone" value=ticket.user_phone.clone() /> })}
						<DetailRow label="Category" value=status_label(ticket.category.as_str()) />
						<DetailRow
							label="Assigned To"
							value=ticket.assigned_agent_name.clone().unwrap_or_else(|| String::from("Unassigned"))
						/>
						<DetailRow label="Created" value=date_time_label(&ticket.created_at) />
						<DetailRow label="SLA Due" value=date_time_label(&ticket.sla_due_date) />
						{ticket.first_response_at.map(|time| view! {
							<DetailRow label="First Response" value=date_time_label(&time) />
						})}
						{ticket.resolved_at.map(|time| view! { <DetailRow label="Resolved" value=date_time_label(&time) /> })}
						{ticket.related_transaction_id.clone().map(|transaction| view! {
							<DetailRow label="Transaction" value=transaction />
						})}
						{ticket.satisfaction_rating.map(|rating| view! {
							<DetailRow label="Satisfaction" value=format!("{}/5", rating) />
						})}
						{ticket.escalation_reason.clone().map(|reason| view! {
							<DetailRow label="Escalation Reason" value=reason />
						})}
					</dl>
					{(!ticket.tags.is_empty()).then(|| view! {
						<ul class="tag_list">
							{ticket.tags.iter().map(|tag| view! { <li>{tag.clone()}</li> }).collect::<Vec<_>>()}
						</ul>
					})}
					<label class="form_field">
						<span>"Status"</span>
						<select prop:value=ticket.status.to_string() disabled=move || busy.get() on:change=change_status>
							{TicketStatus::ALL.iter().map(|status| view! {
								<option value=status.to_string()>{status_label(status.as_str())}</option>
							}).collect::<Vec<_>>()}
						</select>
					</label>
					<button
						type="button"
						disabled=move || busy.get()
						on:click=move |_| open(UiState::Assigning(assign_id.clone()))
					>
						{if ticket.assigned_to.is_some() { "Reassign" } else { "Assign" }}
					</button>
					{(!ticket.escalated).then(|| view! {
						<div class="escalate_form">
							<input
								type="text"
								placeholder="Escalation reason"
								bind:value=(escalation_reason, set_escalation_reason)
							/>
							<button type="button" class="button_reject" disabled=move || busy.get() on:click=escalate>
								"Escalate"
							</button>
						</div>
					})}
				</aside>
			</div>
		</Modal>
	}
}

/// A ticket's conversation with the reply box under it
#[component]
fn TicketThread(
	ticket_id: String,
	busy: Signal<bool>,
	collection: RwSignal<Collection<SupportTicket>>,
	set_error: WriteSignal<Option<String>>,
) -> impl IntoView {
	let thread_version = RwSignal::new(0_u32);
	let messages = Resource::new(move || thread_version.get(), {
		let ticket_id = ticket_id.clone();
		move |_| get_ticket_messages(ticket_id.clone())
	});
	let conversation = Store::new(Conversation::default());
	let (reply, set_reply) = signal(String::new());
	let (internal, set_internal) = signal(false);
	let (reply_error, set_reply_error) = signal(None::<String>);

	Effect::new_isomorphic(move |_| {
		if let Some(Ok(loaded)) = messages.read().as_ref() {
			conversation.messages().set(loaded.clone());
		}
	});

	let send = move |_| {
		let draft = ReplyDraft {
			body: reply.get_untracked(),
			internal: internal.get_untracked(),
		};
		if draft.body.trim().is_empty() {
			set_reply_error.set(Some(String::from("Type a reply before sending")));
			return;
		}
		set_reply_error.set(None);
		let id = ticket_id.clone();
		start_change(collection, id.clone(), set_error, move || async move {
			let ticket = send_ticket_reply(id, draft).await?;
			set_reply.set(String::new());
			thread_version.update(|version| *version += 1);
			Ok(ticket)
		});
	};

	view! {
		<div class="ticket_thread">
			<h3>"Conversation"</h3>
			<Transition fallback=|| view! { <div class="loading">"Loading messages..."</div> }>
				{move || messages.read().as_ref().map(|result| match result {
					Ok(loaded) if loaded.is_empty() => {
						view! { <p class="ticket_thread_empty">"No messages yet"</p> }.into_any()
					}
					Ok(_) => view! {
						<ol class="ticket_messages">
							<For
								each=move || conversation.messages()
								key=|message| message.read().message_id.clone()
								children=|message| thread_message(message.read().clone(), Utc::now())
							/>
						</ol>
					}.into_any(),
					Err(error) => view! { <p class="action_error">{error_message(error)}</p> }.into_any(),
				})}
			</Transition>
			<div class="reply_form">
				<textarea rows="3" placeholder="Write a reply" bind:value=(reply, set_reply) />
				{move || reply_error.get().map(|message| view! { <p class="field_error">{message}</p> })}
				<label class="checkbox">
					<input type="checkbox" bind:checked=(internal, set_internal) />
					<span>"Internal note (only visible to agents)"</span>
				</label>
				<button type="button" class="button_primary" disabled=move || busy.get() on:click=send>
					{move || if busy.get() { "Sending..." } else { "Send Reply" }}
				</button>
			</div>
		</div>
	}
}

/// The messages of the open ticket, keyed so a reload only adds the new ones
#[derive(Clone, Debug, Default, Store)]
struct Conversation {
	#[store(key: String = |message| message.message_id.clone())]
	messages: Vec<TicketMessage>,
}

fn thread_message(message: TicketMessage, now: chrono::DateTime<Utc>) -> impl IntoView {
	let class = format!("ticket_message sender_{}", message.sender_type);
	view! {
		<li class=class class:internal=message.is_internal>
			<div class="ticket_message_header">
				<span class="avatar">{name_initials(&message.sender_name)}</span>
				<span class="ticket_message_sender">{message.sender_name.clone()}</span>
				{message.is_internal.then(|| view! { <span class="badge badge_secondary">"Internal"</span> })}
				<span class="ticket_message_time" title=date_time_label(&message.created_at)>
					{format_relative_time(&message.created_at, now)}
				</span>
			</div>
			<p>{message.message.clone()}</p>
		</li>
	}
}

#[component]
fn AssignDialog(
	ticket: SupportTicket,
	agents: Resource<Result<Vec<Agent>, ServerFnError>>,
	busy: Signal<bool>,
	collection: RwSignal<Collection<SupportTicket>>,
	set_error: WriteSignal<Option<String>>,
	on_close: Callback<()>,
) -> impl IntoView {
	let (agent_id, set_agent_id) = signal(ticket.assigned_to.clone().unwrap_or_default());
	let title = format!("Assign {}", ticket.ticket_id);
	let id = ticket.ticket_id.clone();

	let confirm = move |_| {
		let agent_id = agent_id.get_untracked();
		if agent_id.is_empty() {
			set_error.set(Some(String::from("Choose an agent to assign")));
			return;
		}
		let id = id.clone();
		start_change(collection, id.clone(), set_error, move || assign_ticket_to_agent(id, agent_id));
	};

	view! {
		<Modal title on_close>
			<p>{ticket.subject.clone()}</p>
			<Transition fallback=|| view! { <div class="loading">"Loading agents..."</div> }>
				{move || agents.get().map(|result| match result {
					Ok(agents) => view! {
						<label class="form_field">
							<span>"Agent"</span>
							<select prop:value=move || agent_id.get() on:change=move |event| set_agent_id.set(event_target_value(&event))>
								<option value="">"Choose an agent"</option>
								{agents.into_iter().map(|agent| view! {
									<option value=agent.id.clone()>{format!("{} ({})", agent.name, agent.email)}</option>
								}).collect::<Vec<_>>()}
							</select>
						</label>
					}.into_any(),
					Err(error) => view! { <p class="action_error">{error_message(&error)}</p> }.into_any(),
				})}
			</Transition>
			<div class="modal_actions">
				<button type="button" on:click=move |_| on_close.run(())>"Cancel"</button>
				<button type="button" class="button_primary" disabled=move || busy.get() on:click=confirm>
					{move || if busy.get() { "Assigning..." } else { "Assign" }}
				</button>
			</div>
		</Modal>
	}
}

#[component]
fn NewTicketDialog(
	creating: RwSignal<bool>,
	collection: RwSignal<Collection<SupportTicket>>,
	set_error: WriteSignal<Option<String>>,
) -> impl IntoView {
	let form = RwSignal::new(NewTicketForm::default());
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
			move || create_support_ticket(submitted),
			move || creating.set(false),
		);
	};

	view! {
		<Modal title="New Support Ticket" on_close=Callback::new(move |_| creating.set(false))>
			<form class="record_form" on:submit=submit>
				<FormField form errors field="user_name" label="Customer Name" required=true />
				<FormField form errors field="user_email" label="Customer Email" input_type="email" required=true />
				<FormField form errors field="user_phone" label="Customer Phone" input_type="tel" />
				<FormField form errors field="subject" label="Subject" required=true />
				<FormField form errors field="category" label="Category" options=enum_options(TicketCategory::ALL) />
				<FormField form errors field="priority" label="Priority" options=enum_options(Priority::ALL) />
				<FormField form errors field="related_transaction_id" label="Related Transaction" />
				<FormField form errors field="tags" label="Tags (comma separated)" />
				<FormField form errors field="description" label="Description" input_type="textarea" required=true />
				<div class="modal_actions">
					<button type="button" on:click=move |_| creating.set(false)>"Cancel"</button>
					<button type="submit" class="button_primary" disabled=move || saving.get()>
						{move || if saving.get() { "Creating..." } else { "Create Ticket" }}
					</button>
				</div>
			</form>
		</Modal>
	}
}

#[server]
async fn get_tickets(reload: bool) -> Result<Vec<SupportTicket>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.tickets(reload).await.map_err(load_error)
}

#[server]
async fn get_ticket_messages(ticket_id: String) -> Result<Vec<TicketMessage>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.ticket_messages(&ticket_id).await.map_err(load_error)
}

#[server]
async fn get_agents() -> Result<Vec<Agent>, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.agents().await.map_err(load_error)
}

#[server]
async fn assign_ticket_to_agent(ticket_id: String, agent_id: String) -> Result<SupportTicket, ServerFnError> {
	use super::server_utils::{load_error, mutation_error, signed_in};
	use crate::mutation::assign_ticket;

	let (_, requester) = signed_in().await?;
	let agents = requester.agents().await.map_err(load_error)?;
	requester
		.desks
		.tickets
		.mutate(&ticket_id, |ticket| assign_ticket(ticket, &agents, &agent_id, Utc::now()))
		.await
		.map_err(mutation_error)
}

#[server]
async fn set_ticket_status(ticket_id: String, status: TicketStatus) -> Result<SupportTicket, ServerFnError> {
	use super::server_utils::{mutation_error, signed_in};
	use crate::mutation::change_ticket_status;

	let (_, requester) = signed_in().await?;
	requester
		.desks
		.tickets
		.mutate(&ticket_id, |ticket| Ok(change_ticket_status(ticket, status, Utc::now())))
		.await
		.map_err(mutation_error)
}

#[server]
async fn raise_escalation(ticket_id: String, reason: String) -> Result<SupportTicket, ServerFnError> {
	use super::server_utils::{mutation_error, signed_in};
	use crate::mutation::escalate_ticket;

	let (_, requester) = signed_in().await?;
	requester
		.desks
		.tickets
		.mutate(&ticket_id, |ticket| Ok(escalate_ticket(ticket, &reason, Utc::now())))
		.await
		.map_err(mutation_error)
}

/// Adds a reply to a ticket's conversation, returning the ticket as it stands afterwards
#[server]
async fn send_ticket_reply(ticket_id: String, draft: ReplyDraft) -> Result<SupportTicket, ServerFnError> {
	use super::server_utils::{acting_agent, load_error, mutation_error, signed_in};
	use crate::mutation::reply_to_ticket;

	let (state, requester) = signed_in().await?;
	let sender = acting_agent(&state, &requester).await;
	// The conversation has to be loaded before the reply is added to the end of it
	requester.ticket_messages(&ticket_id).await.map_err(load_error)?;

	let mut sent = None;
	let ticket = requester
		.desks
		.tickets
		.mutate(&ticket_id, |ticket| {
			let (ticket, message) = reply_to_ticket(ticket, &draft, &sender, Utc::now())?;
			sent = Some(message);
			Ok(ticket)
		})
		.await
		.map_err(mutation_error)?;
	if let Some(message) = sent {
		requester.desks.threads.append(message).await;
	}
	Ok(ticket)
}

#[server]
async fn create_support_ticket(form: NewTicketForm) -> Result<Result<SupportTicket, FieldErrors>, ServerFnError> {
	use super::server_utils::{mutation_error, signed_in};
	use crate::mutation::create_ticket;

	let (_, requester) = signed_in().await?;
	let ticket = match create_ticket(&form, Utc::now()) {
		Ok(ticket) => ticket,
		Err(errors) => return Ok(Err(errors)),
	};
	let ticket = requester.desks.tickets.create(ticket).await.map_err(mutation_error)?;
	Ok(Ok(ticket))
}
