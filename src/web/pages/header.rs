// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::{LOGIN_PATH, SessionInfo, sign_out};
use crate::format::name_initials;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

const NAV_LINKS: [(&str, &str); 5] = [
	("/", "Dashboard"),
	("/users", "Users"),
	("/transactions", "Transactions"),
	("/refunds", "Refunds"),
	("/support", "Support"),
];

#[component]
pub fn PageHeader(session: SessionInfo) -> impl IntoView {
	let navigate = use_navigate();
	let sign_out_click = move |_| {
		let navigate = navigate.clone();
		spawn_local(async move {
			if let Err(error) = sign_out().await {
				leptos::logging::warn!("Sign out failed: {}", error);
			}
			navigate(LOGIN_PATH, Default::default());
		});
	};

	view! {
		<header id="header">
			<a id="header_title" href="/">"Moroccoin Admin"</a>
			<nav id="header_nav">
				{
					NAV_LINKS.iter().map(|(href, label)| view! {
						<a href=*href>{*label}</a>
					}).collect::<Vec<_>>()
				}
			</nav>
			<div id="header_admin">
				{(!session.live_data).then(|| view! { <span class="badge badge_outline">"Sample data"</span> })}
				<span class="avatar">{name_initials(&session.admin_name)}</span>
				<span id="header_admin_name">{session.admin_name.clone()}</span>
				{session.live_data.then(|| view! {
					<button type="button" on:click=sign_out_click.clone()>"Sign Out"</button>
				})}
			</div>
		</header>
	}
}
