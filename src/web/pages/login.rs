// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::{error_message, sign_in};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[component]
pub fn LoginPage() -> impl IntoView {
	let (username, set_username) = signal(String::new());
	let (password, set_password) = signal(String::new());
	let (error, set_error) = signal(None::<String>);
	let (submitting, set_submitting) = signal(false);
	let navigate = use_navigate();

	let form_submit = move |event: SubmitEvent| {
		event.prevent_default();
		if submitting.get_untracked() {
			return;
		}
		if username.with_untracked(|username| username.trim().is_empty()) || password.with_untracked(String::is_empty) {
			set_error.set(Some(String::from("Enter your username and password")));
			return;
		}

		set_error.set(None);
		set_submitting.set(true);
		let navigate = navigate.clone();
		spawn_local(async move {
			match sign_in(username.get_untracked(), password.get_untracked()).await {
				Ok(()) => navigate("/", Default::default()),
				Err(error) => set_error.set(Some(error_message(&error))),
			}
			set_submitting.set(false);
		});
	};

	view! {
		<main id="login_page">
			<h1>"Moroccoin Admin"</h1>
			<form on:submit=form_submit>
				<label>
					<span>"Username"</span>
					<input type="text" autocomplete="username" bind:value=(username, set_username) />
				</label>
				<label>
					<span>"Password"</span>
					<input type="password" autocomplete="current-password" bind:value=(password, set_password) />
				</label>
				{move || error.get().map(|message| view! { <p class="field_error">{message}</p> })}
				<button type="submit" disabled=move || submitting.get()>
					{move || if submitting.get() { "Signing in..." } else { "Sign In" }}
				</button>
			</form>
		</main>
	}
}
