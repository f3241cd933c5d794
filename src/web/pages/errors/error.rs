// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::web::pages::utils::{LOAD_FAILED, LOGIN_PATH, SIGNED_OUT, is_signed_out};
use leptos::prelude::*;
use leptos_router::components::Redirect;

/// Page-level banner for records that failed to load.
///
/// Sends the admin to sign in instead when the API stopped accepting their credentials.
#[component]
pub fn ErrorBanner(error: ServerFnError, on_retry: Callback<()>) -> impl IntoView {
	if is_signed_out(&error) {
		return view! { <Redirect path=LOGIN_PATH /> }.into_any();
	}

	let message = match error {
		ServerFnError::ServerError(message) => message,
		_ => String::from(LOAD_FAILED),
	};

	view! {
		<div class="error_banner" role="alert">
			<p>{message}</p>
			<button type="button" on:click=move |_| on_retry.run(())>
				"Try Again"
			</button>
		</div>
	}
	.into_any()
}

/// Inline message for a change that couldn't be made
#[component]
pub fn ActionError(message: ReadSignal<Option<String>>) -> impl IntoView {
	move || match message.get() {
		None => ().into_any(),
		Some(message) if message == SIGNED_OUT => view! { <Redirect path=LOGIN_PATH /> }.into_any(),
		Some(message) => view! { <div class="action_error" role="alert">{message}</div> }.into_any(),
	}
}
