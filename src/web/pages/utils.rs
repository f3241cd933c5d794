// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error message used by server functions when the API no longer accepts the stored credentials
pub const SIGNED_OUT: &str = "signed_out";

/// Shown in place of a page's content when its records couldn't be loaded
pub const LOAD_FAILED: &str = "Something went wrong while loading data. Please try again.";

/// Shown when a change couldn't be saved
pub const SAVE_FAILED: &str = "Something went wrong while saving your changes. Please try again.";

pub const LOGIN_PATH: &str = "/login";

/// Whether a server function failed because the admin has to sign in again
pub fn is_signed_out(error: &ServerFnError) -> bool {
	matches!(error, ServerFnError::ServerError(message) if message == SIGNED_OUT)
}

/// The message from a server function error, without the framework's prefix
pub fn error_message(error: &ServerFnError) -> String {
	match error {
		ServerFnError::ServerError(message) => message.clone(),
		_ => String::from(SAVE_FAILED),
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionInfo {
	pub signed_in: bool,
	pub admin_name: String,
	/// Whether records come from the platform API rather than the sample data
	pub live_data: bool,
	pub search_debounce_ms: u64,
}

impl SessionInfo {
	pub fn search_debounce(&self) -> Duration {
		Duration::from_millis(self.search_debounce_ms)
	}
}

/// The debounce window for search boxes, from the session if one is loaded
pub fn search_debounce() -> Duration {
	use_context::<SessionInfo>()
		.map(|session| session.search_debounce())
		.unwrap_or(Duration::from_millis(500))
}

#[server]
pub async fn get_session() -> Result<SessionInfo, ServerFnError> {
	use super::server_utils::{acting_admin, load_error, requester};
	use crate::api::ApiError;

	let (state, requester) = requester().await?;
	let signed_in = match requester.check_signed_in().await {
		Ok(()) => true,
		Err(ApiError::Unauthorized) => false,
		Err(error) => return Err(load_error(error)),
	};

	Ok(SessionInfo {
		signed_in,
		admin_name: acting_admin(&state, &requester).await,
		live_data: state.live_data(),
		search_debounce_ms: u64::try_from(state.config.list.search_debounce.as_millis()).unwrap_or(500),
	})
}

#[server]
pub async fn sign_in(username: String, password: String) -> Result<(), ServerFnError> {
	use super::server_utils::requester;
	use crate::api::ApiError;

	let (_, requester) = requester().await?;
	let Some(client) = &requester.client else {
		return Ok(());
	};

	match client.login(username.trim(), &password).await {
		Ok(_) => Ok(()),
		Err(ApiError::Unauthorized | ApiError::Status { status: 400, .. }) => {
			Err(ServerFnError::new("Invalid username or password"))
		}
		Err(error) => {
			tracing::error!(source = ?error, "Failed to sign in");
			Err(ServerFnError::new("Couldn't reach the server. Please try again."))
		}
	}
}

#[server]
pub async fn sign_out() -> Result<(), ServerFnError> {
	use super::server_utils::requester;

	let (_, requester) = requester().await?;
	if let Some(client) = &requester.client {
		if let Err(error) = client.logout().await {
			tracing::warn!(source = ?error, "Sign out call failed; stored credentials were still cleared");
		}
	}
	Ok(())
}
