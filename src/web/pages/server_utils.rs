// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::{LOAD_FAILED, SAVE_FAILED, SIGNED_OUT};
use crate::api::ApiError;
use crate::format::capitalize_first;
use crate::model::AdminProfile;
use crate::mutation::{AgentIdentity, MutationError};
use crate::web::session::SessionCredentials;
use crate::web::state::{AppState, Requester};
use leptos::prelude::*;
use leptos_axum::extract_with_state;
use std::sync::Arc;
use tower_sessions::session::Session;

/// Gets the application state.
/// Must be used from a server function; the state is provided as context for each request.
pub fn app_state() -> AppState {
	expect_context()
}

/// Gets the records as seen by the admin making the request, signed in or not.
/// Must be used from a server function; relies on extracting request data.
pub async fn requester() -> Result<(AppState, Requester), ServerFnError> {
	let state = app_state();
	let session: Session = extract_with_state(&state).await?;
	let requester = state.requester(Arc::new(SessionCredentials::new(session)));
	Ok((state, requester))
}

/// Gets the records for the admin making the request.
/// Fails with [`SIGNED_OUT`] when they have to sign in first. Every server function reading or changing records
/// goes through here.
pub async fn signed_in() -> Result<(AppState, Requester), ServerFnError> {
	let (state, requester) = requester().await?;
	ensure_signed_in(&requester).await?;
	Ok((state, requester))
}

pub async fn ensure_signed_in(requester: &Requester) -> Result<(), ServerFnError> {
	requester.check_signed_in().await.map_err(load_error)
}

/// Logs a failed fetch and turns it into the error shown to the admin
pub fn load_error(error: ApiError) -> ServerFnError {
	if error.is_unauthorized() {
		tracing::info!("API credentials rejected; sending admin to sign in");
		return ServerFnError::new(SIGNED_OUT);
	}
	tracing::error!(source = ?error, "Failed to load records");
	ServerFnError::new(LOAD_FAILED)
}

/// Logs a failed API write and turns it into the error shown to the admin
pub fn save_error(error: ApiError) -> ServerFnError {
	if error.is_unauthorized() {
		tracing::info!("API credentials rejected; sending admin to sign in");
		return ServerFnError::new(SIGNED_OUT);
	}
	tracing::error!(source = ?error, "Failed to save changes");
	ServerFnError::new(SAVE_FAILED)
}

/// Turns a refused change into the error shown to the admin. The message says what was wrong.
pub fn mutation_error(error: MutationError) -> ServerFnError {
	tracing::warn!(source = ?error, "Change refused");
	ServerFnError::new(capitalize_first(&error.to_string()))
}

/// Address replies are sent from when the admin's profile doesn't have one
const SUPPORT_EMAIL: &str = "support@moroccoin.com";

async fn stored_profile(requester: &Requester) -> Option<AdminProfile> {
	let client = requester.client.as_ref()?;
	match client.stored_profile().await {
		Ok(profile) => profile,
		Err(error) => {
			tracing::warn!(source = ?error, "Couldn't read the stored admin profile");
			None
		}
	}
}

/// The name recorded on changes made by the signed-in admin
pub async fn acting_admin(state: &AppState, requester: &Requester) -> String {
	match stored_profile(requester).await {
		Some(profile) => profile.display_name(),
		None => state.config.mutation.admin_name.clone(),
	}
}

/// Who ticket replies from the signed-in admin are sent as
pub async fn acting_agent(state: &AppState, requester: &Requester) -> AgentIdentity {
	match stored_profile(requester).await {
		Some(profile) if !profile.email.is_empty() => AgentIdentity {
			name: profile.display_name(),
			email: profile.email,
		},
		Some(profile) => AgentIdentity {
			name: profile.display_name(),
			email: String::from(SUPPORT_EMAIL),
		},
		None => AgentIdentity {
			name: state.config.mutation.admin_name.clone(),
			email: String::from(SUPPORT_EMAIL),
		},
	}
}

/// Server state and request context for calling server functions from tests
#[cfg(test)]
pub mod testing {
	use crate::api::{ApiClient, MemoryCredentialStore};
	use crate::config::ConfigData;
	use crate::desk::Desks;
	use crate::web::state::{AppState, Records};
	use axum::http::Request;
	use leptos::config::LeptosOptions;
	use leptos::prelude::*;
	use std::sync::Arc;
	use std::time::Duration;
	use tower_sessions::MemoryStore;
	use tower_sessions::session::Session;

	/// State reading records from an API nobody listens on
	pub fn api_state() -> AppState {
		let client = ApiClient::new(
			"http://127.0.0.1:9/api",
			Duration::from_secs(1),
			Arc::new(MemoryCredentialStore::new()),
		)
		.unwrap();
		AppState {
			leptos_options: LeptosOptions::builder().output_name("moroccoin-admin").build(),
			config: Arc::new(ConfigData::default()),
			records: Records::Api(client),
			desks: Arc::new(Desks::new(Duration::ZERO)),
		}
	}

	pub fn new_session() -> Session {
		Session::new(None, Arc::new(MemoryStore::default()), None)
	}

	/// Provides what server functions extract for a request from the given session.
	/// The returned owner has to stay alive while they run.
	pub fn enter_request(state: &AppState, session: Session) -> Owner {
		let owner = Owner::new();
		owner.set();
		let (mut parts, ()) = Request::new(()).into_parts();
		parts.extensions.insert(session);
		provide_context(state.clone());
		provide_context(parts);
		owner
	}
}

#[cfg(test)]
mod tests {
	use super::testing::{api_state, new_session};
	use super::*;
	use crate::api::{AUTH_TOKEN, CredentialStore};
	use crate::source::FixtureSource;
	use crate::web::pages::utils::is_signed_out;
	use crate::web::state::Records;

	#[tokio::test]
	async fn signed_out_sessions_are_refused() {
		let state = api_state();
		let requester = state.requester(Arc::new(SessionCredentials::new(new_session())));

		let error = ensure_signed_in(&requester).await.unwrap_err();
		assert!(is_signed_out(&error));
		assert_eq!(
			acting_admin(&state, &requester).await,
			state.config.mutation.admin_name
		);
	}

	#[tokio::test]
	async fn signed_in_sessions_are_let_through() {
		let state = api_state();
		let credentials = SessionCredentials::new(new_session());
		credentials.set(AUTH_TOKEN, "token").await.unwrap();

		let requester = state.requester(Arc::new(credentials));
		ensure_signed_in(&requester).await.unwrap();
	}

	#[tokio::test]
	async fn shared_records_are_open_to_everyone() {
		let mut state = api_state();
		state.records = Records::Shared(Arc::new(FixtureSource));
		let requester = state.requester(Arc::new(SessionCredentials::new(new_session())));
		ensure_signed_in(&requester).await.unwrap();
	}
}
