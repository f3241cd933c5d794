// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::api::{ApiClient, ApiError, CredentialStore};
use crate::config::ConfigData;
use crate::desk::Desks;
use crate::model::{Agent, Refund, SupportTicket, TicketMessage, Transaction, User};
use crate::source::{ApiSource, RecordSource};
use axum::extract::FromRef;
use leptos::config::LeptosOptions;
use std::sync::Arc;

/// Where the dashboard's records come from
#[derive(Clone)]
pub enum Records {
	/// Records every visitor shares without signing in
	Shared(Arc<dyn RecordSource>),
	/// The platform API, called with each admin's own sign-in. The client's credentials are replaced per request.
	Api(ApiClient),
}

impl Records {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Shared(source) => source.name(),
			Self::Api(_) => "api",
		}
	}
}

#[derive(Clone, FromRef)]
pub struct AppState {
	pub leptos_options: LeptosOptions,
	pub config: Arc<ConfigData>,
	pub records: Records,
	pub desks: Arc<Desks>,
}

impl AppState {
	/// Whether records come from the platform API rather than the sample data
	pub fn live_data(&self) -> bool {
		matches!(self.records, Records::Api(_))
	}

	/// The records as seen by the admin whose sign-in is kept in `credentials`
	pub fn requester(&self, credentials: Arc<dyn CredentialStore>) -> Requester {
		let (source, client): (Arc<dyn RecordSource>, _) = match &self.records {
			Records::Shared(source) => (Arc::clone(source), None),
			Records::Api(client) => {
				let client = client.with_credentials(credentials);
				(Arc::new(ApiSource::new(client.clone())), Some(client))
			}
		};
		Requester {
			source,
			client,
			desks: Arc::clone(&self.desks),
		}
	}
}

/// One admin's access to the records
#[derive(Clone)]
pub struct Requester {
	pub source: Arc<dyn RecordSource>,
	/// Only set when records come from the platform API
	pub client: Option<ApiClient>,
	pub desks: Arc<Desks>,
}

impl Requester {
	/// Fails with [`ApiError::Unauthorized`] unless the admin is signed in. Shared records need no sign-in.
	pub async fn check_signed_in(&self) -> Result<(), ApiError> {
		match &self.client {
			Some(client) if !client.is_signed_in().await? => Err(ApiError::Unauthorized),
			_ => Ok(()),
		}
	}

	pub async fn users(&self, reload: bool) -> Result<Vec<User>, ApiError> {
		let desk = &self.desks.users;
		if reload {
			desk.reload(|| self.source.users()).await
		} else {
			desk.records_or_load(|| self.source.users()).await
		}
	}

	pub async fn transactions(&self, reload: bool) -> Result<Vec<Transaction>, ApiError> {
		let desk = &self.desks.transactions;
		if reload {
			desk.reload(|| self.source.transactions()).await
		} else {
			desk.records_or_load(|| self.source.transactions()).await
		}
	}

	pub async fn refunds(&self, reload: bool) -> Result<Vec<Refund>, ApiError> {
		let desk = &self.desks.refunds;
		if reload {
			desk.reload(|| self.source.refunds()).await
		} else {
			desk.records_or_load(|| self.source.refunds()).await
		}
	}

	pub async fn tickets(&self, reload: bool) -> Result<Vec<SupportTicket>, ApiError> {
		let desk = &self.desks.tickets;
		if reload {
			desk.reload(|| self.source.tickets()).await
		} else {
			desk.records_or_load(|| self.source.tickets()).await
		}
	}

	pub async fn ticket_messages(&self, ticket_id: &str) -> Result<Vec<TicketMessage>, ApiError> {
		self.desks
			.threads
			.messages_or_load(ticket_id, || self.source.ticket_messages(ticket_id))
			.await
	}

	/// The support agents tickets can be assigned to
	pub async fn agents(&self) -> Result<Vec<Agent>, ApiError> {
		{
			let agents = self.desks.agents.read().await;
			if !agents.is_empty() {
				return Ok(agents.clone());
			}
		}
		let agents = self.source.agents().await?;
		*self.desks.agents.write().await = agents.clone();
		Ok(agents)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::MemoryCredentialStore;
	use crate::source::FixtureSource;
	use std::time::Duration;

	fn state(records: Records) -> AppState {
		AppState {
			leptos_options: LeptosOptions::builder().output_name("moroccoin-admin").build(),
			config: Arc::new(ConfigData::default()),
			records,
			desks: Arc::new(Desks::new(Duration::ZERO)),
		}
	}

	fn api_records() -> Records {
		// Nothing listens here; the sign-in check never reaches the network
		let client = ApiClient::new(
			"http://127.0.0.1:9/api",
			Duration::from_secs(1),
			Arc::new(MemoryCredentialStore::new()),
		)
		.unwrap();
		Records::Api(client)
	}

	#[tokio::test]
	async fn api_requests_need_their_own_sign_in() {
		let state = state(api_records());

		let signed_out = state.requester(Arc::new(MemoryCredentialStore::new()));
		assert!(signed_out.check_signed_in().await.unwrap_err().is_unauthorized());

		let signed_in = state.requester(Arc::new(MemoryCredentialStore::with_token("token")));
		signed_in.check_signed_in().await.unwrap();
		// The other admin's sign-in doesn't carry over
		assert!(signed_out.check_signed_in().await.is_err());
	}

	#[tokio::test]
	async fn shared_records_need_no_sign_in() {
		let state = state(Records::Shared(Arc::new(FixtureSource)));
		assert!(!state.live_data());

		let requester = state.requester(Arc::new(MemoryCredentialStore::new()));
		requester.check_signed_in().await.unwrap();
		assert!(!requester.users(false).await.unwrap().is_empty());
	}
}
