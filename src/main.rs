// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> miette::Result<()> {
	use moroccoin_admin::api::{ApiClient, MemoryCredentialStore};
	use moroccoin_admin::config::{DataSourceKind, parse_config};
	use moroccoin_admin::source::FixtureSource;
	use moroccoin_admin::web::server::run_server;
	use moroccoin_admin::web::state::Records;
	use std::sync::Arc;

	tracing_subscriber::fmt::init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from("config.kdl"));
	let config = Arc::new(parse_config(&config_path).await?);

	let records = match config.data_source {
		DataSourceKind::Fixtures => Records::Shared(Arc::new(FixtureSource)),
		DataSourceKind::Api => {
			// Requests sign in through their own session; this store is never used
			let credentials = Arc::new(MemoryCredentialStore::new());
			Records::Api(ApiClient::new(&config.api.base_url, config.api.timeout, credentials)?)
		}
	};
	tracing::info!(source = records.name(), config = %config_path, "Starting dashboard");

	run_server(config, records).await
}

#[cfg(not(feature = "ssr"))]
pub fn main() {}
