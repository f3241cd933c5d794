// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum ApiError {
	#[error("couldn't set up the HTTP client")]
	#[diagnostic(code(moroccoin::api::setup))]
	Setup(#[source] reqwest::Error),

	#[error("request to {path} failed")]
	#[diagnostic(code(moroccoin::api::transport), help("check that the API is reachable at the configured base URL"))]
	Transport {
		path: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("the API rejected the stored credentials")]
	#[diagnostic(code(moroccoin::api::unauthorized), help("sign in again"))]
	Unauthorized,

	#[error("{path} responded with status {status}")]
	#[diagnostic(code(moroccoin::api::status))]
	Status { path: String, status: u16, body: String },

	#[error("couldn't read the response from {path}")]
	#[diagnostic(code(moroccoin::api::decode))]
	Decode {
		path: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("charts can't cover {0} days")]
	#[diagnostic(code(moroccoin::api::chart_period), help("use one of 7, 30 or 90 days"))]
	UnsupportedPeriod(u32),

	#[error("couldn't access stored credentials")]
	#[diagnostic(code(moroccoin::api::credentials))]
	CredentialStorage(#[from] std::io::Error),

	#[error("stored credentials are malformed")]
	#[diagnostic(code(moroccoin::api::credentials_format))]
	CredentialFormat(#[from] serde_json::Error),
}

impl ApiError {
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized)
	}
}
