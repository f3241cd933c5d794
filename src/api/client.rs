// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::credentials::{AUTH_TOKEN, CredentialStore, USER_DATA};
use super::error::ApiError;
use super::types::{
	ChartData, ChatMessage, DashboardStats, HealthStatus, ListParams, LoginRequest, LoginResponse, NewChatMessage,
	NotificationRecord, NotificationRequest, Paginated,
};
use crate::model::{Activity, AdminProfile, Refund, Transaction, User};
use crate::mutation::RefundDecision;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Environment variable overriding the configured base URL
pub const BASE_URL_VAR: &str = "MOROCCOIN_API_URL";

/// Client for the platform API.
///
/// Every request carries the stored bearer token. A 401 response clears the stored credentials, so the dashboard
/// has to sign in again.
#[derive(Clone)]
pub struct ApiClient {
	http: reqwest::Client,
	base_url: String,
	credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
	pub fn new(base_url: &str, timeout: Duration, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(ApiError::Setup)?;
		Ok(Self {
			http,
			base_url: base_url.trim_end_matches('/').to_string(),
			credentials,
		})
	}

	/// The same client, storing its sign-in in `credentials` instead
	pub fn with_credentials(&self, credentials: Arc<dyn CredentialStore>) -> Self {
		Self {
			http: self.http.clone(),
			base_url: self.base_url.clone(),
			credentials,
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
		&self.credentials
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T, ApiError> {
		let request = match self.credentials.get(AUTH_TOKEN).await? {
			Some(token) => request.bearer_auth(token),
			None => request,
		};

		let response = request.send().await.map_err(|source| ApiError::Transport {
			path: path.to_string(),
			source,
		})?;
		let status = response.status();

		if status == StatusCode::UNAUTHORIZED {
			tracing::warn!(path, "API rejected credentials; signing out");
			if let Err(error) = self.credentials.clear().await {
				tracing::error!(source = ?error, "Failed to clear stored credentials");
			}
			return Err(ApiError::Unauthorized);
		}

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ApiError::Status {
				path: path.to_string(),
				status: status.as_u16(),
				body,
			});
		}

		response.json().await.map_err(|source| ApiError::Decode {
			path: path.to_string(),
			source,
		})
	}

	async fn get<T: DeserializeOwned>(&self, path: &str, params: &ListParams) -> Result<T, ApiError> {
		let request = self.http.get(self.url(path)).query(params.pairs());
		self.send(request, path).await
	}

	async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
		let request = self.http.post(self.url(path)).json(body);
		self.send(request, path).await
	}

	/// Fetches a page by the absolute URL given in another page's `next` link
	pub async fn follow<T: DeserializeOwned>(&self, page_url: &str) -> Result<Paginated<T>, ApiError> {
		let request = self.http.get(page_url);
		self.send(request, page_url).await
	}

	/// Fetches every page of a list endpoint
	pub async fn collect_pages<T: DeserializeOwned>(&self, first_page: Paginated<T>) -> Result<Vec<T>, ApiError> {
		let mut records = first_page.results;
		let mut next = first_page.next;
		while let Some(page_url) = next {
			let page: Paginated<T> = self.follow(&page_url).await?;
			records.extend(page.results);
			next = page.next;
		}
		Ok(records)
	}

	/// Signs in and stores the token and profile for later requests
	pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
		let body = LoginRequest {
			username: username.to_string(),
			password: password.to_string(),
		};
		let response: LoginResponse = self.post("/auth/login/", &body).await?;
		self.credentials.set(AUTH_TOKEN, &response.token).await?;
		self.credentials
			.set(USER_DATA, &serde_json::to_string(&response.user)?)
			.await?;
		tracing::info!(username = %response.user.username, "Admin signed in");
		Ok(response)
	}

	/// Signs out. Stored credentials are removed even if the API call fails.
	pub async fn logout(&self) -> Result<(), ApiError> {
		let result: Result<serde_json::Value, ApiError> = self.post("/auth/logout/", &serde_json::json!({})).await;
		let cleared = self.credentials.clear().await;
		result?;
		cleared
	}

	pub async fn is_signed_in(&self) -> Result<bool, ApiError> {
		Ok(self.credentials.get(AUTH_TOKEN).await?.is_some())
	}

	/// The profile saved at sign-in, without asking the API
	pub async fn stored_profile(&self) -> Result<Option<AdminProfile>, ApiError> {
		match self.credentials.get(USER_DATA).await? {
			Some(data) => Ok(Some(serde_json::from_str(&data)?)),
			None => Ok(None),
		}
	}

	pub async fn profile(&self) -> Result<AdminProfile, ApiError> {
		self.get("/auth/profile/", &ListParams::new()).await
	}

	pub async fn users(&self, params: &ListParams) -> Result<Paginated<User>, ApiError> {
		self.get("/users/", params).await
	}

	pub async fn user(&self, user_id: &str) -> Result<User, ApiError> {
		self.get(&format!("/users/{}/", user_id), &ListParams::new()).await
	}

	pub async fn user_transactions(
		&self,
		user_id: &str,
		params: &ListParams,
	) -> Result<Paginated<Transaction>, ApiError> {
		self.get(&format!("/users/{}/transactions/", user_id), params).await
	}

	pub async fn transactions(&self, params: &ListParams) -> Result<Paginated<Transaction>, ApiError> {
		self.get("/transactions/", params).await
	}

	pub async fn transaction(&self, transaction_id: &str) -> Result<Transaction, ApiError> {
		self.get(&format!("/transactions/{}/", transaction_id), &ListParams::new())
			.await
	}

	pub async fn refunds(&self, params: &ListParams) -> Result<Paginated<Refund>, ApiError> {
		self.get("/refunds/", params).await
	}

	pub async fn create_refund(&self, refund: &Refund) -> Result<Refund, ApiError> {
		self.post("/refunds/", refund).await
	}

	pub async fn process_refund(&self, refund_id: &str, decision: RefundDecision) -> Result<Refund, ApiError> {
		let body = serde_json::json!({ "action": decision.to_string() });
		self.post(&format!("/refunds/{}/process/", refund_id), &body).await
	}

	pub async fn chat_messages(&self, params: &ListParams) -> Result<Paginated<ChatMessage>, ApiError> {
		self.get("/chat/", params).await
	}

	pub async fn send_chat_message(&self, message: &NewChatMessage) -> Result<ChatMessage, ApiError> {
		self.post("/chat/", message).await
	}

	pub async fn send_notification(&self, notification: &NotificationRequest) -> Result<NotificationRecord, ApiError> {
		self.post("/notifications/send/", notification).await
	}

	pub async fn activities(&self, params: &ListParams) -> Result<Paginated<Activity>, ApiError> {
		self.get("/activities/", params).await
	}

	pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
		self.get("/dashboard/stats/", &ListParams::new()).await
	}

	pub async fn chart_data(&self, days: u32) -> Result<ChartData, ApiError> {
		let params = ListParams::new().with("days", &days.to_string());
		self.get("/dashboard/charts/", &params).await
	}

	pub async fn health(&self) -> Result<HealthStatus, ApiError> {
		self.get("/health/", &ListParams::new()).await
	}
}
