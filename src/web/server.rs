// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::pages::app::App;
use super::pages::shell::shell;
use super::session::SessionCredentials;
use super::state::{AppState, Records, Requester};
use crate::api::ApiError;
use crate::config::ConfigData;
use crate::desk::Desks;
use crate::export::{CsvRow, to_csv};
use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list, render_app_to_stream};
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::util::ServiceExt;
use tower_http::services::ServeDir;
use tower_sessions::cookie::SameSite;
use tower_sessions::service::SessionManagerLayer;
use tower_sessions::{MemoryStore, Session};

pub async fn run_server(config: Arc<ConfigData>, records: Records) -> miette::Result<()> {
	let web_config = get_configuration(None).into_diagnostic()?;
	let site_addr = config.web.bind_addr.clone();
	let leptos_options = web_config.leptos_options;
	let routes = generate_route_list(App);

	let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_same_site(SameSite::Lax);

	let app_state = AppState {
		leptos_options,
		config: Arc::clone(&config),
		records,
		desks: Arc::new(Desks::new(config.mutation.latency)),
	};

	let app = Router::new()
		.leptos_routes_with_context(
			&app_state,
			routes,
			{
				let app_state = app_state.clone();
				move || provide_context(app_state.clone())
			},
			{
				let leptos_options = app_state.leptos_options.clone();
				move || shell(leptos_options.clone())
			},
		)
		.route("/export/transactions.csv", get(export_transactions))
		.route("/export/refunds.csv", get(export_refunds))
		.route("/export/support_tickets.csv", get(export_tickets))
		.fallback(file_and_error_handler)
		.layer(ServiceBuilder::new().layer(session_layer))
		.with_state(app_state);

	tracing::info!("Listening on http://{}", &site_addr);
	let listener = TcpListener::bind(&site_addr).await.into_diagnostic()?;
	axum::serve(listener, app.into_make_service()).await.into_diagnostic()?;

	Ok(())
}

/// The admin making an export, if they're signed in
async fn export_requester(state: &AppState, session: Session) -> Result<Requester, ApiError> {
	let requester = state.requester(Arc::new(SessionCredentials::new(session)));
	requester.check_signed_in().await?;
	Ok(requester)
}

async fn export_transactions(State(state): State<AppState>, session: Session) -> Response {
	let records = match export_requester(&state, session).await {
		Ok(requester) => requester.transactions(false).await,
		Err(error) => Err(error),
	};
	csv_download(records)
}

async fn export_refunds(State(state): State<AppState>, session: Session) -> Response {
	let records = match export_requester(&state, session).await {
		Ok(requester) => requester.refunds(false).await,
		Err(error) => Err(error),
	};
	csv_download(records)
}

async fn export_tickets(State(state): State<AppState>, session: Session) -> Response {
	let records = match export_requester(&state, session).await {
		Ok(requester) => requester.tickets(false).await,
		Err(error) => Err(error),
	};
	csv_download(records)
}

fn csv_download<R: CsvRow>(records: Result<Vec<R>, ApiError>) -> Response {
	match records {
		Ok(records) => {
			let headers = [
				(header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
				(
					header::CONTENT_DISPOSITION,
					format!("attachment; filename=\"{}\"", R::FILE_NAME),
				),
			];
			(headers, to_csv(&records)).into_response()
		}
		Err(ApiError::Unauthorized) => Redirect::to("/login").into_response(),
		Err(error) => {
			tracing::error!(source = ?error, file = R::FILE_NAME, "Failed to load records for export");
			(StatusCode::BAD_GATEWAY, "Couldn't load the records to export.").into_response()
		}
	}
}

async fn file_and_error_handler(uri: Uri, State(state): State<AppState>, request: Request) -> Response {
	let site_root_dir = state.leptos_options.site_root.clone();
	let response = get_static_file(uri.clone(), &site_root_dir).await;
	let response = match response {
		Ok(response) => response,
		Err(error) => return error.into_response(),
	};

	if response.status() == StatusCode::OK {
		response.into_response()
	} else {
		let handler = render_app_to_stream(App);
		handler(request).await.into_response()
	}
}

async fn get_static_file(uri: Uri, root: &str) -> Result<Response, StatusCode> {
	let Ok(request) = Request::builder().uri(uri.clone()).body(Body::empty()) else {
		return Err(StatusCode::INTERNAL_SERVER_ERROR);
	};

	match ServeDir::new(root).oneshot(request).await {
		Ok(response) => Ok(response.into_response()),
		Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
	}
}
