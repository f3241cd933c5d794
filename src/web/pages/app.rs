// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::dashboard::Dashboard;
use super::errors::error::ErrorBanner;
use super::errors::not_found::NotFound;
use super::header::PageHeader;
use super::login::LoginPage;
use super::refunds::RefundsPage;
use super::support::SupportPage;
use super::transactions::TransactionsPage;
use super::user_detail::UserDetailPage;
use super::users::UsersPage;
use super::utils::{LOGIN_PATH, get_session};
use leptos::prelude::*;
use leptos_meta::{Stylesheet, Title, provide_meta_context};
use leptos_router::components::{ParentRoute, Redirect, Route, Router, Routes};
use leptos_router::nested_router::Outlet;
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Stylesheet href="/pkg/moroccoin-admin.css" />
		<Title text="Moroccoin Admin" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/login") view=LoginPage />
				<ParentRoute path=path!("") view=MainPage>
					<Route path=path!("") view=Dashboard />
					<Route path=path!("users") view=UsersPage />
					<Route path=path!("users/:id") view=UserDetailPage />
					<Route path=path!("transactions") view=TransactionsPage />
					<Route path=path!("refunds") view=RefundsPage />
					<Route path=path!("support") view=SupportPage />
				</ParentRoute>
			</Routes>
		</Router>
	}
}

/// Layout for every page that needs a signed-in admin
#[component]
fn MainPage() -> impl IntoView {
	let session = Resource::new(|| (), |_| get_session());

	view! {
		<Transition fallback=|| view! { <div class="page_loading">"Loading..."</div> }>
			{
				move || session.get().map(|result| match result {
					Ok(info) if info.signed_in => {
						provide_context(info.clone());
						view! {
							<PageHeader session=info />
							<main>
								<Outlet />
							</main>
						}.into_any()
					}
					Ok(_) => view! { <Redirect path=LOGIN_PATH /> }.into_any(),
					Err(error) => view! {
						<ErrorBanner error on_retry=Callback::new(move |_| session.refetch()) />
					}.into_any(),
				})
			}
		</Transition>
	}
}
