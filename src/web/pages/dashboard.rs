// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::controls::{StatCard, StatusBadge};
use super::errors::error::ErrorBanner;
use crate::api::{CHART_PERIODS, ChartData, DailyVolume, DashboardStats, StatusCount};
use crate::format::{
	format_compact_number, format_currency, format_date, format_percentage, percentage_change, status_color,
};
use leptos::prelude::*;

#[component]
pub fn Dashboard() -> impl IntoView {
	let stats = Resource::new(|| (), |_| get_dashboard_stats());
	let days = RwSignal::new(CHART_PERIODS[0]);
	let chart = Resource::new(move || days.get(), get_chart_data);

	view! {
		<h1>"Dashboard"</h1>
		<Transition fallback=|| view! { <div class="loading">"Loading statistics..."</div> }>
			{move || stats.get().map(|result| match result {
				Ok(stats) => view! { <StatCards stats /> }.into_any(),
				Err(error) => view! { <ErrorBanner error on_retry=Callback::new(move |_| stats.refetch()) /> }.into_any(),
			})}
		</Transition>
		<section class="dashboard_charts">
			<div class="section_title">
				<h2>"Transaction Volume"</h2>
				<select
					prop:value=move || days.get().to_string()
					on:change=move |event| {
						if let Ok(period) = event_target_value(&event).parse() {
							days.set(period);
						}
					}
				>
					{CHART_PERIODS.iter().map(|period| view! {
						<option value=period.to_string()>{format!("Last {} days", period)}</option>
					}).collect::<Vec<_>>()}
				</select>
			</div>
			<Transition fallback=|| view! { <div class="loading">"Loading charts..."</div> }>
				{move || chart.get().map(|result| match result {
					Ok(chart) => view! { <ChartTables chart /> }.into_any(),
					Err(error) => view! { <ErrorBanner error on_retry=Callback::new(move |_| chart.refetch()) /> }.into_any(),
				})}
			</Transition>
		</section>
	}
}

#[component]
fn StatCards(stats: DashboardStats) -> impl IntoView {
	let currency = stats.financial.currency.clone();
	let success_rate = if stats.transactions.total == 0 {
		0.0
	} else {
		stats.transactions.completed as f64 / stats.transactions.total as f64 * 100.0
	};
	let top_countries = stats.top_countries.clone();
	let most_users = top_countries.first().map(|country| country.count).unwrap_or_default();

	view! {
		<div class="stat_cards">
			<StatCard label="Total Users" value=format_compact_number(stats.users.total as f64) />
			<StatCard label="Active Users" value=format_compact_number(stats.users.active as f64) />
			<StatCard label="Verified Users" value=format_compact_number(stats.users.verified as f64) />
			<StatCard label="New This Week" value=stats.users.recent.to_string() />
		</div>
		<div class="stat_cards">
			<StatCard label="Transactions" value=format_compact_number(stats.transactions.total as f64) />
			<StatCard label="Success Rate" value=format_percentage(success_rate, 1) />
			<StatCard label="Pending" value=stats.transactions.pending.to_string() />
			<StatCard label="Failed" value=stats.transactions.failed.to_string() />
		</div>
		<div class="stat_cards">
			<StatCard label="Total Volume" value=format_currency(stats.financial.total_volume, &currency) />
			<StatCard label="Fees Collected" value=format_currency(stats.financial.total_fees, &currency) />
			<StatCard label="Pending Refunds" value=stats.refunds.pending.to_string() />
			<StatCard label="Refund Requests" value=stats.refunds.total.to_string() />
		</div>
		<section class="top_countries">
			<h2>"Top Countries"</h2>
			<ol>
				{top_countries.into_iter().map(|country| {
					let width = if most_users == 0 { 0.0 } else { country.count as f64 / most_users as f64 * 100.0 };
					view! {
						<li>
							<span class="bar_label">{country.country.clone()}</span>
							<span class="bar" style=format!("width: {:.0}%", width)></span>
							<span class="bar_value">{country.count.to_string()}</span>
						</li>
					}
				}).collect::<Vec<_>>()}
			</ol>
		</section>
	}
}

/// The chart data as tables with bars, newest day first
#[component]
fn ChartTables(chart: ChartData) -> impl IntoView {
	let ChartData {
		daily_data,
		status_distribution,
	} = chart;
	let largest_volume = daily_data.iter().map(|day| day.volume).fold(0.0, f64::max);
	let trend = volume_trend(&daily_data);

	view! {
		{trend.map(|change| {
			let class = if change < 0.0 { "trend trend_down" } else { "trend trend_up" };
			view! { <p class=class>{format!("{} vs the day before", format_percentage(change, 1))}</p> }
		})}
		<table class="record_table volume_table">
			<thead>
				<tr>
					<th>"Date"</th>
					<th>"Transactions"</th>
					<th>"Volume"</th>
				</tr>
			</thead>
			<tbody>
				{daily_data.into_iter().rev().map(|day| {
					let width = if largest_volume > 0.0 { day.volume / largest_volume * 100.0 } else { 0.0 };
					view! {
						<tr>
							<td>{format_date(&day.date)}</td>
							<td>{day.transactions.to_string()}</td>
							<td>
								<span class="bar" style=format!("width: {:.0}%", width)></span>
								{format_currency(day.volume, "MAD")}
							</td>
						</tr>
					}
				}).collect::<Vec<_>>()}
			</tbody>
		</table>
		<StatusDistribution counts=status_distribution />
	}
}

#[component]
fn StatusDistribution(counts: Vec<StatusCount>) -> impl IntoView {
	let total: u64 = counts.iter().map(|entry| entry.count).sum();

	view! {
		<section class="status_distribution">
			<h2>"Transaction Status"</h2>
			<ul>
				{counts.into_iter().map(|entry| {
					let share = if total == 0 { 0.0 } else { entry.count as f64 / total as f64 * 100.0 };
					let class = format!("bar {}", status_color(&entry.status));
					view! {
						<li>
							<StatusBadge status=entry.status.clone() />
							<span class=class style=format!("width: {:.0}%", share)></span>
							<span class="bar_value">{format!("{} ({})", entry.count, format_percentage(share, 1))}</span>
						</li>
					}
				}).collect::<Vec<_>>()}
			</ul>
		</section>
	}
}

/// Percentage change in volume between the last two days
fn volume_trend(daily_data: &[DailyVolume]) -> Option<f64> {
	match daily_data {
		[.., previous, latest] => Some(percentage_change(latest.volume, previous.volume)),
		_ => None,
	}
}

#[server]
async fn get_dashboard_stats() -> Result<DashboardStats, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	let (_, requester) = signed_in().await?;
	requester.source.dashboard_stats().await.map_err(load_error)
}

#[server]
async fn get_chart_data(days: u32) -> Result<ChartData, ServerFnError> {
	use super::server_utils::{load_error, signed_in};

	if !CHART_PERIODS.contains(&days) {
		tracing::warn!(days, "Refused chart request for an unsupported period");
		return Err(ServerFnError::new("Charts can only cover 7, 30 or 90 days."));
	}
	let (_, requester) = signed_in().await?;
	requester.source.chart_data(days).await.map_err(load_error)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn day(date: &str, volume: f64) -> DailyVolume {
		DailyVolume {
			date: date.to_string(),
			transactions: 1,
			volume,
		}
	}

	#[test]
	fn trend_compares_the_last_two_days() {
		let data = [day("2024-01-13", 50.0), day("2024-01-14", 100.0), day("2024-01-15", 150.0)];
		assert_eq!(volume_trend(&data), Some(50.0));
		assert_eq!(volume_trend(&data[..1]), None);
	}

	#[cfg(feature = "ssr")]
	#[tokio::test]
	async fn chart_request_for_unsupported_period_is_refused() {
		assert!(get_chart_data(365).await.is_err());
		assert!(get_chart_data(u32::MAX).await.is_err());
	}
}
