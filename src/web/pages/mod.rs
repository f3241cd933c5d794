// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod app;
mod changes;
mod controls;
mod dashboard;
mod errors;
mod header;
mod list_state;
mod login;
mod refunds;
#[cfg(feature = "ssr")]
mod server_utils;
#[cfg(feature = "ssr")]
pub mod shell;
mod support;
mod transactions;
mod user_detail;
mod users;
pub mod utils;
