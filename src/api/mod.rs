// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Moroccoin platform REST API

#[cfg(feature = "ssr")]
mod client;
#[cfg(feature = "ssr")]
mod credentials;
#[cfg(feature = "ssr")]
mod error;
mod types;

#[cfg(feature = "ssr")]
pub use client::{ApiClient, BASE_URL_VAR, DEFAULT_BASE_URL};
#[cfg(feature = "ssr")]
pub use credentials::{AUTH_TOKEN, CredentialStore, MemoryCredentialStore, USER_DATA};
#[cfg(feature = "ssr")]
pub use error::ApiError;
pub use types::*;
