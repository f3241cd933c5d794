// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::api::{ApiError, CredentialStore};
use async_trait::async_trait;
use tower_sessions::Session;

/// Keeps an admin's API sign-in in their browser session
#[derive(Clone, Debug)]
pub struct SessionCredentials {
	session: Session,
}

impl SessionCredentials {
	pub fn new(session: Session) -> Self {
		Self { session }
	}
}

fn session_error(error: tower_sessions::session::Error) -> ApiError {
	ApiError::CredentialStorage(std::io::Error::other(error))
}

#[async_trait]
impl CredentialStore for SessionCredentials {
	async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
		self.session.get(key).await.map_err(session_error)
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
		self.session.insert(key, value).await.map_err(session_error)
	}

	async fn remove(&self, key: &str) -> Result<(), ApiError> {
		self.session.remove::<String>(key).await.map_err(session_error)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{AUTH_TOKEN, USER_DATA};
	use std::sync::Arc;
	use tower_sessions::MemoryStore;

	fn session() -> Session {
		Session::new(None, Arc::new(MemoryStore::default()), None)
	}

	#[tokio::test]
	async fn sessions_keep_separate_sign_ins() {
		let first = SessionCredentials::new(session());
		let second = SessionCredentials::new(session());

		first.set(AUTH_TOKEN, "token-123").await.unwrap();
		first.set(USER_DATA, "{}").await.unwrap();
		assert_eq!(first.get(AUTH_TOKEN).await.unwrap().as_deref(), Some("token-123"));
		assert_eq!(second.get(AUTH_TOKEN).await.unwrap(), None);

		first.clear().await.unwrap();
		assert_eq!(first.get(AUTH_TOKEN).await.unwrap(), None);
		assert_eq!(first.get(USER_DATA).await.unwrap(), None);
	}
}
