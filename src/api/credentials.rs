// © 2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::ApiError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key of the bearer token sent with API requests
pub const AUTH_TOKEN: &str = "auth_token";
/// Key of the serialized profile of the signed-in admin
pub const USER_DATA: &str = "user_data";

/// Persistent storage for the dashboard's sign-in state
#[async_trait]
pub trait CredentialStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>, ApiError>;

	async fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;

	/// Removes a value. Removing a key that isn't stored succeeds.
	async fn remove(&self, key: &str) -> Result<(), ApiError>;

	/// Removes everything stored for the signed-in admin
	async fn clear(&self) -> Result<(), ApiError> {
		self.remove(AUTH_TOKEN).await?;
		self.remove(USER_DATA).await
	}
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
	async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
		(**self).get(key).await
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
		(**self).set(key, value).await
	}

	async fn remove(&self, key: &str) -> Result<(), ApiError> {
		(**self).remove(key).await
	}

	async fn clear(&self) -> Result<(), ApiError> {
		(**self).clear().await
	}
}

/// Credentials kept only for the life of the process
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore {
	values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCredentialStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts out signed in with the given token
	pub fn with_token(token: &str) -> Self {
		let mut values = HashMap::new();
		values.insert(AUTH_TOKEN.to_string(), token.to_string());
		Self {
			values: Arc::new(RwLock::new(values)),
		}
	}
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
	async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
		Ok(self.values.read().await.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
		self.values.write().await.insert(key.to_string(), value.to_string());
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<(), ApiError> {
		self.values.write().await.remove(key);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn memory_store_clears_both_keys() {
		let store = MemoryCredentialStore::with_token("abc");
		store.set(USER_DATA, "{}").await.unwrap();
		assert_eq!(store.get(AUTH_TOKEN).await.unwrap().as_deref(), Some("abc"));
		store.clear().await.unwrap();
		assert_eq!(store.get(AUTH_TOKEN).await.unwrap(), None);
		assert_eq!(store.get(USER_DATA).await.unwrap(), None);
	}
}
