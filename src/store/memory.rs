//! Thread-safe in-memory [`TokenStore`], the process-local equivalent of a cookie.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	store::{StoreFuture, TokenStore},
};

/// Keeps the current token in-process; clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<AccessToken>>>);
impl MemoryStore {
	/// Creates a store seeded with `token`.
	pub fn with_token(token: AccessToken) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	/// Returns the current token without going through the async contract.
	pub fn current(&self) -> Option<AccessToken> {
		self.0.read().clone()
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<AccessToken>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn save_replaces_and_clear_empties() {
		let store = MemoryStore::default();

		assert_eq!(store.load().await.expect("Load should succeed."), None);

		store.save(AccessToken::new("first")).await.expect("Save should succeed.");
		store.save(AccessToken::new("second")).await.expect("Save should succeed.");

		assert_eq!(store.current(), Some(AccessToken::new("second")));

		store.clear().await.expect("Clear should succeed.");
		store.clear().await.expect("Clearing an empty store should succeed.");

		assert_eq!(store.load().await.expect("Load should succeed."), None);
	}

	#[tokio::test]
	async fn clones_share_the_same_slot() {
		let store = MemoryStore::with_token(AccessToken::new("shared"));
		let clone = store.clone();

		clone.clear().await.expect("Clear should succeed.");

		assert_eq!(store.current(), None);
	}
}
