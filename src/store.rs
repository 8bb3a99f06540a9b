//! Access-token storage contract and built-in backends.
//!
//! The store plays the role of the browser cookie: one current token shared by every
//! request for the lifetime of the process. Only the client's login, refresh, and
//! logout paths write to it.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::AccessToken};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the current access token.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the current token, if any.
	fn load(&self) -> StoreFuture<'_, Option<AccessToken>>;

	/// Replaces the current token.
	fn save(&self, token: AccessToken) -> StoreFuture<'_, ()>;

	/// Removes the current token. Clearing an empty store succeeds.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
